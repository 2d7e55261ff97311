//! Read-only state shared by every run of one preparation.

use plume_core::QuantityKey;
use plume_norm::{NormError, NormTable};
use plume_space::{MarkerRule, WindowSpec};
use plume_stitch::Stitcher;
use plume_store::DatasetInfo;

use crate::config::{ConfigError, PrepareConfig};
use crate::error::PrepareError;

fn table_of<'a>(
    entries: impl Iterator<Item = (&'a String, &'a plume_store::VariableInfo)>,
) -> Result<NormTable, NormError> {
    NormTable::try_from_entries(entries.map(|(k, v)| (k.clone(), v.stats())))
}

/// Dataset metadata, statistics tables and the validated configuration.
///
/// Built once before any run is processed and shared behind an `Arc`;
/// nothing in it changes afterwards.
#[derive(Clone, Debug)]
pub struct DatasetContext {
    info: DatasetInfo,
    inputs: NormTable,
    labels: NormTable,
    window: WindowSpec,
    stitcher: Stitcher,
    property: QuantityKey,
    model_inputs: Vec<String>,
    marker_channel: String,
    marker_rule: MarkerRule,
}

impl DatasetContext {
    /// Validate `config` against `info` and build the statistics tables.
    ///
    /// Fails on any configuration problem, on degenerate statistics,
    /// and if the predicted property has no label statistics. When the
    /// metadata records the grid, the window must fit inside it.
    pub fn new(config: &PrepareConfig, info: DatasetInfo) -> Result<Self, PrepareError> {
        config.validate()?;
        info.validate()?;
        if let Some(dims) = &info.dimensions {
            config.check_grid(dims)?;
        }
        let inputs = table_of(info.inputs.iter())?;
        let labels = table_of(info.labels.iter())?;
        let property = config.property_key()?;
        labels.require(property.id())?;

        let model_inputs: Vec<String> = match &config.model_inputs {
            Some(list) => list.clone(),
            None => info.input_names().into_iter().map(str::to_string).collect(),
        };
        for channel in model_inputs.iter().chain(std::iter::once(&config.marker_channel)) {
            if !info.inputs.contains_key(channel) {
                return Err(ConfigError::UnknownChannel {
                    channel: channel.clone(),
                }
                .into());
            }
        }

        Ok(Self {
            inputs,
            labels,
            window: config.window_spec()?,
            stitcher: config.stitcher()?,
            property,
            model_inputs,
            marker_channel: config.marker_channel.clone(),
            marker_rule: config.marker_rule,
            info,
        })
    }

    /// The source dataset's metadata.
    pub fn info(&self) -> &DatasetInfo {
        &self.info
    }

    /// Input statistics.
    pub fn input_table(&self) -> &NormTable {
        &self.inputs
    }

    /// Label statistics; the predicted property lives here.
    pub fn label_table(&self) -> &NormTable {
        &self.labels
    }

    /// Box specification.
    pub fn window(&self) -> &WindowSpec {
        &self.window
    }

    /// Stitcher for the second pass.
    pub fn stitcher(&self) -> Stitcher {
        self.stitcher
    }

    /// The predicted quantity.
    pub fn property(&self) -> &QuantityKey {
        &self.property
    }

    /// Channels fed to the model, in order.
    pub fn model_inputs(&self) -> &[String] {
        &self.model_inputs
    }

    /// Identifier channel.
    pub fn marker_channel(&self) -> &str {
        &self.marker_channel
    }

    /// Marker rule.
    pub fn marker_rule(&self) -> MarkerRule {
        self.marker_rule
    }
}
