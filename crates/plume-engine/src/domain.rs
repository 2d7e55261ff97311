//! One simulation run: full-grid fields, heat-pump locations and boxes.

use std::sync::Arc;

use indexmap::IndexMap;
use plume_core::{Coord, PhysicalField, QuantityKey, Tensor};
use plume_norm::{denormalize, normalize, NormError, NormTable};
use plume_space::{locate_markers, Extent, SpaceError};
use plume_store::{Category, ChannelStack, RunStore};
use tracing::{debug, warn};

use crate::context::DatasetContext;
use crate::error::DomainError;
use crate::heat_pump::HeatPumpBox;

/// Build one field per name from `stack`, attaching (or applying) the
/// statistics in `table`.
fn fields_from(
    run_id: &str,
    stack: &ChannelStack,
    names: &[&str],
    table: &NormTable,
    standardize: bool,
) -> Result<IndexMap<String, PhysicalField>, DomainError> {
    let mut fields = IndexMap::with_capacity(names.len());
    for &name in names {
        let values = stack.channel(name).ok_or_else(|| DomainError::MissingChannel {
            run_id: run_id.to_string(),
            channel: name.to_string(),
        })?;
        let mut field =
            PhysicalField::new(QuantityKey::parse(name)?, stack.spatial_shape(), values.to_vec())?;
        let stats = table.require(name)?;
        if standardize {
            normalize(&mut field, stats)?;
        } else {
            field.attach_stats(stats)?;
        }
        fields.insert(name.to_string(), field);
    }
    Ok(fields)
}

fn check_grid(run_id: &str, what: &str, expected: &[usize], got: &[usize]) -> Result<(), DomainError> {
    if expected == got {
        return Ok(());
    }
    Err(DomainError::ShapeMismatch {
        run_id: run_id.to_string(),
        what: what.to_string(),
        expected: expected.to_vec(),
        got: got.to_vec(),
    })
}

/// The full-grid state of one run.
///
/// All fields share the run's [`Extent`] and are held in standardized
/// units. A domain is *skipped* when it has no heat pump or when one of
/// its boxes would leave the grid; a skipped domain yields no boxes.
#[derive(Debug)]
pub struct Domain {
    run_id: String,
    ctx: Arc<DatasetContext>,
    extent: Extent,
    fields: IndexMap<String, PhysicalField>,
    labels: Option<IndexMap<String, PhysicalField>>,
    marker: Vec<f32>,
    locations: Vec<Coord>,
    skip: bool,
}

impl Domain {
    /// Load run `run_id` from `store`.
    ///
    /// Every input listed in the dataset metadata must be present;
    /// labels are loaded when the run has them. Inputs stored in
    /// physical units are standardized here. Heat pumps are located on
    /// the identifier channel as stored, before any standardization.
    pub fn load(
        store: &dyn RunStore,
        run_id: &str,
        ctx: Arc<DatasetContext>,
    ) -> Result<Self, DomainError> {
        let stack = store.load(run_id, Category::Inputs)?;
        let extent = Extent::new(stack.spatial_shape())?;
        let info = ctx.info();
        if let Some(dims) = &info.dimensions {
            check_grid(run_id, "metadata", extent.dims(), dims)?;
        }

        let marker = stack
            .channel(ctx.marker_channel())
            .ok_or_else(|| DomainError::MissingChannel {
                run_id: run_id.to_string(),
                channel: ctx.marker_channel().to_string(),
            })?
            .to_vec();

        let standardize = !info.normalized;
        let fields = fields_from(
            run_id,
            &stack,
            &info.input_names(),
            ctx.input_table(),
            standardize,
        )?;
        for channel in ctx.model_inputs() {
            if !fields.contains_key(channel) {
                return Err(DomainError::MissingChannel {
                    run_id: run_id.to_string(),
                    channel: channel.clone(),
                });
            }
        }

        let labels = if store.contains(run_id, Category::Labels) {
            let stack = store.load(run_id, Category::Labels)?;
            check_grid(run_id, "labels", extent.dims(), stack.spatial_shape())?;
            Some(fields_from(
                run_id,
                &stack,
                &info.label_names(),
                ctx.label_table(),
                standardize,
            )?)
        } else {
            None
        };

        let mut domain = Self {
            run_id: run_id.to_string(),
            ctx,
            extent,
            fields,
            labels,
            marker,
            locations: Vec::new(),
            skip: false,
        };
        domain.locate_heat_pumps()?;
        debug!(
            run_id,
            heat_pumps = domain.locations.len(),
            skip = domain.skip,
            "domain loaded"
        );
        Ok(domain)
    }

    /// Scan the identifier channel for heat pumps.
    ///
    /// Returns one coordinate per connected marked region in row-major
    /// order of the region's first cell. Finding none sets the skip flag.
    pub fn locate_heat_pumps(&mut self) -> Result<Vec<Coord>, DomainError> {
        let locations = locate_markers(&self.extent, &self.marker, self.ctx.marker_rule())?;
        self.skip = locations.is_empty();
        self.locations = locations.clone();
        Ok(locations)
    }

    /// Cut one box per heat pump.
    ///
    /// If any box would leave the grid the run is marked skipped, a
    /// warning is logged and no box is returned.
    pub fn extract_hp_boxes(&mut self) -> Result<Vec<HeatPumpBox>, DomainError> {
        if self.skip {
            return Ok(Vec::new());
        }

        let mut windows = Vec::with_capacity(self.locations.len());
        for location in &self.locations {
            let window = self.ctx.window().window_at(location)?;
            match window.check_within(&self.extent) {
                Ok(()) => windows.push(window),
                Err(e @ SpaceError::OutOfBounds { .. }) => {
                    warn!(run_id = %self.run_id, error = %e, "heat-pump box leaves the domain, skipping run");
                    self.skip = true;
                    return Ok(Vec::new());
                }
                Err(e) => return Err(e.into()),
            }
        }

        let background = self.ctx.stitcher().background();
        let mut boxes = Vec::with_capacity(windows.len());
        for (index, (location, window)) in self.locations.iter().zip(windows).enumerate() {
            let mut channels = Vec::with_capacity(self.ctx.model_inputs().len());
            for name in self.ctx.model_inputs() {
                let field = self.field(name).ok_or_else(|| DomainError::MissingChannel {
                    run_id: self.run_id.clone(),
                    channel: name.clone(),
                })?;
                channels.push(window.gather(&self.extent, field.values())?);
            }
            let refs: Vec<&[f32]> = channels.iter().map(Vec::as_slice).collect();
            let inputs = Tensor::stack(&refs, window.shape())?;

            let label = match &self.labels {
                Some(labels) => {
                    let mut named = Vec::with_capacity(labels.len());
                    for (name, field) in labels {
                        named.push((name.clone(), window.gather(&self.extent, field.values())?));
                    }
                    let pairs: Vec<(&str, &[f32])> = named
                        .iter()
                        .map(|(n, v)| (n.as_str(), v.as_slice()))
                        .collect();
                    Some(ChannelStack::from_channels(&pairs, window.shape())?)
                }
                None => None,
            };

            boxes.push(HeatPumpBox::new(
                index,
                location.clone(),
                window,
                inputs,
                label,
                background,
            ));
        }
        Ok(boxes)
    }

    /// Standardize `field` with the label statistics of `property`.
    pub fn norm(&self, mut field: PhysicalField, property: &str) -> Result<PhysicalField, NormError> {
        let stats = self.ctx.label_table().require(property)?;
        normalize(&mut field, stats)?;
        Ok(field)
    }

    /// Return `field` to physical units with the label statistics of
    /// `property`.
    pub fn reverse_norm(
        &self,
        mut field: PhysicalField,
        property: &str,
    ) -> Result<PhysicalField, NormError> {
        let stats = self.ctx.label_table().require(property)?;
        denormalize(&mut field, stats)?;
        Ok(field)
    }

    /// The run identifier.
    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    /// Grid dimensions.
    pub fn extent(&self) -> &Extent {
        &self.extent
    }

    /// Edge length of one cell, from the dataset metadata.
    pub fn cell_size(&self) -> Option<f64> {
        self.ctx.info().cell_size
    }

    /// Standardized input fields keyed by quantity id, in channel order.
    pub fn fields(&self) -> &IndexMap<String, PhysicalField> {
        &self.fields
    }

    /// One input field.
    pub fn field(&self, id: &str) -> Option<&PhysicalField> {
        self.fields.get(id)
    }

    /// Standardized label fields, if the run has labels.
    pub fn labels(&self) -> Option<&IndexMap<String, PhysicalField>> {
        self.labels.as_ref()
    }

    /// Heat-pump locations found by the last scan.
    pub fn locations(&self) -> &[Coord] {
        &self.locations
    }

    /// Whether this run contributes no output.
    pub fn is_skipped(&self) -> bool {
        self.skip
    }

    /// Shared dataset state.
    pub fn context(&self) -> &DatasetContext {
        &self.ctx
    }
}
