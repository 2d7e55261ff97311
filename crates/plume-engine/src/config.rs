//! Preparation configuration, validation, and error types.
//!
//! [`PrepareConfig`] is validated once, before any run is touched: a
//! bad window, an unparsable property or an unsupported stitching
//! setup fails the whole preparation up front.

use std::error::Error;
use std::fmt;

use plume_core::{FieldError, QuantityKey};
use plume_space::{MarkerRule, SpaceError, WindowAnchor, WindowSpec};
use plume_stitch::{StitchError, StitchMethod, Stitcher};
use serde::{Deserialize, Serialize};

// ── ConfigError ────────────────────────────────────────────────────

/// Errors detected during [`PrepareConfig::validate()`].
#[derive(Debug, PartialEq)]
pub enum ConfigError {
    /// The window shape or anchor is unusable.
    Window(SpaceError),
    /// The stitching method and background are not a supported pair.
    Stitch(StitchError),
    /// The predicted property is not a valid quantity identifier.
    InvalidProperty(FieldError),
    /// The marker channel name is empty.
    EmptyMarkerChannel,
    /// `model_inputs` was given but lists no channel.
    NoModelInputs,
    /// Job queue capacity is zero.
    QueueCapacityZero,
    /// The window does not fit the dataset's grid: its rank differs or
    /// some axis is longer than the grid.
    WindowExceedsGrid {
        /// Configured window shape.
        window: Vec<usize>,
        /// Grid dimensions of the dataset's runs.
        grid: Vec<usize>,
    },
    /// A configured channel is not among the dataset's inputs.
    UnknownChannel {
        /// The channel name.
        channel: String,
    },
    /// The configuration document could not be parsed.
    Parse {
        /// Parser message.
        reason: String,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Window(e) => write!(f, "window: {e}"),
            Self::Stitch(e) => write!(f, "stitching: {e}"),
            Self::InvalidProperty(e) => write!(f, "property: {e}"),
            Self::EmptyMarkerChannel => write!(f, "marker_channel must not be empty"),
            Self::NoModelInputs => write!(f, "model_inputs must list at least one channel"),
            Self::QueueCapacityZero => write!(f, "job_queue_capacity must be at least 1"),
            Self::WindowExceedsGrid { window, grid } => {
                write!(f, "window {window:?} does not fit grid {grid:?}")
            }
            Self::UnknownChannel { channel } => {
                write!(f, "channel '{channel}' is not an input of the dataset")
            }
            Self::Parse { reason } => write!(f, "cannot parse config: {reason}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Window(e) => Some(e),
            Self::Stitch(e) => Some(e),
            Self::InvalidProperty(e) => Some(e),
            _ => None,
        }
    }
}

impl From<SpaceError> for ConfigError {
    fn from(e: SpaceError) -> Self {
        Self::Window(e)
    }
}

impl From<StitchError> for ConfigError {
    fn from(e: StitchError) -> Self {
        Self::Stitch(e)
    }
}

// ── PrepareConfig ──────────────────────────────────────────────────

/// Settings for a stage-2 preparation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrepareConfig {
    /// Box extent per axis; identical for every box of the dataset.
    /// Default: `[16, 16]`.
    pub window_shape: Vec<usize>,
    /// Where the heat pump sits inside its box. Default: centred.
    pub anchor: WindowAnchor,
    /// Identifier channel marking heat-pump cells. Default: `"Material_ID"`.
    pub marker_channel: String,
    /// Which identifier values are heat pumps. Default: channel maximum.
    pub marker_rule: MarkerRule,
    /// The predicted quantity, looked up in the label statistics.
    /// Default: `"Temperature [C]"`.
    pub property: String,
    /// Input channels fed to the model, in order. `None` = every input
    /// of the dataset in channel order.
    pub model_inputs: Option<Vec<String>>,
    /// Stitching method. Default: `max`.
    pub stitching_method: StitchMethod,
    /// Value where no other box contributes. Default: `0.0`.
    pub background_value: f32,
    /// Number of worker threads. `None` = auto-detect
    /// (`available_parallelism / 2`, clamped to `[1, 16]`).
    pub worker_count: Option<usize>,
    /// Capacity of the bounded job queue. Default: 64.
    pub job_queue_capacity: usize,
}

impl Default for PrepareConfig {
    fn default() -> Self {
        Self {
            window_shape: vec![16, 16],
            anchor: WindowAnchor::Centered,
            marker_channel: "Material_ID".into(),
            marker_rule: MarkerRule::ChannelMax,
            property: "Temperature [C]".into(),
            model_inputs: None,
            stitching_method: StitchMethod::Max,
            background_value: 0.0,
            worker_count: None,
            job_queue_capacity: 64,
        }
    }
}

impl PrepareConfig {
    /// Parse a JSON document; missing keys take their defaults.
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(s).map_err(|e| ConfigError::Parse {
            reason: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Check every setting.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.window_spec()?;
        self.stitcher()?;
        self.property_key()?;
        if self.marker_channel.is_empty() {
            return Err(ConfigError::EmptyMarkerChannel);
        }
        if self.model_inputs.as_ref().is_some_and(Vec::is_empty) {
            return Err(ConfigError::NoModelInputs);
        }
        if self.job_queue_capacity == 0 {
            return Err(ConfigError::QueueCapacityZero);
        }
        Ok(())
    }

    /// Check that the window fits a grid of `dims` cells per axis.
    pub fn check_grid(&self, dims: &[usize]) -> Result<(), ConfigError> {
        let fits = self.window_shape.len() == dims.len()
            && self.window_shape.iter().zip(dims).all(|(w, d)| w <= d);
        if !fits {
            return Err(ConfigError::WindowExceedsGrid {
                window: self.window_shape.clone(),
                grid: dims.to_vec(),
            });
        }
        Ok(())
    }

    /// The validated box specification.
    pub fn window_spec(&self) -> Result<WindowSpec, ConfigError> {
        Ok(WindowSpec::new(&self.window_shape, self.anchor.clone())?)
    }

    /// The validated stitcher.
    pub fn stitcher(&self) -> Result<Stitcher, ConfigError> {
        Ok(Stitcher::new(self.stitching_method, self.background_value)?)
    }

    /// The predicted quantity as a parsed key.
    pub fn property_key(&self) -> Result<QuantityKey, ConfigError> {
        QuantityKey::parse(&self.property).map_err(ConfigError::InvalidProperty)
    }

    /// Resolve the actual worker count, applying auto-detection if `None`.
    ///
    /// Explicit values are clamped to `[1, 64]`.
    pub fn resolved_worker_count(&self) -> usize {
        match self.worker_count {
            Some(n) => n.clamp(1, 64),
            None => {
                let cpus = std::thread::available_parallelism()
                    .map(|n| n.get())
                    .unwrap_or(4);
                (cpus / 2).clamp(1, 16)
            }
        }
    }
}
