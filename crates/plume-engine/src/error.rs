//! Error types for domains and the preparation pipeline.

use std::error::Error;
use std::fmt;

use plume_core::{FieldError, InferenceError};
use plume_norm::NormError;
use plume_space::SpaceError;
use plume_stitch::StitchError;
use plume_store::StoreError;

use crate::config::ConfigError;

/// Errors raised while loading or cutting up one run.
#[derive(Debug)]
pub enum DomainError {
    /// The run's input stack does not exist.
    MissingRun {
        /// The requested run.
        run_id: String,
    },
    /// A channel required by the metadata or configuration is absent.
    MissingChannel {
        /// The run being loaded.
        run_id: String,
        /// The absent channel.
        channel: String,
    },
    /// A channel's grid differs from the run's grid.
    ShapeMismatch {
        /// The run being loaded.
        run_id: String,
        /// What was being compared.
        what: String,
        /// Grid of the run.
        expected: Vec<usize>,
        /// Grid that was found.
        got: Vec<usize>,
    },
    /// Storage failed for a reason other than a missing run.
    Store(StoreError),
    /// Grid or window arithmetic failed.
    Space(SpaceError),
    /// A field could not be built.
    Field(FieldError),
    /// Standardization failed.
    Norm(NormError),
}

impl fmt::Display for DomainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingRun { run_id } => write!(f, "run '{run_id}' not found"),
            Self::MissingChannel { run_id, channel } => {
                write!(f, "run '{run_id}' has no channel '{channel}'")
            }
            Self::ShapeMismatch {
                run_id,
                what,
                expected,
                got,
            } => write!(
                f,
                "run '{run_id}': {what} has grid {got:?}, expected {expected:?}"
            ),
            Self::Store(e) => write!(f, "store: {e}"),
            Self::Space(e) => write!(f, "space: {e}"),
            Self::Field(e) => write!(f, "field: {e}"),
            Self::Norm(e) => write!(f, "normalization: {e}"),
        }
    }
}

impl Error for DomainError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Store(e) => Some(e),
            Self::Space(e) => Some(e),
            Self::Field(e) => Some(e),
            Self::Norm(e) => Some(e),
            _ => None,
        }
    }
}

impl From<StoreError> for DomainError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::MissingRun { run_id, .. } => Self::MissingRun { run_id },
            other => Self::Store(other),
        }
    }
}

impl From<SpaceError> for DomainError {
    fn from(e: SpaceError) -> Self {
        Self::Space(e)
    }
}

impl From<FieldError> for DomainError {
    fn from(e: FieldError) -> Self {
        Self::Field(e)
    }
}

impl From<NormError> for DomainError {
    fn from(e: NormError) -> Self {
        Self::Norm(e)
    }
}

/// Errors from preparing a dataset.
#[derive(Debug)]
pub enum PrepareError {
    /// The configuration is invalid; nothing was processed.
    Config(ConfigError),
    /// A run could not be loaded or cut into boxes.
    Domain(DomainError),
    /// The inference backend failed or returned the wrong shape.
    Inference(InferenceError),
    /// A box was stitched before every box had a primary prediction.
    PrimaryMissing {
        /// The box lacking its prediction.
        index: usize,
    },
    /// A box was saved before its stitched field was computed.
    OtherMissing {
        /// The box lacking its stitched field.
        index: usize,
    },
    /// Stitching failed.
    Stitch(StitchError),
    /// Standardization failed.
    Norm(NormError),
    /// Reading or writing the dataset failed.
    Store(StoreError),
    /// A tensor or field could not be built.
    Field(FieldError),
    /// A worker thread could not be started.
    ThreadSpawn {
        /// OS error text.
        reason: String,
    },
    /// A worker thread panicked.
    WorkerPanicked,
}

impl fmt::Display for PrepareError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(e) => write!(f, "config: {e}"),
            Self::Domain(e) => write!(f, "domain: {e}"),
            Self::Inference(e) => write!(f, "inference: {e}"),
            Self::PrimaryMissing { index } => {
                write!(f, "box {index} has no primary prediction yet")
            }
            Self::OtherMissing { index } => write!(f, "box {index} has not been stitched yet"),
            Self::Stitch(e) => write!(f, "stitch: {e}"),
            Self::Norm(e) => write!(f, "normalization: {e}"),
            Self::Store(e) => write!(f, "store: {e}"),
            Self::Field(e) => write!(f, "field: {e}"),
            Self::ThreadSpawn { reason } => write!(f, "thread spawn failed: {reason}"),
            Self::WorkerPanicked => write!(f, "a preparation worker panicked"),
        }
    }
}

impl Error for PrepareError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Config(e) => Some(e),
            Self::Domain(e) => Some(e),
            Self::Inference(e) => Some(e),
            Self::Stitch(e) => Some(e),
            Self::Norm(e) => Some(e),
            Self::Store(e) => Some(e),
            Self::Field(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ConfigError> for PrepareError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

impl From<DomainError> for PrepareError {
    fn from(e: DomainError) -> Self {
        Self::Domain(e)
    }
}

impl From<InferenceError> for PrepareError {
    fn from(e: InferenceError) -> Self {
        Self::Inference(e)
    }
}

impl From<StitchError> for PrepareError {
    fn from(e: StitchError) -> Self {
        Self::Stitch(e)
    }
}

impl From<NormError> for PrepareError {
    fn from(e: NormError) -> Self {
        Self::Norm(e)
    }
}

impl From<StoreError> for PrepareError {
    fn from(e: StoreError) -> Self {
        Self::Store(e)
    }
}

impl From<FieldError> for PrepareError {
    fn from(e: FieldError) -> Self {
        Self::Field(e)
    }
}

impl From<SpaceError> for PrepareError {
    fn from(e: SpaceError) -> Self {
        Self::Domain(DomainError::Space(e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use plume_store::Category;

    #[test]
    fn missing_stack_becomes_missing_run() {
        let e: DomainError = StoreError::MissingRun {
            run_id: "RUN_3".into(),
            category: Category::Inputs,
        }
        .into();
        assert!(matches!(e, DomainError::MissingRun { ref run_id } if run_id == "RUN_3"));
    }

    #[test]
    fn source_chain() {
        let e = PrepareError::Norm(NormError::ZeroStd {
            quantity: "Temperature [C]".into(),
        });
        assert!(e.source().is_some());
        assert!(e.to_string().contains("Temperature [C]"));
    }
}
