//! Plume: second-stage training-data preparation for groundwater
//! heat-pump surrogates.
//!
//! This is the top-level facade crate that re-exports the public API from
//! all Plume sub-crates. For most users, adding `plume` as a single
//! dependency is sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use plume::prelude::*;
//! use plume::store::VariableInfo;
//!
//! // A model that predicts the standardized mean everywhere.
//! struct Flat;
//! impl InferenceModel for Flat {
//!     fn name(&self) -> &str { "flat" }
//!     fn infer(&self, input: &Tensor) -> Result<Tensor, InferenceError> {
//!         let mut shape = vec![1];
//!         shape.extend_from_slice(input.spatial_shape());
//!         Ok(Tensor::filled(&shape, 0.0))
//!     }
//! }
//!
//! let dir = tempfile::tempdir().unwrap();
//! let source = DirStore::create(dir.path().join("raw")).unwrap();
//! let mut info = DatasetInfo { normalized: true, ..DatasetInfo::default() };
//! info.inputs.insert("Material_ID".into(), VariableInfo::new(0, NormStats::new(0.0, 1.0)));
//! info.labels.insert("Temperature [C]".into(), VariableInfo::new(0, NormStats::new(10.6, 0.4)));
//! source.save_info(&info).unwrap();
//!
//! // One heat pump in the middle of a 20x20 grid.
//! let mut ids = vec![1.0f32; 400];
//! ids[10 * 20 + 10] = 2.0;
//! let run = ChannelStack::from_channels(&[("Material_ID", ids.as_slice())], &[20, 20]).unwrap();
//! source.save("RUN_0", Category::Inputs, &run).unwrap();
//!
//! let prepared = Arc::new(DirStore::create(dir.path().join("prepared")).unwrap());
//! let config = PrepareConfig { window_shape: vec![8, 8], ..PrepareConfig::default() };
//! let report = prepare_dataset(&config, Arc::new(source), prepared.clone(), Arc::new(Flat)).unwrap();
//! assert_eq!(report.boxes(), 1);
//! assert_eq!(prepared.list_runs().unwrap(), ["RUN_0_0"]);
//! ```
//!
//! # Modules
//!
//! Each module corresponds to a sub-crate. Use them for types not in the prelude:
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `plume-core` | Quantity keys, fields, tensors, the inference trait |
//! | [`space`] | `plume-space` | Grid extents, windows, heat-pump location |
//! | [`norm`] | `plume-norm` | Standardization and statistics tables |
//! | [`stitch`] | `plume-stitch` | Merging overlapping predictions |
//! | [`store`] | `plume-store` | Run stores, the stack codec, dataset documents |
//! | [`engine`] | `plume-engine` | Domains, boxes and the preparation pipeline |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Core types and traits (`plume-core`).
///
/// Contains [`types::QuantityKey`], [`types::PhysicalField`],
/// [`types::Tensor`] and the [`types::InferenceModel`] trait.
pub use plume_core as types;

/// Grid geometry (`plume-space`).
///
/// [`space::WindowSpec`] places fixed-size windows around heat pumps
/// found by [`space::locate_markers`].
pub use plume_space as space;

/// Standardization (`plume-norm`).
pub use plume_norm as norm;

/// Stitching of overlapping predictions (`plume-stitch`).
pub use plume_stitch as stitch;

/// Persistence (`plume-store`).
///
/// [`store::DirStore`] keeps runs as checksummed stack files next to
/// `info.json` and `measurements.json`.
pub use plume_store as store;

/// The preparation pipeline (`plume-engine`).
pub use plume_engine as engine;

/// Common imports for typical Plume usage.
///
/// ```rust
/// use plume::prelude::*;
/// ```
pub mod prelude {
    // Core types and traits
    pub use plume_core::{InferenceModel, NormStats, PhysicalField, QuantityKey, Tensor};

    // Errors
    pub use plume_core::{FieldError, InferenceError};
    pub use plume_engine::{ConfigError, DomainError, PrepareError};
    pub use plume_store::StoreError;

    // Geometry and stitching
    pub use plume_space::{MarkerRule, WindowAnchor};
    pub use plume_stitch::StitchMethod;

    // Storage
    pub use plume_store::{Category, ChannelStack, DatasetInfo, DirStore, RunStore};

    // Pipeline
    pub use plume_engine::{
        fit_dataset_info, merge_separate_inputs, prepare_dataset, PrepareConfig, PrepareReport,
        RunOutcome,
    };
}
