//! Standardization of physical quantities.
//!
//! Statistics are fitted once per quantity over a training dataset
//! ([`fit`], [`StatsAccumulator`]), stored in a read-only [`NormTable`],
//! and applied unchanged to every later run with [`normalize`] and
//! [`denormalize`]. Refitting at preparation time would silently break
//! the round trip between the units a model was trained on and the
//! units it is fed, so nothing here mutates a table after construction.
//!
//! A process may additionally install one table in [`global`] at
//! startup and share it read-only with every worker.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod accumulate;
pub mod error;
pub mod global;
pub mod normalize;
pub mod table;

pub use accumulate::{fit, StatsAccumulator};
pub use error::NormError;
pub use normalize::{denormalize, denormalize_values, normalize, normalize_values};
pub use plume_core::NormStats;
pub use table::NormTable;
