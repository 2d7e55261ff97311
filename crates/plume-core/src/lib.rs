//! Core types and traits for Plume dataset preparation.
//!
//! This is the leaf crate with zero internal dependencies. It defines
//! the vocabulary shared by every other Plume crate: quantity keys with
//! parsed units, dense tensors, unit-tagged physical fields, the
//! normalization statistics pair, error types, and the inference trait
//! through which stage-1 models are consumed.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod error;
pub mod field;
pub mod id;
pub mod quantity;
pub mod stats;
pub mod tensor;
pub mod traits;

pub use error::{FieldError, InferenceError};
pub use field::PhysicalField;
pub use id::{element_count, Coord, Shape};
pub use quantity::{names_without_unit, QuantityKey};
pub use stats::NormStats;
pub use tensor::Tensor;
pub use traits::InferenceModel;
