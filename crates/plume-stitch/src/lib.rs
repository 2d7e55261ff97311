//! Stitching of overlapping per-box predictions.
//!
//! Each heat-pump box sees the temperature plumes of its neighbours as
//! [`Layer`]s reprojected into its own frame. A [`Stitcher`] collapses
//! those layers cell by cell into one field. The result never depends
//! on the order the layers are given in.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod error;
pub mod method;
pub mod stitcher;

pub use error::StitchError;
pub use method::StitchMethod;
pub use stitcher::{reduce_layers, Layer, Stitcher};
