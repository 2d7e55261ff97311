//! Spatial structure of simulation grids.
//!
//! This crate knows nothing about physical quantities: it works on
//! integer coordinates and flat row-major buffers.
//!
//! - [`Extent`]: the dimensions of a full simulation grid, with
//!   canonical (row-major) rank arithmetic.
//! - [`WindowSpec`] / [`Window`]: fixed-size boxes placed around a heat
//!   pump, with intersection, gather and reprojection between frames.
//! - [`locate_markers`]: turns an identifier channel into one
//!   coordinate per connected marked region.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod error;
pub mod extent;
pub mod locate;
pub mod window;

pub use error::SpaceError;
pub use extent::Extent;
pub use locate::{locate_markers, MarkerRule};
pub use window::{Window, WindowAnchor, WindowSpec};
