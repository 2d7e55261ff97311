//! Persistence for Plume datasets.
//!
//! A dataset is a directory of runs. Every run has an `Inputs` channel
//! stack and optionally a `Labels` stack, each stored in a small binary
//! format; the dataset carries one `info.json` describing its variables
//! and a `measurements.json` written by the last preparation.
//!
//! # Architecture
//!
//! - [`RunStore`] is the seam the engine works against
//! - [`DirStore`] stores runs on disk; tests use an in-memory store
//! - [`codec`] encodes a [`ChannelStack`] as bytes
//! - [`DatasetInfo`] and [`Measurements`] are JSON documents
//!
//! # Format
//!
//! ```text
//! [MAGIC "PLUM"] [VERSION u8]
//! [channel count u32] [name]*   (u32 length + UTF-8 bytes)
//! [rank u32] [dim u32]*
//! [payload f32*]                (row-major, little-endian)
//! [FNV-1a checksum u64]
//! ```

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod codec;
pub mod dir;
pub mod error;
pub mod hash;
pub mod info;
pub mod measurements;
pub mod store;

pub use codec::{decode_stack, encode_stack};
pub use dir::DirStore;
pub use error::StoreError;
pub use hash::payload_hash;
pub use info::{DatasetInfo, VariableInfo};
pub use measurements::{timestamp_now, Measurements, RunTiming};
pub use store::{Category, ChannelStack, RunStore};

/// Magic bytes at the start of every channel-stack file.
pub const MAGIC: [u8; 4] = *b"PLUM";

/// Current binary format version.
pub const FORMAT_VERSION: u8 = 1;

/// File extension of channel-stack files.
pub const STACK_EXTENSION: &str = "plm";
