//! The run-store seam and the data it moves.

use std::fmt;

use plume_core::{FieldError, Tensor};
use serde::{Deserialize, Serialize};

use crate::error::StoreError;
use crate::info::DatasetInfo;
use crate::measurements::Measurements;

/// Which half of a training pair a stack belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    /// Model inputs.
    Inputs,
    /// Ground-truth targets.
    Labels,
}

impl Category {
    /// Directory name used on disk.
    pub fn dir_name(&self) -> &'static str {
        match self {
            Self::Inputs => "Inputs",
            Self::Labels => "Labels",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dir_name())
    }
}

/// Named channels over a shared grid: a `[C, *spatial]` tensor plus one
/// name per channel.
#[derive(Clone, Debug, PartialEq)]
pub struct ChannelStack {
    channels: Vec<String>,
    tensor: Tensor,
}

impl ChannelStack {
    /// Pair `channels` with `tensor`.
    ///
    /// The tensor's leading axis must have one entry per name, and
    /// names must be unique.
    pub fn new(channels: Vec<String>, tensor: Tensor) -> Result<Self, FieldError> {
        if tensor.rank() < 2 || tensor.channel_count() != channels.len() {
            return Err(FieldError::ShapeMismatch {
                expected: channels.len(),
                got: tensor.channel_count(),
            });
        }
        for (i, name) in channels.iter().enumerate() {
            if channels[..i].contains(name) {
                return Err(FieldError::MalformedQuantity {
                    id: name.clone(),
                    reason: "duplicate channel name".into(),
                });
            }
        }
        Ok(Self { channels, tensor })
    }

    /// Build a stack from `(name, values)` pairs over `spatial`.
    pub fn from_channels(
        named: &[(&str, &[f32])],
        spatial: &[usize],
    ) -> Result<Self, FieldError> {
        let values: Vec<&[f32]> = named.iter().map(|(_, v)| *v).collect();
        let tensor = Tensor::stack(&values, spatial)?;
        Self::new(named.iter().map(|(n, _)| n.to_string()).collect(), tensor)
    }

    /// Channel names in tensor order.
    pub fn channels(&self) -> &[String] {
        &self.channels
    }

    /// The underlying `[C, *spatial]` tensor.
    pub fn tensor(&self) -> &Tensor {
        &self.tensor
    }

    /// Grid shape shared by all channels.
    pub fn spatial_shape(&self) -> &[usize] {
        self.tensor.spatial_shape()
    }

    /// Position of `name`, if present.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.channels.iter().position(|c| c == name)
    }

    /// Values of channel `name`, if present.
    pub fn channel(&self, name: &str) -> Option<&[f32]> {
        let i = self.index_of(name)?;
        self.tensor.channel(i).ok()
    }

    /// Values of channel `index`.
    pub fn channel_at(&self, index: usize) -> Result<&[f32], FieldError> {
        self.tensor.channel(index)
    }

    /// Split into names and tensor.
    pub fn into_parts(self) -> (Vec<String>, Tensor) {
        (self.channels, self.tensor)
    }
}

/// Where runs and dataset documents live.
///
/// Implementations are shared by all workers of a preparation, so they
/// must be `Send + Sync`. Concurrent saves always target distinct keys.
pub trait RunStore: Send + Sync {
    /// Human-readable location, recorded in measurements.
    fn location(&self) -> String;

    /// All runs that have `Inputs`, sorted by id.
    fn list_runs(&self) -> Result<Vec<String>, StoreError>;

    /// Whether `run_id` has data of `category`.
    fn contains(&self, run_id: &str, category: Category) -> bool;

    /// Load one stack. A missing stack is [`StoreError::MissingRun`].
    fn load(&self, run_id: &str, category: Category) -> Result<ChannelStack, StoreError>;

    /// Store one stack, replacing any previous one under the same key.
    fn save(&self, run_id: &str, category: Category, stack: &ChannelStack)
        -> Result<(), StoreError>;

    /// Load the dataset's variable metadata.
    fn load_info(&self) -> Result<DatasetInfo, StoreError>;

    /// Replace the dataset's variable metadata.
    fn save_info(&self, info: &DatasetInfo) -> Result<(), StoreError>;

    /// Load the dataset's measurements document, if one was written.
    fn load_measurements(&self) -> Result<Option<Measurements>, StoreError>;

    /// Replace the dataset's measurements document.
    fn save_measurements(&self, measurements: &Measurements) -> Result<(), StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stack_lookup_by_name() {
        let s = ChannelStack::from_channels(
            &[("Pressure [Pa]", &[1.0, 2.0]), ("Temperature [C]", &[3.0, 4.0])],
            &[2],
        )
        .unwrap();
        assert_eq!(s.spatial_shape(), &[2]);
        assert_eq!(s.index_of("Temperature [C]"), Some(1));
        assert_eq!(s.channel("Pressure [Pa]"), Some(&[1.0, 2.0][..]));
        assert_eq!(s.channel("Material_ID"), None);
    }

    #[test]
    fn names_must_match_channels() {
        let t = Tensor::filled(&[2, 3], 0.0);
        assert!(ChannelStack::new(vec!["a".into()], t.clone()).is_err());
        assert!(matches!(
            ChannelStack::new(vec!["a".into(), "a".into()], t),
            Err(FieldError::MalformedQuantity { .. })
        ));
    }
}
