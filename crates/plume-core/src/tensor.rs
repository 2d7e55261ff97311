//! Dense row-major `f32` tensors.

use crate::error::FieldError;
use crate::id::{element_count, Shape};

/// A dense, row-major `f32` array with an explicit shape.
///
/// Multi-channel tensors put the channel axis first:
/// `[channels, *spatial]`. This is the layout exchanged with inference
/// backends and persisted by the store.
#[derive(Clone, Debug, PartialEq)]
pub struct Tensor {
    shape: Shape,
    data: Vec<f32>,
}

impl Tensor {
    /// Wrap `data` with `shape`, checking the element count.
    pub fn new(shape: &[usize], data: Vec<f32>) -> Result<Self, FieldError> {
        let shape = Shape::from_slice(shape);
        let expected = element_count(&shape);
        if data.len() != expected {
            return Err(FieldError::ShapeMismatch {
                expected,
                got: data.len(),
            });
        }
        Ok(Self { shape, data })
    }

    /// A tensor of the given shape filled with `value`.
    pub fn filled(shape: &[usize], value: f32) -> Self {
        let shape = Shape::from_slice(shape);
        let data = vec![value; element_count(&shape)];
        Self { shape, data }
    }

    /// Stack equally-sized channels into a `[n, *spatial]` tensor.
    pub fn stack(channels: &[&[f32]], spatial: &[usize]) -> Result<Self, FieldError> {
        let per_channel = element_count(spatial);
        let mut data = Vec::with_capacity(per_channel * channels.len());
        for channel in channels {
            if channel.len() != per_channel {
                return Err(FieldError::ShapeMismatch {
                    expected: per_channel,
                    got: channel.len(),
                });
            }
            data.extend_from_slice(channel);
        }
        let mut shape = Shape::with_capacity(spatial.len() + 1);
        shape.push(channels.len());
        shape.extend_from_slice(spatial);
        Ok(Self { shape, data })
    }

    /// Shape, outermost axis first.
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// Number of axes.
    pub fn rank(&self) -> usize {
        self.shape.len()
    }

    /// Flat row-major data.
    pub fn data(&self) -> &[f32] {
        &self.data
    }

    /// Mutable flat row-major data.
    pub fn data_mut(&mut self) -> &mut [f32] {
        &mut self.data
    }

    /// Consume the tensor, returning its buffer.
    pub fn into_data(self) -> Vec<f32> {
        self.data
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns `true` if the tensor holds no elements.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Size of the leading (channel) axis; 0 for a scalar.
    pub fn channel_count(&self) -> usize {
        self.shape.first().copied().unwrap_or(0)
    }

    /// Shape with the leading channel axis removed.
    pub fn spatial_shape(&self) -> &[usize] {
        self.shape.get(1..).unwrap_or(&[])
    }

    /// Slice of channel `index` along the leading axis.
    pub fn channel(&self, index: usize) -> Result<&[f32], FieldError> {
        let count = self.channel_count();
        if index >= count {
            return Err(FieldError::ChannelOutOfRange { index, count });
        }
        let per_channel = element_count(self.spatial_shape());
        Ok(&self.data[index * per_channel..(index + 1) * per_channel])
    }
}
