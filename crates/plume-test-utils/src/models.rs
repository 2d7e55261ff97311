//! Mock inference models.
//!
//! - [`IdentityModel`]: returns one input channel unchanged.
//! - [`ConstantModel`]: returns a constant field.
//! - [`FailingModel`]: fails deterministically after N calls.
//! - [`FnModel`]: wraps a closure.

use std::sync::atomic::{AtomicUsize, Ordering};

use plume_core::{InferenceError, InferenceModel, Tensor};

fn single_channel_shape(input: &Tensor) -> Vec<usize> {
    let mut shape = Vec::with_capacity(input.rank());
    shape.push(1);
    shape.extend_from_slice(input.spatial_shape());
    shape
}

/// Returns input channel `channel` as a `[1, *spatial]` tensor.
pub struct IdentityModel {
    pub channel: usize,
}

impl IdentityModel {
    pub fn new(channel: usize) -> Self {
        Self { channel }
    }
}

impl InferenceModel for IdentityModel {
    fn name(&self) -> &str {
        "identity"
    }

    fn infer(&self, input: &Tensor) -> Result<Tensor, InferenceError> {
        let values = input
            .channel(self.channel)
            .map_err(|e| InferenceError::ExecutionFailed {
                reason: e.to_string(),
            })?;
        Tensor::new(&single_channel_shape(input), values.to_vec()).map_err(|e| {
            InferenceError::ExecutionFailed {
                reason: e.to_string(),
            }
        })
    }
}

/// Returns `value` everywhere, shaped `[1, *spatial]`.
pub struct ConstantModel {
    pub value: f32,
}

impl ConstantModel {
    pub fn new(value: f32) -> Self {
        Self { value }
    }
}

impl InferenceModel for ConstantModel {
    fn name(&self) -> &str {
        "constant"
    }

    fn infer(&self, input: &Tensor) -> Result<Tensor, InferenceError> {
        Ok(Tensor::filled(&single_channel_shape(input), self.value))
    }
}

/// Succeeds `succeed_count` times with zeros, then fails every call.
pub struct FailingModel {
    succeed_count: usize,
    calls: AtomicUsize,
}

impl FailingModel {
    pub fn new(succeed_count: usize) -> Self {
        Self {
            succeed_count,
            calls: AtomicUsize::new(0),
        }
    }

    /// Calls made so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl InferenceModel for FailingModel {
    fn name(&self) -> &str {
        "failing"
    }

    fn infer(&self, input: &Tensor) -> Result<Tensor, InferenceError> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst);
        if n >= self.succeed_count {
            return Err(InferenceError::ExecutionFailed {
                reason: format!("failing after {} calls", self.succeed_count),
            });
        }
        Ok(Tensor::filled(&single_channel_shape(input), 0.0))
    }
}

type InferFn = dyn Fn(&Tensor) -> Result<Tensor, InferenceError> + Send + Sync;

/// Delegates to a closure.
pub struct FnModel {
    name: String,
    f: Box<InferFn>,
}

impl FnModel {
    pub fn new(
        name: impl Into<String>,
        f: impl Fn(&Tensor) -> Result<Tensor, InferenceError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            f: Box::new(f),
        }
    }
}

impl InferenceModel for FnModel {
    fn name(&self) -> &str {
        &self.name
    }

    fn infer(&self, input: &Tensor) -> Result<Tensor, InferenceError> {
        (self.f)(input)
    }
}
