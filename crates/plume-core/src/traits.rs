//! The inference seam through which stage-1 models are consumed.

use crate::error::InferenceError;
use crate::tensor::Tensor;

/// A fixed-shape tensor-to-tensor inference function.
///
/// Implemented by whatever backend hosts the stage-1 network. The input
/// is a `[channels, *window_shape]` tensor in standardized units; the
/// output is `[1, *window_shape]` (or `window_shape`) in standardized
/// units. Implementations must be deterministic for identical inputs
/// and safe to call from several worker threads at once.
pub trait InferenceModel: Send + Sync {
    /// Identifier recorded in the measurements document.
    fn name(&self) -> &str;

    /// Run the model on one box input.
    fn infer(&self, input: &Tensor) -> Result<Tensor, InferenceError>;
}
