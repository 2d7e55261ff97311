//! Unit-tagged physical fields.

use crate::error::FieldError;
use crate::id::{element_count, Shape};
use crate::quantity::QuantityKey;
use crate::stats::NormStats;
use crate::tensor::Tensor;

/// A named, unit-tagged dense array with optional dataset statistics.
///
/// Fields are created when a run is loaded and live only for that run.
/// Normalization rewrites [`values`](Self::values_mut) in place; the key
/// and shape never change. Statistics, once attached, are immutable: a
/// second [`attach_stats`](Self::attach_stats) with a different pair is
/// rejected.
#[derive(Clone, Debug, PartialEq)]
pub struct PhysicalField {
    key: QuantityKey,
    shape: Shape,
    values: Vec<f32>,
    stats: Option<NormStats>,
}

impl PhysicalField {
    /// Create a field, checking that `values` matches `shape`.
    pub fn new(
        key: QuantityKey,
        shape: &[usize],
        values: Vec<f32>,
    ) -> Result<Self, FieldError> {
        let shape = Shape::from_slice(shape);
        let expected = element_count(&shape);
        if values.len() != expected {
            return Err(FieldError::ShapeMismatch {
                expected,
                got: values.len(),
            });
        }
        Ok(Self {
            key,
            shape,
            values,
            stats: None,
        })
    }

    /// A field of the given shape with every cell set to `value`.
    pub fn filled(key: QuantityKey, shape: &[usize], value: f32) -> Self {
        let shape = Shape::from_slice(shape);
        let values = vec![value; element_count(&shape)];
        Self {
            key,
            shape,
            values,
            stats: None,
        }
    }

    /// Build a field from a tensor, taking the tensor's shape.
    pub fn from_tensor(key: QuantityKey, tensor: Tensor) -> Self {
        let shape = Shape::from_slice(tensor.shape());
        Self {
            key,
            shape,
            values: tensor.into_data(),
            stats: None,
        }
    }

    /// The quantity this field holds.
    pub fn key(&self) -> &QuantityKey {
        &self.key
    }

    /// Extent per axis.
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// Number of axes.
    pub fn dim(&self) -> usize {
        self.shape.len()
    }

    /// Number of cells.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns `true` if the field has no cells.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Row-major cell values.
    pub fn values(&self) -> &[f32] {
        &self.values
    }

    /// Mutable row-major cell values.
    pub fn values_mut(&mut self) -> &mut [f32] {
        &mut self.values
    }

    /// Consume the field, returning its buffer.
    pub fn into_values(self) -> Vec<f32> {
        self.values
    }

    /// Attached dataset statistics, if any.
    pub fn stats(&self) -> Option<NormStats> {
        self.stats
    }

    /// Attach dataset statistics.
    ///
    /// Re-attaching the identical pair is a no-op; a different pair is
    /// [`FieldError::StatsConflict`].
    pub fn attach_stats(&mut self, stats: NormStats) -> Result<(), FieldError> {
        match self.stats {
            Some(existing) if existing != stats => Err(FieldError::StatsConflict {
                quantity: self.key.id().to_string(),
            }),
            _ => {
                self.stats = Some(stats);
                Ok(())
            }
        }
    }

    /// The same data under a different quantity key.
    ///
    /// Statistics are kept: relabelling is used for derived channels
    /// (e.g. "Primary Temperature") that share the source quantity's
    /// statistics.
    pub fn relabel(self, key: QuantityKey) -> Self {
        Self { key, ..self }
    }

    /// Minimum and maximum over non-NaN cells, or `None` if there are none.
    pub fn value_range(&self) -> Option<(f32, f32)> {
        self.values
            .iter()
            .copied()
            .filter(|v| !v.is_nan())
            .fold(None, |acc, v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temperature() -> QuantityKey {
        QuantityKey::parse("Temperature [C]").unwrap()
    }

    #[test]
    fn new_validates_shape() {
        assert!(PhysicalField::new(temperature(), &[4, 4], vec![0.0; 16]).is_ok());
        assert!(PhysicalField::new(temperature(), &[4, 4], vec![0.0; 15]).is_err());
    }

    #[test]
    fn stats_are_immutable_once_set() {
        let mut f = PhysicalField::filled(temperature(), &[2, 2], 10.0);
        f.attach_stats(NormStats::new(20.0, 5.0)).unwrap();
        f.attach_stats(NormStats::new(20.0, 5.0)).unwrap();
        assert_eq!(
            f.attach_stats(NormStats::new(21.0, 5.0)),
            Err(FieldError::StatsConflict {
                quantity: "Temperature [C]".into()
            })
        );
        assert_eq!(f.stats(), Some(NormStats::new(20.0, 5.0)));
    }

    #[test]
    fn relabel_keeps_values_and_stats() {
        let mut f = PhysicalField::filled(temperature(), &[3], 1.5);
        f.attach_stats(NormStats::new(1.0, 2.0)).unwrap();
        let g = f.relabel(temperature().with_prefix("Primary"));
        assert_eq!(g.key().id(), "Primary Temperature [C]");
        assert_eq!(g.values(), &[1.5, 1.5, 1.5]);
        assert_eq!(g.stats(), Some(NormStats::new(1.0, 2.0)));
    }

    #[test]
    fn value_range_ignores_nan() {
        let f = PhysicalField::new(temperature(), &[4], vec![3.0, f32::NAN, -1.0, 7.0])
            .unwrap();
        assert_eq!(f.value_range(), Some((-1.0, 7.0)));
        let empty = PhysicalField::new(temperature(), &[0], vec![]).unwrap();
        assert_eq!(empty.value_range(), None);
    }

    #[test]
    fn from_tensor_takes_shape() {
        let t = Tensor::new(&[2, 3], vec![1.0; 6]).unwrap();
        let f = PhysicalField::from_tensor(temperature(), t);
        assert_eq!(f.shape(), &[2, 3]);
        assert_eq!(f.dim(), 2);
    }
}
