//! Cell-wise reduction of masked layers.

use smallvec::SmallVec;

use crate::error::StitchError;
use crate::method::StitchMethod;

/// One contribution to a stitched field: values over the target grid
/// plus an optional validity mask (`1` = valid, `0` = not covered).
///
/// Without a mask every cell is valid.
#[derive(Clone, Copy, Debug)]
pub struct Layer<'a> {
    values: &'a [f32],
    mask: Option<&'a [u8]>,
}

impl<'a> Layer<'a> {
    /// A fully valid layer.
    pub fn dense(values: &'a [f32]) -> Self {
        Self { values, mask: None }
    }

    /// A layer valid only where `mask == 1`.
    pub fn masked(values: &'a [f32], mask: &'a [u8]) -> Self {
        Self {
            values,
            mask: Some(mask),
        }
    }

    /// Layer values.
    pub fn values(&self) -> &'a [f32] {
        self.values
    }

    fn is_valid(&self, i: usize) -> bool {
        self.mask.is_none_or(|m| m[i] == 1)
    }
}

fn check_lengths(layers: &[Layer<'_>], len: usize) -> Result<(), StitchError> {
    for (layer, l) in layers.iter().enumerate() {
        let mask_len = l.mask.map_or(len, <[u8]>::len);
        for got in [l.values.len(), mask_len] {
            if got != len {
                return Err(StitchError::LayerLength {
                    layer,
                    expected: len,
                    got,
                });
            }
        }
    }
    Ok(())
}

/// Reduce `layers` cell by cell over `len` cells.
///
/// Each cell combines the valid layer values at that cell together
/// with `background`, so a cell no layer covers takes the background.
/// NaN contributions are ignored by `Max` and `Min`. Contributions are
/// sorted with [`f32::total_cmp`] first, so the result is bit-identical
/// for any permutation of `layers`.
pub fn reduce_layers(
    method: StitchMethod,
    background: f32,
    layers: &[Layer<'_>],
    len: usize,
) -> Result<Vec<f32>, StitchError> {
    if !background.is_finite() {
        return Err(StitchError::NonFiniteBackground);
    }
    check_lengths(layers, len)?;

    let mut out = Vec::with_capacity(len);
    let mut contributions: SmallVec<[f32; 8]> = SmallVec::new();
    for i in 0..len {
        contributions.clear();
        contributions.push(background);
        for layer in layers {
            if !layer.is_valid(i) {
                continue;
            }
            let v = layer.values[i];
            if v.is_nan() && method != StitchMethod::Mean {
                continue;
            }
            contributions.push(v);
        }
        contributions.sort_unstable_by(f32::total_cmp);
        // Never empty: the background is always present.
        let reduced = match method {
            StitchMethod::Max => contributions[contributions.len() - 1],
            StitchMethod::Min => contributions[0],
            StitchMethod::Mean => {
                let sum: f64 = contributions.iter().map(|&v| v as f64).sum();
                (sum / contributions.len() as f64) as f32
            }
        };
        out.push(reduced);
    }
    Ok(out)
}

/// The configured merge used while preparing stage-2 data.
///
/// Stateless and `Copy`; share it freely across workers.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Stitcher {
    method: StitchMethod,
    background: f32,
}

impl Default for Stitcher {
    /// `max` over a background of `0.0`.
    fn default() -> Self {
        Self {
            method: StitchMethod::Max,
            background: 0.0,
        }
    }
}

impl Stitcher {
    /// Create a stitcher.
    ///
    /// Only `(StitchMethod::Max, 0.0)` is accepted; every other
    /// combination fails with [`StitchError::UnsupportedConfig`].
    pub fn new(method: StitchMethod, background: f32) -> Result<Self, StitchError> {
        if method != StitchMethod::Max || background != 0.0 {
            return Err(StitchError::UnsupportedConfig { method, background });
        }
        Ok(Self { method, background })
    }

    /// The reduction method.
    pub fn method(&self) -> StitchMethod {
        self.method
    }

    /// Value of cells no layer covers.
    pub fn background(&self) -> f32 {
        self.background
    }

    /// Merge `layers` over `len` cells; see [`reduce_layers`].
    pub fn merge(&self, layers: &[Layer<'_>], len: usize) -> Result<Vec<f32>, StitchError> {
        reduce_layers(self.method, self.background, layers, len)
    }

    /// Merge two fully valid channels into one.
    ///
    /// Every cell has two contributors, so the background takes no part.
    pub fn merge_pair(&self, a: &[f32], b: &[f32]) -> Result<Vec<f32>, StitchError> {
        if a.len() != b.len() {
            return Err(StitchError::LayerLength {
                layer: 1,
                expected: a.len(),
                got: b.len(),
            });
        }
        let mut out = Vec::with_capacity(a.len());
        for (&x, &y) in a.iter().zip(b) {
            let v = match (x.is_nan(), y.is_nan()) {
                (true, true) => f32::NAN,
                (true, false) => y,
                (false, true) => x,
                (false, false) => match self.method {
                    StitchMethod::Max => x.max(y),
                    StitchMethod::Min => x.min(y),
                    StitchMethod::Mean => ((x as f64 + y as f64) / 2.0) as f32,
                },
            };
            out.push(v);
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn max0() -> Stitcher {
        Stitcher::new(StitchMethod::Max, 0.0).unwrap()
    }

    #[test]
    fn only_max_zero_is_supported() {
        assert!(Stitcher::new(StitchMethod::Max, 0.0).is_ok());
        assert_eq!(
            Stitcher::new(StitchMethod::Mean, 0.0),
            Err(StitchError::UnsupportedConfig {
                method: StitchMethod::Mean,
                background: 0.0
            })
        );
        assert!(matches!(
            Stitcher::new(StitchMethod::Max, 10.6),
            Err(StitchError::UnsupportedConfig { .. })
        ));
    }

    #[test]
    fn uncovered_cells_take_background() {
        let v = [5.0, 5.0, 5.0];
        let m = [1, 0, 1];
        let out = max0().merge(&[Layer::masked(&v, &m)], 3).unwrap();
        assert_eq!(out, vec![5.0, 0.0, 5.0]);
        assert_eq!(max0().merge(&[], 2).unwrap(), vec![0.0, 0.0]);
    }

    #[test]
    fn overlap_strip_takes_max() {
        // Two plumes overlapping in a 2-cell strip.
        let a = [1.0, 3.0, 2.0, 0.0];
        let am = [1, 1, 1, 0];
        let b = [0.0, 1.0, 4.0, 2.0];
        let bm = [0, 1, 1, 1];
        let out = max0()
            .merge(&[Layer::masked(&a, &am), Layer::masked(&b, &bm)], 4)
            .unwrap();
        assert_eq!(out, vec![1.0, 3.0, 4.0, 2.0]);
    }

    #[test]
    fn nan_skipped_for_max_and_min() {
        let v = [f32::NAN, 2.0];
        let out = reduce_layers(StitchMethod::Max, 0.0, &[Layer::dense(&v)], 2).unwrap();
        assert_eq!(out, vec![0.0, 2.0]);
        let out = reduce_layers(StitchMethod::Min, 1.0, &[Layer::dense(&v)], 2).unwrap();
        assert_eq!(out, vec![1.0, 1.0]);
        let out = reduce_layers(StitchMethod::Mean, 0.0, &[Layer::dense(&v)], 2).unwrap();
        assert!(out[0].is_nan());
        assert_eq!(out[1], 1.0);
    }

    #[test]
    fn mean_includes_background() {
        let a = [3.0];
        let b = [6.0];
        let out =
            reduce_layers(StitchMethod::Mean, 0.0, &[Layer::dense(&a), Layer::dense(&b)], 1)
                .unwrap();
        assert_eq!(out, vec![3.0]);
    }

    #[test]
    fn length_mismatch_rejected() {
        let v = [1.0, 2.0];
        let m = [1u8];
        assert!(matches!(
            max0().merge(&[Layer::masked(&v, &m)], 2),
            Err(StitchError::LayerLength { layer: 0, got: 1, .. })
        ));
        assert!(matches!(
            max0().merge(&[Layer::dense(&v)], 3),
            Err(StitchError::LayerLength { .. })
        ));
        assert!(matches!(
            reduce_layers(StitchMethod::Max, f32::NAN, &[], 0),
            Err(StitchError::NonFiniteBackground)
        ));
    }

    #[test]
    fn merge_pair_is_elementwise_max() {
        let out = max0()
            .merge_pair(&[-1.0, 2.0, f32::NAN], &[-3.0, 1.0, 5.0])
            .unwrap();
        assert_eq!(out, vec![-1.0, 2.0, 5.0]);
    }

    proptest! {
        #[test]
        fn order_independent(
            layers in prop::collection::vec(
                prop::collection::vec((-50.0f32..50.0, 0u8..2), 6),
                0..6,
            ),
            method in prop_oneof![
                Just(StitchMethod::Max),
                Just(StitchMethod::Min),
                Just(StitchMethod::Mean),
            ],
        ) {
            let values: Vec<Vec<f32>> =
                layers.iter().map(|l| l.iter().map(|p| p.0).collect()).collect();
            let masks: Vec<Vec<u8>> =
                layers.iter().map(|l| l.iter().map(|p| p.1).collect()).collect();
            let forward: Vec<Layer<'_>> = values
                .iter()
                .zip(&masks)
                .map(|(v, m)| Layer::masked(v, m))
                .collect();
            let mut backward = forward.clone();
            backward.reverse();

            let a = reduce_layers(method, 0.0, &forward, 6).unwrap();
            let b = reduce_layers(method, 0.0, &backward, 6).unwrap();
            let a_bits: Vec<u32> = a.iter().map(|v| v.to_bits()).collect();
            let b_bits: Vec<u32> = b.iter().map(|v| v.to_bits()).collect();
            prop_assert_eq!(a_bits, b_bits);
        }
    }
}
