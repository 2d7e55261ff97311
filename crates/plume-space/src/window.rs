//! Fixed-size windows ("boxes") placed around heat pumps.
//!
//! A [`WindowSpec`] is configured once per dataset; every heat pump gets
//! a [`Window`] of the same shape, placed relative to its location by
//! its [`WindowAnchor`]. Windows are axis-aligned boxes in the
//! parent grid's integer frame.

use plume_core::{element_count, Coord, Shape};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::error::SpaceError;
use crate::extent::{for_each_index, Extent};

/// Where a heat pump sits inside its window.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WindowAnchor {
    /// The heat pump is at local cell `shape / 2` on every axis.
    Centered,
    /// The heat pump is at the given local cell.
    Offset(Coord),
}

/// Shape and anchoring of every heat-pump window in a dataset.
///
/// # Examples
///
/// ```
/// use plume_space::{WindowAnchor, WindowSpec};
///
/// let spec = WindowSpec::new(&[4, 4], WindowAnchor::Centered).unwrap();
/// let w = spec.window_at(&[5, 5]).unwrap();
/// assert_eq!(w.origin(), &[3, 3]);
/// assert_eq!(w.shape(), &[4, 4]);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowSpec {
    shape: Shape,
    anchor: WindowAnchor,
}

impl WindowSpec {
    /// Validate and build a window specification.
    pub fn new(shape: &[usize], anchor: WindowAnchor) -> Result<Self, SpaceError> {
        let spec = Self {
            shape: Shape::from_slice(shape),
            anchor,
        };
        spec.validate()?;
        Ok(spec)
    }

    /// Check that the shape is non-empty and an offset anchor lies inside it.
    ///
    /// Deserialized specs bypass [`new`](Self::new), so configuration
    /// validation calls this again.
    pub fn validate(&self) -> Result<(), SpaceError> {
        if self.shape.is_empty() || self.shape.contains(&0) {
            return Err(SpaceError::InvalidWindow {
                reason: format!("window shape {:?} has no cells", self.shape),
            });
        }
        if let WindowAnchor::Offset(offset) = &self.anchor {
            if offset.len() != self.shape.len() {
                return Err(SpaceError::DimensionMismatch {
                    expected: self.shape.len(),
                    got: offset.len(),
                });
            }
            let inside = offset
                .iter()
                .zip(&self.shape)
                .all(|(&o, &s)| o >= 0 && (o as usize) < s);
            if !inside {
                return Err(SpaceError::InvalidWindow {
                    reason: format!(
                        "anchor offset {offset:?} lies outside window shape {:?}",
                        self.shape
                    ),
                });
            }
        }
        Ok(())
    }

    /// Window extent per axis.
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// Anchoring rule.
    pub fn anchor(&self) -> &WindowAnchor {
        &self.anchor
    }

    /// Local cell of the heat pump inside every window.
    pub fn anchor_offset(&self) -> Coord {
        match &self.anchor {
            WindowAnchor::Centered => self.shape.iter().map(|&s| (s / 2) as i32).collect(),
            WindowAnchor::Offset(offset) => offset.clone(),
        }
    }

    /// Place a window around a heat pump at `location`.
    ///
    /// The result is not bounds-checked; see [`Window::check_within`].
    pub fn window_at(&self, location: &[i32]) -> Result<Window, SpaceError> {
        if location.len() != self.shape.len() {
            return Err(SpaceError::DimensionMismatch {
                expected: self.shape.len(),
                got: location.len(),
            });
        }
        let offset = self.anchor_offset();
        let origin = location.iter().zip(&offset).map(|(&l, &o)| l - o).collect();
        Ok(Window {
            origin,
            shape: self.shape.clone(),
        })
    }
}

/// An axis-aligned box in a parent grid's integer frame.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Window {
    origin: Coord,
    shape: Shape,
}

impl Window {
    /// Build a window from its minimum corner and extent.
    pub fn new(origin: &[i32], shape: &[usize]) -> Result<Self, SpaceError> {
        if origin.len() != shape.len() {
            return Err(SpaceError::DimensionMismatch {
                expected: shape.len(),
                got: origin.len(),
            });
        }
        Ok(Self {
            origin: Coord::from_slice(origin),
            shape: Shape::from_slice(shape),
        })
    }

    /// Minimum corner (inclusive).
    pub fn origin(&self) -> &[i32] {
        &self.origin
    }

    /// Extent per axis.
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// Number of cells.
    pub fn cell_count(&self) -> usize {
        element_count(&self.shape)
    }

    /// Whether the global coordinate `coord` falls inside the window.
    pub fn contains(&self, coord: &[i32]) -> bool {
        coord.len() == self.origin.len()
            && coord
                .iter()
                .zip(self.origin.iter().zip(&self.shape))
                .all(|(&c, (&o, &s))| c >= o && c < o + s as i32)
    }

    /// Local row-major rank of a global coordinate, if inside.
    pub fn local_rank(&self, coord: &[i32]) -> Option<usize> {
        if !self.contains(coord) {
            return None;
        }
        let mut rank = 0usize;
        for ((&c, &o), &s) in coord.iter().zip(&self.origin).zip(&self.shape) {
            rank = rank * s + (c - o) as usize;
        }
        Some(rank)
    }

    /// Fail with [`SpaceError::OutOfBounds`] unless the window lies
    /// entirely inside `extent`.
    pub fn check_within(&self, extent: &Extent) -> Result<(), SpaceError> {
        if self.origin.len() != extent.ndim() {
            return Err(SpaceError::DimensionMismatch {
                expected: extent.ndim(),
                got: self.origin.len(),
            });
        }
        let inside = self
            .origin
            .iter()
            .zip(&self.shape)
            .zip(extent.dims())
            .all(|((&o, &s), &d)| o >= 0 && o as usize + s <= d);
        if inside {
            Ok(())
        } else {
            Err(SpaceError::OutOfBounds {
                origin: self.origin.clone(),
                shape: self.shape.clone(),
                extent: Shape::from_slice(extent.dims()),
            })
        }
    }

    /// The overlap of two windows, or `None` if they share no cell.
    pub fn intersect(&self, other: &Window) -> Option<Window> {
        if self.origin.len() != other.origin.len() {
            return None;
        }
        let mut origin = Coord::new();
        let mut shape = Shape::new();
        for axis in 0..self.origin.len() {
            let lo = self.origin[axis].max(other.origin[axis]);
            let hi = (self.origin[axis] + self.shape[axis] as i32)
                .min(other.origin[axis] + other.shape[axis] as i32);
            if hi <= lo {
                return None;
            }
            origin.push(lo);
            shape.push((hi - lo) as usize);
        }
        Some(Window { origin, shape })
    }

    /// Copy this window's cells out of a full-grid buffer.
    pub fn gather(&self, extent: &Extent, data: &[f32]) -> Result<Vec<f32>, SpaceError> {
        if data.len() != extent.cell_count() {
            return Err(SpaceError::DataLengthMismatch {
                expected: extent.cell_count(),
                got: data.len(),
            });
        }
        self.check_within(extent)?;
        let mut out = Vec::with_capacity(self.cell_count());
        let mut global: Coord = SmallVec::from_elem(0, self.origin.len());
        for_each_index(&self.shape, |idx| {
            for (axis, &i) in idx.iter().enumerate() {
                global[axis] = self.origin[axis] + i as i32;
            }
            // In bounds: checked above.
            if let Some(rank) = extent.canonical_rank(&global) {
                out.push(data[rank]);
            }
        });
        Ok(out)
    }

    /// Translate `values` laid out over `source` into this window's frame.
    ///
    /// Returns `(values, mask)` of this window's size: cells covered by
    /// `source` carry its value and mask `1`; all other cells are `0.0`
    /// with mask `0`.
    pub fn reproject(
        &self,
        source: &Window,
        values: &[f32],
    ) -> Result<(Vec<f32>, Vec<u8>), SpaceError> {
        if values.len() != source.cell_count() {
            return Err(SpaceError::DataLengthMismatch {
                expected: source.cell_count(),
                got: values.len(),
            });
        }
        let n = self.cell_count();
        let mut out = vec![0.0f32; n];
        let mut mask = vec![0u8; n];
        let Some(overlap) = self.intersect(source) else {
            return Ok((out, mask));
        };
        let mut global: Coord = SmallVec::from_elem(0, overlap.origin.len());
        for_each_index(&overlap.shape, |idx| {
            for (axis, &i) in idx.iter().enumerate() {
                global[axis] = overlap.origin[axis] + i as i32;
            }
            if let (Some(dst), Some(src)) = (self.local_rank(&global), source.local_rank(&global)) {
                out[dst] = values[src];
                mask[dst] = 1;
            }
        });
        Ok((out, mask))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn centered_even_and_odd() {
        let even = WindowSpec::new(&[4, 4], WindowAnchor::Centered).unwrap();
        assert_eq!(even.window_at(&[5, 5]).unwrap().origin(), &[3, 3]);
        let odd = WindowSpec::new(&[3, 5], WindowAnchor::Centered).unwrap();
        assert_eq!(odd.window_at(&[5, 5]).unwrap().origin(), &[4, 3]);
    }

    #[test]
    fn offset_anchor() {
        let spec =
            WindowSpec::new(&[16, 8], WindowAnchor::Offset(Coord::from_slice(&[7, 3]))).unwrap();
        let w = spec.window_at(&[20, 10]).unwrap();
        assert_eq!(w.origin(), &[13, 7]);
    }

    #[test]
    fn offset_outside_window_rejected() {
        let err = WindowSpec::new(&[4, 4], WindowAnchor::Offset(Coord::from_slice(&[4, 0])));
        assert!(matches!(err, Err(SpaceError::InvalidWindow { .. })));
        let err = WindowSpec::new(&[4, 4], WindowAnchor::Offset(Coord::from_slice(&[1])));
        assert!(matches!(err, Err(SpaceError::DimensionMismatch { .. })));
        assert!(WindowSpec::new(&[4, 0], WindowAnchor::Centered).is_err());
    }

    #[test]
    fn check_within_edges() {
        let e = Extent::new(&[10, 10]).unwrap();
        assert!(Window::new(&[0, 0], &[4, 4]).unwrap().check_within(&e).is_ok());
        assert!(Window::new(&[6, 6], &[4, 4]).unwrap().check_within(&e).is_ok());
        assert!(matches!(
            Window::new(&[7, 6], &[4, 4]).unwrap().check_within(&e),
            Err(SpaceError::OutOfBounds { .. })
        ));
        assert!(matches!(
            Window::new(&[-1, 0], &[4, 4]).unwrap().check_within(&e),
            Err(SpaceError::OutOfBounds { .. })
        ));
    }

    #[test]
    fn intersect_strip() {
        let a = Window::new(&[2, 2], &[4, 4]).unwrap();
        let b = Window::new(&[2, 4], &[4, 4]).unwrap();
        let i = a.intersect(&b).unwrap();
        assert_eq!(i.origin(), &[2, 4]);
        assert_eq!(i.shape(), &[4, 2]);
        assert_eq!(a.intersect(&b), b.intersect(&a));
    }

    #[test]
    fn touching_windows_do_not_intersect() {
        let a = Window::new(&[0, 0], &[4, 4]).unwrap();
        let b = Window::new(&[0, 4], &[4, 4]).unwrap();
        assert!(a.intersect(&b).is_none());
    }

    #[test]
    fn gather_copies_window() {
        let e = Extent::new(&[4, 4]).unwrap();
        let data: Vec<f32> = (0..16).map(|v| v as f32).collect();
        let w = Window::new(&[1, 2], &[2, 2]).unwrap();
        assert_eq!(w.gather(&e, &data).unwrap(), vec![6.0, 7.0, 10.0, 11.0]);
    }

    #[test]
    fn gather_out_of_bounds_fails() {
        let e = Extent::new(&[4, 4]).unwrap();
        let data = vec![0.0; 16];
        let w = Window::new(&[3, 3], &[2, 2]).unwrap();
        assert!(matches!(
            w.gather(&e, &data),
            Err(SpaceError::OutOfBounds { .. })
        ));
    }

    #[test]
    fn reproject_translates_overlap() {
        let target = Window::new(&[0, 0], &[2, 3]).unwrap();
        let source = Window::new(&[0, 1], &[2, 3]).unwrap();
        // source local values 1..6 over global cols 1..4
        let values = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
        let (out, mask) = target.reproject(&source, &values).unwrap();
        assert_eq!(mask, vec![0, 1, 1, 0, 1, 1]);
        assert_eq!(out, vec![0.0, 1.0, 2.0, 0.0, 4.0, 5.0]);
    }

    #[test]
    fn reproject_disjoint_is_fully_masked() {
        let target = Window::new(&[0, 0], &[2, 2]).unwrap();
        let source = Window::new(&[5, 5], &[2, 2]).unwrap();
        let (out, mask) = target.reproject(&source, &[1.0; 4]).unwrap();
        assert_eq!(out, vec![0.0; 4]);
        assert_eq!(mask, vec![0; 4]);
    }

    #[test]
    fn local_rank_matches_gather_order() {
        let w = Window::new(&[3, 4], &[2, 3]).unwrap();
        assert_eq!(w.local_rank(&[3, 4]), Some(0));
        assert_eq!(w.local_rank(&[4, 6]), Some(5));
        assert_eq!(w.local_rank(&[5, 4]), None);
    }
}
