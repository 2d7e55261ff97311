//! Full-grid dimensions and canonical rank arithmetic.

use plume_core::{element_count, Coord, Shape};
use smallvec::SmallVec;

use crate::error::SpaceError;

/// Dimensions of a dense simulation grid.
///
/// Cells are ordered row-major: the last axis varies fastest. The
/// canonical rank of a coordinate is its index into a flat buffer laid
/// out in that order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Extent {
    dims: Shape,
    strides: Shape,
}

impl Extent {
    /// Build an extent, rejecting zero axes and zero-length axes.
    pub fn new(dims: &[usize]) -> Result<Self, SpaceError> {
        if dims.is_empty() || dims.contains(&0) {
            return Err(SpaceError::EmptyExtent);
        }
        let mut strides: Shape = SmallVec::from_elem(1, dims.len());
        for axis in (0..dims.len() - 1).rev() {
            strides[axis] = strides[axis + 1] * dims[axis + 1];
        }
        Ok(Self {
            dims: Shape::from_slice(dims),
            strides,
        })
    }

    /// Extent per axis.
    pub fn dims(&self) -> &[usize] {
        &self.dims
    }

    /// Row-major stride per axis.
    pub fn strides(&self) -> &[usize] {
        &self.strides
    }

    /// Number of axes.
    pub fn ndim(&self) -> usize {
        self.dims.len()
    }

    /// Total number of cells.
    pub fn cell_count(&self) -> usize {
        element_count(&self.dims)
    }

    /// Whether `coord` has the right dimensionality and lies inside the grid.
    pub fn in_bounds(&self, coord: &[i32]) -> bool {
        coord.len() == self.ndim()
            && coord
                .iter()
                .zip(&self.dims)
                .all(|(&c, &d)| c >= 0 && (c as usize) < d)
    }

    /// Canonical rank of `coord`, or `None` if it is out of bounds.
    pub fn canonical_rank(&self, coord: &[i32]) -> Option<usize> {
        if !self.in_bounds(coord) {
            return None;
        }
        Some(
            coord
                .iter()
                .zip(&self.strides)
                .map(|(&c, &s)| c as usize * s)
                .sum(),
        )
    }

    /// Coordinate of canonical rank `rank`. `rank` must be below
    /// [`cell_count`](Self::cell_count).
    pub fn coord_of(&self, rank: usize) -> Coord {
        debug_assert!(rank < self.cell_count());
        let mut rest = rank;
        self.strides
            .iter()
            .map(|&s| {
                let c = rest / s;
                rest %= s;
                c as i32
            })
            .collect()
    }

    /// Ranks of the face-adjacent neighbours of `rank` (2 per axis at most).
    pub fn face_neighbours(&self, rank: usize) -> SmallVec<[usize; 8]> {
        let coord = self.coord_of(rank);
        let mut out = SmallVec::new();
        for (axis, (&c, &d)) in coord.iter().zip(&self.dims).enumerate() {
            let stride = self.strides[axis];
            if c > 0 {
                out.push(rank - stride);
            }
            if (c as usize) + 1 < d {
                out.push(rank + stride);
            }
        }
        out
    }
}

/// Visit every multi-index of `shape` in row-major order.
pub(crate) fn for_each_index(shape: &[usize], mut f: impl FnMut(&[usize])) {
    if shape.is_empty() || shape.contains(&0) {
        return;
    }
    let mut idx: SmallVec<[usize; 4]> = SmallVec::from_elem(0, shape.len());
    loop {
        f(&idx);
        let mut axis = shape.len();
        loop {
            if axis == 0 {
                return;
            }
            axis -= 1;
            idx[axis] += 1;
            if idx[axis] < shape[axis] {
                break;
            }
            idx[axis] = 0;
        }
    }
}
