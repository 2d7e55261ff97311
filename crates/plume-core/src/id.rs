//! Grid coordinate and shape aliases.

use smallvec::SmallVec;

/// An integer cell coordinate in a simulation grid.
///
/// Uses `SmallVec<[i32; 4]>` to avoid heap allocation for grids up to
/// 4 dimensions, which covers the 2D and 3D domains produced by the
/// groundwater simulator. Signed so that window origins left of the
/// grid can be represented before bounds checking rejects them.
pub type Coord = SmallVec<[i32; 4]>;

/// Extent per axis of a dense array, outermost axis first.
pub type Shape = SmallVec<[usize; 4]>;

/// Number of elements in an array of the given shape.
///
/// The empty shape is a scalar and has one element.
pub fn element_count(shape: &[usize]) -> usize {
    shape.iter().product()
}
