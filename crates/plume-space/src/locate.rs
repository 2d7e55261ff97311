//! Heat-pump location from an identifier channel.
//!
//! The identifier channel marks heat-pump cells with a distinguished
//! value. Marked cells are grouped into face-connected regions; each
//! region yields one coordinate (its centroid rounded to the nearest
//! cell). Regions are reported in the row-major order of their first
//! cell, so the result is independent of anything but the data.

use std::collections::VecDeque;

use plume_core::Coord;
use serde::{Deserialize, Serialize};

use crate::error::SpaceError;
use crate::extent::Extent;

/// Which identifier values count as heat-pump markers.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkerRule {
    /// Cells equal to the channel maximum, provided the channel is not
    /// constant. Robust to the channel having been standardized.
    #[default]
    ChannelMax,
    /// Cells exactly equal to the given value.
    Value(f32),
}

impl MarkerRule {
    /// The concrete marker value for `values`, or `None` if nothing can
    /// be marked.
    fn resolve(self, values: &[f32]) -> Option<f32> {
        match self {
            Self::Value(v) => Some(v),
            Self::ChannelMax => {
                let mut finite = values.iter().copied().filter(|v| !v.is_nan());
                let first = finite.next()?;
                let (lo, hi) = finite.fold((first, first), |(lo, hi), v| (lo.min(v), hi.max(v)));
                (hi > lo).then_some(hi)
            }
        }
    }
}

/// One coordinate per connected marked region, in canonical scan order.
///
/// Returns an empty vector when no cell is marked; that is a valid
/// "no work" outcome, not an error.
///
/// # Examples
///
/// ```
/// use plume_space::{locate_markers, Extent, MarkerRule};
///
/// let extent = Extent::new(&[4, 4]).unwrap();
/// let mut ids = vec![0.0f32; 16];
/// ids[5] = 2.0; // (1, 1)
/// ids[14] = 2.0; // (3, 2)
/// let hps = locate_markers(&extent, &ids, MarkerRule::ChannelMax).unwrap();
/// assert_eq!(hps.len(), 2);
/// assert_eq!(hps[0].as_slice(), &[1, 1]);
/// assert_eq!(hps[1].as_slice(), &[3, 2]);
/// ```
pub fn locate_markers(
    extent: &Extent,
    values: &[f32],
    rule: MarkerRule,
) -> Result<Vec<Coord>, SpaceError> {
    let n = extent.cell_count();
    if values.len() != n {
        return Err(SpaceError::DataLengthMismatch {
            expected: n,
            got: values.len(),
        });
    }
    let Some(marker) = rule.resolve(values) else {
        return Ok(Vec::new());
    };

    let mut visited = vec![false; n];
    let mut queue = VecDeque::new();
    let mut out = Vec::new();

    for start in 0..n {
        if visited[start] || values[start] != marker {
            continue;
        }
        visited[start] = true;
        queue.push_back(start);
        let mut sums = vec![0i64; extent.ndim()];
        let mut count = 0i64;

        while let Some(rank) = queue.pop_front() {
            for (axis, c) in extent.coord_of(rank).iter().enumerate() {
                sums[axis] += *c as i64;
            }
            count += 1;
            for next in extent.face_neighbours(rank) {
                if !visited[next] && values[next] == marker {
                    visited[next] = true;
                    queue.push_back(next);
                }
            }
        }

        out.push(
            sums.iter()
                .map(|&s| (s as f64 / count as f64).round() as i32)
                .collect(),
        );
    }
    Ok(out)
}
