//! Isolated active pixel extraction.
//!
//! A pixel is *active* when its intensity is at or above the frame threshold.
//! It is *isolated* when none of its 8-connected neighbors is also active.
//! Stars spread their light over a multi-pixel PSF footprint, so requiring
//! isolation keeps single-pixel sensor defects while rejecting most stars.
//!
//! Pixels on the outermost rows and columns have fewer real neighbors. How the
//! missing neighbors are treated is selected with [`NeighborEdgePolicy`].

use serde::{Deserialize, Serialize};
use shared::{Frame, ImageSize, PixelCoord};
use std::collections::HashSet;

use crate::threshold::Threshold;

/// Set of unique pixel coordinates produced for one frame at one threshold.
pub type ActiveSet = HashSet<PixelCoord>;

// 8-connectivity neighboring offsets
#[rustfmt::skip]
const NEIGHBOR_OFFSETS: [(isize, isize); 8] = [
    (-1, -1), (-1, 0), (-1, 1),
    (0, -1),           (0, 1),
    (1, -1),  (1, 0),  (1, 1),
];

/// How neighbors beyond the frame edge are handled by the isolation check.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "snake_case")]
pub enum NeighborEdgePolicy {
    /// Neighbors with a negative component or one past the last row/column do
    /// not exist and are never read.
    #[default]
    Exclude,
    /// The grid is treated as a torus: row -1 is the last row and column -1
    /// the last column (and vice versa on the far edges).
    Wrap,
}

impl NeighborEdgePolicy {
    /// Resolve the neighbor of `coord` at offset `(dr, dc)`.
    ///
    /// Always returns an in-bounds coordinate, or `None`.
    fn resolve(
        self,
        size: ImageSize,
        coord: PixelCoord,
        dr: isize,
        dc: isize,
    ) -> Option<PixelCoord> {
        let row = coord.row as isize + dr;
        let col = coord.col as isize + dc;
        match self {
            NeighborEdgePolicy::Exclude => size.checked_coord(row, col),
            NeighborEdgePolicy::Wrap => {
                let wrapped = PixelCoord::new(
                    row.rem_euclid(size.height as isize) as usize,
                    col.rem_euclid(size.width as isize) as usize,
                );
                // On 1- or 2-wide frames the wrap can land back on the pixel itself
                (wrapped != coord).then_some(wrapped)
            }
        }
    }
}

/// Every coordinate whose intensity is at or above `threshold`, in row-major order.
pub fn above_threshold(frame: &Frame, threshold: Threshold) -> Vec<PixelCoord> {
    frame
        .view()
        .indexed_iter()
        .filter(|(_, &value)| threshold.is_active(value))
        .map(|(index, _)| PixelCoord::from(index))
        .collect()
}

/// True when any existing neighbor of `coord` is also active.
pub fn has_active_neighbor(
    frame: &Frame,
    coord: PixelCoord,
    threshold: Threshold,
    policy: NeighborEdgePolicy,
) -> bool {
    let size = frame.size();
    NEIGHBOR_OFFSETS
        .iter()
        .filter_map(|&(dr, dc)| policy.resolve(size, coord, dr, dc))
        .any(|neighbor| {
            frame
                .get(neighbor)
                .is_some_and(|value| threshold.is_active(value))
        })
}

/// Isolated above-threshold pixels of one frame.
///
/// Pure function of its inputs: the frame is only read and repeated calls
/// return identical sets.
pub fn active_pixels(frame: &Frame, threshold: Threshold, policy: NeighborEdgePolicy) -> ActiveSet {
    above_threshold(frame, threshold)
        .into_iter()
        .filter(|&coord| !has_active_neighbor(frame, coord, threshold, policy))
        .collect()
}
