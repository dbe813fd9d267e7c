//! Image dimensions and size utilities

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::coordinate::PixelCoord;

/// Image dimensions structure
///
/// Represents the width and height of a camera frame.
/// Provides shape conversion and bounds checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ImageSize {
    /// Image width in pixels (number of columns)
    pub width: usize,
    /// Image height in pixels (number of rows)
    pub height: usize,
}

impl ImageSize {
    /// Create a new ImageSize
    pub fn from_width_height(width: usize, height: usize) -> Self {
        Self { width, height }
    }

    /// Create from an ndarray shape, which is ordered (rows, cols)
    pub fn from_shape(shape: (usize, usize)) -> Self {
        Self {
            width: shape.1,
            height: shape.0,
        }
    }

    /// True if either dimension is zero
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Check that a coordinate lies inside `[0, height) x [0, width)`
    pub fn contains(&self, coord: PixelCoord) -> bool {
        coord.row < self.height && coord.col < self.width
    }

    /// Check a signed (row, col) pair against both the lower and upper edges.
    ///
    /// Returns the coordinate when it is in bounds.
    pub fn checked_coord(&self, row: isize, col: isize) -> Option<PixelCoord> {
        if row < 0 || col < 0 {
            return None;
        }
        let coord = PixelCoord::new(row as usize, col as usize);
        self.contains(coord).then_some(coord)
    }
}

impl fmt::Display for ImageSize {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}
