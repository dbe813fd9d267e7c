//! Pixel coordinates and line segments in frame space.
//!
//! Coordinates follow the ndarray convention: `row` indexes the vertical axis
//! (increasing downward) and `col` the horizontal axis. Equality, ordering and
//! hashing always use both components together.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Integer pixel position `(row, col)` within a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PixelCoord {
    pub row: usize,
    pub col: usize,
}

impl PixelCoord {
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// Euclidean distance to another coordinate in pixels
    pub fn distance_to(&self, other: &PixelCoord) -> f64 {
        let dr = self.row as f64 - other.row as f64;
        let dc = self.col as f64 - other.col as f64;
        (dr * dr + dc * dc).sqrt()
    }

    /// Index tuple for direct ndarray access
    pub fn as_index(&self) -> (usize, usize) {
        (self.row, self.col)
    }
}

impl From<(usize, usize)> for PixelCoord {
    fn from((row, col): (usize, usize)) -> Self {
        Self::new(row, col)
    }
}

impl fmt::Display for PixelCoord {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// A straight edge feature reported by a line finder for one frame.
///
/// `p0` is the start point; streak clustering only looks at it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LineSegment {
    pub p0: PixelCoord,
    pub p1: PixelCoord,
}

impl LineSegment {
    pub fn new(p0: PixelCoord, p1: PixelCoord) -> Self {
        Self { p0, p1 }
    }

    pub fn start(&self) -> PixelCoord {
        self.p0
    }

    pub fn length(&self) -> f64 {
        self.p0.distance_to(&self.p1)
    }
}
