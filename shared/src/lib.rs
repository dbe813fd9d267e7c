//! Shared frame, coordinate and statistics types for camera screening.

pub mod coordinate;
pub mod frame;
pub mod image_size;
pub mod obs_time;
pub mod stats_scan;

pub use coordinate::{LineSegment, PixelCoord};
pub use frame::{Frame, FrameError};
pub use image_size::ImageSize;
pub use stats_scan::{StatsError, StatsScan};
