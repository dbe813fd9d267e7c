//! Anomaly screening for spacecraft camera frames.
//!
//! Two independent detectors are provided:
//!
//! - **Hot pixels**: each frame is thresholded at `mean + sigma * stddev`
//!   ([`threshold`]), reduced to its isolated above-threshold pixels
//!   ([`active_pixels`]) and the per-frame sets are intersected across the
//!   collection ([`overlap`]). [`hot_pixels::find_hot_pixels`] runs the whole
//!   chain with one task per frame.
//! - **Streaks**: line segments from an external line finder are clustered by
//!   start-point proximity and counted ([`streaks`]).
//!
//! Frame decoding and line finding are the caller's job; the library only
//! consumes [`shared::Frame`] grids and [`shared::LineSegment`] lists.

pub mod active_pixels;
pub mod config;
pub mod error;
pub mod hot_pixels;
pub mod overlap;
pub mod report;
pub mod streaks;
pub mod threshold;

pub use active_pixels::{active_pixels, ActiveSet, NeighborEdgePolicy};
pub use config::ScreenConfig;
pub use error::{Result, ScreenError};
pub use hot_pixels::{find_hot_pixels, FrameActivity, HotPixelScan};
pub use overlap::{overlap, HotPixelSet};
pub use report::{hot_pixel_values, HotPixelReport, HotPixelTrace};
pub use streaks::{count_streaks, count_streaks_with, StreakClustering};
pub use threshold::{sigma_threshold, Threshold};
