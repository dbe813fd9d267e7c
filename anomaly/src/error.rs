//! Error types for frame screening.

use shared::obs_time::ObsTimeError;
use shared::{FrameError, ImageSize, StatsError};
use thiserror::Error;

/// Failures raised by the screening pipeline.
///
/// Every variant is reported before any partial result is produced.
#[derive(Error, Debug)]
pub enum ScreenError {
    #[error("Sigma must be a finite positive number, got {0}")]
    InvalidSigma(f64),

    #[error("Streak clustering distance must be a finite positive number, got {0}")]
    InvalidDistance(f64),

    #[error("No frames were supplied")]
    NoFrames,

    #[error("Overlap requires at least one active pixel set")]
    NoActiveSets,

    #[error("Frame {index} is {found}, expected {expected}")]
    FrameSizeMismatch {
        index: usize,
        expected: ImageSize,
        found: ImageSize,
    },

    #[error("Invalid frame: {0}")]
    Frame(#[from] FrameError),

    #[error("Pixel statistics failed: {0}")]
    Stats(#[from] StatsError),

    #[error("Invalid observation time: {0}")]
    ObsTime(#[from] ObsTimeError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ScreenError>;
