//! Adaptive per-frame activity threshold.
//!
//! Each frame gets its own cutoff of `mean + sigma * stddev` over all of its
//! pixels, so frames with different background levels or exposure times are
//! judged against their own statistics. A threshold is never reused across
//! frames.

use serde::{Deserialize, Serialize};
use shared::Frame;
use std::fmt;

use crate::error::{Result, ScreenError};

/// Activity cutoff for a single frame, in digital numbers.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct Threshold(pub f64);

impl Threshold {
    pub fn value(&self) -> f64 {
        self.0
    }

    /// True when `intensity` is at or above the cutoff
    #[inline]
    pub fn is_active(&self, intensity: u16) -> bool {
        intensity as f64 >= self.0
    }
}

impl fmt::Display for Threshold {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:.3}", self.0)
    }
}

pub(crate) fn validate_sigma(sigma: f64) -> Result<f64> {
    if sigma.is_finite() && sigma > 0.0 {
        Ok(sigma)
    } else {
        Err(ScreenError::InvalidSigma(sigma))
    }
}

/// Compute `mean + sigma * stddev` of the frame's pixel intensities.
///
/// Uses the population standard deviation. `sigma` must be finite and
/// positive.
pub fn sigma_threshold(frame: &Frame, sigma: f64) -> Result<Threshold> {
    let sigma = validate_sigma(sigma)?;
    let (mean, std_dev) = frame.pixel_stats()?;
    Ok(Threshold(mean + sigma * std_dev))
}
