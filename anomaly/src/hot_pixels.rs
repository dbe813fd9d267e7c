//! Hot pixel screening across a frame collection.
//!
//! Each frame is thresholded and reduced to its isolated active pixels
//! independently, one rayon task per frame with no shared state. The per-frame
//! sets are then intersected. Only pixels that are isolated and active in
//! every frame, each judged against its own threshold, are reported.

use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use shared::{Frame, ImageSize};

use crate::active_pixels::{active_pixels, ActiveSet, NeighborEdgePolicy};
use crate::config::ScreenConfig;
use crate::error::{Result, ScreenError};
use crate::overlap::{overlap, HotPixelSet};
use crate::threshold::{sigma_threshold, validate_sigma, Threshold};

/// Per-frame diagnostics gathered while screening.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameActivity {
    /// Position of the frame in the input collection
    pub index: usize,
    pub threshold: Threshold,
    /// Number of isolated active pixels found in this frame
    pub active_pixels: usize,
    pub exposure_s: Option<f64>,
    pub observed_at: Option<DateTime<Utc>>,
}

/// Result of screening a frame collection for hot pixels.
#[derive(Debug, Clone)]
pub struct HotPixelScan {
    pub size: ImageSize,
    pub sigma: f64,
    pub edge_policy: NeighborEdgePolicy,
    pub frames: Vec<FrameActivity>,
    pub hot_pixels: HotPixelSet,
}

/// Threshold one frame and extract its isolated active pixels.
pub fn screen_frame(
    frame: &Frame,
    sigma: f64,
    policy: NeighborEdgePolicy,
) -> Result<(Threshold, ActiveSet)> {
    let threshold = sigma_threshold(frame, sigma)?;
    Ok((threshold, active_pixels(frame, threshold, policy)))
}

fn check_sizes(frames: &[Frame]) -> Result<ImageSize> {
    let expected = frames.first().ok_or(ScreenError::NoFrames)?.size();
    for (index, frame) in frames.iter().enumerate().skip(1) {
        let found = frame.size();
        if found != expected {
            return Err(ScreenError::FrameSizeMismatch {
                index,
                expected,
                found,
            });
        }
    }
    Ok(expected)
}

/// Find pixels that are isolated and active in every frame.
///
/// All frames must share one size. Fails without a partial result if any
/// frame cannot be screened.
pub fn find_hot_pixels(frames: &[Frame], config: &ScreenConfig) -> Result<HotPixelScan> {
    let sigma = validate_sigma(config.sigma)?;
    let size = check_sizes(frames)?;

    info!(
        "Screening {} frames ({}) for hot pixels at {:.1} sigma",
        frames.len(),
        size,
        sigma
    );

    let screened: Vec<(Threshold, ActiveSet)> = frames
        .par_iter()
        .map(|frame| screen_frame(frame, sigma, config.edge_policy))
        .collect::<Result<_>>()?;

    let activity: Vec<FrameActivity> = frames
        .iter()
        .zip(&screened)
        .enumerate()
        .map(|(index, (frame, (threshold, active)))| {
            debug!(
                "Frame {}: threshold {} DN, {} isolated active pixels",
                index,
                threshold,
                active.len()
            );
            FrameActivity {
                index,
                threshold: *threshold,
                active_pixels: active.len(),
                exposure_s: frame.exposure().map(|e| e.as_secs_f64()),
                observed_at: frame.observed_at(),
            }
        })
        .collect();

    let active_sets: Vec<ActiveSet> = screened.into_iter().map(|(_, set)| set).collect();
    let hot_pixels = overlap(&active_sets)?;

    if hot_pixels.is_empty() {
        warn!("No pixel was isolated and active in all {} frames", frames.len());
    } else {
        info!(
            "Located {} overlapping active pixels across {} frames",
            hot_pixels.len(),
            frames.len()
        );
    }

    Ok(HotPixelScan {
        size,
        sigma,
        edge_policy: config.edge_policy,
        frames: activity,
        hot_pixels,
    })
}
