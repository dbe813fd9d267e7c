//! Hot pixel reports.
//!
//! Pulls the intensity of every hot pixel out of each frame so the defects can
//! be compared across exposures, and bundles the scan diagnostics into a
//! serializable report.

use itertools::Itertools;
use serde::{Deserialize, Serialize};
use shared::{Frame, ImageSize, PixelCoord, StatsScan};
use std::path::Path;

use crate::active_pixels::NeighborEdgePolicy;
use crate::error::Result;
use crate::hot_pixels::{FrameActivity, HotPixelScan};
use crate::overlap::HotPixelSet;

/// Intensity of one hot pixel in every frame of the collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HotPixelTrace {
    pub coord: PixelCoord,
    /// One value per frame, in frame order
    pub values: Vec<u16>,
    pub mean: f64,
    pub min: u16,
    pub max: u16,
}

/// Collect per-frame values for each hot pixel, ordered by coordinate.
///
/// Pixels outside the frames are skipped; coordinates taken from a scan of the
/// same frames are always inside.
pub fn hot_pixel_values(frames: &[Frame], hot_pixels: &HotPixelSet) -> Vec<HotPixelTrace> {
    hot_pixels
        .iter()
        .sorted()
        .filter_map(|&coord| {
            let values: Vec<u16> = frames
                .iter()
                .map(|frame| frame.get(coord))
                .collect::<Option<_>>()?;
            let scan = StatsScan::scan(values.iter().map(|&v| v as f64));
            let mean = scan.mean().ok()?;
            let min = scan.min().ok()? as u16;
            let max = scan.max().ok()? as u16;
            Some(HotPixelTrace {
                coord,
                values,
                mean,
                min,
                max,
            })
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HotPixelReport {
    pub num_frames: usize,
    pub image_size: ImageSize,
    pub sigma: f64,
    pub edge_policy: NeighborEdgePolicy,
    pub frames: Vec<FrameActivity>,
    pub hot_pixels: Vec<HotPixelTrace>,
}

impl HotPixelReport {
    /// Build a report from a scan and the frames it was computed from.
    pub fn new(scan: &HotPixelScan, frames: &[Frame]) -> Self {
        Self {
            num_frames: frames.len(),
            image_size: scan.size,
            sigma: scan.sigma,
            edge_policy: scan.edge_policy,
            frames: scan.frames.clone(),
            hot_pixels: hot_pixel_values(frames, &scan.hot_pixels),
        }
    }

    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    pub fn load_from_file(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&json)?)
    }
}
