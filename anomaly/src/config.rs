//! Screening configuration.
//!
//! [`ScreenConfig`] is built by the caller and passed into every pipeline
//! call; nothing is held in module state. It can be stored alongside other
//! calibration data as pretty-printed JSON.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::active_pixels::NeighborEdgePolicy;
use crate::error::Result;
use crate::streaks::{validate_distance, StreakClustering, DEFAULT_STREAK_DISTANCE};
use crate::threshold::validate_sigma;

/// Default threshold multiplier for hot pixel screening
pub const DEFAULT_SIGMA: f64 = 4.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScreenConfig {
    /// Standard deviations above the frame mean for a pixel to count as active
    pub sigma: f64,
    /// Start-point distance in pixels below which segments are the same streak
    pub streak_distance: f64,
    /// Treatment of neighbors past the frame edge
    pub edge_policy: NeighborEdgePolicy,
    pub clustering: StreakClustering,
}

impl Default for ScreenConfig {
    fn default() -> Self {
        Self {
            sigma: DEFAULT_SIGMA,
            streak_distance: DEFAULT_STREAK_DISTANCE,
            edge_policy: NeighborEdgePolicy::default(),
            clustering: StreakClustering::default(),
        }
    }
}

impl ScreenConfig {
    pub fn with_sigma(mut self, sigma: f64) -> Self {
        self.sigma = sigma;
        self
    }

    pub fn with_streak_distance(mut self, distance: f64) -> Self {
        self.streak_distance = distance;
        self
    }

    pub fn with_edge_policy(mut self, policy: NeighborEdgePolicy) -> Self {
        self.edge_policy = policy;
        self
    }

    pub fn with_clustering(mut self, clustering: StreakClustering) -> Self {
        self.clustering = clustering;
        self
    }

    /// Check every numeric field
    pub fn validate(&self) -> Result<()> {
        validate_sigma(self.sigma)?;
        validate_distance(self.streak_distance)?;
        Ok(())
    }

    /// Load and validate a configuration from a JSON file.
    ///
    /// Missing fields take their default values.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        let config: ScreenConfig = serde_json::from_str(&json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}
