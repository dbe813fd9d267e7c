//! Streak counting from line-finder output.
//!
//! A single radiation hit or debris trail usually comes back from the line
//! finder as several nearly coincident segments. Segments whose start points
//! lie closer than a clustering distance are counted as one streak.
//!
//! Two clustering modes are provided:
//!
//! - [`StreakClustering::Greedy`] scans segments in input order and keeps a
//!   start point only if it is at least `dist` away from every point kept so
//!   far. This is best-effort deduplication: when clusters are not well
//!   separated (A near B, B near C, A far from C) the count can depend on the
//!   input order.
//! - [`StreakClustering::Connected`] joins every pair of segments whose start
//!   points are closer than `dist` and counts connected components. The count
//!   is independent of input order.
//!
//! Both modes agree whenever distinct streaks are at least `dist` apart.

use chrono::{DateTime, Utc};
use log::debug;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use shared::{obs_time, LineSegment, PixelCoord};

use crate::error::{Result, ScreenError};

/// Default clustering distance in pixels
pub const DEFAULT_STREAK_DISTANCE: f64 = 25.0;

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "snake_case")]
pub enum StreakClustering {
    /// Order-dependent scan against the representatives found so far
    #[default]
    Greedy,
    /// Connected components of the start-point proximity graph
    Connected,
}

pub(crate) fn validate_distance(dist: f64) -> Result<f64> {
    if dist.is_finite() && dist > 0.0 {
        Ok(dist)
    } else {
        Err(ScreenError::InvalidDistance(dist))
    }
}

/// Representative start point of each streak, using the greedy scan.
pub fn unique_start_points(segments: &[LineSegment], dist: f64) -> Result<Vec<PixelCoord>> {
    let dist = validate_distance(dist)?;
    let mut unique: Vec<PixelCoord> = Vec::new();

    for segment in segments {
        let start = segment.start();
        if unique.iter().all(|point| point.distance_to(&start) >= dist) {
            unique.push(start);
        }
    }

    Ok(unique)
}

/// Minimal disjoint-set forest over segment indices
struct DisjointSet {
    parent: Vec<usize>,
}

impl DisjointSet {
    fn new(size: usize) -> Self {
        Self {
            parent: (0..size).collect(),
        }
    }

    fn find(&mut self, mut node: usize) -> usize {
        while self.parent[node] != node {
            self.parent[node] = self.parent[self.parent[node]];
            node = self.parent[node];
        }
        node
    }

    fn union(&mut self, a: usize, b: usize) {
        let (ra, rb) = (self.find(a), self.find(b));
        if ra != rb {
            // Lower index wins so roots are stable across runs
            let (keep, merge) = if ra < rb { (ra, rb) } else { (rb, ra) };
            self.parent[merge] = keep;
        }
    }
}

/// Group segments into streaks by proximity of their start points.
///
/// Returns segment indices per cluster. Clusters are ordered by their lowest
/// index and indices within a cluster are ascending.
pub fn connected_clusters(segments: &[LineSegment], dist: f64) -> Result<Vec<Vec<usize>>> {
    let dist = validate_distance(dist)?;
    let mut forest = DisjointSet::new(segments.len());

    for (i, a) in segments.iter().enumerate() {
        for (j, b) in segments.iter().enumerate().skip(i + 1) {
            if a.start().distance_to(&b.start()) < dist {
                forest.union(i, j);
            }
        }
    }

    let mut clusters: Vec<Vec<usize>> = Vec::new();
    let mut slot_for_root = vec![usize::MAX; segments.len()];
    for index in 0..segments.len() {
        let root = forest.find(index);
        if slot_for_root[root] == usize::MAX {
            slot_for_root[root] = clusters.len();
            clusters.push(Vec::new());
        }
        clusters[slot_for_root[root]].push(index);
    }

    Ok(clusters)
}

/// Number of distinct streaks using the greedy scan.
///
/// An empty segment list is a frame without streaks and yields 0.
pub fn count_streaks(segments: &[LineSegment], dist: f64) -> Result<usize> {
    count_streaks_with(segments, dist, StreakClustering::Greedy)
}

/// Number of distinct streaks using the chosen clustering mode.
pub fn count_streaks_with(
    segments: &[LineSegment],
    dist: f64,
    clustering: StreakClustering,
) -> Result<usize> {
    let count = match clustering {
        StreakClustering::Greedy => unique_start_points(segments, dist)?.len(),
        StreakClustering::Connected => connected_clusters(segments, dist)?.len(),
    };
    debug!(
        "{} segments -> {} streaks ({:?}, dist {:.1}px)",
        segments.len(),
        count,
        clustering,
        dist
    );
    Ok(count)
}

/// Line-finder output for one frame, as read from a segment file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrameSegments {
    /// Source file name or other frame label
    pub frame: String,
    /// Exposure start as a fractional year, when the header carried one
    #[serde(default)]
    pub obsdate: Option<f64>,
    pub segments: Vec<LineSegment>,
}

/// Streak count for one frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreakCount {
    pub frame: String,
    pub observed_at: Option<DateTime<Utc>>,
    pub segments: usize,
    pub streaks: usize,
}

/// Count streaks for many frames in parallel, preserving input order.
pub fn count_streaks_per_frame(
    frames: &[FrameSegments],
    dist: f64,
    clustering: StreakClustering,
) -> Result<Vec<StreakCount>> {
    let dist = validate_distance(dist)?;
    frames
        .par_iter()
        .map(|frame| -> Result<StreakCount> {
            let observed_at = frame
                .obsdate
                .map(obs_time::from_fractional_year)
                .transpose()?;
            Ok(StreakCount {
                frame: frame.frame.clone(),
                observed_at,
                segments: frame.segments.len(),
                streaks: count_streaks_with(&frame.segments, dist, clustering)?,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seg(r0: usize, c0: usize, r1: usize, c1: usize) -> LineSegment {
        LineSegment::new(PixelCoord::new(r0, c0), PixelCoord::new(r1, c1))
    }

    #[test]
    fn test_empty_is_zero() {
        assert_eq!(count_streaks(&[], DEFAULT_STREAK_DISTANCE).unwrap(), 0);
        assert_eq!(
            count_streaks_with(&[], DEFAULT_STREAK_DISTANCE, StreakClustering::Connected)
                .unwrap(),
            0
        );
    }

    #[test]
    fn test_single_segment() {
        let segments = [seg(40, 40, 60, 60)];
        assert_eq!(
            unique_start_points(&segments, 25.0).unwrap(),
            vec![PixelCoord::new(40, 40)]
        );
    }

    #[test]
    fn test_close_starts_collapse() {
        // 10 px apart
        let segments = [seg(100, 100, 120, 120), seg(106, 108, 126, 128)];
        assert_eq!(count_streaks(&segments, 25.0).unwrap(), 1);
        assert_eq!(
            count_streaks_with(&segments, 25.0, StreakClustering::Connected).unwrap(),
            1
        );
    }

    #[test]
    fn test_far_starts_stay_distinct() {
        // 30 px apart
        let segments = [seg(100, 100, 120, 120), seg(118, 124, 138, 144)];
        assert_eq!(count_streaks(&segments, 25.0).unwrap(), 2);
        assert_eq!(
            count_streaks_with(&segments, 25.0, StreakClustering::Connected).unwrap(),
            2
        );
    }

    #[test]
    fn test_distance_is_strict() {
        // Exactly dist apart counts as a new streak
        let segments = [seg(0, 0, 5, 5), seg(0, 25, 5, 30)];
        assert_eq!(count_streaks(&segments, 25.0).unwrap(), 2);
    }

    #[test]
    fn test_end_points_are_ignored() {
        let segments = [seg(10, 10, 500, 500), seg(12, 11, 0, 900)];
        assert_eq!(count_streaks(&segments, 25.0).unwrap(), 1);
    }

    #[test]
    fn test_greedy_keeps_first_representative() {
        let segments = [seg(50, 50, 60, 60), seg(55, 50, 65, 60), seg(200, 10, 210, 20)];
        assert_eq!(
            unique_start_points(&segments, 25.0).unwrap(),
            vec![PixelCoord::new(50, 50), PixelCoord::new(200, 10)]
        );
    }

    #[test]
    fn test_chain_is_order_dependent_for_greedy_only() {
        // A-B and B-C are 20 px apart, A-C is 40 px apart
        let a = seg(0, 0, 1, 1);
        let b = seg(0, 20, 1, 21);
        let c = seg(0, 40, 1, 41);

        assert_eq!(count_streaks(&[a, b, c], 25.0).unwrap(), 2);
        assert_eq!(count_streaks(&[b, a, c], 25.0).unwrap(), 1);

        for order in [[a, b, c], [b, a, c], [c, b, a]] {
            assert_eq!(
                count_streaks_with(&order, 25.0, StreakClustering::Connected).unwrap(),
                1
            );
        }
    }

    #[test]
    fn test_connected_clusters_layout() {
        let segments = [
            seg(300, 300, 310, 310),
            seg(0, 0, 5, 5),
            seg(302, 305, 320, 320),
            seg(4, 3, 9, 9),
            seg(150, 0, 160, 10),
        ];
        let clusters = connected_clusters(&segments, 25.0).unwrap();
        assert_eq!(clusters, vec![vec![0, 2], vec![1, 3], vec![4]]);
    }

    #[test]
    fn test_rejects_invalid_distance() {
        let segments = [seg(0, 0, 1, 1)];
        for dist in [0.0, -5.0, f64::NAN, f64::INFINITY] {
            assert!(matches!(
                count_streaks(&segments, dist),
                Err(ScreenError::InvalidDistance(_))
            ));
            assert!(matches!(
                connected_clusters(&segments, dist),
                Err(ScreenError::InvalidDistance(_))
            ));
        }
    }

    #[test]
    fn test_per_frame_counts_keep_order() {
        let frames = vec![
            FrameSegments {
                frame: "a.fits".to_string(),
                obsdate: Some(2017.0),
                segments: vec![seg(0, 0, 1, 1), seg(3, 3, 9, 9), seg(100, 100, 110, 110)],
            },
            FrameSegments {
                frame: "b.fits".to_string(),
                obsdate: None,
                segments: vec![],
            },
        ];

        let counts =
            count_streaks_per_frame(&frames, DEFAULT_STREAK_DISTANCE, StreakClustering::Greedy)
                .unwrap();
        assert_eq!(counts.len(), 2);
        assert_eq!(counts[0].frame, "a.fits");
        assert_eq!(counts[0].segments, 3);
        assert_eq!(counts[0].streaks, 2);
        assert!(counts[0].observed_at.is_some());
        assert_eq!(counts[1].streaks, 0);
        assert_eq!(counts[1].observed_at, None);
    }

    #[test]
    fn test_segment_file_parsing() {
        let json = r#"[{"frame": "f0", "segments": [
            {"p0": {"row": 1, "col": 2}, "p1": {"row": 3, "col": 4}}
        ]}]"#;
        let frames: Vec<FrameSegments> = serde_json::from_str(json).unwrap();
        assert_eq!(frames[0].obsdate, None);
        assert_eq!(frames[0].segments.len(), 1);

        let malformed = r#"[{"frame": "f0", "segments": [{"p0": {"row": 1, "col": 2}}]}]"#;
        assert!(serde_json::from_str::<Vec<FrameSegments>>(malformed).is_err());
    }
}
