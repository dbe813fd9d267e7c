//! End-to-end screening on synthetic frames and line finder output

use anomaly::active_pixels::above_threshold;
use anomaly::hot_pixels::screen_frame;
use anomaly::streaks::unique_start_points;
use anomaly::{
    count_streaks, count_streaks_with, find_hot_pixels, sigma_threshold, HotPixelReport,
    HotPixelSet, NeighborEdgePolicy, ScreenConfig, StreakClustering,
};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use shared::{Frame, ImageSize, LineSegment, PixelCoord};
use std::collections::HashSet;
use test_helpers::{scatter_points, set_pixels, streak_segments, SyntheticFrame};

const HOT_VALUE: u16 = 2000;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn frame_size() -> ImageSize {
    ImageSize::from_width_height(512, 512)
}

#[test]
fn test_injected_hot_pixels_are_recovered_exactly() {
    init_logging();
    let mut rng = ChaCha8Rng::seed_from_u64(2017);
    let size = frame_size();
    let hot = scatter_points(size, 25, 3.0, 0, &[], &mut rng);

    let frames: Vec<Frame> = (0..2)
        .map(|_| {
            let mut data = SyntheticFrame::new(size).render(&mut rng);
            set_pixels(&mut data, &hot, HOT_VALUE);
            Frame::new(data).unwrap()
        })
        .collect();

    let scan = find_hot_pixels(&frames, &ScreenConfig::default().with_sigma(3.0)).unwrap();
    let expected: HotPixelSet = hot.iter().copied().collect();
    assert_eq!(scan.hot_pixels, expected);
    assert_eq!(scan.hot_pixels.len(), 25);
}

#[test]
fn test_moving_stars_are_not_reported() {
    init_logging();
    let mut rng = ChaCha8Rng::seed_from_u64(99);
    let size = frame_size();

    let stars_a = [(60.3, 80.6), (200.2, 400.7), (350.5, 120.1), (450.8, 450.4)];
    let stars_b = [(120.6, 300.3), (280.1, 60.8), (400.4, 250.2), (30.7, 470.5)];
    let avoid: Vec<PixelCoord> = stars_a
        .iter()
        .chain(&stars_b)
        .map(|&(r, c)| PixelCoord::new(r as usize, c as usize))
        .collect();
    let hot = scatter_points(size, 25, 3.0, 0, &avoid, &mut rng);
    let hot = hot
        .into_iter()
        .filter(|p| avoid.iter().all(|s| s.distance_to(p) >= 12.0))
        .collect::<Vec<_>>();

    let render = |stars: &[(f64, f64)], background: f64, rng: &mut ChaCha8Rng| {
        let mut sky = SyntheticFrame::new(size).with_background(background, 1.5);
        for &(r, c) in stars {
            sky = sky.with_star(r, c, 3000.0);
        }
        let mut data = sky.render(rng);
        set_pixels(&mut data, &hot, HOT_VALUE);
        Frame::new(data).unwrap()
    };

    let frames = vec![
        render(&stars_a, 100.0, &mut rng),
        render(&stars_b, 140.0, &mut rng),
    ];
    let scan = find_hot_pixels(&frames, &ScreenConfig::default().with_sigma(3.0)).unwrap();

    let expected: HotPixelSet = hot.iter().copied().collect();
    assert_eq!(scan.hot_pixels, expected);
    for activity in &scan.frames {
        assert_eq!(activity.active_pixels, hot.len());
    }
    assert!(scan.frames[1].threshold.value() > scan.frames[0].threshold.value());
}

#[test]
fn test_transient_pixels_are_excluded() {
    init_logging();
    let mut rng = ChaCha8Rng::seed_from_u64(5);
    let size = frame_size();
    let points = scatter_points(size, 12, 4.0, 0, &[], &mut rng);
    let (persistent, transient) = points.split_at(8);

    let mut first = SyntheticFrame::new(size).render(&mut rng);
    set_pixels(&mut first, persistent, HOT_VALUE);
    set_pixels(&mut first, transient, HOT_VALUE);
    let mut second = SyntheticFrame::new(size).render(&mut rng);
    set_pixels(&mut second, persistent, HOT_VALUE);

    let frames = vec![Frame::new(first).unwrap(), Frame::new(second).unwrap()];
    let scan = find_hot_pixels(&frames, &ScreenConfig::default().with_sigma(3.0)).unwrap();

    let expected: HotPixelSet = persistent.iter().copied().collect();
    assert_eq!(scan.hot_pixels, expected);
    assert_eq!(scan.frames[0].active_pixels, 12);
    assert_eq!(scan.frames[1].active_pixels, 8);

    let report = HotPixelReport::new(&scan, &frames);
    assert_eq!(report.hot_pixels.len(), 8);
    assert!(report
        .hot_pixels
        .iter()
        .all(|trace| trace.values == vec![HOT_VALUE, HOT_VALUE]));
}

#[test]
fn test_edge_policy_on_frame_borders() {
    init_logging();
    let mut rng = ChaCha8Rng::seed_from_u64(8);
    let size = ImageSize::from_width_height(128, 64);
    let mut data = SyntheticFrame::new(size).render(&mut rng);
    // Opposite ends of row 10, adjacent only on a torus
    let border = [PixelCoord::new(10, 0), PixelCoord::new(10, 127)];
    let interior = [PixelCoord::new(32, 64)];
    set_pixels(&mut data, &border, HOT_VALUE);
    set_pixels(&mut data, &interior, HOT_VALUE);
    let frames = vec![Frame::new(data).unwrap()];

    let excluded = find_hot_pixels(&frames, &ScreenConfig::default()).unwrap();
    assert_eq!(excluded.hot_pixels.len(), 3);

    let wrapped = find_hot_pixels(
        &frames,
        &ScreenConfig::default().with_edge_policy(NeighborEdgePolicy::Wrap),
    )
    .unwrap();
    let expected: HotPixelSet = interior.iter().copied().collect();
    assert_eq!(wrapped.hot_pixels, expected);
}

#[test]
fn test_screening_is_repeatable() {
    let mut rng = ChaCha8Rng::seed_from_u64(31);
    let size = frame_size();
    let mut data = SyntheticFrame::new(size)
        .with_star(100.4, 100.2, 2500.0)
        .render(&mut rng);
    set_pixels(
        &mut data,
        &scatter_points(size, 10, 3.0, 0, &[PixelCoord::new(100, 100)], &mut rng),
        HOT_VALUE,
    );
    let frame = Frame::new(data).unwrap();
    let before = frame.clone();

    let first = screen_frame(&frame, 3.0, NeighborEdgePolicy::Exclude).unwrap();
    let second = screen_frame(&frame, 3.0, NeighborEdgePolicy::Exclude).unwrap();
    assert_eq!(first, second);
    assert_eq!(frame, before);
}

#[test]
fn test_candidates_never_grow_with_sigma() {
    let mut rng = ChaCha8Rng::seed_from_u64(12);
    let size = ImageSize::from_width_height(200, 150);
    let data = SyntheticFrame::new(size)
        .with_star(40.5, 40.5, 800.0)
        .with_star(100.2, 170.8, 1500.0)
        .render(&mut rng);
    let frame = Frame::new(data).unwrap();

    let mut previous: Option<HashSet<PixelCoord>> = None;
    for sigma in [0.5, 1.0, 2.0, 3.0, 4.0, 6.0] {
        let threshold = sigma_threshold(&frame, sigma).unwrap();
        let candidates: HashSet<PixelCoord> =
            above_threshold(&frame, threshold).into_iter().collect();
        if let Some(previous) = &previous {
            assert!(candidates.is_subset(previous), "grew at sigma {sigma}");
        }
        previous = Some(candidates);
    }
}

#[test]
fn test_frame_without_edges_has_no_streaks() {
    assert_eq!(count_streaks(&[], 25.0).unwrap(), 0);
}

#[test]
fn test_separated_streaks_are_counted_once_each() {
    init_logging();
    let mut rng = ChaCha8Rng::seed_from_u64(404);
    let size = ImageSize::from_width_height(1000, 1000);

    for _ in 0..10 {
        let starts = scatter_points(size, 5, 60.0, 10, &[], &mut rng);
        let segments = streak_segments(size, &starts, 3, 5, 250.0, &mut rng);
        assert_eq!(segments.len(), 15);

        assert_eq!(count_streaks(&segments, 25.0).unwrap(), 5);
        assert_eq!(
            count_streaks_with(&segments, 25.0, StreakClustering::Connected).unwrap(),
            5
        );
    }
}

#[test]
fn test_start_point_distance_decides_merging() {
    let p = |r, c| PixelCoord::new(r, c);
    let near = [
        LineSegment::new(p(500, 500), p(700, 650)),
        LineSegment::new(p(506, 508), p(690, 660)),
    ];
    assert_eq!(unique_start_points(&near, 25.0).unwrap(), vec![p(500, 500)]);

    let far = [
        LineSegment::new(p(500, 500), p(700, 650)),
        LineSegment::new(p(518, 524), p(690, 660)),
    ];
    assert_eq!(count_streaks(&far, 25.0).unwrap(), 2);
}
