//! Synthetic fixtures for frame screening tests.
//!
//! Everything here is seeded and deterministic. Frames are built from a
//! Gaussian background, Gaussian PSF stars and injected single-pixel defects;
//! line segments are generated in tight bundles around well-separated streak
//! start points, mimicking what a line finder returns for one physical streak.
//!
//! # Example
//!
//! ```rust
//! use rand::SeedableRng;
//! use rand_chacha::ChaCha8Rng;
//! use shared::ImageSize;
//! use test_helpers::{scatter_points, set_pixels, SyntheticFrame};
//!
//! let mut rng = ChaCha8Rng::seed_from_u64(42);
//! let size = ImageSize::from_width_height(128, 96);
//! let mut data = SyntheticFrame::new(size)
//!     .with_star(40.0, 60.0, 3000.0)
//!     .render(&mut rng);
//! let hot = scatter_points(size, 5, 4.0, 2, &[], &mut rng);
//! set_pixels(&mut data, &hot, 2000);
//! assert_eq!(data.dim(), (96, 128));
//! ```

use ndarray::Array2;
use rand::Rng;
use rand_distr::{Distribution, Normal};
use shared::{ImageSize, LineSegment, PixelCoord};

/// Default PSF width, FWHM of ~3 pixels
pub const DEFAULT_PSF_SIGMA: f64 = 3.0 / 2.355;

/// Rejection sampling gives up after this many draws per requested point
const MAX_DRAWS_PER_POINT: usize = 10_000;

/// A Gaussian point source
#[derive(Debug, Clone, Copy)]
pub struct Star {
    pub row: f64,
    pub col: f64,
    /// Peak height above background in DN
    pub amplitude: f64,
    pub sigma: f64,
}

/// Description of a synthetic exposure
#[derive(Debug, Clone)]
pub struct SyntheticFrame {
    pub size: ImageSize,
    pub background: f64,
    pub noise_std: f64,
    pub stars: Vec<Star>,
}

impl SyntheticFrame {
    /// Empty sky at 100 DN with 1.5 DN of Gaussian noise
    pub fn new(size: ImageSize) -> Self {
        Self {
            size,
            background: 100.0,
            noise_std: 1.5,
            stars: Vec::new(),
        }
    }

    pub fn with_background(mut self, mean: f64, noise_std: f64) -> Self {
        self.background = mean;
        self.noise_std = noise_std;
        self
    }

    pub fn with_star(mut self, row: f64, col: f64, amplitude: f64) -> Self {
        self.stars.push(Star {
            row,
            col,
            amplitude,
            sigma: DEFAULT_PSF_SIGMA,
        });
        self
    }

    /// Render to 16-bit digital numbers, clamped to the `u16` range.
    pub fn render<R: Rng + ?Sized>(&self, rng: &mut R) -> Array2<u16> {
        let (rows, cols) = (self.size.height, self.size.width);
        let mut image = Array2::<f64>::from_elem((rows, cols), self.background);

        for star in &self.stars {
            // 7 pixel radius covers the PSF out to >5 sigma
            let radius = 7.0;
            let r_min = (star.row - radius).max(0.0) as usize;
            let r_max = ((star.row + radius).max(0.0) as usize + 1).min(rows);
            let c_min = (star.col - radius).max(0.0) as usize;
            let c_max = ((star.col + radius).max(0.0) as usize + 1).min(cols);
            let two_sigma2 = 2.0 * star.sigma * star.sigma;

            for r in r_min..r_max {
                for c in c_min..c_max {
                    let dr = r as f64 - star.row;
                    let dc = c as f64 - star.col;
                    image[[r, c]] += star.amplitude * (-(dr * dr + dc * dc) / two_sigma2).exp();
                }
            }
        }

        if self.noise_std > 0.0 {
            let noise = Normal::new(0.0, self.noise_std).expect("noise std must be finite");
            for pixel in image.iter_mut() {
                *pixel += noise.sample(rng);
            }
        }

        image.mapv(|v| v.round().clamp(0.0, u16::MAX as f64) as u16)
    }
}

/// Draw `count` distinct coordinates at least `min_separation` apart.
///
/// Points keep `margin` pixels from every edge and stay `min_separation` away
/// from every coordinate in `avoid`.
///
/// # Panics
/// If the frame cannot hold that many points at the requested spacing.
pub fn scatter_points<R: Rng + ?Sized>(
    size: ImageSize,
    count: usize,
    min_separation: f64,
    margin: usize,
    avoid: &[PixelCoord],
    rng: &mut R,
) -> Vec<PixelCoord> {
    assert!(
        size.height > 2 * margin && size.width > 2 * margin,
        "margin {margin} leaves no room in {size}"
    );

    let mut points: Vec<PixelCoord> = Vec::with_capacity(count);
    let mut draws = 0;
    while points.len() < count {
        draws += 1;
        assert!(
            draws <= MAX_DRAWS_PER_POINT * count.max(1),
            "could not place {count} points {min_separation}px apart in {size}"
        );

        let candidate = PixelCoord::new(
            rng.random_range(margin..size.height - margin),
            rng.random_range(margin..size.width - margin),
        );
        let clear = points
            .iter()
            .chain(avoid)
            .all(|p| p.distance_to(&candidate) >= min_separation);
        if clear {
            points.push(candidate);
        }
    }
    points
}

/// Overwrite every listed pixel with `value`.
pub fn set_pixels(data: &mut Array2<u16>, points: &[PixelCoord], value: u16) {
    for point in points {
        data[point.as_index()] = value;
    }
}

/// Segment bundles as returned by a line finder for streaks starting at `starts`.
///
/// Each streak yields `segments_per_streak` segments whose start points are
/// jittered by at most `jitter` pixels per axis around the true start, so two
/// segments of one streak are never more than `2 * jitter * sqrt(2)` apart.
/// End points run `length` pixels from the start at a per-streak angle and are
/// clamped to the frame. Segments of different streaks are interleaved in the
/// output the way a line finder reports them.
pub fn streak_segments<R: Rng + ?Sized>(
    size: ImageSize,
    starts: &[PixelCoord],
    segments_per_streak: usize,
    jitter: usize,
    length: f64,
    rng: &mut R,
) -> Vec<LineSegment> {
    let angles: Vec<f64> = starts
        .iter()
        .map(|_| rng.random_range(0.0..std::f64::consts::TAU))
        .collect();

    let jittered = |value: usize, limit: usize, rng: &mut R| -> usize {
        let low = value.saturating_sub(jitter);
        let high = (value + jitter).min(limit - 1);
        rng.random_range(low..=high)
    };

    let mut segments = Vec::with_capacity(starts.len() * segments_per_streak);
    for _ in 0..segments_per_streak {
        for (start, angle) in starts.iter().zip(&angles) {
            let p0 = PixelCoord::new(
                jittered(start.row, size.height, &mut *rng),
                jittered(start.col, size.width, &mut *rng),
            );
            let end_row = p0.row as f64 + length * angle.sin();
            let end_col = p0.col as f64 + length * angle.cos();
            let p1 = PixelCoord::new(
                end_row.round().clamp(0.0, (size.height - 1) as f64) as usize,
                end_col.round().clamp(0.0, (size.width - 1) as f64) as usize,
            );
            segments.push(LineSegment::new(p0, p1));
        }
    }
    segments
}
