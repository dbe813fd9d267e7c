//! Frame anomaly screening tool
//!
//! Screens a set of camera frames for hot pixels, or counts streaks in the
//! line segments an external line finder produced for each frame.
//!
//! # Usage
//!
//! ```bash
//! # Hot pixels present in every frame under two directories, 3 sigma
//! cargo run --release --bin frame_screen -- hot-pixels -d run1/ -d run2/ --sigma 3
//!
//! # Same, with column-reversed frames and toroidal neighbor lookup
//! cargo run --release --bin frame_screen -- hot-pixels -d run1/ --flip-horizontal --edge-policy wrap
//!
//! # Streak counts per frame from line finder output
//! cargo run --release --bin frame_screen -- streaks -s segments.json --clustering connected
//! ```
//!
//! Settings may be seeded from a JSON config file with `--config`; explicit
//! flags take precedence over the file. Set `RUST_LOG=debug` to see per-frame
//! thresholds.

use anomaly::report::HotPixelReport;
use anomaly::streaks::{count_streaks_per_frame, FrameSegments};
use anomaly::{find_hot_pixels, NeighborEdgePolicy, ScreenConfig, StreakClustering};
use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use log::{info, warn};
use ndarray::Array2;
use shared::Frame;
use std::path::{Path, PathBuf};

/// Frame file extensions accepted by the hot pixel loader
const FRAME_EXTENSIONS: [&str; 4] = ["png", "tif", "tiff", "pgm"];

#[derive(Parser, Debug)]
#[command(author, version, about = "Screen camera frames for hot pixels and streaks")]
struct Cli {
    /// JSON screening configuration to start from
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Find pixels that are isolated and active in every frame
    HotPixels {
        /// Directory of 16-bit grayscale frames (repeatable)
        #[arg(short, long = "dir", required = true)]
        dirs: Vec<PathBuf>,

        /// Standard deviations above the frame mean for a pixel to be active
        #[arg(long)]
        sigma: Option<f64>,

        /// Treatment of neighbors beyond the frame edge
        #[arg(long, value_enum)]
        edge_policy: Option<NeighborEdgePolicy>,

        /// Mirror every frame left to right before screening
        #[arg(long)]
        flip_horizontal: bool,

        /// Output file for the JSON report
        #[arg(short, long, default_value = "hot_pixels.json")]
        output: PathBuf,
    },

    /// Count distinct streaks in per-frame line segments
    Streaks {
        /// JSON list of {frame, obsdate?, segments} records
        #[arg(short, long)]
        segments: PathBuf,

        /// Start-point clustering distance in pixels
        #[arg(long)]
        distance: Option<f64>,

        #[arg(long, value_enum)]
        clustering: Option<StreakClustering>,

        /// Optional output file for the per-frame counts as JSON
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn frame_paths(dirs: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::new();
    for dir in dirs {
        let entries = std::fs::read_dir(dir)
            .with_context(|| format!("Failed to read frame directory {}", dir.display()))?;
        for entry in entries {
            let path = entry?.path();
            let accepted = path
                .extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| FRAME_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()));
            if path.is_file() && accepted {
                paths.push(path);
            }
        }
    }
    paths.sort();
    Ok(paths)
}

fn load_frame(path: &Path, flip_horizontal: bool) -> Result<Frame> {
    let image = image::open(path)
        .with_context(|| format!("Failed to decode {}", path.display()))?
        .into_luma16();
    let (width, height) = image.dimensions();
    let data = Array2::from_shape_vec((height as usize, width as usize), image.into_raw())?;
    // File modification time stands in for the exposure timestamp
    let modified = std::fs::metadata(path)?.modified()?;
    let frame = Frame::new(data)
        .with_context(|| format!("Rejected {}", path.display()))?
        .with_observed_at(DateTime::<Utc>::from(modified));
    Ok(if flip_horizontal {
        frame.flipped_horizontal()
    } else {
        frame
    })
}

fn run_hot_pixels(
    config: ScreenConfig,
    dirs: &[PathBuf],
    flip_horizontal: bool,
    output: &Path,
) -> Result<()> {
    config.validate()?;
    let paths = frame_paths(dirs)?;
    if paths.is_empty() {
        bail!("No frame files found in {:?}", dirs);
    }
    info!("Loading {} frames", paths.len());

    let pb = ProgressBar::new(paths.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("#>-"),
    );
    pb.set_message("Loading frames");

    let mut frames = Vec::with_capacity(paths.len());
    for path in &paths {
        frames.push(load_frame(path, flip_horizontal)?);
        pb.inc(1);
    }
    pb.finish_with_message("Frames loaded");

    let scan = find_hot_pixels(&frames, &config)?;
    let report = HotPixelReport::new(&scan, &frames);

    for trace in &report.hot_pixels {
        info!(
            "Hot pixel {}: mean {:.1} DN (min {}, max {})",
            trace.coord, trace.mean, trace.min, trace.max
        );
    }
    println!(
        "{} hot pixels across {} frames",
        report.hot_pixels.len(),
        report.num_frames
    );

    report
        .save_to_file(output)
        .with_context(|| format!("Failed to write {}", output.display()))?;
    // Keep the settings next to the report so the run can be repeated
    config.save_to_file(&output.with_extension("config.json"))?;
    info!("Report written to {}", output.display());
    Ok(())
}

fn run_streaks(config: ScreenConfig, segments: &Path, output: Option<&Path>) -> Result<()> {
    let json = std::fs::read_to_string(segments)
        .with_context(|| format!("Failed to read {}", segments.display()))?;
    let frames: Vec<FrameSegments> = serde_json::from_str(&json)
        .with_context(|| format!("Malformed segment file {}", segments.display()))?;
    if frames.is_empty() {
        warn!("{} lists no frames", segments.display());
    }

    let counts = count_streaks_per_frame(&frames, config.streak_distance, config.clustering)?;
    for count in &counts {
        match count.observed_at {
            Some(at) => println!(
                "{}\t{}\t{} streaks ({} segments)",
                count.frame, at, count.streaks, count.segments
            ),
            None => println!(
                "{}\t{} streaks ({} segments)",
                count.frame, count.streaks, count.segments
            ),
        }
    }

    if let Some(path) = output {
        std::fs::write(path, serde_json::to_string_pretty(&counts)?)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        info!("Streak counts written to {}", path.display());
    }
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => ScreenConfig::load_from_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => ScreenConfig::default(),
    };

    match cli.command {
        Commands::HotPixels {
            dirs,
            sigma,
            edge_policy,
            flip_horizontal,
            output,
        } => {
            if let Some(sigma) = sigma {
                config = config.with_sigma(sigma);
            }
            if let Some(policy) = edge_policy {
                config = config.with_edge_policy(policy);
            }
            run_hot_pixels(config, &dirs, flip_horizontal, &output)
        }
        Commands::Streaks {
            segments,
            distance,
            clustering,
            output,
        } => {
            if let Some(distance) = distance {
                config = config.with_streak_distance(distance);
            }
            if let Some(clustering) = clustering {
                config = config.with_clustering(clustering);
            }
            config.validate()?;
            run_streaks(config, &segments, output.as_deref())
        }
    }
}
