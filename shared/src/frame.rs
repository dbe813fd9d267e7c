//! Camera frame container.
//!
//! A [`Frame`] owns one exposure's corrected intensity grid (digital numbers)
//! together with the optional exposure time and observation timestamp reported
//! by the frame source. Detection code only ever reads frames.

use chrono::{DateTime, Utc};
use ndarray::{s, Array2, ArrayView2};
use std::time::Duration;
use thiserror::Error;

use crate::coordinate::PixelCoord;
use crate::image_size::ImageSize;
use crate::stats_scan::{StatsError, StatsScan};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FrameError {
    #[error("Frame has zero-sized dimensions ({0})")]
    EmptyFrame(ImageSize),
}

/// One camera exposure as a 2D grid of intensity values.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    data: Array2<u16>,
    exposure: Option<Duration>,
    observed_at: Option<DateTime<Utc>>,
}

impl Frame {
    /// Wrap an intensity grid, rejecting grids with a zero width or height.
    pub fn new(data: Array2<u16>) -> Result<Self, FrameError> {
        let size = ImageSize::from_shape(data.dim());
        if size.is_empty() {
            return Err(FrameError::EmptyFrame(size));
        }
        Ok(Self {
            data,
            exposure: None,
            observed_at: None,
        })
    }

    pub fn with_exposure(mut self, exposure: Duration) -> Self {
        self.exposure = Some(exposure);
        self
    }

    pub fn with_observed_at(mut self, observed_at: DateTime<Utc>) -> Self {
        self.observed_at = Some(observed_at);
        self
    }

    pub fn size(&self) -> ImageSize {
        ImageSize::from_shape(self.data.dim())
    }

    pub fn view(&self) -> ArrayView2<'_, u16> {
        self.data.view()
    }

    pub fn data(&self) -> &Array2<u16> {
        &self.data
    }

    pub fn exposure(&self) -> Option<Duration> {
        self.exposure
    }

    pub fn observed_at(&self) -> Option<DateTime<Utc>> {
        self.observed_at
    }

    /// Intensity at `coord`, or `None` when it lies outside the frame.
    pub fn get(&self, coord: PixelCoord) -> Option<u16> {
        self.data.get(coord.as_index()).copied()
    }

    /// Mean and population standard deviation of every pixel in the frame.
    pub fn pixel_stats(&self) -> Result<(f64, f64), StatsError> {
        let values = || self.data.iter().map(|&v| v as f64);
        let scan = StatsScan::scan(values());
        Ok((scan.mean()?, scan.std_dev(values())?))
    }

    /// Left-right mirrored copy, for sources whose readout is column-reversed.
    ///
    /// Metadata is carried over unchanged.
    pub fn flipped_horizontal(&self) -> Frame {
        Frame {
            data: self.data.slice(s![.., ..;-1]).to_owned(),
            exposure: self.exposure,
            observed_at: self.observed_at,
        }
    }
}
