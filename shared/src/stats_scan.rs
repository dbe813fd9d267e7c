//! StatsScan - computes statistics over floating point data
//!
//! Min, max, and mean come from a single pass; the population variance and
//! standard deviation need a second pass over the same values. Values are taken
//! from any iterator so frame pixels can be scanned without first copying the
//! whole grid into a float buffer.
//!
//! Scanning stops at the first NaN, which is then reported as an error.

use num_traits::float::Float;
use std::fmt;
use thiserror::Error;

/// Error types for StatsScan operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StatsError {
    #[error("NaN value encountered at index {0}")]
    NaNEncountered(usize),
    #[error("No data provided (empty input)")]
    NoData,
}

/// A scanner for statistics over floating point data
#[derive(Debug, Clone)]
pub struct StatsScan<T: Float> {
    min_value: Option<T>,
    max_value: Option<T>,
    sum: T,
    count: usize,
    nan_index: Option<usize>,
}

impl<T: Float + fmt::Debug> StatsScan<T> {
    /// Scan any sequence of values in one pass, collecting min, max, sum and count.
    pub fn scan<I: IntoIterator<Item = T>>(values: I) -> Self {
        let mut min_value: Option<T> = None;
        let mut max_value: Option<T> = None;
        let mut sum = T::zero();
        let mut count = 0usize;
        let mut nan_index = None;

        for (index, value) in values.into_iter().enumerate() {
            if value.is_nan() {
                nan_index = Some(index);
                break;
            }

            sum = sum + value;
            count += 1;

            min_value = Some(match min_value {
                Some(min) if min <= value => min,
                _ => value,
            });
            max_value = Some(match max_value {
                Some(max) if max >= value => max,
                _ => value,
            });
        }

        Self {
            min_value,
            max_value,
            sum,
            count,
            nan_index,
        }
    }

    fn check(&self) -> Result<(), StatsError> {
        match self.nan_index {
            Some(index) => Err(StatsError::NaNEncountered(index)),
            None if self.count == 0 => Err(StatsError::NoData),
            None => Ok(()),
        }
    }

    pub fn min(&self) -> Result<T, StatsError> {
        self.check()?;
        self.min_value.ok_or(StatsError::NoData)
    }

    pub fn max(&self) -> Result<T, StatsError> {
        self.check()?;
        self.max_value.ok_or(StatsError::NoData)
    }

    /// Arithmetic mean of the scanned values
    pub fn mean(&self) -> Result<T, StatsError> {
        self.check()?;
        let n = T::from(self.count).ok_or(StatsError::NoData)?;
        Ok(self.sum / n)
    }

    /// Population variance (second pass required)
    ///
    /// `values` must yield the same sequence that was scanned.
    pub fn variance<I: IntoIterator<Item = T>>(&self, values: I) -> Result<T, StatsError> {
        let mean = self.mean()?;
        let n = T::from(self.count).ok_or(StatsError::NoData)?;

        let sum_squared_diff = values
            .into_iter()
            .take(self.count)
            .map(|x| {
                let diff = x - mean;
                diff * diff
            })
            .fold(T::zero(), |acc, x| acc + x);

        Ok(sum_squared_diff / n)
    }

    /// Population standard deviation (second pass required)
    pub fn std_dev<I: IntoIterator<Item = T>>(&self, values: I) -> Result<T, StatsError> {
        Ok(self.variance(values)?.sqrt())
    }
}
