//! Observation timestamps stored as fractional years.
//!
//! Camera headers record the exposure start as `year + fraction`, e.g.
//! `2017.2743`. The fraction is scaled by 365.25 days and counted from
//! midnight UTC on 1 January of the stamp's own year.

use chrono::{DateTime, TimeDelta, TimeZone, Utc};
use thiserror::Error;

const DAYS_PER_YEAR: f64 = 365.25;
const MILLIS_PER_DAY: f64 = 86_400_000.0;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ObsTimeError {
    #[error("Observation stamp {0} is not a finite, non-negative year")]
    InvalidStamp(f64),
    #[error("Year {0} is outside the supported calendar range")]
    YearOutOfRange(i64),
}

/// Convert a fractional-year stamp into a UTC timestamp.
pub fn from_fractional_year(stamp: f64) -> Result<DateTime<Utc>, ObsTimeError> {
    if !stamp.is_finite() || stamp < 0.0 {
        return Err(ObsTimeError::InvalidStamp(stamp));
    }

    let year = stamp.trunc();
    let year_i32 =
        i32::try_from(year as i64).map_err(|_| ObsTimeError::YearOutOfRange(year as i64))?;
    let start = Utc
        .with_ymd_and_hms(year_i32, 1, 1, 0, 0, 0)
        .single()
        .ok_or(ObsTimeError::YearOutOfRange(year as i64))?;

    let millis = ((stamp - year) * DAYS_PER_YEAR * MILLIS_PER_DAY).round() as i64;
    let offset =
        TimeDelta::try_milliseconds(millis).ok_or(ObsTimeError::InvalidStamp(stamp))?;

    start
        .checked_add_signed(offset)
        .ok_or(ObsTimeError::YearOutOfRange(year as i64))
}
