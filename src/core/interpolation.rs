//! Logical index <-> time mapping that keeps working past the last bar.
//!
//! The host surface only knows times for bars that exist. Anchors placed in
//! the blank area to the right of the data (or left of it) still need a
//! timestamp, so the mapping is extrapolated linearly from the spacing of the
//! first two series samples: `time = time[0] + logical_index * interval`.

use serde::{Deserialize, Serialize};

/// Linear model `time = origin_time + logical_index * interval`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LogicalTimeInterpolation {
    origin_time: f64,
    interval: f64,
}

impl LogicalTimeInterpolation {
    /// Builds the model from the first two sample times.
    ///
    /// Returns `None` for a zero or non-finite interval.
    #[must_use]
    pub fn from_samples(first_time: f64, second_time: f64) -> Option<Self> {
        let interval = second_time - first_time;
        if !first_time.is_finite() || !interval.is_finite() || interval == 0.0 {
            return None;
        }
        Some(Self {
            origin_time: first_time,
            interval,
        })
    }

    /// Builds the model from a series time column, `None` with fewer than two samples.
    #[must_use]
    pub fn from_times(times: &[f64]) -> Option<Self> {
        match times {
            [first, second, ..] => Self::from_samples(*first, *second),
            _ => None,
        }
    }

    #[must_use]
    pub fn origin_time(self) -> f64 {
        self.origin_time
    }

    #[must_use]
    pub fn interval(self) -> f64 {
        self.interval
    }

    #[must_use]
    pub fn time_from_logical_index(self, logical_index: f64) -> Option<f64> {
        if !logical_index.is_finite() {
            return None;
        }
        let time = self.origin_time + logical_index * self.interval;
        time.is_finite().then_some(time)
    }

    #[must_use]
    pub fn logical_index_from_time(self, time: f64) -> Option<f64> {
        if !time.is_finite() {
            return None;
        }
        let logical = (time - self.origin_time) / self.interval;
        logical.is_finite().then_some(logical)
    }
}

/// Extrapolated time for a logical index, `None` when the series cannot define an interval.
#[must_use]
pub fn time_from_logical_index(times: &[f64], logical_index: f64) -> Option<f64> {
    LogicalTimeInterpolation::from_times(times)?.time_from_logical_index(logical_index)
}

/// Inverse of [`time_from_logical_index`].
#[must_use]
pub fn logical_index_from_time(times: &[f64], time: f64) -> Option<f64> {
    LogicalTimeInterpolation::from_times(times)?.logical_index_from_time(time)
}
