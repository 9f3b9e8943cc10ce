//! Flow statistics over discharge sequences.
//!
//! - `flashiness`: Richards-Baker index of day-to-day variability.
//! - `flow_duration`: empirical exceedance probability per distinct
//!   discharge value.

use serde::Serialize;

use crate::model::{HydroError, Result};

// ---------------------------------------------------------------------------
// Richards-Baker flashiness
// ---------------------------------------------------------------------------

/// Richards-Baker flashiness index of a daily discharge sequence:
/// `Σ|D[i] − D[i-1]| / Σ D[i]`.
///
/// A single day gives 0 (nothing to compare against).
///
/// # Errors
/// `InvalidInput` for an empty sequence or a zero total (all-zero flow).
pub fn flashiness(daily: &[f64]) -> Result<f64> {
    if daily.is_empty() {
        return Err(HydroError::InvalidInput(
            "flashiness needs at least one daily value".to_string(),
        ));
    }

    let total: f64 = daily.iter().sum();
    if total == 0.0 {
        return Err(HydroError::InvalidInput(
            "flashiness undefined: total discharge over the period is zero".to_string(),
        ));
    }

    let path: f64 = daily.windows(2).map(|w| (w[1] - w[0]).abs()).sum();
    Ok(path / total)
}

// ---------------------------------------------------------------------------
// Flow duration
// ---------------------------------------------------------------------------

/// One flow duration entry: a distinct discharge and its exceedance
/// percentage.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FlowDurationPoint {
    pub discharge: f64,
    /// Number of observations with exactly this discharge.
    pub count: usize,
    pub exceedance_pct: f64,
}

/// Flow duration curve, ordered by ascending discharge. Exceedance is
/// non-increasing along the curve and stays within [0, 100].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlowDurationCurve {
    pub points: Vec<FlowDurationPoint>,
}

impl FlowDurationCurve {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Largest discharge equalled or exceeded at least `percent` of the
    /// time, e.g. `flow_at(90.0)` is Q90.
    ///
    /// The share of observations at or above an entry is the exceedance of
    /// the entry before it (100 for the smallest value). `None` for an empty
    /// curve or a percent outside [0, 100].
    pub fn flow_at(&self, percent: f64) -> Option<f64> {
        if !(0.0..=100.0).contains(&percent) {
            return None;
        }

        let mut at_or_above = 100.0;
        let mut flow = None;
        for point in &self.points {
            if at_or_above < percent {
                break;
            }
            flow = Some(point.discharge);
            at_or_above = point.exceedance_pct;
        }
        flow
    }
}

/// Builds the flow duration curve of any discharge sequence.
///
/// Distinct values are counted and sorted ascending; with cumulative count
/// `c` over `N` observations each value maps to `100 − 100·c/N`. Ties
/// collapse into one entry carrying the combined count.
///
/// # Errors
/// `InvalidInput` for an empty sequence or a NaN value.
pub fn flow_duration(discharge: &[f64]) -> Result<FlowDurationCurve> {
    if discharge.is_empty() {
        return Err(HydroError::InvalidInput(
            "flow duration needs at least one discharge value".to_string(),
        ));
    }
    if let Some(i) = discharge.iter().position(|q| q.is_nan()) {
        return Err(HydroError::InvalidInput(format!(
            "discharge at index {} is NaN",
            i
        )));
    }

    let mut sorted = discharge.to_vec();
    sorted.sort_by(f64::total_cmp);

    let total = sorted.len() as f64;
    let mut points: Vec<FlowDurationPoint> = Vec::new();
    let mut cumulative = 0usize;

    for chunk in sorted.chunk_by(|a, b| a == b) {
        cumulative += chunk.len();
        points.push(FlowDurationPoint {
            discharge: chunk[0],
            count: chunk.len(),
            exceedance_pct: 100.0 - 100.0 * cumulative as f64 / total,
        });
    }

    log::debug!(
        "flow duration: {} observations, {} distinct values",
        discharge.len(),
        points.len()
    );

    Ok(FlowDurationCurve { points })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
