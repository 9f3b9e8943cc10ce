//! Daily aggregation of regularly sampled series.
//!
//! `aggregate_daily` takes the flat sample list of a gauge record and
//! organizes it into one row per day, making it convenient to ask "what was
//! the mean discharge on May 2nd?" without re-windowing the samples every
//! time. Windows are fixed-size runs of `samples_per_day` consecutive
//! samples; the last window may be short and is reduced over whatever it
//! holds.

use chrono::NaiveDateTime;

use crate::model::{ensure_same_len, AggregateMethod, DailyValue, HydroError, Result};

const MINUTES_PER_DAY: u32 = 24 * 60;

/// Samples in one day at the given sampling interval (96 for 15-minute data).
///
/// # Errors
/// `InvalidInput` unless `interval_minutes` is in `1..=1440`.
pub fn samples_per_day(interval_minutes: u32) -> Result<usize> {
    if !(1..=MINUTES_PER_DAY).contains(&interval_minutes) {
        return Err(HydroError::InvalidInput(format!(
            "sampling interval must be 1..=1440 minutes, got {}",
            interval_minutes
        )));
    }
    Ok((MINUTES_PER_DAY / interval_minutes) as usize)
}

/// Groups consecutive samples into windows of `samples_per_day` and reduces
/// each with `method`. Each row is labelled with the calendar day of the
/// first timestamp in its window.
///
/// # Errors
/// - `ShapeMismatch`: values and timestamps differ in length.
/// - `InvalidInput`: empty series or a zero window.
pub fn aggregate_daily(
    values: &[f64],
    timestamps: &[NaiveDateTime],
    samples_per_day: usize,
    method: AggregateMethod,
) -> Result<Vec<DailyValue>> {
    ensure_same_len("values/timestamps", values.len(), timestamps.len())?;

    if values.is_empty() {
        return Err(HydroError::InvalidInput(
            "cannot aggregate an empty series".to_string(),
        ));
    }
    if samples_per_day == 0 {
        return Err(HydroError::InvalidInput(
            "samples per day must be at least 1".to_string(),
        ));
    }

    let days: Vec<DailyValue> = values
        .chunks(samples_per_day)
        .zip(timestamps.chunks(samples_per_day))
        .map(|(window, stamps)| {
            let sum: f64 = window.iter().sum();
            let value = match method {
                AggregateMethod::Mean => sum / window.len() as f64,
                AggregateMethod::Sum => sum,
            };
            DailyValue {
                day: stamps[0].date(),
                value,
                samples: window.len(),
            }
        })
        .collect();

    if let Some(last) = days.last() {
        if last.samples < samples_per_day {
            log::warn!(
                "final day {} holds {} of {} samples; aggregated as-is",
                last.day,
                last.samples,
                samples_per_day
            );
        }
    }

    Ok(days)
}

/// Just the reduced values of a daily aggregate, in day order.
pub fn daily_values(days: &[DailyValue]) -> Vec<f64> {
    days.iter().map(|d| d.value).collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
