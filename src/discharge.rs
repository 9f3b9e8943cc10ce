//! Regularly sampled discharge record for one gauge.
//!
//! A `DischargeSeries` owns the timestamps, discharge values and optional
//! rainfall of a gauge record at a fixed logger interval. Its methods hand
//! the record to the analysis functions and return new values; the series
//! itself never changes after construction, and it keeps no baseflow
//! estimate between calls. Cascading filter passes is done by naming the
//! passes (`"fff"`, `passes = 3`), not by calling a method repeatedly.

use chrono::NaiveDateTime;

use crate::analysis::baseflow::{eckhardt_passes, lyne_hollick_passes, Separation};
use crate::analysis::daily::{aggregate_daily, daily_values, samples_per_day};
use crate::analysis::statistics::{flashiness, flow_duration, FlowDurationCurve};
use crate::model::{ensure_same_len, AggregateMethod, DailyValue, Direction, HydroError, Result};
use crate::rating::RatingCurve;

#[derive(Debug, Clone)]
pub struct DischargeSeries {
    timestamps: Vec<NaiveDateTime>,
    discharge: Vec<f64>,
    rainfall: Option<Vec<f64>>,
    interval_minutes: u32,
    samples_per_day: usize,
}

impl DischargeSeries {
    /// Builds a series from parallel sequences.
    ///
    /// # Errors
    /// - `ShapeMismatch`: timestamps, discharge, or rainfall lengths differ.
    /// - `InvalidInput`: empty record or interval outside `1..=1440`.
    pub fn new(
        timestamps: Vec<NaiveDateTime>,
        discharge: Vec<f64>,
        rainfall: Option<Vec<f64>>,
        interval_minutes: u32,
    ) -> Result<Self> {
        ensure_same_len("timestamps/discharge", timestamps.len(), discharge.len())?;
        if let Some(rain) = &rainfall {
            ensure_same_len("discharge/rainfall", discharge.len(), rain.len())?;
        }
        if discharge.is_empty() {
            return Err(HydroError::InvalidInput(
                "discharge series must not be empty".to_string(),
            ));
        }
        let samples_per_day = samples_per_day(interval_minutes)?;

        Ok(DischargeSeries {
            timestamps,
            discharge,
            rainfall,
            interval_minutes,
            samples_per_day,
        })
    }

    /// Builds a series from stage readings converted through a rating curve
    /// (discharge rounded to three decimals).
    pub fn from_stage(
        timestamps: Vec<NaiveDateTime>,
        stage_ft: &[f64],
        rainfall: Option<Vec<f64>>,
        interval_minutes: u32,
        curve: &RatingCurve,
    ) -> Result<Self> {
        let discharge = curve.evaluate(stage_ft)?;
        Self::new(timestamps, discharge, rainfall, interval_minutes)
    }

    pub fn timestamps(&self) -> &[NaiveDateTime] {
        &self.timestamps
    }

    pub fn discharge(&self) -> &[f64] {
        &self.discharge
    }

    pub fn rainfall(&self) -> Option<&[f64]> {
        self.rainfall.as_deref()
    }

    pub fn interval_minutes(&self) -> u32 {
        self.interval_minutes
    }

    pub fn len(&self) -> usize {
        self.discharge.len()
    }

    pub fn is_empty(&self) -> bool {
        self.discharge.is_empty()
    }

    pub fn samples_per_day(&self) -> usize {
        self.samples_per_day
    }

    /// Daily discharge, reduced with `method`.
    pub fn daily(&self, method: AggregateMethod) -> Result<Vec<DailyValue>> {
        aggregate_daily(
            &self.discharge,
            &self.timestamps,
            self.samples_per_day(),
            method,
        )
    }

    /// Daily rainfall totals, or `None` when the record carries no rainfall.
    pub fn daily_rainfall(&self) -> Option<Result<Vec<DailyValue>>> {
        self.rainfall.as_ref().map(|rain| {
            aggregate_daily(
                rain,
                &self.timestamps,
                self.samples_per_day(),
                AggregateMethod::Sum,
            )
        })
    }

    /// Richards-Baker flashiness of the daily mean discharge.
    pub fn flashiness(&self) -> Result<f64> {
        let days = self.daily(AggregateMethod::Mean)?;
        flashiness(&daily_values(&days))
    }

    /// Flow duration curve of the raw samples.
    pub fn flow_duration(&self) -> Result<FlowDurationCurve> {
        flow_duration(&self.discharge)
    }

    /// Lyne-Hollick baseflow after the given cascade of passes.
    pub fn lyne_hollick(&self, alpha: f64, passes: &[Direction]) -> Result<Vec<f64>> {
        lyne_hollick_passes(&self.discharge, alpha, passes)
    }

    /// Eckhardt baseflow after `passes` cascaded applications.
    pub fn eckhardt(&self, alpha: f64, bfi_max: f64, passes: usize) -> Result<Vec<f64>> {
        eckhardt_passes(&self.discharge, alpha, bfi_max, passes)
    }

    /// Pairs a baseflow estimate of this series with the matching runoff.
    pub fn separate(&self, baseflow: Vec<f64>) -> Result<Separation> {
        Separation::new(&self.discharge, baseflow)
    }
}
