//! Discharge record summary.
//!
//! Runs the configured analyses over one `DischargeSeries` and collects the
//! headline numbers into a serializable record:
//!
//! 1. **Daily aggregation** with the configured method
//! 2. **Flashiness** of the daily mean discharge
//! 3. **Baseflow separation** with both filters, reported as baseflow indices
//! 4. **Flow duration** percentiles Q10 / Q50 / Q90

use chrono::NaiveDate;
use serde::Serialize;

use crate::config::AnalysisConfig;
use crate::discharge::DischargeSeries;
use crate::model::Result;

/// Headline statistics for one discharge record.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DischargeSummary {
    pub first_day: NaiveDate,
    pub last_day: NaiveDate,
    pub days: usize,
    pub samples: usize,
    pub mean_daily_discharge: f64,
    pub max_daily_discharge: f64,
    pub flashiness: f64,
    pub lyne_hollick_bfi: f64,
    pub eckhardt_bfi: f64,
    /// Flow equalled or exceeded 10% of the time
    pub q10: Option<f64>,
    pub q50: Option<f64>,
    /// Flow equalled or exceeded 90% of the time
    pub q90: Option<f64>,
    /// Total rainfall over the record, when rainfall was logged
    pub total_rainfall: Option<f64>,
}

impl DischargeSummary {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Summarizes a discharge record with the given analysis parameters.
///
/// # Errors
/// Propagates the first failing analysis: a record shorter than two samples
/// cannot be filtered, and an all-zero record has no flashiness.
pub fn summarize(series: &DischargeSeries, config: &AnalysisConfig) -> Result<DischargeSummary> {
    config.validate()?;
    if config.series.interval_minutes != series.interval_minutes() {
        log::warn!(
            "configured interval {} min differs from the series interval {} min; using the series",
            config.series.interval_minutes,
            series.interval_minutes()
        );
    }

    let days = series.daily(config.series.daily_method)?;
    let daily: Vec<f64> = days.iter().map(|d| d.value).collect();
    let mean_daily_discharge = daily.iter().sum::<f64>() / daily.len() as f64;
    let max_daily_discharge = daily.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    let flashiness = series.flashiness()?;

    let b = &config.baseflow;
    let lh = series.lyne_hollick(b.lyne_hollick_alpha, &b.passes()?)?;
    let lyne_hollick_bfi = series.separate(lh)?.baseflow_index()?;
    let ek = series.eckhardt(b.eckhardt_alpha, b.bfi_max, b.eckhardt_passes)?;
    let eckhardt_bfi = series.separate(ek)?.baseflow_index()?;

    let fdc = series.flow_duration()?;

    let summary = DischargeSummary {
        // `daily` never returns an empty list for a constructed series
        first_day: days[0].day,
        last_day: days[days.len() - 1].day,
        days: days.len(),
        samples: series.len(),
        mean_daily_discharge,
        max_daily_discharge,
        flashiness,
        lyne_hollick_bfi,
        eckhardt_bfi,
        q10: fdc.flow_at(10.0),
        q50: fdc.flow_at(50.0),
        q90: fdc.flow_at(90.0),
        total_rainfall: series.rainfall().map(|r| r.iter().sum()),
    };

    log::debug!(
        "summarized {} samples over {} days: RB={:.4}, BFI(LH)={:.3}, BFI(E)={:.3}",
        summary.samples,
        summary.days,
        summary.flashiness,
        summary.lyne_hollick_bfi,
        summary.eckhardt_bfi
    );

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ErrorKind;
    use chrono::{Duration, NaiveDateTime};

    fn series_from(q: Vec<f64>, rain: Option<Vec<f64>>) -> DischargeSeries {
        let start: NaiveDateTime = NaiveDate::from_ymd_opt(2022, 6, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let stamps = (0..q.len())
            .map(|i| start + Duration::minutes(15 * i as i64))
            .collect();
        DischargeSeries::new(stamps, q, rain, 15).unwrap()
    }

    fn storm_record() -> Vec<f64> {
        // Three days of 15-minute data with a storm on day two.
        (0..288)
            .map(|i| {
                let t = i as f64;
                let storm = if (96..160).contains(&i) {
                    40.0 * ((t - 96.0) / 64.0 * std::f64::consts::PI).sin()
                } else {
                    0.0
                };
                5.0 + storm
            })
            .collect()
    }

    #[test]
    fn test_summary_headline_numbers() {
        let rain = (0..288).map(|i| if (90..100).contains(&i) { 0.2 } else { 0.0 }).collect();
        let series = series_from(storm_record(), Some(rain));
        let summary = summarize(&series, &AnalysisConfig::default()).unwrap();

        assert_eq!(summary.days, 3);
        assert_eq!(summary.samples, 288);
        assert_eq!(summary.first_day, NaiveDate::from_ymd_opt(2022, 6, 1).unwrap());
        assert_eq!(summary.last_day, NaiveDate::from_ymd_opt(2022, 6, 3).unwrap());
        assert!(summary.flashiness > 0.0);
        assert!(summary.max_daily_discharge > summary.mean_daily_discharge);
        assert!(summary.lyne_hollick_bfi > 0.0 && summary.lyne_hollick_bfi <= 1.0);
        assert!(summary.eckhardt_bfi > 0.0 && summary.eckhardt_bfi <= 1.0);
        assert_eq!(summary.q90, Some(5.0));
        assert!(summary.q10.unwrap() > summary.q90.unwrap());
        assert!((summary.total_rainfall.unwrap() - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_summary_serializes_to_json() {
        let series = series_from(storm_record(), None);
        let summary = summarize(&series, &AnalysisConfig::default()).unwrap();
        let json = summary.to_json().unwrap();

        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["days"], 3);
        assert_eq!(value["first_day"], "2022-06-01");
        assert!(value["total_rainfall"].is_null());
    }

    #[test]
    fn test_summary_uses_series_interval_over_config() {
        let series = series_from(storm_record(), None);
        let mut config = AnalysisConfig::default();
        config.series.interval_minutes = 60;

        let summary = summarize(&series, &config).unwrap();
        // 288 samples at 15 minutes are 3 days, not 12
        assert_eq!(summary.days, 3);
        assert_eq!(summary, summarize(&series, &AnalysisConfig::default()).unwrap());
    }

    #[test]
    fn test_summary_rejects_single_sample() {
        let series = series_from(vec![4.0], None);
        let err = summarize(&series, &AnalysisConfig::default()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }
}
