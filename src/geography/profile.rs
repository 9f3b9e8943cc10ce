//! Longitudinal stream profiles.
//!
//! Elevations run from source to mouth and should never rise downstream.
//! Road crossings and DEM noise leave upward bumps; `smooth_profile` replaces
//! each bump with a straight line from the last good point to the first point
//! downstream that is no higher.

use serde::Serialize;

use crate::model::{ensure_same_len, HydroError, Result};

/// Removes upward bumps from an elevation profile ordered source to mouth.
///
/// The last element is first lowered to the global minimum so every bump
/// has a point to close against. For a rise at `i`, the first later index
/// `j` with `elevation[j] <= elevation[i-1]` is found and `[i, j)` is
/// interpolated linearly (by index) between `elevation[i-1]` and
/// `elevation[j]`. The result is non-increasing.
///
/// # Errors
/// `InvalidInput` when an elevation is NaN.
pub fn smooth_profile(elevation: &[f64]) -> Result<Vec<f64>> {
    if let Some(i) = elevation.iter().position(|e| e.is_nan()) {
        return Err(HydroError::InvalidInput(format!(
            "elevation at index {} is NaN",
            i
        )));
    }

    let mut smoothed = elevation.to_vec();
    let n = smoothed.len();
    if n < 2 {
        return Ok(smoothed);
    }

    let lowest = smoothed.iter().copied().fold(f64::INFINITY, f64::min);
    smoothed[n - 1] = lowest;

    let mut i = 1;
    while i < n {
        if smoothed[i] <= smoothed[i - 1] {
            i += 1;
            continue;
        }

        let anchor = smoothed[i - 1];
        // The last element holds the global minimum, so a closing point exists.
        let j = (i + 1..n)
            .find(|&k| smoothed[k] <= anchor)
            .unwrap_or(n - 1);

        let target = smoothed[j];
        let span = (j - (i - 1)) as f64;
        for (step, k) in (i..j).enumerate() {
            let t = (step + 1) as f64 / span;
            smoothed[k] = anchor + (target - anchor) * t;
        }
        log::trace!("profile bump at {}..{} flattened to {:.3}..{:.3}", i, j, anchor, target);

        i = j;
    }

    Ok(smoothed)
}

/// Surveyed profile with its smoothed elevations.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LongitudinalProfile {
    /// Along-stream distance of each point
    pub distance: Vec<f64>,
    pub elevation: Vec<f64>,
    pub smoothed: Vec<f64>,
}

impl LongitudinalProfile {
    pub fn new(distance: Vec<f64>, elevation: Vec<f64>) -> Result<Self> {
        ensure_same_len("distance/elevation", distance.len(), elevation.len())?;
        let smoothed = smooth_profile(&elevation)?;

        let profile = LongitudinalProfile {
            distance,
            elevation,
            smoothed,
        };
        log::debug!(
            "profile of {} points, {} corrected",
            profile.len(),
            profile.corrected_points()
        );
        Ok(profile)
    }

    pub fn len(&self) -> usize {
        self.elevation.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elevation.is_empty()
    }

    /// Raw minus smoothed elevation at each point; zero where nothing moved.
    pub fn corrections(&self) -> Vec<f64> {
        self.elevation
            .iter()
            .zip(&self.smoothed)
            .map(|(raw, smooth)| raw - smooth)
            .collect()
    }

    pub fn corrected_points(&self) -> usize {
        self.elevation
            .iter()
            .zip(&self.smoothed)
            .filter(|(raw, smooth)| raw != smooth)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ErrorKind;
    use approx::assert_relative_eq;

    fn assert_non_increasing(values: &[f64]) {
        for pair in values.windows(2) {
            assert!(pair[1] <= pair[0], "{} rises to {}", pair[0], pair[1]);
        }
    }

    #[test]
    fn test_single_bump_interpolated() {
        let smoothed = smooth_profile(&[10.0, 9.0, 11.0, 8.0, 7.0]).unwrap();
        assert_eq!(smoothed, vec![10.0, 9.0, 8.5, 8.0, 7.0]);
    }

    #[test]
    fn test_wide_bump_spans_to_closing_point() {
        // Rise at index 2 stays above 9 until index 5.
        let smoothed = smooth_profile(&[10.0, 9.0, 12.0, 11.0, 9.5, 6.0, 5.0]).unwrap();
        assert_relative_eq!(smoothed[2], 8.25, epsilon = 1e-12);
        assert_relative_eq!(smoothed[3], 7.5, epsilon = 1e-12);
        assert_relative_eq!(smoothed[4], 6.75, epsilon = 1e-12);
        assert_eq!(smoothed[5], 6.0);
        assert_non_increasing(&smoothed);
    }

    #[test]
    fn test_last_point_forced_to_minimum() {
        let smoothed = smooth_profile(&[10.0, 8.0, 9.0, 9.5]).unwrap();
        assert_eq!(smoothed, vec![10.0, 8.0, 8.0, 8.0]);
    }

    #[test]
    fn test_monotone_profile_untouched() {
        let raw = vec![100.0, 98.5, 98.5, 97.0, 90.0];
        assert_eq!(smooth_profile(&raw).unwrap(), raw);
        assert!(smooth_profile(&[]).unwrap().is_empty());
        assert_eq!(smooth_profile(&[3.0]).unwrap(), vec![3.0]);
    }

    #[test]
    fn test_noisy_profile_becomes_non_increasing() {
        let raw: Vec<f64> = (0..200)
            .map(|i| 500.0 - i as f64 * 0.8 + ((i * 13) % 7) as f64)
            .collect();
        let smoothed = smooth_profile(&raw).unwrap();
        assert_eq!(smoothed.len(), raw.len());
        assert_non_increasing(&smoothed);
    }

    #[test]
    fn test_longitudinal_profile_corrections() {
        let profile =
            LongitudinalProfile::new(vec![0.0, 1.0, 2.0, 3.0, 4.0], vec![10.0, 9.0, 11.0, 8.0, 7.0])
                .unwrap();
        assert_eq!(profile.len(), 5);
        assert_eq!(profile.corrected_points(), 1);
        assert_eq!(profile.corrections(), vec![0.0, 0.0, 2.5, 0.0, 0.0]);
    }

    #[test]
    fn test_longitudinal_profile_rejects_bad_input() {
        let err = LongitudinalProfile::new(vec![0.0], vec![1.0, 2.0]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ShapeMismatch);

        let err = LongitudinalProfile::new(vec![0.0, 1.0], vec![1.0, f64::NAN]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }
}
