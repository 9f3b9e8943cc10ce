//! Channel sinuosity from surveyed centerline points.
//!
//! Sinuosity is along-channel length over straight-line distance. Points are
//! assumed evenly spaced along the channel (`point_spacing` apart) and
//! already projected into planar, unit-consistent coordinates; projection is
//! the caller's job.
//!
//! For each point a window of `window_points = floor(window_length /
//! point_spacing)` points either side is measured:
//!
//! ```text
//! i < w              window 0 ..= i+w        along = (i+w)·spacing
//! fewer than w+1     window i-w ..= L-1      along = (L-1-i+w)·spacing
//!   points from i
//! otherwise          window i-w ..= i+w      along = 2w·spacing
//! ```

use serde::Serialize;

use crate::model::{ensure_same_len, HydroError, Result};

/// Result of a sinuosity query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Sinuosity {
    /// Whole reach from two endpoints.
    Reach(f64),
    /// One ratio per input point.
    Profile(Vec<f64>),
}

impl Sinuosity {
    pub fn as_reach(&self) -> Option<f64> {
        match self {
            Sinuosity::Reach(value) => Some(*value),
            Sinuosity::Profile(_) => None,
        }
    }

    pub fn as_profile(&self) -> Option<&[f64]> {
        match self {
            Sinuosity::Reach(_) => None,
            Sinuosity::Profile(values) => Some(values),
        }
    }
}

fn straight_line(easting: &[f64], northing: &[f64], from: usize, to: usize) -> f64 {
    (easting[to] - easting[from]).hypot(northing[to] - northing[from])
}

/// Sinuosity at every point, or of a whole reach.
///
/// With exactly two coordinates and `window_points / 2 == 1` the input is
/// read as the endpoints of a reach `point_spacing` long and a single ratio
/// is returned. Otherwise one ratio per point is computed with the windows
/// described in the module docs.
///
/// # Errors
/// - `ShapeMismatch`: easting and northing lengths differ.
/// - `InvalidInput`: non-positive window or spacing, a window shorter than
///   one point, fewer than `2·window_points` points, or a window whose
///   endpoints coincide.
pub fn sinuosity(
    easting: &[f64],
    northing: &[f64],
    window_length: f64,
    point_spacing: f64,
) -> Result<Sinuosity> {
    ensure_same_len("easting/northing", easting.len(), northing.len())?;

    if !(window_length.is_finite() && window_length > 0.0) {
        return Err(HydroError::InvalidInput(format!(
            "sinuosity window length must be positive, got {}",
            window_length
        )));
    }
    if !(point_spacing.is_finite() && point_spacing > 0.0) {
        return Err(HydroError::InvalidInput(format!(
            "point spacing must be positive, got {}",
            point_spacing
        )));
    }

    let window_points = (window_length / point_spacing).floor() as usize;
    let len = easting.len();

    if len == 2 && window_points / 2 == 1 {
        let distance = straight_line(easting, northing, 0, 1);
        if distance == 0.0 {
            return Err(HydroError::InvalidInput(
                "reach endpoints coincide".to_string(),
            ));
        }
        return Ok(Sinuosity::Reach(point_spacing / distance));
    }

    if window_points == 0 {
        return Err(HydroError::InvalidInput(format!(
            "window length {} is shorter than the point spacing {}",
            window_length, point_spacing
        )));
    }
    // `window_points` saturates for huge windows, so halve `len` instead of doubling it.
    if len / 2 < window_points {
        return Err(HydroError::InvalidInput(format!(
            "need at least {} points for a {}-point window, got {}",
            window_points.saturating_mul(2),
            window_points,
            len
        )));
    }

    let w = window_points;
    let mut ratios = Vec::with_capacity(len);
    for i in 0..len {
        let (from, to, steps) = if i < w {
            (0, i + w, i + w)
        } else if len - i < w + 1 {
            (i - w, len - 1, len - 1 - i + w)
        } else {
            (i - w, i + w, 2 * w)
        };

        let distance = straight_line(easting, northing, from, to);
        if distance == 0.0 {
            return Err(HydroError::InvalidInput(format!(
                "window endpoints {} and {} coincide at point {}",
                from, to, i
            )));
        }
        ratios.push(steps as f64 * point_spacing / distance);
    }

    if let Some(i) = ratios.iter().position(|&r| r < 1.0) {
        log::warn!(
            "sinuosity below 1 at point {} ({:.4}); check point spacing against the coordinates",
            i,
            ratios[i]
        );
    }

    Ok(Sinuosity::Profile(ratios))
}

/// Sinuosity of a whole reach: reach length over the straight-line
/// distance between its endpoints.
pub fn reach_sinuosity(start: (f64, f64), end: (f64, f64), reach_length: f64) -> Result<f64> {
    let result = sinuosity(
        &[start.0, end.0],
        &[start.1, end.1],
        reach_length * 2.0,
        reach_length,
    )?;
    result.as_reach().ok_or_else(|| {
        HydroError::InvalidInput(format!("reach length must be positive, got {}", reach_length))
    })
}
