//! Inverse distance weighted interpolation.
//!
//! Every observation contributes to every query point with weight
//! `1 / d^power`, normalized so the weights at each query point sum to one.
//!
//! Reference:
//! Shepard, D. (1968). A two-dimensional interpolation function for
//! irregularly-spaced data. ACM National Conference.

use serde::Serialize;

use crate::model::{ensure_same_len, HydroError, Result};

/// Plain `1/d` weighting.
pub const DEFAULT_IDW_POWER: f64 = 1.0;

/// Interpolates observed `z` at `(x, y)` onto each query point `(xi, yi)`.
///
/// # Errors
/// - `ShapeMismatch`: `x`/`y`/`z` or `xi`/`yi` lengths differ.
/// - `InvalidInput`: no observations, a non-positive power, or a query
///   point coincident with an observation (its weight would be infinite).
pub fn idw(x: &[f64], y: &[f64], z: &[f64], xi: &[f64], yi: &[f64], power: f64) -> Result<Vec<f64>> {
    ensure_same_len("x/y", x.len(), y.len())?;
    ensure_same_len("x/z", x.len(), z.len())?;
    ensure_same_len("xi/yi", xi.len(), yi.len())?;

    if x.is_empty() {
        return Err(HydroError::InvalidInput(
            "IDW needs at least one observation".to_string(),
        ));
    }
    if !(power.is_finite() && power > 0.0) {
        return Err(HydroError::InvalidInput(format!(
            "IDW power must be positive, got {}",
            power
        )));
    }

    let mut values = Vec::with_capacity(xi.len());
    for (q, (&qx, &qy)) in xi.iter().zip(yi).enumerate() {
        let mut sum_w = 0.0;
        let mut sum_wz = 0.0;

        for (k, ((&ox, &oy), &oz)) in x.iter().zip(y).zip(z).enumerate() {
            let d = (ox - qx).hypot(oy - qy);
            if d == 0.0 {
                return Err(HydroError::InvalidInput(format!(
                    "query point {} coincides with observation {} at ({}, {})",
                    q, k, qx, qy
                )));
            }
            let w = 1.0 / d.powf(power);
            sum_w += w;
            sum_wz += w * oz;
        }

        values.push(sum_wz / sum_w);
    }

    Ok(values)
}

/// Square grid of interpolated values, row-major.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Grid {
    pub rows: usize,
    pub cols: usize,
    pub values: Vec<f64>,
}

impl Grid {
    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        if row >= self.rows || col >= self.cols {
            return None;
        }
        self.values.get(row * self.cols + col).copied()
    }
}

/// `idw` over flattened grid coordinates, reshaped into an `s × s` grid.
///
/// # Errors
/// As `idw`, plus `InvalidInput` when the query count is not a perfect square.
pub fn idw_grid(x: &[f64], y: &[f64], z: &[f64], xi: &[f64], yi: &[f64], power: f64) -> Result<Grid> {
    let side = xi.len().isqrt();
    if side * side != xi.len() {
        return Err(HydroError::InvalidInput(format!(
            "{} query points do not form a square grid",
            xi.len()
        )));
    }

    let values = idw(x, y, z, xi, yi, power)?;
    Ok(Grid {
        rows: side,
        cols: side,
        values,
    })
}
