//! Stage-discharge rating curve.
//!
//! Fits the power law `Q = a·H^b` to field calibration pairs by nonlinear
//! least squares and maps arbitrary stage readings to discharge.
//!
//! # Fitting Process
//!
//! 1. **Starting point**: ordinary least squares on `ln Q = ln a + b·ln H`
//!    when every calibration discharge is positive, else `(1, 1)`.
//! 2. **Refinement**: Levenberg-Marquardt on the untransformed residuals, so
//!    the minimized quantity is `Σ(Q_i − a·H_i^b)²` rather than the
//!    log-space error.
//! 3. **Goodness of fit**: `R² = 1 − SS_res / SS_tot` against the observed
//!    discharges.

use serde::Serialize;

use crate::model::{ensure_same_len, HydroError, Result};

const MAX_ITERATIONS: usize = 200;
const MAX_DAMPING: f64 = 1e20;
const FTOL: f64 = 1e-12;
const XTOL: f64 = 1e-12;

/// Field calibration pair: stage height (ft) and measured discharge (cfs).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CalibrationSample {
    pub stage_ft: f64,
    pub discharge_cfs: f64,
}

/// Fitted power-law rating curve. Immutable once built.
#[derive(Debug, Clone, Serialize)]
pub struct RatingCurve {
    a: f64,
    b: f64,
    r_squared: f64,
    samples: Vec<CalibrationSample>,
}

impl RatingCurve {
    /// Fits `Q = a·H^b` to paired stage and discharge observations.
    ///
    /// # Errors
    /// - `ShapeMismatch`: stage and discharge lengths differ.
    /// - `InvalidInput`: a stage is zero, negative, or non-finite, or a
    ///   discharge is non-finite.
    /// - `Fit`: fewer than two samples, fewer than two distinct stages,
    ///   no discharge variance, overflowing or singular normal equations, or
    ///   no convergence.
    pub fn fit(stage: &[f64], discharge: &[f64]) -> Result<Self> {
        ensure_same_len("stage/discharge", stage.len(), discharge.len())?;

        if stage.len() < 2 {
            return Err(HydroError::Fit(format!(
                "need at least 2 calibration samples, got {}",
                stage.len()
            )));
        }
        if let Some(h) = stage.iter().find(|h| !(h.is_finite() && **h > 0.0)) {
            return Err(HydroError::InvalidInput(format!(
                "calibration stage must be positive and finite, got {}",
                h
            )));
        }
        if let Some(q) = discharge.iter().find(|q| !q.is_finite()) {
            return Err(HydroError::InvalidInput(format!(
                "calibration discharge must be finite, got {}",
                q
            )));
        }

        let mut distinct: Vec<f64> = stage.to_vec();
        distinct.sort_by(f64::total_cmp);
        distinct.dedup();
        if distinct.len() < 2 {
            return Err(HydroError::Fit(
                "need at least 2 distinct stage values".to_string(),
            ));
        }

        let (a0, b0) = initial_guess(stage, discharge);
        let (a, b) = levenberg_marquardt(stage, discharge, a0, b0)?;

        let r_squared = coefficient_of_determination(stage, discharge, a, b)?;
        if r_squared < 0.9 {
            log::warn!(
                "rating curve fit is weak: R² = {:.4} over {} samples",
                r_squared,
                stage.len()
            );
        }

        let samples = stage
            .iter()
            .zip(discharge)
            .map(|(&stage_ft, &discharge_cfs)| CalibrationSample {
                stage_ft,
                discharge_cfs,
            })
            .collect();

        Ok(RatingCurve {
            a,
            b,
            r_squared,
            samples,
        })
    }

    pub fn a(&self) -> f64 {
        self.a
    }

    pub fn b(&self) -> f64 {
        self.b
    }

    pub fn r_squared(&self) -> f64 {
        self.r_squared
    }

    pub fn samples(&self) -> &[CalibrationSample] {
        &self.samples
    }

    /// Unrounded discharge for one stage value.
    ///
    /// No validation: a negative stage with a non-integer exponent yields
    /// NaN, exactly as `powf` does.
    pub fn discharge(&self, stage_ft: f64) -> f64 {
        self.a * stage_ft.powf(self.b)
    }

    /// Maps every stage through the curve, rounding each discharge to three
    /// decimal places (ties to even).
    ///
    /// # Errors
    /// `InvalidInput` for a negative or non-finite stage. Zero is accepted.
    pub fn evaluate(&self, stages: &[f64]) -> Result<Vec<f64>> {
        if let Some((i, h)) = stages
            .iter()
            .enumerate()
            .find(|(_, h)| !(h.is_finite() && **h >= 0.0))
        {
            return Err(HydroError::InvalidInput(format!(
                "stage at index {} must be non-negative and finite, got {}",
                i, h
            )));
        }

        Ok(stages
            .iter()
            .map(|&h| round_to_thousandths(self.discharge(h)))
            .collect())
    }

    /// `n` evenly spaced (stage, discharge) pairs spanning the calibration
    /// stage range, for drawing the fitted line.
    pub fn curve_points(&self, n: usize) -> Result<Vec<(f64, f64)>> {
        if n < 2 {
            return Err(HydroError::InvalidInput(format!(
                "curve needs at least 2 points, got {}",
                n
            )));
        }

        let (lo, hi) = self
            .samples
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), s| {
                (lo.min(s.stage_ft), hi.max(s.stage_ft))
            });
        let step = (hi - lo) / (n - 1) as f64;

        Ok((0..n)
            .map(|i| {
                let h = if i == n - 1 { hi } else { lo + step * i as f64 };
                (h, self.discharge(h))
            })
            .collect())
    }
}

fn round_to_thousandths(value: f64) -> f64 {
    (value * 1000.0).round_ties_even() / 1000.0
}

// ---------------------------------------------------------------------------
// Regression
// ---------------------------------------------------------------------------

/// Log-log linear regression seed, or `(1, 1)` when a discharge is not
/// positive and the log transform is unavailable.
fn initial_guess(stage: &[f64], discharge: &[f64]) -> (f64, f64) {
    if discharge.iter().any(|&q| q <= 0.0) {
        return (1.0, 1.0);
    }

    let n = stage.len() as f64;
    let xs: Vec<f64> = stage.iter().map(|h| h.ln()).collect();
    let ys: Vec<f64> = discharge.iter().map(|q| q.ln()).collect();
    let x_mean = xs.iter().sum::<f64>() / n;
    let y_mean = ys.iter().sum::<f64>() / n;

    let mut sxx = 0.0;
    let mut sxy = 0.0;
    for (x, y) in xs.iter().zip(&ys) {
        sxx += (x - x_mean) * (x - x_mean);
        sxy += (x - x_mean) * (y - y_mean);
    }

    let b = sxy / sxx;
    let a = (y_mean - b * x_mean).exp();
    if a.is_finite() && b.is_finite() {
        (a, b)
    } else {
        (1.0, 1.0)
    }
}

fn residual_sum_of_squares(stage: &[f64], discharge: &[f64], a: f64, b: f64) -> f64 {
    stage
        .iter()
        .zip(discharge)
        .map(|(h, q)| {
            let r = q - a * h.powf(b);
            r * r
        })
        .sum()
}

fn levenberg_marquardt(stage: &[f64], discharge: &[f64], a0: f64, b0: f64) -> Result<(f64, f64)> {
    let (mut a, mut b) = (a0, b0);
    let mut rss = residual_sum_of_squares(stage, discharge, a, b);
    let mut damping = 1e-3;

    for iteration in 0..MAX_ITERATIONS {
        if rss == 0.0 {
            log::debug!("rating fit exact after {} iterations", iteration);
            return Ok((a, b));
        }

        // Normal equations for the 2-parameter Jacobian
        // J_i = [H^b, a·H^b·ln H]
        let (mut jaa, mut jab, mut jbb) = (0.0, 0.0, 0.0);
        let (mut ga, mut gb) = (0.0, 0.0);
        for (&h, &q) in stage.iter().zip(discharge) {
            let hb = h.powf(b);
            let da = hb;
            let db = a * hb * h.ln();
            let r = q - a * hb;
            jaa += da * da;
            jab += da * db;
            jbb += db * db;
            ga += da * r;
            gb += db * r;
        }

        if ga == 0.0 && gb == 0.0 {
            log::debug!("rating fit stationary after {} iterations", iteration);
            return Ok((a, b));
        }

        loop {
            let m11 = jaa * (1.0 + damping);
            let m22 = jbb * (1.0 + damping);
            let det = m11 * m22 - jab * jab;
            if !det.is_finite() {
                return Err(HydroError::Fit(format!(
                    "normal equations overflowed at a={}, b={}; stage values may need a lower datum",
                    a, b
                )));
            }
            if det.abs() <= f64::MIN_POSITIVE {
                return Err(HydroError::Fit(
                    "singular Jacobian in rating curve regression".to_string(),
                ));
            }

            let step_a = (m22 * ga - jab * gb) / det;
            let step_b = (m11 * gb - jab * ga) / det;
            let step_norm = (step_a * step_a + step_b * step_b).sqrt();
            let param_norm = (a * a + b * b).sqrt();
            let small_step = step_norm <= XTOL * (param_norm + XTOL);

            let (ta, tb) = (a + step_a, b + step_b);
            let trial = residual_sum_of_squares(stage, discharge, ta, tb);

            if trial.is_finite() && trial < rss {
                let improvement = rss - trial;
                a = ta;
                b = tb;
                let previous = rss;
                rss = trial;
                damping = (damping / 10.0).max(1e-12);

                if improvement <= FTOL * previous || small_step {
                    log::debug!(
                        "rating fit converged after {} iterations: a={}, b={}, rss={}",
                        iteration + 1,
                        a,
                        b,
                        rss
                    );
                    return Ok((a, b));
                }
                break;
            }

            if small_step {
                // No downhill step remains at this resolution.
                log::debug!(
                    "rating fit converged after {} iterations: a={}, b={}, rss={}",
                    iteration + 1,
                    a,
                    b,
                    rss
                );
                return Ok((a, b));
            }

            damping *= 10.0;
            if damping > MAX_DAMPING {
                return Err(HydroError::Fit(
                    "rating curve regression stalled without converging".to_string(),
                ));
            }
        }
    }

    Err(HydroError::Fit(format!(
        "rating curve regression did not converge in {} iterations",
        MAX_ITERATIONS
    )))
}

fn coefficient_of_determination(stage: &[f64], discharge: &[f64], a: f64, b: f64) -> Result<f64> {
    if !(a.is_finite() && b.is_finite()) {
        return Err(HydroError::Fit(format!(
            "regression produced non-finite coefficients a={}, b={}",
            a, b
        )));
    }

    let mean = discharge.iter().sum::<f64>() / discharge.len() as f64;
    let ss_tot: f64 = discharge.iter().map(|q| (q - mean) * (q - mean)).sum();
    if ss_tot == 0.0 {
        return Err(HydroError::Fit(
            "calibration discharge has no variance; R² is undefined".to_string(),
        ));
    }

    let ss_res = residual_sum_of_squares(stage, discharge, a, b);
    Ok(1.0 - ss_res / ss_tot)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
