//! Baseflow separation by recursive digital filters.
//!
//! Two filters split total discharge into a slow (baseflow) component and a
//! quick (runoff) component:
//!
//! - **Lyne-Hollick** (1979): one-parameter filter on the quick-flow signal.
//!   Each pass returns `Q[t] − f[t]`, where `f` is the filtered quick flow.
//! - **Eckhardt** (2005): two-parameter filter bounded by the maximum
//!   baseflow index. Each pass returns the filtered baseflow `f` directly.
//!
//! Every function here is pure: it reads the input slice and returns a new
//! vector. Multi-pass smoothing is explicit composition, each pass consuming
//! the previous pass's output; the `*_passes` helpers do exactly that. The
//! recursion is sequential in time and must stay that way.

use crate::model::{ensure_same_len, ensure_unit_open, Direction, HydroError, Result};

/// Default Lyne-Hollick filter parameter.
pub const LYNE_HOLLICK_ALPHA: f64 = 0.925;
/// Default Eckhardt recession constant.
pub const ECKHARDT_ALPHA: f64 = 0.98;
/// Default Eckhardt maximum baseflow index (perennial stream, porous aquifer).
pub const ECKHARDT_BFI_MAX: f64 = 0.80;

fn ensure_filterable(discharge: &[f64]) -> Result<()> {
    if discharge.len() < 2 {
        return Err(HydroError::InvalidInput(format!(
            "baseflow filters need at least 2 discharge samples, got {}",
            discharge.len()
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Lyne-Hollick
// ---------------------------------------------------------------------------

/// One Lyne-Hollick pass in the given direction.
///
/// Forward: `f[0] = 0`, then for `t = 1..n-1`
/// `f[t] = α·f[t-1] + (1+α)/2·(Q[t] − Q[t-1])`, clamped to zero when
/// negative. Reverse runs the mirrored recursion from `t = n-2` down to
/// `t = 1`; `f[0]` and `f[n-1]` keep their initial zero, so the endpoints of
/// a reverse pass equal the input.
///
/// Returns the baseflow estimate `Q[t] − f[t]`, which never exceeds `Q[t]`.
pub fn lyne_hollick(discharge: &[f64], alpha: f64, direction: Direction) -> Result<Vec<f64>> {
    ensure_filterable(discharge)?;
    ensure_unit_open("Lyne-Hollick alpha", alpha)?;

    let n = discharge.len();
    let gain = (1.0 + alpha) / 2.0;
    let mut quick = vec![0.0; n];
    let mut clamped = 0usize;

    match direction {
        Direction::Forward => {
            for t in 1..n {
                let f = alpha * quick[t - 1] + gain * (discharge[t] - discharge[t - 1]);
                quick[t] = if f < 0.0 {
                    clamped += 1;
                    0.0
                } else {
                    f
                };
            }
        }
        Direction::Reverse => {
            for t in (1..n - 1).rev() {
                let f = alpha * quick[t + 1] + gain * (discharge[t] - discharge[t + 1]);
                quick[t] = if f < 0.0 {
                    clamped += 1;
                    0.0
                } else {
                    f
                };
            }
        }
    }

    log::debug!(
        "Lyne-Hollick {:?} pass over {} samples, {} steps clamped",
        direction,
        n,
        clamped
    );

    Ok(discharge.iter().zip(&quick).map(|(q, f)| q - f).collect())
}

/// Cascaded Lyne-Hollick passes, one per entry of `passes`
/// (`"fff"` parses to the canonical three forward passes).
pub fn lyne_hollick_passes(
    discharge: &[f64],
    alpha: f64,
    passes: &[Direction],
) -> Result<Vec<f64>> {
    if passes.is_empty() {
        return Err(HydroError::InvalidInput(
            "Lyne-Hollick needs at least one pass".to_string(),
        ));
    }

    let mut baseflow = discharge.to_vec();
    for &direction in passes {
        baseflow = lyne_hollick(&baseflow, alpha, direction)?;
    }
    Ok(baseflow)
}

// ---------------------------------------------------------------------------
// Eckhardt
// ---------------------------------------------------------------------------

/// One Eckhardt pass.
///
/// `f[0] = Q[0]`, then for `t = 1..n-1`
/// `f[t] = ((1−BFImax)·α·f[t-1] + (1−α)·BFImax·Q[t]) / (1 − α·BFImax)`,
/// clamped to `Q[t]`. Returns `f`.
pub fn eckhardt(discharge: &[f64], alpha: f64, bfi_max: f64) -> Result<Vec<f64>> {
    ensure_filterable(discharge)?;
    ensure_unit_open("Eckhardt alpha", alpha)?;
    ensure_unit_open("BFImax", bfi_max)?;

    let n = discharge.len();
    let denominator = 1.0 - alpha * bfi_max;
    let carry = (1.0 - bfi_max) * alpha;
    let inflow = (1.0 - alpha) * bfi_max;

    let mut baseflow = Vec::with_capacity(n);
    baseflow.push(discharge[0]);
    let mut clamped = 0usize;

    for t in 1..n {
        let f = (carry * baseflow[t - 1] + inflow * discharge[t]) / denominator;
        let bounded = if f > discharge[t] {
            clamped += 1;
            discharge[t]
        } else {
            f
        };
        baseflow.push(bounded);
    }

    log::debug!(
        "Eckhardt pass over {} samples, {} steps clamped to total flow",
        n,
        clamped
    );

    Ok(baseflow)
}

/// Applies the Eckhardt filter `passes` times in cascade.
pub fn eckhardt_passes(
    discharge: &[f64],
    alpha: f64,
    bfi_max: f64,
    passes: usize,
) -> Result<Vec<f64>> {
    if passes == 0 {
        return Err(HydroError::InvalidInput(
            "Eckhardt needs at least one pass".to_string(),
        ));
    }

    let mut baseflow = discharge.to_vec();
    for _ in 0..passes {
        baseflow = eckhardt(&baseflow, alpha, bfi_max)?;
    }
    Ok(baseflow)
}

// ---------------------------------------------------------------------------
// Separation
// ---------------------------------------------------------------------------

/// Total flow split into baseflow and runoff (`runoff = Q − baseflow`).
#[derive(Debug, Clone, PartialEq)]
pub struct Separation {
    pub baseflow: Vec<f64>,
    pub runoff: Vec<f64>,
}

impl Separation {
    /// Pairs a baseflow estimate with the total flow it was derived from.
    pub fn new(discharge: &[f64], baseflow: Vec<f64>) -> Result<Self> {
        ensure_same_len("discharge/baseflow", discharge.len(), baseflow.len())?;
        let runoff = discharge.iter().zip(&baseflow).map(|(q, b)| q - b).collect();
        Ok(Separation { baseflow, runoff })
    }

    /// Baseflow index: total baseflow volume over total flow volume.
    pub fn baseflow_index(&self) -> Result<f64> {
        let base: f64 = self.baseflow.iter().sum();
        let total: f64 = base + self.runoff.iter().sum::<f64>();
        if total == 0.0 {
            return Err(HydroError::InvalidInput(
                "baseflow index undefined for zero total flow".to_string(),
            ));
        }
        Ok(base / total)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ErrorKind;
    use approx::assert_relative_eq;

    fn storm_hydrograph() -> Vec<f64> {
        vec![
            10.0, 10.0, 12.0, 30.0, 55.0, 48.0, 36.0, 27.0, 21.0, 17.0, 14.0, 12.5, 11.5, 11.0,
            10.8,
        ]
    }

    #[test]
    fn test_lyne_hollick_forward_first_steps() {
        let q = [10.0, 20.0, 15.0];
        let base = lyne_hollick(&q, 0.925, Direction::Forward).unwrap();
        // f[1] = 0.9625 * 10 = 9.625; f[2] = 0.925*9.625 + 0.9625*(-5) = 4.090625
        assert_relative_eq!(base[0], 10.0);
        assert_relative_eq!(base[1], 20.0 - 9.625, epsilon = 1e-12);
        assert_relative_eq!(base[2], 15.0 - 4.090625, epsilon = 1e-12);
    }

    #[test]
    fn test_lyne_hollick_clamps_negative_quick_flow() {
        // Recession only: every forward step would go negative.
        let q = [50.0, 40.0, 30.0, 20.0];
        let base = lyne_hollick(&q, 0.925, Direction::Forward).unwrap();
        assert_eq!(base, q.to_vec());
    }

    #[test]
    fn test_lyne_hollick_never_exceeds_total_flow() {
        let q = storm_hydrograph();
        for direction in [Direction::Forward, Direction::Reverse] {
            let base = lyne_hollick(&q, LYNE_HOLLICK_ALPHA, direction).unwrap();
            for (b, total) in base.iter().zip(&q) {
                assert!(b <= total, "{:?}: baseflow {} > total {}", direction, b, total);
            }
        }
    }

    #[test]
    fn test_lyne_hollick_reverse_keeps_endpoints() {
        let q = storm_hydrograph();
        let base = lyne_hollick(&q, LYNE_HOLLICK_ALPHA, Direction::Reverse).unwrap();
        assert_eq!(base[0], q[0]);
        assert_eq!(base[q.len() - 1], q[q.len() - 1]);
        assert!(base[4] < q[4], "interior peak should lose quick flow");
    }

    #[test]
    fn test_lyne_hollick_passes_match_manual_cascade() {
        let q = storm_hydrograph();
        let mut manual = q.clone();
        for _ in 0..3 {
            manual = lyne_hollick(&manual, LYNE_HOLLICK_ALPHA, Direction::Forward).unwrap();
        }
        let cascaded =
            lyne_hollick_passes(&q, LYNE_HOLLICK_ALPHA, &[Direction::Forward; 3]).unwrap();
        assert_eq!(cascaded, manual);
    }

    #[test]
    fn test_lyne_hollick_rejects_short_series_and_bad_alpha() {
        let err = lyne_hollick(&[5.0], 0.925, Direction::Forward).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
        let err = lyne_hollick(&[5.0, 6.0], 1.0, Direction::Forward).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
        let err = lyne_hollick_passes(&[5.0, 6.0], 0.925, &[]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }

    #[test]
    fn test_eckhardt_constant_flow_worked_example() {
        let q = [10.0, 10.0, 10.0, 10.0];
        let base = eckhardt(&q, 0.98, 0.80).unwrap();
        assert_eq!(base[0], 10.0);
        // (0.2*0.98*10 + 0.02*0.8*10) / (1 - 0.784) = 2.12 / 0.216
        assert_relative_eq!(base[1], 2.12 / 0.216, epsilon = 1e-12);
        assert_relative_eq!(base[1], 9.8148, epsilon = 1e-4);
        for t in 1..q.len() {
            assert!(base[t] <= 10.0);
            assert!(base[t] <= base[t - 1] + 1e-12, "should settle toward a fixed point");
        }
    }

    #[test]
    fn test_eckhardt_bounded_by_total_flow() {
        let q = storm_hydrograph();
        let base = eckhardt(&q, ECKHARDT_ALPHA, ECKHARDT_BFI_MAX).unwrap();
        assert_eq!(base[0], q[0]);
        for (b, total) in base.iter().zip(&q) {
            assert!(*b >= 0.0);
            assert!(b <= total);
        }
    }

    #[test]
    fn test_eckhardt_clamps_on_recession() {
        // A sharp drop forces the filter above total flow; it must clamp.
        let q = [100.0, 1.0, 1.0];
        let base = eckhardt(&q, ECKHARDT_ALPHA, ECKHARDT_BFI_MAX).unwrap();
        assert_eq!(base[1], 1.0);
    }

    #[test]
    fn test_eckhardt_passes_cascade() {
        let q = storm_hydrograph();
        let once = eckhardt(&q, ECKHARDT_ALPHA, ECKHARDT_BFI_MAX).unwrap();
        let twice = eckhardt(&once, ECKHARDT_ALPHA, ECKHARDT_BFI_MAX).unwrap();
        assert_eq!(
            eckhardt_passes(&q, ECKHARDT_ALPHA, ECKHARDT_BFI_MAX, 2).unwrap(),
            twice
        );
        assert!(eckhardt_passes(&q, ECKHARDT_ALPHA, ECKHARDT_BFI_MAX, 0).is_err());
    }

    #[test]
    fn test_eckhardt_rejects_bad_parameters() {
        let q = [1.0, 2.0];
        assert_eq!(eckhardt(&q, 0.0, 0.8).unwrap_err().kind(), ErrorKind::InvalidInput);
        assert_eq!(eckhardt(&q, 0.98, 1.2).unwrap_err().kind(), ErrorKind::InvalidInput);
        assert_eq!(eckhardt(&[], 0.98, 0.8).unwrap_err().kind(), ErrorKind::InvalidInput);
    }

    #[test]
    fn test_separation_runoff_and_index() {
        let q = vec![10.0, 20.0, 30.0];
        let sep = Separation::new(&q, vec![5.0, 10.0, 15.0]).unwrap();
        assert_eq!(sep.runoff, vec![5.0, 10.0, 15.0]);
        assert_relative_eq!(sep.baseflow_index().unwrap(), 0.5);

        let zero = Separation::new(&[0.0, 0.0], vec![0.0, 0.0]).unwrap();
        assert!(zero.baseflow_index().is_err());
        assert!(Separation::new(&q, vec![1.0]).is_err());
    }
}
