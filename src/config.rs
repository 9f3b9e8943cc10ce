//! Analysis configuration loader - parses hydro.toml
//!
//! Separates filter parameters, sampling assumptions, and survey geometry
//! from code, making it easy to retune a gauge's analysis (a different
//! BFImax for an ephemeral stream, 5-minute logger data, a longer sinuosity
//! window) without recompiling.
//!
//! Every section and key is optional; anything omitted takes the default
//! documented on the field.

use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::analysis::baseflow::{ECKHARDT_ALPHA, ECKHARDT_BFI_MAX, LYNE_HOLLICK_ALPHA};
use crate::geography::idw::DEFAULT_IDW_POWER;
use crate::model::{ensure_unit_open, parse_passes, AggregateMethod, Direction, HydroError, Result};

/// Default configuration file name, resolved against the working directory.
pub const DEFAULT_CONFIG_PATH: &str = "hydro.toml";

/// Root configuration structure for TOML parsing
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct AnalysisConfig {
    pub baseflow: BaseflowConfig,
    pub series: SeriesConfig,
    pub geometry: GeometryConfig,
}

/// Baseflow filter parameters.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct BaseflowConfig {
    /// Lyne-Hollick filter parameter (0.925)
    pub lyne_hollick_alpha: f64,
    /// One character per pass, `f` forward or `r` reverse ("fff")
    pub lyne_hollick_passes: String,
    /// Eckhardt recession constant (0.98)
    pub eckhardt_alpha: f64,
    /// Eckhardt maximum baseflow index (0.80)
    pub bfi_max: f64,
    /// Cascaded Eckhardt passes (1)
    pub eckhardt_passes: usize,
}

impl Default for BaseflowConfig {
    fn default() -> Self {
        Self {
            lyne_hollick_alpha: LYNE_HOLLICK_ALPHA,
            lyne_hollick_passes: "fff".to_string(),
            eckhardt_alpha: ECKHARDT_ALPHA,
            bfi_max: ECKHARDT_BFI_MAX,
            eckhardt_passes: 1,
        }
    }
}

impl BaseflowConfig {
    /// Parsed Lyne-Hollick pass sequence.
    pub fn passes(&self) -> Result<Vec<Direction>> {
        parse_passes(&self.lyne_hollick_passes)
    }
}

/// Time series sampling assumptions.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct SeriesConfig {
    /// Minutes between samples (15). Used when building a `DischargeSeries`;
    /// an existing series keeps its own interval.
    pub interval_minutes: u32,
    /// Daily reduction for discharge ("mean")
    pub daily_method: AggregateMethod,
}

impl Default for SeriesConfig {
    fn default() -> Self {
        Self {
            interval_minutes: 15,
            daily_method: AggregateMethod::Mean,
        }
    }
}

/// Survey geometry parameters (planar, unit-consistent coordinates).
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct GeometryConfig {
    /// Channel length on either side of each point for sinuosity (500)
    pub sinuosity_window: f64,
    /// Along-channel spacing between survey points (4)
    pub point_spacing: f64,
    /// Inverse distance weighting exponent (1)
    pub idw_power: f64,
}

impl Default for GeometryConfig {
    fn default() -> Self {
        Self {
            sinuosity_window: 500.0,
            point_spacing: 4.0,
            idw_power: DEFAULT_IDW_POWER,
        }
    }
}

impl AnalysisConfig {
    /// Checks every parameter range. Loading calls this; callers that build
    /// a config by hand should too.
    pub fn validate(&self) -> Result<()> {
        let b = &self.baseflow;
        ensure_unit_open("baseflow.lyne_hollick_alpha", b.lyne_hollick_alpha).map_err(to_config)?;
        ensure_unit_open("baseflow.eckhardt_alpha", b.eckhardt_alpha).map_err(to_config)?;
        ensure_unit_open("baseflow.bfi_max", b.bfi_max).map_err(to_config)?;
        b.passes().map_err(to_config)?;
        if b.eckhardt_passes == 0 {
            return Err(HydroError::Config(
                "baseflow.eckhardt_passes must be at least 1".to_string(),
            ));
        }

        if !(1..=1440).contains(&self.series.interval_minutes) {
            return Err(HydroError::Config(format!(
                "series.interval_minutes must be 1..=1440, got {}",
                self.series.interval_minutes
            )));
        }

        let g = &self.geometry;
        for (name, value) in [
            ("geometry.sinuosity_window", g.sinuosity_window),
            ("geometry.point_spacing", g.point_spacing),
            ("geometry.idw_power", g.idw_power),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(HydroError::Config(format!(
                    "{} must be positive, got {}",
                    name, value
                )));
            }
        }

        Ok(())
    }
}

fn to_config(err: HydroError) -> HydroError {
    match err {
        HydroError::InvalidInput(msg) => HydroError::Config(msg),
        other => other,
    }
}

/// Parses and validates configuration text.
pub fn parse_config(contents: &str) -> Result<AnalysisConfig> {
    let config: AnalysisConfig = toml::from_str(contents)
        .map_err(|e| HydroError::Config(format!("failed to parse TOML: {}", e)))?;
    config.validate()?;
    Ok(config)
}

/// Loads and validates a configuration file.
///
/// Unlike a missing station registry, a missing analysis config is not
/// fatal to callers that can fall back to `AnalysisConfig::default()`, so
/// failures are returned rather than panicking.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<AnalysisConfig> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)
        .map_err(|e| HydroError::Config(format!("failed to read {}: {}", path.display(), e)))?;
    let config = parse_config(&contents)?;
    log::debug!("loaded analysis config from {}", path.display());
    Ok(config)
}

/// Loads `hydro.toml` from the working directory.
pub fn load_config_default() -> Result<AnalysisConfig> {
    load_config(DEFAULT_CONFIG_PATH)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ErrorKind;

    #[test]
    fn test_load_config_succeeds() {
        // Package root is the working directory under `cargo test`.
        let config = load_config_default().expect("hydro.toml should load");
        assert_eq!(config.series.interval_minutes, 15);
        assert_eq!(config.baseflow.passes().unwrap().len(), 3);
    }

    #[test]
    fn test_empty_file_uses_defaults() {
        let config = parse_config("").unwrap();
        assert_eq!(config, AnalysisConfig::default());
        assert_eq!(config.baseflow.lyne_hollick_alpha, 0.925);
        assert_eq!(config.baseflow.eckhardt_alpha, 0.98);
        assert_eq!(config.baseflow.bfi_max, 0.80);
        assert_eq!(config.geometry.idw_power, 1.0);
    }

    #[test]
    fn test_partial_section_keeps_other_defaults() {
        let config = parse_config(
            r#"
[baseflow]
bfi_max = 0.5
lyne_hollick_passes = "frf"

[series]
interval_minutes = 5
daily_method = "sum"
"#,
        )
        .unwrap();

        assert_eq!(config.baseflow.bfi_max, 0.5);
        assert_eq!(config.baseflow.eckhardt_alpha, 0.98);
        assert_eq!(
            config.baseflow.passes().unwrap(),
            vec![Direction::Forward, Direction::Reverse, Direction::Forward]
        );
        assert_eq!(config.series.interval_minutes, 5);
        assert_eq!(config.series.daily_method, AggregateMethod::Sum);
        assert_eq!(config.geometry.point_spacing, 4.0);
    }

    #[test]
    fn test_out_of_range_values_rejected() {
        for text in [
            "[baseflow]\nbfi_max = 1.5",
            "[baseflow]\nlyne_hollick_passes = \"fxf\"",
            "[baseflow]\neckhardt_passes = 0",
            "[series]\ninterval_minutes = 0",
            "[geometry]\npoint_spacing = -4.0",
        ] {
            let err = parse_config(text).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Config, "{}", text);
        }
    }

    #[test]
    fn test_malformed_toml_rejected() {
        let err = parse_config("[baseflow\nbfi_max = ").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Config);
    }

    #[test]
    fn test_missing_file_is_config_error() {
        let err = load_config("does/not/exist.toml").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Config);
    }
}
