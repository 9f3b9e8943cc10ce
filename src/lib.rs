//! stream_hydro: analysis toolkit for stream gauge records and channel surveys.
//!
//! # Module structure
//!
//! ```text
//! stream_hydro
//! ├── model       — shared types (HydroError, Direction, AggregateMethod, DailyValue)
//! ├── config      — analysis parameters loader (hydro.toml)
//! ├── rating      — power-law stage/discharge rating curve
//! ├── discharge   — regularly sampled discharge record for one gauge
//! ├── analysis
//! │   ├── baseflow   — Lyne-Hollick and Eckhardt baseflow filters
//! │   ├── daily      — fixed-window daily aggregation
//! │   ├── statistics — flashiness index and flow duration curve
//! │   └── summary    — headline statistics for a record (JSON export)
//! └── geography
//!     ├── sinuosity — windowed channel sinuosity
//!     ├── profile   — longitudinal profile smoothing
//!     └── idw       — inverse distance weighted interpolation
//! ```
//!
//! The library only emits `log` records; installing a logger is up to the
//! caller.

// Public modules
pub mod analysis;
pub mod config;
pub mod discharge;
pub mod geography;
pub mod model;
pub mod rating;

pub use config::AnalysisConfig;
pub use discharge::DischargeSeries;
pub use model::{HydroError, Result};
pub use rating::RatingCurve;
