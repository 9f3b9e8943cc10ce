//! Channel geometry from survey points: sinuosity, profile smoothing, and
//! inverse distance weighted interpolation. Coordinates are planar and
//! unit-consistent; projection happens before these functions are called.

pub mod idw;
pub mod profile;
pub mod sinuosity;

pub use idw::{idw, idw_grid, Grid, DEFAULT_IDW_POWER};
pub use profile::{smooth_profile, LongitudinalProfile};
pub use sinuosity::{reach_sinuosity, sinuosity, Sinuosity};
