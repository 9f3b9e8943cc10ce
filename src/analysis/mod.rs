//! Discharge analysis for gauge records.
//!
//! Submodules:
//! - `baseflow`: Lyne-Hollick and Eckhardt recursive filters.
//! - `daily`: fixed-window daily aggregation.
//! - `statistics`: Richards-Baker flashiness and flow duration.
//! - `summary`: headline statistics for one record, serializable to JSON.

pub mod baseflow;
pub mod daily;
pub mod statistics;
pub mod summary;
