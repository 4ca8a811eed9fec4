//! # API Route Modules
//!
//! - `status`: read, wait on, update and remove path statuses.
//! - `ops`: health probes and the metrics scrape endpoint under `/_/`.

pub mod ops;
pub mod status;
