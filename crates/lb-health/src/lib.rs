//! Online per-backend health estimation and the quarantine/probation state
//! machine that drives routing weight.

pub mod config;
pub mod record;
pub mod tracker;

pub use config::{HealthTrackerConfig, HealthTrackerConfigBuilder};
pub use record::{BackendState, HealthRecord};
pub use tracker::HealthTracker;
