//! Per-tick probing schedule and weight-cache refresh.

pub mod config;
pub mod maintainer;

pub use config::{MaintainerConfig, MaintainerConfigBuilder};
pub use maintainer::Maintainer;
