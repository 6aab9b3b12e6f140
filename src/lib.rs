//! Adaptive, priority-aware L7 load balancer core.
//!
//! Routes a stream of requests across a fixed set of opaque backend
//! handles, detecting degraded or failed backends from request/probe
//! outcomes alone, shedding load by priority under stress, and recovering
//! smoothly as backends return to health. See [`Balancer`] for the three
//! operations a harness drives this with.

mod balancer;
mod config;

pub use balancer::Balancer;
pub use config::{BalancerConfig, BalancerConfigBuilder, DEFAULT_SEED};

pub use lb_core::backend::{BackendHandle, Outcome};
pub use lb_core::error::BalancerError;
pub use lb_core::priority::Priority;
pub use lb_core::request::{Request, Response};
pub use lb_health::{BackendState, HealthRecord, HealthTrackerConfig};
pub use lb_maintainer::MaintainerConfig;
pub use lb_selector::SelectionEvent;
