//! Shared domain types for the adaptive load balancer.
//!
//! This crate provides the types and infrastructure used across all
//! balancer subsystems: the backend capability trait, request/response
//! shapes, priority ordering, the tick-scoped seeded RNG, the event
//! system used for observability, and the error type for the one
//! fallible construction path.

pub mod backend;
pub mod error;
pub mod events;
pub mod priority;
pub mod request;
pub mod rng;

pub use backend::BackendHandle;
pub use error::BalancerError;
pub use events::{BalancerEvent, EventListener, EventListeners, FnListener, HealthEvent};
pub use priority::Priority;
pub use request::{Request, Response};
pub use rng::BalancerRng;
