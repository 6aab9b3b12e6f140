//! Error type for the balancer's one fallible path: construction.
//!
//! Once constructed, the balancer never returns an error from `tick` or
//! `handle_request` — malformed runtime input is normalized instead (see
//! [`crate::priority::Priority::from_i64`], [`crate::request::Request::new`]).

use thiserror::Error;

/// Errors that can occur while building a balancer.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BalancerError {
    /// The balancer was constructed with no backends to route to.
    #[error("cannot construct a load balancer with zero backends")]
    NoBackends,

    /// Two or more backends were registered under the same name.
    #[error("duplicate backend name: {0}")]
    DuplicateBackendName(String),
}
