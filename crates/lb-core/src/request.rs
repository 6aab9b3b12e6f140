//! Request and response shapes exchanged with the harness.

use crate::priority::Priority;

/// An incoming request to be routed by the load balancer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Request {
    /// Unique request identifier.
    pub id: u64,
    /// Priority of this request.
    pub priority: Priority,
    /// The simulation tick at which this request was issued.
    ///
    /// A negative tick supplied by a malformed harness is normalized to
    /// zero rather than rejected, per the "never abort" error policy.
    pub tick: u64,
}

impl Request {
    /// Construct a new request, normalizing a negative tick to zero.
    pub fn new(id: u64, priority: Priority, tick: i64) -> Self {
        Self {
            id,
            priority,
            tick: tick.max(0) as u64,
        }
    }
}

/// Result of handling a single request.
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    /// Echoes [`Request::id`].
    pub request_id: u64,
    /// Whether the request was routed to a backend at all.
    pub admitted: bool,
    /// Whether the backend (if admitted) processed the request successfully.
    pub success: bool,
    /// Name of the backend invoked, or `""` if not admitted.
    pub backend_name: String,
    /// Observed latency in milliseconds, or `0.0` if not admitted.
    pub latency_ms: f64,
    /// Whether the request was explicitly load-shed (never attempted).
    pub shed: bool,
}

impl Response {
    /// Build a shed response: never admitted, no backend, zero latency.
    pub fn shed(request_id: u64) -> Self {
        Self {
            request_id,
            admitted: false,
            success: false,
            backend_name: String::new(),
            latency_ms: 0.0,
            shed: true,
        }
    }

    /// Build an admitted response carrying the outcome of the call.
    pub fn admitted(request_id: u64, backend_name: impl Into<String>, success: bool, latency_ms: f64) -> Self {
        Self {
            request_id,
            admitted: true,
            success,
            backend_name: backend_name.into(),
            latency_ms: latency_ms.max(0.0),
            shed: false,
        }
    }

    /// Returns `true` if this response satisfies the universal response
    /// invariants from the specification (shed implies empty/zeroed
    /// fields; admitted implies a non-empty backend name).
    pub fn is_well_formed(&self) -> bool {
        if self.shed {
            return !self.admitted && self.backend_name.is_empty() && self.latency_ms == 0.0;
        }
        if !self.admitted {
            return self.backend_name.is_empty() && self.latency_ms == 0.0;
        }
        !self.backend_name.is_empty()
    }
}
