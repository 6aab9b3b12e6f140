//! The opaque backend capability the core is polymorphic over.
//!
//! The balancer never reads backend-internal state (liveness, latency,
//! error rate). It only ever calls [`BackendHandle::send_request`] and
//! [`BackendHandle::health_probe`], and reads the stable [`BackendHandle::name`].

/// Outcome of a single call against a backend: whether it succeeded, and
/// the observed latency in milliseconds. Latency is always non-negative.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Outcome {
    /// Whether the call succeeded (for probes: whether the backend was reachable).
    pub ok: bool,
    /// Observed latency in milliseconds.
    pub latency_ms: f64,
}

impl Outcome {
    /// Construct a new outcome, clamping a negative latency to zero.
    pub fn new(ok: bool, latency_ms: f64) -> Self {
        Self {
            ok,
            latency_ms: latency_ms.max(0.0),
        }
    }
}

/// Capability set exposed by an opaque backend server.
///
/// Implementors are supplied by the harness at construction time. The core
/// must never cast or peek behind this trait — it is the only way the
/// balancer is allowed to interact with a backend.
pub trait BackendHandle: Send + Sync {
    /// A unique name identifying this backend, stable for the balancer's lifetime.
    fn name(&self) -> &str;

    /// Send a live request to this backend. May fail; latency is always observed.
    fn send_request(&self) -> Outcome;

    /// Send a cheap health probe to this backend. May fail; latency is always observed.
    fn health_probe(&self) -> Outcome;
}

// Blanket impl so harnesses can hand the balancer a `Box<dyn BackendHandle>`
// without an extra indirection layer.
impl BackendHandle for Box<dyn BackendHandle> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn send_request(&self) -> Outcome {
        (**self).send_request()
    }

    fn health_probe(&self) -> Outcome {
        (**self).health_probe()
    }
}

// Blanket impl so harnesses can keep an `Arc` handle to a backend (e.g. for
// fault injection) while also handing the balancer ownership of the same
// backend, without wrapping it in a second indirection layer.
impl<T: BackendHandle + ?Sized> BackendHandle for std::sync::Arc<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn send_request(&self) -> Outcome {
        (**self).send_request()
    }

    fn health_probe(&self) -> Outcome {
        (**self).health_probe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct StubBackend {
        name: &'static str,
    }

    impl BackendHandle for StubBackend {
        fn name(&self) -> &str {
            self.name
        }

        fn send_request(&self) -> Outcome {
            Outcome::new(true, 42.0)
        }

        fn health_probe(&self) -> Outcome {
            Outcome::new(true, 4.2)
        }
    }

    #[test]
    fn outcome_clamps_negative_latency() {
        let outcome = Outcome::new(false, -5.0);
        assert_eq!(outcome.latency_ms, 0.0);
        assert!(!outcome.ok);
    }

    #[test]
    fn boxed_backend_delegates() {
        let boxed: Box<dyn BackendHandle> = Box::new(StubBackend { name: "b0" });
        assert_eq!(boxed.name(), "b0");
        assert!(boxed.send_request().ok);
        assert!(boxed.health_probe().ok);
    }
}
