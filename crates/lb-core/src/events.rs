//! Generic observability event system shared by every balancer subsystem.
//!
//! Each subsystem defines its own event enum and emits through its own
//! [`EventListeners`] collection; the machinery (listener registry,
//! panic isolation, `tracing`/`metrics` side effects) is shared here.

use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

/// Marker for an event emitted by a balancer subsystem.
pub trait BalancerEvent: Send + Sync + fmt::Debug {
    /// Short, stable name identifying this event's kind (e.g. `"quarantined"`).
    fn kind(&self) -> &'static str;
}

/// Receives events of type `E` as they occur.
pub trait EventListener<E: BalancerEvent>: Send + Sync {
    /// Called synchronously for every emitted event.
    fn on_event(&self, event: &E);
}

/// A state or lifecycle event raised by the health tracker.
#[derive(Debug, Clone, PartialEq)]
pub enum HealthEvent {
    /// A backend was quarantined after exceeding the consecutive-failure
    /// or rolling-window failure-rate threshold.
    Quarantined {
        /// Name of the affected backend.
        backend: String,
        /// Current tick at which quarantine began.
        tick: u64,
        /// Backoff length, in ticks, before the next probe is scheduled.
        backoff_ticks: u64,
    },
    /// A quarantined backend passed its probe and entered probation.
    EnteredProbation {
        /// Name of the affected backend.
        backend: String,
        /// Current tick.
        tick: u64,
    },
    /// A backend on probation accumulated enough consecutive successes to
    /// return to full service.
    Recovered {
        /// Name of the affected backend.
        backend: String,
        /// Current tick.
        tick: u64,
    },
}

impl BalancerEvent for HealthEvent {
    fn kind(&self) -> &'static str {
        match self {
            HealthEvent::Quarantined { .. } => "quarantined",
            HealthEvent::EnteredProbation { .. } => "entered_probation",
            HealthEvent::Recovered { .. } => "recovered",
        }
    }
}

/// Wraps a plain closure as an [`EventListener`].
pub struct FnListener<E, F>
where
    F: Fn(&E) + Send + Sync,
{
    f: F,
    _marker: std::marker::PhantomData<E>,
}

impl<E, F> FnListener<E, F>
where
    F: Fn(&E) + Send + Sync,
{
    /// Wrap `f` as a listener.
    pub fn new(f: F) -> Self {
        Self {
            f,
            _marker: std::marker::PhantomData,
        }
    }
}

impl<E, F> EventListener<E> for FnListener<E, F>
where
    E: BalancerEvent,
    F: Fn(&E) + Send + Sync,
{
    fn on_event(&self, event: &E) {
        (self.f)(event)
    }
}

/// A registry of listeners that fans out every emitted event, isolating
/// callers from a panicking listener.
pub struct EventListeners<E: BalancerEvent> {
    listeners: Vec<Arc<dyn EventListener<E>>>,
}

impl<E: BalancerEvent> Clone for EventListeners<E> {
    fn clone(&self) -> Self {
        Self {
            listeners: self.listeners.clone(),
        }
    }
}

impl<E: BalancerEvent> Default for EventListeners<E> {
    fn default() -> Self {
        Self { listeners: Vec::new() }
    }
}

impl<E: BalancerEvent> EventListeners<E> {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener.
    pub fn add<L>(&mut self, listener: L)
    where
        L: EventListener<E> + 'static,
    {
        self.listeners.push(Arc::new(listener));
    }

    /// Register an already-shared listener.
    pub fn register(&mut self, listener: Arc<dyn EventListener<E>>) {
        self.listeners.push(listener);
    }

    /// Emit `event` to every registered listener, in registration order.
    ///
    /// A listener that panics is caught and does not prevent remaining
    /// listeners from running. With the `tracing` feature enabled the
    /// panic is logged; with `metrics` enabled it also increments a
    /// counter.
    pub fn emit(&self, event: &E) {
        for listener in &self.listeners {
            let result = panic::catch_unwind(AssertUnwindSafe(|| listener.on_event(event)));
            if result.is_err() {
                #[cfg(feature = "tracing")]
                tracing::warn!(kind = event.kind(), "event listener panicked");
                #[cfg(feature = "metrics")]
                metrics::counter!("lb_listener_panics_total", "kind" => event.kind()).increment(1);
                #[cfg(not(any(feature = "tracing", feature = "metrics")))]
                let _ = event;
            }
        }
    }

    /// Number of registered listeners.
    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    /// Whether the registry has no listeners.
    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn emits_to_all_listeners_in_order() {
        let seen = Arc::new(std::sync::Mutex::new(Vec::new()));
        let mut listeners = EventListeners::new();
        for tag in ["a", "b"] {
            let seen = Arc::clone(&seen);
            listeners.add(FnListener::new(move |_: &HealthEvent| {
                seen.lock().unwrap().push(tag);
            }));
        }

        listeners.emit(&HealthEvent::Recovered {
            backend: "b0".to_string(),
            tick: 1,
        });

        assert_eq!(*seen.lock().unwrap(), vec!["a", "b"]);
    }

    #[test]
    fn panicking_listener_does_not_block_others() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut listeners = EventListeners::new();
        listeners.add(FnListener::new(|_: &HealthEvent| {
            panic!("boom");
        }));
        let calls_clone = Arc::clone(&calls);
        listeners.add(FnListener::new(move |_: &HealthEvent| {
            calls_clone.fetch_add(1, Ordering::SeqCst);
        }));

        listeners.emit(&HealthEvent::Recovered {
            backend: "b0".to_string(),
            tick: 3,
        });

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn empty_registry_reports_empty() {
        let listeners: EventListeners<HealthEvent> = EventListeners::new();
        assert!(listeners.is_empty());
        assert_eq!(listeners.len(), 0);
    }
}
