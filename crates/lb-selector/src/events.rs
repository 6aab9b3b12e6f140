//! Observability events raised by the admission and selection algorithm.

use lb_core::events::BalancerEvent;
use lb_core::Priority;

/// An admission or selection decision, raised for every `handle_request` call.
#[derive(Debug, Clone, PartialEq)]
pub enum SelectionEvent {
    /// A request was routed to a backend.
    Admitted {
        /// Id of the admitted request.
        request_id: u64,
        /// Name of the chosen backend.
        backend: String,
    },
    /// A request was shed before reaching any backend.
    Shed {
        /// Id of the shed request.
        request_id: u64,
        /// Priority of the shed request.
        priority: Priority,
        /// Shedding pressure observed at the time of the decision.
        pressure: f64,
    },
    /// The initially weighted pick was discarded in favor of a healthier
    /// alternative because its recent error rate exceeded the cascade
    /// guard threshold.
    CascadeGuardTriggered {
        /// Backend that was passed over.
        rejected_backend: String,
        /// Backend routed to instead.
        chosen_backend: String,
    },
    /// A CRITICAL request was admitted to a quarantined backend as a
    /// last-ditch effort because the eligible pool was empty.
    LastDitchAdmitted {
        /// Id of the admitted request.
        request_id: u64,
        /// Name of the quarantined backend used.
        backend: String,
    },
}

impl BalancerEvent for SelectionEvent {
    fn kind(&self) -> &'static str {
        match self {
            SelectionEvent::Admitted { .. } => "admitted",
            SelectionEvent::Shed { .. } => "shed",
            SelectionEvent::CascadeGuardTriggered { .. } => "cascade_guard_triggered",
            SelectionEvent::LastDitchAdmitted { .. } => "last_ditch_admitted",
        }
    }
}
