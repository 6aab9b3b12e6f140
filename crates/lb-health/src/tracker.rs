//! The online health tracker: EWMA estimation plus the quarantine/probation
//! state machine described for each backend.

use crate::config::HealthTrackerConfig;
use crate::record::{BackendState, HealthRecord};
use lb_core::events::{EventListener, EventListeners, HealthEvent};
use std::sync::Arc;

/// Tracks health state for a fixed-size, position-indexed set of backends.
///
/// Backends are referred to by their position in the sequence supplied at
/// construction; the tracker never adds, removes, or reorders them.
pub struct HealthTracker {
    records: Vec<HealthRecord>,
    names: Vec<String>,
    config: HealthTrackerConfig,
    listeners: EventListeners<HealthEvent>,
}

impl HealthTracker {
    /// Creates a tracker for `names.len()` backends, all starting live.
    pub fn new(names: Vec<String>, config: HealthTrackerConfig) -> Self {
        let records = names
            .iter()
            .map(|_| HealthRecord::new(config.default_latency_ms, config.window_size))
            .collect();
        Self {
            records,
            names,
            config,
            listeners: EventListeners::new(),
        }
    }

    /// Registers a listener for health state-transition events.
    pub fn add_listener(&mut self, listener: Arc<dyn EventListener<HealthEvent>>) {
        self.listeners.register(listener);
    }

    /// Number of tracked backends.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether this tracker has no backends.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Read-only access to a backend's health record.
    pub fn record(&self, idx: usize) -> &HealthRecord {
        &self.records[idx]
    }

    /// The stable name of the backend at `idx`.
    pub fn name(&self, idx: usize) -> &str {
        &self.names[idx]
    }

    /// Current routing weight for a backend; `0` while quarantined.
    pub fn weight(&self, idx: usize) -> f64 {
        self.records[idx].weight_cache
    }

    /// Whether a backend is currently quarantined as of `current_tick`.
    pub fn is_quarantined(&self, idx: usize, current_tick: u64) -> bool {
        matches!(self.records[idx].state, BackendState::Quarantined)
            && self.records[idx].quarantine_until_tick > current_tick
    }

    /// Whether a backend is currently on probation.
    pub fn in_probation(&self, idx: usize) -> bool {
        matches!(self.records[idx].state, BackendState::Probation)
    }

    /// Feed a live-request outcome into the tracker.
    pub fn observe_request(&mut self, idx: usize, ok: bool, latency_ms: f64, current_tick: u64) {
        self.apply_outcome(idx, ok, latency_ms, current_tick, self.config.request_alpha);
        self.refresh_weight(idx);

        let state = self.records[idx].state;
        match state {
            BackendState::Probation => {
                if ok {
                    self.records[idx].probation_remaining =
                        self.records[idx].probation_remaining.saturating_sub(1);
                    if self.records[idx].probation_remaining == 0 {
                        self.transition_to(idx, BackendState::Live, current_tick);
                        self.listeners.emit(&HealthEvent::Recovered {
                            backend: self.names[idx].clone(),
                            tick: current_tick,
                        });
                    }
                } else {
                    self.enter_quarantine(idx, current_tick);
                }
            }
            BackendState::Live => {
                if self.should_quarantine(idx) {
                    self.enter_quarantine(idx, current_tick);
                }
            }
            BackendState::Quarantined => {}
        }
        self.refresh_weight(idx);
    }

    /// Feed a health-probe outcome into the tracker.
    pub fn observe_probe(&mut self, idx: usize, reachable: bool, latency_ms: f64, current_tick: u64) {
        self.apply_outcome(idx, reachable, latency_ms, current_tick, self.config.probe_alpha);

        let state = self.records[idx].state;
        match state {
            BackendState::Quarantined => {
                if reachable && current_tick >= self.records[idx].quarantine_until_tick {
                    self.records[idx].consecutive_failures = 0;
                    self.records[idx].probation_remaining = self.config.probation_target_successes;
                    self.transition_to(idx, BackendState::Probation, current_tick);
                    self.listeners.emit(&HealthEvent::EnteredProbation {
                        backend: self.names[idx].clone(),
                        tick: current_tick,
                    });
                }
            }
            BackendState::Probation => {
                if !reachable {
                    self.enter_quarantine(idx, current_tick);
                }
            }
            BackendState::Live => {
                if self.should_quarantine(idx) {
                    self.enter_quarantine(idx, current_tick);
                }
            }
        }
        self.refresh_weight(idx);
    }

    /// Advance the re-entry decay counter for a backend that has gone a
    /// full tick without a new failure. Called once per tick per backend
    /// by the maintainer.
    pub fn tick_decay(&mut self, idx: usize) {
        let record = &mut self.records[idx];
        if !matches!(record.state, BackendState::Live) {
            return;
        }
        record.healthy_ticks_since_reentry += 1;
        if record.reentry_count > 0 && record.healthy_ticks_since_reentry >= self.config.reentry_decay_interval_ticks {
            record.reentry_count -= 1;
            record.healthy_ticks_since_reentry = 0;
        }
    }

    /// Recompute and cache the routing weight for a backend from its
    /// current EWMA estimates and lifecycle state.
    pub fn refresh_weight(&mut self, idx: usize) {
        let n = self.records.len().max(1);
        let record = &mut self.records[idx];
        record.weight_cache = match record.state {
            BackendState::Quarantined => 0.0,
            BackendState::Live => raw_weight(record.ewma_error_rate, record.ewma_latency_ms),
            BackendState::Probation => {
                let raw = raw_weight(record.ewma_error_rate, record.ewma_latency_ms);
                let cap = (1.0 / self.config.default_latency_ms) / (2.0 * n as f64);
                raw.min(cap)
            }
        };
    }

    fn apply_outcome(&mut self, idx: usize, ok: bool, latency_ms: f64, current_tick: u64, alpha: f64) {
        let record = &mut self.records[idx];
        record.last_sample_tick = current_tick;
        record.push_window(ok);
        record.ewma_error_rate = ewma(record.ewma_error_rate, if ok { 0.0 } else { 1.0 }, alpha);
        if ok {
            record.ewma_latency_ms = ewma(record.ewma_latency_ms, latency_ms.max(0.0), alpha);
            record.consecutive_failures = 0;
        } else {
            record.consecutive_failures += 1;
        }
    }

    fn should_quarantine(&self, idx: usize) -> bool {
        let record = &self.records[idx];
        if record.consecutive_failures >= self.config.consecutive_failure_threshold {
            return true;
        }
        if record.window_len() >= self.config.window_min_samples {
            if let Some(ratio) = record.window_failure_ratio() {
                if ratio > self.config.window_failure_ratio_threshold {
                    return true;
                }
            }
        }
        record.ewma_error_rate > self.config.error_rate_threshold
    }

    fn enter_quarantine(&mut self, idx: usize, current_tick: u64) {
        let backoff = {
            let record = &self.records[idx];
            let scale = 1u64 << record.reentry_count.min(16);
            (self.config.quarantine_base_ticks.saturating_mul(scale)).min(self.config.quarantine_cap_ticks)
        };
        {
            let record = &mut self.records[idx];
            record.quarantine_until_tick = current_tick + backoff;
            record.reentry_count = record.reentry_count.saturating_add(1);
            record.healthy_ticks_since_reentry = 0;
            record.probation_remaining = 0;
        }
        self.transition_to(idx, BackendState::Quarantined, current_tick);
        self.listeners.emit(&HealthEvent::Quarantined {
            backend: self.names[idx].clone(),
            tick: current_tick,
            backoff_ticks: backoff,
        });
    }

    fn transition_to(&mut self, idx: usize, state: BackendState, _current_tick: u64) {
        if self.records[idx].state == state {
            return;
        }
        #[cfg(feature = "tracing")]
        tracing::debug!(
            backend = %self.names[idx],
            from = ?self.records[idx].state,
            to = ?state,
            "backend health state transition"
        );
        #[cfg(feature = "metrics")]
        {
            let label = match state {
                BackendState::Live => "live",
                BackendState::Quarantined => "quarantined",
                BackendState::Probation => "probation",
            };
            metrics::counter!("lb_health_transitions_total", "backend" => self.names[idx].clone(), "to" => label)
                .increment(1);
        }
        self.records[idx].state = state;
    }
}

fn ewma(previous: f64, sample: f64, alpha: f64) -> f64 {
    alpha * sample + (1.0 - alpha) * previous
}

fn raw_weight(ewma_error_rate: f64, ewma_latency_ms: f64) -> f64 {
    (1.0 - ewma_error_rate).max(0.0) / ewma_latency_ms.max(1.0)
}
