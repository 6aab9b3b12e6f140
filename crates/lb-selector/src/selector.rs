//! Priority-gated admission control and weighted backend selection.

use crate::events::SelectionEvent;
use lb_core::events::EventListeners;
use lb_core::{BackendHandle, BalancerRng, Priority, Request, Response};
use lb_health::{BackendState, HealthTracker};
use std::sync::Arc;

const CASCADE_GUARD_SUSPECT_THRESHOLD: f64 = 0.2;
const CASCADE_GUARD_HEALTHY_THRESHOLD: f64 = 0.05;

/// Picks a backend for each request, or decides to shed it, from the
/// health tracker's current weights.
pub struct Selector {
    baseline_weight_sum: f64,
    listeners: EventListeners<SelectionEvent>,
}

impl Selector {
    /// Creates a selector. `baseline_weight_sum` is the sum of routing
    /// weights the backend set would have if every backend were live at
    /// its default latency — the denominator for shedding pressure.
    pub fn new(baseline_weight_sum: f64) -> Self {
        Self {
            baseline_weight_sum: baseline_weight_sum.max(f64::EPSILON),
            listeners: EventListeners::new(),
        }
    }

    /// Registers a listener for admission and selection events.
    pub fn add_listener(&mut self, listener: Arc<dyn lb_core::events::EventListener<SelectionEvent>>) {
        self.listeners.register(listener);
    }

    /// Routes `request` to a backend, or sheds it, updating `tracker` with
    /// the observed outcome when a backend is invoked.
    pub fn handle_request<B: BackendHandle>(
        &self,
        backends: &[B],
        tracker: &mut HealthTracker,
        rng: &mut BalancerRng,
        request: Request,
        current_tick: u64,
    ) -> Response {
        let eligible = self.eligible_pool(tracker, current_tick);
        let pressure = self.shedding_pressure(&eligible, tracker);

        if eligible.is_empty() {
            return if request.priority == Priority::Critical {
                self.last_ditch(backends, tracker, request, current_tick)
            } else {
                self.shed(request, pressure)
            };
        }

        if pressure > request.priority.shed_threshold() {
            return self.shed(request, pressure);
        }

        let deterministic = pressure > Priority::Normal.shed_threshold();
        let mut chosen = self.pick(&eligible, tracker, rng, deterministic);
        chosen = self.apply_cascade_guard(chosen, &eligible, tracker, rng, deterministic);

        self.invoke(backends, tracker, request, chosen, current_tick)
    }

    fn eligible_pool(&self, tracker: &HealthTracker, current_tick: u64) -> Vec<usize> {
        (0..tracker.len())
            .filter(|&idx| tracker.weight(idx) > 0.0 && !tracker.is_quarantined(idx, current_tick))
            .collect()
    }

    fn shedding_pressure(&self, eligible: &[usize], tracker: &HealthTracker) -> f64 {
        let sum: f64 = eligible.iter().map(|&idx| tracker.weight(idx)).sum();
        (1.0 - sum / self.baseline_weight_sum).clamp(0.0, 1.0)
    }

    fn pick(&self, eligible: &[usize], tracker: &HealthTracker, rng: &mut BalancerRng, deterministic: bool) -> usize {
        if deterministic {
            return Self::highest_weight(eligible, tracker);
        }
        let sum: f64 = eligible.iter().map(|&idx| tracker.weight(idx)).sum();
        let mut target = rng.next_scaled(sum);
        for &idx in eligible {
            let w = tracker.weight(idx);
            if target < w {
                return idx;
            }
            target -= w;
        }
        *eligible.last().expect("eligible pool is non-empty")
    }

    fn highest_weight(pool: &[usize], tracker: &HealthTracker) -> usize {
        *pool
            .iter()
            .max_by(|&&a, &&b| {
                tracker
                    .weight(a)
                    .partial_cmp(&tracker.weight(b))
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
            .expect("pool is non-empty")
    }

    fn apply_cascade_guard(
        &self,
        candidate: usize,
        eligible: &[usize],
        tracker: &HealthTracker,
        rng: &mut BalancerRng,
        deterministic: bool,
    ) -> usize {
        let candidate_error = tracker.record(candidate).ewma_error_rate();
        if candidate_error <= CASCADE_GUARD_SUSPECT_THRESHOLD {
            return candidate;
        }
        let healthy: Vec<usize> = eligible
            .iter()
            .copied()
            .filter(|&idx| tracker.record(idx).ewma_error_rate() < CASCADE_GUARD_HEALTHY_THRESHOLD)
            .collect();
        if healthy.is_empty() {
            return candidate;
        }
        let replacement = self.pick(&healthy, tracker, rng, deterministic);
        if replacement != candidate {
            self.listeners.emit(&SelectionEvent::CascadeGuardTriggered {
                rejected_backend: tracker.name(candidate).to_string(),
                chosen_backend: tracker.name(replacement).to_string(),
            });
        }
        replacement
    }

    fn last_ditch<B: BackendHandle>(
        &self,
        backends: &[B],
        tracker: &mut HealthTracker,
        request: Request,
        current_tick: u64,
    ) -> Response {
        let candidate = (0..tracker.len())
            .filter(|&idx| matches!(tracker.record(idx).state(), BackendState::Quarantined))
            .min_by(|&a, &b| {
                let ra = tracker.record(a);
                let rb = tracker.record(b);
                ra.ewma_error_rate()
                    .partial_cmp(&rb.ewma_error_rate())
                    .unwrap_or(std::cmp::Ordering::Equal)
                    .then(
                        ra.ewma_latency_ms()
                            .partial_cmp(&rb.ewma_latency_ms())
                            .unwrap_or(std::cmp::Ordering::Equal),
                    )
            });

        match candidate {
            Some(idx) => {
                self.listeners.emit(&SelectionEvent::LastDitchAdmitted {
                    request_id: request.id,
                    backend: tracker.name(idx).to_string(),
                });
                self.invoke(backends, tracker, request, idx, current_tick)
            }
            None => self.shed(request, 1.0),
        }
    }

    fn invoke<B: BackendHandle>(
        &self,
        backends: &[B],
        tracker: &mut HealthTracker,
        request: Request,
        idx: usize,
        current_tick: u64,
    ) -> Response {
        let outcome = backends[idx].send_request();
        tracker.observe_request(idx, outcome.ok, outcome.latency_ms, current_tick);
        let name = tracker.name(idx).to_string();
        self.listeners.emit(&SelectionEvent::Admitted {
            request_id: request.id,
            backend: name.clone(),
        });
        Response::admitted(request.id, name, outcome.ok, outcome.latency_ms)
    }

    fn shed(&self, request: Request, pressure: f64) -> Response {
        self.listeners.emit(&SelectionEvent::Shed {
            request_id: request.id,
            priority: request.priority,
            pressure,
        });
        Response::shed(request.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lb_core::backend::Outcome;
    use lb_health::HealthTrackerConfig;

    struct StubBackend {
        name: String,
        ok: bool,
        latency_ms: f64,
    }

    impl BackendHandle for StubBackend {
        fn name(&self) -> &str {
            &self.name
        }

        fn send_request(&self) -> Outcome {
            Outcome::new(self.ok, self.latency_ms)
        }

        fn health_probe(&self) -> Outcome {
            Outcome::new(self.ok, self.latency_ms * 0.1)
        }
    }

    fn backends(n: usize) -> Vec<StubBackend> {
        (0..n)
            .map(|i| StubBackend {
                name: format!("b{i}"),
                ok: true,
                latency_ms: 50.0,
            })
            .collect()
    }

    fn tracker(n: usize) -> HealthTracker {
        let names = (0..n).map(|i| format!("b{i}")).collect();
        HealthTracker::new(names, HealthTrackerConfig::default())
    }

    #[test]
    fn admits_and_records_outcome_when_healthy() {
        let backs = backends(2);
        let mut t = tracker(2);
        for idx in 0..2 {
            t.refresh_weight(idx);
        }
        let selector = Selector::new(2.0 / 50.0);
        let mut rng = BalancerRng::from_seed(42);
        let request = Request::new(1, Priority::Normal, 0);

        let resp = selector.handle_request(&backs, &mut t, &mut rng, request, 0);
        assert!(resp.admitted);
        assert!(resp.success);
        assert!(!resp.backend_name.is_empty());
    }

    #[test]
    fn sheds_background_when_pool_is_empty() {
        let backs = backends(1);
        let mut t = tracker(1);
        for _ in 0..3 {
            t.observe_request(0, false, 10.0, 1);
        }
        let selector = Selector::new(1.0 / 50.0);
        let mut rng = BalancerRng::from_seed(42);
        let request = Request::new(1, Priority::Background, 1);

        let resp = selector.handle_request(&backs, &mut t, &mut rng, request, 1);
        assert!(resp.shed);
        assert!(!resp.admitted);
    }

    #[test]
    fn critical_attempts_last_ditch_when_pool_is_empty() {
        let backs = backends(1);
        let mut t = tracker(1);
        for _ in 0..3 {
            t.observe_request(0, false, 10.0, 1);
        }
        let selector = Selector::new(1.0 / 50.0);
        let mut rng = BalancerRng::from_seed(42);
        let request = Request::new(1, Priority::Critical, 1);

        let resp = selector.handle_request(&backs, &mut t, &mut rng, request, 1);
        assert!(resp.admitted);
        assert_eq!(resp.backend_name, "b0");
    }

    #[test]
    fn cascade_guard_prefers_healthy_alternative() {
        let backs = vec![
            StubBackend { name: "suspect".to_string(), ok: true, latency_ms: 10.0 },
            StubBackend { name: "healthy".to_string(), ok: true, latency_ms: 10.0 },
        ];
        let names = vec!["suspect".to_string(), "healthy".to_string()];
        let mut t = HealthTracker::new(names, HealthTrackerConfig::default());
        // Push backend 0's error rate above the suspect threshold without quarantining it.
        for _ in 0..2 {
            t.observe_request(0, false, 10.0, 1);
        }
        t.observe_request(0, true, 10.0, 2);
        t.refresh_weight(1);

        let selector = Selector::new(2.0 / 50.0);
        let mut rng = BalancerRng::from_seed(1);
        let request = Request::new(1, Priority::Normal, 2);

        let eligible = selector.eligible_pool(&t, 2);
        assert!(eligible.contains(&0));
        assert!(eligible.contains(&1));
        assert!(t.record(0).ewma_error_rate() > CASCADE_GUARD_SUSPECT_THRESHOLD);
        assert!(t.record(1).ewma_error_rate() < CASCADE_GUARD_HEALTHY_THRESHOLD);

        let resp = selector.handle_request(&backs, &mut t, &mut rng, request, 2);
        assert_eq!(resp.backend_name, "healthy");
    }

    proptest::proptest! {
        #[test]
        fn response_is_always_well_formed(
            n in 1usize..5,
            seed: u64,
            priority_idx in 0usize..3,
            all_failing: bool,
        ) {
            let priority = match priority_idx {
                0 => Priority::Background,
                1 => Priority::Normal,
                _ => Priority::Critical,
            };
            let backs: Vec<StubBackend> = (0..n)
                .map(|i| StubBackend { name: format!("b{i}"), ok: !all_failing, latency_ms: 25.0 })
                .collect();
            let mut t = tracker(n);
            for idx in 0..n {
                t.refresh_weight(idx);
            }
            let selector = Selector::new(n as f64 / 50.0);
            let mut rng = BalancerRng::from_seed(seed);
            let request = Request::new(1, priority, 0);

            let resp = selector.handle_request(&backs, &mut t, &mut rng, request, 0);
            proptest::prop_assert!(resp.is_well_formed());
        }
    }
}
