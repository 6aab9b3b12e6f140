//! The per-tick maintenance loop: probe scheduling and weight refresh.

use crate::config::MaintainerConfig;
use lb_core::BackendHandle;
use lb_health::{BackendState, HealthTracker};

/// Drives the health tracker forward one tick at a time: ages quarantines,
/// schedules probes, and refreshes routing weights.
pub struct Maintainer {
    config: MaintainerConfig,
    current_tick: u64,
}

impl Maintainer {
    /// Creates a maintainer starting at tick 0, per the "no tick has
    /// occurred yet" safe default.
    pub fn new(config: MaintainerConfig) -> Self {
        Self {
            config,
            current_tick: 0,
        }
    }

    /// The tick most recently completed by [`Maintainer::tick`].
    pub fn current_tick(&self) -> u64 {
        self.current_tick
    }

    /// Advances the tick counter and runs one maintenance pass: aging
    /// quarantines, probing idle/probation/ready-to-recover backends, and
    /// refreshing every backend's cached weight. At most one probe is
    /// issued per backend.
    pub fn tick<B: BackendHandle>(&mut self, backends: &[B], tracker: &mut HealthTracker) {
        self.current_tick += 1;
        let tick = self.current_tick;

        for idx in 0..tracker.len() {
            tracker.tick_decay(idx);

            if self.should_probe(tracker, idx, tick) {
                #[cfg(feature = "tracing")]
                tracing::debug!(
                    backend = %tracker.name(idx),
                    tick,
                    state = ?tracker.record(idx).state(),
                    "issuing health probe"
                );
                let outcome = backends[idx].health_probe();
                tracker.observe_probe(idx, outcome.ok, outcome.latency_ms, tick);
            }

            tracker.refresh_weight(idx);
        }
    }

    fn should_probe(&self, tracker: &HealthTracker, idx: usize, tick: u64) -> bool {
        let record = tracker.record(idx);
        match record.state() {
            BackendState::Quarantined => record.quarantine_until_tick() <= tick,
            BackendState::Probation => tick % self.config.probation_probe_interval_ticks == 0,
            BackendState::Live => {
                tick.saturating_sub(record.last_sample_tick()) >= self.config.idle_probe_interval_ticks
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lb_core::backend::Outcome;
    use lb_health::HealthTrackerConfig;

    struct ScriptedBackend {
        name: String,
        ok: bool,
        latency_ms: f64,
        probes: std::sync::atomic::AtomicU32,
    }

    impl BackendHandle for ScriptedBackend {
        fn name(&self) -> &str {
            &self.name
        }

        fn send_request(&self) -> Outcome {
            Outcome::new(self.ok, self.latency_ms)
        }

        fn health_probe(&self) -> Outcome {
            self.probes.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            Outcome::new(self.ok, self.latency_ms * 0.1)
        }
    }

    fn backend(ok: bool) -> ScriptedBackend {
        ScriptedBackend {
            name: "b0".to_string(),
            ok,
            latency_ms: 50.0,
            probes: std::sync::atomic::AtomicU32::new(0),
        }
    }

    #[test]
    fn idle_live_backend_gets_probed_after_interval() {
        let backends = vec![backend(true)];
        let mut tracker = HealthTracker::new(vec!["b0".to_string()], HealthTrackerConfig::default());
        let mut maintainer = Maintainer::new(MaintainerConfig::default());

        for _ in 0..4 {
            maintainer.tick(&backends, &mut tracker);
        }
        assert_eq!(backends[0].probes.load(std::sync::atomic::Ordering::SeqCst), 0);

        maintainer.tick(&backends, &mut tracker);
        assert_eq!(backends[0].probes.load(std::sync::atomic::Ordering::SeqCst), 1);
    }

    #[test]
    fn quarantined_backend_is_probed_once_backoff_elapses() {
        let backends = vec![backend(false)];
        let mut tracker = HealthTracker::new(vec!["b0".to_string()], HealthTrackerConfig::default());
        for _ in 0..3 {
            tracker.observe_request(0, false, 10.0, 1);
        }
        let deadline = tracker.record(0).quarantine_until_tick();

        let mut maintainer = Maintainer::new(MaintainerConfig::default());
        for _ in 0..deadline {
            maintainer.tick(&backends, &mut tracker);
        }
        assert!(backends[0].probes.load(std::sync::atomic::Ordering::SeqCst) >= 1);
        // The probe outcome always fails here, so the backend never exits quarantine.
        assert!(tracker.is_quarantined(0, maintainer.current_tick()));
    }

    #[test]
    fn probation_backend_is_probed_at_least_every_other_tick() {
        let backends = vec![backend(true)];
        let mut tracker = HealthTracker::new(vec!["b0".to_string()], HealthTrackerConfig::default());
        for _ in 0..3 {
            tracker.observe_request(0, false, 10.0, 1);
        }
        let deadline = tracker.record(0).quarantine_until_tick();
        tracker.observe_probe(0, true, 5.0, deadline);
        assert!(tracker.in_probation(0));

        let mut maintainer = Maintainer::new(MaintainerConfig::default());
        for _ in 0..deadline {
            maintainer.tick(&backends, &mut tracker);
        }
        for _ in 0..2 {
            maintainer.tick(&backends, &mut tracker);
        }
        assert!(backends[0].probes.load(std::sync::atomic::Ordering::SeqCst) >= 1);
    }

    #[test]
    fn at_most_one_probe_per_backend_per_tick() {
        let backends = vec![backend(true)];
        let mut tracker = HealthTracker::new(vec!["b0".to_string()], HealthTrackerConfig::default());
        let mut maintainer = Maintainer::new(MaintainerConfig::default());
        maintainer.tick(&backends, &mut tracker);
        assert!(backends[0].probes.load(std::sync::atomic::Ordering::SeqCst) <= 1);
    }
}
