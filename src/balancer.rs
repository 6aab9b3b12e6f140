//! The `Balancer` facade: the three operations the harness calls.

use crate::config::BalancerConfig;
use lb_core::{BackendHandle, BalancerError, BalancerRng, Request, Response};
use lb_health::HealthTracker;
use lb_maintainer::Maintainer;
use lb_selector::Selector;
use std::collections::HashSet;

/// An adaptive, priority-aware load balancer over a fixed set of backends.
///
/// Construct once with [`Balancer::new`] (or [`Balancer::with_config`]),
/// then drive it with [`Balancer::tick`] and [`Balancer::handle_request`]
/// for the lifetime of the simulation. Neither of those two methods can
/// fail: malformed runtime input is normalized rather than rejected.
pub struct Balancer<B: BackendHandle> {
    backends: Vec<B>,
    tracker: HealthTracker,
    selector: Selector,
    maintainer: Maintainer,
    rng: BalancerRng,
}

impl<B: BackendHandle> Balancer<B> {
    /// Constructs a balancer over `backends` using the reference default
    /// configuration.
    pub fn new(backends: Vec<B>) -> Result<Self, BalancerError> {
        Self::with_config(backends, BalancerConfig::default())
    }

    /// Constructs a balancer over `backends` with an explicit configuration.
    pub fn with_config(backends: Vec<B>, config: BalancerConfig) -> Result<Self, BalancerError> {
        if backends.is_empty() {
            return Err(BalancerError::NoBackends);
        }

        let mut seen = HashSet::with_capacity(backends.len());
        for backend in &backends {
            if !seen.insert(backend.name().to_string()) {
                return Err(BalancerError::DuplicateBackendName(backend.name().to_string()));
            }
        }

        let names: Vec<String> = backends.iter().map(|b| b.name().to_string()).collect();
        let mut tracker = HealthTracker::new(names, config.health);
        for idx in 0..tracker.len() {
            tracker.refresh_weight(idx);
        }

        let baseline_weight_sum = backends.len() as f64 / config.health.default_latency_ms();
        let selector = Selector::new(baseline_weight_sum);
        let maintainer = Maintainer::new(config.maintainer);
        let rng = BalancerRng::from_seed(config.seed);

        Ok(Self {
            backends,
            tracker,
            selector,
            maintainer,
            rng,
        })
    }

    /// Runs one maintenance pass: ages quarantines, probes idle/recovering
    /// backends, and refreshes routing weights. Must be called once per
    /// simulation tick before that tick's `handle_request` calls.
    pub fn tick(&mut self) {
        self.maintainer.tick(&self.backends, &mut self.tracker);
    }

    /// Routes a single request to a backend, or sheds it under pressure.
    pub fn handle_request(&mut self, request: Request) -> Response {
        let current_tick = self.maintainer.current_tick();
        self.selector
            .handle_request(&self.backends, &mut self.tracker, &mut self.rng, request, current_tick)
    }

    /// Read-only access to a backend's current health record, by position.
    pub fn health(&self, idx: usize) -> &lb_health::HealthRecord {
        self.tracker.record(idx)
    }

    /// Number of backends this balancer routes across.
    pub fn backend_count(&self) -> usize {
        self.backends.len()
    }
}
