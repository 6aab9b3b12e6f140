//! Tunable constants for the health tracker's EWMA, fast-path detection,
//! and quarantine backoff.

/// Configuration for a [`crate::tracker::HealthTracker`].
///
/// All fields have defaults matching the reference thresholds; use
/// [`HealthTrackerConfig::builder`] to override any of them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HealthTrackerConfig {
    pub(crate) request_alpha: f64,
    pub(crate) probe_alpha: f64,
    pub(crate) default_latency_ms: f64,
    pub(crate) window_size: usize,
    pub(crate) window_failure_ratio_threshold: f64,
    pub(crate) window_min_samples: usize,
    pub(crate) consecutive_failure_threshold: u32,
    pub(crate) error_rate_threshold: f64,
    pub(crate) quarantine_base_ticks: u64,
    pub(crate) quarantine_cap_ticks: u64,
    pub(crate) reentry_decay_interval_ticks: u64,
    pub(crate) probation_target_successes: u32,
}

impl HealthTrackerConfig {
    /// Creates a new configuration builder seeded with the reference defaults.
    pub fn builder() -> HealthTrackerConfigBuilder {
        HealthTrackerConfigBuilder::new()
    }

    /// Optimistic initial latency estimate before any sample is observed.
    pub fn default_latency_ms(&self) -> f64 {
        self.default_latency_ms
    }
}

impl Default for HealthTrackerConfig {
    fn default() -> Self {
        HealthTrackerConfigBuilder::new().build()
    }
}

/// Builder for [`HealthTrackerConfig`].
pub struct HealthTrackerConfigBuilder {
    request_alpha: f64,
    probe_alpha: f64,
    default_latency_ms: f64,
    window_size: usize,
    window_failure_ratio_threshold: f64,
    window_min_samples: usize,
    consecutive_failure_threshold: u32,
    error_rate_threshold: f64,
    quarantine_base_ticks: u64,
    quarantine_cap_ticks: u64,
    reentry_decay_interval_ticks: u64,
    probation_target_successes: u32,
}

impl HealthTrackerConfigBuilder {
    /// Creates a new builder with the reference default thresholds.
    pub fn new() -> Self {
        Self {
            request_alpha: 0.2,
            probe_alpha: 0.4,
            default_latency_ms: 50.0,
            window_size: 20,
            window_failure_ratio_threshold: 0.5,
            window_min_samples: 6,
            consecutive_failure_threshold: 3,
            error_rate_threshold: 0.4,
            quarantine_base_ticks: 5,
            quarantine_cap_ticks: 40,
            reentry_decay_interval_ticks: 20,
            probation_target_successes: 5,
        }
    }

    /// Smoothing factor for request-driven EWMA updates.
    ///
    /// Default: 0.2
    pub fn request_alpha(mut self, alpha: f64) -> Self {
        self.request_alpha = alpha;
        self
    }

    /// Smoothing factor for probe-driven EWMA updates. Larger than
    /// `request_alpha` since probes are sparser and should move the
    /// estimate faster.
    ///
    /// Default: 0.4
    pub fn probe_alpha(mut self, alpha: f64) -> Self {
        self.probe_alpha = alpha;
        self
    }

    /// Optimistic initial latency estimate before any sample is observed.
    ///
    /// Default: 50.0 ms
    pub fn default_latency_ms(mut self, ms: f64) -> Self {
        self.default_latency_ms = ms;
        self
    }

    /// Size of the rolling outcome window used for fast-onset detection.
    ///
    /// Default: 20
    pub fn window_size(mut self, size: usize) -> Self {
        self.window_size = size;
        self
    }

    /// Failure ratio within the rolling window above which a backend is
    /// quarantined, once `window_min_samples` is met.
    ///
    /// Default: 0.5
    pub fn window_failure_ratio_threshold(mut self, ratio: f64) -> Self {
        self.window_failure_ratio_threshold = ratio;
        self
    }

    /// Minimum samples in the rolling window before its failure ratio is evaluated.
    ///
    /// Default: 6
    pub fn window_min_samples(mut self, samples: usize) -> Self {
        self.window_min_samples = samples;
        self
    }

    /// Consecutive-failure count that triggers immediate quarantine.
    ///
    /// Default: 3
    pub fn consecutive_failure_threshold(mut self, count: u32) -> Self {
        self.consecutive_failure_threshold = count;
        self
    }

    /// EWMA error rate above which a backend is quarantined.
    ///
    /// Default: 0.4
    pub fn error_rate_threshold(mut self, rate: f64) -> Self {
        self.error_rate_threshold = rate;
        self
    }

    /// Base quarantine length in ticks, before exponential backoff.
    ///
    /// Default: 5
    pub fn quarantine_base_ticks(mut self, ticks: u64) -> Self {
        self.quarantine_base_ticks = ticks;
        self
    }

    /// Maximum quarantine length in ticks after repeated re-entry.
    ///
    /// Default: 40
    pub fn quarantine_cap_ticks(mut self, ticks: u64) -> Self {
        self.quarantine_cap_ticks = ticks;
        self
    }

    /// Number of continuously-healthy ticks after which the re-entry
    /// counter decays by one.
    ///
    /// Default: 20
    pub fn reentry_decay_interval_ticks(mut self, ticks: u64) -> Self {
        self.reentry_decay_interval_ticks = ticks;
        self
    }

    /// Consecutive successes required to exit probation back to full service.
    ///
    /// Default: 5
    pub fn probation_target_successes(mut self, count: u32) -> Self {
        self.probation_target_successes = count;
        self
    }

    /// Builds the configuration.
    pub fn build(self) -> HealthTrackerConfig {
        HealthTrackerConfig {
            request_alpha: self.request_alpha,
            probe_alpha: self.probe_alpha,
            default_latency_ms: self.default_latency_ms,
            window_size: self.window_size,
            window_failure_ratio_threshold: self.window_failure_ratio_threshold,
            window_min_samples: self.window_min_samples,
            consecutive_failure_threshold: self.consecutive_failure_threshold,
            error_rate_threshold: self.error_rate_threshold,
            quarantine_base_ticks: self.quarantine_base_ticks,
            quarantine_cap_ticks: self.quarantine_cap_ticks,
            reentry_decay_interval_ticks: self.reentry_decay_interval_ticks,
            probation_target_successes: self.probation_target_successes,
        }
    }
}

impl Default for HealthTrackerConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_reference_thresholds() {
        let config = HealthTrackerConfig::default();
        assert_eq!(config.request_alpha, 0.2);
        assert_eq!(config.probe_alpha, 0.4);
        assert_eq!(config.consecutive_failure_threshold, 3);
        assert_eq!(config.quarantine_base_ticks, 5);
        assert_eq!(config.quarantine_cap_ticks, 40);
    }

    #[test]
    fn builder_overrides_apply() {
        let config = HealthTrackerConfig::builder()
            .request_alpha(0.3)
            .probation_target_successes(10)
            .build();
        assert_eq!(config.request_alpha, 0.3);
        assert_eq!(config.probation_target_successes, 10);
    }
}
