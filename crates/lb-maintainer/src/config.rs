//! Tunable probe-scheduling intervals for the maintainer.

/// Configuration for a [`crate::maintainer::Maintainer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MaintainerConfig {
    pub(crate) idle_probe_interval_ticks: u64,
    pub(crate) probation_probe_interval_ticks: u64,
}

impl MaintainerConfig {
    /// Creates a new configuration builder seeded with the reference defaults.
    pub fn builder() -> MaintainerConfigBuilder {
        MaintainerConfigBuilder::new()
    }
}

impl Default for MaintainerConfig {
    fn default() -> Self {
        MaintainerConfigBuilder::new().build()
    }
}

/// Builder for [`MaintainerConfig`].
pub struct MaintainerConfigBuilder {
    idle_probe_interval_ticks: u64,
    probation_probe_interval_ticks: u64,
}

impl MaintainerConfigBuilder {
    /// Creates a new builder with the reference default intervals.
    pub fn new() -> Self {
        Self {
            idle_probe_interval_ticks: 5,
            probation_probe_interval_ticks: 2,
        }
    }

    /// Ticks a live backend may go unsampled before an idle probe is issued.
    ///
    /// Default: 5
    pub fn idle_probe_interval_ticks(mut self, ticks: u64) -> Self {
        self.idle_probe_interval_ticks = ticks;
        self
    }

    /// Interval, in ticks, at which backends on probation are probed.
    /// `2` means "at least every other tick".
    ///
    /// Default: 2
    pub fn probation_probe_interval_ticks(mut self, ticks: u64) -> Self {
        self.probation_probe_interval_ticks = ticks.max(1);
        self
    }

    /// Builds the configuration.
    pub fn build(self) -> MaintainerConfig {
        MaintainerConfig {
            idle_probe_interval_ticks: self.idle_probe_interval_ticks,
            probation_probe_interval_ticks: self.probation_probe_interval_ticks,
        }
    }
}

impl Default for MaintainerConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_reference_intervals() {
        let config = MaintainerConfig::default();
        assert_eq!(config.idle_probe_interval_ticks, 5);
        assert_eq!(config.probation_probe_interval_ticks, 2);
    }

    #[test]
    fn probation_interval_cannot_be_zero() {
        let config = MaintainerConfig::builder().probation_probe_interval_ticks(0).build();
        assert_eq!(config.probation_probe_interval_ticks, 1);
    }
}
