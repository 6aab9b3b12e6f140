//! Aggregate configuration for a [`crate::Balancer`], composing each
//! subsystem's own builder.

use lb_health::HealthTrackerConfig;
use lb_maintainer::MaintainerConfig;

/// Default seed for the balancer's internal pseudorandom source.
///
/// Arbitrary but fixed, so a harness that never calls
/// [`BalancerConfigBuilder::seed`] still gets reproducible runs.
pub const DEFAULT_SEED: u64 = 42;

/// Configuration for a [`crate::Balancer`].
#[derive(Debug, Clone, Copy)]
pub struct BalancerConfig {
    pub(crate) health: HealthTrackerConfig,
    pub(crate) maintainer: MaintainerConfig,
    pub(crate) seed: u64,
}

impl BalancerConfig {
    /// Creates a new configuration builder seeded with the reference defaults.
    pub fn builder() -> BalancerConfigBuilder {
        BalancerConfigBuilder::new()
    }
}

impl Default for BalancerConfig {
    fn default() -> Self {
        BalancerConfigBuilder::new().build()
    }
}

/// Builder for [`BalancerConfig`].
pub struct BalancerConfigBuilder {
    health: HealthTrackerConfig,
    maintainer: MaintainerConfig,
    seed: u64,
}

impl BalancerConfigBuilder {
    /// Creates a new builder with every subsystem at its reference defaults.
    pub fn new() -> Self {
        Self {
            health: HealthTrackerConfig::default(),
            maintainer: MaintainerConfig::default(),
            seed: DEFAULT_SEED,
        }
    }

    /// Overrides the health tracker's configuration.
    pub fn health(mut self, health: HealthTrackerConfig) -> Self {
        self.health = health;
        self
    }

    /// Overrides the maintainer's probe-scheduling configuration.
    pub fn maintainer(mut self, maintainer: MaintainerConfig) -> Self {
        self.maintainer = maintainer;
        self
    }

    /// Overrides the seed for the balancer's internal pseudorandom source.
    ///
    /// Default: [`DEFAULT_SEED`]
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Builds the configuration.
    pub fn build(self) -> BalancerConfig {
        BalancerConfig {
            health: self.health,
            maintainer: self.maintainer,
            seed: self.seed,
        }
    }
}

impl Default for BalancerConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
