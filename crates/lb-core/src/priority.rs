//! Request priority, modeled as a totally-ordered enum.
//!
//! Higher variants are more important. All shedding comparisons use the
//! derived order, never the discriminant identity directly — see
//! [`Priority::shed_threshold`].

/// Request priority levels. Higher value = higher importance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum Priority {
    /// Best-effort traffic; first to be shed under pressure.
    Background = 1,
    /// Default priority for ordinary traffic.
    Normal = 2,
    /// Traffic that should be admitted even under heavy pressure.
    Critical = 3,
}

impl Priority {
    /// The shedding-pressure threshold above which requests at this
    /// priority are shed. Thresholds are strictly increasing with
    /// priority, so `shed(background) >= shed(normal) >= shed(critical)`
    /// is structurally guaranteed.
    pub fn shed_threshold(self) -> f64 {
        match self {
            Priority::Background => 0.20,
            Priority::Normal => 0.50,
            Priority::Critical => 0.85,
        }
    }

    /// Parses an arbitrary integer into a priority, defaulting unknown
    /// values to [`Priority::Normal`] per the "never abort on invalid
    /// input" error-handling policy.
    pub fn from_i64(value: i64) -> Self {
        match value {
            1 => Priority::Background,
            3 => Priority::Critical,
            _ => Priority::Normal,
        }
    }
}

impl Default for Priority {
    fn default() -> Self {
        Priority::Normal
    }
}
