//! Cache construction settings

/// Default budget (64 MiB when weights are bytes)
pub const DEFAULT_BUDGET: i64 = 64 * 1024 * 1024;

/// Settings for building a [`crate::WeightedCache`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheConfig {
    /// Maximum total weight kept resident
    pub budget: i64,
    /// Emit eviction notices to the sink
    pub verbose: bool,
}

impl CacheConfig {
    /// Config with the given budget and notices off
    pub fn new(budget: i64) -> Self {
        Self {
            budget,
            verbose: false,
        }
    }

    /// Set whether eviction notices are emitted
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BUDGET)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_builder() {
        let config = CacheConfig::new(10).verbose(true);
        assert_eq!(config.budget, 10);
        assert!(config.verbose);

        let config = CacheConfig::default();
        assert_eq!(config.budget, DEFAULT_BUDGET);
        assert!(!config.verbose);
    }
}
