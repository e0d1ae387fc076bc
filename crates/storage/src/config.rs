//! Cache configuration.

/// Configuration for a [`RefCache`](crate::RefCache).
///
/// # Example
///
/// ```
/// use keystone_storage::CacheConfig;
///
/// let config = CacheConfig::bounded(64);
/// assert_eq!(config.max_resources, 64);
/// assert!(CacheConfig::default().is_unbounded());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CacheConfig {
    /// Maximum number of resources held at once, counting loads in flight.
    ///
    /// `0` disables the bound.
    pub max_resources: usize,
}

impl CacheConfig {
    /// Cache holding at most `max_resources` resources.
    pub fn bounded(max_resources: usize) -> Self {
        Self { max_resources }
    }

    /// Cache with no capacity bound.
    pub fn unbounded() -> Self {
        Self { max_resources: 0 }
    }

    /// Whether the capacity bound is disabled.
    pub fn is_unbounded(&self) -> bool {
        self.max_resources == 0
    }
}
