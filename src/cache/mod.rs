//! Cache backends.
//!
//! Memoized values are stored through the [`CacheBackend`] trait. Storage,
//! eviction and expiry belong to the backend; this crate only decides which
//! key to read, write or delete. Two in-process backends ship with the
//! crate: [`MemoryBackend`] (bounded LRU with per-entry TTL) and
//! [`NullBackend`] (caching disabled).

mod context;
mod lru;
mod null;

pub use context::{configure, default_context, set_default_context, CacheContext};
pub use lru::{CacheStats, CachedEntry, MemoryBackend};
pub use null::NullBackend;

use std::sync::Arc;
use std::time::Duration;

use crate::types::config::{BackendKind, CacheConfig};
use crate::CacheHelperResult;

/// Key-value store that memoized results are written to.
///
/// Values are opaque bytes. A `ttl` of `None` means the entry does not
/// expire; a zero `ttl` expires immediately.
pub trait CacheBackend: Send + Sync {
    /// Short name used in log output.
    fn name(&self) -> &str;

    /// Reads a value. Absent and expired entries are `None`.
    fn get(&self, key: &str) -> CacheHelperResult<Option<Vec<u8>>>;

    /// Writes a value, replacing any previous one.
    fn set(&self, key: &str, value: Vec<u8>, ttl: Option<Duration>) -> CacheHelperResult<()>;

    /// Deletes a value. Returns whether something was removed.
    fn delete(&self, key: &str) -> CacheHelperResult<bool>;

    /// Checks for a live entry.
    fn contains_key(&self, key: &str) -> CacheHelperResult<bool> {
        Ok(self.get(key)?.is_some())
    }

    /// Removes every entry.
    fn clear(&self) -> CacheHelperResult<()>;
}

/// Builds the backend selected by `config`.
pub fn build_backend(config: &CacheConfig) -> Arc<dyn CacheBackend> {
    match config.effective_backend() {
        BackendKind::Memory => Arc::new(MemoryBackend::new(config.capacity)),
        BackendKind::Null => Arc::new(NullBackend),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_backend_follows_config() {
        assert_eq!(build_backend(&CacheConfig::default()).name(), "memory");

        let null = CacheConfig {
            backend: BackendKind::Null,
            ..CacheConfig::default()
        };
        assert_eq!(build_backend(&null).name(), "null");

        let disabled = CacheConfig {
            enabled: false,
            ..CacheConfig::default()
        };
        assert_eq!(build_backend(&disabled).name(), "null");
    }
}
