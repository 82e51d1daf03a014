//! Backend plus the settings that shape keys and failure handling.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use once_cell::sync::Lazy;
use parking_lot::RwLock;
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::{build_backend, CacheBackend};
use crate::keys::{CacheKey, CallArgs, FunctionId};
use crate::types::config::{CacheConfig, Config};
use crate::{CacheHelperError, CacheHelperResult};

static DEFAULT_CONTEXT: Lazy<RwLock<Arc<CacheContext>>> =
    Lazy::new(|| RwLock::new(Arc::new(CacheContext::from_config(&CacheConfig::default()))));

/// Everything a memoized call needs besides its own arguments.
pub struct CacheContext {
    backend: Arc<dyn CacheBackend>,
    key_prefix: String,
    max_depth: usize,
    default_timeout: Option<Duration>,
    fail_open: bool,
}

impl CacheContext {
    /// Context over `backend` with default settings.
    pub fn new(backend: Arc<dyn CacheBackend>) -> Self {
        let defaults = CacheConfig::default();
        Self {
            backend,
            key_prefix: defaults.key_prefix.clone(),
            max_depth: defaults.max_depth,
            default_timeout: defaults.default_timeout(),
            fail_open: defaults.fail_open,
        }
    }

    /// Context with the backend and settings described by `config`.
    pub fn from_config(config: &CacheConfig) -> Self {
        Self {
            backend: build_backend(config),
            key_prefix: config.key_prefix.clone(),
            max_depth: config.max_depth,
            default_timeout: config.default_timeout(),
            fail_open: config.fail_open,
        }
    }

    /// Sets the prefix prepended to every backend key.
    pub fn with_key_prefix(mut self, key_prefix: impl Into<String>) -> Self {
        self.key_prefix = key_prefix.into();
        self
    }

    /// Sets how deeply collection arguments may nest.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Sets the TTL used by `Timeout::Default`. `None` never expires.
    pub fn with_default_timeout(mut self, default_timeout: Option<Duration>) -> Self {
        self.default_timeout = default_timeout;
        self
    }

    /// Sets whether backend read/write failures are logged instead of returned.
    pub fn with_fail_open(mut self, fail_open: bool) -> Self {
        self.fail_open = fail_open;
        self
    }

    /// Backend values are stored in.
    pub fn backend(&self) -> &Arc<dyn CacheBackend> {
        &self.backend
    }

    /// Prefix prepended to backend keys.
    pub fn key_prefix(&self) -> &str {
        &self.key_prefix
    }

    /// Maximum nesting depth of collection arguments.
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// TTL applied by wrappers declared with `Timeout::Default`.
    pub fn default_timeout(&self) -> Option<Duration> {
        self.default_timeout
    }

    /// Whether backend read/write failures are logged instead of returned.
    pub fn fail_open(&self) -> bool {
        self.fail_open
    }

    /// Key for calling `function_id` with `args`.
    pub fn make_key(&self, function_id: &FunctionId, args: &CallArgs) -> CacheHelperResult<CacheKey> {
        CacheKey::build(function_id, args, &self.key_prefix, self.max_depth)
    }

    /// Reads and decodes the value stored under `key`.
    ///
    /// A value that no longer decodes is reported as a miss so the caller
    /// recomputes and overwrites it.
    pub fn fetch<T: DeserializeOwned>(&self, key: &CacheKey) -> CacheHelperResult<Option<T>> {
        let bytes = match self.backend.get(&key.backend_key) {
            Ok(Some(bytes)) => bytes,
            Ok(None) => return Ok(None),
            Err(e) if self.fail_open => {
                tracing::warn!(
                    backend = self.backend.name(),
                    function_key = %key.function_key,
                    error = %e,
                    "Error retrieving value from cache"
                );
                return Ok(None);
            }
            Err(e) => return Err(e),
        };

        match serde_json::from_slice(&bytes) {
            Ok(value) => Ok(Some(value)),
            Err(e) => {
                tracing::warn!(
                    backend_key = %key.backend_key,
                    function_key = %key.function_key,
                    error = %e,
                    "Undecodable cache value found"
                );
                Ok(None)
            }
        }
    }

    /// Encodes `value` and writes it under `key`.
    pub fn store<T: Serialize>(
        &self,
        key: &CacheKey,
        value: &T,
        ttl: Option<Duration>,
    ) -> CacheHelperResult<()> {
        let bytes = match serde_json::to_vec(value) {
            Ok(bytes) => bytes,
            Err(e) => return self.degrade(key, e.into(), "Error serializing value for cache"),
        };

        match self.backend.set(&key.backend_key, bytes, ttl) {
            Ok(()) => Ok(()),
            Err(e) => self.degrade(key, e, "Error saving value to cache"),
        }
    }

    /// Deletes whatever is stored under `key`.
    pub fn remove(&self, key: &CacheKey) -> CacheHelperResult<bool> {
        self.backend.delete(&key.backend_key)
    }

    fn degrade(
        &self,
        key: &CacheKey,
        error: CacheHelperError,
        message: &str,
    ) -> CacheHelperResult<()> {
        if !self.fail_open {
            return Err(error);
        }
        tracing::warn!(
            backend = self.backend.name(),
            function_key = %key.function_key,
            error = %error,
            "{}",
            message
        );
        Ok(())
    }
}

impl fmt::Debug for CacheContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheContext")
            .field("backend", &self.backend.name())
            .field("key_prefix", &self.key_prefix)
            .field("max_depth", &self.max_depth)
            .field("default_timeout", &self.default_timeout)
            .field("fail_open", &self.fail_open)
            .finish()
    }
}

/// Context used by wrappers that were not given one explicitly.
pub fn default_context() -> Arc<CacheContext> {
    DEFAULT_CONTEXT.read().clone()
}

/// Replaces the process-wide default context and returns it.
///
/// Wrappers resolve the default on every call, so the change applies to
/// wrappers created earlier too.
pub fn set_default_context(context: CacheContext) -> Arc<CacheContext> {
    let context = Arc::new(context);
    *DEFAULT_CONTEXT.write() = Arc::clone(&context);
    context
}

/// Installs a default context built from `config`.
pub fn configure(config: &Config) -> Arc<CacheContext> {
    let context = set_default_context(CacheContext::from_config(&config.cache));
    tracing::info!(
        backend = context.backend().name(),
        key_prefix = context.key_prefix(),
        max_depth = context.max_depth(),
        "Cache helper configured"
    );
    context
}
