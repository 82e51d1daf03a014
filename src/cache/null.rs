//! Backend that stores nothing.

use std::time::Duration;

use super::CacheBackend;
use crate::CacheHelperResult;

/// Accepts every write and never returns a value.
///
/// Installed when caching is disabled, so wrapped functions always run.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullBackend;

impl CacheBackend for NullBackend {
    fn name(&self) -> &str {
        "null"
    }

    fn get(&self, _key: &str) -> CacheHelperResult<Option<Vec<u8>>> {
        Ok(None)
    }

    fn set(&self, _key: &str, _value: Vec<u8>, _ttl: Option<Duration>) -> CacheHelperResult<()> {
        Ok(())
    }

    fn delete(&self, _key: &str) -> CacheHelperResult<bool> {
        Ok(false)
    }

    fn clear(&self) -> CacheHelperResult<()> {
        Ok(())
    }
}
