//! # cache-helper
//!
//! Memoizes functions and methods in a shared cache keyed by their
//! arguments, with matching invalidation.
//!
//! A call is turned into a deterministic key (function id plus the
//! [`Cacheable`] keys of its arguments, SHA256-hashed), looked up in a
//! [`CacheBackend`], and on a miss the wrapped closure runs and its result is
//! stored with the wrapper's TTL. Storage, eviction and expiry are the
//! backend's job.
//!
//! ## Modules
//!
//! - [`keys`] - Cache key construction
//! - [`cache`] - Backends and the shared cache context
//! - [`decorators`] - Memoizing wrappers for functions and methods
//! - [`logging`] - Subscriber setup
//! - [`types`] - Configuration and errors
//!
//! ```
//! use cache_helper::{call_args, function_id, Cached, Timeout};
//!
//! let square = Cached::function(function_id!("square"), Timeout::secs(300));
//! let value: u64 = square.call(&call_args![12], || 12 * 12).unwrap();
//! assert_eq!(value, 144);
//! ```

pub mod cache;
pub mod decorators;
pub mod keys;
pub mod logging;
pub mod types;

pub use cache::{
    configure, default_context, set_default_context, CacheBackend, CacheContext, MemoryBackend,
    NullBackend,
};
pub use decorators::{BoundMethod, Cached, CachedMethod, MethodKind, Timeout};
pub use keys::{CacheKey, CallArgs, Cacheable, FunctionId, KeyPart};
pub use logging::init_logging;
pub use types::config::Config;
pub use types::errors::{CacheHelperError, CacheHelperResult};

#[doc(hidden)]
pub mod __private {
    pub use once_cell::sync::Lazy;
}
