//! Memoizing wrappers.
//!
//! - [`Cached`] wraps free functions and associated functions (static or
//!   class-level). The key is the function id plus the call arguments.
//! - [`CachedMethod`] wraps instance methods. The receiver's [`Cacheable`]
//!   key becomes the first argument, so two instances never share entries
//!   unless the application says they are equal.
//!
//! On a hit the stored value is returned and the wrapped closure is never
//! run. On a miss the closure runs and its value is written with the
//! wrapper's TTL. `invalidate` rebuilds the same key and deletes it.
//!
//! [`Cacheable`]: crate::keys::Cacheable

mod function;
mod method;

pub use function::Cached;
pub use method::{BoundMethod, CachedMethod};

use std::fmt;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::cache::CacheContext;
use crate::keys::{CallArgs, FunctionId};
use crate::{CacheHelperError, CacheHelperResult};

/// How long a memoized value lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Timeout {
    /// The context's default TTL.
    #[default]
    Default,

    /// Never expires.
    Never,

    /// Expires after the given duration. Zero expires immediately.
    After(Duration),
}

impl Timeout {
    /// Expires after `secs` seconds.
    pub fn secs(secs: u64) -> Self {
        Self::After(Duration::from_secs(secs))
    }

    /// The TTL handed to the backend.
    pub fn resolve(self, context: &CacheContext) -> Option<Duration> {
        match self {
            Timeout::Default => context.default_timeout(),
            Timeout::Never => None,
            Timeout::After(ttl) => Some(ttl),
        }
    }
}

impl From<Duration> for Timeout {
    fn from(ttl: Duration) -> Self {
        Self::After(ttl)
    }
}

impl From<Option<Duration>> for Timeout {
    fn from(ttl: Option<Duration>) -> Self {
        ttl.map_or(Self::Never, Self::After)
    }
}

/// What kind of callable a wrapper was declared for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MethodKind {
    /// Free function.
    Function,

    /// Associated function that does not depend on the type's state.
    StaticMethod,

    /// Associated function over type-level state.
    ClassMethod,

    /// Method with a receiver.
    InstanceMethod,
}

impl fmt::Display for MethodKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MethodKind::Function => write!(f, "function"),
            MethodKind::StaticMethod => write!(f, "static_method"),
            MethodKind::ClassMethod => write!(f, "class_method"),
            MethodKind::InstanceMethod => write!(f, "instance_method"),
        }
    }
}

fn memoize<T, E, F>(
    context: &CacheContext,
    function_id: &FunctionId,
    kind: MethodKind,
    timeout: Timeout,
    args: &CallArgs,
    f: F,
) -> Result<T, E>
where
    T: Serialize + DeserializeOwned,
    E: From<CacheHelperError>,
    F: FnOnce() -> Result<T, E>,
{
    let key = context.make_key(function_id, args)?;

    if let Some(value) = context.fetch::<T>(&key)? {
        tracing::debug!(
            function = %function_id,
            kind = %kind,
            function_key = %key.function_key,
            "Cache hit"
        );
        return Ok(value);
    }

    tracing::debug!(
        function = %function_id,
        kind = %kind,
        function_key = %key.function_key,
        "Cache miss"
    );

    let value = f()?;
    context.store(&key, &value, timeout.resolve(context))?;
    Ok(value)
}

fn invalidate(
    context: &CacheContext,
    function_id: &FunctionId,
    args: &CallArgs,
) -> CacheHelperResult<bool> {
    let key = context.make_key(function_id, args)?;
    let removed = context.remove(&key)?;
    tracing::debug!(
        function = %function_id,
        function_key = %key.function_key,
        removed,
        "Cache entry invalidated"
    );
    Ok(removed)
}
