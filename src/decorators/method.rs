//! Wrapper for methods with a receiver.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;

use super::{Cached, MethodKind, Timeout};
use crate::cache::CacheContext;
use crate::keys::{CacheKey, CallArgs, Cacheable, FunctionId, KeyPart};
use crate::{CacheHelperError, CacheHelperResult};

/// Memoizes an instance method.
///
/// The receiver's [`Cacheable`] key is the first argument of every key, so
/// entries are per instance. Receivers that return the same key share
/// entries.
///
/// Bind the receiver before running a closure that mutates it:
///
/// ```
/// use cache_helper::{call_args, CachedMethod, Cacheable, KeyPart, Timeout};
/// use once_cell::sync::Lazy;
///
/// struct Counter {
///     id: u32,
///     total: i64,
/// }
///
/// impl Cacheable for Counter {
///     fn cache_helper_key(&self) -> KeyPart {
///         KeyPart::display(&self.id)
///     }
/// }
///
/// static ADD: Lazy<CachedMethod> =
///     Lazy::new(|| CachedMethod::new::<Counter>("add", Timeout::secs(60)));
///
/// impl Counter {
///     fn add(&mut self, n: i64) -> i64 {
///         ADD.bind(&*self)
///             .call(&call_args![n], || {
///                 self.total += n;
///                 self.total
///             })
///             .unwrap()
///     }
/// }
///
/// let mut counter = Counter { id: 1, total: 0 };
/// assert_eq!(counter.add(5), 5);
/// assert_eq!(counter.add(5), 5);
/// ```
#[derive(Debug, Clone)]
pub struct CachedMethod {
    inner: Cached,
}

impl CachedMethod {
    /// Wraps the method `name` of `T`.
    pub fn new<T: ?Sized>(name: &str, timeout: impl Into<Timeout>) -> Self {
        Self::with_id(FunctionId::method::<T>(name), timeout)
    }

    /// Wraps a method under an explicit id.
    pub fn with_id(function_id: FunctionId, timeout: impl Into<Timeout>) -> Self {
        Self {
            inner: Cached::with_kind(function_id, MethodKind::InstanceMethod, timeout),
        }
    }

    /// Uses `context` instead of the process default.
    pub fn with_context(self, context: Arc<CacheContext>) -> Self {
        Self {
            inner: self.inner.with_context(context),
        }
    }

    /// Identifier the keys are built from.
    pub fn function_id(&self) -> &FunctionId {
        self.inner.function_id()
    }

    /// TTL of stored values.
    pub fn timeout(&self) -> Timeout {
        self.inner.timeout()
    }

    /// Fixes the receiver. The returned handle does not borrow it.
    pub fn bind<R: Cacheable + ?Sized>(&self, receiver: &R) -> BoundMethod<'_> {
        BoundMethod {
            method: self,
            receiver: receiver.cache_helper_key(),
        }
    }

    /// Returns the cached value for `receiver` and `args`, running `f` on a
    /// miss.
    pub fn call<R, T, F>(&self, receiver: &R, args: &CallArgs, f: F) -> CacheHelperResult<T>
    where
        R: Cacheable + ?Sized,
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> T,
    {
        self.bind(receiver).call(args, f)
    }

    /// Deletes the cached value for `receiver` and `args`.
    pub fn invalidate<R: Cacheable + ?Sized>(
        &self,
        receiver: &R,
        args: &CallArgs,
    ) -> CacheHelperResult<bool> {
        self.bind(receiver).invalidate(args)
    }
}

/// A [`CachedMethod`] with its receiver applied.
#[derive(Debug, Clone)]
pub struct BoundMethod<'a> {
    method: &'a CachedMethod,
    receiver: KeyPart,
}

impl BoundMethod<'_> {
    fn args(&self, args: &CallArgs) -> CallArgs {
        args.with_receiver(self.receiver.clone())
    }

    /// Key part contributed by the receiver.
    pub fn receiver(&self) -> &KeyPart {
        &self.receiver
    }

    /// Key a call with `args` reads and writes.
    pub fn cache_key(&self, args: &CallArgs) -> CacheHelperResult<CacheKey> {
        self.method.inner.cache_key(&self.args(args))
    }

    /// Returns the cached value for `args`, running `f` on a miss.
    pub fn call<T, F>(&self, args: &CallArgs, f: F) -> CacheHelperResult<T>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> T,
    {
        self.method.inner.call(&self.args(args), f)
    }

    /// Like [`call`](Self::call) for fallible functions.
    pub fn try_call<T, E, F>(&self, args: &CallArgs, f: F) -> Result<T, E>
    where
        T: Serialize + DeserializeOwned,
        E: From<CacheHelperError>,
        F: FnOnce() -> Result<T, E>,
    {
        self.method.inner.try_call(&self.args(args), f)
    }

    /// Deletes the cached value for `args`. Returns whether one existed.
    pub fn invalidate(&self, args: &CallArgs) -> CacheHelperResult<bool> {
        self.method.inner.invalidate(&self.args(args))
    }
}
