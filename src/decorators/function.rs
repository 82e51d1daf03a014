//! Wrapper for free and associated functions.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;

use super::{MethodKind, Timeout};
use crate::cache::{default_context, CacheContext};
use crate::keys::{CacheKey, CallArgs, FunctionId};
use crate::{CacheHelperError, CacheHelperResult};

/// Memoizes a function that has no receiver.
///
/// Without [`with_context`](Self::with_context) the process-wide default
/// context is looked up on every call.
///
/// ```
/// use cache_helper::{call_args, function_id, Cached, Timeout};
///
/// let add = Cached::function(function_id!("add"), Timeout::secs(60));
/// let sum: i64 = add.call(&call_args![1, 2], || 1 + 2).unwrap();
/// assert_eq!(sum, 3);
/// ```
#[derive(Debug, Clone)]
pub struct Cached {
    function_id: FunctionId,
    kind: MethodKind,
    timeout: Timeout,
    context: Option<Arc<CacheContext>>,
}

impl Cached {
    pub(crate) fn with_kind(
        function_id: FunctionId,
        kind: MethodKind,
        timeout: impl Into<Timeout>,
    ) -> Self {
        Self {
            function_id,
            kind,
            timeout: timeout.into(),
            context: None,
        }
    }

    /// Wraps a free function.
    pub fn function(function_id: FunctionId, timeout: impl Into<Timeout>) -> Self {
        Self::with_kind(function_id, MethodKind::Function, timeout)
    }

    /// Wraps the associated function `name` of `T`.
    pub fn static_method<T: ?Sized>(name: &str, timeout: impl Into<Timeout>) -> Self {
        Self::with_kind(FunctionId::method::<T>(name), MethodKind::StaticMethod, timeout)
    }

    /// Wraps an associated function of `T` that reads type-level state.
    ///
    /// The type is part of the function id and never an argument, so a type
    /// that forwards to another type's wrapped function shares its entries,
    /// while a type with its own wrapper does not.
    pub fn class_method<T: ?Sized>(name: &str, timeout: impl Into<Timeout>) -> Self {
        Self::with_kind(FunctionId::method::<T>(name), MethodKind::ClassMethod, timeout)
    }

    /// Uses `context` instead of the process default.
    pub fn with_context(mut self, context: Arc<CacheContext>) -> Self {
        self.context = Some(context);
        self
    }

    /// Identifier the keys are built from.
    pub fn function_id(&self) -> &FunctionId {
        &self.function_id
    }

    /// Kind of callable this wrapper was declared for.
    pub fn kind(&self) -> MethodKind {
        self.kind
    }

    /// TTL of stored values.
    pub fn timeout(&self) -> Timeout {
        self.timeout
    }

    /// The context calls go through.
    pub fn context(&self) -> Arc<CacheContext> {
        self.context.clone().unwrap_or_else(default_context)
    }

    /// Key a call with `args` reads and writes.
    pub fn cache_key(&self, args: &CallArgs) -> CacheHelperResult<CacheKey> {
        self.context().make_key(&self.function_id, args)
    }

    /// Returns the cached value for `args`, running `f` on a miss.
    pub fn call<T, F>(&self, args: &CallArgs, f: F) -> CacheHelperResult<T>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> T,
    {
        self.try_call(args, || Ok(f()))
    }

    /// Like [`call`](Self::call) for fallible functions.
    ///
    /// An error from `f` is returned as is and nothing is cached.
    pub fn try_call<T, E, F>(&self, args: &CallArgs, f: F) -> Result<T, E>
    where
        T: Serialize + DeserializeOwned,
        E: From<CacheHelperError>,
        F: FnOnce() -> Result<T, E>,
    {
        let context = self.context();
        super::memoize(&context, &self.function_id, self.kind, self.timeout, args, f)
    }

    /// Deletes the cached value for `args`. Returns whether one existed.
    pub fn invalidate(&self, args: &CallArgs) -> CacheHelperResult<bool> {
        super::invalidate(&self.context(), &self.function_id, args)
    }
}

/// Declares a memoized free function.
///
/// The wrapper is exposed as a `static` so callers can invalidate entries.
/// The generated function returns `CacheHelperResult<R>`; key creation can
/// fail for deeply nested arguments.
///
/// ```
/// use cache_helper::{cached, call_args, Timeout};
///
/// cached! {
///     static ADD = Timeout::secs(3600);
///     fn add(a: i64, b: i64) -> i64 {
///         a + b
///     }
/// }
///
/// assert_eq!(add(1, 2).unwrap(), 3);
/// ADD.invalidate(&call_args![1, 2]).unwrap();
/// ```
#[macro_export]
macro_rules! cached {
    (
        $cache_vis:vis static $cache:ident = $timeout:expr;
        $(#[$meta:meta])*
        $vis:vis fn $name:ident($($arg:ident: $ty:ty),* $(,)?) -> $ret:ty $body:block
    ) => {
        $cache_vis static $cache: $crate::__private::Lazy<$crate::Cached> =
            $crate::__private::Lazy::new(|| {
                $crate::Cached::function(
                    $crate::FunctionId::new(module_path!(), stringify!($name)),
                    $timeout,
                )
            });

        $(#[$meta])*
        $vis fn $name($($arg: $ty),*) -> $crate::CacheHelperResult<$ret> {
            let args = $crate::CallArgs::new()$(.arg(&$arg))*;
            $cache.call(&args, move || $body)
        }
    };
}
