//! Function identifiers, call arguments and the keys built from them.

use std::collections::BTreeMap;
use std::fmt;

use sha2::{Digest, Sha256};

use super::part::{render_scalar, Cacheable, KeyPart};
use crate::CacheHelperResult;

/// Identity of a memoized function: `module::qualified_name`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FunctionId(String);

impl FunctionId {
    /// Identifier for a function `name` defined in `module`.
    ///
    /// The [`function_id!`](crate::function_id) macro fills in the calling
    /// module.
    pub fn new(module: &str, name: &str) -> Self {
        Self(format!("{}::{}", module, name))
    }

    /// Identifier for an associated function or method of `T`.
    ///
    /// Uses [`std::any::type_name`], so the identifier (and with it every
    /// cached key) may change across compiler versions.
    pub fn method<T: ?Sized>(name: &str) -> Self {
        Self::new(std::any::type_name::<T>(), name)
    }

    /// The identifier as a string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FunctionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Arguments of a single call, reduced to their key parts.
///
/// Positional order is significant; keyword arguments are kept sorted by
/// name so the order they were supplied in never changes the key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallArgs {
    positional: Vec<KeyPart>,
    keyword: BTreeMap<String, KeyPart>,
}

impl CallArgs {
    /// Empty argument list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a positional argument.
    pub fn arg<T: Cacheable + ?Sized>(mut self, value: &T) -> Self {
        self.positional.push(value.cache_helper_key());
        self
    }

    /// Sets a keyword argument, replacing an earlier one with the same name.
    pub fn kwarg<T: Cacheable + ?Sized>(mut self, name: impl Into<String>, value: &T) -> Self {
        self.keyword.insert(name.into(), value.cache_helper_key());
        self
    }

    /// Copy of these arguments with `receiver` as the first positional one.
    pub fn with_receiver(&self, receiver: KeyPart) -> Self {
        let mut positional = Vec::with_capacity(self.positional.len() + 1);
        positional.push(receiver);
        positional.extend(self.positional.iter().cloned());
        Self {
            positional,
            keyword: self.keyword.clone(),
        }
    }

    /// Positional arguments in call order.
    pub fn positional(&self) -> &[KeyPart] {
        &self.positional
    }

    /// Keyword arguments sorted by name.
    pub fn keyword(&self) -> impl Iterator<Item = (&str, &KeyPart)> {
        self.keyword.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Total number of arguments.
    pub fn len(&self) -> usize {
        self.positional.len() + self.keyword.len()
    }

    /// Whether there are no arguments at all.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Renders `positional;keyword` with `,` between arguments.
    ///
    /// Keyword names are escaped like values, so a name can never pass for
    /// another keyword argument.
    pub fn render(&self, max_depth: usize) -> CacheHelperResult<String> {
        let positional = self
            .positional
            .iter()
            .map(|part| part.render(max_depth))
            .collect::<CacheHelperResult<Vec<_>>>()?;

        let keyword = self
            .keyword
            .iter()
            .map(|(name, part)| {
                Ok(format!(
                    "{}={}",
                    render_scalar(name),
                    part.render(max_depth)?
                ))
            })
            .collect::<CacheHelperResult<Vec<_>>>()?;

        Ok(format!("{};{}", positional.join(","), keyword.join(",")))
    }
}

/// Builds a [`CallArgs`]: positional arguments first, then keyword
/// arguments after a `;`.
///
/// ```
/// use cache_helper::call_args;
///
/// let args = call_args![0, "a"; kwarg_1 = 4, kwarg_2 = "hmm"];
/// assert_eq!(args.render(2).unwrap(), "0,a;kwarg_1=4,kwarg_2=hmm");
/// ```
#[macro_export]
macro_rules! call_args {
    ($($arg:expr),* $(,)? $(; $($name:ident = $value:expr),* $(,)?)?) => {
        $crate::CallArgs::new()
            $(.arg(&$arg))*
            $($(.kwarg(stringify!($name), &$value))*)?
    };
}

/// [`FunctionId`] for `name` in the calling module.
#[macro_export]
macro_rules! function_id {
    ($name:expr) => {
        $crate::FunctionId::new(module_path!(), $name)
    };
}

/// Unhashed key for a call: `{function_id};{positional};{keyword}`.
pub fn function_cache_key(
    function_id: &FunctionId,
    args: &CallArgs,
    max_depth: usize,
) -> CacheHelperResult<String> {
    Ok(format!("{};{}", function_id, args.render(max_depth)?))
}

/// SHA256 hex digest of a function key.
///
/// Keeps backend keys at a fixed length whatever the arguments were.
pub fn hashed_cache_key(function_key: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(function_key.as_bytes());
    hex::encode(hasher.finalize())
}

/// Both forms of the key for one call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheKey {
    /// Human-readable key, used in log output.
    pub function_key: String,

    /// Prefixed hash sent to the backend.
    pub backend_key: String,
}

impl CacheKey {
    /// Builds the key for calling `function_id` with `args`.
    pub fn build(
        function_id: &FunctionId,
        args: &CallArgs,
        key_prefix: &str,
        max_depth: usize,
    ) -> CacheHelperResult<Self> {
        let function_key = function_cache_key(function_id, args, max_depth)?;
        let backend_key = format!("{}{}", key_prefix, hashed_cache_key(&function_key));
        Ok(Self {
            function_key,
            backend_key,
        })
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.backend_key)
    }
}
