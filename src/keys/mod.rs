//! Cache key construction.
//!
//! A call is reduced to `{function_id};{positional};{keyword}`, where each
//! argument contributes its [`Cacheable`] key. That string is hashed with
//! SHA256 before it reaches the backend, so keys stay short and never carry
//! raw argument values.

mod builder;
mod part;

pub use builder::{function_cache_key, hashed_cache_key, CacheKey, CallArgs, FunctionId};
pub use part::{Cacheable, KeyPart};
