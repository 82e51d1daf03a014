//! Structural keys for individual call arguments.

use std::borrow::Cow;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};
use std::fmt::Display;
use std::hash::BuildHasher;
use std::rc::Rc;
use std::sync::Arc;

use crate::{CacheHelperError, CacheHelperResult};

/// Characters that separate arguments inside a function key.
const RESERVED: [char; 10] = ['\\', ',', ';', ':', '=', '[', ']', '{', '}', '\''];

/// Rendering of an empty scalar, so it never vanishes from the key.
const EMPTY: &str = "''";

/// Key of a single argument, before it is flattened into a string.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum KeyPart {
    /// A scalar rendered verbatim (escaped).
    Value(String),

    /// An ordered collection.
    Seq(Vec<KeyPart>),

    /// An unordered collection; elements are sorted when rendered.
    Set(Vec<KeyPart>),

    /// Key/value pairs; entries are sorted when rendered.
    Map(Vec<(KeyPart, KeyPart)>),
}

impl KeyPart {
    /// Key from the `Display` representation of a value.
    pub fn display<T: Display + ?Sized>(value: &T) -> Self {
        Self::Value(value.to_string())
    }

    /// Flattens the part into a string.
    ///
    /// Empty scalars render as `''` and an empty map as `{:}`, so an empty
    /// value never renders like a missing one.
    ///
    /// Collections may nest at most `max_depth` levels; a top-level argument
    /// sits at depth zero, so `max_depth == 0` rejects every collection.
    pub fn render(&self, max_depth: usize) -> CacheHelperResult<String> {
        self.render_at(0, max_depth)
    }

    fn render_at(&self, depth: usize, max_depth: usize) -> CacheHelperResult<String> {
        match self {
            KeyPart::Value(raw) => Ok(render_scalar(raw).into_owned()),
            KeyPart::Seq(items) => {
                let inner = Self::render_all(items, Self::enter(depth, max_depth)?, max_depth)?;
                Ok(format!("[{}]", inner.join(",")))
            }
            KeyPart::Set(items) => {
                let mut inner = Self::render_all(items, Self::enter(depth, max_depth)?, max_depth)?;
                inner.sort();
                Ok(format!("{{{}}}", inner.join(",")))
            }
            KeyPart::Map(entries) => {
                let next = Self::enter(depth, max_depth)?;
                let mut inner = entries
                    .iter()
                    .map(|(k, v)| {
                        Ok(format!(
                            "{}:{}",
                            k.render_at(next, max_depth)?,
                            v.render_at(next, max_depth)?
                        ))
                    })
                    .collect::<CacheHelperResult<Vec<_>>>()?;
                if inner.is_empty() {
                    // Keeps an empty map apart from an empty set.
                    return Ok("{:}".to_string());
                }
                inner.sort();
                Ok(format!("{{{}}}", inner.join(",")))
            }
        }
    }

    fn render_all(
        items: &[KeyPart],
        depth: usize,
        max_depth: usize,
    ) -> CacheHelperResult<Vec<String>> {
        items
            .iter()
            .map(|item| item.render_at(depth, max_depth))
            .collect()
    }

    fn enter(depth: usize, max_depth: usize) -> CacheHelperResult<usize> {
        let next = depth + 1;
        if next > max_depth {
            return Err(CacheHelperError::key_creation(format!(
                "arguments nest deeper than the maximum depth of {}",
                max_depth
            )));
        }
        Ok(next)
    }
}

impl From<String> for KeyPart {
    fn from(value: String) -> Self {
        Self::Value(value)
    }
}

impl From<&str> for KeyPart {
    fn from(value: &str) -> Self {
        Self::Value(value.to_string())
    }
}

/// Escapes a scalar for use inside a function key. Empty scalars render as
/// `''`.
pub(crate) fn render_scalar(raw: &str) -> Cow<'_, str> {
    if raw.is_empty() {
        return Cow::Borrowed(EMPTY);
    }
    escape(raw)
}

fn escape(raw: &str) -> Cow<'_, str> {
    if !raw.contains(|c: char| RESERVED.contains(&c)) {
        return Cow::Borrowed(raw);
    }

    let mut escaped = String::with_capacity(raw.len() + 8);
    for c in raw.chars() {
        if RESERVED.contains(&c) {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    Cow::Owned(escaped)
}

/// A value that can take part in a cache key.
///
/// Two values that the application treats as equal must return the same key
/// part, and values that must not share cached results must return different
/// ones. For instance methods this is what separates one receiver from
/// another.
pub trait Cacheable {
    /// Key contributed by this value.
    fn cache_helper_key(&self) -> KeyPart;
}

macro_rules! cacheable_via_display {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Cacheable for $ty {
                fn cache_helper_key(&self) -> KeyPart {
                    KeyPart::display(self)
                }
            }
        )*
    };
}

cacheable_via_display!(
    i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64, bool, char, str,
    String,
);

impl Cacheable for KeyPart {
    fn cache_helper_key(&self) -> KeyPart {
        self.clone()
    }
}

impl Cacheable for () {
    fn cache_helper_key(&self) -> KeyPart {
        KeyPart::from("()")
    }
}

impl<T: Cacheable + ?Sized> Cacheable for &T {
    fn cache_helper_key(&self) -> KeyPart {
        (**self).cache_helper_key()
    }
}

impl<T: Cacheable + ?Sized> Cacheable for Box<T> {
    fn cache_helper_key(&self) -> KeyPart {
        (**self).cache_helper_key()
    }
}

impl<T: Cacheable + ?Sized> Cacheable for Arc<T> {
    fn cache_helper_key(&self) -> KeyPart {
        (**self).cache_helper_key()
    }
}

impl<T: Cacheable + ?Sized> Cacheable for Rc<T> {
    fn cache_helper_key(&self) -> KeyPart {
        (**self).cache_helper_key()
    }
}

impl<T: Cacheable> Cacheable for Option<T> {
    fn cache_helper_key(&self) -> KeyPart {
        match self {
            Some(value) => value.cache_helper_key(),
            None => KeyPart::from("None"),
        }
    }
}

impl<T: Cacheable> Cacheable for [T] {
    fn cache_helper_key(&self) -> KeyPart {
        KeyPart::Seq(self.iter().map(Cacheable::cache_helper_key).collect())
    }
}

impl<T: Cacheable, const N: usize> Cacheable for [T; N] {
    fn cache_helper_key(&self) -> KeyPart {
        self.as_slice().cache_helper_key()
    }
}

impl<T: Cacheable> Cacheable for Vec<T> {
    fn cache_helper_key(&self) -> KeyPart {
        self.as_slice().cache_helper_key()
    }
}

impl<T: Cacheable> Cacheable for VecDeque<T> {
    fn cache_helper_key(&self) -> KeyPart {
        KeyPart::Seq(self.iter().map(Cacheable::cache_helper_key).collect())
    }
}

impl<A: Cacheable, B: Cacheable> Cacheable for (A, B) {
    fn cache_helper_key(&self) -> KeyPart {
        KeyPart::Seq(vec![self.0.cache_helper_key(), self.1.cache_helper_key()])
    }
}

impl<A: Cacheable, B: Cacheable, C: Cacheable> Cacheable for (A, B, C) {
    fn cache_helper_key(&self) -> KeyPart {
        KeyPart::Seq(vec![
            self.0.cache_helper_key(),
            self.1.cache_helper_key(),
            self.2.cache_helper_key(),
        ])
    }
}

impl<K: Cacheable, V: Cacheable, S: BuildHasher> Cacheable for HashMap<K, V, S> {
    fn cache_helper_key(&self) -> KeyPart {
        KeyPart::Map(
            self.iter()
                .map(|(k, v)| (k.cache_helper_key(), v.cache_helper_key()))
                .collect(),
        )
    }
}

impl<K: Cacheable, V: Cacheable> Cacheable for BTreeMap<K, V> {
    fn cache_helper_key(&self) -> KeyPart {
        KeyPart::Map(
            self.iter()
                .map(|(k, v)| (k.cache_helper_key(), v.cache_helper_key()))
                .collect(),
        )
    }
}

impl<T: Cacheable, S: BuildHasher> Cacheable for HashSet<T, S> {
    fn cache_helper_key(&self) -> KeyPart {
        KeyPart::Set(self.iter().map(Cacheable::cache_helper_key).collect())
    }
}

impl<T: Cacheable> Cacheable for BTreeSet<T> {
    fn cache_helper_key(&self) -> KeyPart {
        KeyPart::Set(self.iter().map(Cacheable::cache_helper_key).collect())
    }
}
