//! Interned names for components and code units.
//!
//! Fully-qualified names are compared and hashed on every resolution and
//! every tree walk. `Symbol` stores each distinct string once in a global
//! interner, so equality is a pointer comparison and cloning is free.

use std::borrow::Borrow;
use std::cmp::Ordering;
use std::collections::HashSet;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::Deref;
use std::sync::{LazyLock, RwLock};

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Global symbol interner
static INTERNER: LazyLock<RwLock<HashSet<&'static str>>> =
    LazyLock::new(|| RwLock::new(HashSet::new()));

/// An interned string with O(1) equality and zero-cost cloning.
///
/// All `Symbol`s with the same content share one leaked allocation, so
/// equality and hashing work on the pointer alone. Ordering still compares
/// content, which keeps sorted collections deterministic.
#[derive(Clone, Copy)]
pub struct Symbol {
    inner: &'static str,
}

impl Symbol {
    /// Intern a string, reusing the stored copy if one exists.
    pub fn new(s: impl AsRef<str>) -> Self {
        let s = s.as_ref();

        // Fast path: already interned (read lock only)
        {
            let interner = INTERNER.read().unwrap();
            if let Some(&interned) = interner.get(s) {
                return Symbol { inner: interned };
            }
        }

        // Slow path: intern under the write lock
        let mut interner = INTERNER.write().unwrap();

        // Double-check after acquiring the write lock
        if let Some(&interned) = interner.get(s) {
            return Symbol { inner: interned };
        }

        let leaked: &'static str = Box::leak(s.to_string().into_boxed_str());
        interner.insert(leaked);

        Symbol { inner: leaked }
    }

    /// Get the underlying string slice.
    #[inline]
    pub fn as_str(&self) -> &'static str {
        self.inner
    }

    /// Check if the symbol is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Get the length of the symbol.
    #[inline]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Iterate the dot-separated segments of the symbol.
    pub fn segments(&self) -> impl Iterator<Item = &'static str> {
        self.inner.split('.')
    }

    /// The final dot-separated segment (`acme.gauges.depth` -> `depth`).
    pub fn last_segment(&self) -> &'static str {
        self.inner.rsplit('.').next().unwrap_or(self.inner)
    }

    /// The symbol with its final segment removed, if more than one exists.
    pub fn parent(&self) -> Option<Symbol> {
        self.inner
            .rsplit_once('.')
            .map(|(head, _)| Symbol::new(head))
    }

    /// Append a segment (`acme.gauges` + `depth` -> `acme.gauges.depth`).
    pub fn join(&self, segment: impl AsRef<str>) -> Symbol {
        if self.inner.is_empty() {
            Symbol::new(segment)
        } else {
            Symbol::new(format!("{}.{}", self.inner, segment.as_ref()))
        }
    }

    /// Replace the final segment, keeping the enclosing namespace.
    pub fn with_last_segment(&self, segment: impl AsRef<str>) -> Symbol {
        match self.inner.rsplit_once('.') {
            Some((head, _)) => Symbol::new(format!("{}.{}", head, segment.as_ref())),
            None => Symbol::new(segment),
        }
    }
}

impl Default for Symbol {
    fn default() -> Self {
        Symbol::new("")
    }
}

impl Deref for Symbol {
    type Target = str;

    #[inline]
    fn deref(&self) -> &str {
        self.inner
    }
}

impl AsRef<str> for Symbol {
    #[inline]
    fn as_ref(&self) -> &str {
        self.inner
    }
}

impl Borrow<str> for Symbol {
    #[inline]
    fn borrow(&self) -> &str {
        self.inner
    }
}

impl PartialEq for Symbol {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        // Pointer comparison, courtesy of the interner
        std::ptr::eq(self.inner, other.inner)
    }
}

impl Eq for Symbol {}

impl PartialOrd for Symbol {
    #[inline]
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Symbol {
    #[inline]
    fn cmp(&self, other: &Self) -> Ordering {
        self.inner.cmp(other.inner)
    }
}

impl Hash for Symbol {
    #[inline]
    fn hash<H: Hasher>(&self, state: &mut H) {
        // All equal symbols share an address, so hashing it is enough
        std::ptr::hash(self.inner, state)
    }
}

impl fmt::Debug for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self.inner, f)
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self.inner, f)
    }
}

impl From<&str> for Symbol {
    fn from(s: &str) -> Self {
        Symbol::new(s)
    }
}

impl From<String> for Symbol {
    fn from(s: String) -> Self {
        Symbol::new(s)
    }
}

impl From<&String> for Symbol {
    fn from(s: &String) -> Self {
        Symbol::new(s)
    }
}

impl Serialize for Symbol {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.inner.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Symbol {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(Symbol::new(s))
    }
}
