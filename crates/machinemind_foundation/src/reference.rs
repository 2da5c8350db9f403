//! Storage keys and serializable entity references.

use std::borrow::Borrow;
use std::fmt;
use std::sync::Arc;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::entry_type::EntryType;

/// Internal, registry-scoped, immutable identity of a stored record.
///
/// Distinct from any semantic id a schema exposes: renaming an entity
/// never changes its storage key.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(transparent))]
pub struct StorageKey(Arc<str>);

impl StorageKey {
    /// Creates a storage key from a string.
    #[must_use]
    pub fn new(key: impl Into<Arc<str>>) -> Self {
        Self(key.into())
    }

    /// Returns the key as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for StorageKey {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for StorageKey {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for StorageKey {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl fmt::Debug for StorageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StorageKey({})", self.0)
    }
}

impl fmt::Display for StorageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A serializable pointer to an entity.
///
/// Never carries a live handle; it is resolved on demand through a registry.
/// When `registry` is `None` the reference points into the registry that
/// holds the record containing it.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RegRef {
    /// Kind of the referenced entity.
    pub kind: EntryType,
    /// Storage key of the referenced entity.
    pub key: StorageKey,
    /// Name of the registry holding the referenced entity, if not local.
    pub registry: Option<Arc<str>>,
}

impl RegRef {
    /// Creates a local reference.
    #[must_use]
    pub fn new(kind: EntryType, key: StorageKey) -> Self {
        Self {
            kind,
            key,
            registry: None,
        }
    }

    /// Returns this reference qualified with a registry name.
    #[must_use]
    pub fn in_registry(mut self, registry: impl Into<Arc<str>>) -> Self {
        self.registry = Some(registry.into());
        self
    }

    /// Returns this reference with its registry name cleared.
    #[must_use]
    pub fn local(mut self) -> Self {
        self.registry = None;
        self
    }

    /// Returns true if this reference carries no registry name.
    #[must_use]
    pub fn is_local(&self) -> bool {
        self.registry.is_none()
    }

    /// Returns the registry name this reference resolves in, given the
    /// name of the registry holding it.
    #[must_use]
    pub fn registry_or<'a>(&'a self, holder: &'a str) -> &'a str {
        self.registry.as_deref().unwrap_or(holder)
    }
}

impl fmt::Debug for RegRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RegRef({self})")
    }
}

impl fmt::Display for RegRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind, self.key)?;
        if let Some(reg) = &self.registry {
            write!(f, "@{reg}")?;
        }
        Ok(())
    }
}
