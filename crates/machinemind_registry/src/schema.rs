//! Runtime table of entity kind schemas.
//!
//! Typed code reaches a kind through `RegCat<T>`. Operations where the kind
//! is only known at runtime (wildcard semantic id lookup, resolving an
//! untyped reference, moving inventory contents) go through the
//! [`KindSchema`] registered for that kind instead.

use std::collections::BTreeMap;
use std::fmt;

use machinemind_foundation::{EntryType, Error, ErrorKind, RawRecord, Result, StorageKey};

use crate::ctx::OpCtx;
use crate::entry::{AnyEntry, RegEntry};
use crate::registry::Registry;

type MaterializeFn = fn(&Registry, &OpCtx, &StorageKey) -> Result<AnyEntry>;

/// Type-erased operations for one entity kind.
#[derive(Clone, Copy)]
pub struct KindSchema {
    kind: EntryType,
    mmid_field: Option<&'static str>,
    inventoried: bool,
    defaults: fn() -> RawRecord,
    materialize: MaterializeFn,
}

fn materialize_erased<T: RegEntry>(
    registry: &Registry,
    ctx: &OpCtx,
    key: &StorageKey,
) -> Result<AnyEntry> {
    registry
        .get_cat::<T>()
        .get_live(ctx, key)
        .map(|live| live.to_any())
}

impl KindSchema {
    /// Builds the schema entry for `T`.
    #[must_use]
    pub fn of<T: RegEntry>() -> Self {
        Self {
            kind: T::KIND,
            mmid_field: T::MMID_FIELD,
            inventoried: T::INVENTORIED,
            defaults: T::defaults,
            materialize: materialize_erased::<T>,
        }
    }

    /// The kind described.
    #[must_use]
    pub fn kind(&self) -> EntryType {
        self.kind
    }

    /// The semantic id field, if any.
    #[must_use]
    pub fn mmid_field(&self) -> Option<&'static str> {
        self.mmid_field
    }

    /// Whether entries of this kind own an inventory.
    #[must_use]
    pub fn inventoried(&self) -> bool {
        self.inventoried
    }

    /// The kind's default record.
    #[must_use]
    pub fn defaults(&self) -> RawRecord {
        (self.defaults)()
    }

    /// Materializes the record at `key` in `registry` into `ctx`.
    ///
    /// # Errors
    ///
    /// `EntryNotFound` if absent, or the kind's load errors.
    pub fn materialize(
        &self,
        registry: &Registry,
        ctx: &OpCtx,
        key: &StorageKey,
    ) -> Result<AnyEntry> {
        (self.materialize)(registry, ctx, key)
    }
}

impl fmt::Debug for KindSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KindSchema")
            .field("kind", &self.kind)
            .field("mmid_field", &self.mmid_field)
            .field("inventoried", &self.inventoried)
            .finish_non_exhaustive()
    }
}

/// The set of kinds an environment can materialize dynamically.
#[derive(Clone, Debug, Default)]
pub struct SchemaTable {
    kinds: BTreeMap<EntryType, KindSchema>,
}

impl SchemaTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the schema for `T`.
    ///
    /// # Errors
    ///
    /// `DuplicateSchema` if the kind is already registered.
    pub fn register<T: RegEntry>(&mut self) -> Result<&mut Self> {
        if self.kinds.contains_key(&T::KIND) {
            return Err(Error::new(ErrorKind::DuplicateSchema(T::KIND)));
        }
        self.kinds.insert(T::KIND, KindSchema::of::<T>());
        Ok(self)
    }

    /// Looks up a kind's schema.
    #[must_use]
    pub fn get(&self, kind: EntryType) -> Option<&KindSchema> {
        self.kinds.get(&kind)
    }

    /// Looks up a kind's schema, failing if it is not registered.
    ///
    /// # Errors
    ///
    /// `UnregisteredKind` if absent.
    pub fn require(&self, kind: EntryType) -> Result<&KindSchema> {
        self.get(kind)
            .ok_or_else(|| Error::new(ErrorKind::UnregisteredKind(kind)))
    }

    /// Returns true if the kind is registered.
    #[must_use]
    pub fn contains(&self, kind: EntryType) -> bool {
        self.kinds.contains_key(&kind)
    }

    /// Iterates over registered schemas in kind order.
    pub fn iter(&self) -> impl Iterator<Item = &KindSchema> {
        self.kinds.values()
    }

    /// Returns the number of registered kinds.
    #[must_use]
    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    /// Returns true if nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }
}
