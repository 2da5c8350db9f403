//! Per-kind category stores.
//!
//! Each registry keeps one [`CatStore`] of raw records per entity kind, in
//! insertion order. [`RegCat<T>`] is the typed view over one of them that
//! creates, looks up, lists and deletes entries, materializing live
//! instances into a caller-supplied [`OpCtx`].

use std::marker::PhantomData;

use indexmap::IndexMap;
use machinemind_foundation::{Error, ErrorKind, RawRecord, Result, StorageKey};
use tracing::{debug, warn};

use crate::ctx::{OpCtx, Reservation, Slot};
use crate::entry::{EntryMeta, Live, RegEntry};
use crate::load::Loader;
use crate::registry::Registry;

/// Raw record storage for one kind within one registry.
#[derive(Clone, Debug, Default)]
pub(crate) struct CatStore {
    records: IndexMap<StorageKey, RawRecord>,
}

impl CatStore {
    pub(crate) fn get(&self, key: &StorageKey) -> Option<&RawRecord> {
        self.records.get(key)
    }

    pub(crate) fn contains(&self, key: &StorageKey) -> bool {
        self.records.contains_key(key)
    }

    /// Inserts or overwrites, keeping the original position on overwrite.
    pub(crate) fn put(&mut self, key: StorageKey, raw: RawRecord) {
        self.records.insert(key, raw);
    }

    /// Removes a record, preserving the order of the rest.
    pub(crate) fn remove(&mut self, key: &StorageKey) -> Option<RawRecord> {
        self.records.shift_remove(key)
    }

    pub(crate) fn len(&self) -> usize {
        self.records.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub(crate) fn keys(&self) -> impl Iterator<Item = &StorageKey> {
        self.records.keys()
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = (&StorageKey, &RawRecord)> {
        self.records.iter()
    }
}

/// Typed view of one kind's category store in a registry.
pub struct RegCat<T: RegEntry> {
    registry: Registry,
    _kind: PhantomData<fn() -> T>,
}

impl<T: RegEntry> Clone for RegCat<T> {
    fn clone(&self) -> Self {
        Self::new(self.registry.clone())
    }
}

impl<T: RegEntry> RegCat<T> {
    pub(crate) fn new(registry: Registry) -> Self {
        Self {
            registry,
            _kind: PhantomData,
        }
    }

    /// The registry this category belongs to.
    #[must_use]
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Stores a new record built from `fields` over the kind's defaults and
    /// materializes it into `ctx`.
    ///
    /// # Errors
    ///
    /// Propagates the kind's load errors; the record is removed again.
    pub fn create_live(&self, ctx: &OpCtx, fields: RawRecord) -> Result<Live<T>> {
        let key = self.registry.env().allocate_key();
        let raw = fields.merged_over(&T::defaults());
        self.registry.put_raw(T::KIND, &key, raw);
        debug!(kind = %T::KIND, %key, registry = self.registry.name(), "created record");

        match self.get_live(ctx, &key) {
            Ok(live) => Ok(live),
            Err(err) => {
                self.registry.remove_raw(T::KIND, &key);
                Err(err)
            }
        }
    }

    /// Stores a new record of pure defaults and materializes it.
    ///
    /// # Errors
    ///
    /// Propagates the kind's load errors.
    pub fn create_default(&self, ctx: &OpCtx) -> Result<Live<T>> {
        self.create_live(ctx, RawRecord::new())
    }

    /// Returns the stored record for `key`, if present.
    #[must_use]
    pub fn get_raw(&self, key: &StorageKey) -> Option<RawRecord> {
        self.registry.get_raw(T::KIND, key)
    }

    /// Returns the live instance for `key` in `ctx`, materializing it on a
    /// miss.
    ///
    /// # Errors
    ///
    /// `EntryNotFound` if no record exists, or the kind's load errors.
    pub fn get_live(&self, ctx: &OpCtx, key: &StorageKey) -> Result<Live<T>> {
        match ctx.get_or_reserve(&self.registry, T::KIND, key) {
            Slot::Cached(entry) => entry.downcast_or_err::<T>(),
            Slot::Pending => Err(Error::new(ErrorKind::UnresolvedReservation {
                kind: T::KIND,
                key: key.clone(),
            })),
            Slot::Vacant(reservation) => materialize(&self.registry, ctx, key, reservation),
        }
    }

    /// Finds the first record whose semantic id equals `mmid`.
    ///
    /// Returns `None` if the kind has no semantic id or nothing matches.
    ///
    /// # Errors
    ///
    /// Propagates the kind's load errors for the matching record.
    pub fn lookup_mmid(&self, ctx: &OpCtx, mmid: &str) -> Result<Option<Live<T>>> {
        let Some(field) = T::MMID_FIELD else {
            return Ok(None);
        };
        let warn_duplicates = self.registry.env().config().warn_duplicate_mmids;

        let mut matches = self.registry.keys_where(T::KIND, |raw| raw.str(field) == Some(mmid));
        if !warn_duplicates {
            matches.truncate(1);
        }
        if matches.len() > 1 {
            warn!(
                kind = %T::KIND,
                mmid,
                count = matches.len(),
                registry = self.registry.name(),
                "duplicate semantic id, using first"
            );
        }
        match matches.first() {
            Some(key) => self.get_live(ctx, key).map(Some),
            None => Ok(None),
        }
    }

    /// Returns every stored record, in storage order.
    #[must_use]
    pub fn list_raw(&self) -> Vec<RawRecord> {
        self.registry.list_raw(T::KIND)
    }

    /// Returns every storage key, in storage order.
    #[must_use]
    pub fn list_keys(&self) -> Vec<StorageKey> {
        self.registry.keys(T::KIND)
    }

    /// Materializes every stored record into `ctx`, in storage order.
    ///
    /// # Errors
    ///
    /// Stops at the first record that fails to load.
    pub fn list_live(&self, ctx: &OpCtx) -> Result<Vec<Live<T>>> {
        self.list_keys()
            .iter()
            .map(|key| self.get_live(ctx, key))
            .collect()
    }

    /// Removes the record for `key`, returning it.
    ///
    /// Live instances already materialized are left orphaned.
    pub fn delete(&self, key: &StorageKey) -> Option<RawRecord> {
        self.registry.remove_raw(T::KIND, key)
    }

    /// Returns the number of stored records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.registry.count(T::KIND)
    }

    /// Returns true if no records are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Builds, registers and loads the instance for a reserved slot.
///
/// The blank instance is registered before `load` runs so that cyclic
/// references back to this record resolve to it. If `load` fails, every
/// slot filled since then is evicted along with it, so no cached entry
/// keeps pointing at the abandoned instance.
pub(crate) fn materialize<T: RegEntry>(
    registry: &Registry,
    ctx: &OpCtx,
    key: &StorageKey,
    reservation: Reservation,
) -> Result<Live<T>> {
    let stored = registry
        .get_raw(T::KIND, key)
        .ok_or_else(|| Error::entry_not_found(T::KIND, key))?;
    let raw = stored.merged_over(&T::defaults());

    let mark = ctx.fill_mark();
    let live = Live::<T>::blank(EntryMeta::new(T::KIND, key.clone(), registry.clone(), ctx));
    reservation.fill(live.to_any());

    let loader = Loader::new(registry, ctx, T::KIND, key, &raw);
    let mut fields = T::default();
    match fields.load(&loader) {
        Ok(()) => {
            live.replace(fields);
            Ok(live)
        }
        Err(err) => {
            ctx.evict_since(mark);
            Err(err.with_frame(format!("{}:{key}", T::KIND)))
        }
    }
}
