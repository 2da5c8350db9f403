//! Live entity instances.
//!
//! A [`Live<T>`] is the materialized, mutable view of one stored record. It
//! knows its storage key, the registry holding the record, and the context
//! it was materialized into. [`AnyEntry`] is the same handle with the kind
//! erased, used where the concrete type is only known at runtime.

use std::any::Any;
use std::cell::{Ref, RefCell, RefMut};
use std::fmt;
use std::rc::Rc;

use machinemind_foundation::{EntryType, Error, RawRecord, RegRef, Result, StorageKey, Value};
use tracing::debug;

use crate::ctx::{OpCtx, WeakCtx};
use crate::hooks::InsinuationHook;
use crate::insinuate::InsinuationPass;
use crate::load::Loader;
use crate::registry::Registry;

/// A schema for one entity kind.
///
/// Implementors describe how to read their fields out of a raw record and
/// write them back. `Default` supplies the blank instance that is registered
/// in the context before `load` runs.
pub trait RegEntry: Default + 'static {
    /// The entity kind this schema describes.
    const KIND: EntryType;

    /// Name of the semantic id field, if the kind has one.
    const MMID_FIELD: Option<&'static str> = Some("id");

    /// Whether instances own a private inventory registry.
    const INVENTORIED: bool = false;

    /// Field values a newly created record starts from.
    #[must_use]
    fn defaults() -> RawRecord {
        RawRecord::new()
    }

    /// Populates this instance from its stored record.
    ///
    /// Must be idempotent, and must resolve nested references through the
    /// loader so identity is preserved transitively.
    ///
    /// # Errors
    ///
    /// Returns an error if the record is malformed or an owned reference
    /// cannot be resolved.
    fn load(&mut self, loader: &Loader<'_>) -> Result<()>;

    /// Produces the raw record for this instance's current state.
    ///
    /// Every known field should be emitted (null for cleared values) since
    /// the result is merged over the stored record.
    fn save(&self) -> RawRecord;

    /// Live entities this instance owns.
    fn assoc_entries(&self) -> Vec<AnyEntry> {
        Vec::new()
    }
}

/// Identity shared by every live instance.
pub(crate) struct EntryMeta {
    pub(crate) kind: EntryType,
    pub(crate) key: StorageKey,
    pub(crate) registry: Registry,
    pub(crate) ctx: WeakCtx,
    flags: RefCell<Value>,
}

impl EntryMeta {
    pub(crate) fn new(kind: EntryType, key: StorageKey, registry: Registry, ctx: &OpCtx) -> Self {
        Self {
            kind,
            key,
            registry,
            ctx: ctx.downgrade(),
            flags: RefCell::new(Value::Null),
        }
    }

    fn reg_ref(&self) -> RegRef {
        RegRef::new(self.kind, self.key.clone()).in_registry(self.registry.name_arc())
    }

    fn writeback(&self, saved: &RawRecord) -> Result<()> {
        let stored = self
            .registry
            .get_raw(self.kind, &self.key)
            .ok_or_else(|| Error::entry_not_found(self.kind, &self.key))?;
        let own = self.registry.name_arc();
        let saved = saved.map_refs(|r| {
            if r.registry.as_deref() == Some(&*own) {
                r.clone().local()
            } else {
                r.clone()
            }
        });
        self.registry
            .put_raw(self.kind, &self.key, saved.merged_over(&stored));
        debug!(kind = %self.kind, key = %self.key, registry = self.registry.name(), "writeback");
        Ok(())
    }

    fn destroy(&self) -> bool {
        self.registry.remove_raw(self.kind, &self.key).is_some()
    }
}

struct LiveInner<T> {
    meta: EntryMeta,
    data: RefCell<T>,
}

/// Shared handle to one materialized entry of kind `T`.
pub struct Live<T: RegEntry>(Rc<LiveInner<T>>);

impl<T: RegEntry> Clone for Live<T> {
    fn clone(&self) -> Self {
        Self(Rc::clone(&self.0))
    }
}

impl<T: RegEntry> Live<T> {
    pub(crate) fn blank(meta: EntryMeta) -> Self {
        Self(Rc::new(LiveInner {
            meta,
            data: RefCell::new(T::default()),
        }))
    }

    /// Borrows the typed fields.
    ///
    /// # Panics
    ///
    /// Panics if the fields are currently mutably borrowed.
    #[must_use]
    pub fn borrow(&self) -> Ref<'_, T> {
        self.0.data.borrow()
    }

    /// Mutably borrows the typed fields.
    ///
    /// # Panics
    ///
    /// Panics if the fields are currently borrowed.
    #[must_use]
    pub fn borrow_mut(&self) -> RefMut<'_, T> {
        self.0.data.borrow_mut()
    }

    pub(crate) fn replace(&self, data: T) {
        *self.0.data.borrow_mut() = data;
    }

    /// Returns the entity kind.
    #[must_use]
    pub fn kind(&self) -> EntryType {
        T::KIND
    }

    /// Returns the storage key.
    #[must_use]
    pub fn key(&self) -> &StorageKey {
        &self.0.meta.key
    }

    /// Returns the registry holding this entry's record.
    #[must_use]
    pub fn registry(&self) -> &Registry {
        &self.0.meta.registry
    }

    /// Returns the context this entry was materialized into, if it is
    /// still alive.
    #[must_use]
    pub fn ctx(&self) -> Option<OpCtx> {
        self.0.meta.ctx.upgrade()
    }

    /// Returns a reference to this entry, qualified with its registry name.
    #[must_use]
    pub fn reg_ref(&self) -> RegRef {
        self.0.meta.reg_ref()
    }

    /// Returns the transient, unpersisted flags attached to this instance.
    #[must_use]
    pub fn flags(&self) -> Value {
        self.0.meta.flags.borrow().clone()
    }

    /// Replaces the transient flags. Flags are never written back.
    pub fn set_flags(&self, flags: impl Into<Value>) {
        *self.0.meta.flags.borrow_mut() = flags.into();
    }

    /// Persists the current fields over the stored record.
    ///
    /// Fields in the stored record this schema does not know survive.
    ///
    /// # Errors
    ///
    /// Returns `EntryNotFound` if the record was destroyed.
    pub fn writeback(&self) -> Result<()> {
        let saved = self.borrow().save();
        self.0.meta.writeback(&saved)
    }

    /// Removes the stored record. Returns false if it was already gone.
    ///
    /// Live handles stay usable but no longer correspond to storage.
    pub fn destroy_entry(&self) -> bool {
        self.0.meta.destroy()
    }

    /// Re-resolves this entry under another context, re-reading the record.
    ///
    /// # Errors
    ///
    /// Returns an error if the record is gone or fails to load.
    pub fn refreshed(&self, ctx: &OpCtx) -> Result<Live<T>> {
        self.registry().get_cat::<T>().get_live(ctx, self.key())
    }

    /// Copies this entry and everything it owns into `dest`.
    ///
    /// The copy is materialized into `ctx`, or a fresh context if none is
    /// given.
    ///
    /// # Errors
    ///
    /// Returns an error if any copy fails to load; nothing is left behind
    /// in `dest` in that case.
    pub fn insinuate(&self, dest: &Registry, ctx: Option<&OpCtx>) -> Result<Live<T>> {
        self.to_any().insinuate(dest, ctx)?.downcast_or_err()
    }

    /// Like [`Live::insinuate`], also calling `hook` once per copied entry.
    ///
    /// # Errors
    ///
    /// Returns an error if any copy fails to load.
    pub fn insinuate_with_hooks(
        &self,
        dest: &Registry,
        ctx: Option<&OpCtx>,
        hook: &dyn InsinuationHook,
    ) -> Result<Live<T>> {
        self.to_any()
            .insinuate_with_hooks(dest, ctx, hook)?
            .downcast_or_err()
    }

    /// Returns this entry's private inventory registry, creating it on
    /// first use.
    #[must_use]
    pub fn inventory(&self) -> Registry {
        self.registry().inventory_for(T::KIND, self.key())
    }

    /// Returns a type-erased handle to this entry.
    #[must_use]
    pub fn to_any(&self) -> AnyEntry {
        let inner: Rc<dyn ErasedEntry> = self.0.clone();
        AnyEntry(inner)
    }

    /// Returns true if both handles refer to the same instance.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl<T: RegEntry> fmt::Debug for Live<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Live({})", self.reg_ref())
    }
}

pub(crate) trait ErasedEntry {
    fn meta(&self) -> &EntryMeta;
    fn save(&self) -> RawRecord;
    fn assoc_entries(&self) -> Vec<AnyEntry>;
    fn into_any(self: Rc<Self>) -> Rc<dyn Any>;
}

impl<T: RegEntry> ErasedEntry for LiveInner<T> {
    fn meta(&self) -> &EntryMeta {
        &self.meta
    }

    fn save(&self) -> RawRecord {
        self.data.borrow().save()
    }

    fn assoc_entries(&self) -> Vec<AnyEntry> {
        self.data.borrow().assoc_entries()
    }

    fn into_any(self: Rc<Self>) -> Rc<dyn Any> {
        self
    }
}

/// Type-erased handle to a live entry of any kind.
#[derive(Clone)]
pub struct AnyEntry(Rc<dyn ErasedEntry>);

impl AnyEntry {
    /// Returns the entity kind.
    #[must_use]
    pub fn kind(&self) -> EntryType {
        self.0.meta().kind
    }

    /// Returns the storage key.
    #[must_use]
    pub fn key(&self) -> &StorageKey {
        &self.0.meta().key
    }

    /// Returns the registry holding this entry's record.
    #[must_use]
    pub fn registry(&self) -> &Registry {
        &self.0.meta().registry
    }

    /// Returns the context this entry was materialized into, if alive.
    #[must_use]
    pub fn ctx(&self) -> Option<OpCtx> {
        self.0.meta().ctx.upgrade()
    }

    /// Returns a reference to this entry, qualified with its registry name.
    #[must_use]
    pub fn reg_ref(&self) -> RegRef {
        self.0.meta().reg_ref()
    }

    /// Returns the transient flags attached to this instance.
    #[must_use]
    pub fn flags(&self) -> Value {
        self.0.meta().flags.borrow().clone()
    }

    /// Produces the raw record for this entry's current state.
    #[must_use]
    pub fn save(&self) -> RawRecord {
        self.0.save()
    }

    /// Live entities this entry owns.
    #[must_use]
    pub fn assoc_entries(&self) -> Vec<AnyEntry> {
        self.0.assoc_entries()
    }

    /// Persists the current fields over the stored record.
    ///
    /// # Errors
    ///
    /// Returns `EntryNotFound` if the record was destroyed.
    pub fn writeback(&self) -> Result<()> {
        self.0.meta().writeback(&self.0.save())
    }

    /// Removes the stored record. Returns false if it was already gone.
    pub fn destroy_entry(&self) -> bool {
        self.0.meta().destroy()
    }

    /// Re-resolves this entry under another context.
    ///
    /// # Errors
    ///
    /// Returns an error if the record is gone or fails to load.
    pub fn refreshed(&self, ctx: &OpCtx) -> Result<AnyEntry> {
        self.registry().materialize(ctx, self.kind(), self.key())
    }

    /// Copies this entry and everything it owns into `dest`.
    ///
    /// # Errors
    ///
    /// Returns an error if any copy fails to load.
    pub fn insinuate(&self, dest: &Registry, ctx: Option<&OpCtx>) -> Result<AnyEntry> {
        InsinuationPass::new(dest, ctx, None).run(self)
    }

    /// Like [`AnyEntry::insinuate`], also calling `hook` once per copy.
    ///
    /// # Errors
    ///
    /// Returns an error if any copy fails to load.
    pub fn insinuate_with_hooks(
        &self,
        dest: &Registry,
        ctx: Option<&OpCtx>,
        hook: &dyn InsinuationHook,
    ) -> Result<AnyEntry> {
        InsinuationPass::new(dest, ctx, Some(hook)).run(self)
    }

    /// Recovers the typed handle, if this entry is of kind `T`.
    #[must_use]
    pub fn downcast<T: RegEntry>(&self) -> Option<Live<T>> {
        Rc::clone(&self.0)
            .into_any()
            .downcast::<LiveInner<T>>()
            .ok()
            .map(Live)
    }

    /// Recovers the typed handle, failing with `KindMismatch`.
    ///
    /// # Errors
    ///
    /// Returns `KindMismatch` if this entry is not of kind `T`.
    pub fn downcast_or_err<T: RegEntry>(&self) -> Result<Live<T>> {
        self.downcast()
            .ok_or_else(|| Error::kind_mismatch(T::KIND, self.kind()))
    }

    /// Returns true if both handles refer to the same instance.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        std::ptr::addr_eq(Rc::as_ptr(&self.0), Rc::as_ptr(&other.0))
    }
}

impl fmt::Debug for AnyEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AnyEntry({})", self.reg_ref())
    }
}

impl<T: RegEntry> From<Live<T>> for AnyEntry {
    fn from(live: Live<T>) -> Self {
        live.to_any()
    }
}
