//! Registries and the environment that names them.
//!
//! A [`Registry`] is one storage scope: a category store of raw records per
//! entity kind, plus the private inventory registries owned by some of its
//! entries. Registries are created through a [`RegEnv`], which supplies the
//! configuration, the storage key allocator, the kind schemas, and a name
//! index so that qualified references can cross registries.

use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::rc::{Rc, Weak};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use machinemind_foundation::{
    EntryType, Error, ErrorKind, RawRecord, RegRef, Result, StorageKey,
};
use tracing::debug;

use crate::category::{CatStore, RegCat};
use crate::config::RegistryConfig;
use crate::ctx::OpCtx;
use crate::entry::{AnyEntry, Live, RegEntry};
use crate::hooks::InsinuationHook;
use crate::keys::KeyAllocator;
use crate::schema::SchemaTable;

static NEXT_SCOPE: AtomicU64 = AtomicU64::new(1);

/// Process-unique identity of one registry, used to key context slots.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub(crate) struct ScopeId(u64);

impl ScopeId {
    fn next() -> Self {
        Self(NEXT_SCOPE.fetch_add(1, Ordering::Relaxed))
    }
}

// === Environment ===

struct EnvInner {
    config: RegistryConfig,
    keys: RefCell<KeyAllocator>,
    schemas: SchemaTable,
    registries: RefCell<HashMap<Arc<str>, Weak<RegistryInner>>>,
}

/// Shared environment for a family of registries.
#[derive(Clone)]
pub struct RegEnv(Rc<EnvInner>);

impl RegEnv {
    /// Creates an environment with the default configuration.
    #[must_use]
    pub fn new(schemas: SchemaTable) -> Self {
        Self::with_config(schemas, RegistryConfig::default())
    }

    /// Creates an environment with an explicit configuration.
    #[must_use]
    pub fn with_config(schemas: SchemaTable, config: RegistryConfig) -> Self {
        Self(Rc::new(EnvInner {
            keys: RefCell::new(KeyAllocator::new(&config)),
            config,
            schemas,
            registries: RefCell::new(HashMap::new()),
        }))
    }

    /// The environment's configuration.
    #[must_use]
    pub fn config(&self) -> &RegistryConfig {
        &self.0.config
    }

    /// The registered kind schemas.
    #[must_use]
    pub fn schemas(&self) -> &SchemaTable {
        &self.0.schemas
    }

    /// Creates a top-level registry.
    ///
    /// If `name` is taken by a live registry, a `#n` suffix is appended.
    #[must_use]
    pub fn create_registry(&self, name: &str) -> Registry {
        let name = self.unique_name(name);
        self.new_registry(name, None)
    }

    /// Finds a live registry by name.
    #[must_use]
    pub fn registry(&self, name: &str) -> Option<Registry> {
        self.0
            .registries
            .borrow()
            .get(name)
            .and_then(Weak::upgrade)
            .map(Registry)
    }

    /// Names of all live registries, sorted.
    #[must_use]
    pub fn registry_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .0
            .registries
            .borrow()
            .iter()
            .filter(|(_, reg)| reg.strong_count() > 0)
            .map(|(name, _)| name.to_string())
            .collect();
        names.sort();
        names
    }

    /// Allocates a fresh storage key.
    #[must_use]
    pub fn allocate_key(&self) -> StorageKey {
        self.0.keys.borrow_mut().allocate()
    }

    /// Records an externally supplied key as issued. Returns false if it
    /// was already known.
    pub fn mark_key_issued(&self, key: &StorageKey) -> bool {
        self.0.keys.borrow_mut().mark_issued(key)
    }

    /// Returns true if both handles refer to the same environment.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    fn unique_name(&self, base: &str) -> Arc<str> {
        if self.registry(base).is_none() {
            return Arc::from(base);
        }
        (2..)
            .map(|n| format!("{base}#{n}"))
            .find(|candidate| self.registry(candidate).is_none())
            .map_or_else(|| Arc::from(base), Arc::from)
    }

    fn new_registry(&self, name: Arc<str>, owner: Option<RegRef>) -> Registry {
        let inner = Rc::new(RegistryInner {
            name: Arc::clone(&name),
            scope: ScopeId::next(),
            env: self.clone(),
            owner,
            cats: RefCell::new(BTreeMap::new()),
            inventories: RefCell::new(BTreeMap::new()),
            hook: RefCell::new(None),
        });
        self.0
            .registries
            .borrow_mut()
            .insert(Arc::clone(&name), Rc::downgrade(&inner));
        debug!(registry = %name, "registry created");
        Registry(inner)
    }
}

impl fmt::Debug for RegEnv {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegEnv")
            .field("config", &self.0.config)
            .field("registries", &self.registry_names())
            .finish_non_exhaustive()
    }
}

// === Registry ===

pub(crate) struct RegistryInner {
    name: Arc<str>,
    scope: ScopeId,
    env: RegEnv,
    owner: Option<RegRef>,
    cats: RefCell<BTreeMap<EntryType, CatStore>>,
    inventories: RefCell<BTreeMap<(EntryType, StorageKey), Registry>>,
    hook: RefCell<Option<Rc<dyn InsinuationHook>>>,
}

impl Drop for RegistryInner {
    fn drop(&mut self) {
        if let Ok(mut index) = self.env.0.registries.try_borrow_mut() {
            if index.get(&self.name).is_some_and(|w| w.strong_count() == 0) {
                index.remove(&self.name);
            }
        }
    }
}

/// One named storage scope.
///
/// Cloning yields another handle to the same registry.
#[derive(Clone)]
pub struct Registry(Rc<RegistryInner>);

impl Registry {
    /// The registry's name, unique among live registries in its environment.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.0.name
    }

    pub(crate) fn name_arc(&self) -> Arc<str> {
        Arc::clone(&self.0.name)
    }

    pub(crate) fn scope(&self) -> ScopeId {
        self.0.scope
    }

    /// The environment this registry belongs to.
    #[must_use]
    pub fn env(&self) -> &RegEnv {
        &self.0.env
    }

    /// For an inventory registry, the entry that owns it.
    #[must_use]
    pub fn owner(&self) -> Option<&RegRef> {
        self.0.owner.as_ref()
    }

    /// Returns true if both handles refer to the same registry.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// Typed category view for kind `T`.
    #[must_use]
    pub fn get_cat<T: RegEntry>(&self) -> RegCat<T> {
        RegCat::new(self.clone())
    }

    /// Creates an entry of kind `T` from `fields`.
    ///
    /// # Errors
    ///
    /// Propagates the kind's load errors.
    pub fn create_live<T: RegEntry>(&self, ctx: &OpCtx, fields: RawRecord) -> Result<Live<T>> {
        self.get_cat::<T>().create_live(ctx, fields)
    }

    /// Creates an entry of kind `T` from its defaults.
    ///
    /// # Errors
    ///
    /// Propagates the kind's load errors.
    pub fn create_default<T: RegEntry>(&self, ctx: &OpCtx) -> Result<Live<T>> {
        self.get_cat::<T>().create_default(ctx)
    }

    // --- raw storage ---

    /// Returns the stored record, if present.
    #[must_use]
    pub fn get_raw(&self, kind: EntryType, key: &StorageKey) -> Option<RawRecord> {
        self.0
            .cats
            .borrow()
            .get(&kind)
            .and_then(|cat| cat.get(key))
            .cloned()
    }

    /// Returns true if a record is stored at `key`.
    #[must_use]
    pub fn contains(&self, kind: EntryType, key: &StorageKey) -> bool {
        self.0
            .cats
            .borrow()
            .get(&kind)
            .is_some_and(|cat| cat.contains(key))
    }

    /// Returns every record of a kind, in storage order.
    #[must_use]
    pub fn list_raw(&self, kind: EntryType) -> Vec<RawRecord> {
        self.0
            .cats
            .borrow()
            .get(&kind)
            .map(|cat| cat.iter().map(|(_, raw)| raw.clone()).collect())
            .unwrap_or_default()
    }

    /// Returns every storage key of a kind, in storage order.
    #[must_use]
    pub fn keys(&self, kind: EntryType) -> Vec<StorageKey> {
        self.0
            .cats
            .borrow()
            .get(&kind)
            .map(|cat| cat.keys().cloned().collect())
            .unwrap_or_default()
    }

    /// Returns the number of records of a kind.
    #[must_use]
    pub fn count(&self, kind: EntryType) -> usize {
        self.0.cats.borrow().get(&kind).map_or(0, CatStore::len)
    }

    /// Kinds with at least one stored record, in kind order.
    #[must_use]
    pub fn kinds(&self) -> Vec<EntryType> {
        self.0
            .cats
            .borrow()
            .iter()
            .filter(|(_, cat)| !cat.is_empty())
            .map(|(kind, _)| *kind)
            .collect()
    }

    /// Total number of records across all kinds (inventories excluded).
    #[must_use]
    pub fn total_records(&self) -> usize {
        self.0.cats.borrow().values().map(CatStore::len).sum()
    }

    /// Stores a record under a caller-supplied key, e.g. when restoring a
    /// snapshot. The key is marked issued so it is never allocated again.
    ///
    /// # Errors
    ///
    /// `DuplicateKey` if a record already exists at `key`.
    pub fn restore_raw(&self, kind: EntryType, key: StorageKey, raw: RawRecord) -> Result<()> {
        if self.contains(kind, &key) {
            return Err(Error::new(ErrorKind::DuplicateKey { kind, key }));
        }
        self.0.env.mark_key_issued(&key);
        self.put_raw(kind, &key, raw);
        Ok(())
    }

    pub(crate) fn put_raw(&self, kind: EntryType, key: &StorageKey, raw: RawRecord) {
        self.0
            .cats
            .borrow_mut()
            .entry(kind)
            .or_default()
            .put(key.clone(), raw);
    }

    /// Removes a record and drops any inventory its entry owned.
    pub(crate) fn remove_raw(&self, kind: EntryType, key: &StorageKey) -> Option<RawRecord> {
        let removed = self
            .0
            .cats
            .borrow_mut()
            .get_mut(&kind)
            .and_then(|cat| cat.remove(key));
        let inventory = self.0.inventories.borrow_mut().remove(&(kind, key.clone()));
        drop(inventory);
        if removed.is_some() {
            debug!(%kind, %key, registry = self.name(), "deleted record");
        }
        removed
    }

    pub(crate) fn keys_where(
        &self,
        kind: EntryType,
        pred: impl Fn(&RawRecord) -> bool,
    ) -> Vec<StorageKey> {
        self.0
            .cats
            .borrow()
            .get(&kind)
            .map(|cat| {
                cat.iter()
                    .filter(|(_, raw)| pred(raw))
                    .map(|(key, _)| key.clone())
                    .collect()
            })
            .unwrap_or_default()
    }

    // --- resolution ---

    fn target_of(&self, r: &RegRef) -> Result<Registry> {
        match r.registry.as_deref() {
            None => Ok(self.clone()),
            Some(name) if name == self.name() => Ok(self.clone()),
            Some(name) => self
                .env()
                .registry(name)
                .ok_or_else(|| Error::unknown_registry(name)),
        }
    }

    /// Materializes the record of a runtime-known kind.
    ///
    /// # Errors
    ///
    /// `UnregisteredKind` if no schema exists, `EntryNotFound` if the record
    /// is absent, or the kind's load errors.
    pub fn materialize(&self, ctx: &OpCtx, kind: EntryType, key: &StorageKey) -> Result<AnyEntry> {
        self.env().schemas().require(kind)?.materialize(self, ctx, key)
    }

    /// Resolves a reference held by a record in this registry.
    ///
    /// # Errors
    ///
    /// `UnknownRegistry` for an unknown qualifier, otherwise as
    /// [`Registry::materialize`].
    pub fn resolve(&self, ctx: &OpCtx, r: &RegRef) -> Result<AnyEntry> {
        self.target_of(r)?.materialize(ctx, r.kind, &r.key)
    }

    /// Resolves a reference to a typed handle.
    ///
    /// # Errors
    ///
    /// `KindMismatch` if the reference is not of kind `T`, otherwise as
    /// [`Registry::resolve`].
    pub fn resolve_typed<T: RegEntry>(&self, ctx: &OpCtx, r: &RegRef) -> Result<Live<T>> {
        if r.kind != T::KIND {
            return Err(Error::kind_mismatch(T::KIND, r.kind));
        }
        self.target_of(r)?.get_cat::<T>().get_live(ctx, &r.key)
    }

    /// Resolves each reference in order.
    ///
    /// # Errors
    ///
    /// Fails on the first reference that cannot be resolved.
    pub fn resolve_many(&self, ctx: &OpCtx, refs: &[RegRef]) -> Result<Vec<AnyEntry>> {
        refs.iter().map(|r| self.resolve(ctx, r)).collect()
    }

    /// Resolves each reference in order to a typed handle.
    ///
    /// # Errors
    ///
    /// Fails on the first reference that cannot be resolved.
    pub fn resolve_many_typed<T: RegEntry>(
        &self,
        ctx: &OpCtx,
        refs: &[RegRef],
    ) -> Result<Vec<Live<T>>> {
        refs.iter().map(|r| self.resolve_typed::<T>(ctx, r)).collect()
    }

    /// Finds the first entry of any kind whose semantic id equals `mmid`.
    ///
    /// Kinds are scanned in declaration order, records in storage order.
    ///
    /// # Errors
    ///
    /// Propagates load errors of the matching record.
    pub fn resolve_wildcard_mmid(&self, ctx: &OpCtx, mmid: &str) -> Result<Option<AnyEntry>> {
        for schema in self.env().schemas().iter() {
            let Some(field) = schema.mmid_field() else {
                continue;
            };
            let found = self.keys_where(schema.kind(), |raw| raw.str(field) == Some(mmid));
            if let Some(key) = found.first() {
                return schema.materialize(self, ctx, key).map(Some);
            }
        }
        Ok(None)
    }

    // --- inventories ---

    /// Returns the inventory owned by the entry at `(kind, key)`, creating
    /// it on first use.
    #[must_use]
    pub fn inventory_for(&self, kind: EntryType, key: &StorageKey) -> Registry {
        if let Some(inventory) = self.existing_inventory(kind, key) {
            return inventory;
        }
        let base = format!("{}/{kind}:{key}", self.name());
        let owner = RegRef::new(kind, key.clone()).in_registry(self.name_arc());
        let inventory = self.0.env.new_registry(self.0.env.unique_name(&base), Some(owner));
        self.0
            .inventories
            .borrow_mut()
            .insert((kind, key.clone()), inventory.clone());
        inventory
    }

    /// Returns the inventory owned by the entry at `(kind, key)`, if created.
    #[must_use]
    pub fn existing_inventory(&self, kind: EntryType, key: &StorageKey) -> Option<Registry> {
        self.0
            .inventories
            .borrow()
            .get(&(kind, key.clone()))
            .cloned()
    }

    /// Every inventory owned by entries of this registry, in key order.
    #[must_use]
    pub fn inventories(&self) -> Vec<(EntryType, StorageKey, Registry)> {
        self.0
            .inventories
            .borrow()
            .iter()
            .map(|((kind, key), reg)| (*kind, key.clone(), reg.clone()))
            .collect()
    }

    // --- hooks ---

    /// Installs the hook called for every entry insinuated into this
    /// registry, replacing any previous hook.
    pub fn set_insinuation_hook(&self, hook: Rc<dyn InsinuationHook>) {
        *self.0.hook.borrow_mut() = Some(hook);
    }

    /// Removes the insinuation hook.
    pub fn clear_insinuation_hook(&self) {
        self.0.hook.borrow_mut().take();
    }

    pub(crate) fn insinuation_hook(&self) -> Option<Rc<dyn InsinuationHook>> {
        self.0.hook.borrow().clone()
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("name", &self.name())
            .field("records", &self.total_records())
            .finish_non_exhaustive()
    }
}
