//! Operation-scoped identity contexts.
//!
//! An [`OpCtx`] maps `(registry, kind, storage key)` to the single live
//! instance materialized for that record during one logical operation.
//! Resolution goes through [`OpCtx::get_or_reserve`]: a miss hands back a
//! [`Reservation`] that must be filled with the new instance before its
//! fields are loaded, so a cyclic reference back to the same record finds
//! the in-progress instance instead of recursing.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::{Rc, Weak};

use machinemind_foundation::{EntryType, StorageKey};
use tracing::trace;

use crate::entry::AnyEntry;
use crate::registry::{Registry, ScopeId};

type SlotKey = (ScopeId, EntryType, StorageKey);

enum SlotState {
    Reserved,
    Filled(AnyEntry),
}

struct CtxInner {
    slots: RefCell<HashMap<SlotKey, SlotState>>,
    // Slot keys in the order they were filled.
    filled: RefCell<Vec<SlotKey>>,
}

/// A per-operation identity map.
///
/// Cloning yields another handle to the same context. Two contexts created
/// separately never share a live instance.
#[derive(Clone)]
pub struct OpCtx(Rc<CtxInner>);

/// Result of probing a context for a record.
pub enum Slot {
    /// The record is already materialized in this context.
    Cached(AnyEntry),
    /// The record is reserved by an outer resolution that has not yet
    /// registered its instance.
    Pending,
    /// Nothing is cached; the caller now holds the reservation.
    Vacant(Reservation),
}

/// Exclusive claim on an empty context slot.
///
/// Dropping a reservation without filling it releases the slot.
pub struct Reservation {
    ctx: OpCtx,
    key: SlotKey,
    filled: bool,
}

impl OpCtx {
    /// Creates a new empty context.
    #[must_use]
    pub fn new() -> Self {
        Self(Rc::new(CtxInner {
            slots: RefCell::new(HashMap::new()),
            filled: RefCell::new(Vec::new()),
        }))
    }

    /// Looks up a record, reserving its slot on a miss.
    pub fn get_or_reserve(&self, registry: &Registry, kind: EntryType, key: &StorageKey) -> Slot {
        let slot_key = (registry.scope(), kind, key.clone());
        let mut slots = self.0.slots.borrow_mut();
        match slots.get(&slot_key) {
            Some(SlotState::Filled(entry)) => {
                trace!(%kind, %key, registry = registry.name(), "context hit");
                Slot::Cached(entry.clone())
            }
            Some(SlotState::Reserved) => Slot::Pending,
            None => {
                trace!(%kind, %key, registry = registry.name(), "context reservation");
                slots.insert(slot_key.clone(), SlotState::Reserved);
                Slot::Vacant(Reservation {
                    ctx: self.clone(),
                    key: slot_key,
                    filled: false,
                })
            }
        }
    }

    /// Returns the cached instance for a record, if any.
    #[must_use]
    pub fn get(&self, registry: &Registry, kind: EntryType, key: &StorageKey) -> Option<AnyEntry> {
        match self.0.slots.borrow().get(&(registry.scope(), kind, key.clone())) {
            Some(SlotState::Filled(entry)) => Some(entry.clone()),
            _ => None,
        }
    }

    /// Returns the number of materialized instances.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0
            .slots
            .borrow()
            .values()
            .filter(|s| matches!(s, SlotState::Filled(_)))
            .count()
    }

    /// Returns true if nothing is materialized in this context.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns true if both handles refer to the same context.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// Forgets the slot for a record.
    pub(crate) fn evict(&self, registry: &Registry, kind: EntryType, key: &StorageKey) {
        let removed = self
            .0
            .slots
            .borrow_mut()
            .remove(&(registry.scope(), kind, key.clone()));
        // Drop the evicted entry outside the borrow.
        drop(removed);
    }

    /// Position in the fill order, for a later [`OpCtx::evict_since`].
    pub(crate) fn fill_mark(&self) -> usize {
        self.0.filled.borrow().len()
    }

    /// Forgets every slot filled after `mark`.
    pub(crate) fn evict_since(&self, mark: usize) {
        let keys: Vec<SlotKey> = {
            let mut filled = self.0.filled.borrow_mut();
            let mark = mark.min(filled.len());
            filled.drain(mark..).collect()
        };
        let removed: Vec<SlotState> = {
            let mut slots = self.0.slots.borrow_mut();
            keys.iter().filter_map(|key| slots.remove(key)).collect()
        };
        if !removed.is_empty() {
            trace!(evicted = removed.len(), "context rolled back");
        }
        drop(removed);
    }

    pub(crate) fn downgrade(&self) -> WeakCtx {
        WeakCtx(Rc::downgrade(&self.0))
    }
}

impl Default for OpCtx {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for OpCtx {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpCtx")
            .field("live", &self.len())
            .finish_non_exhaustive()
    }
}

impl Reservation {
    /// Registers the instance for the reserved slot.
    pub fn fill(mut self, entry: AnyEntry) {
        self.ctx
            .0
            .slots
            .borrow_mut()
            .insert(self.key.clone(), SlotState::Filled(entry));
        self.ctx.0.filled.borrow_mut().push(self.key.clone());
        self.filled = true;
    }
}

impl Drop for Reservation {
    fn drop(&mut self) {
        if self.filled {
            return;
        }
        if let Ok(mut slots) = self.ctx.0.slots.try_borrow_mut() {
            if matches!(slots.get(&self.key), Some(SlotState::Reserved)) {
                slots.remove(&self.key);
            }
        }
    }
}

/// Non-owning handle to a context, held by the instances it caches.
#[derive(Clone, Default)]
pub(crate) struct WeakCtx(Weak<CtxInner>);

impl WeakCtx {
    pub(crate) fn upgrade(&self) -> Option<OpCtx> {
        self.0.upgrade().map(OpCtx)
    }
}
