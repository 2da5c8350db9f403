//! Observers of insinuation.
//!
//! A hook installed on a registry is called once for every entry copied
//! into it, after the whole copy has been committed.

use std::cell::RefCell;

use machinemind_foundation::{EntryType, RegRef};

use crate::entry::AnyEntry;

/// Called after each entry is copied by insinuation.
pub trait InsinuationHook {
    /// Observes one copy. `source` is the original, `dest` the new instance.
    fn post_insinuate(&self, kind: EntryType, source: &AnyEntry, dest: &AnyEntry);
}

impl<F> InsinuationHook for F
where
    F: Fn(EntryType, &AnyEntry, &AnyEntry),
{
    fn post_insinuate(&self, kind: EntryType, source: &AnyEntry, dest: &AnyEntry) {
        self(kind, source, dest);
    }
}

/// One observed copy.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InsinuationRecord {
    /// Kind of the copied entry.
    pub kind: EntryType,
    /// Reference to the original.
    pub source: RegRef,
    /// Reference to the copy.
    pub dest: RegRef,
}

/// A hook that records every copy it observes.
#[derive(Debug, Default)]
pub struct InsinuationLog {
    records: RefCell<Vec<InsinuationRecord>>,
}

impl InsinuationLog {
    /// Creates an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the recorded copies in call order.
    #[must_use]
    pub fn records(&self) -> Vec<InsinuationRecord> {
        self.records.borrow().clone()
    }

    /// Returns the number of recorded copies.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.borrow().len()
    }

    /// Returns true if nothing was recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.borrow().is_empty()
    }
}

impl InsinuationHook for InsinuationLog {
    fn post_insinuate(&self, kind: EntryType, source: &AnyEntry, dest: &AnyEntry) {
        self.records.borrow_mut().push(InsinuationRecord {
            kind,
            source: source.reg_ref(),
            dest: dest.reg_ref(),
        });
    }
}
