//! Insinuation: copying an entry and its owned subtree into another
//! registry.
//!
//! A pass runs in three phases:
//!
//! 1. **Plan.** Walk the entry, every record of its inventory (for
//!    inventoried kinds), then its `assoc_entries`. Each distinct source
//!    record is planned once and gets a fresh destination key before its
//!    children are visited, so shared children and cycles map to a single
//!    copy.
//! 2. **Commit.** Rewrite references in every planned record: references
//!    to planned sources point at their copies, all others are qualified
//!    with the registry they were resolved in. Then store every record and
//!    materialize the copies into the destination context.
//! 3. **Notify.** Call the destination registry's hook (and the per-call
//!    hook, if any) once per copy, parents first.
//!
//! If any step fails, every record stored and every context slot filled by
//! the pass is removed again before the error is returned.

use std::collections::HashMap;

use machinemind_foundation::{EntryType, Error, RawRecord, RegRef, Result, StorageKey};
use tracing::{debug, warn};

use crate::ctx::OpCtx;
use crate::entry::AnyEntry;
use crate::hooks::InsinuationHook;
use crate::registry::{Registry, ScopeId};
use crate::schema::KindSchema;

type SourceId = (ScopeId, EntryType, StorageKey);

struct PlannedCopy {
    source: AnyEntry,
    dest: Registry,
    dest_key: StorageKey,
    record: RawRecord,
}

impl PlannedCopy {
    fn kind(&self) -> EntryType {
        self.source.kind()
    }
}

pub(crate) struct InsinuationPass<'h> {
    dest: Registry,
    dest_ctx: OpCtx,
    extra_hook: Option<&'h dyn InsinuationHook>,
    plan: Vec<PlannedCopy>,
    copied: HashMap<SourceId, usize>,
}

impl<'h> InsinuationPass<'h> {
    pub(crate) fn new(
        dest: &Registry,
        ctx: Option<&OpCtx>,
        extra_hook: Option<&'h dyn InsinuationHook>,
    ) -> Self {
        Self {
            dest: dest.clone(),
            dest_ctx: ctx.cloned().unwrap_or_default(),
            extra_hook,
            plan: Vec::new(),
            copied: HashMap::new(),
        }
    }

    pub(crate) fn run(mut self, root: &AnyEntry) -> Result<AnyEntry> {
        debug!(
            kind = %root.kind(),
            key = %root.key(),
            from = root.registry().name(),
            to = self.dest.name(),
            "insinuation started"
        );
        let src_ctx = root.ctx().unwrap_or_default();
        let dest = self.dest.clone();

        let made = match self
            .plan_entry(root, &dest, &src_ctx)
            .and_then(|_| self.commit())
        {
            Ok(made) => made,
            Err(err) => {
                warn!(
                    kind = %root.kind(),
                    key = %root.key(),
                    to = self.dest.name(),
                    planned = self.plan.len(),
                    error = %err,
                    "insinuation rolled back"
                );
                self.rollback();
                return Err(err.with_frame(format!("insinuating {}:{}", root.kind(), root.key())));
            }
        };

        self.notify(&made);
        debug!(copies = made.len(), to = self.dest.name(), "insinuation finished");
        made.into_iter()
            .next()
            .ok_or_else(|| Error::internal("insinuation produced no copy"))
    }

    fn plan_entry(&mut self, entry: &AnyEntry, dest: &Registry, src_ctx: &OpCtx) -> Result<usize> {
        let id = (entry.registry().scope(), entry.kind(), entry.key().clone());
        if let Some(&idx) = self.copied.get(&id) {
            return Ok(idx);
        }

        let source_reg = entry.registry().clone();
        let kind = entry.kind();
        let stored = source_reg.get_raw(kind, entry.key()).unwrap_or_default();
        let record = entry.save().merged_over(&stored);
        let dest_key = dest.env().allocate_key();

        let idx = self.plan.len();
        self.plan.push(PlannedCopy {
            source: entry.clone(),
            dest: dest.clone(),
            dest_key: dest_key.clone(),
            record,
        });
        self.copied.insert(id, idx);

        let inventoried = source_reg
            .env()
            .schemas()
            .get(kind)
            .is_some_and(KindSchema::inventoried);
        if inventoried {
            if let Some(source_inv) = source_reg.existing_inventory(kind, entry.key()) {
                let dest_inv = dest.inventory_for(kind, &dest_key);
                for item_kind in source_inv.kinds() {
                    for item_key in source_inv.keys(item_kind) {
                        let item = source_inv.materialize(src_ctx, item_kind, &item_key)?;
                        self.plan_entry(&item, &dest_inv, src_ctx)?;
                    }
                }
            }
        }

        // Inventory items are planned first so owners that also list them
        // as children find them already bound to the destination inventory.
        for child in entry.assoc_entries() {
            self.plan_entry(&child, dest, src_ctx)?;
        }

        Ok(idx)
    }

    /// Points a reference held by `holder`'s record at its new target.
    fn redirect(&self, r: &RegRef, holder: &Registry, dest: &Registry) -> RegRef {
        let target_name = r.registry_or(holder.name());
        let target = if target_name == holder.name() {
            Some(holder.clone())
        } else {
            holder.env().registry(target_name)
        };

        if let Some(&idx) = target
            .as_ref()
            .and_then(|t| self.copied.get(&(t.scope(), r.kind, r.key.clone())))
        {
            let copy = &self.plan[idx];
            let moved = RegRef::new(r.kind, copy.dest_key.clone());
            return if copy.dest.ptr_eq(dest) {
                moved
            } else {
                moved.in_registry(copy.dest.name())
            };
        }

        let kept = RegRef::new(r.kind, r.key.clone());
        if target_name == dest.name() {
            kept
        } else {
            kept.in_registry(target_name)
        }
    }

    fn commit(&self) -> Result<Vec<AnyEntry>> {
        let records: Vec<RawRecord> = self
            .plan
            .iter()
            .map(|copy| {
                let holder = copy.source.registry();
                copy.record
                    .map_refs(|r| self.redirect(r, holder, &copy.dest))
            })
            .collect();

        for (copy, record) in self.plan.iter().zip(records) {
            copy.dest.put_raw(copy.kind(), &copy.dest_key, record);
        }

        self.plan
            .iter()
            .map(|copy| {
                copy.dest
                    .materialize(&self.dest_ctx, copy.kind(), &copy.dest_key)
            })
            .collect()
    }

    fn rollback(&self) {
        for copy in self.plan.iter().rev() {
            self.dest_ctx.evict(&copy.dest, copy.kind(), &copy.dest_key);
            copy.dest.remove_raw(copy.kind(), &copy.dest_key);
        }
    }

    fn notify(&self, made: &[AnyEntry]) {
        for (copy, dest_entry) in self.plan.iter().zip(made) {
            if let Some(hook) = copy.dest.insinuation_hook() {
                hook.post_insinuate(copy.kind(), &copy.source, dest_entry);
            }
            if let Some(hook) = self.extra_hook {
                hook.post_insinuate(copy.kind(), &copy.source, dest_entry);
            }
        }
    }
}
