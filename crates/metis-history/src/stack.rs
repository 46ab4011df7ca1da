//! Checkpoint stack over [`ValueSlots`].
//!
//! A [`HistoryStack`] owns the live (current) values of a record plus every
//! snapshot taken by [`HistoryStack::push_history`]. The original is the
//! values the record was loaded with: the current values while there is no
//! history, then the bottom snapshot. Delta views are derived on demand from
//! adjacent versions, so they always see the live current.
//!
//! Operations that swap the current values return them, and the owning
//! record re-points its accessors from the return value.

use std::{iter, mem};

use metis_fields::{DeltaView, FieldDescriptor, ValueSlots};
use metis_types::DifferenceResult;
use tracing::debug;

/// Where the original values live.
#[derive(Clone, Debug)]
enum Baseline {
    /// The current values are the original.
    Current,
    /// The bottom snapshot is the original.
    Bottom,
    /// Every snapshot above the original was condensed away.
    Detached(ValueSlots),
}

/// Current values plus a stack of earlier versions.
#[derive(Clone, Debug)]
pub struct HistoryStack {
    current: ValueSlots,
    baseline: Baseline,
    snapshots: Vec<ValueSlots>,
}

impl HistoryStack {
    pub fn new(values: ValueSlots) -> Self {
        Self {
            current: values,
            baseline: Baseline::Current,
            snapshots: Vec::new(),
        }
    }

    /// Replace the current values and forget all history.
    pub fn set_values(&mut self, values: ValueSlots) -> &ValueSlots {
        self.current = values;
        self.baseline = Baseline::Current;
        self.snapshots.clear();
        &self.current
    }

    pub fn current(&self) -> &ValueSlots {
        &self.current
    }

    pub fn current_mut(&mut self) -> &mut ValueSlots {
        &mut self.current
    }

    /// The baseline that field changes are measured against.
    pub fn original(&self) -> &ValueSlots {
        match &self.baseline {
            Baseline::Current => &self.current,
            Baseline::Bottom => self.snapshots.first().unwrap_or(&self.current),
            Baseline::Detached(original) => original,
        }
    }

    pub fn version(&self) -> u32 {
        self.current.version()
    }

    /// Number of snapshots on the stack.
    pub fn depth(&self) -> usize {
        self.snapshots.len()
    }

    pub fn has_history(&self) -> bool {
        !self.snapshots.is_empty()
    }

    /// Returns `true` if the business values differ from the original.
    pub fn has_changes(&self) -> bool {
        self.current.differs(self.original()).is_different()
    }

    // ---- Checkpoints ----

    /// Snapshot the current values and continue editing a copy tagged with
    /// `version`.
    pub fn push_history(&mut self, version: u32) -> &mut ValueSlots {
        if matches!(self.baseline, Baseline::Current) {
            self.baseline = Baseline::Bottom;
        }
        let mut next = self.current.clone();
        next.set_version(version);
        let previous = mem::replace(&mut self.current, next);
        self.snapshots.push(previous);
        debug!(version, depth = self.snapshots.len(), "history pushed");
        &mut self.current
    }

    /// Drop the current values and restore the latest snapshot.
    ///
    /// Does nothing when there is no history. The original is unchanged.
    pub fn pop_history(&mut self) -> &ValueSlots {
        if let Some(previous) = self.snapshots.pop() {
            self.current = previous;
            if self.snapshots.is_empty() && matches!(self.baseline, Baseline::Bottom) {
                self.baseline = Baseline::Current;
            }
            debug!(
                version = self.current.version(),
                depth = self.snapshots.len(),
                "history popped"
            );
        }
        &self.current
    }

    /// Pop the latest checkpoint if nothing changed since it was taken.
    ///
    /// Returns `true` if the current values differ from the latest snapshot
    /// and the checkpoint was kept. A security-only difference counts as a
    /// change.
    pub fn maybe_pop_history(&mut self) -> bool {
        let Some(top) = self.snapshots.last() else {
            return false;
        };
        if self.current.differs(top).is_identical() {
            self.pop_history();
            false
        } else {
            true
        }
    }

    /// Accept the current values as the new baseline.
    pub fn clear_history(&mut self) {
        self.snapshots.clear();
        self.baseline = Baseline::Current;
        self.current.set_version(0);
        debug!("history cleared");
    }

    /// Discard every change and return to the original values.
    pub fn reset_history(&mut self) -> &ValueSlots {
        let snapshots = mem::take(&mut self.snapshots);
        match mem::replace(&mut self.baseline, Baseline::Current) {
            Baseline::Current => {}
            Baseline::Bottom => {
                if let Some(original) = snapshots.into_iter().next() {
                    self.current = original;
                }
            }
            Baseline::Detached(original) => self.current = original,
        }
        debug!(version = self.current.version(), "history reset");
        &self.current
    }

    /// Record the current values as a single change on top of `base`.
    pub fn set_history(&mut self, base: ValueSlots) {
        self.snapshots.clear();
        self.snapshots.push(base);
        self.baseline = Baseline::Bottom;
        self.current.set_version(1);
        debug!("history set from base");
    }

    /// Fold every checkpoint at or above `max_version` into the current
    /// values, which are then tagged `max_version`.
    ///
    /// Nothing happens unless the current version exceeds `max_version`.
    /// The original is kept even when every snapshot is folded.
    pub fn condense_history(&mut self, max_version: u32) {
        if self.current.version() <= max_version {
            return;
        }
        let before = self.snapshots.len();
        while self
            .snapshots
            .last()
            .is_some_and(|top| top.version() >= max_version)
        {
            if let Some(popped) = self.snapshots.pop() {
                if self.snapshots.is_empty() && matches!(self.baseline, Baseline::Bottom) {
                    self.baseline = Baseline::Detached(popped);
                }
            }
        }
        self.current.set_version(max_version);
        debug!(
            max_version,
            condensed = before - self.snapshots.len(),
            depth = self.snapshots.len(),
            "history condensed"
        );
    }

    // ---- Queries ----

    /// Difference of `field` between the current and original values.
    pub fn field_changed(&self, field: &FieldDescriptor) -> DifferenceResult {
        self.current.field_changed(field, self.original())
    }

    /// Deltas between adjacent versions, newest first.
    pub fn deltas(&self) -> impl Iterator<Item = DeltaView<'_>> {
        let newer = iter::once(&self.current).chain(self.snapshots.iter().rev());
        newer
            .zip(self.snapshots.iter().rev())
            .map(|(current, previous)| DeltaView::new(current, previous))
    }

    /// Delta of the current values against the latest snapshot.
    pub fn latest_delta(&self) -> Option<DeltaView<'_>> {
        self.deltas().next()
    }

    /// Delta `depth` steps below the newest one.
    pub fn delta_at(&self, depth: usize) -> Option<DeltaView<'_>> {
        self.deltas().nth(depth)
    }

    /// Delta of the current values against the original.
    pub fn net_delta(&self) -> DeltaView<'_> {
        DeltaView::new(&self.current, self.original())
    }
}
