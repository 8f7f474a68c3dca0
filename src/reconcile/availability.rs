//! Reconciliation of platform availability edits.
//!
//! Same machine as the override reconciler, over the platform table as a
//! whole: one pending slot and one render revision.

use std::collections::BTreeMap;

use tracing::{debug, info};

use super::ReconcileError;
use super::overrides::ApplyOutcome;
use super::session::{Detection, EditState};
use crate::store::AvailabilityStore;
use crate::types::PlatformId;

/// Availability flags as displayed or committed, keyed by platform.
pub type AvailabilityMap = BTreeMap<PlatformId, bool>;

#[derive(Debug, Clone, Default)]
pub struct AvailabilityReconciler {
    slot: EditState<PlatformId, bool>,
    revision: u64,
}

impl AvailabilityReconciler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Render revision of the platform table; bumped on every revert.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn is_pending(&self) -> bool {
        self.slot.is_pending()
    }

    pub fn pending(&self) -> Option<&AvailabilityMap> {
        self.slot.pending()
    }

    /// Compares displayed flags, rendered at `rendered_revision`, with the
    /// committed ones. A platform missing from `committed` always counts as
    /// a difference.
    pub fn detect(
        &mut self,
        displayed: &AvailabilityMap,
        committed: &AvailabilityMap,
        rendered_revision: u64,
    ) -> Detection {
        if rendered_revision != self.revision {
            debug!(
                rendered = rendered_revision,
                current = self.revision,
                "Ignoring availability edits from a stale render"
            );
            return Detection::Stale;
        }

        let detection = self
            .slot
            .detect(displayed, |id, available| committed.get(id) == Some(available));
        if detection != Detection::Unchanged {
            debug!(?detection, "Detected availability edits");
        }
        detection
    }

    /// Persists the pending flags in one write. On failure the pending
    /// snapshot is kept.
    pub fn apply<S>(&mut self, store: &mut S) -> Result<ApplyOutcome, ReconcileError>
    where
        S: AvailabilityStore + ?Sized,
    {
        let Some(snapshot) = self.slot.pending() else {
            return Ok(ApplyOutcome::NothingPending);
        };

        store
            .commit_availability(snapshot)
            .map_err(ReconcileError::Persist)?;

        let count = snapshot.len();
        self.slot.discard();
        info!(platforms = count, "Applied availability changes");
        Ok(ApplyOutcome::Committed(count))
    }

    /// Discards pending flags, bumps the revision, and reloads the committed
    /// availability.
    pub fn revert<S>(&mut self, store: &S) -> Result<AvailabilityMap, ReconcileError>
    where
        S: AvailabilityStore + ?Sized,
    {
        let discarded = self.slot.discard();
        self.revision += 1;
        info!(discarded, revision = self.revision, "Reverted availability changes");

        store.availability().map_err(ReconcileError::Reload)
    }
}
