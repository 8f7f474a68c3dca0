//! Per-platform reconciliation of manual priority labels.

use std::collections::BTreeMap;

use tracing::{debug, info};

use super::ReconcileError;
use super::session::{Detection, EditState};
use crate::queue::PlatformQueue;
use crate::store::OverrideStore;
use crate::types::{OverrideMap, PlatformId, PriorityLabel, TrainId};

/// Labels as currently displayed, keyed by train. `None` means the cell is
/// empty or holds something other than High/Low.
pub type DisplayedLabels = BTreeMap<TrainId, Option<PriorityLabel>>;

/// Parses displayed cell text into labels. Unrecognized text becomes `None`.
pub fn displayed_labels<I, S>(cells: I) -> DisplayedLabels
where
    I: IntoIterator<Item = (TrainId, S)>,
    S: AsRef<str>,
{
    cells
        .into_iter()
        .map(|(id, text)| (id, PriorityLabel::parse(text.as_ref())))
        .collect()
}

/// Result of an apply request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// The pending snapshot was written; carries the number of trains in it.
    Committed(usize),
    /// The platform was clean; nothing was written.
    NothingPending,
}

/// Owns one pending-change slot and one render revision per platform.
///
/// The presentation layer holds this by reference across renders: it
/// builds queues with [`revisions`](Self::revisions), reports operator edits
/// through [`detect`](Self::detect), and resolves them with
/// [`apply`](Self::apply) or [`revert`](Self::revert).
#[derive(Debug, Clone, Default)]
pub struct OverrideReconciler {
    slots: BTreeMap<PlatformId, EditState<TrainId, Option<PriorityLabel>>>,
    revisions: BTreeMap<PlatformId, u64>,
}

impl OverrideReconciler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Render revision of every platform that has been reverted at least once.
    /// Platforms not listed are at revision 0.
    pub fn revisions(&self) -> &BTreeMap<PlatformId, u64> {
        &self.revisions
    }

    pub fn revision(&self, platform: &PlatformId) -> u64 {
        self.revisions.get(platform).copied().unwrap_or(0)
    }

    pub fn is_pending(&self, platform: &PlatformId) -> bool {
        self.slots.get(platform).is_some_and(EditState::is_pending)
    }

    /// The pending snapshot of a platform, if any.
    pub fn pending(&self, platform: &PlatformId) -> Option<&DisplayedLabels> {
        self.slots.get(platform).and_then(EditState::pending)
    }

    /// Platforms currently holding a pending change.
    pub fn pending_platforms(&self) -> impl Iterator<Item = &PlatformId> {
        self.slots
            .iter()
            .filter(|(_, slot)| slot.is_pending())
            .map(|(id, _)| id)
    }

    /// Compares the labels displayed for `queue` against the committed ones.
    ///
    /// Only trains in the queue are considered; other entries in `displayed`
    /// are ignored. Edits made on a render older than the platform's current
    /// revision are stale and ignored.
    pub fn detect(
        &mut self,
        queue: &PlatformQueue,
        displayed: &DisplayedLabels,
        committed: &OverrideMap,
    ) -> Detection {
        let platform = &queue.platform.id;
        if queue.revision != self.revision(platform) {
            debug!(
                platform = %platform,
                rendered = queue.revision,
                current = self.revision(platform),
                "Ignoring edits from a stale render"
            );
            return Detection::Stale;
        }

        let in_scope: DisplayedLabels = queue
            .train_ids()
            .filter_map(|id| displayed.get(id).map(|label| (id.clone(), *label)))
            .collect();

        let slot = self.slots.entry(platform.clone()).or_default();
        let detection = slot.detect(&in_scope, |id, label| committed.get(id) == *label);
        if detection != Detection::Unchanged {
            debug!(platform = %platform, ?detection, "Detected override edits");
        }
        detection
    }

    /// Writes the platform's pending labels to the committed store.
    ///
    /// The write is a single [`OverrideStore::replace_overrides`] call.
    /// Labels outside {High, Low} remove the train's entry. On failure the
    /// pending snapshot is kept and nothing is retried.
    pub fn apply<S>(
        &mut self,
        platform: &PlatformId,
        store: &mut S,
    ) -> Result<ApplyOutcome, ReconcileError>
    where
        S: OverrideStore + ?Sized,
    {
        let Some(snapshot) = self.pending(platform) else {
            return Ok(ApplyOutcome::NothingPending);
        };

        store
            .replace_overrides(snapshot)
            .map_err(ReconcileError::Persist)?;

        let count = snapshot.len();
        self.slots.remove(platform);
        info!(platform = %platform, trains = count, "Applied override changes");
        Ok(ApplyOutcome::Committed(count))
    }

    /// Discards the platform's pending labels and reloads the committed ones.
    ///
    /// Always bumps the platform's render revision, so any view rendered
    /// before the revert is treated as stale.
    pub fn revert<S>(
        &mut self,
        platform: &PlatformId,
        store: &S,
    ) -> Result<OverrideMap, ReconcileError>
    where
        S: OverrideStore + ?Sized,
    {
        let discarded = self
            .slots
            .remove(platform)
            .is_some_and(|mut slot| slot.discard());
        *self.revisions.entry(platform.clone()).or_insert(0) += 1;
        info!(
            platform = %platform,
            discarded,
            revision = self.revision(platform),
            "Reverted override changes"
        );

        store.all_overrides().map_err(ReconcileError::Reload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queue::{QueueBuilder, RoundRobin};
    use crate::store::{MemoryStore, StoreError};
    use crate::types::{Platform, Train};
    use std::io;

    fn fixture() -> (MemoryStore, Vec<Train>, Vec<Platform>) {
        let trains = vec![
            Train::new("T1", 1, 0, 0.0),
            Train::new("T2", 2, 0, 0.0),
            Train::new("T3", 3, 0, 0.0),
        ];
        let platforms = vec![Platform::new("P1", "Main", true)];
        let overrides: OverrideMap = [(TrainId::from("T3"), PriorityLabel::Low)]
            .into_iter()
            .collect();
        let store =
            MemoryStore::new(trains.clone(), platforms.clone()).with_overrides(overrides);
        (store, trains, platforms)
    }

    fn queue_for(
        reconciler: &OverrideReconciler,
        store: &MemoryStore,
        trains: &[Train],
        platforms: &[Platform],
    ) -> PlatformQueue {
        let board = QueueBuilder::new(&RoundRobin)
            .build(
                trains,
                platforms,
                &store.all_overrides().unwrap(),
                reconciler.revisions(),
            )
            .unwrap();
        board.queue(&"P1".into()).unwrap().clone()
    }

    fn p1() -> PlatformId {
        PlatformId::from("P1")
    }

    #[test]
    fn unchanged_display_stays_clean() {
        let (store, trains, platforms) = fixture();
        let mut reconciler = OverrideReconciler::new();
        let queue = queue_for(&reconciler, &store, &trains, &platforms);

        let displayed = displayed_labels([
            (TrainId::from("T1"), ""),
            (TrainId::from("T2"), ""),
            (TrainId::from("T3"), "Low"),
        ]);
        let committed = store.all_overrides().unwrap();

        assert_eq!(
            reconciler.detect(&queue, &displayed, &committed),
            Detection::Unchanged
        );
        assert!(!reconciler.is_pending(&p1()));
    }

    #[test]
    fn edit_then_apply_commits_and_cleans() {
        let (mut store, trains, platforms) = fixture();
        let mut reconciler = OverrideReconciler::new();
        let queue = queue_for(&reconciler, &store, &trains, &platforms);
        let committed = store.all_overrides().unwrap();

        let displayed = displayed_labels([
            (TrainId::from("T2"), "High"),
            (TrainId::from("T3"), "whatever"),
        ]);
        assert_eq!(
            reconciler.detect(&queue, &displayed, &committed),
            Detection::Opened
        );
        assert_eq!(reconciler.pending_platforms().count(), 1);

        let outcome = reconciler.apply(&p1(), &mut store).unwrap();

        assert_eq!(outcome, ApplyOutcome::Committed(2));
        assert!(!reconciler.is_pending(&p1()));
        let expected: OverrideMap = [(TrainId::from("T2"), PriorityLabel::High)]
            .into_iter()
            .collect();
        assert_eq!(store.all_overrides().unwrap(), expected);
    }

    #[test]
    fn apply_when_clean_writes_nothing() {
        let (mut store, _, _) = fixture();
        let before = store.all_overrides().unwrap();
        let mut reconciler = OverrideReconciler::new();

        assert_eq!(
            reconciler.apply(&p1(), &mut store).unwrap(),
            ApplyOutcome::NothingPending
        );
        assert_eq!(store.all_overrides().unwrap(), before);
    }

    #[test]
    fn applying_same_snapshot_twice_is_idempotent() {
        let (mut once, trains, platforms) = fixture();
        let mut twice = once.clone();
        let displayed = displayed_labels([
            (TrainId::from("T1"), "Low"),
            (TrainId::from("T3"), ""),
        ]);

        // Both rounds detect against the pre-edit view, so each opens and
        // applies the identical snapshot.
        let committed_before = once.all_overrides().unwrap();
        for (store, rounds) in [(&mut once, 1), (&mut twice, 2)] {
            let mut reconciler = OverrideReconciler::new();
            for _ in 0..rounds {
                let queue = queue_for(&reconciler, store, &trains, &platforms);
                assert_eq!(
                    reconciler.detect(&queue, &displayed, &committed_before),
                    Detection::Opened
                );
                reconciler.apply(&p1(), &mut *store).unwrap();
            }
        }

        assert_eq!(once.all_overrides().unwrap(), twice.all_overrides().unwrap());
    }

    #[test]
    fn revert_restores_committed_exactly_and_bumps_revision() {
        let (store, trains, platforms) = fixture();
        let before = store.all_overrides().unwrap();
        let mut reconciler = OverrideReconciler::new();
        let queue = queue_for(&reconciler, &store, &trains, &platforms);

        let displayed = displayed_labels([
            (TrainId::from("T1"), "High"),
            (TrainId::from("T3"), ""),
        ]);
        reconciler.detect(&queue, &displayed, &before);
        assert!(reconciler.is_pending(&p1()));

        let reloaded = reconciler.revert(&p1(), &store).unwrap();

        assert_eq!(reloaded, before);
        assert_eq!(store.all_overrides().unwrap(), before);
        assert!(!reconciler.is_pending(&p1()));
        assert_eq!(reconciler.revision(&p1()), 1);

        let rerendered = queue_for(&reconciler, &store, &trains, &platforms);
        assert_eq!(rerendered.revision, 1);
    }

    #[test]
    fn edits_from_pre_revert_render_are_stale() {
        let (store, trains, platforms) = fixture();
        let committed = store.all_overrides().unwrap();
        let mut reconciler = OverrideReconciler::new();
        let old_queue = queue_for(&reconciler, &store, &trains, &platforms);

        reconciler.revert(&p1(), &store).unwrap();

        let displayed = displayed_labels([(TrainId::from("T1"), "High")]);
        assert_eq!(
            reconciler.detect(&old_queue, &displayed, &committed),
            Detection::Stale
        );
        assert!(!reconciler.is_pending(&p1()));
    }

    #[test]
    fn edits_outside_the_queue_are_ignored() {
        let (store, trains, platforms) = fixture();
        let committed = store.all_overrides().unwrap();
        let mut reconciler = OverrideReconciler::new();
        let queue = queue_for(&reconciler, &store, &trains, &platforms);

        let displayed = displayed_labels([(TrainId::from("elsewhere"), "High")]);
        assert_eq!(
            reconciler.detect(&queue, &displayed, &committed),
            Detection::Unchanged
        );
    }

    #[test]
    fn second_edit_layers_into_pending() {
        let (store, trains, platforms) = fixture();
        let committed = store.all_overrides().unwrap();
        let mut reconciler = OverrideReconciler::new();
        let queue = queue_for(&reconciler, &store, &trains, &platforms);

        reconciler.detect(
            &queue,
            &displayed_labels([(TrainId::from("T1"), "High")]),
            &committed,
        );
        let second = reconciler.detect(
            &queue,
            &displayed_labels([(TrainId::from("T2"), "Low")]),
            &committed,
        );

        assert_eq!(second, Detection::Layered);
        let pending = reconciler.pending(&p1()).unwrap();
        assert_eq!(pending.get(&TrainId::from("T1")), Some(&Some(PriorityLabel::High)));
        assert_eq!(pending.get(&TrainId::from("T2")), Some(&Some(PriorityLabel::Low)));
    }

    struct FailingStore;

    impl OverrideStore for FailingStore {
        fn all_overrides(&self) -> crate::store::Result<OverrideMap> {
            Err(StoreError::Io(io::Error::other("disk unavailable")))
        }

        fn replace_overrides(
            &mut self,
            _labels: &BTreeMap<TrainId, Option<PriorityLabel>>,
        ) -> crate::store::Result<()> {
            Err(StoreError::Io(io::Error::other("disk full")))
        }
    }

    #[test]
    fn failed_apply_is_reported_and_keeps_pending() {
        let (store, trains, platforms) = fixture();
        let committed = store.all_overrides().unwrap();
        let mut reconciler = OverrideReconciler::new();
        let queue = queue_for(&reconciler, &store, &trains, &platforms);
        reconciler.detect(
            &queue,
            &displayed_labels([(TrainId::from("T1"), "High")]),
            &committed,
        );

        let err = reconciler.apply(&p1(), &mut FailingStore).unwrap_err();

        assert!(matches!(err, ReconcileError::Persist(_)));
        assert!(reconciler.is_pending(&p1()));
    }

    #[test]
    fn failed_reload_on_revert_is_reported() {
        let mut reconciler = OverrideReconciler::new();
        let err = reconciler.revert(&p1(), &FailingStore).unwrap_err();
        assert!(matches!(err, ReconcileError::Reload(_)));
        assert_eq!(reconciler.revision(&p1()), 1);
    }
}
