//! Per-platform queue construction and ordering.
//!
//! Each platform's assigned trains become a queue whose head is marked
//! "Arriving" and whose remainder is "Queued". The queue is then ordered by
//! effective rank, ascending:
//!
//! | entry                | effective rank   |
//! |----------------------|------------------|
//! | Arriving             | -1               |
//! | override `High`      | 0                |
//! | no override          | priority + 10, clamped to `1..=9998` |
//! | override `Low`       | 9999             |
//!
//! with delay descending as the secondary key and assignment order as the
//! final tie-break. The clamp keeps an un-overridden train strictly between
//! `High` and `Low` whatever its priority.

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;
use tracing::debug;

use super::assign::{Assignment, AssignmentError, AssignmentStrategy};
use crate::types::{OverrideMap, Platform, PlatformId, PriorityLabel, Train, TrainId};

/// Rank of the arriving (head) train.
pub const ARRIVING_RANK: i64 = -1;

/// Rank of a train overridden to `High`.
pub const HIGH_RANK: i64 = 0;

/// Offset added to the automatic priority of un-overridden trains.
pub const AUTOMATIC_RANK_OFFSET: i64 = 10;

/// Rank of a train overridden to `Low`.
pub const LOW_RANK: i64 = 9999;

/// Position of a train within its platform queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum QueueStatus {
    Arriving,
    Queued,
}

impl QueueStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            QueueStatus::Arriving => "Arriving",
            QueueStatus::Queued => "Queued",
        }
    }
}

/// Computes the sort rank of one queue entry.
///
/// The arriving marker wins over any override.
pub fn effective_rank(status: QueueStatus, label: Option<PriorityLabel>, priority: i64) -> i64 {
    match (status, label) {
        (QueueStatus::Arriving, _) => ARRIVING_RANK,
        (QueueStatus::Queued, Some(PriorityLabel::High)) => HIGH_RANK,
        (QueueStatus::Queued, Some(PriorityLabel::Low)) => LOW_RANK,
        (QueueStatus::Queued, None) => priority
            .saturating_add(AUTOMATIC_RANK_OFFSET)
            .clamp(HIGH_RANK + 1, LOW_RANK - 1),
    }
}

/// One row of a platform queue.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueueEntry {
    pub train: Train,
    pub status: QueueStatus,
    /// The committed override in effect, if any.
    pub override_label: Option<PriorityLabel>,
    pub effective_rank: i64,
}

/// The ordered queue of one platform.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlatformQueue {
    pub platform: Platform,
    /// Render revision this queue was built at. A view holding edits made
    /// against an older revision must discard them.
    pub revision: u64,
    pub entries: Vec<QueueEntry>,
}

impl PlatformQueue {
    /// The arriving train, if the queue is not empty.
    pub fn arriving(&self) -> Option<&QueueEntry> {
        self.entries
            .first()
            .filter(|e| e.status == QueueStatus::Arriving)
    }

    pub fn train_ids(&self) -> impl Iterator<Item = &TrainId> {
        self.entries.iter().map(|e| &e.train.id)
    }
}

/// All platform queues for one cycle, in platform display order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueueBoard {
    pub queues: Vec<PlatformQueue>,
    /// Overrides naming trains absent from this cycle. They are kept in the
    /// committed store but shown nowhere.
    pub orphaned_overrides: Vec<TrainId>,
}

impl QueueBoard {
    pub fn queue(&self, platform: &PlatformId) -> Option<&PlatformQueue> {
        self.queues.iter().find(|q| &q.platform.id == platform)
    }
}

/// Builds ordered platform queues using a pluggable assignment strategy.
#[derive(Clone, Copy)]
pub struct QueueBuilder<'s> {
    strategy: &'s dyn AssignmentStrategy,
}

impl<'s> QueueBuilder<'s> {
    pub fn new(strategy: &'s dyn AssignmentStrategy) -> Self {
        QueueBuilder { strategy }
    }

    /// Assigns trains to platforms, then orders each platform's queue.
    ///
    /// Fails only if the assignment strategy cannot place a train.
    pub fn build(
        &self,
        trains: &[Train],
        platforms: &[Platform],
        overrides: &OverrideMap,
        revisions: &BTreeMap<PlatformId, u64>,
    ) -> Result<QueueBoard, AssignmentError> {
        let assignment = self.strategy.assign(trains, platforms)?;
        debug!(
            strategy = self.strategy.name(),
            platforms = assignment.platform_count(),
            trains = assignment.train_count(),
            "Assigned trains to platforms"
        );
        Ok(build_from_assignment(
            &assignment,
            trains,
            platforms,
            overrides,
            revisions,
        ))
    }
}

/// Orders queues for an assignment that has already been made.
///
/// Train identifiers in the assignment that match no train are skipped.
pub fn build_from_assignment(
    assignment: &Assignment,
    trains: &[Train],
    platforms: &[Platform],
    overrides: &OverrideMap,
    revisions: &BTreeMap<PlatformId, u64>,
) -> QueueBoard {
    let mut by_id: HashMap<&TrainId, &Train> = HashMap::with_capacity(trains.len());
    for train in trains {
        by_id.entry(&train.id).or_insert(train);
    }
    let platform_by_id: HashMap<&PlatformId, &Platform> =
        platforms.iter().map(|p| (&p.id, p)).collect();

    let mut queues = Vec::with_capacity(assignment.platform_count());
    for (platform_id, assigned) in assignment.iter() {
        let Some(platform) = platform_by_id.get(platform_id) else {
            continue;
        };

        let mut entries: Vec<QueueEntry> = assigned
            .iter()
            .filter_map(|id| by_id.get(id).copied())
            .enumerate()
            .map(|(i, train)| {
                let status = if i == 0 {
                    QueueStatus::Arriving
                } else {
                    QueueStatus::Queued
                };
                let override_label = overrides.get(&train.id);
                QueueEntry {
                    train: train.clone(),
                    status,
                    override_label,
                    effective_rank: effective_rank(status, override_label, train.priority),
                }
            })
            .collect();
        order_queue(&mut entries);

        queues.push(PlatformQueue {
            platform: (*platform).clone(),
            revision: revisions.get(platform_id).copied().unwrap_or(0),
            entries,
        });
    }

    let orphaned_overrides: Vec<TrainId> = overrides
        .iter()
        .filter(|(id, _)| !by_id.contains_key(id))
        .map(|(id, _)| id.clone())
        .collect();
    if !orphaned_overrides.is_empty() {
        debug!(
            count = orphaned_overrides.len(),
            "Ignoring overrides for trains not in this cycle"
        );
    }

    QueueBoard {
        queues,
        orphaned_overrides,
    }
}

/// Sorts entries by effective rank, then delay descending. Stable.
pub fn order_queue(entries: &mut [QueueEntry]) {
    entries.sort_by(|a, b| {
        a.effective_rank
            .cmp(&b.effective_rank)
            .then_with(|| b.train.delay.cmp(&a.train.delay))
    });
}
