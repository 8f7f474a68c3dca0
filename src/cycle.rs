//! One advisory cycle over an immutable snapshot of the store.
//!
//! A cycle reads trains, platforms and committed overrides once, up front,
//! and every computation in the cycle runs over those private copies. Edits
//! made while the cycle is being rendered only show up in the next one.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, instrument};

use crate::queue::{AssignmentError, AssignmentStrategy, QueueBoard, QueueBuilder};
use crate::ranking::{Recommendation, recommend};
use crate::store::{OverrideStore, RecordSource, StoreError};
use crate::types::{OverrideMap, Platform, PlatformId, Train};

/// Trains, platforms and overrides as they were at `taken_at`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CycleSnapshot {
    pub taken_at: DateTime<Utc>,
    pub trains: Vec<Train>,
    pub platforms: Vec<Platform>,
    pub overrides: OverrideMap,
}

impl CycleSnapshot {
    /// Builds a snapshot from in-memory collections.
    pub fn new(trains: Vec<Train>, platforms: Vec<Platform>, overrides: OverrideMap) -> Self {
        CycleSnapshot {
            taken_at: Utc::now(),
            trains,
            platforms,
            overrides,
        }
    }

    /// Reads a snapshot from a store.
    ///
    /// Fails with [`StoreError::MissingSource`] if trains or platforms
    /// cannot be supplied; no partial snapshot is returned.
    #[instrument(skip(store))]
    pub fn load<S>(store: &S) -> Result<Self, StoreError>
    where
        S: RecordSource + OverrideStore + ?Sized,
    {
        let trains = store.trains()?;
        let platforms = store.platforms()?;
        let overrides = store.all_overrides()?;
        info!(
            trains = trains.len(),
            platforms = platforms.len(),
            overrides = overrides.len(),
            "Took cycle snapshot"
        );
        Ok(CycleSnapshot::new(trains, platforms, overrides))
    }

    pub fn available_platforms(&self) -> usize {
        self.platforms.iter().filter(|p| p.is_available).count()
    }

    /// The top recommendations for this cycle. Overrides are not consulted.
    pub fn recommendations(&self) -> Vec<Recommendation<'_>> {
        recommend(&self.trains, &self.platforms)
    }

    /// Per-platform queues for this cycle.
    pub fn queues(
        &self,
        strategy: &dyn AssignmentStrategy,
        revisions: &BTreeMap<PlatformId, u64>,
    ) -> Result<QueueBoard, AssignmentError> {
        QueueBuilder::new(strategy).build(&self.trains, &self.platforms, &self.overrides, revisions)
    }
}
