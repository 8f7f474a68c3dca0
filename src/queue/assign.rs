//! Platform assignment strategies.
//!
//! Before a queue can be ordered, every train has to be placed on a
//! platform. Two placement policies exist and neither is canonical, so both
//! sit behind [`AssignmentStrategy`] and are chosen by configuration through
//! [`AssignmentPolicy`].
//!
//! - [`RoundRobin`]: trains in ascending priority, dealt cyclically across
//!   platforms in display order.
//! - [`FixedAssignment`]: each train goes to the platform matching its
//!   booked platform number; unmatched trains are reported, never dropped.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::types::{Platform, PlatformId, Train, TrainId, display_order};

/// Trains placed on each platform, in platform display order.
///
/// Every platform passed to the strategy appears exactly once, possibly
/// with an empty list.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Assignment {
    slots: Vec<(PlatformId, Vec<TrainId>)>,
}

impl Assignment {
    /// Creates an assignment with an empty slot for each platform, in display order.
    pub fn empty_for(platforms: &[Platform]) -> Self {
        Assignment {
            slots: display_order(platforms)
                .into_iter()
                .map(|p| (p.id.clone(), Vec::new()))
                .collect(),
        }
    }

    /// Returns the trains assigned to a platform, in queue order.
    pub fn get(&self, platform: &PlatformId) -> Option<&[TrainId]> {
        self.slots
            .iter()
            .find(|(id, _)| id == platform)
            .map(|(_, trains)| trains.as_slice())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&PlatformId, &[TrainId])> {
        self.slots.iter().map(|(id, trains)| (id, trains.as_slice()))
    }

    pub fn platform_count(&self) -> usize {
        self.slots.len()
    }

    /// Total number of trains placed.
    pub fn train_count(&self) -> usize {
        self.slots.iter().map(|(_, trains)| trains.len()).sum()
    }

    fn push(&mut self, slot: usize, train: TrainId) {
        self.slots[slot].1.push(train);
    }
}

/// Why a train could not be placed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnplacedReason {
    /// The booked platform number matches no known platform.
    UnknownPlatform(u32),
    /// The train carries no platform number at all.
    NoPlatformNumber,
}

/// A train the strategy failed to place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Unplaced {
    pub train: TrainId,
    pub reason: UnplacedReason,
}

impl fmt::Display for Unplaced {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.reason {
            UnplacedReason::UnknownPlatform(n) => {
                write!(f, "train {} is booked on unknown platform {}", self.train, n)
            }
            UnplacedReason::NoPlatformNumber => {
                write!(f, "train {} has no platform number", self.train)
            }
        }
    }
}

/// Raised by [`FixedAssignment`] when one or more trains cannot be placed.
///
/// Lists every unplaced train, not just the first.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{} train(s) could not be assigned: {}", .unplaced.len(), join(.unplaced))]
pub struct AssignmentError {
    pub unplaced: Vec<Unplaced>,
}

fn join(unplaced: &[Unplaced]) -> String {
    unplaced
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Places trains onto platforms ahead of queue ordering.
pub trait AssignmentStrategy: Send + Sync {
    /// Short name for logs and reports.
    fn name(&self) -> &'static str;

    /// Maps each platform to the ordered trains placed on it.
    fn assign(&self, trains: &[Train], platforms: &[Platform])
    -> Result<Assignment, AssignmentError>;
}

/// Deals trains, most urgent first, across platforms in display order.
#[derive(Debug, Clone, Copy, Default)]
pub struct RoundRobin;

impl AssignmentStrategy for RoundRobin {
    fn name(&self) -> &'static str {
        "round_robin"
    }

    fn assign(
        &self,
        trains: &[Train],
        platforms: &[Platform],
    ) -> Result<Assignment, AssignmentError> {
        let mut assignment = Assignment::empty_for(platforms);
        if assignment.platform_count() == 0 {
            if !trains.is_empty() {
                warn!(trains = trains.len(), "No platforms to deal trains onto");
            }
            return Ok(assignment);
        }

        // Priority only; delay and clearance do not matter for dealing.
        let mut ordered: Vec<&Train> = trains.iter().collect();
        ordered.sort_by_key(|t| t.priority);

        let slots = assignment.platform_count();
        for (i, train) in ordered.into_iter().enumerate() {
            assignment.push(i % slots, train.id.clone());
        }
        Ok(assignment)
    }
}

/// Places each train on the platform whose number matches its booking.
///
/// When several platforms share a number (`"2A"`, `"2B"`), the first in
/// display order receives the trains. Within a platform, trains keep their
/// input order.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedAssignment;

impl AssignmentStrategy for FixedAssignment {
    fn name(&self) -> &'static str {
        "fixed"
    }

    fn assign(
        &self,
        trains: &[Train],
        platforms: &[Platform],
    ) -> Result<Assignment, AssignmentError> {
        let mut assignment = Assignment::empty_for(platforms);

        let mut slot_by_number: HashMap<u32, usize> = HashMap::new();
        for (slot, (platform, _)) in assignment.iter().enumerate() {
            if let Some(n) = platform.number() {
                slot_by_number.entry(n).or_insert(slot);
            }
        }

        let mut unplaced = Vec::new();
        for train in trains {
            let reason = match train.platform_no {
                Some(n) => match slot_by_number.get(&n) {
                    Some(&slot) => {
                        assignment.push(slot, train.id.clone());
                        continue;
                    }
                    None => UnplacedReason::UnknownPlatform(n),
                },
                None => UnplacedReason::NoPlatformNumber,
            };
            unplaced.push(Unplaced {
                train: train.id.clone(),
                reason,
            });
        }

        if unplaced.is_empty() {
            Ok(assignment)
        } else {
            Err(AssignmentError { unplaced })
        }
    }
}

/// Configuration-level choice of assignment strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssignmentPolicy {
    #[default]
    RoundRobin,
    Fixed,
}

impl AssignmentPolicy {
    /// Returns the strategy implementing this policy.
    pub fn strategy(&self) -> &'static dyn AssignmentStrategy {
        match self {
            AssignmentPolicy::RoundRobin => &RoundRobin,
            AssignmentPolicy::Fixed => &FixedAssignment,
        }
    }
}

/// Error parsing an [`AssignmentPolicy`] from text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown assignment policy {0:?} (expected `round_robin` or `fixed`)")]
pub struct UnknownPolicy(pub String);

impl FromStr for AssignmentPolicy {
    type Err = UnknownPolicy;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "round_robin" | "roundrobin" => Ok(AssignmentPolicy::RoundRobin),
            "fixed" | "fixed_assignment" => Ok(AssignmentPolicy::Fixed),
            _ => Err(UnknownPolicy(s.to_string())),
        }
    }
}

impl fmt::Display for AssignmentPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.strategy().name())
    }
}
