//! Record store: where trains, platforms and overrides come from and go to.
//!
//! The advisor core never does I/O itself. It reads an immutable snapshot
//! through [`RecordSource`] and [`OverrideStore`], and the reconcilers write
//! committed edits back through [`OverrideStore`] and [`AvailabilityStore`].
//!
//! Two implementations are provided:
//! - [`MemoryStore`]: plain in-memory collections
//! - [`JsonDirStore`]: flat JSON files in a directory, written atomically
//!
//! # Boundary normalization
//!
//! Stores hand out well-formed records only. Missing fields are defaulted
//! (see [`RawTrain::normalize`](crate::types::RawTrain::normalize)), each
//! defaulted field is logged, and records with a duplicate identifier are
//! dropped after the first.

use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::io;
use std::path::PathBuf;

use thiserror::Error;
use tracing::warn;

use crate::types::{
    OverrideMap, Platform, PlatformId, PriorityLabel, RawPlatform, RawTrain, Train, TrainId,
};

pub mod atomic;
pub mod json;
pub mod memory;

pub use atomic::{fsync_dir, write_json_atomic};
pub use json::{JsonDirStore, OVERRIDES_SCHEMA_VERSION, PersistedOverrides};
pub use memory::MemoryStore;

/// Which upstream collection a store failed to supply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Trains,
    Platforms,
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceKind::Trains => f.write_str("trains"),
            SourceKind::Platforms => f.write_str("platforms"),
        }
    }
}

/// Errors that can occur reading from or writing to a store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A train or platform collection could not be supplied at all.
    #[error("could not find the {kind} source at {location}")]
    MissingSource { kind: SourceKind, location: String },

    /// IO error during file operations.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// A store file is not valid JSON of the expected shape.
    #[error("malformed JSON in {}: {source}", .path.display())]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },

    /// The overrides file was written by an incompatible version.
    #[error("schema version mismatch: expected {expected}, got {got}")]
    SchemaMismatch { expected: u32, got: u32 },

    /// An availability change names a platform the store does not hold.
    #[error("unknown platform: {0}")]
    UnknownPlatform(PlatformId),
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Supplies the train and platform collections for a cycle.
pub trait RecordSource {
    fn trains(&self) -> Result<Vec<Train>>;
    fn platforms(&self) -> Result<Vec<Platform>>;
}

/// The committed override collection.
///
/// `replace_overrides` is the single transactional write used when an
/// operator applies a pending change; implementations must make it visible
/// all at once or not at all.
pub trait OverrideStore {
    fn all_overrides(&self) -> Result<OverrideMap>;

    /// Sets (`Some`) or removes (`None`) the label of each named train in
    /// one write. Trains not named keep their current label.
    fn replace_overrides(&mut self, labels: &BTreeMap<TrainId, Option<PriorityLabel>>)
    -> Result<()>;

    fn get_override(&self, train: &TrainId) -> Result<Option<PriorityLabel>> {
        Ok(self.all_overrides()?.get(train))
    }

    fn set_override(&mut self, train: &TrainId, label: PriorityLabel) -> Result<()> {
        self.replace_overrides(&BTreeMap::from([(train.clone(), Some(label))]))
    }

    fn delete_override(&mut self, train: &TrainId) -> Result<()> {
        self.replace_overrides(&BTreeMap::from([(train.clone(), None)]))
    }
}

/// The committed platform availability flags.
pub trait AvailabilityStore {
    fn availability(&self) -> Result<BTreeMap<PlatformId, bool>>;

    /// Persists the given flags in one write. Fails without writing anything
    /// if a platform is unknown.
    fn commit_availability(&mut self, changes: &BTreeMap<PlatformId, bool>) -> Result<()>;
}

/// Normalizes raw train records, logging defaults and dropping duplicates.
pub fn normalize_trains(raw: Vec<RawTrain>) -> Vec<Train> {
    let mut seen = HashSet::new();
    let mut trains = Vec::with_capacity(raw.len());
    for record in raw {
        let (train, defaulted) = record.normalize();
        for field in &defaulted {
            warn!(record = %field.record, field = field.field, "Defaulted train field");
        }
        if !seen.insert(train.id.clone()) {
            warn!(train = %train.id, "Dropping duplicate train record");
            continue;
        }
        trains.push(train);
    }
    trains
}

/// Normalizes raw platform records, logging defaults and dropping duplicates.
pub fn normalize_platforms(raw: Vec<RawPlatform>) -> Vec<Platform> {
    let mut seen = HashSet::new();
    let mut platforms = Vec::with_capacity(raw.len());
    for record in raw {
        let (platform, defaulted) = record.normalize();
        for field in &defaulted {
            warn!(record = %field.record, field = field.field, "Defaulted platform field");
        }
        if !seen.insert(platform.id.clone()) {
            warn!(platform = %platform.id, "Dropping duplicate platform record");
            continue;
        }
        platforms.push(platform);
    }
    platforms
}
