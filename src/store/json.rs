//! Flat JSON file store.
//!
//! # File Layout
//!
//! ```text
//! <data_dir>/
//!   trains.json      # array of train records
//!   platforms.json   # array of platform records
//!   overrides.json   # {"schema_version": 1, "updated_at": ..., "overrides": {...}}
//! ```
//!
//! Train and platform files accept the dataset column spellings
//! (`Trip_ID`, `Platform_ID`, `Is_Available`, ...) as well as the canonical
//! field names. A missing `overrides.json` is an empty override store; a
//! missing train or platform file is a [`StoreError::MissingSource`].
//!
//! All writes go through [`write_json_atomic`], so each file is replaced in
//! a single rename.

use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use super::atomic::write_json_atomic;
use super::{
    AvailabilityStore, OverrideStore, RecordSource, Result, SourceKind, StoreError,
    normalize_platforms, normalize_trains,
};
use crate::types::{
    OverrideMap, Platform, PlatformId, PriorityLabel, RawPlatform, RawTrain, Train, TrainId,
};

/// Current overrides file schema version. Increment on breaking changes.
pub const OVERRIDES_SCHEMA_VERSION: u32 = 1;

const TRAINS_FILE: &str = "trains.json";
const PLATFORMS_FILE: &str = "platforms.json";
const OVERRIDES_FILE: &str = "overrides.json";

/// On-disk form of the committed override collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedOverrides {
    pub schema_version: u32,

    /// When the overrides were last committed.
    pub updated_at: DateTime<Utc>,

    /// Labels keyed by train identifier. Unknown labels are dropped on load.
    pub overrides: OverrideMap,
}

impl PersistedOverrides {
    pub fn new(overrides: OverrideMap) -> Self {
        PersistedOverrides {
            schema_version: OVERRIDES_SCHEMA_VERSION,
            updated_at: Utc::now(),
            overrides,
        }
    }
}

/// A store rooted at a directory of JSON files.
#[derive(Debug, Clone)]
pub struct JsonDirStore {
    dir: PathBuf,
}

impl JsonDirStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        JsonDirStore { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn trains_path(&self) -> PathBuf {
        self.dir.join(TRAINS_FILE)
    }

    pub fn platforms_path(&self) -> PathBuf {
        self.dir.join(PLATFORMS_FILE)
    }

    pub fn overrides_path(&self) -> PathBuf {
        self.dir.join(OVERRIDES_FILE)
    }

    /// Replaces the train file.
    pub fn write_trains(&self, trains: &[Train]) -> Result<()> {
        let raw: Vec<RawTrain> = trains.iter().map(RawTrain::from).collect();
        write_json_atomic(&self.trains_path(), &raw)
    }

    /// Replaces the platform file.
    pub fn write_platforms(&self, platforms: &[Platform]) -> Result<()> {
        let raw: Vec<RawPlatform> = platforms.iter().map(RawPlatform::from).collect();
        write_json_atomic(&self.platforms_path(), &raw)
    }

    /// Loads the overrides file, or `None` if it does not exist.
    pub fn try_load_overrides(&self) -> Result<Option<PersistedOverrides>> {
        let path = self.overrides_path();
        let Some(persisted) = read_json::<PersistedOverrides>(&path)? else {
            return Ok(None);
        };

        if persisted.schema_version != OVERRIDES_SCHEMA_VERSION {
            return Err(StoreError::SchemaMismatch {
                expected: OVERRIDES_SCHEMA_VERSION,
                got: persisted.schema_version,
            });
        }
        Ok(Some(persisted))
    }

    fn read_source<T: DeserializeOwned>(&self, path: PathBuf, kind: SourceKind) -> Result<T> {
        read_json(&path)?.ok_or_else(|| StoreError::MissingSource {
            kind,
            location: path.display().to_string(),
        })
    }

    fn read_raw_platforms(&self) -> Result<Vec<RawPlatform>> {
        self.read_source(self.platforms_path(), SourceKind::Platforms)
    }
}

/// Reads and parses a JSON file, returning `None` if it does not exist.
fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    let bytes = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    serde_json::from_slice(&bytes)
        .map(Some)
        .map_err(|source| StoreError::Json {
            path: path.to_path_buf(),
            source,
        })
}

impl RecordSource for JsonDirStore {
    #[instrument(skip(self), fields(dir = %self.dir.display()))]
    fn trains(&self) -> Result<Vec<Train>> {
        let raw: Vec<RawTrain> = self.read_source(self.trains_path(), SourceKind::Trains)?;
        let trains = normalize_trains(raw);
        debug!(count = trains.len(), "Loaded trains");
        Ok(trains)
    }

    #[instrument(skip(self), fields(dir = %self.dir.display()))]
    fn platforms(&self) -> Result<Vec<Platform>> {
        let platforms = normalize_platforms(self.read_raw_platforms()?);
        debug!(count = platforms.len(), "Loaded platforms");
        Ok(platforms)
    }
}

impl OverrideStore for JsonDirStore {
    fn all_overrides(&self) -> Result<OverrideMap> {
        Ok(self
            .try_load_overrides()?
            .map(|p| p.overrides)
            .unwrap_or_default())
    }

    #[instrument(skip(self, labels), fields(dir = %self.dir.display(), count = labels.len()))]
    fn replace_overrides(
        &mut self,
        labels: &BTreeMap<TrainId, Option<PriorityLabel>>,
    ) -> Result<()> {
        let mut overrides = self.all_overrides()?;
        overrides.replace_subset(labels);
        write_json_atomic(&self.overrides_path(), &PersistedOverrides::new(overrides))?;
        debug!("Committed overrides");
        Ok(())
    }
}

impl AvailabilityStore for JsonDirStore {
    fn availability(&self) -> Result<BTreeMap<PlatformId, bool>> {
        Ok(self
            .platforms()?
            .into_iter()
            .map(|p| (p.id, p.is_available))
            .collect())
    }

    #[instrument(skip(self, changes), fields(dir = %self.dir.display(), count = changes.len()))]
    fn commit_availability(&mut self, changes: &BTreeMap<PlatformId, bool>) -> Result<()> {
        let mut raw = self.read_raw_platforms()?;

        for id in changes.keys() {
            if !raw.iter().any(|p| p.id.as_deref() == Some(id.as_str())) {
                return Err(StoreError::UnknownPlatform(id.clone()));
            }
        }

        for record in &mut raw {
            if let Some(id) = &record.id
                && let Some(&available) = changes.get(&PlatformId::new(id.as_str()))
            {
                record.is_available = Some(available);
            }
        }

        write_json_atomic(&self.platforms_path(), &raw)?;
        debug!("Committed platform availability");
        Ok(())
    }
}
