//! In-memory record store.

use std::collections::BTreeMap;

use super::{AvailabilityStore, OverrideStore, RecordSource, Result, SourceKind, StoreError};
use crate::types::{OverrideMap, Platform, PlatformId, PriorityLabel, Train, TrainId};

/// A store backed by plain collections.
///
/// A collection left as `None` behaves like a missing upstream source.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    trains: Option<Vec<Train>>,
    platforms: Option<Vec<Platform>>,
    overrides: OverrideMap,
}

impl MemoryStore {
    pub fn new(trains: Vec<Train>, platforms: Vec<Platform>) -> Self {
        MemoryStore {
            trains: Some(trains),
            platforms: Some(platforms),
            overrides: OverrideMap::new(),
        }
    }

    pub fn with_overrides(mut self, overrides: OverrideMap) -> Self {
        self.overrides = overrides;
        self
    }

    /// Replaces the train collection, e.g. when delays are edited upstream.
    pub fn set_trains(&mut self, trains: Vec<Train>) {
        self.trains = Some(trains);
    }
}

impl RecordSource for MemoryStore {
    fn trains(&self) -> Result<Vec<Train>> {
        self.trains.clone().ok_or(StoreError::MissingSource {
            kind: SourceKind::Trains,
            location: "memory".to_string(),
        })
    }

    fn platforms(&self) -> Result<Vec<Platform>> {
        self.platforms.clone().ok_or(StoreError::MissingSource {
            kind: SourceKind::Platforms,
            location: "memory".to_string(),
        })
    }
}

impl OverrideStore for MemoryStore {
    fn all_overrides(&self) -> Result<OverrideMap> {
        Ok(self.overrides.clone())
    }

    fn replace_overrides(
        &mut self,
        labels: &BTreeMap<TrainId, Option<PriorityLabel>>,
    ) -> Result<()> {
        self.overrides.replace_subset(labels);
        Ok(())
    }
}

impl AvailabilityStore for MemoryStore {
    fn availability(&self) -> Result<BTreeMap<PlatformId, bool>> {
        Ok(self
            .platforms()?
            .into_iter()
            .map(|p| (p.id, p.is_available))
            .collect())
    }

    fn commit_availability(&mut self, changes: &BTreeMap<PlatformId, bool>) -> Result<()> {
        let platforms = self
            .platforms
            .as_mut()
            .ok_or(StoreError::MissingSource {
                kind: SourceKind::Platforms,
                location: "memory".to_string(),
            })?;

        // Validate everything before touching anything.
        if let Some(unknown) = changes
            .keys()
            .find(|id| !platforms.iter().any(|p| &&p.id == id))
        {
            return Err(StoreError::UnknownPlatform(unknown.clone()));
        }

        for platform in platforms.iter_mut() {
            if let Some(&available) = changes.get(&platform.id) {
                platform.is_available = available;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> MemoryStore {
        MemoryStore::new(
            vec![Train::new("T1", 1, 0, 0.0)],
            vec![
                Platform::new("P1", "Main", true),
                Platform::new("P2", "Main", false),
            ],
        )
    }

    #[test]
    fn missing_collections_are_missing_sources() {
        let store = MemoryStore::default();
        assert!(matches!(
            store.trains(),
            Err(StoreError::MissingSource {
                kind: SourceKind::Trains,
                ..
            })
        ));
        assert!(matches!(
            store.platforms(),
            Err(StoreError::MissingSource {
                kind: SourceKind::Platforms,
                ..
            })
        ));
    }

    #[test]
    fn override_crud() {
        let mut store = store();
        let t1 = TrainId::from("T1");

        store.set_override(&t1, PriorityLabel::High).unwrap();
        assert_eq!(store.get_override(&t1).unwrap(), Some(PriorityLabel::High));

        store.set_override(&t1, PriorityLabel::Low).unwrap();
        assert_eq!(store.get_override(&t1).unwrap(), Some(PriorityLabel::Low));

        store.delete_override(&t1).unwrap();
        assert_eq!(store.get_override(&t1).unwrap(), None);
        assert!(store.all_overrides().unwrap().is_empty());
    }

    #[test]
    fn commit_availability_updates_flags() {
        let mut store = store();
        store
            .commit_availability(&BTreeMap::from([
                (PlatformId::from("P1"), false),
                (PlatformId::from("P2"), true),
            ]))
            .unwrap();

        let availability = store.availability().unwrap();
        assert_eq!(availability.get(&PlatformId::from("P1")), Some(&false));
        assert_eq!(availability.get(&PlatformId::from("P2")), Some(&true));
    }

    #[test]
    fn commit_availability_rejects_unknown_platform_without_writing() {
        let mut store = store();
        let err = store
            .commit_availability(&BTreeMap::from([
                (PlatformId::from("P1"), false),
                (PlatformId::from("P9"), true),
            ]))
            .unwrap_err();

        assert!(matches!(err, StoreError::UnknownPlatform(ref id) if id.as_str() == "P9"));
        assert_eq!(
            store.availability().unwrap().get(&PlatformId::from("P1")),
            Some(&true)
        );
    }
}
