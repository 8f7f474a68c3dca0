//! Manual priority labels set by an operator.
//!
//! An override supersedes the automatic ranking for queue ordering only; the
//! matcher never looks at it. The only meaningful labels are `High` and
//! `Low`. Anything else an operator (or a stored file) supplies is treated as
//! "no override" and normalized away.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use super::ids::TrainId;

/// A manual priority label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PriorityLabel {
    /// Always ahead of every automatically ranked queued train.
    High,
    /// Always behind every other queued train.
    Low,
}

impl PriorityLabel {
    /// Parses a label as typed by an operator or read from storage.
    ///
    /// Matching is case-insensitive and ignores surrounding whitespace.
    /// Returns `None` for anything outside {High, Low}, including the
    /// empty string a cleared cell produces.
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("high") {
            Some(PriorityLabel::High)
        } else if s.eq_ignore_ascii_case("low") {
            Some(PriorityLabel::Low)
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PriorityLabel::High => "High",
            PriorityLabel::Low => "Low",
        }
    }
}

impl fmt::Display for PriorityLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The committed override collection: at most one label per train.
///
/// Serializes as `{"<train_id>": "High" | "Low"}`. Deserialization goes
/// through [`OverrideMap::from_raw`], so entries with any other label are
/// dropped rather than rejected.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "BTreeMap<TrainId, String>")]
pub struct OverrideMap(BTreeMap<TrainId, PriorityLabel>);

impl OverrideMap {
    pub fn new() -> Self {
        OverrideMap(BTreeMap::new())
    }

    /// Builds a map from loosely typed labels, keeping only High/Low entries.
    pub fn from_raw<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (TrainId, S)>,
        S: AsRef<str>,
    {
        OverrideMap(
            entries
                .into_iter()
                .filter_map(|(id, label)| PriorityLabel::parse(label.as_ref()).map(|l| (id, l)))
                .collect(),
        )
    }

    pub fn get(&self, train: &TrainId) -> Option<PriorityLabel> {
        self.0.get(train).copied()
    }

    /// Sets or clears the label for one train.
    pub fn set(&mut self, train: TrainId, label: Option<PriorityLabel>) {
        match label {
            Some(label) => {
                self.0.insert(train, label);
            }
            None => {
                self.0.remove(&train);
            }
        }
    }

    pub fn remove(&mut self, train: &TrainId) -> Option<PriorityLabel> {
        self.0.remove(train)
    }

    pub fn contains(&self, train: &TrainId) -> bool {
        self.0.contains_key(train)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&TrainId, PriorityLabel)> {
        self.0.iter().map(|(id, label)| (id, *label))
    }

    /// Replaces the labels of exactly the trains named in `labels`.
    ///
    /// A `None` label removes that train's entry. Trains not named are
    /// left untouched.
    pub fn replace_subset<'a, I>(&mut self, labels: I)
    where
        I: IntoIterator<Item = (&'a TrainId, &'a Option<PriorityLabel>)>,
    {
        for (train, label) in labels {
            self.set(train.clone(), *label);
        }
    }
}

impl From<BTreeMap<TrainId, String>> for OverrideMap {
    fn from(raw: BTreeMap<TrainId, String>) -> Self {
        OverrideMap::from_raw(raw)
    }
}

impl FromIterator<(TrainId, PriorityLabel)> for OverrideMap {
    fn from_iter<T: IntoIterator<Item = (TrainId, PriorityLabel)>>(iter: T) -> Self {
        OverrideMap(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::arb_override_map;
    use proptest::prelude::*;

    #[test]
    fn parse_accepts_known_labels_in_any_case() {
        assert_eq!(PriorityLabel::parse("High"), Some(PriorityLabel::High));
        assert_eq!(PriorityLabel::parse(" low "), Some(PriorityLabel::Low));
        assert_eq!(PriorityLabel::parse("HIGH"), Some(PriorityLabel::High));
    }

    #[test]
    fn parse_rejects_everything_else() {
        assert_eq!(PriorityLabel::parse(""), None);
        assert_eq!(PriorityLabel::parse("None"), None);
        assert_eq!(PriorityLabel::parse("Medium"), None);
    }

    #[test]
    fn from_raw_drops_unknown_labels() {
        let map = OverrideMap::from_raw([
            (TrainId::from("T1"), "High"),
            (TrainId::from("T2"), "Urgent"),
            (TrainId::from("T3"), "Low"),
            (TrainId::from("T4"), ""),
        ]);
        assert_eq!(map.len(), 2);
        assert_eq!(map.get(&TrainId::from("T1")), Some(PriorityLabel::High));
        assert_eq!(map.get(&TrainId::from("T3")), Some(PriorityLabel::Low));
        assert!(!map.contains(&TrainId::from("T2")));
    }

    #[test]
    fn deserialize_normalizes_labels() {
        let json = r#"{"T1": "High", "T2": "Medium", "T3": "low"}"#;
        let map: OverrideMap = serde_json::from_str(json).unwrap();
        let expected: OverrideMap = [
            (TrainId::from("T1"), PriorityLabel::High),
            (TrainId::from("T3"), PriorityLabel::Low),
        ]
        .into_iter()
        .collect();
        assert_eq!(map, expected);
    }

    #[test]
    fn replace_subset_leaves_other_trains_alone() {
        let mut map: OverrideMap = [
            (TrainId::from("A"), PriorityLabel::High),
            (TrainId::from("B"), PriorityLabel::Low),
        ]
        .into_iter()
        .collect();

        let edits = BTreeMap::from([
            (TrainId::from("A"), None),
            (TrainId::from("C"), Some(PriorityLabel::Low)),
        ]);
        map.replace_subset(&edits);

        assert_eq!(map.get(&TrainId::from("A")), None);
        assert_eq!(map.get(&TrainId::from("B")), Some(PriorityLabel::Low));
        assert_eq!(map.get(&TrainId::from("C")), Some(PriorityLabel::Low));
    }

    proptest! {
        #[test]
        fn serde_roundtrip(map in arb_override_map()) {
            let json = serde_json::to_string(&map).unwrap();
            let parsed: OverrideMap = serde_json::from_str(&json).unwrap();
            prop_assert_eq!(map, parsed);
        }
    }
}
