//! Newtype wrappers for record identifiers.
//!
//! These keep train, platform and line identifiers from being mixed up
//! (e.g., looking up an override with a `PlatformId`).

use serde::{Deserialize, Serialize};
use std::fmt;

/// A train identifier, unique within a ranking batch.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TrainId(pub String);

impl TrainId {
    pub fn new(s: impl Into<String>) -> Self {
        TrainId(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TrainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for TrainId {
    fn from(s: &str) -> Self {
        TrainId(s.to_string())
    }
}

impl From<String> for TrainId {
    fn from(s: String) -> Self {
        TrainId(s)
    }
}

/// A platform identifier such as `"P3"` or `"Platform 12"`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlatformId(pub String);

impl PlatformId {
    pub fn new(s: impl Into<String>) -> Self {
        PlatformId(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the first run of ASCII digits in the identifier, parsed as a number.
    ///
    /// `"P12"` gives 12, `"Platform 3A"` gives 3, and `"East"` gives `None`.
    /// A digit run too long for `u32` also gives `None`.
    pub fn number(&self) -> Option<u32> {
        let start = self.0.find(|c: char| c.is_ascii_digit())?;
        let digits = &self.0[start..];
        let end = digits
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(digits.len());
        digits[..end].parse().ok()
    }
}

impl fmt::Display for PlatformId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for PlatformId {
    fn from(s: &str) -> Self {
        PlatformId(s.to_string())
    }
}

/// A track/line identifier a platform belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LineId(pub String);

impl LineId {
    pub fn new(s: impl Into<String>) -> Self {
        LineId(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LineId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod train_id {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn serde_roundtrip(s in "[A-Za-z0-9_-]{1,20}") {
                let id = TrainId::new(&s);
                let json = serde_json::to_string(&id).unwrap();
                prop_assert_eq!(&json, &format!("\"{}\"", s));
                let parsed: TrainId = serde_json::from_str(&json).unwrap();
                prop_assert_eq!(id, parsed);
            }
        }
    }

    mod platform_id {
        use super::*;
        use proptest::prelude::*;

        #[test]
        fn number_of_plain_suffix() {
            assert_eq!(PlatformId::from("P12").number(), Some(12));
            assert_eq!(PlatformId::from("7").number(), Some(7));
        }

        #[test]
        fn number_takes_first_digit_run() {
            assert_eq!(PlatformId::from("Platform 3A").number(), Some(3));
            assert_eq!(PlatformId::from("L2-P9").number(), Some(2));
        }

        #[test]
        fn number_absent_without_digits() {
            assert_eq!(PlatformId::from("East").number(), None);
            assert_eq!(PlatformId::from("").number(), None);
        }

        #[test]
        fn number_absent_on_overflow() {
            assert_eq!(PlatformId::from("P99999999999").number(), None);
        }

        proptest! {
            #[test]
            fn number_matches_formatted_value(prefix in "[A-Za-z ]{0,8}", n: u32) {
                let id = PlatformId::new(format!("{}{}", prefix, n));
                prop_assert_eq!(id.number(), Some(n));
            }
        }
    }
}
