//! Train records and their boundary normalization.
//!
//! Records arrive from the store as [`RawTrain`], where every field is
//! optional and the dataset column spellings (`Trip_ID`, `Train_Name`, ...)
//! are accepted. [`RawTrain::normalize`] turns one into a well-formed
//! [`Train`], defaulting whatever is missing. Past this boundary nothing
//! in the ranking or queueing code has to deal with absent fields.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::TrainId;
use super::lenient;

/// A waiting train.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Train {
    pub id: TrainId,

    /// Display name; falls back to the identifier when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Dispatch priority. Lower is more urgent. Any `i64` is accepted; queue
    /// ranks clamp it (see [`effective_rank`](crate::queue::effective_rank)).
    pub priority: i64,

    /// Accumulated delay in seconds.
    pub delay: u64,

    /// Time needed to clear the platform once dispatched. Never negative.
    pub clearance_time: f64,

    /// Platform number this train is booked on, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platform_no: Option<u32>,
}

impl Train {
    /// Creates a train with no name and no booked platform.
    pub fn new(id: impl Into<TrainId>, priority: i64, delay: u64, clearance_time: f64) -> Self {
        Train {
            id: id.into(),
            name: None,
            priority,
            delay,
            clearance_time,
            platform_no: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_platform_no(mut self, platform_no: u32) -> Self {
        self.platform_no = Some(platform_no);
        self
    }

    /// The name to show an operator.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(self.id.as_str())
    }
}

/// A field that was missing or unusable and has been defaulted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MalformedField {
    /// Identifier of the record (may be empty if the identifier itself was missing).
    pub record: String,
    pub field: &'static str,
}

impl fmt::Display for MalformedField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "record {:?} has a missing or malformed `{}`; defaulted",
            self.record, self.field
        )
    }
}

/// A train record as stored, before defaults are applied.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawTrain {
    #[serde(
        default,
        alias = "Trip_ID",
        alias = "train_id",
        deserialize_with = "lenient::text"
    )]
    pub id: Option<String>,

    #[serde(default, alias = "Train_Name", deserialize_with = "lenient::text")]
    pub name: Option<String>,

    #[serde(default, deserialize_with = "lenient::integer")]
    pub priority: Option<i64>,

    #[serde(default, deserialize_with = "lenient::integer")]
    pub delay: Option<i64>,

    #[serde(default, deserialize_with = "lenient::number")]
    pub clearance_time: Option<f64>,

    #[serde(
        default,
        alias = "Platform_No",
        deserialize_with = "lenient::platform_number"
    )]
    pub platform_no: Option<u32>,
}

impl RawTrain {
    /// Applies documented defaults and reports what had to be defaulted.
    ///
    /// | field            | default                                |
    /// |------------------|----------------------------------------|
    /// | `id`             | `""`                                   |
    /// | `priority`       | `0`                                    |
    /// | `delay`          | `0` (negative values are clamped to 0) |
    /// | `clearance_time` | `0.0` (negative or non-finite → 0.0)   |
    ///
    /// A field whose stored value had the wrong type arrives here as `None`
    /// and is defaulted like a missing one.
    ///
    /// `name` and `platform_no` are genuinely optional and never reported.
    pub fn normalize(self) -> (Train, Vec<MalformedField>) {
        let mut defaulted = Vec::new();
        let record = self.id.clone().unwrap_or_default();
        let mut note = |field: &'static str| {
            defaulted.push(MalformedField {
                record: record.clone(),
                field,
            })
        };

        let id = self.id.clone().unwrap_or_else(|| {
            note("id");
            String::new()
        });

        let priority = self.priority.unwrap_or_else(|| {
            note("priority");
            0
        });

        let delay = match self.delay {
            Some(d) if d >= 0 => d as u64,
            _ => {
                note("delay");
                0
            }
        };

        let clearance_time = match self.clearance_time {
            // Folds -0.0 into 0.0 so equal clearances compare equal.
            Some(c) if c.is_finite() && c >= 0.0 => c + 0.0,
            _ => {
                note("clearance_time");
                0.0
            }
        };

        let train = Train {
            id: TrainId(id),
            name: self.name.filter(|n| !n.is_empty()),
            priority,
            delay,
            clearance_time,
            platform_no: self.platform_no,
        };
        (train, defaulted)
    }
}

impl From<&Train> for RawTrain {
    fn from(train: &Train) -> Self {
        RawTrain {
            id: Some(train.id.0.clone()),
            name: train.name.clone(),
            priority: Some(train.priority),
            delay: Some(train.delay as i64),
            clearance_time: Some(train.clearance_time),
            platform_no: train.platform_no,
        }
    }
}
