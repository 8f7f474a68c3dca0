//! Platform records and the display ordering convention.

use serde::{Deserialize, Serialize};

use super::ids::{LineId, PlatformId};
use super::lenient;
use super::train::MalformedField;

/// A platform on a line, with an operator-controlled availability flag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Platform {
    pub id: PlatformId,
    pub line_id: LineId,
    pub is_available: bool,
}

impl Platform {
    pub fn new(id: impl Into<String>, line_id: impl Into<String>, is_available: bool) -> Self {
        Platform {
            id: PlatformId::new(id),
            line_id: LineId::new(line_id),
            is_available,
        }
    }

    /// `"<platform>, <line>"`, the label used when suggesting a platform.
    pub fn label(&self) -> String {
        format!("{}, {}", self.id, self.line_id)
    }
}

/// A platform record as stored, before defaults are applied.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawPlatform {
    #[serde(
        default,
        alias = "Platform_ID",
        alias = "platform_id",
        deserialize_with = "lenient::text"
    )]
    pub id: Option<String>,

    #[serde(default, alias = "Line_ID", deserialize_with = "lenient::text")]
    pub line_id: Option<String>,

    #[serde(default, alias = "Is_Available", deserialize_with = "lenient::flag")]
    pub is_available: Option<bool>,
}

impl RawPlatform {
    /// Applies defaults: empty text for `id`/`line_id`, and `false` for
    /// `is_available` so an unknown platform is never offered.
    pub fn normalize(self) -> (Platform, Vec<MalformedField>) {
        let record = self.id.clone().unwrap_or_default();
        let mut defaulted = Vec::new();

        let mut text = |value: Option<String>, field: &'static str| {
            value.unwrap_or_else(|| {
                defaulted.push(MalformedField {
                    record: record.clone(),
                    field,
                });
                String::new()
            })
        };
        let id = text(self.id, "id");
        let line_id = text(self.line_id, "line_id");

        let is_available = self.is_available.unwrap_or_else(|| {
            defaulted.push(MalformedField {
                record: record.clone(),
                field: "is_available",
            });
            false
        });

        (Platform::new(id, line_id, is_available), defaulted)
    }
}

impl From<&Platform> for RawPlatform {
    fn from(platform: &Platform) -> Self {
        RawPlatform {
            id: Some(platform.id.0.clone()),
            line_id: Some(platform.line_id.0.clone()),
            is_available: Some(platform.is_available),
        }
    }
}

/// Orders platforms for display: ascending by platform number, platforms
/// without a number last, input order among equals.
pub fn display_order<'a, I>(platforms: I) -> Vec<&'a Platform>
where
    I: IntoIterator<Item = &'a Platform>,
{
    let mut ordered: Vec<&Platform> = platforms.into_iter().collect();
    // `None` sorts after every `Some` once mapped to `(true, _)`.
    ordered.sort_by_key(|p| match p.id.number() {
        Some(n) => (false, n),
        None => (true, 0),
    });
    ordered
}
