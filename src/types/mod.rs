//! Core record types for the platform advisor.
//!
//! Strongly typed trains, platforms and override labels. Loosely structured
//! input is converted into these at the store boundary; see
//! [`RawTrain::normalize`] and [`RawPlatform::normalize`].

pub mod ids;
pub mod label;
mod lenient;
pub mod platform;
pub mod train;

// Re-export commonly used types at the module level
pub use ids::{LineId, PlatformId, TrainId};
pub use label::{OverrideMap, PriorityLabel};
pub use platform::{Platform, RawPlatform, display_order};
pub use train::{MalformedField, RawTrain, Train};
