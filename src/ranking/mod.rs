//! Dispatch ranking and platform recommendations.
//!
//! Pure functions: [`rank`] orders trains by urgency and [`recommend`] pairs
//! the top of that order with available platforms.

pub mod matcher;
pub mod rank;

pub use matcher::{MAX_RECOMMENDATIONS, Recommendation, recommend};
pub use rank::{dispatch_cmp, rank};
