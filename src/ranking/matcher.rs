//! Pairs the most urgent trains with available platforms.
//!
//! This is a positional zip of the ranked trains against the available
//! platforms in their given order. It deliberately ignores whether a
//! platform suits a train; no compatibility is modeled.

use serde::Serialize;
use tracing::debug;

use super::rank::rank;
use crate::types::{Platform, Train};

/// Upper bound on the number of recommendations produced in one cycle.
pub const MAX_RECOMMENDATIONS: usize = 10;

/// One suggested (train, platform) pairing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation<'a> {
    /// 1-based position in the recommendation list.
    pub rank: usize,
    pub train: &'a Train,
    pub platform: &'a Platform,
}

/// Produces up to `min(|trains|, |available platforms|, 10)` recommendations.
///
/// Returns an empty list, not an error, when there are no trains or no
/// available platforms. Manual overrides play no part here.
pub fn recommend<'a>(trains: &'a [Train], platforms: &'a [Platform]) -> Vec<Recommendation<'a>> {
    let available: Vec<&Platform> = platforms.iter().filter(|p| p.is_available).collect();
    let ranked = rank(trains);

    debug!(
        trains = trains.len(),
        available = available.len(),
        "Matching ranked trains to available platforms"
    );

    ranked
        .into_iter()
        .zip(available)
        .take(MAX_RECOMMENDATIONS)
        .enumerate()
        .map(|(i, (train, platform))| Recommendation {
            rank: i + 1,
            train,
            platform,
        })
        .collect()
}
