//! Plain-text rendering of a cycle for the console.

use crate::cycle::CycleSnapshot;
use crate::queue::{QueueBoard, QueueEntry};
use crate::ranking::Recommendation;

/// Width the train name is padded to in recommendation lines.
const NAME_WIDTH: usize = 18;

/// Shown when the matcher has nothing to pair.
pub const NO_RECOMMENDATIONS: &str =
    "No recommendations. Either no trains are waiting or no platforms are available.";

/// Header summarizing what a cycle is ranking.
pub fn format_header(snapshot: &CycleSnapshot) -> String {
    format!(
        "--- Section Controller ---\n\
         Ranking {} trains against {} available platform lines.\n\
         Snapshot taken at {}\n\
         --------------------------\n",
        snapshot.trains.len(),
        snapshot.available_platforms(),
        snapshot.taken_at.format("%Y-%m-%d %H:%M:%S UTC"),
    )
}

/// Formats recommendations as a numbered list, two lines per pairing.
///
/// ```text
///   1. Clear Train: Rajdhani Express   -> Assign to: P1, Main
///      (Priority: 1, Delay:  120s)
/// ```
pub fn format_recommendations(recommendations: &[Recommendation<'_>]) -> String {
    if recommendations.is_empty() {
        return format!("{NO_RECOMMENDATIONS}\n");
    }

    let mut out = String::from("Top Actionable Recommendations:\n");
    for rec in recommendations {
        out.push_str(&format!(
            "  {}. Clear Train: {:<width$} -> Assign to: {}\n",
            rec.rank,
            rec.train.display_name(),
            rec.platform.label(),
            width = NAME_WIDTH,
        ));
        out.push_str(&format!(
            "     (Priority: {}, Delay: {:>4}s)\n",
            rec.train.priority, rec.train.delay
        ));
    }
    out
}

/// Formats every platform queue in display order.
pub fn format_queues(board: &QueueBoard) -> String {
    let mut out = String::new();
    if board.queues.is_empty() {
        out.push_str("No platforms.\n");
    }

    for queue in &board.queues {
        let availability = if queue.platform.is_available {
            "available"
        } else {
            "unavailable"
        };
        out.push_str(&format!(
            "{} [{}] (revision {})\n",
            queue.platform.label(),
            availability,
            queue.revision
        ));
        if queue.entries.is_empty() {
            out.push_str("  (empty)\n");
        }
        for entry in &queue.entries {
            out.push_str(&format_entry(entry));
        }
    }

    if !board.orphaned_overrides.is_empty() {
        let ids: Vec<&str> = board
            .orphaned_overrides
            .iter()
            .map(|id| id.as_str())
            .collect();
        out.push_str(&format!("Overrides for absent trains: {}\n", ids.join(", ")));
    }
    out
}

fn format_entry(entry: &QueueEntry) -> String {
    let label = entry
        .override_label
        .map(|l| format!(" [{l}]"))
        .unwrap_or_default();
    format!(
        "  {:<8} {:<width$} rank {:>5}{}\n",
        entry.status.as_str(),
        entry.train.display_name(),
        entry.effective_rank,
        label,
        width = NAME_WIDTH,
    )
}
