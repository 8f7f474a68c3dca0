//! The pending-change state machine shared by both reconcilers.
//!
//! ```text
//!            detect (difference)              apply ok / revert
//!   Clean ─────────────────────────▶ PendingChange ─────────────────▶ Clean
//!                                      │    ▲
//!                                      └────┘ detect (layered)
//! ```
//!
//! A second edit while pending is merged into the same snapshot; it is not
//! a new transition. Transitions out of `PendingChange` are driven by the
//! reconcilers, which persist the snapshot before clearing it.

use std::collections::BTreeMap;

/// State of one edit slot.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum EditState<K: Ord, V> {
    /// The displayed values match the committed ones.
    #[default]
    Clean,

    /// An edit was detected and awaits apply or revert. Holds the displayed
    /// value of every key seen in edits so far, latest edit winning.
    PendingChange(BTreeMap<K, V>),
}

/// What a detection pass did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Detection {
    /// Nothing differs from the committed state; still clean.
    Unchanged,
    /// A difference moved the slot from clean to pending.
    Opened,
    /// The slot was already pending; the edits were merged into it.
    Layered,
    /// The edits were made against an older render and were ignored.
    Stale,
}

impl<K: Ord + Clone, V: Clone> EditState<K, V> {
    pub fn is_pending(&self) -> bool {
        matches!(self, EditState::PendingChange(_))
    }

    /// The pending snapshot, if any.
    pub fn pending(&self) -> Option<&BTreeMap<K, V>> {
        match self {
            EditState::Clean => None,
            EditState::PendingChange(snapshot) => Some(snapshot),
        }
    }

    /// Compares displayed values against the committed state.
    ///
    /// `is_committed(k, v)` must return true when `v` is the committed value
    /// for `k`. From `Clean`, any mismatch opens a pending change holding
    /// all of `displayed`. From `PendingChange`, `displayed` is merged into
    /// the existing snapshot regardless of whether it differs.
    pub fn detect<F>(&mut self, displayed: &BTreeMap<K, V>, is_committed: F) -> Detection
    where
        F: Fn(&K, &V) -> bool,
    {
        match self {
            EditState::Clean => {
                if displayed.iter().all(|(k, v)| is_committed(k, v)) {
                    Detection::Unchanged
                } else {
                    *self = EditState::PendingChange(displayed.clone());
                    Detection::Opened
                }
            }
            EditState::PendingChange(snapshot) => {
                snapshot.extend(displayed.iter().map(|(k, v)| (k.clone(), v.clone())));
                Detection::Layered
            }
        }
    }

    /// Drops any pending snapshot, returning to `Clean`. Returns whether a
    /// snapshot was dropped.
    pub fn discard(&mut self) -> bool {
        let was_pending = self.is_pending();
        *self = EditState::Clean;
        was_pending
    }
}
