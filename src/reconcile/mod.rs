//! Reconciliation of operator edits with committed state.
//!
//! Operators edit override labels per platform queue and availability flags
//! on the platform table. Neither edit takes effect until applied:
//!
//! - [`OverrideReconciler`]: one pending slot per platform
//! - [`AvailabilityReconciler`]: one pending slot for the platform table
//!
//! Both run the [`EditState`] machine (`Clean` → `PendingChange` → `Clean`)
//! and both keep a render revision that every revert bumps, so a view
//! rendered before the revert cannot feed stale edits back in.
//!
//! Nothing is retried. A store failure is returned to the caller and the
//! pending snapshot is left in place.

use thiserror::Error;

use crate::store::StoreError;

pub mod availability;
pub mod overrides;
pub mod session;

pub use availability::{AvailabilityMap, AvailabilityReconciler};
pub use overrides::{ApplyOutcome, DisplayedLabels, OverrideReconciler, displayed_labels};
pub use session::{Detection, EditState};

/// Errors that can occur while resolving a pending change.
#[derive(Debug, Error)]
pub enum ReconcileError {
    /// Writing the pending snapshot failed; committed state is unchanged.
    #[error("failed to persist pending change: {0}")]
    Persist(#[source] StoreError),

    /// Reloading committed state after a revert failed.
    #[error("failed to reload committed state: {0}")]
    Reload(#[source] StoreError),
}
