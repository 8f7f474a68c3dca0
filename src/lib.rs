//! Platform Advisor - dispatch recommendations and platform queues for a
//! railway section controller.
//!
//! The library ranks waiting trains, pairs the most urgent ones with
//! available platforms, builds per-platform queues that honor manual
//! priority overrides, and reconciles operator edits with the committed
//! store.

pub mod config;
pub mod cycle;
pub mod queue;
pub mod ranking;
pub mod reconcile;
pub mod report;
pub mod server;
pub mod store;
pub mod types;

#[cfg(test)]
pub(crate) mod test_utils;
