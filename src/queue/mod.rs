//! Per-platform queues.
//!
//! Queue construction happens in two steps: an [`AssignmentStrategy`]
//! places trains onto platforms, and [`QueueBuilder`] orders each platform's
//! trains by effective rank, blending automatic priority with the committed
//! manual overrides.

pub mod assign;
pub mod builder;

pub use assign::{
    Assignment, AssignmentError, AssignmentPolicy, AssignmentStrategy, FixedAssignment,
    RoundRobin, UnknownPolicy, Unplaced, UnplacedReason,
};
pub use builder::{
    PlatformQueue, QueueBoard, QueueBuilder, QueueEntry, QueueStatus, build_from_assignment,
    effective_rank, order_queue,
};
