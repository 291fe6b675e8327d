//! # workqueue-core
//!
//! Core types and trait seams for the workqueue thread pool.
//!
//! This crate is platform-agnostic and contains no OS-specific code.
//! The eventfd/pipe alert channel, the reply queue, and the pool itself
//! live in `workqueue-runtime`; everything there depends on the traits
//! and types defined here, never the other way around.
//!
//! ## Modules
//!
//! - `id` - Work entry identifier type
//! - `state` - Entry state machine and work outcomes
//! - `entry` - Work entries, the cancel/execute race, dispatch/deliver seams
//! - `notifier` - Cross-thread wakeup trait
//! - `error` - Error types
//! - `qlog` - Leveled stderr logging macros
//! - `env` - Environment variable utilities

pub mod entry;
pub mod env;
pub mod error;
pub mod id;
pub mod notifier;
pub mod qlog;
pub mod state;

// Re-exports for convenience
pub use entry::{no_reply, Deliver, DispatchEntry, EntryHandle, ReplyFn, ReplySink, WorkEntry, WorkFn};
pub use env::{env_get, env_get_bool};
pub use error::{CancelFailed, QueueError, QueueResult};
pub use id::EntryId;
pub use notifier::Notifier;
pub use state::{EntryState, WorkOutcome};
