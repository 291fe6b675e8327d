//! # workqueue - pollable thread pool for CPU-bound offload
//!
//! Lets a single-threaded, event-driven program push CPU-bound work onto
//! a bounded pool of OS threads and learn about completions through the
//! same fd polling it already uses for I/O.
//!
//! ## Features
//!
//! - **Fixed pool**: N workers created up front, never resized
//! - **Race-free cancellation**: pending work can be cancelled and its
//!   payload reclaimed; running work always completes and replies
//! - **Pollable completions**: a level-triggered eventfd/pipe fd,
//!   drained with one `process()` call per wakeup
//! - **Replaceable shared state**: swap the state all work functions
//!   see, with the old value freed only once no worker can touch it
//!
//! ## Quick Start
//!
//! ```ignore
//! use std::sync::Arc;
//! use workqueue::{ReplyQueue, ThreadPool, WorkOutcome};
//!
//! let reply = ReplyQueue::new()?;
//! let pool = ThreadPool::new(4, Arc::clone(&reply), keys)?;
//!
//! let handle = pool.queue_work(
//!     |keys, job| { job.answer = crunch(keys, &job.input); WorkOutcome::Reply },
//!     |_outcome, job| println!("done: {}", job.answer),
//!     job,
//! );
//!
//! // Register reply.notify_fd() with your poller; when readable:
//! reply.process();
//!
//! // Too late to bother? Only works while still pending:
//! let _ = handle.cancel();
//!
//! pool.shutdown()?;
//! ```

pub use workqueue_core::{
    no_reply, CancelFailed, EntryHandle, EntryId, EntryState, Notifier, QueueError, QueueResult,
    WorkOutcome,
};
pub use workqueue_core::{qdebug, qerror, qinfo, qtrace, qwarn};
pub use workqueue_runtime::{AlertChannel, ReplyQueue, ThreadPool};
