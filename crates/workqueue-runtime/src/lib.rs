//! # workqueue-runtime
//!
//! Platform-facing runtime for the workqueue thread pool: the
//! eventfd/pipe alert channel, the reply queue bridging worker threads
//! back to a poll-based main loop, the fixed-size thread pool, and the
//! worker loop itself.
//!
//! All trait seams (`DispatchEntry`, `Deliver`, `ReplySink`, `Notifier`)
//! come from `workqueue-core`; this crate provides the concrete types a
//! host program wires together:
//!
//! ```ignore
//! let reply = ReplyQueue::new()?;
//! let pool = ThreadPool::new(4, Arc::clone(&reply), my_state)?;
//! poller.register(reply.notify_fd());
//! // on readiness:
//! reply.process();
//! ```

#[cfg(not(unix))]
compile_error!("workqueue-runtime requires a unix platform (eventfd or pipe alert channel)");

pub mod alert;
pub mod pool;
pub mod reply;

mod worker;

// Re-exports for convenience
pub use alert::AlertChannel;
pub use pool::ThreadPool;
pub use reply::ReplyQueue;
