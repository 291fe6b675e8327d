//! Cross-thread wakeup abstraction.
//!
//! A `Notifier` is the writable side of the bridge between worker
//! threads and a poll-based main loop: after a worker pushes a finished
//! entry onto the reply queue, it pokes the notifier so the main loop's
//! poller reports the queue's fd as readable.
//!
//! # Implementors
//!
//! - `AlertChannel` in `workqueue-runtime` (default): writes 1 to an
//!   eventfd on Linux, one byte to a nonblocking pipe elsewhere.
//!   Compatible with select/poll/epoll.

use crate::error::QueueResult;

/// Wakes the reply-queue consumer.
///
/// **Contract:**
/// - `notify()` must NEVER block.
/// - Multiple calls before the consumer drains are coalesced; a full
///   notification buffer (`EAGAIN`) means a wakeup is already pending
///   and counts as success.
/// - The consumer drains the *logical* queue, not the byte stream, so
///   losing surplus bytes is harmless.
pub trait Notifier: Send + Sync {
    /// Signal that new completed entries are available.
    fn notify(&self) -> QueueResult<()>;
}
