//! Reply queue — completed entries travelling back to the main thread.
//!
//! Workers push finished entries here and poke the alert channel; the
//! main thread registers [`ReplyQueue::notify_fd`] with its poller and
//! calls [`ReplyQueue::process`] when it reports readable. Several pools
//! may share one reply queue.
//!
//! The FIFO has its own mutex, independent of any pool's dispatch lock.
//! Neither lock is ever held while the other is taken, so there is no
//! lock ordering to get wrong.

use std::collections::VecDeque;
use std::os::unix::io::RawFd;
use std::sync::{Arc, Mutex};

use workqueue_core::entry::{Deliver, ReplySink};
use workqueue_core::error::QueueResult;
use workqueue_core::notifier::Notifier;
use workqueue_core::qtrace;

use crate::alert::AlertChannel;

pub struct ReplyQueue {
    completed: Mutex<VecDeque<Arc<dyn Deliver>>>,
    alert: AlertChannel,
}

impl ReplyQueue {
    /// Create a reply queue with the platform's default alert channel.
    pub fn new() -> QueueResult<Arc<Self>> {
        Ok(Arc::new(Self::with_alert(AlertChannel::new()?)))
    }

    /// Create a reply queue around a pre-built alert channel.
    pub fn with_alert(alert: AlertChannel) -> Self {
        ReplyQueue {
            completed: Mutex::new(VecDeque::new()),
            alert,
        }
    }

    /// The fd to register with the main loop's poller.
    ///
    /// Readable whenever the FIFO is non-empty (and possibly for one
    /// spurious wakeup after a drain; `process` on an empty queue is a
    /// no-op, so that is harmless).
    #[inline]
    pub fn notify_fd(&self) -> RawFd {
        self.alert.read_fd()
    }

    /// Drain the queue and deliver every completed entry, in completion
    /// order, on the calling thread. Returns the number delivered.
    ///
    /// Drains the *queue*, not merely one notification token: any number
    /// of completions may have coalesced into a single readiness signal.
    /// Loops until the FIFO is observed empty, so entries posted while
    /// replies run are delivered too.
    pub fn process(&self) -> usize {
        let mut delivered = 0;
        loop {
            // Discard wakeup tokens first: anything posted after this
            // point leaves a fresh token behind for the next poll.
            self.alert.drain();

            let batch = {
                let mut fifo = self.completed.lock().unwrap();
                std::mem::take(&mut *fifo)
            };
            if batch.is_empty() {
                return delivered;
            }
            for entry in batch {
                qtrace!("replyqueue: delivering {}", entry.id());
                entry.deliver();
                delivered += 1;
            }
        }
    }

    /// Poll the notify fd for up to `timeout_ms`, then `process`.
    ///
    /// Convenience for programs without their own event loop. Returns
    /// the number of entries delivered.
    pub fn wait_and_process(&self, timeout_ms: i32) -> QueueResult<usize> {
        self.alert.wait_readable(timeout_ms)?;
        Ok(self.process())
    }

    /// Number of completed entries waiting for delivery.
    pub fn len(&self) -> usize {
        self.completed.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ReplySink for ReplyQueue {
    fn post(&self, entry: Arc<dyn Deliver>) {
        {
            let mut fifo = self.completed.lock().unwrap();
            fifo.push_back(entry);
        }
        // Best-effort, after the lock is released. A failed write is
        // logged and otherwise ignored: the consumer drains the logical
        // queue, so the entry is still delivered on the next process.
        if let Err(e) = self.alert.notify() {
            workqueue_core::qwarn!("replyqueue: notify failed: {}", e);
        }
    }
}
