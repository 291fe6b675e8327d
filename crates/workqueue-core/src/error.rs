//! Error types for the workqueue

use core::fmt;

/// Result type for workqueue operations
pub type QueueResult<T> = Result<T, QueueError>;

/// Errors that can occur while building or tearing down the pool machinery
///
/// Per the fail-fast policy, callers are expected to treat every variant
/// here as fatal to the host program: the pool cannot degrade safely
/// without threads or a notification channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueueError {
    /// Creating the alert channel (eventfd/pipe) failed, with errno
    AlertSetup(i32),

    /// Writing the alert channel failed with an unexpected errno
    /// (EAGAIN is not an error; see the Notifier contract)
    AlertWrite(i32),

    /// Failed to spawn a worker thread
    WorkerSpawn,

    /// A worker thread panicked before it could be joined
    WorkerPanicked,

    /// OS error with errno
    Os(i32),
}

impl fmt::Display for QueueError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueueError::AlertSetup(e) => write!(f, "alert channel setup failed: errno {}", e),
            QueueError::AlertWrite(e) => write!(f, "alert channel write failed: errno {}", e),
            QueueError::WorkerSpawn => write!(f, "failed to spawn worker thread"),
            QueueError::WorkerPanicked => write!(f, "worker thread panicked"),
            QueueError::Os(e) => write!(f, "OS error: errno {}", e),
        }
    }
}

impl std::error::Error for QueueError {}

/// Why a cancellation attempt lost the race
///
/// Not a fault: callers branch on this as an expected outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelFailed {
    /// A worker already claimed the entry; the work will run to
    /// completion and produce exactly one reply.
    Running,

    /// The work already finished; the reply is (or was) deliverable.
    Done,

    /// A previous cancel already won.
    AlreadyCancelled,
}

impl fmt::Display for CancelFailed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CancelFailed::Running => write!(f, "entry already running"),
            CancelFailed::Done => write!(f, "entry already done"),
            CancelFailed::AlreadyCancelled => write!(f, "entry already cancelled"),
        }
    }
}

impl std::error::Error for CancelFailed {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let e = QueueError::AlertSetup(22);
        assert_eq!(format!("{}", e), "alert channel setup failed: errno 22");

        let e = QueueError::WorkerSpawn;
        assert_eq!(format!("{}", e), "failed to spawn worker thread");
    }

    #[test]
    fn test_cancel_failed_display() {
        assert_eq!(format!("{}", CancelFailed::Running), "entry already running");
        assert_eq!(
            format!("{}", CancelFailed::AlreadyCancelled),
            "entry already cancelled"
        );
    }
}
