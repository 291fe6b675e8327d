//! Entry state machine and work outcomes

use core::fmt;

/// Lifecycle state of a work entry
///
/// Transitions are monotonic: an entry never returns to `Pending`.
/// The only contested edge is `Pending -> Running` (worker claim) versus
/// `Pending -> Cancelled` (caller cancel); both sides take the entry's
/// own lock before inspecting the state, so exactly one wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum EntryState {
    /// Queued, not yet claimed by a worker
    Pending = 0,

    /// A worker is executing the work function
    Running = 1,

    /// Work finished; entry is in (or has passed through) the reply queue
    Done = 2,

    /// Cancelled before any worker claimed it; never executed
    Cancelled = 3,
}

impl EntryState {
    /// Check whether a cancel can still win against this state
    #[inline]
    pub const fn is_cancellable(&self) -> bool {
        matches!(self, EntryState::Pending)
    }

    /// Check whether the entry reached a terminal state
    #[inline]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, EntryState::Done | EntryState::Cancelled)
    }
}

impl fmt::Display for EntryState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntryState::Pending => write!(f, "PENDING"),
            EntryState::Running => write!(f, "RUNNING"),
            EntryState::Done => write!(f, "DONE"),
            EntryState::Cancelled => write!(f, "CANCELLED"),
        }
    }
}

/// Return value of a work function
///
/// `Error` is a normal, caller-interpreted result: the reply function is
/// still invoked and decides what the error means. `Shutdown` delivers
/// the reply first, then retires the worker thread that executed it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum WorkOutcome {
    /// Normal success
    Reply = 0,

    /// Recoverable failure, still delivered to the reply function
    Error = 1,

    /// Deliver the reply, then retire the executing worker thread
    Shutdown = 2,
}

impl fmt::Display for WorkOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorkOutcome::Reply => write!(f, "REPLY"),
            WorkOutcome::Error => write!(f, "ERROR"),
            WorkOutcome::Shutdown => write!(f, "SHUTDOWN"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cancellable() {
        assert!(EntryState::Pending.is_cancellable());
        assert!(!EntryState::Running.is_cancellable());
        assert!(!EntryState::Done.is_cancellable());
        assert!(!EntryState::Cancelled.is_cancellable());
    }

    #[test]
    fn test_terminal() {
        assert!(EntryState::Done.is_terminal());
        assert!(EntryState::Cancelled.is_terminal());
        assert!(!EntryState::Pending.is_terminal());
        assert!(!EntryState::Running.is_terminal());
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", EntryState::Pending), "PENDING");
        assert_eq!(format!("{}", WorkOutcome::Shutdown), "SHUTDOWN");
    }
}
