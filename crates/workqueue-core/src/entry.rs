//! Work entries and the cancel/execute race protocol.
//!
//! A `WorkEntry` is one unit of offloaded work: a work function, a reply
//! function, the caller's payload, and a small state machine. The entry
//! carries its own mutex so the cancel-vs-claim decision is atomic
//! without holding any pool-wide lock; the mutex is held only for state
//! flips and take/put of the payload, never while the work function runs.
//!
//! Type parameters: `S` is the pool's shared state, `T` the caller
//! payload. The dispatch queue and the reply queue see entries through
//! the type-erased `DispatchEntry<S>` and `Deliver` traits; only the
//! `EntryHandle` returned to the caller keeps the concrete type, which
//! is what lets a successful cancel give the payload back unchanged.

use std::sync::{Arc, Mutex};

use crate::error::CancelFailed;
use crate::id::EntryId;
use crate::state::{EntryState, WorkOutcome};

/// Boxed work function: `(sharedState, arg) -> outcome`.
///
/// Runs on a worker thread. Must not touch main-thread-owned data; all
/// communication back to the main thread goes through the payload and
/// the reply function.
pub type WorkFn<S, T> = Box<dyn FnOnce(&S, &mut T) -> WorkOutcome + Send + 'static>;

/// Boxed reply function: invoked on the draining thread only, exactly
/// once per executed entry.
pub type ReplyFn<T> = Box<dyn FnOnce(WorkOutcome, T) + Send + 'static>;

/// Provided no-op reply function for fire-and-forget work.
///
/// The entry is still freed after delivery; only the notification is
/// ignored.
pub fn no_reply<T>(_outcome: WorkOutcome, _arg: T) {}

/// Everything guarded by the entry's own lock.
struct Slot<S, T> {
    state: EntryState,
    work: Option<WorkFn<S, T>>,
    reply: Option<ReplyFn<T>>,
    arg: Option<T>,
    outcome: Option<WorkOutcome>,
}

/// One unit of work passed to a thread pool.
///
/// Invariant: exactly one of {a worker executes the entry, a cancel
/// claims it while still pending} ever happens, and state transitions
/// are monotonic.
pub struct WorkEntry<S, T> {
    id: EntryId,
    slot: Mutex<Slot<S, T>>,
}

impl<S, T> WorkEntry<S, T> {
    /// Create a new entry in state `Pending`, owning `arg`.
    pub fn new<W, R>(work: W, reply: R, arg: T) -> Self
    where
        W: FnOnce(&S, &mut T) -> WorkOutcome + Send + 'static,
        R: FnOnce(WorkOutcome, T) + Send + 'static,
    {
        WorkEntry {
            id: EntryId::next(),
            slot: Mutex::new(Slot {
                state: EntryState::Pending,
                work: Some(Box::new(work)),
                reply: Some(Box::new(reply)),
                arg: Some(arg),
                outcome: None,
            }),
        }
    }

    #[inline]
    pub fn id(&self) -> EntryId {
        self.id
    }

    /// Snapshot the current state (debugging only; may be stale by the
    /// time the caller looks at it).
    pub fn state(&self) -> EntryState {
        self.slot.lock().unwrap().state
    }

    /// Try to cancel the entry before any worker claims it.
    ///
    /// On success the original payload is returned unchanged and the
    /// work function will never run. Losing the race is an expected,
    /// non-exceptional outcome.
    pub fn cancel(&self) -> Result<T, CancelFailed> {
        let mut slot = self.slot.lock().unwrap();
        match slot.state {
            EntryState::Pending => {
                slot.state = EntryState::Cancelled;
                slot.work = None;
                slot.reply = None;
                // Pending implies the payload is still present.
                slot.arg.take().ok_or(CancelFailed::AlreadyCancelled)
            }
            EntryState::Running => Err(CancelFailed::Running),
            EntryState::Done => Err(CancelFailed::Done),
            EntryState::Cancelled => Err(CancelFailed::AlreadyCancelled),
        }
    }
}

/// Completed-entry side: what the reply queue needs.
pub trait Deliver: Send + Sync {
    fn id(&self) -> EntryId;

    /// Invoke the reply function on the calling thread. At most one
    /// invocation ever happens; repeat calls are no-ops.
    fn deliver(&self);
}

/// Where workers hand finished entries. Implemented by the reply queue.
///
/// `post` pushes the entry onto the completed FIFO and pokes the
/// notification channel. Never blocks.
pub trait ReplySink: Send + Sync {
    fn post(&self, entry: Arc<dyn Deliver>);
}

/// Pending-entry side: what the dispatch queue and workers need.
pub trait DispatchEntry<S>: Send + Sync {
    fn id(&self) -> EntryId;

    /// Claim `Pending -> Running` and run the work function.
    ///
    /// Returns `None` when a cancel won the race first, in which case
    /// the caller just drops its reference and moves on to the next
    /// entry. The entry lock is released before the work function runs.
    fn execute(&self, shared: &S) -> Option<WorkOutcome>;

    /// Hand the finished entry to the reply sink.
    fn finish(self: Arc<Self>, sink: &dyn ReplySink);
}

impl<S: 'static, T: Send + 'static> DispatchEntry<S> for WorkEntry<S, T> {
    fn id(&self) -> EntryId {
        self.id
    }

    fn execute(&self, shared: &S) -> Option<WorkOutcome> {
        let (work, mut arg) = {
            let mut slot = self.slot.lock().unwrap();
            if slot.state != EntryState::Pending {
                return None;
            }
            match (slot.work.take(), slot.arg.take()) {
                (Some(work), Some(arg)) => {
                    slot.state = EntryState::Running;
                    (work, arg)
                }
                _ => return None,
            }
        };

        // No locks held while the caller's code runs.
        let outcome = work(shared, &mut arg);

        let mut slot = self.slot.lock().unwrap();
        slot.state = EntryState::Done;
        slot.arg = Some(arg);
        slot.outcome = Some(outcome);
        Some(outcome)
    }

    fn finish(self: Arc<Self>, sink: &dyn ReplySink) {
        sink.post(self);
    }
}

impl<S: 'static, T: Send + 'static> Deliver for WorkEntry<S, T> {
    fn id(&self) -> EntryId {
        self.id
    }

    fn deliver(&self) {
        let (reply, outcome, arg) = {
            let mut slot = self.slot.lock().unwrap();
            (slot.reply.take(), slot.outcome.take(), slot.arg.take())
        };
        if let (Some(reply), Some(outcome), Some(arg)) = (reply, outcome, arg) {
            reply(outcome, arg);
        }
    }
}

/// Caller-side handle to a queued entry.
///
/// Created by `ThreadPool::queue_work`. Holding the handle does not keep
/// the pool alive, and dropping it does not cancel the work.
pub struct EntryHandle<S, T> {
    entry: Arc<WorkEntry<S, T>>,
}

impl<S, T> EntryHandle<S, T> {
    pub fn new(entry: Arc<WorkEntry<S, T>>) -> Self {
        EntryHandle { entry }
    }

    #[inline]
    pub fn id(&self) -> EntryId {
        self.entry.id()
    }

    /// Snapshot the entry state (debugging only).
    pub fn state(&self) -> EntryState {
        self.entry.state()
    }

    /// Try to cancel; see [`WorkEntry::cancel`].
    pub fn cancel(&self) -> Result<T, CancelFailed> {
        self.entry.cancel()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    fn make_entry(
        ran: Arc<AtomicBool>,
        replied: Arc<AtomicUsize>,
    ) -> WorkEntry<(), u32> {
        WorkEntry::new(
            move |_state: &(), arg: &mut u32| {
                ran.store(true, Ordering::SeqCst);
                *arg += 1;
                WorkOutcome::Reply
            },
            move |_outcome, _arg| {
                replied.fetch_add(1, Ordering::SeqCst);
            },
            7,
        )
    }

    #[test]
    fn test_execute_then_deliver() {
        let ran = Arc::new(AtomicBool::new(false));
        let replied = Arc::new(AtomicUsize::new(0));
        let entry = Arc::new(make_entry(ran.clone(), replied.clone()));

        assert_eq!(entry.state(), EntryState::Pending);
        let outcome = DispatchEntry::execute(&*entry, &());
        assert_eq!(outcome, Some(WorkOutcome::Reply));
        assert_eq!(entry.state(), EntryState::Done);
        assert!(ran.load(Ordering::SeqCst));

        entry.deliver();
        assert_eq!(replied.load(Ordering::SeqCst), 1);

        // Repeat delivery is a no-op.
        entry.deliver();
        assert_eq!(replied.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_cancel_pending_returns_arg() {
        let ran = Arc::new(AtomicBool::new(false));
        let replied = Arc::new(AtomicUsize::new(0));
        let entry = Arc::new(make_entry(ran.clone(), replied.clone()));

        assert_eq!(entry.cancel(), Ok(7));
        assert_eq!(entry.state(), EntryState::Cancelled);

        // The work function never runs after a successful cancel.
        assert_eq!(DispatchEntry::execute(&*entry, &()), None);
        assert!(!ran.load(Ordering::SeqCst));

        // Neither does the reply.
        entry.deliver();
        assert_eq!(replied.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_cancel_after_execute_fails() {
        let ran = Arc::new(AtomicBool::new(false));
        let replied = Arc::new(AtomicUsize::new(0));
        let entry = make_entry(ran, replied);

        assert_eq!(DispatchEntry::execute(&entry, &()), Some(WorkOutcome::Reply));
        assert_eq!(entry.cancel(), Err(CancelFailed::Done));
    }

    #[test]
    fn test_double_cancel() {
        let ran = Arc::new(AtomicBool::new(false));
        let replied = Arc::new(AtomicUsize::new(0));
        let entry = make_entry(ran, replied);

        assert!(entry.cancel().is_ok());
        assert_eq!(entry.cancel(), Err(CancelFailed::AlreadyCancelled));
    }

    #[test]
    fn test_error_outcome_still_delivered() {
        let got = Arc::new(Mutex::new(None));
        let got2 = got.clone();
        let entry = WorkEntry::new(
            |_state: &(), _arg: &mut u32| WorkOutcome::Error,
            move |outcome, arg| {
                *got2.lock().unwrap() = Some((outcome, arg));
            },
            9,
        );

        assert_eq!(DispatchEntry::execute(&entry, &()), Some(WorkOutcome::Error));
        entry.deliver();
        assert_eq!(*got.lock().unwrap(), Some((WorkOutcome::Error, 9)));
    }

    #[test]
    fn test_no_reply_compiles_and_frees() {
        let entry = WorkEntry::new(
            |_state: &(), _arg: &mut Vec<u8>| WorkOutcome::Reply,
            no_reply,
            vec![1, 2, 3],
        );
        assert_eq!(DispatchEntry::execute(&entry, &()), Some(WorkOutcome::Reply));
        entry.deliver();
    }
}
