//! Worker loop.
//!
//! Each worker blocks on the pool's condvar until an entry is queued or
//! shutdown is raised, claims the head entry, and executes it with no
//! locks held. The shared-state `Arc` is cloned in the same critical
//! section as the dequeue, so a concurrent `update_state` can never free
//! the value this worker is about to use.

use std::sync::Arc;

use workqueue_core::entry::DispatchEntry;
use workqueue_core::state::WorkOutcome;
use workqueue_core::{qdebug, qtrace};

use crate::pool::PoolInner;

pub(crate) fn worker_loop<S: Send + Sync + 'static>(inner: Arc<PoolInner<S>>, worker_id: usize) {
    qdebug!("worker {}: started", worker_id);

    while let Some((entry, shared)) = next_work(&inner) {
        match entry.execute(&shared) {
            None => {
                // A cancel won the race while the entry sat in the
                // queue; nothing to run, nothing to deliver.
                qtrace!("worker {}: {} cancelled before it ran", worker_id, entry.id());
            }
            Some(outcome) => {
                qtrace!("worker {}: {} finished: {}", worker_id, entry.id(), outcome);
                entry.finish(&*inner.reply);
                if outcome == WorkOutcome::Shutdown {
                    qdebug!("worker {}: retiring on SHUTDOWN outcome", worker_id);
                    return;
                }
            }
        }
    }

    qdebug!("worker {}: exiting", worker_id);
}

/// Wait for the next claimable entry, or `None` once shutdown is raised
/// and the queue has drained. Remaining queued work is executed even
/// after the flag is set, so shutdown never strands accepted entries.
fn next_work<S>(inner: &PoolInner<S>) -> Option<(Arc<dyn DispatchEntry<S>>, Arc<S>)> {
    let mut d = inner.dispatch.lock().unwrap();
    loop {
        if let Some(entry) = d.pending.pop_front() {
            return Some((entry, Arc::clone(&d.shared)));
        }
        if d.shutting_down {
            return None;
        }
        d = inner.work_ready.wait(d).unwrap();
    }
}
