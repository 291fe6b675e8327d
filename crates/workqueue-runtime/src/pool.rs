//! Thread pool — bounded worker set, dispatch queue, shared state.
//!
//! A `ThreadPool<S>` owns N OS threads created at construction and never
//! resized. Producers append entries under the dispatch lock and wake
//! exactly one waiting worker per entry (signal-one, so an enqueue never
//! stampedes the whole pool for a single item). Completions flow out
//! through the pool's [`ReplyQueue`].
//!
//! `S` is the shared state every work function sees. It lives behind an
//! `Arc` that workers clone at dequeue time, which is what makes
//! [`ThreadPool::update_state`] safe: the superseded value drops exactly
//! when the last worker that dequeued under it finishes its work
//! function, never earlier.

use std::collections::VecDeque;
use std::sync::{Arc, Condvar, Mutex};
use std::thread::{self, JoinHandle};

use workqueue_core::entry::{DispatchEntry, EntryHandle, WorkEntry};
use workqueue_core::error::{QueueError, QueueResult};
use workqueue_core::state::WorkOutcome;
use workqueue_core::{env_get, qdebug, qerror, qinfo};

use crate::reply::ReplyQueue;
use crate::worker::worker_loop;

/// Everything guarded by the dispatch lock.
pub(crate) struct DispatchState<S> {
    pub(crate) pending: VecDeque<Arc<dyn DispatchEntry<S>>>,
    pub(crate) shared: Arc<S>,
    pub(crate) shutting_down: bool,
}

pub(crate) struct PoolInner<S> {
    pub(crate) dispatch: Mutex<DispatchState<S>>,
    pub(crate) work_ready: Condvar,
    pub(crate) reply: Arc<ReplyQueue>,
}

pub struct ThreadPool<S> {
    inner: Arc<PoolInner<S>>,
    workers: Vec<JoinHandle<()>>,
}

impl<S: Send + Sync + 'static> ThreadPool<S> {
    /// Create a pool with `n_threads` workers (at least 1).
    ///
    /// Thread creation failure aborts construction: already-spawned
    /// workers are torn down and the error is returned. Per the
    /// fail-fast policy the caller is expected to treat that as fatal.
    pub fn new(
        n_threads: usize,
        reply: Arc<ReplyQueue>,
        initial_state: S,
    ) -> QueueResult<Self> {
        let n_threads = n_threads.max(1);
        let inner = Arc::new(PoolInner {
            dispatch: Mutex::new(DispatchState {
                pending: VecDeque::new(),
                shared: Arc::new(initial_state),
                shutting_down: false,
            }),
            work_ready: Condvar::new(),
            reply,
        });

        let mut workers = Vec::with_capacity(n_threads);
        for worker_id in 0..n_threads {
            let worker_inner = Arc::clone(&inner);
            let spawned = thread::Builder::new()
                .name(format!("wq-worker-{}", worker_id))
                .spawn(move || worker_loop(worker_inner, worker_id));
            match spawned {
                Ok(handle) => workers.push(handle),
                Err(_) => {
                    qerror!("threadpool: failed to spawn worker {}", worker_id);
                    let mut pool = ThreadPool { inner, workers };
                    let _ = pool.stop_workers();
                    return Err(QueueError::WorkerSpawn);
                }
            }
        }

        qinfo!("threadpool: started with {} workers", n_threads);
        Ok(ThreadPool { inner, workers })
    }

    /// Create a pool sized from the machine: min(8, nproc/2), at least 2.
    ///
    /// `WQ_WORKERS` overrides the computed count.
    pub fn auto_sized(reply: Arc<ReplyQueue>, initial_state: S) -> QueueResult<Self> {
        let n: usize = env_get("WQ_WORKERS", 0);
        let n = if n > 0 {
            n
        } else {
            let cpus = thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(4);
            (cpus / 2).clamp(2, 8)
        };
        Self::new(n, reply, initial_state)
    }

    /// Queue one unit of work. Non-blocking; wakes at most one worker.
    ///
    /// `work` runs on a worker thread against the pool's shared state;
    /// `reply` runs later on whichever thread calls
    /// [`ReplyQueue::process`]. The returned handle can cancel the work
    /// while it is still pending; dropping the handle does nothing.
    pub fn queue_work<T, W, R>(&self, work: W, reply: R, arg: T) -> EntryHandle<S, T>
    where
        T: Send + 'static,
        W: FnOnce(&S, &mut T) -> WorkOutcome + Send + 'static,
        R: FnOnce(WorkOutcome, T) + Send + 'static,
    {
        let entry = Arc::new(WorkEntry::new(work, reply, arg));
        {
            let mut d = self.inner.dispatch.lock().unwrap();
            d.pending
                .push_back(Arc::clone(&entry) as Arc<dyn DispatchEntry<S>>);
        }
        self.inner.work_ready.notify_one();
        EntryHandle::new(entry)
    }

    /// Replace the shared state all subsequently dequeued entries see.
    ///
    /// `update_fn(&old, &mut new)` runs under the dispatch lock so it
    /// can migrate data from the outgoing value. Once this returns,
    /// every later dequeue observes the new state; workers mid-call keep
    /// their reference and the old value drops when the last of them
    /// finishes.
    pub fn update_state<F>(&self, update_fn: F, new_state: S)
    where
        F: FnOnce(&S, &mut S),
    {
        let mut new_state = new_state;
        let mut d = self.inner.dispatch.lock().unwrap();
        update_fn(&d.shared, &mut new_state);
        d.shared = Arc::new(new_state);
        qdebug!("threadpool: shared state updated");
    }

    /// The reply queue completions for this pool flow into.
    pub fn reply_queue(&self) -> Arc<ReplyQueue> {
        Arc::clone(&self.inner.reply)
    }

    /// Number of worker threads the pool was created with.
    pub fn n_threads(&self) -> usize {
        self.workers.len()
    }

    /// Shut the pool down and join every worker.
    ///
    /// Consumes the pool, so a second shutdown cannot be expressed.
    /// Workers finish whatever is queued (in-flight work is never
    /// preempted) before exiting; this call blocks until the last one
    /// has been joined. After it returns, no further replies will ever
    /// be produced by this pool.
    pub fn shutdown(mut self) -> QueueResult<()> {
        qinfo!("threadpool: shutting down {} workers", self.workers.len());
        self.stop_workers()
    }

    fn stop_workers(&mut self) -> QueueResult<()> {
        {
            let mut d = self.inner.dispatch.lock().unwrap();
            d.shutting_down = true;
        }
        self.inner.work_ready.notify_all();

        let mut result = Ok(());
        for handle in self.workers.drain(..) {
            if handle.join().is_err() {
                qerror!("threadpool: a worker panicked");
                result = Err(QueueError::WorkerPanicked);
            }
        }
        result
    }
}

impl<S> Drop for ThreadPool<S> {
    fn drop(&mut self) {
        if self.workers.is_empty() {
            return;
        }
        // Dropped without shutdown(): raise the flag and broadcast so
        // workers do not block forever, but do not join here.
        {
            let mut d = self.inner.dispatch.lock().unwrap();
            d.shutting_down = true;
        }
        self.inner.work_ready.notify_all();
    }
}
