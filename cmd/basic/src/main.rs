//! Basic workqueue example
//!
//! Offloads a handful of naive Fibonacci computations to a small pool
//! and collects the replies through the pollable reply queue, the way an
//! event loop would.

use std::sync::Arc;
use workqueue::{ReplyQueue, ThreadPool, WorkOutcome};

struct Job {
    n: u64,
    answer: u64,
}

fn fib(n: u64) -> u64 {
    if n < 2 {
        n
    } else {
        fib(n - 1) + fib(n - 2)
    }
}

fn main() {
    println!("=== Workqueue Basic Example ===\n");

    let reply = ReplyQueue::new().expect("failed to create reply queue");
    let pool = ThreadPool::new(2, Arc::clone(&reply), ()).expect("failed to create pool");

    println!("Pool started with {} workers", pool.n_threads());
    println!("Reply queue fd: {}\n", reply.notify_fd());

    let inputs = [30u64, 25, 32, 20, 28];
    for n in inputs {
        pool.queue_work(
            |_state: &(), job: &mut Job| {
                job.answer = fib(job.n);
                WorkOutcome::Reply
            },
            |_outcome, job| {
                println!("fib({}) = {}", job.n, job.answer);
            },
            Job { n, answer: 0 },
        );
    }

    // A real program registers reply.notify_fd() with its poller and
    // calls process() on readiness; here we just poll in a loop.
    let mut delivered = 0;
    while delivered < inputs.len() {
        delivered += reply
            .wait_and_process(1000)
            .expect("polling the reply queue failed");
    }

    pool.shutdown().expect("shutdown failed");
    println!("\nAll replies delivered, pool shut down.");
}
