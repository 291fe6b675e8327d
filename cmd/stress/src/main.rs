//! Stress test - many work entries
//!
//! Pushes a large number of small CPU-bound entries through the pool and
//! measures enqueue and completion throughput.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use workqueue::{ReplyQueue, ThreadPool, WorkOutcome};

fn main() {
    println!("=== Workqueue Stress Test ===\n");

    let num_entries: usize = std::env::args()
        .nth(1)
        .and_then(|s| s.parse().ok())
        .unwrap_or(100_000);

    let reply = ReplyQueue::new().expect("failed to create reply queue");
    let counter = Arc::new(AtomicU64::new(0));
    let pool = ThreadPool::auto_sized(Arc::clone(&reply), Arc::clone(&counter))
        .expect("failed to create pool");

    println!(
        "Queueing {} entries across {} workers...",
        num_entries,
        pool.n_threads()
    );

    let start = Instant::now();
    for i in 0..num_entries {
        pool.queue_work(
            |state: &Arc<AtomicU64>, arg: &mut u64| {
                // A little work: mix the counter into the payload.
                let seen = state.fetch_add(1, Ordering::Relaxed);
                *arg = arg.wrapping_mul(0x9e37_79b9_7f4a_7c15) ^ seen;
                WorkOutcome::Reply
            },
            workqueue::no_reply,
            i as u64,
        );

        if (i + 1) % 10_000 == 0 {
            print!("\rQueued: {}/{}", i + 1, num_entries);
        }
    }
    let queue_time = start.elapsed();
    println!("\n\nEnqueue time: {:?}", queue_time);
    println!(
        "Enqueue rate: {:.0} entries/sec",
        num_entries as f64 / queue_time.as_secs_f64()
    );

    // Drain completions as they arrive, the way a main loop would.
    println!("\nWaiting for completion...");
    let run_start = Instant::now();
    let mut delivered = 0;
    while delivered < num_entries {
        delivered += reply
            .wait_and_process(1000)
            .expect("polling the reply queue failed");
    }
    let run_time = run_start.elapsed();

    pool.shutdown().expect("shutdown failed");

    let executed = counter.load(Ordering::Relaxed);
    println!("Executed: {} (expected {})", executed, num_entries);
    println!("Completion time: {:?}", run_time);
    println!(
        "Throughput: {:.0} entries/sec",
        num_entries as f64 / run_time.as_secs_f64()
    );
    assert_eq!(executed as usize, num_entries);
}
