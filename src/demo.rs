//! Demo producers that exercise the console from several tasks

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// Start `producers` tasks logging one message each per `interval`.
///
/// All tasks share one counter; the message kind cycles debug, info, warning,
/// critical on it. Once the counter reaches `fatal_after`, the task that hit
/// it logs a fatal message instead.
pub fn spawn_producers(
    producers: usize,
    interval: Duration,
    fatal_after: Option<u64>,
) -> Vec<JoinHandle<()>> {
    let counter = Arc::new(AtomicU64::new(0));

    (0..producers.max(1))
        .map(|worker| {
            let counter = Arc::clone(&counter);
            tokio::spawn(async move {
                let mut ticker = tokio::time::interval(interval);
                loop {
                    ticker.tick().await;
                    let k = counter.fetch_add(1, Ordering::Relaxed);
                    if fatal_after.is_some_and(|limit| k >= limit) {
                        error!(target: "demo", fatal = true, worker, "Test {k}: giving up");
                        break;
                    }
                    emit(worker, k);
                }
            })
        })
        .collect()
}

fn emit(worker: usize, k: u64) {
    match k % 4 {
        0 => debug!(target: "demo", worker, "Test {k}"),
        1 => info!(
            target: "demo",
            worker,
            "Test {k}\nA great line of text, but a big, very and very big line of text, lots of characters in one single line"
        ),
        2 => warn!(target: "demo", worker, "Test {k}\nAnother line here"),
        _ => error!(target: "demo", worker, "Test {k}"),
    }
}
