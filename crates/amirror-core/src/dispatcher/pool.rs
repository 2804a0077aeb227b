//! Bounded worker pool over the blocking thread pool.
//!
//! Keeps up to `limit` items in flight; when one finishes, the next item in
//! input order is started until the input is exhausted. A panicking worker
//! is reported as `Err(message)` for its item and never affects the others.

use std::collections::BTreeSet;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

/// Runs `work` on every item with at most `limit` concurrent calls (0 is treated as 1).
/// Returns `(input index, outcome)` in completion order.
pub async fn run_bounded<T, R, F>(
    items: Vec<T>,
    limit: usize,
    work: F,
) -> Vec<(usize, Result<R, String>)>
where
    T: Send + 'static,
    R: Send + 'static,
    F: Fn(T) -> R + Send + Sync + 'static,
{
    let limit = limit.max(1);
    let work = Arc::new(work);
    let mut queue = items.into_iter().enumerate();
    let mut pending = BTreeSet::new();
    let mut done = Vec::new();
    let mut join_set = tokio::task::JoinSet::new();

    loop {
        while join_set.len() < limit {
            let Some((index, item)) = queue.next() else {
                break;
            };
            let work = Arc::clone(&work);
            pending.insert(index);
            join_set.spawn_blocking(move || {
                let out = panic::catch_unwind(AssertUnwindSafe(|| (*work)(item)))
                    .map_err(|payload| panic_message(payload.as_ref()));
                (index, out)
            });
        }

        let Some(res) = join_set.join_next().await else {
            break;
        };
        match res {
            Ok((index, out)) => {
                pending.remove(&index);
                done.push((index, out));
            }
            Err(e) => tracing::error!("worker task join: {}", e),
        }
    }

    // Only reachable if the runtime cancelled a task before it reported.
    for index in pending {
        done.push((index, Err("worker task did not complete".to_string())));
    }
    done
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        format!("worker panicked: {}", s)
    } else if let Some(s) = payload.downcast_ref::<String>() {
        format!("worker panicked: {}", s)
    } else {
        "worker panicked".to_string()
    }
}
