// ============================================================
// Layer 2 - Task Runner
// ============================================================
// Wraps one unit of pipeline work in a tracing span and logs
// its start, completion and elapsed time. Errors pass through
// untouched so callers can still downcast them.

use anyhow::Result;
use std::time::Instant;

pub fn run_task<T, F>(name: &str, f: F) -> Result<T>
where
    F: FnOnce() -> Result<T>,
{
    let span   = tracing::info_span!("task", name);
    let _guard = span.enter();

    tracing::info!("Task '{name}' started");
    let start  = Instant::now();
    let result = f();
    let took   = start.elapsed();

    match &result {
        Ok(_) => tracing::info!("Task '{name}' completed in {took:.2?}"),
        Err(e) => tracing::warn!("Task '{name}' failed after {took:.2?}: {e:#}"),
    }
    result
}
