//! Batch orchestration for search and replace items.
//!
//! Read-only items run in parallel on the rayon pool; mutating items run
//! strictly in request order so two items touching the same file never
//! interleave their read-modify-write sequences. Either way the response
//! carries one entry per executed item, sorted by original index, plus a
//! summary.

use std::time::Instant;

use rayon::prelude::*;
use serde::Serialize;
use tracing::debug;

use crate::replace::ReplacementOutcome;
use crate::search::SearchOutcome;

/// Per-item result that knows whether it succeeded.
pub trait Outcome {
    fn succeeded(&self) -> bool;
}

impl Outcome for SearchOutcome {
    fn succeeded(&self) -> bool {
        self.success
    }
}

impl Outcome for ReplacementOutcome {
    fn succeeded(&self) -> bool {
        self.success
    }
}

/// One batch entry: the item's position in the request plus its outcome.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchResult<T> {
    pub index: usize,
    #[serde(flatten)]
    pub outcome: T,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchSummary {
    /// Number of items in the request.
    pub total: usize,
    pub successful: usize,
    pub failed: usize,
    pub duration_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchResponse<T> {
    pub summary: BatchSummary,
    pub results: Vec<BatchResult<T>>,
}

impl<T: Outcome> BatchResponse<T> {
    fn collect(total: usize, mut results: Vec<BatchResult<T>>, started: Instant) -> Self {
        results.sort_by_key(|r| r.index);
        let successful = results.iter().filter(|r| r.outcome.succeeded()).count();
        let failed = results.len() - successful;
        let duration_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

        debug!(total, successful, failed, duration_ms, "batch complete");

        Self {
            summary: BatchSummary {
                total,
                successful,
                failed,
                duration_ms,
            },
            results,
        }
    }

    /// Every executed item failed (and at least one ran).
    pub fn all_failed(&self) -> bool {
        !self.results.is_empty() && self.summary.successful == 0
    }

    pub fn any_failed(&self) -> bool {
        self.summary.failed > 0
    }
}

/// Run every item independently and in parallel.
///
/// One item's failure never affects another.
pub fn run_parallel<I, T, F>(items: &[I], run: F) -> BatchResponse<T>
where
    I: Sync,
    T: Outcome + Send,
    F: Fn(&I) -> T + Sync,
{
    let started = Instant::now();
    let results: Vec<BatchResult<T>> = items
        .par_iter()
        .enumerate()
        .map(|(index, item)| BatchResult {
            index,
            outcome: run(item),
        })
        .collect();
    BatchResponse::collect(items.len(), results, started)
}

/// Run items one after another in request order.
///
/// With `stop_on_error`, iteration ends after the first failing item and
/// later items are left out of the results entirely.
pub fn run_sequential<I, T, F>(items: &[I], stop_on_error: bool, mut run: F) -> BatchResponse<T>
where
    T: Outcome,
    F: FnMut(&I) -> T,
{
    let started = Instant::now();
    let mut results = Vec::with_capacity(items.len());

    for (index, item) in items.iter().enumerate() {
        let outcome = run(item);
        let failed = !outcome.succeeded();
        results.push(BatchResult { index, outcome });
        if failed && stop_on_error {
            debug!(index, "stopping batch on first error");
            break;
        }
    }

    BatchResponse::collect(items.len(), results, started)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq, Serialize)]
    struct Flag {
        ok: bool,
    }

    impl Outcome for Flag {
        fn succeeded(&self) -> bool {
            self.ok
        }
    }

    #[test]
    fn test_parallel_results_sorted_by_index() {
        // Earlier items sleep longer so they finish last.
        let items: Vec<u64> = (0..16).rev().collect();
        let response = run_parallel(&items, |delay| {
            std::thread::sleep(std::time::Duration::from_millis(*delay));
            Flag { ok: true }
        });
        let indices: Vec<usize> = response.results.iter().map(|r| r.index).collect();
        assert_eq!(indices, (0..16).collect::<Vec<_>>());
        assert_eq!(response.summary.total, 16);
        assert_eq!(response.summary.successful, 16);
    }

    #[test]
    fn test_parallel_failures_isolated() {
        let items = vec![true, false, true];
        let response = run_parallel(&items, |ok| Flag { ok: *ok });
        assert_eq!(response.results.len(), 3);
        assert_eq!(response.summary.failed, 1);
        assert!(response.any_failed());
        assert!(!response.all_failed());
    }

    #[test]
    fn test_all_failed() {
        let items = vec![false, false];
        let response = run_parallel(&items, |ok| Flag { ok: *ok });
        assert!(response.all_failed());

        let empty: Vec<bool> = Vec::new();
        assert!(!run_parallel(&empty, |ok| Flag { ok: *ok }).all_failed());
    }

    #[test]
    fn test_sequential_stop_on_error_omits_rest() {
        let items = vec![true, false, true];
        let mut seen = Vec::new();
        let response = run_sequential(&items, true, |ok| {
            seen.push(*ok);
            Flag { ok: *ok }
        });
        assert_eq!(seen.len(), 2);
        let indices: Vec<usize> = response.results.iter().map(|r| r.index).collect();
        assert_eq!(indices, vec![0, 1]);
        assert_eq!(response.summary.total, 3);
        assert_eq!(response.summary.failed, 1);
    }

    #[test]
    fn test_sequential_continues_by_default() {
        let items = vec![true, false, true];
        let response = run_sequential(&items, false, |ok| Flag { ok: *ok });
        assert_eq!(response.results.len(), 3);
        assert!(response.results[2].outcome.ok);
    }

    #[test]
    fn test_result_serializes_flat() {
        let entry = BatchResult {
            index: 4,
            outcome: Flag { ok: true },
        };
        let json = serde_json::to_value(&entry).expect("serialize");
        assert_eq!(json, serde_json::json!({"index": 4, "ok": true}));
    }
}
