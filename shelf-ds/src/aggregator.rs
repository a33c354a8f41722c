//! Fan-out aggregator
//!
//! Dispatches one fetch per ranked item as a bounded group of concurrent
//! tasks, collects a tagged outcome per item, and merges successful
//! outcomes in rank order. A failed branch is logged and contributes
//! nothing; it never fails the group.
//!
//! ```text
//! ranked items ─┬─ fetch(item 1) ─→ truncate(cap 1) ─┐
//!               ├─ fetch(item 2) ─→ truncate(cap 2) ─┼─→ concat ─→ global cap
//!               └─ fetch(item K) ─→ truncate(cap K) ─┘
//! ```

use futures::stream::{self, StreamExt};
use shelf_common::Result;
use std::future::Future;
use tracing::{debug, warn};

/// Outcome of one fan-out branch, tagged with the item it ran for
#[derive(Debug)]
pub struct Branch<T> {
    pub item: String,
    pub outcome: Result<Vec<T>>,
}

impl<T> Branch<T> {
    pub fn failed(&self) -> bool {
        self.outcome.is_err()
    }

    /// Branch results, or nothing if the branch failed
    pub fn into_results(self) -> Vec<T> {
        match self.outcome {
            Ok(results) => results,
            Err(e) => {
                warn!(item = %self.item, error = %e, "Fan-out branch failed, contributing no results");
                Vec::new()
            }
        }
    }
}

/// Run `fetch_one` for every item, at most `concurrency` at a time
///
/// Outcomes come back in item order regardless of completion order.
pub async fn fan_out<T, F, Fut>(items: Vec<String>, concurrency: usize, fetch_one: F) -> Vec<Branch<T>>
where
    F: Fn(String) -> Fut,
    Fut: Future<Output = Result<Vec<T>>>,
{
    stream::iter(items)
        .map(|item| {
            let call = fetch_one(item.clone());
            async move {
                Branch {
                    item,
                    outcome: call.await,
                }
            }
        })
        .buffered(concurrency.max(1))
        .collect()
        .await
}

/// Merged fan-out output
#[derive(Debug)]
pub struct Merged<T> {
    pub results: Vec<T>,
    /// Branches that failed and contributed nothing
    pub failed: usize,
}

impl<T> Merged<T> {
    /// True when every branch answered
    pub fn is_complete(&self) -> bool {
        self.failed == 0
    }
}

/// Fan-out limits for one flow
#[derive(Debug, Clone, Copy)]
pub struct Limits<'a> {
    /// Per-item caps by rank; its length bounds how many items are fetched
    pub schedule: &'a [usize],
    /// Cap on the merged result
    pub global_cap: usize,
    pub concurrency: usize,
}

/// Fetch the top-ranked items and merge their results
///
/// Only the first `schedule.len()` items are fetched. Each item's results
/// keep their provider order and are truncated to that item's cap.
pub async fn aggregate<T, F, Fut>(ranked: &[String], limits: Limits<'_>, fetch_one: F) -> Merged<T>
where
    F: Fn(String) -> Fut,
    Fut: Future<Output = Result<Vec<T>>>,
{
    let items: Vec<String> = ranked.iter().take(limits.schedule.len()).cloned().collect();
    let branches = fan_out(items, limits.concurrency, fetch_one).await;

    let mut merged = Vec::new();
    let mut failed = 0;
    for (branch, cap) in branches.into_iter().zip(limits.schedule) {
        let item = branch.item.clone();
        failed += usize::from(branch.failed());
        let mut results = branch.into_results();
        results.truncate(*cap);
        debug!(item = %item, kept = results.len(), cap, "Fan-out branch merged");
        merged.extend(results);
    }

    merged.truncate(limits.global_cap);
    Merged {
        results: merged,
        failed,
    }
}

/// Concatenate the results of a fixed query set, in query order
///
/// Failed queries contribute nothing.
pub async fn concat_all<T, F, Fut>(queries: &[String], concurrency: usize, fetch_one: F) -> Merged<T>
where
    F: Fn(String) -> Fut,
    Fut: Future<Output = Result<Vec<T>>>,
{
    let branches = fan_out(queries.to_vec(), concurrency, fetch_one).await;
    let failed = branches.iter().filter(|branch| branch.failed()).count();
    Merged {
        results: branches.into_iter().flat_map(Branch::into_results).collect(),
        failed,
    }
}

/// True when a library has too few distinct values to rank on
pub fn is_sparse(ranked: &[String], min_distinct: usize) -> bool {
    ranked.len() < min_distinct
}
