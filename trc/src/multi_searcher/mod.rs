//! MultiSearcher: scatter/gather over N searchers (local collectors and/or
//! remote clients), merging their responses into one (§4.6).

use crate::search::{SearchRequest, SearchResponse, Stats};
use crate::snapshot::TraceSnapshot;
use std::sync::Arc;
use std::time::Instant;

/// Anything that can answer a [`SearchRequest`]: a local [`crate::collector::Collector`]
/// or a remote client. Returns `(response, error)` rather than `Result` so a
/// partial failure (response present despite an error, or neither present)
/// can be represented and handled per §4.6/§7.
pub trait Searcher: Send + Sync {
  fn search(&self, req: &SearchRequest) -> (Option<SearchResponse>, Option<String>);
}

pub struct MultiSearcher {
  searchers: Vec<(String, Arc<dyn Searcher>)>,
}

impl MultiSearcher {
  pub fn new(searchers: Vec<(String, Arc<dyn Searcher>)>) -> Self {
    Self { searchers }
  }

  /// Scatters `req` to every underlying searcher (one thread per searcher —
  /// bounded parallelism is a future tuning knob, not a correctness
  /// requirement, per §4.6 step 1) and merges the results per §4.6 step 2–3.
  pub fn search(&self, req: &SearchRequest) -> SearchResponse {
    let start = Instant::now();
    let (_, bucketing, limit, _) = req.normalize();

    let results: Vec<(Option<SearchResponse>, Option<String>)> = std::thread::scope(|scope| {
      let handles: Vec<_> = self
        .searchers
        .iter()
        .map(|(name, searcher)| {
          let name = name.clone();
          scope.spawn(move || {
            let (resp, err) = searcher.search(req);
            (name, resp, err)
          })
        })
        .collect();
      handles
        .into_iter()
        .map(|h| {
          let (name, resp, err) = h.join().unwrap_or_else(|_| {
            (String::new(), None, Some("searcher thread panicked".to_string()))
          });
          (resp, err.map(|e| format!("{name}: {e}")))
        })
        .collect()
    });

    let mut sources: Vec<String> = Vec::new();
    let mut stats = Stats::new(bucketing);
    let mut total_count: u64 = 0;
    let mut match_count: u64 = 0;
    let mut traces: Vec<TraceSnapshot> = Vec::new();
    let mut problems: Vec<String> = Vec::new();

    for (response, error) in results {
      match (&response, &error) {
        (None, None) => {
          problems.push("weird empty response from a searcher".to_string());
        },
        (None, Some(e)) => {
          tracing::warn!(error = %e, "searcher returned only a problem, no response");
          problems.push(e.clone());
        },
        (Some(_), _) => {},
      }
      if let Some(resp) = response {
        sources.extend(resp.sources);
        if let Err(e) = stats.merge(&resp.stats) {
          panic!("MultiSearcher::search: {e}");
        }
        total_count += resp.total_count;
        match_count += resp.match_count;
        traces.extend(resp.traces);
        problems.extend(resp.problems);
        if let Some(e) = error {
          problems.push(e);
        }
      }
    }

    traces.sort_by(|a, b| b.started.cmp(&a.started).then_with(|| b.id.cmp(&a.id)));
    traces.truncate(limit);
    sources.sort();
    sources.dedup();

    SearchResponse {
      sources,
      stats,
      total_count,
      match_count,
      traces,
      problems,
      duration: start.elapsed(),
    }
  }
}

impl Searcher for MultiSearcher {
  fn search(&self, req: &SearchRequest) -> (Option<SearchResponse>, Option<String>) {
    (Some(MultiSearcher::search(self, req)), None)
  }
}

mod __test__;
