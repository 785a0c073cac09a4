//! SearchRequest/SearchResponse & Stats: the query model, result shape, and
//! bucketed statistical summaries (§4.5).

use crate::error::{Result, TraceError};
use crate::filter::{CompiledFilter, Filter};
use crate::snapshot::TraceSnapshot;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

pub const MIN_LIMIT: usize = 1;
pub const MAX_LIMIT: usize = 250;
pub const DEFAULT_LIMIT: usize = 10;

/// Default bucketing thresholds (§4.5): `{0, 1ms, 5ms, 10ms, 25ms, 50ms,
/// 100ms, 1s}`.
pub fn default_bucketing() -> Vec<Duration> {
  vec![
    Duration::ZERO,
    Duration::from_millis(1),
    Duration::from_millis(5),
    Duration::from_millis(10),
    Duration::from_millis(25),
    Duration::from_millis(50),
    Duration::from_millis(100),
    Duration::from_secs(1),
  ]
}

/// Name of the synthetic "all categories" view (§4.5.2).
pub const OVERALL_CATEGORY: &str = "Overall";

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SearchRequest {
  #[serde(default)]
  pub filter: Filter,
  #[serde(default, with = "crate::duration::duration_vec_string")]
  pub bucketing: Vec<Duration>,
  #[serde(default = "default_limit_value")]
  pub limit: usize,
  #[serde(default)]
  pub stack_depth: i64,
}

fn default_limit_value() -> usize {
  DEFAULT_LIMIT
}

impl Default for SearchRequest {
  fn default() -> Self {
    Self {
      filter: Filter::default(),
      bucketing: Vec::new(),
      limit: DEFAULT_LIMIT,
      stack_depth: 0,
    }
  }
}

impl SearchRequest {
  /// Compiles the filter and normalizes bucketing/limit, collecting
  /// non-fatal validation problems (§4.4, §7). Bucketing is forced to start
  /// at zero, sorted ascending, and deduplicated; an empty input falls back
  /// to [`default_bucketing`].
  pub fn normalize(&self) -> (CompiledFilter, Vec<Duration>, usize, Vec<String>) {
    let mut problems = Vec::new();
    let (compiled, problem) = self.filter.normalize();
    problems.extend(problem);

    let mut bucketing = if self.bucketing.is_empty() {
      default_bucketing()
    } else {
      self.bucketing.clone()
    };
    bucketing.sort();
    bucketing.dedup();
    if bucketing.first() != Some(&Duration::ZERO) {
      bucketing.insert(0, Duration::ZERO);
    }

    let limit = if self.limit == 0 {
      DEFAULT_LIMIT
    } else {
      self.limit.clamp(MIN_LIMIT, MAX_LIMIT)
    };

    (compiled, bucketing, limit, problems)
  }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct CategoryStats {
  pub active_count: u64,
  pub errored_count: u64,
  pub bucket_count: Vec<u64>,
  pub oldest: Option<DateTime<Utc>>,
  pub newest: Option<DateTime<Utc>>,
}

impl CategoryStats {
  fn new(bucket_len: usize) -> Self {
    Self {
      bucket_count: vec![0; bucket_len],
      ..Default::default()
    }
  }

  pub fn total_count(&self) -> u64 {
    self.active_count + self.bucket_count.first().copied().unwrap_or(0) + self.errored_count
  }

  /// `TotalCount / (Newest - Oldest)`, when both endpoints are known and the
  /// span is positive.
  pub fn rate(&self) -> Option<f64> {
    let (oldest, newest) = (self.oldest?, self.newest?);
    let span = (newest - oldest).to_std().ok()?;
    if span.is_zero() {
      return None;
    }
    Some(self.total_count() as f64 / span.as_secs_f64())
  }

  fn observe(&mut self, bucketing: &[Duration], started: DateTime<Utc>, duration: Duration, finished: bool, errored: bool) {
    self.oldest = Some(self.oldest.map_or(started, |o| o.min(started)));
    self.newest = Some(self.newest.map_or(started, |n| n.max(started)));

    if !finished {
      self.active_count += 1;
      return;
    }
    if errored {
      self.errored_count += 1;
      return;
    }
    for (i, threshold) in bucketing.iter().enumerate() {
      if duration >= *threshold {
        self.bucket_count[i] += 1;
      }
    }
  }

  fn merge(&mut self, other: &CategoryStats) -> Result<()> {
    if self.bucket_count.len() != other.bucket_count.len() {
      return Err(TraceError::StatsBucketingMismatch {
        expected: self.bucket_count.len(),
        found: other.bucket_count.len(),
      });
    }
    self.active_count += other.active_count;
    self.errored_count += other.errored_count;
    for (a, b) in self.bucket_count.iter_mut().zip(&other.bucket_count) {
      *a += b;
    }
    self.oldest = match (self.oldest, other.oldest) {
      (Some(a), Some(b)) => Some(a.min(b)),
      (a, None) => a,
      (None, b) => b,
    };
    self.newest = match (self.newest, other.newest) {
      (Some(a), Some(b)) => Some(a.max(b)),
      (a, None) => a,
      (None, b) => b,
    };
    Ok(())
  }
}

/// Bucketed histogram and counts per category, built up across a search
/// walk and mergeable across sources (§4.5.2).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Stats {
  #[serde(with = "crate::duration::duration_vec_string")]
  bucketing: Vec<Duration>,
  categories: BTreeMap<String, CategoryStats>,
}

impl Stats {
  pub fn new(bucketing: Vec<Duration>) -> Self {
    Self {
      bucketing,
      categories: BTreeMap::new(),
    }
  }

  pub fn bucketing(&self) -> &[Duration] {
    &self.bucketing
  }

  pub fn categories(&self) -> &BTreeMap<String, CategoryStats> {
    &self.categories
  }

  pub fn observe(&mut self, category: &str, started: DateTime<Utc>, duration: Duration, finished: bool, errored: bool) {
    let bucketing = self.bucketing.clone();
    self
      .categories
      .entry(category.to_string())
      .or_insert_with(|| CategoryStats::new(bucketing.len()))
      .observe(&bucketing, started, duration, finished, errored);
  }

  /// Merges `other` into `self`; both must share the same bucket count
  /// (§4.5.2, §8 property 6) — a mismatch is a programmer error, not a
  /// data-dependent problem.
  pub fn merge(&mut self, other: &Stats) -> Result<()> {
    if self.bucketing.len() != other.bucketing.len() {
      return Err(TraceError::StatsBucketingMismatch {
        expected: self.bucketing.len(),
        found: other.bucketing.len(),
      });
    }
    for (category, stats) in &other.categories {
      self
        .categories
        .entry(category.clone())
        .or_insert_with(|| CategoryStats::new(self.bucketing.len()))
        .merge(stats)?;
    }
    Ok(())
  }

  /// Synthetic "all categories" view: bucket counts and active/errored
  /// counts sum across categories, but `Rate` is the sum of per-category
  /// rates rather than recomputed from the merged totals, so it reflects
  /// concurrency of producers rather than a single wall-clock span
  /// (§4.5.2).
  pub fn overall(&self) -> (CategoryStats, Option<f64>) {
    let mut merged = CategoryStats::new(self.bucketing.len());
    let mut rate_sum = 0.0;
    let mut any_rate = false;
    for stats in self.categories.values() {
      // infallible: every category in this Stats shares self.bucketing.len()
      merged.merge(stats).expect("bucketing length invariant violated within Stats");
      if let Some(r) = stats.rate() {
        rate_sum += r;
        any_rate = true;
      }
    }
    (merged, any_rate.then_some(rate_sum))
  }
}

/// Response to a [`SearchRequest`] (§4.5, §6).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SearchResponse {
  pub sources: Vec<String>,
  pub stats: Stats,
  pub total_count: u64,
  pub match_count: u64,
  pub traces: Vec<TraceSnapshot>,
  #[serde(default)]
  pub problems: Vec<String>,
  #[serde(with = "crate::duration::duration_string")]
  pub duration: Duration,
}
