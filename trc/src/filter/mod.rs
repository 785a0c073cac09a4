//! Declarative predicate over a trace (§4.4).
//!
//! A [`Filter`] is the wire-level spec (§6): plain data, serializable,
//! cheaply cloned. [`Filter::normalize`] compiles it once into a
//! [`CompiledFilter`] — regex compilation happens per search request, not
//! per trace (§9 design notes) — and `CompiledFilter::allow` is the hot-path
//! predicate.

use crate::snapshot::TraceSnapshot;
use crate::trace::TraceId;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::time::Duration;

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Filter {
  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub sources: Vec<String>,
  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub ids: Vec<TraceId>,
  #[serde(default, skip_serializing_if = "String::is_empty")]
  pub category: String,
  #[serde(default, skip_serializing_if = "is_false")]
  pub is_active: bool,
  #[serde(default, skip_serializing_if = "is_false")]
  pub is_finished: bool,
  #[serde(
    default,
    skip_serializing_if = "Option::is_none",
    with = "crate::duration::option_duration_string"
  )]
  pub min_duration: Option<Duration>,
  #[serde(default, skip_serializing_if = "is_false")]
  pub is_success: bool,
  #[serde(default, skip_serializing_if = "is_false")]
  pub is_errored: bool,
  #[serde(default, skip_serializing_if = "String::is_empty")]
  pub query: String,
}

fn is_false(b: &bool) -> bool {
  !b
}

impl Filter {
  /// Compiles `query` into a regex; an invalid pattern is reported as a
  /// problem string and the field is dropped from the compiled form so the
  /// rest of the predicate still applies (§4.4, S6).
  pub fn normalize(&self) -> (CompiledFilter, Option<String>) {
    let sources: HashSet<String> = self.sources.iter().cloned().collect();
    let ids: HashSet<TraceId> = self.ids.iter().copied().collect();

    let (query, problem) = match &self.query {
      q if q.is_empty() => (None, None),
      q => match Regex::new(q) {
        Ok(re) => (Some(re), None),
        Err(e) => {
          tracing::warn!(query = %q, error = %e, "filter query failed to compile as regex");
          (None, Some(format!("invalid query regex {:?}: {}", q, e)))
        },
      },
    };

    let compiled = CompiledFilter {
      sources,
      ids,
      category: self.category.clone(),
      is_active: self.is_active,
      is_finished: self.is_finished,
      min_duration: self.min_duration,
      is_success: self.is_success,
      is_errored: self.is_errored,
      query,
    };
    (compiled, problem)
  }
}

/// A [`Filter`] with its query regex already compiled, ready to evaluate
/// against many traces without recompiling.
pub struct CompiledFilter {
  sources: HashSet<String>,
  ids: HashSet<TraceId>,
  category: String,
  is_active: bool,
  is_finished: bool,
  min_duration: Option<Duration>,
  is_success: bool,
  is_errored: bool,
  query: Option<Regex>,
}

impl CompiledFilter {
  /// Matches everything; the identity filter.
  pub fn all() -> Self {
    Filter::default().normalize().0
  }

  pub fn allow(&self, snap: &TraceSnapshot) -> bool {
    if !self.sources.is_empty() && !self.sources.contains(&snap.source) {
      return false;
    }
    if !self.ids.is_empty() && !self.ids.contains(&snap.id) {
      return false;
    }
    if !self.category.is_empty() && self.category != snap.category {
      return false;
    }
    if self.is_active && snap.finished {
      return false;
    }
    if self.is_finished && !snap.finished {
      return false;
    }
    // §12 decision 1: MinDuration excludes active traces, since Duration on
    // an unfinished trace keeps moving and would make a latency filter
    // flicker with no underlying state change.
    if let Some(min) = self.min_duration {
      if !snap.finished || snap.duration < min {
        return false;
      }
    }
    if self.is_success && (!snap.finished || snap.errored) {
      return false;
    }
    if self.is_errored && !snap.errored {
      return false;
    }
    if let Some(re) = &self.query {
      if !snap.events.iter().any(|e| event_matches(re, e)) {
        return false;
      }
    }
    true
  }
}

fn event_matches(re: &Regex, event: &crate::event::EventSnapshot) -> bool {
  if re.is_match(&event.what) {
    return true;
  }
  event.stack.iter().any(|frame| {
    re.is_match(&frame.function) || re.is_match(&frame.file_line)
  })
}
