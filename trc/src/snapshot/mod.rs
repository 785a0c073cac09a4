//! Compact, serializable views of a [`crate::trace::Trace`] for transport or
//! publication (§4.8).
//!
//! A live `Trace` is never handed across the ring-buffer boundary (§12
//! decision 2 in SPEC_FULL.md): `Collector::search` and `Broker::publish`
//! only ever produce one of the value types below, so eviction of the
//! underlying trace can never invalidate something a reader is holding.

use crate::event::EventSnapshot;
use crate::trace::{Trace, TraceId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Full-fidelity snapshot used by search results: metadata plus every event,
/// with stacks intact. Callers may apply `StackDepth` truncation afterward.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TraceSnapshot {
  pub id: TraceId,
  pub source: String,
  pub category: String,
  pub started: DateTime<Utc>,
  #[serde(with = "crate::duration::duration_string")]
  pub duration: Duration,
  pub finished: bool,
  pub errored: bool,
  pub events: Vec<EventSnapshot>,
}

impl TraceSnapshot {
  pub fn of(trace: &Trace) -> Self {
    Self {
      id: trace.id(),
      source: trace.source().to_string(),
      category: trace.category().to_string(),
      started: trace.started(),
      duration: trace.duration(),
      finished: trace.finished(),
      errored: trace.errored(),
      events: trace.events(),
    }
  }

  /// Truncates every event's stack to `depth` frames. `0` means "no
  /// change"; negative strips stacks entirely (§4.5 `StackDepth`).
  pub fn with_stack_depth(mut self, depth: i64) -> Self {
    if depth == 0 {
      return self;
    }
    if depth < 0 {
      for event in &mut self.events {
        event.stack.clear();
      }
      return self;
    }
    let depth = depth as usize;
    for event in &mut self.events {
      event.stack.truncate(depth);
    }
    self
  }
}

/// Reduced snapshot for high-rate live streaming (§4.8): if the trace is
/// still active, only the most recent event is included and all stack
/// frames are stripped, so a busy stream stays cheap to publish and decode.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StreamSnapshot {
  pub id: TraceId,
  pub source: String,
  pub category: String,
  pub started: DateTime<Utc>,
  #[serde(with = "crate::duration::duration_string")]
  pub duration: Duration,
  pub finished: bool,
  pub errored: bool,
  pub events: Vec<EventSnapshot>,
}

impl StreamSnapshot {
  pub fn of(trace: &Trace) -> Self {
    let finished = trace.finished();
    let mut events: Vec<EventSnapshot> = if finished {
      trace.events()
    } else {
      trace.latest_event().into_iter().collect()
    };
    for event in &mut events {
      event.stack.clear();
    }
    Self {
      id: trace.id(),
      source: trace.source().to_string(),
      category: trace.category().to_string(),
      started: trace.started(),
      duration: trace.duration(),
      finished,
      errored: trace.errored(),
      events,
    }
  }
}
