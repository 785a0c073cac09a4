//! Collector: owns the [`RingBuffers`] for one process, constructs traces
//! tagged with a configured source, and answers [`SearchRequest`]s locally
//! (§4.3, §4.5.1).

use crate::context::Context;
use crate::multi_searcher::Searcher;
use crate::ring_set::RingBuffers;
use crate::search::{SearchRequest, SearchResponse, Stats};
use crate::snapshot::TraceSnapshot;
use crate::trace::{next_trace_id, Trace, Traceable};
use std::sync::{Arc, Mutex};
use std::time::Instant;

pub struct Collector {
  ring_buffers: RingBuffers<Arc<Trace>>,
  source: Mutex<Arc<str>>,
  max_events_per_trace: usize,
  stack_depth: usize,
}

impl Collector {
  pub fn new(source: impl Into<String>, default_capacity: usize) -> crate::Result<Self> {
    Ok(Self {
      ring_buffers: RingBuffers::new(default_capacity)?,
      source: Mutex::new(Arc::from(source.into())),
      max_events_per_trace: crate::trace::DEFAULT_MAX_EVENTS,
      stack_depth: crate::trace::DEFAULT_STACK_DEPTH,
    })
  }

  /// Like [`Collector::new`], but derives the source label from the local
  /// hostname and process id (`"{hostname}:{pid}"`) instead of taking one
  /// explicitly. Convenient for processes that don't otherwise have a
  /// natural source name to hand.
  pub fn with_hostname_source(default_capacity: usize) -> crate::Result<Self> {
    let hostname = gethostname::gethostname().to_string_lossy().into_owned();
    let pid = std::process::id();
    Self::new(format!("{hostname}:{pid}"), default_capacity)
  }

  pub fn with_limits(mut self, max_events_per_trace: usize, stack_depth: usize) -> Self {
    self.max_events_per_trace = max_events_per_trace;
    self.stack_depth = stack_depth;
    self
  }

  /// Updates the source label applied to future traces. Not safe to call
  /// concurrently with [`Collector::new_trace`] (§4.3).
  pub fn set_source(&self, name: impl Into<String>) {
    *self.source.lock().expect("source mutex poisoned") = Arc::from(name.into());
  }

  /// If an ambient trace already exists in `ctx`, appends a `"(+ category)"`
  /// marker event to it and returns it unchanged rather than creating a new
  /// one. Otherwise constructs a fresh trace, inserts it into the ring
  /// buffer for `category` (dropping the oldest entry if full), installs it
  /// as the ambient trace, and returns the derived context (§4.3).
  pub fn new_trace(&self, ctx: &Context, category: impl Into<String>) -> (Context, Arc<dyn Traceable>) {
    let category = category.into();
    if let Some(existing) = ctx.handle() {
      tracing::debug!(category = %category, "ambient trace already present, appending category marker");
      existing.tracef(format!("(+ {category})"));
      return (ctx.clone(), existing);
    }

    let source = self.source.lock().expect("source mutex poisoned").clone();
    let id = next_trace_id();
    let trace = Arc::new(Trace::new(
      id,
      source,
      Arc::from(category.as_str()),
      self.max_events_per_trace,
      self.stack_depth,
    ));

    let buffer = self.ring_buffers.get_or_create(&category);
    let (dropped, did_drop) = buffer.add(trace.clone());
    if did_drop {
      tracing::debug!(category = %category, dropped_id = ?dropped.map(|t| t.id()), "ring buffer evicted oldest trace");
    }

    tracing::trace!(id, category = %category, "created trace");
    let next_ctx = ctx.with_trace(trace.clone() as Arc<dyn Traceable>);
    (next_ctx, trace as Arc<dyn Traceable>)
  }

  /// Forwards to [`RingBuffers::resize`]; evicted traces are simply dropped
  /// (this implementation does not pool trace storage, §12 decision 2).
  pub fn resize(&self, new_capacity: usize) -> crate::Result<usize> {
    let dropped = self.ring_buffers.resize(new_capacity)?;
    Ok(dropped.len())
  }

  /// Implements the per-category walk, filter, and bucketing algorithm of
  /// §4.5.1.
  pub fn search(&self, req: &SearchRequest) -> SearchResponse {
    let start = Instant::now();
    let (compiled, bucketing, limit, problems) = req.normalize();
    let stack_depth = req.stack_depth;

    let mut stats = Stats::new(bucketing);
    let mut total_count: u64 = 0;
    let mut match_count: u64 = 0;
    let mut selected: Vec<TraceSnapshot> = Vec::new();

    for (category, buffer) in self.ring_buffers.get_all() {
      let mut category_selected = 0usize;
      buffer.walk(|trace| {
        total_count += 1;
        stats.observe(&category, trace.started(), trace.duration(), trace.finished(), trace.errored());

        if category_selected >= limit {
          return;
        }
        let snap = TraceSnapshot::of(trace);
        if compiled.allow(&snap) {
          match_count += 1;
          category_selected += 1;
          selected.push(snap.with_stack_depth(stack_depth));
        }
      });
    }

    selected.sort_by(|a, b| b.started.cmp(&a.started).then_with(|| b.id.cmp(&a.id)));
    selected.truncate(limit);

    let source = self.source.lock().expect("source mutex poisoned").to_string();

    SearchResponse {
      sources: vec![source],
      stats,
      total_count,
      match_count,
      traces: selected,
      problems,
      duration: start.elapsed(),
    }
  }
}

impl Searcher for Collector {
  fn search(&self, req: &SearchRequest) -> (Option<SearchResponse>, Option<String>) {
    (Some(Collector::search(self, req)), None)
  }
}

mod __test__;
