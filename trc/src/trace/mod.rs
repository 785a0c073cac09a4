//! Trace: an ordered, append-only sequence of events with a lifecycle
//! (§3, §4.1).

use crate::event::{capture_stack, Event, EventSnapshot};
use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, OnceLock, RwLock};
use std::time::{Duration, Instant};

pub type TraceId = u64;

pub const DEFAULT_MAX_EVENTS: usize = 1000;
pub const DEFAULT_STACK_DEPTH: usize = 16;

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

pub(crate) fn next_trace_id() -> TraceId {
  NEXT_ID.fetch_add(1, Ordering::Relaxed)
}

/// Anything that behaves like a [`Trace`] from the appender's point of view:
/// the bare trace itself, or a chain of decorators wrapping one (§4.9).
/// Ambient context holds this trait object so decoration is transparent to
/// call sites that only ever append events and finish.
pub trait Traceable: Send + Sync {
  /// Read-only access to the underlying trace, for accessors and for
  /// components (Filter, Stats, Broker) that only ever need to read state.
  fn trace(&self) -> &Trace;

  fn tracef(&self, message: String);
  fn errorf(&self, message: String);
  fn lazy_tracef(&self, thunk: Box<dyn FnOnce() -> String + Send>);
  fn lazy_errorf(&self, thunk: Box<dyn FnOnce() -> String + Send>);
  fn finish(&self);
}

/// A single operation's record. See §3 and §4.1.
pub struct Trace {
  id: TraceId,
  source: Arc<str>,
  category: Arc<str>,
  started: DateTime<Utc>,
  started_at: Instant,
  finished: AtomicBool,
  errored: AtomicBool,
  frozen_duration: Mutex<Option<Duration>>,
  events: RwLock<Vec<Event>>,
  max_events: usize,
  truncated: AtomicBool,
  stack_depth: usize,
  is_noop: bool,
}

impl Trace {
  pub(crate) fn new(
    id: TraceId,
    source: Arc<str>,
    category: Arc<str>,
    max_events: usize,
    stack_depth: usize,
  ) -> Self {
    Self {
      id,
      source,
      category,
      started: Utc::now(),
      started_at: Instant::now(),
      finished: AtomicBool::new(false),
      errored: AtomicBool::new(false),
      frozen_duration: Mutex::new(None),
      events: RwLock::new(Vec::new()),
      max_events: max_events.max(1),
      truncated: AtomicBool::new(false),
      stack_depth,
      is_noop: false,
    }
  }

  /// Reusable, cheap-to-clone no-op trace. Backs `Context::current()`'s
  /// fallback when no trace is ambient (§9) — appends are dropped so call
  /// sites can be unconditional.
  pub fn noop() -> Arc<Trace> {
    static NOOP: OnceLock<Arc<Trace>> = OnceLock::new();
    NOOP
      .get_or_init(|| {
        Arc::new(Trace {
          id: 0,
          source: Arc::from(""),
          category: Arc::from(""),
          started: Utc::now(),
          started_at: Instant::now(),
          finished: AtomicBool::new(true),
          errored: AtomicBool::new(false),
          frozen_duration: Mutex::new(Some(Duration::ZERO)),
          events: RwLock::new(Vec::new()),
          max_events: 1,
          truncated: AtomicBool::new(false),
          stack_depth: 0,
          is_noop: true,
        })
      })
      .clone()
  }

  pub fn id(&self) -> TraceId {
    self.id
  }

  /// Short, operator-facing rendering of the trace ID for embedding in
  /// response headers or log lines.
  pub fn id_string(&self) -> String {
    format!("{:x}", self.id)
  }

  pub fn source(&self) -> &str {
    &self.source
  }

  pub fn category(&self) -> &str {
    &self.category
  }

  pub fn started(&self) -> DateTime<Utc> {
    self.started
  }

  pub fn finished(&self) -> bool {
    self.finished.load(Ordering::Acquire)
  }

  pub fn errored(&self) -> bool {
    self.errored.load(Ordering::Acquire)
  }

  pub fn duration(&self) -> Duration {
    match *self.frozen_duration.lock().expect("duration mutex poisoned") {
      Some(d) => d,
      None => self.started_at.elapsed(),
    }
  }

  pub fn events(&self) -> Vec<EventSnapshot> {
    self
      .events
      .read()
      .expect("events lock poisoned")
      .iter()
      .map(Event::snapshot)
      .collect()
  }

  pub fn latest_event(&self) -> Option<EventSnapshot> {
    self
      .events
      .read()
      .expect("events lock poisoned")
      .last()
      .map(Event::snapshot)
  }

  pub fn tracef(&self, message: impl Into<String>) {
    self.append_eager(message.into(), false);
  }

  pub fn errorf(&self, message: impl Into<String>) {
    self.append_eager(message.into(), true);
  }

  pub fn lazy_tracef(&self, thunk: Box<dyn FnOnce() -> String + Send>) {
    self.append_lazy(thunk, false);
  }

  pub fn lazy_errorf(&self, thunk: Box<dyn FnOnce() -> String + Send>) {
    self.append_lazy(thunk, true);
  }

  fn append_eager(&self, what: String, is_error: bool) {
    if self.is_noop {
      return;
    }
    let when = Utc::now();
    let stack = capture_stack(self.stack_depth);
    self.append(Event::eager(when, what, is_error, stack), is_error);
  }

  fn append_lazy(&self, thunk: Box<dyn FnOnce() -> String + Send>, is_error: bool) {
    if self.is_noop {
      return;
    }
    let when = Utc::now();
    let stack = capture_stack(self.stack_depth);
    self.append(Event::lazy(when, thunk, is_error, stack), is_error);
  }

  /// Pins a synthetic truncation marker at index 0 the first time the
  /// per-trace event bound is exceeded, then keeps evicting from index 1
  /// onward so the marker itself is never dropped and the total length
  /// never exceeds `max_events`.
  fn append(&self, event: Event, is_error: bool) {
    if is_error {
      self.errored.store(true, Ordering::Release);
    }
    let when = event.when();
    let mut events = self.events.write().expect("events lock poisoned");
    if events.len() >= self.max_events {
      if self.truncated.load(Ordering::Acquire) {
        events.remove(1.min(events.len().saturating_sub(1)));
      } else {
        events.remove(0);
        events.insert(0, Event::truncation_marker(when));
        self.truncated.store(true, Ordering::Release);
        events.remove(1.min(events.len().saturating_sub(1)));
      }
    }
    events.push(event);
  }

  /// Idempotent terminal transition; freezes `Duration` (§4.1).
  pub fn finish(&self) {
    if self.is_noop {
      return;
    }
    if !self.finished.swap(true, Ordering::AcqRel) {
      let elapsed = self.started_at.elapsed();
      *self.frozen_duration.lock().expect("duration mutex poisoned") = Some(elapsed);
    }
  }
}

impl Traceable for Trace {
  fn trace(&self) -> &Trace {
    self
  }

  fn tracef(&self, message: String) {
    Trace::tracef(self, message);
  }

  fn errorf(&self, message: String) {
    Trace::errorf(self, message);
  }

  fn lazy_tracef(&self, thunk: Box<dyn FnOnce() -> String + Send>) {
    Trace::lazy_tracef(self, thunk);
  }

  fn lazy_errorf(&self, thunk: Box<dyn FnOnce() -> String + Send>) {
    Trace::lazy_errorf(self, thunk);
  }

  fn finish(&self) {
    Trace::finish(self);
  }
}
