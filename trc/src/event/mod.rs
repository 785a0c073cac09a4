//! Event & Frame: an immutable textual event with a captured call site.
//!
//! An [`Event`]'s `What` may be rendered lazily — the formatting cost is
//! deferred to first read and cached, so a hot path that calls
//! [`crate::trace::Trace::lazy_tracef`] pays nothing for events nobody ever
//! looks at.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::{Mutex, OnceLock};

/// Number of frames to skip when capturing a call-site stack: this function,
/// the `Trace` append method that called it, and the `Event` constructor.
/// Approximate — backtrace inlining can shift it by a frame or two, which is
/// harmless here since frames are for humans, not program logic.
const CAPTURE_SKIP_FRAMES: usize = 3;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Frame {
  pub function: String,
  pub file_line: String,
}

pub(crate) fn capture_stack(depth: usize) -> Vec<Frame> {
  if depth == 0 {
    return Vec::new();
  }
  let mut frames = Vec::with_capacity(depth);
  let mut seen = 0usize;
  backtrace::trace(|frame| {
    seen += 1;
    if seen <= CAPTURE_SKIP_FRAMES {
      return true;
    }
    let mut resolved = false;
    backtrace::resolve_frame(frame, |symbol| {
      resolved = true;
      let function = symbol
        .name()
        .map(|n| n.to_string())
        .unwrap_or_else(|| "<unknown>".to_string());
      let file_line = match (symbol.filename(), symbol.lineno()) {
        (Some(f), Some(l)) => format!("{}:{l}", f.display()),
        (Some(f), None) => f.display().to_string(),
        (None, _) => String::new(),
      };
      frames.push(Frame { function, file_line });
    });
    if !resolved {
      frames.push(Frame {
        function: "<unresolved>".to_string(),
        file_line: String::new(),
      });
    }
    frames.len() < depth
  });
  frames
}

enum Text {
  Eager(String),
  Lazy(LazyText),
}

struct LazyText {
  cell: OnceLock<String>,
  thunk: Mutex<Option<Box<dyn FnOnce() -> String + Send>>>,
}

impl LazyText {
  fn new(thunk: Box<dyn FnOnce() -> String + Send>) -> Self {
    Self {
      cell: OnceLock::new(),
      thunk: Mutex::new(Some(thunk)),
    }
  }

  fn resolve(&self) -> &str {
    self.cell.get_or_init(|| {
      let thunk = self
        .thunk
        .lock()
        .expect("lazy event text mutex poisoned")
        .take()
        .expect("lazy event text resolved twice without a cached value");
      thunk()
    })
  }
}

/// One append-only log line within a trace. See module docs for the lazy
/// formatting contract.
pub struct Event {
  when: DateTime<Utc>,
  text: Text,
  is_error: bool,
  stack: Vec<Frame>,
}

impl Event {
  pub(crate) fn eager(when: DateTime<Utc>, what: String, is_error: bool, stack: Vec<Frame>) -> Self {
    Self {
      when,
      text: Text::Eager(what),
      is_error,
      stack,
    }
  }

  pub(crate) fn lazy(
    when: DateTime<Utc>,
    thunk: Box<dyn FnOnce() -> String + Send>,
    is_error: bool,
    stack: Vec<Frame>,
  ) -> Self {
    Self {
      when,
      text: Text::Lazy(LazyText::new(thunk)),
      is_error,
      stack,
    }
  }

  /// Synthetic marker inserted when a trace's per-trace event bound is
  /// exceeded, replacing the oldest dropped events (§3, Trace.Events).
  pub(crate) fn truncation_marker(when: DateTime<Utc>) -> Self {
    Self::eager(when, "(earlier events truncated)".to_string(), false, Vec::new())
  }

  pub fn when(&self) -> DateTime<Utc> {
    self.when
  }

  pub fn is_error(&self) -> bool {
    self.is_error
  }

  pub fn stack(&self) -> &[Frame] {
    &self.stack
  }

  /// Renders (and, for lazy events, caches) the event text.
  pub fn what(&self) -> &str {
    match &self.text {
      Text::Eager(s) => s,
      Text::Lazy(lazy) => lazy.resolve(),
    }
  }

  pub fn snapshot(&self) -> EventSnapshot {
    EventSnapshot {
      when: self.when,
      what: self.what().to_string(),
      is_error: self.is_error,
      stack: self.stack.clone(),
    }
  }
}

/// Immutable, serializable view of an [`Event`] — always fully rendered,
/// since once it leaves the trace there is no later point to defer to.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EventSnapshot {
  pub when: DateTime<Utc>,
  pub what: String,
  pub is_error: bool,
  pub stack: Vec<Frame>,
}

mod __test__;
