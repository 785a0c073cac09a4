//! Ambient trace and prefix/region helpers (§4.9 overview row, §9 design
//! notes, §11 supplemented features).
//!
//! The core needs a way to carry one current trace along a call chain
//! without threading a parameter through every function. `Context` models
//! Go's `context.Context` as an immutable, cheaply-cloned value with a typed
//! slot: `current()` returns a no-op trace if unset so call sites stay
//! unconditional, and `with_trace` returns a derived context with the slot
//! occupied rather than mutating the original.

use crate::trace::{Trace, Traceable};
use std::sync::Arc;

#[derive(Clone, Default)]
pub struct Context {
  handle: Option<Arc<dyn Traceable>>,
  prefixes: Vec<Arc<str>>,
}

impl Context {
  pub fn new() -> Self {
    Self::default()
  }

  /// The ambient trace handle, or `None` if nothing has been installed yet
  /// (as opposed to [`Context::current`], which substitutes a no-op).
  pub fn handle(&self) -> Option<Arc<dyn Traceable>> {
    self.handle.clone()
  }

  /// The ambient trace handle, falling back to [`Trace::noop`] so callers
  /// never need to special-case "no trace in scope".
  pub fn current(&self) -> Arc<dyn Traceable> {
    self
      .handle
      .clone()
      .unwrap_or_else(|| Trace::noop() as Arc<dyn Traceable>)
  }

  /// Derives a new context with the trace slot occupied; the receiver is
  /// unchanged.
  pub fn with_trace(&self, handle: Arc<dyn Traceable>) -> Self {
    let mut next = self.clone();
    next.handle = Some(handle);
    next
  }

  /// Derives a new context with an additional bracketed prefix applied to
  /// subsequently rendered eager event text (`context::Region`-style
  /// nesting from the original `trc` library).
  pub fn with_prefix(&self, prefix: impl Into<Arc<str>>) -> Self {
    let mut next = self.clone();
    next.prefixes.push(prefix.into());
    next
  }

  fn render(&self, message: &str) -> String {
    if self.prefixes.is_empty() {
      return message.to_string();
    }
    let mut out = String::new();
    for prefix in &self.prefixes {
      out.push('[');
      out.push_str(prefix);
      out.push_str("] ");
    }
    out.push_str(message);
    out
  }

  pub fn tracef(&self, message: impl Into<String>) {
    self.current().tracef(self.render(&message.into()));
  }

  pub fn errorf(&self, message: impl Into<String>) {
    self.current().errorf(self.render(&message.into()));
  }

  pub fn lazy_tracef<F>(&self, thunk: F)
  where
    F: FnOnce() -> String + Send + 'static,
  {
    let this = self.clone();
    self
      .current()
      .lazy_tracef(Box::new(move || this.render(&thunk())));
  }

  pub fn lazy_errorf<F>(&self, thunk: F)
  where
    F: FnOnce() -> String + Send + 'static,
  {
    let this = self.clone();
    self
      .current()
      .lazy_errorf(Box::new(move || this.render(&thunk())));
  }
}

mod __test__;
