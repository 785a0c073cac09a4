//! Decorators: wrap a [`Traceable`] and fire a side effect on each mutating
//! method before delegating (§4.9).
//!
//! Decorators compose: wrapping `Trace` in decorator `A` then decorator `B`
//! produces a chain whose outermost layer (`B`) is what the caller installs
//! in the context, and whose delegation order runs innermost-last — `B`'s
//! side effect fires, then it calls through to `A`, which fires its own
//! side effect and calls through to the bare trace.

use crate::broker::Broker;
use crate::trace::{Trace, Traceable};
use std::io::Write;
use std::sync::{Arc, Mutex};

/// Publishes to a [`Broker`] on `finish()` only; individual events are not
/// published (§4.9).
pub struct PublishCompleteDecorator {
  inner: Arc<dyn Traceable>,
  broker: Arc<Broker>,
}

impl PublishCompleteDecorator {
  pub fn wrap(inner: Arc<dyn Traceable>, broker: Arc<Broker>) -> Arc<dyn Traceable> {
    Arc::new(Self { inner, broker })
  }
}

impl Traceable for PublishCompleteDecorator {
  fn trace(&self) -> &Trace {
    self.inner.trace()
  }

  fn tracef(&self, message: String) {
    self.inner.tracef(message);
  }

  fn errorf(&self, message: String) {
    self.inner.errorf(message);
  }

  fn lazy_tracef(&self, thunk: Box<dyn FnOnce() -> String + Send>) {
    self.inner.lazy_tracef(thunk);
  }

  fn lazy_errorf(&self, thunk: Box<dyn FnOnce() -> String + Send>) {
    self.inner.lazy_errorf(thunk);
  }

  /// Runs the underlying `finish()` first so the broker observes a trace
  /// that is already in its finished state (§9 design notes).
  fn finish(&self) {
    self.inner.finish();
    self.broker.publish(self.inner.trace());
  }
}

/// Publishes on `finish()` **and** on every event append. Callers are
/// warned this can dominate application cost at high event rates (§4.9).
pub struct PublishEventsDecorator {
  inner: Arc<dyn Traceable>,
  broker: Arc<Broker>,
}

impl PublishEventsDecorator {
  pub fn wrap(inner: Arc<dyn Traceable>, broker: Arc<Broker>) -> Arc<dyn Traceable> {
    Arc::new(Self { inner, broker })
  }
}

impl Traceable for PublishEventsDecorator {
  fn trace(&self) -> &Trace {
    self.inner.trace()
  }

  fn tracef(&self, message: String) {
    self.inner.tracef(message);
    self.broker.publish(self.inner.trace());
  }

  fn errorf(&self, message: String) {
    self.inner.errorf(message);
    self.broker.publish(self.inner.trace());
  }

  fn lazy_tracef(&self, thunk: Box<dyn FnOnce() -> String + Send>) {
    self.inner.lazy_tracef(thunk);
    self.broker.publish(self.inner.trace());
  }

  fn lazy_errorf(&self, thunk: Box<dyn FnOnce() -> String + Send>) {
    self.inner.lazy_errorf(thunk);
    self.broker.publish(self.inner.trace());
  }

  fn finish(&self) {
    self.inner.finish();
    self.broker.publish(self.inner.trace());
  }
}

/// Writes a terse `<id> <level> <text>` line to a supplied sink on create,
/// every event, and finish (§4.9). The sink is boxed behind a mutex since
/// `Write` implementors are rarely `Sync`.
pub struct LogDecorator {
  inner: Arc<dyn Traceable>,
  sink: Mutex<Box<dyn Write + Send>>,
}

impl LogDecorator {
  pub fn wrap(inner: Arc<dyn Traceable>, sink: Box<dyn Write + Send>) -> Arc<dyn Traceable> {
    let decorator = Self {
      sink: Mutex::new(sink),
      inner,
    };
    decorator.write_line("create", "");
    Arc::new(decorator)
  }

  fn write_line(&self, level: &str, text: &str) {
    let id = self.inner.trace().id();
    let mut sink = self.sink.lock().expect("log decorator sink mutex poisoned");
    if let Err(e) = writeln!(sink, "{id} {level} {text}") {
      tracing::warn!(error = %e, "log decorator failed to write");
    }
  }
}

impl Traceable for LogDecorator {
  fn trace(&self) -> &Trace {
    self.inner.trace()
  }

  fn tracef(&self, message: String) {
    self.write_line("trace", &message);
    self.inner.tracef(message);
  }

  fn errorf(&self, message: String) {
    self.write_line("error", &message);
    self.inner.errorf(message);
  }

  fn lazy_tracef(&self, thunk: Box<dyn FnOnce() -> String + Send>) {
    // lazy text is deferred by design; the log line renders eagerly here
    // since the sink write itself happens at append time, not at read time.
    let rendered = thunk();
    self.write_line("trace", &rendered);
    self.inner.tracef(rendered);
  }

  fn lazy_errorf(&self, thunk: Box<dyn FnOnce() -> String + Send>) {
    let rendered = thunk();
    self.write_line("error", &rendered);
    self.inner.errorf(rendered);
  }

  fn finish(&self) {
    self.inner.finish();
    self.write_line("finish", "");
  }
}
