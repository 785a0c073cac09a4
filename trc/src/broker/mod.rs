//! Broker: in-process pub/sub over trace values, with per-subscriber
//! filtering and drop accounting, and a fast no-op path when idle (§4.7).

use crate::filter::CompiledFilter;
use crate::snapshot::StreamSnapshot;
use crate::trace::Trace;
use crossbeam_channel::{Sender, TrySendError};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Condvar, Mutex};

/// Default max items buffered per subscriber before `Publish` starts
/// dropping for that subscriber (§6 "Max subscriber send buffer").
pub const MAX_SUBSCRIBER_BUFFER: usize = 100_000;

/// Per-subscriber counters: skipped (filtered out), sent, and dropped
/// (channel full) publications.
#[derive(Debug, Default, Clone, Copy, serde::Serialize, serde::Deserialize)]
pub struct SubscriberStats {
  pub skips: u64,
  pub sends: u64,
  pub drops: u64,
}

struct Counters {
  skips: AtomicU64,
  sends: AtomicU64,
  drops: AtomicU64,
}

impl Counters {
  fn new() -> Self {
    Self {
      skips: AtomicU64::new(0),
      sends: AtomicU64::new(0),
      drops: AtomicU64::new(0),
    }
  }

  fn snapshot(&self) -> SubscriberStats {
    SubscriberStats {
      skips: self.skips.load(Ordering::Relaxed),
      sends: self.sends.load(Ordering::Relaxed),
      drops: self.drops.load(Ordering::Relaxed),
    }
  }
}

struct Subscriber {
  filter: CompiledFilter,
  sender: Sender<StreamSnapshot>,
  counters: Arc<Counters>,
  overflowing: AtomicBool,
}

/// Pub/sub broker distributing traces to filtered in-process subscribers.
/// `Publish` never blocks on a slow consumer (§4.7, §8 properties 8–9).
///
/// Subscribers are kept in a flat `Vec` rather than a map: `crossbeam_channel::Sender`
/// has no `Hash` impl, only `Sender::same_channel` identity comparison, and
/// subscriber counts are expected to stay in the tens (one per live
/// operator stream), so a linear scan is the right tool, not a premature
/// index.
pub struct Broker {
  subscribers: Mutex<Vec<Subscriber>>,
  active: AtomicBool,
}

impl Default for Broker {
  fn default() -> Self {
    Self::new()
  }
}

impl Broker {
  pub fn new() -> Self {
    Self {
      subscribers: Mutex::new(Vec::new()),
      active: AtomicBool::new(false),
    }
  }

  /// Fast-returns if there are no subscribers. Otherwise converts `trace`
  /// to a [`StreamSnapshot`] once and, holding the broker lock over the
  /// send loop (so a single trace's events stay ordered per subscriber,
  /// §5), offers it to every subscriber whose filter allows it via a
  /// non-blocking send.
  pub fn publish(&self, trace: &Trace) {
    if !self.active.load(Ordering::Acquire) {
      return;
    }
    let snapshot = StreamSnapshot::of(trace);
    let trace_snap_for_filter = crate::snapshot::TraceSnapshot::of(trace);

    let mut subscribers = self.subscribers.lock().expect("broker lock poisoned");
    if subscribers.is_empty() {
      return;
    }
    for sub in subscribers.iter_mut() {
      if !sub.filter.allow(&trace_snap_for_filter) {
        sub.counters.skips.fetch_add(1, Ordering::Relaxed);
        continue;
      }
      match sub.sender.try_send(snapshot.clone()) {
        Ok(()) => {
          sub.counters.sends.fetch_add(1, Ordering::Relaxed);
          sub.overflowing.store(false, Ordering::Relaxed);
        },
        Err(TrySendError::Full(_)) => {
          sub.counters.drops.fetch_add(1, Ordering::Relaxed);
          if !sub.overflowing.swap(true, Ordering::Relaxed) {
            tracing::warn!("broker subscriber channel overflowed, dropping");
          }
        },
        Err(TrySendError::Disconnected(_)) => {
          sub.counters.drops.fetch_add(1, Ordering::Relaxed);
        },
      }
    }
  }

  /// Registers `(filter, sender)` and blocks until `cancel` is signalled,
  /// then unregisters and returns the subscriber's final stats. This is the
  /// subscription lifecycle contract: it lasts exactly as long as the
  /// caller keeps the subscription alive (§4.7).
  pub fn subscribe(&self, filter: CompiledFilter, sender: Sender<StreamSnapshot>, cancel: &Cancellation) -> crate::Result<SubscriberStats> {
    let counters = Arc::new(Counters::new());
    {
      let mut subscribers = self.subscribers.lock().expect("broker lock poisoned");
      if subscribers.iter().any(|s| s.sender.same_channel(&sender)) {
        return Err(crate::TraceError::DuplicateSubscriber);
      }
      subscribers.push(Subscriber {
        filter,
        sender: sender.clone(),
        counters: counters.clone(),
        overflowing: AtomicBool::new(false),
      });
      self.active.store(true, Ordering::Release);
    }

    cancel.wait();

    let mut subscribers = self.subscribers.lock().expect("broker lock poisoned");
    subscribers.retain(|s| !s.sender.same_channel(&sender));
    self.active.store(!subscribers.is_empty(), Ordering::Release);
    Ok(counters.snapshot())
  }

  /// Number of currently registered subscribers.
  pub fn subscriber_count(&self) -> usize {
    self.subscribers.lock().expect("broker lock poisoned").len()
  }

  /// Read-only snapshot of a subscriber's counters, identified by the same
  /// sender used at subscribe time.
  pub fn stats(&self, sender: &Sender<StreamSnapshot>) -> Option<SubscriberStats> {
    self
      .subscribers
      .lock()
      .expect("broker lock poisoned")
      .iter()
      .find(|s| s.sender.same_channel(sender))
      .map(|s| s.counters.snapshot())
  }
}

/// Minimal cancellation token standing in for a cancellable context:
/// [`Broker::subscribe`] blocks on [`Cancellation::wait`] for the caller's
/// chosen lifetime and wakes promptly once [`Cancellation::cancel`] is
/// called (§5 "a cancelled context passed to Subscribe must unblock
/// promptly").
#[derive(Default)]
pub struct Cancellation {
  inner: Mutex<bool>,
  condvar: Condvar,
}

impl Cancellation {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn cancel(&self) {
    *self.inner.lock().expect("cancellation mutex poisoned") = true;
    self.condvar.notify_all();
  }

  pub fn is_cancelled(&self) -> bool {
    *self.inner.lock().expect("cancellation mutex poisoned")
  }

  fn wait(&self) {
    let guard = self.inner.lock().expect("cancellation mutex poisoned");
    let _unused = self
      .condvar
      .wait_while(guard, |cancelled| !*cancelled)
      .expect("cancellation mutex poisoned");
  }
}

mod __test__;
