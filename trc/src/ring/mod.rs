//! A fixed-capacity FIFO of values belonging to one category (§3, §4.2).

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

pub struct RingBuffer<T> {
  inner: Mutex<VecDeque<T>>,
  capacity: AtomicUsize,
}

impl<T> RingBuffer<T> {
  pub fn new(capacity: usize) -> Self {
    let capacity = capacity.max(1);
    Self {
      inner: Mutex::new(VecDeque::with_capacity(capacity)),
      capacity: AtomicUsize::new(capacity),
    }
  }

  pub fn capacity(&self) -> usize {
    self.capacity.load(Ordering::Acquire)
  }

  pub fn len(&self) -> usize {
    self.inner.lock().expect("ring buffer lock poisoned").len()
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }

  /// Enqueues at head; if at capacity, evicts the oldest and returns it.
  pub fn add(&self, value: T) -> (Option<T>, bool) {
    let mut guard = self.inner.lock().expect("ring buffer lock poisoned");
    let cap = self.capacity.load(Ordering::Acquire);
    guard.push_back(value);
    if guard.len() > cap {
      let dropped = guard.pop_front();
      (dropped, true)
    } else {
      (None, false)
    }
  }

  /// Visits entries in most-recent-first order against a captured snapshot,
  /// so visitation is stable against concurrent `Add` (§4.2).
  pub fn walk<F: FnMut(&T)>(&self, mut f: F)
  where
    T: Clone,
  {
    let snapshot: Vec<T> = {
      let guard = self.inner.lock().expect("ring buffer lock poisoned");
      guard.iter().rev().cloned().collect()
    };
    for item in &snapshot {
      f(item);
    }
  }

  /// Most-recent-first copy of the current contents.
  pub fn snapshot(&self) -> Vec<T>
  where
    T: Clone,
  {
    let guard = self.inner.lock().expect("ring buffer lock poisoned");
    guard.iter().rev().cloned().collect()
  }

  /// Atomically sets a new capacity and returns everything that overflowed.
  pub fn set_capacity(&self, new_capacity: usize) -> Vec<T> {
    let new_capacity = new_capacity.max(1);
    let mut guard = self.inner.lock().expect("ring buffer lock poisoned");
    self.capacity.store(new_capacity, Ordering::Release);
    let mut dropped = Vec::new();
    while guard.len() > new_capacity {
      if let Some(v) = guard.pop_front() {
        dropped.push(v);
      }
    }
    dropped
  }
}

mod __test__;
