//! RingBuffers (keyed): mapping from category name to its ring buffer
//! (§3, §4.2).

use crate::error::{Result, TraceError};
use crate::ring::RingBuffer;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};

pub const MIN_CAPACITY: usize = 1;
pub const DEFAULT_CAPACITY: usize = 1000;
pub const MAX_CAPACITY: usize = 10_000;

fn check_capacity(requested: usize) -> Result<usize> {
  if requested < MIN_CAPACITY || requested > MAX_CAPACITY {
    return Err(TraceError::InvalidCapacity {
      requested,
      min: MIN_CAPACITY,
      max: MAX_CAPACITY,
    });
  }
  Ok(requested)
}

pub struct RingBuffers<T> {
  buffers: RwLock<HashMap<String, Arc<RingBuffer<T>>>>,
  default_capacity: AtomicUsize,
}

impl<T> RingBuffers<T> {
  pub fn new(default_capacity: usize) -> Result<Self> {
    let default_capacity = check_capacity(default_capacity)?;
    Ok(Self {
      buffers: RwLock::new(HashMap::new()),
      default_capacity: AtomicUsize::new(default_capacity),
    })
  }

  /// Returns the buffer for `key`, creating it with the current default
  /// capacity if absent.
  pub fn get_or_create(&self, key: &str) -> Arc<RingBuffer<T>> {
    if let Some(existing) = self.buffers.read().expect("ring set lock poisoned").get(key) {
      return existing.clone();
    }
    let mut guard = self.buffers.write().expect("ring set lock poisoned");
    guard
      .entry(key.to_string())
      .or_insert_with(|| Arc::new(RingBuffer::new(self.default_capacity.load(Ordering::Acquire))))
      .clone()
  }

  /// Point-in-time view of (key, buffer) pairs; buffers are live references.
  pub fn get_all(&self) -> Vec<(String, Arc<RingBuffer<T>>)> {
    self
      .buffers
      .read()
      .expect("ring set lock poisoned")
      .iter()
      .map(|(k, v)| (k.clone(), v.clone()))
      .collect()
  }

  /// Atomically sets a new capacity on every buffer and returns everything
  /// that overflowed.
  pub fn resize(&self, new_capacity: usize) -> Result<Vec<T>> {
    let new_capacity = check_capacity(new_capacity)?;
    self.default_capacity.store(new_capacity, Ordering::Release);
    let mut dropped = Vec::new();
    for (_, buffer) in self.buffers.read().expect("ring set lock poisoned").iter() {
      dropped.extend(buffer.set_capacity(new_capacity));
    }
    Ok(dropped)
  }
}

mod __test__;
