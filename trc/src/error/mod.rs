//! Fail-loud error taxonomy.
//!
//! Data-dependent failures (bad regex, missing sources, slow subscribers) never
//! produce a [`TraceError`] — they flow back through `Problems` lists and
//! counters instead. This type exists only for the handful of conditions that
//! are genuinely programmer errors: the caller asked the system to do
//! something internally inconsistent, and the right response is to refuse
//! loudly rather than silently degrade.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TraceError {
  #[error(
    "cannot merge stats with different bucketing: expected {expected} buckets, found {found}"
  )]
  StatsBucketingMismatch { expected: usize, found: usize },

  #[error("channel is already subscribed to this broker")]
  DuplicateSubscriber,

  #[error("invalid ring buffer capacity {requested}: must be between {min} and {max}")]
  InvalidCapacity {
    requested: usize,
    min: usize,
    max: usize,
  },
}

pub type Result<T> = std::result::Result<T, TraceError>;

mod __test__;
