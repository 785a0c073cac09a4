#[cfg(test)]
mod __test__ {

  use crate::error::TraceError;

  #[test]
  fn test_stats_bucketing_mismatch_message() {
    let err = TraceError::StatsBucketingMismatch {
      expected: 8,
      found: 3,
    };
    assert_eq!(
      err.to_string(),
      "cannot merge stats with different bucketing: expected 8 buckets, found 3"
    );
  }

  #[test]
  fn test_duplicate_subscriber_message() {
    let err = TraceError::DuplicateSubscriber;
    assert_eq!(err.to_string(), "channel is already subscribed to this broker");
  }

  #[test]
  fn test_invalid_capacity_message() {
    let err = TraceError::InvalidCapacity {
      requested: 0,
      min: 1,
      max: 10_000,
    };
    assert_eq!(
      err.to_string(),
      "invalid ring buffer capacity 0: must be between 1 and 10000"
    );
  }
}
