#[cfg(test)]
mod __test__ {

  use crate::error::TraceError;
  use crate::ring_set::RingBuffers;

  #[test]
  fn test_new_rejects_zero_capacity() {
    let err = RingBuffers::<i32>::new(0).unwrap_err();
    assert!(matches!(err, TraceError::InvalidCapacity { requested: 0, .. }));
  }

  #[test]
  fn test_new_rejects_capacity_above_max() {
    assert!(RingBuffers::<i32>::new(10_001).is_err());
  }

  #[test]
  fn test_get_or_create_is_idempotent_per_key() {
    let set = RingBuffers::<i32>::new(5).unwrap();
    let a = set.get_or_create("foo");
    let b = set.get_or_create("foo");
    a.add(1);
    assert_eq!(b.snapshot(), vec![1], "same key must share the same buffer");
  }

  #[test]
  fn test_distinct_keys_get_distinct_buffers() {
    let set = RingBuffers::<i32>::new(5).unwrap();
    set.get_or_create("a").add(1);
    set.get_or_create("b").add(2);
    assert_eq!(set.get_all().len(), 2);
  }

  #[test]
  fn test_resize_truncates_all_buffers_and_returns_dropped() {
    let set = RingBuffers::<i32>::new(5).unwrap();
    let a = set.get_or_create("a");
    for i in 0..5 {
      a.add(i);
    }
    let dropped = set.resize(2).unwrap();
    assert_eq!(dropped, vec![0, 1, 2]);
    assert_eq!(a.capacity(), 2);

    // new categories created after resize pick up the new default
    let b = set.get_or_create("b");
    assert_eq!(b.capacity(), 2);
  }

  #[test]
  fn test_resize_out_of_bounds_is_rejected() {
    let set = RingBuffers::<i32>::new(5).unwrap();
    assert!(set.resize(0).is_err());
    assert!(set.resize(10_001).is_err());
  }
}
