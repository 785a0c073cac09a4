#[cfg(test)]
mod __test__ {

  use crate::ring::RingBuffer;

  #[test]
  fn test_new_buffer_is_empty() {
    let buf: RingBuffer<i32> = RingBuffer::new(3);
    assert_eq!(buf.capacity(), 3);
    assert!(buf.is_empty());
  }

  #[test]
  fn test_add_under_capacity_does_not_drop() {
    let buf = RingBuffer::new(3);
    assert_eq!(buf.add(1), (None, false));
    assert_eq!(buf.add(2), (None, false));
    assert_eq!(buf.len(), 2);
  }

  #[test]
  fn test_add_past_capacity_drops_oldest() {
    let buf = RingBuffer::new(2);
    buf.add(1);
    buf.add(2);
    let (dropped, did_drop) = buf.add(3);
    assert_eq!(dropped, Some(1));
    assert!(did_drop);
    assert_eq!(buf.snapshot(), vec![3, 2]);
  }

  #[test]
  fn test_walk_visits_most_recent_first() {
    let buf = RingBuffer::new(5);
    buf.add(1);
    buf.add(2);
    buf.add(3);
    let mut seen = Vec::new();
    buf.walk(|v| seen.push(*v));
    assert_eq!(seen, vec![3, 2, 1]);
  }

  #[test]
  fn test_set_capacity_shrinks_and_returns_dropped() {
    let buf = RingBuffer::new(5);
    for i in 0..5 {
      buf.add(i);
    }
    let dropped = buf.set_capacity(2);
    assert_eq!(dropped, vec![0, 1, 2]);
    assert_eq!(buf.snapshot(), vec![4, 3]);
    assert_eq!(buf.capacity(), 2);
  }

  #[test]
  fn test_capacity_zero_clamps_to_one() {
    let buf: RingBuffer<i32> = RingBuffer::new(0);
    assert_eq!(buf.capacity(), 1);
  }
}
