#[cfg(test)]
mod __test__ {

  use crate::event::Event;
  use chrono::Utc;
  use std::sync::atomic::{AtomicUsize, Ordering};
  use std::sync::Arc;

  #[test]
  fn test_eager_event_returns_stored_text() {
    let event = Event::eager(Utc::now(), "hello".to_string(), false, Vec::new());
    assert_eq!(event.what(), "hello");
    assert!(!event.is_error());
  }

  #[test]
  fn test_lazy_event_defers_until_first_read() {
    let calls = Arc::new(AtomicUsize::new(0));
    let calls_in_thunk = calls.clone();
    let event = Event::lazy(
      Utc::now(),
      Box::new(move || {
        calls_in_thunk.fetch_add(1, Ordering::SeqCst);
        "rendered".to_string()
      }),
      true,
      Vec::new(),
    );
    assert_eq!(calls.load(Ordering::SeqCst), 0);
    assert_eq!(event.what(), "rendered");
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    // second read must not re-invoke the thunk
    assert_eq!(event.what(), "rendered");
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert!(event.is_error());
  }

  #[test]
  fn test_snapshot_resolves_lazy_text() {
    let event = Event::lazy(Utc::now(), Box::new(|| "x".to_string()), false, Vec::new());
    let snap = event.snapshot();
    assert_eq!(snap.what, "x");
  }

  #[test]
  fn test_truncation_marker_has_no_stack() {
    let event = Event::truncation_marker(Utc::now());
    assert!(event.stack().is_empty());
    assert!(!event.is_error());
    assert_eq!(event.what(), "(earlier events truncated)");
  }
}
