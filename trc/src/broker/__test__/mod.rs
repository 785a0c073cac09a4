#[cfg(test)]
mod __test__ {
  use crate::broker::{Broker, Cancellation};
  use crate::filter::{CompiledFilter, Filter};
  use crate::trace::Trace;
  use std::sync::Arc;
  use std::thread;
  use std::time::Duration;

  fn new_trace(errored: bool) -> Trace {
    let t = Trace::new(1, Arc::from("svc"), Arc::from("cat"), 10, 0);
    if errored {
      t.errorf("boom");
    } else {
      t.tracef("ok");
    }
    t
  }

  #[test]
  fn test_publish_with_no_subscribers_is_a_fast_noop() {
    let broker = Broker::new();
    broker.publish(&new_trace(false));
  }

  /// Scenario S4: subscribe with filter {IsErrored: true} and a buffer-1
  /// channel, publish ten non-errored then one errored. Skips=10, Sends=1,
  /// Drops=0.
  #[test]
  fn test_scenario_s4_filtered_subscriber_counters() {
    let broker = Arc::new(Broker::new());
    let (tx, rx) = crossbeam_channel::bounded(1);
    let cancel = Arc::new(Cancellation::new());

    let (filter, _) = Filter {
      is_errored: true,
      ..Default::default()
    }
    .normalize();

    let broker_sub = broker.clone();
    let cancel_sub = cancel.clone();
    let handle = thread::spawn(move || broker_sub.subscribe(filter, tx, &cancel_sub));

    // give the subscriber thread a moment to register.
    while broker.subscriber_count() == 0 {
      thread::yield_now();
    }

    for _ in 0..10 {
      broker.publish(&new_trace(false));
    }
    broker.publish(&new_trace(true));

    cancel.cancel();
    let stats = handle.join().unwrap().unwrap();
    assert_eq!(stats.skips, 10);
    assert_eq!(stats.sends, 1);
    assert_eq!(stats.drops, 0);
    assert_eq!(rx.len(), 1);
  }

  #[test]
  fn test_duplicate_subscribe_is_rejected_while_first_is_live() {
    let broker = Arc::new(Broker::new());
    let (tx, _rx) = crossbeam_channel::bounded(4);
    let cancel = Arc::new(Cancellation::new());

    let broker_sub = broker.clone();
    let cancel_sub = cancel.clone();
    let tx_sub = tx.clone();
    let handle = thread::spawn(move || broker_sub.subscribe(CompiledFilter::all(), tx_sub, &cancel_sub));

    while broker.subscriber_count() == 0 {
      thread::yield_now();
    }

    let err = broker.subscribe(CompiledFilter::all(), tx, &Cancellation::new());
    assert!(matches!(err, Err(crate::TraceError::DuplicateSubscriber)));

    cancel.cancel();
    handle.join().unwrap().unwrap();
  }

  #[test]
  fn test_broker_no_drop_when_buffer_covers_publish_count() {
    let broker = Arc::new(Broker::new());
    let (tx, rx) = crossbeam_channel::bounded(5);
    let cancel = Arc::new(Cancellation::new());

    let broker_sub = broker.clone();
    let cancel_sub = cancel.clone();
    let handle = thread::spawn(move || broker_sub.subscribe(CompiledFilter::all(), tx, &cancel_sub));

    while broker.subscriber_count() == 0 {
      thread::yield_now();
    }

    for _ in 0..5 {
      broker.publish(&new_trace(false));
    }
    cancel.cancel();
    let stats = handle.join().unwrap().unwrap();
    assert_eq!(stats.drops, 0);
    assert_eq!(stats.sends, 5);
    assert_eq!(rx.len(), 5);
  }

  #[test]
  fn test_publish_does_not_block_when_subscriber_buffer_is_full() {
    let broker = Arc::new(Broker::new());
    let (tx, _rx) = crossbeam_channel::bounded(1);
    let cancel = Arc::new(Cancellation::new());

    let broker_sub = broker.clone();
    let cancel_sub = cancel.clone();
    let handle = thread::spawn(move || broker_sub.subscribe(CompiledFilter::all(), tx, &cancel_sub));

    while broker.subscriber_count() == 0 {
      thread::yield_now();
    }

    let start = std::time::Instant::now();
    for _ in 0..1000 {
      broker.publish(&new_trace(false));
    }
    assert!(start.elapsed() < Duration::from_secs(1));

    cancel.cancel();
    let stats = handle.join().unwrap().unwrap();
    assert!(stats.drops > 0);
  }
}
