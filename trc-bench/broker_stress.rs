use std::sync::Arc;
use std::thread;
use std::time::Instant;
use trc::broker::{Broker, Cancellation};
use trc::collector::Collector;
use trc::context::Context;
use trc::filter::CompiledFilter;

fn main() {
  println!("broker stress test");
  println!("====================");
  println!();

  stress_many_subscribers_no_drop();
  stress_slow_subscriber_never_blocks_publisher();

  println!("done.");
}

fn stress_many_subscribers_no_drop() {
  let broker = Arc::new(Broker::new());
  let collector = Collector::new("stress", 10).unwrap();
  let subscriber_count = 32;
  let publishes = 1_000;

  let cancel = Arc::new(Cancellation::new());
  let handles: Vec<_> = (0..subscriber_count)
    .map(|_| {
      let broker = broker.clone();
      let cancel = cancel.clone();
      let (tx, rx) = crossbeam_channel::bounded(publishes);
      thread::spawn(move || {
        let stats = broker.subscribe(CompiledFilter::all(), tx, &cancel).unwrap();
        (stats, rx)
      })
    })
    .collect();

  while broker.subscriber_count() < subscriber_count {
    thread::yield_now();
  }

  let start = Instant::now();
  for _ in 0..publishes {
    let ctx = Context::new();
    let (_, trace) = collector.new_trace(&ctx, "broker");
    trace.tracef("ping".to_string());
    broker.publish(trace.trace());
  }
  let elapsed = start.elapsed();
  cancel.cancel();

  let mut total_drops = 0;
  for handle in handles {
    let (stats, rx) = handle.join().unwrap();
    total_drops += stats.drops;
    assert_eq!(rx.len() as u64, stats.sends);
  }
  println!(
    "{subscriber_count} subscribers, {publishes} publishes in {:?}, total drops = {total_drops}",
    elapsed
  );
}

fn stress_slow_subscriber_never_blocks_publisher() {
  let broker = Arc::new(Broker::new());
  let collector = Collector::new("stress", 10).unwrap();
  let cancel = Arc::new(Cancellation::new());
  let (tx, _rx) = crossbeam_channel::bounded(1);

  let broker_sub = broker.clone();
  let cancel_sub = cancel.clone();
  let handle = thread::spawn(move || broker_sub.subscribe(CompiledFilter::all(), tx, &cancel_sub));

  while broker.subscriber_count() == 0 {
    thread::yield_now();
  }

  let start = Instant::now();
  for _ in 0..100_000 {
    let ctx = Context::new();
    let (_, trace) = collector.new_trace(&ctx, "broker");
    broker.publish(trace.trace());
  }
  let elapsed = start.elapsed();
  cancel.cancel();
  let stats = handle.join().unwrap().unwrap();
  println!(
    "100000 publishes against a buffer-1 subscriber in {:?} (sends={}, drops={})",
    elapsed, stats.sends, stats.drops
  );
}
