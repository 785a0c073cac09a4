use std::sync::Arc;
use std::thread;
use std::time::Instant;
use trc::collector::Collector;
use trc::context::Context;
use trc::search::SearchRequest;

fn main() {
  println!("collector stress test");
  println!("======================");
  println!();

  stress_single_threaded_append();
  stress_concurrent_producers();
  stress_search_under_load();

  println!("done.");
}

fn stress_single_threaded_append() {
  let collector = Collector::new("stress", 10_000).unwrap();
  let n = 200_000;
  let start = Instant::now();
  for i in 0..n {
    let ctx = Context::new();
    let (_, trace) = collector.new_trace(&ctx, "append");
    trace.tracef(format!("iteration {i}"));
    trace.finish();
  }
  let elapsed = start.elapsed();
  println!(
    "single-threaded append: {n} traces in {:?} ({:.0} traces/sec)",
    elapsed,
    n as f64 / elapsed.as_secs_f64()
  );
}

fn stress_concurrent_producers() {
  let collector = Arc::new(Collector::new("stress", 5_000).unwrap());
  let producers = 8;
  let per_producer = 20_000;
  let start = Instant::now();

  let handles: Vec<_> = (0..producers)
    .map(|p| {
      let collector = collector.clone();
      thread::spawn(move || {
        for i in 0..per_producer {
          let ctx = Context::new();
          let (_, trace) = collector.new_trace(&ctx, "concurrent");
          trace.tracef(format!("producer {p} event {i}"));
          if i % 97 == 0 {
            trace.errorf("simulated failure");
          }
          trace.finish();
        }
      })
    })
    .collect();

  for h in handles {
    h.join().unwrap();
  }
  let elapsed = start.elapsed();
  let total = producers * per_producer;
  println!(
    "concurrent producers: {total} traces across {producers} threads in {:?} ({:.0} traces/sec)",
    elapsed,
    total as f64 / elapsed.as_secs_f64()
  );
}

fn stress_search_under_load() {
  let collector = Arc::new(Collector::new("stress", 2_000).unwrap());
  for i in 0..2_000 {
    let ctx = Context::new();
    let (_, trace) = collector.new_trace(&ctx, "search-target");
    trace.tracef(format!("payload {i}"));
    trace.finish();
  }

  let collector_writer = collector.clone();
  let writer = thread::spawn(move || {
    for i in 0..50_000 {
      let ctx = Context::new();
      let (_, trace) = collector_writer.new_trace(&ctx, "search-target");
      trace.tracef(format!("more payload {i}"));
      trace.finish();
    }
  });

  let start = Instant::now();
  let mut searches = 0;
  while start.elapsed().as_secs() < 2 {
    let req = SearchRequest {
      limit: 50,
      ..Default::default()
    };
    let _ = collector.search(&req);
    searches += 1;
  }
  writer.join().unwrap();
  println!("search-under-load: {searches} searches completed while a writer was active");
}
