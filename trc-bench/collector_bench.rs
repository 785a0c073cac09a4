use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use std::time::Duration;
use trc::collector::Collector;
use trc::context::Context;
use trc::search::SearchRequest;

fn configure_criterion() -> Criterion {
  Criterion::default()
    .sample_size(30)
    .measurement_time(Duration::from_secs(5))
    .warm_up_time(Duration::from_secs(2))
}

fn bench_new_trace(c: &mut Criterion) {
  let collector = Collector::new("bench", 1000).unwrap();
  c.bench_function("collector_new_trace", |b| {
    b.iter(|| {
      let ctx = Context::new();
      let (_, trace) = collector.new_trace(&ctx, "bench-cat");
      trace.tracef("event".to_string());
      trace.finish();
    })
  });
}

fn bench_search_at_scale(c: &mut Criterion) {
  let mut group = c.benchmark_group("collector_search");
  for &n in &[100usize, 1_000, 10_000] {
    let collector = Collector::new("bench", n).unwrap();
    for i in 0..n {
      let ctx = Context::new();
      let (_, trace) = collector.new_trace(&ctx, "bench-cat");
      trace.tracef(format!("event {i}"));
      trace.finish();
    }
    group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, _| {
      b.iter(|| {
        let req = SearchRequest {
          limit: 50,
          ..Default::default()
        };
        collector.search(&req)
      })
    });
  }
  group.finish();
}

criterion_group! {
  name = benches;
  config = configure_criterion();
  targets = bench_new_trace, bench_search_at_scale
}
criterion_main!(benches);
