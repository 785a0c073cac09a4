#[cfg(test)]
mod __test__ {
  use crate::collector::Collector;
  use crate::context::Context;
  use crate::filter::Filter;
  use crate::search::SearchRequest;

  #[test]
  fn test_new_trace_without_ambient_context_creates_fresh_trace() {
    let collector = Collector::new("svc", 10).unwrap();
    let ctx = Context::new();
    let (next_ctx, trace) = collector.new_trace(&ctx, "cat");
    assert!(next_ctx.handle().is_some());
    trace.tracef("hello".to_string());
  }

  #[test]
  fn test_new_trace_with_ambient_context_reuses_existing_trace() {
    let collector = Collector::new("svc", 10).unwrap();
    let ctx = Context::new();
    let (ctx1, first) = collector.new_trace(&ctx, "outer");
    let (ctx2, second) = collector.new_trace(&ctx1, "inner");
    assert_eq!(first.trace().id(), second.trace().id());
    assert!(ctx2.handle().is_some());

    let req = SearchRequest {
      filter: Filter {
        category: "outer".into(),
        ..Default::default()
      },
      limit: 10,
      ..Default::default()
    };
    let resp = collector.search(&req);
    assert_eq!(resp.traces.len(), 1);
    assert!(resp.traces[0]
      .events
      .iter()
      .any(|e| e.what.contains("(+ inner)")));
  }

  /// Scenario S1: capacity=3, traces t1..t5 in category "a". Search with
  /// Limit=10 returns [t5, t4, t3] most-recent-first, TotalCount=3.
  #[test]
  fn test_scenario_s1_bounded_retention_and_ordering() {
    let collector = Collector::new("svc", 3).unwrap();
    let mut ids = Vec::new();
    for _ in 0..5 {
      let ctx = Context::new();
      let (_, trace) = collector.new_trace(&ctx, "a");
      ids.push(trace.trace().id());
      trace.finish();
    }

    let req = SearchRequest {
      limit: 10,
      ..Default::default()
    };
    let resp = collector.search(&req);
    assert_eq!(resp.total_count, 3);
    let got: Vec<_> = resp.traces.iter().map(|t| t.id).collect();
    assert_eq!(got, vec![ids[4], ids[3], ids[2]]);
  }

  /// Scenario S2: {cat=foo "alpha X1"}, {cat=foo "beta X1"}, {cat=bar "alpha
  /// X2"}. Query="alpha" returns exactly the two alpha traces, MatchCount=2.
  #[test]
  fn test_scenario_s2_query_filter_matches_across_categories() {
    let collector = Collector::new("svc", 10).unwrap();
    for (cat, msg) in [("foo", "alpha X1"), ("foo", "beta X1"), ("bar", "alpha X2")] {
      let ctx = Context::new();
      let (_, trace) = collector.new_trace(&ctx, cat);
      trace.tracef(msg.to_string());
      trace.finish();
    }

    let req = SearchRequest {
      filter: Filter {
        query: "alpha".into(),
        ..Default::default()
      },
      limit: 10,
      ..Default::default()
    };
    let resp = collector.search(&req);
    assert_eq!(resp.match_count, 2);
    assert_eq!(resp.traces.len(), 2);
  }

  #[test]
  fn test_resize_disposes_of_evicted_traces() {
    let collector = Collector::new("svc", 5).unwrap();
    for _ in 0..5 {
      let ctx = Context::new();
      collector.new_trace(&ctx, "a");
    }
    let dropped = collector.resize(2).unwrap();
    assert_eq!(dropped, 3);
  }

  #[test]
  fn test_set_source_applies_to_future_traces_only() {
    let collector = Collector::new("svc-a", 10).unwrap();
    let ctx = Context::new();
    let (_, t1) = collector.new_trace(&ctx, "cat");
    assert_eq!(t1.trace().source(), "svc-a");

    collector.set_source("svc-b");
    let (_, t2) = collector.new_trace(&Context::new(), "cat");
    assert_eq!(t2.trace().source(), "svc-b");
    assert_eq!(t1.trace().source(), "svc-a");
  }

  #[test]
  fn test_with_hostname_source_derives_a_nonempty_source() {
    let collector = Collector::with_hostname_source(10).unwrap();
    let ctx = Context::new();
    let (_, trace) = collector.new_trace(&ctx, "cat");
    assert!(trace.trace().source().contains(':'));
  }
}
