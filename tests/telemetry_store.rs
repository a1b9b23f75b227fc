use playground::kernel::telemetry::{LogStore, TelemetryError, TelemetryLog};
use serde_json::{json, Map, Value};

fn record(store: &LogStore, op: &str) -> playground::kernel::telemetry::EntryHandle {
    store.record_request("TOOL_CALL", op, Some(op), Map::new(), json!({ "op": op })).0
}

#[test]
fn test_fifo_eviction_keeps_newest() {
    let store = LogStore::new(3);
    for op in ["A", "B", "C", "D"] {
        record(&store, op);
    }

    let ops: Vec<String> = store.recent(None).into_iter().map(|e| e.operation).collect();
    assert_eq!(ops, vec!["B", "C", "D"]);
    assert_eq!(store.len(), 3);
    assert_eq!(store.evicted(), 1);
    assert_eq!(store.total_recorded(), 4);
}

#[test]
fn test_capacity_one_holds_only_latest() {
    let store = LogStore::new(1);
    record(&store, "first");
    let last = record(&store, "second");

    let entries = store.recent(None);
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].operation, "second");
    assert!(store.get(last).is_some());
}

#[test]
fn test_zero_capacity_is_raised_to_one() {
    let store = LogStore::new(0);
    assert_eq!(store.capacity(), 1);
    record(&store, "only");
    assert_eq!(store.len(), 1);
}

#[test]
fn test_stale_handle_is_rejected_without_side_effects() {
    let store = LogStore::new(2);
    let a = record(&store, "A");
    record(&store, "B");
    record(&store, "C");

    let before = store.recent(None);
    let result = store.record_response(a, Some(json!({ "late": true })), None, Some(1.0));
    assert!(matches!(result, Err(TelemetryError::StaleHandle(h)) if h == a));
    assert!(store.record_stream_event(a, json!({})).is_err());
    assert_eq!(store.recent(None), before, "Evicted handle must not touch live entries");
}

#[test]
fn test_stale_response_through_log_is_silent() {
    let log = TelemetryLog::with_capacity(1);
    let old = log.record_request("TOOL_CALL", "first", None, Map::new(), Value::Null);
    log.record_request("TOOL_CALL", "second", None, Map::new(), Value::Null);

    // Must neither panic nor create an entry.
    log.record_response(old, None, Some("too late".into()), Some(3.0));
    log.record_stream_event(old, json!({ "count": 1 }));

    let entries = log.recent(None);
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].operation, "second");
    assert!(entries[0].error().is_none());
}

#[test]
fn test_success_follows_error_presence() {
    let log = TelemetryLog::with_capacity(10);

    let ok = log.record_request("TOOL_CALL", "call_tool", Some("add"), Map::new(), Value::Null);
    log.record_response(ok, Some(json!({ "result": "success" })), None, Some(2.5));

    let failed = log.record_request(
        "TOOL_CALL",
        "call_tool",
        Some("fail_on_purpose"),
        Map::new(),
        Value::Null,
    );
    log.record_response(failed, None, Some("boom".into()), Some(1.0));

    let ok = log.get(ok).unwrap();
    assert!(ok.success());
    assert_eq!(ok.response_time_ms(), Some(2.5));
    assert_eq!(ok.response_payload(), Some(&json!({ "result": "success" })));

    let failed = log.get(failed).unwrap();
    assert!(!failed.success());
    assert_eq!(failed.error(), Some("boom"));
    assert!(failed.response_payload().is_none());
}

#[test]
fn test_pending_entry_is_successful_until_answered() {
    let log = TelemetryLog::with_capacity(10);
    let h = log.record_request("TOOLS", "list_tools", None, Map::new(), Value::Null);

    let entry = log.get(h).unwrap();
    assert!(entry.success());
    assert!(entry.response_time_ms().is_none());
    assert!(!entry.is_streaming());
    assert!(entry.stream_events().is_empty());
}

#[test]
fn test_stream_events_keep_order() {
    let log = TelemetryLog::with_capacity(10);
    let h = log.record_request(
        "TOOL_CALL",
        "call_tool",
        Some("countdown"),
        Map::new(),
        Value::Null,
    );

    for i in (1..=3).rev() {
        log.record_stream_event(h, json!({ "count": i }));
    }
    log.record_response(h, Some(json!({ "result": "success" })), None, Some(30.0));

    let entry = log.get(h).unwrap();
    assert!(entry.is_streaming());
    let counts: Vec<i64> = entry
        .stream_events()
        .iter()
        .map(|e| e.data["count"].as_i64().unwrap())
        .collect();
    assert_eq!(counts, vec![3, 2, 1]);
    assert!(entry.stream_events().windows(2).all(|w| w[0].timestamp <= w[1].timestamp));
}

#[test]
fn test_recent_limit_returns_newest_in_order() {
    let store = LogStore::new(10);
    for op in ["a", "b", "c", "d", "e"] {
        record(&store, op);
    }

    let ops: Vec<String> = store.recent(Some(2)).into_iter().map(|e| e.operation).collect();
    assert_eq!(ops, vec!["d", "e"]);
    assert_eq!(store.recent(Some(50)).len(), 5);
    assert!(store.recent(Some(0)).is_empty());
}

#[test]
fn test_clear_invalidates_handles() {
    let store = LogStore::new(5);
    let h = record(&store, "a");
    store.clear();

    assert!(store.is_empty());
    assert!(store.get(h).is_none());
    let next = record(&store, "b");
    assert!(next.sequence() > h.sequence(), "Sequence numbers are never reused");
}

#[test]
fn test_concurrent_recording_respects_capacity() {
    const THREADS: usize = 8;
    const PER_THREAD: usize = 250;
    let log = TelemetryLog::with_capacity(100);

    std::thread::scope(|s| {
        for t in 0..THREADS {
            let log = &log;
            s.spawn(move || {
                for i in 0..PER_THREAD {
                    let payload = json!({ "t": t, "i": i });
                    let h = log.record_request("TOOL_CALL", "call_tool", None, Map::new(), payload);
                    log.record_response(h, None, None, Some(0.1));
                }
            });
        }
    });

    let entries = log.recent(None);
    assert_eq!(entries.len(), 100);
    assert_eq!(log.store().total_recorded(), (THREADS * PER_THREAD) as u64);
    assert_eq!(log.store().evicted(), (THREADS * PER_THREAD - 100) as u64);
    // Per-thread insertion order survives interleaving.
    for t in 0..THREADS {
        let seen: Vec<u64> = entries
            .iter()
            .filter(|e| e.request_payload["t"] == json!(t))
            .map(|e| e.request_payload["i"].as_u64().unwrap())
            .collect();
        assert!(seen.windows(2).all(|w| w[0] < w[1]));
    }
}

fn latency_for(t: u64, i: u64) -> f64 {
    (t * 10_000 + i) as f64 / 4.0
}

#[test]
fn test_concurrent_responses_land_on_their_own_entry() {
    const THREADS: u64 = 8;
    const PER_THREAD: u64 = 200;
    const BATCH: u64 = 10;
    let log = TelemetryLog::with_capacity(500);

    std::thread::scope(|s| {
        for t in 0..THREADS {
            let log = &log;
            s.spawn(move || {
                for start in (0..PER_THREAD).step_by(BATCH as usize) {
                    // Keep several requests open at once and answer them out of order.
                    let open: Vec<_> = (start..start + BATCH)
                        .map(|i| {
                            let payload = json!({ "t": t, "i": i });
                            let h = log.record_request(
                                "TOOL_CALL",
                                "call_tool",
                                None,
                                Map::new(),
                                payload,
                            );
                            (i, h)
                        })
                        .collect();
                    for &(i, h) in open.iter().rev() {
                        log.record_stream_event(h, json!({ "t": t, "i": i }));
                    }
                    for &(i, h) in open.iter().rev() {
                        let reply = json!({ "t": t, "i": i });
                        log.record_response(h, Some(reply), None, Some(latency_for(t, i)));
                    }
                }
            });
        }
    });

    let entries = log.recent(None);
    assert_eq!(entries.len(), 500);
    for entry in &entries {
        let t = entry.request_payload["t"].as_u64().unwrap();
        let i = entry.request_payload["i"].as_u64().unwrap();
        assert_eq!(entry.response_payload(), Some(&entry.request_payload));
        assert_eq!(entry.response_time_ms(), Some(latency_for(t, i)));
        assert_eq!(entry.stream_events().len(), 1, "entry t={} i={}", t, i);
        assert_eq!(entry.stream_events()[0].data, entry.request_payload);
    }
}

#[test]
fn test_timestamps_follow_insertion_order_under_contention() {
    let log = TelemetryLog::with_capacity(2000);

    std::thread::scope(|s| {
        for _ in 0..8 {
            s.spawn(|| {
                for _ in 0..200 {
                    log.record_request("TOOLS", "list_tools", None, Map::new(), Value::Null);
                }
            });
        }
    });

    let entries = log.recent(None);
    assert_eq!(entries.len(), 1600);
    assert!(entries.windows(2).all(|w| w[0].timestamp <= w[1].timestamp));
}

#[test]
fn test_concurrent_requests_get_distinct_handles() {
    let store = LogStore::new(1000);
    let mut handles: Vec<u64> = std::thread::scope(|s| {
        let workers: Vec<_> = (0..4)
            .map(|_| {
                s.spawn(|| (0..100).map(|_| record(&store, "x").sequence()).collect::<Vec<_>>())
            })
            .collect();
        workers.into_iter().flat_map(|w| w.join().unwrap()).collect()
    });

    handles.sort_unstable();
    handles.dedup();
    assert_eq!(handles.len(), 400);
}
