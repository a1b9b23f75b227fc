use playground::config::PlaygroundConfig;
use playground::harness::serve;
use playground::kernel::context::ServerContext;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncWriteExt, BufReader};
use tokio_util::sync::CancellationToken;

fn context(countdown_delay_ms: u64) -> Arc<ServerContext> {
    let mut config = PlaygroundConfig::default();
    config.server.countdown_delay_ms = countdown_delay_ms;
    Arc::new(ServerContext::new(config))
}

/// One `tools/call` line; a null `id` is left out.
fn tool_line(id: Value, name: &str, arguments: Value) -> String {
    let mut request = json!({
        "method": "tools/call",
        "params": { "name": name, "arguments": arguments },
    });
    if !id.is_null() {
        request["id"] = id;
    }
    request.to_string()
}

fn replies(output: Vec<u8>) -> Vec<Value> {
    String::from_utf8(output)
        .unwrap()
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect()
}

#[tokio::test]
async fn test_slow_countdown_does_not_block_other_requests() {
    let ctx = context(50);
    let input = [
        tool_line(json!(1), "countdown", json!({ "n": 4 })),
        tool_line(json!(2), "hello_world", json!({})),
    ]
    .join("\n");

    let output = serve(Arc::clone(&ctx), input.as_bytes(), Vec::new(), CancellationToken::new())
        .await
        .unwrap();
    let replies = replies(output);

    assert_eq!(replies.len(), 2);
    // hello_world finishes while the countdown is still streaming.
    assert_eq!(replies[0]["id"], json!(2));
    assert_eq!(replies[0]["text"], json!("Hello, World!"));
    assert_eq!(replies[1]["id"], json!(1));
    assert!(replies[1]["text"].as_str().unwrap().ends_with("Countdown complete!"));

    let entries = ctx.telemetry.recent(None);
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].name.as_deref(), Some("countdown"));
    assert_eq!(entries[0].stream_events().len(), 4);
}

#[tokio::test]
async fn test_serve_waits_for_in_flight_requests() {
    let ctx = context(30);
    let input = tool_line(Value::Null, "countdown", json!({ "n": 3 }));

    serve(Arc::clone(&ctx), input.as_bytes(), Vec::new(), CancellationToken::new())
        .await
        .unwrap();

    // Everything is answered by the time serve returns, so an export taken now is final.
    let entries = ctx.telemetry.recent(None);
    assert_eq!(entries.len(), 1);
    assert!(entries[0].response_time_ms().is_some());
    assert_eq!(entries[0].stream_events().len(), 3);
}

#[tokio::test]
async fn test_shutdown_stops_reading_and_drains() {
    let ctx = context(50);
    let (mut client, server) = tokio::io::duplex(4096);
    let shutdown = CancellationToken::new();

    let task = tokio::spawn(serve(
        Arc::clone(&ctx),
        BufReader::new(server),
        Vec::new(),
        shutdown.clone(),
    ));

    let line = tool_line(json!("c"), "countdown", json!({ "n": 2 })) + "\n";
    client.write_all(line.as_bytes()).await.unwrap();
    tokio::time::sleep(Duration::from_millis(20)).await;
    shutdown.cancel();

    // The client end stays open; only the token ends the loop.
    let output = tokio::time::timeout(Duration::from_secs(5), task)
        .await
        .expect("serve did not stop")
        .unwrap()
        .unwrap();
    let replies = replies(output);

    assert_eq!(replies.len(), 1);
    assert_eq!(replies[0]["id"], json!("c"));
    assert!(ctx.telemetry.recent(None)[0].response_time_ms().is_some());
    drop(client);
}

#[tokio::test]
async fn test_malformed_lines_get_error_replies() {
    let ctx = context(0);
    let input = "not json\n\n{\"method\": \"tools/explode\"}\n{\"method\": \"tools/list\"}\n";

    let output = serve(Arc::clone(&ctx), input.as_bytes(), Vec::new(), CancellationToken::new())
        .await
        .unwrap();
    let replies = replies(output);

    assert_eq!(replies.len(), 3, "Blank lines are skipped");
    let errors: Vec<&Value> = replies.iter().filter(|r| r["is_error"] == json!(true)).collect();
    assert_eq!(errors.len(), 2);
    assert!(errors
        .iter()
        .all(|r| r["text"].as_str().unwrap().starts_with("Error: invalid request:")));
    assert!(replies.iter().any(|r| r["type"] == json!("tools")));
    assert!(replies.iter().all(|r| r.get("id").is_none()));

    // Only the well-formed request reaches the log.
    assert_eq!(ctx.telemetry.len(), 1);
}
