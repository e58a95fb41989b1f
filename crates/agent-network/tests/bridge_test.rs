mod common;

use common::{duplex_session, echo_service, silent_session};
use confhub_agent_network::{BlockingBridge, BridgeError, SearchTool, ToolBridge, TOOL_ERROR_PREFIX};
use std::sync::Arc;
use std::time::{Duration, Instant};

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_block_on_from_blocking_thread() {
    let bridge = BlockingBridge::current();

    let value = tokio::task::spawn_blocking(move || {
        bridge.block_on(
            async {
                tokio::time::sleep(Duration::from_millis(20)).await;
                42
            },
            Duration::from_secs(2),
        )
    })
    .await
    .unwrap();

    assert_eq!(value.unwrap(), 42);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_block_on_reports_panicking_task() {
    let bridge = BlockingBridge::current();

    let outcome = tokio::task::spawn_blocking(move || {
        bridge.block_on(async { panic!("boom") }, Duration::from_secs(2))
    })
    .await
    .unwrap();

    assert!(matches!(outcome, Err(BridgeError::Cancelled(_))));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_tool_bridge_returns_tool_text_verbatim() {
    let session = duplex_session(echo_service());
    let tool = ToolBridge::new(session.handle(), BlockingBridge::current(), Duration::from_secs(5));

    let text = tokio::task::spawn_blocking(move || tool.search("country=United+States&perPage=3&page=1"))
        .await
        .unwrap();

    assert_eq!(text, "echo:country=United+States&perPage=3&page=1");
    session.close().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_tool_bridge_times_out_and_cancels() {
    let (session, mut probe) = silent_session();
    let timeout = Duration::from_millis(200);
    let tool = Arc::new(ToolBridge::new(session.handle(), BlockingBridge::current(), timeout));

    let start = Instant::now();
    let text = tokio::task::spawn_blocking({
        let tool = tool.clone();
        move || tool.search("acronym=ICML")
    })
    .await
    .unwrap();
    let elapsed = start.elapsed();

    assert!(text.starts_with(TOOL_ERROR_PREFIX), "got: {}", text);
    assert!(text.contains("timed out"), "got: {}", text);
    assert!(elapsed >= timeout);
    assert!(elapsed < timeout + Duration::from_secs(1), "took {:?}", elapsed);

    // the abandoned request is withdrawn from the service
    let sent = probe.sent.recv().await.unwrap();
    let cancelled = tokio::time::timeout(Duration::from_secs(2), probe.cancelled.recv())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(sent.id, Some(cancelled));

    session.close().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_tool_bridge_after_session_closed() {
    let session = duplex_session(echo_service());
    let tool = ToolBridge::new(session.handle(), BlockingBridge::current(), Duration::from_secs(2));
    session.close().await;

    let text = tokio::task::spawn_blocking(move || tool.search("acronym=ICML"))
        .await
        .unwrap();

    assert_eq!(text, format!("{} session closed", TOOL_ERROR_PREFIX));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_unavailable_tool_service_is_text_not_panic() {
    // nothing listens on port 1
    let (transport, inbound) = confhub_agent_network::transport::HttpTransport::new(
        "http://127.0.0.1:1/mcp",
        Duration::from_secs(2),
    )
    .unwrap();
    let session = confhub_agent_network::ToolSession::start(Box::new(transport), inbound);
    let tool = ToolBridge::new(session.handle(), BlockingBridge::current(), Duration::from_secs(5));

    let text = tokio::task::spawn_blocking(move || tool.search("acronym=ICML"))
        .await
        .unwrap();

    assert!(text.starts_with(TOOL_ERROR_PREFIX), "got: {}", text);
    assert!(text.contains("Transport error"), "got: {}", text);
    session.close().await;
}
