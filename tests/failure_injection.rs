//! Failure injection tests for the gateway.

use reqwest::StatusCode;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

mod common;

#[tokio::test]
async fn test_retry_on_failure() {
    let call_count = Arc::new(AtomicU32::new(0));
    let cc = call_count.clone();
    let (upstream, _) = common::start_programmable_upstream(move || {
        let cc = cc.clone();
        async move {
            let count = cc.fetch_add(1, Ordering::SeqCst);
            if count < 2 {
                (503, Some("text/plain"), "Service Unavailable".to_string())
            } else {
                (200, Some("application/json"), r#"{"points":"10"}"#.to_string())
            }
        }
    })
    .await;
    let (gateway, shutdown) = common::spawn_gateway(common::test_config(upstream)).await;

    let res = reqwest::get(format!("{gateway}/digipos/reward?username=alice"))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.text().await.unwrap(), "points=10");
    assert_eq!(call_count.load(Ordering::SeqCst), 3);

    shutdown.trigger();
}

#[tokio::test]
async fn test_exhausted_retries_still_normalize() {
    let (upstream, seen) = common::start_mock_upstream(502, Some("text/html"), "<h1>Bad Gateway</h1>").await;
    let (gateway, shutdown) = common::spawn_gateway(common::test_config(upstream)).await;

    let res = reqwest::get(format!("{gateway}/digipos/profile?username=alice&text=false"))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["status_code"], json!(502));
    assert_eq!(body["content_kind"], json!("TEXT"));
    assert_eq!(body["data"], json!({"raw": "<h1>Bad Gateway</h1>"}));
    assert_eq!(seen.lock().unwrap().len(), 3);

    shutdown.trigger();
}

#[tokio::test]
async fn test_upstream_down_is_service_unavailable() {
    let (gateway, shutdown) = common::spawn_gateway(common::test_config(common::closed_port())).await;

    let res = reqwest::get(format!("{gateway}/digipos/balance?username=alice&text=false"))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], json!("transport"));

    let res = reqwest::get(format!("{gateway}/health/upstream")).await.unwrap();
    assert_eq!(res.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(res.text().await.unwrap(), "unreachable");

    shutdown.trigger();
}

#[tokio::test]
async fn test_unknown_username_never_reaches_upstream() {
    let (upstream, seen) = common::start_mock_upstream(200, Some("application/json"), "{}").await;
    let (gateway, shutdown) = common::spawn_gateway(common::test_config(upstream)).await;

    let res = reqwest::get(format!("{gateway}/digipos/balance?username=mallory"))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert!(res.text().await.unwrap().starts_with("error=authentication"));
    assert!(seen.lock().unwrap().is_empty());

    shutdown.trigger();
}

#[tokio::test]
async fn test_graceful_shutdown_stops_accepting() {
    let (upstream, _) = common::start_mock_upstream(200, None, "ok").await;
    let (gateway, shutdown) = common::spawn_gateway(common::test_config(upstream)).await;

    let res = reqwest::get(format!("{gateway}/health")).await.unwrap();
    assert_eq!(res.text().await.unwrap(), "ok");

    shutdown.trigger();
    tokio::time::sleep(std::time::Duration::from_millis(200)).await;
    let client = reqwest::Client::builder().pool_max_idle_per_host(0).build().unwrap();
    assert!(client.get(format!("{gateway}/health")).send().await.is_err());
}
