use anyhow::Result;
use assert_json_diff::assert_json_eq;
use axum::body::{Body, Bytes};
use axum::http::{Request, StatusCode};
use axum::routing::post;
use axum::Router;
use serde_json::Value;
use tower::ServiceExt;

use voxalyze::middleware::{with_tracking, TrackingState};
use voxalyze::tracker::Tracker;

use crate::common::*;
mod common;

/// Stands in for a skill handler: answers with the body it was given.
async fn echo_skill(body: Bytes) -> Bytes {
    body
}

fn skill(config: voxalyze::config::TrackerConfig, max_body_bytes: usize) -> Result<Router> {
    let state = TrackingState::new(Tracker::install(config)?, max_body_bytes);
    Ok(with_tracking(
        Router::new().route("/alexa", post(echo_skill)),
        state,
    ))
}

fn skill_request(body: impl Into<Body>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/alexa")
        .header("content-type", "application/json")
        .body(body.into())
        .unwrap()
}

#[tokio::test]
async fn skill_sees_the_original_request() -> Result<()> {
    let collector = StubCollector::start().await;
    let app = skill(tracker_config(&collector.url, Some("amzn1.ask.skill.abc123")), 64 * 1024)?;
    let request = alexa_request("LaunchRequest", "jovo-debugger-user");

    let res = app.oneshot(skill_request(request.to_string())).await?;
    assert_eq!(res.status(), StatusCode::OK);

    let echoed = axum::body::to_bytes(res.into_body(), usize::MAX).await?;
    let echoed: Value = serde_json::from_slice(&echoed)?;
    assert_json_eq!(echoed, request);

    // Only the copy sent to the collector carries the debug identity.
    let received = collector.wait_for(1).await;
    assert_eq!(
        received[0].body["context"]["System"]["application"]["applicationId"],
        "amzn1.ask.skill.abc123"
    );

    Ok(())
}

#[tokio::test]
async fn non_json_bodies_pass_through() -> Result<()> {
    let collector = StubCollector::start().await;
    let app = skill(tracker_config(&collector.url, None), 64 * 1024)?;

    let res = app.oneshot(skill_request("plain text, not alexa")).await?;
    assert_eq!(res.status(), StatusCode::OK);

    let echoed = axum::body::to_bytes(res.into_body(), usize::MAX).await?;
    assert_eq!(&echoed[..], b"plain text, not alexa");

    tokio::time::sleep(std::time::Duration::from_millis(100)).await;
    assert!(collector.received().is_empty());

    Ok(())
}

#[tokio::test]
async fn oversized_bodies_skip_tracking() -> Result<()> {
    let collector = StubCollector::start().await;
    let app = skill(tracker_config(&collector.url, None), 16)?;
    let request = alexa_request("LaunchRequest", "amzn1.ask.account.real-user-1");

    let res = app.oneshot(skill_request(request.to_string())).await?;
    assert_eq!(res.status(), StatusCode::OK);

    let echoed = axum::body::to_bytes(res.into_body(), usize::MAX).await?;
    let echoed: Value = serde_json::from_slice(&echoed)?;
    assert_json_eq!(echoed, request);

    tokio::time::sleep(std::time::Duration::from_millis(100)).await;
    assert!(collector.received().is_empty());

    Ok(())
}
