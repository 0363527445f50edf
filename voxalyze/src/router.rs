use std::future::ready;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::middleware::TrackingState;
use crate::prometheus::{setup_metrics_recorder, track_metrics};
use crate::track;

async fn index() -> &'static str {
    "voxalyze"
}

async fn liveness() -> &'static str {
    "ok"
}

pub fn router(state: TrackingState, metrics: bool) -> anyhow::Result<Router> {
    let max_body_bytes = state.max_body_bytes;

    let router = Router::new()
        .route("/", get(index))
        .route("/_liveness", get(liveness))
        .route("/track", post(track::track))
        .route("/track/", post(track::track))
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(axum::middleware::from_fn(track_metrics))
        .with_state(state);

    // Don't install metrics unless asked to
    // Installing a global recorder when the tracker is used as a library (during tests etc)
    // does not work well.
    if metrics {
        let recorder_handle = setup_metrics_recorder()?;

        Ok(router.route("/metrics", get(move || ready(recorder_handle.render()))))
    } else {
        Ok(router)
    }
}
