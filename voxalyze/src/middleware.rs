use std::sync::Arc;

use axum::body::{Body, HttpBody};
use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Router;
use tracing::{debug, warn};

use crate::api::TrackError;
use crate::event::InboundEvent;
use crate::tracker::Tracker;

#[derive(Clone)]
pub struct TrackingState {
    pub tracker: Arc<Tracker>,
    pub max_body_bytes: usize,
}

impl TrackingState {
    pub fn new(tracker: Tracker, max_body_bytes: usize) -> Self {
        Self {
            tracker: Arc::new(tracker),
            max_body_bytes,
        }
    }
}

/// Hand every request to the tracker before the skill handles it.
///
/// The body is buffered, offered to the tracker and put back, so the wrapped
/// handler sees the request exactly as it arrived. Bodies that may exceed
/// `max_body_bytes` are not buffered and reach the skill untracked. Dispatch to
/// the collector is detached and never delays the skill's response.
pub async fn track_requests(
    State(state): State<TrackingState>,
    req: Request,
    next: Next,
) -> Response {
    let limit = u64::try_from(state.max_body_bytes).unwrap_or(u64::MAX);
    let within_limit = req
        .body()
        .size_hint()
        .upper()
        .map_or(false, |upper| upper <= limit);

    if !within_limit {
        debug!("request body too large to track, passing it through");
        metrics::counter!("voxalyze_requests_total", "outcome" => "too_large").increment(1);
        return next.run(req).await;
    }

    let (parts, body) = req.into_parts();

    let bytes = match axum::body::to_bytes(body, state.max_body_bytes).await {
        Ok(bytes) => bytes,
        Err(err) => {
            warn!("failed to read request body: {}", err);
            return TrackError::RequestDecodingError(String::from("unreadable body"))
                .into_response();
        }
    };

    match InboundEvent::from_bytes(&bytes) {
        Ok(event) => {
            let _dispatch = state.tracker.track(&event);
        }
        Err(err) => debug!("not tracking request: {}", err),
    }

    next.run(Request::from_parts(parts, Body::from(bytes))).await
}

/// Wrap all routes of a skill router with the tracking middleware.
pub fn with_tracking<S>(router: Router<S>, state: TrackingState) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    router.layer(axum::middleware::from_fn_with_state(state, track_requests))
}
