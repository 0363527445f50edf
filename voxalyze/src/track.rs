use axum::extract::State;
use axum::Json;
use bytes::Bytes;
use tracing::instrument;

use crate::api::{TrackError, TrackResponse, TrackResponseCode};
use crate::event::InboundEvent;
use crate::middleware::TrackingState;

/// Track a raw Alexa request posted by a skill backend.
///
/// Answers as soon as the request is classified, the collector call runs in the
/// background.
#[instrument(skip_all, fields(platform, kind, tracked))]
pub async fn track(
    State(state): State<TrackingState>,
    body: Bytes,
) -> Result<Json<TrackResponse>, TrackError> {
    let event = InboundEvent::from_bytes(&body)?;

    tracing::Span::current().record("platform", event.platform.as_str());
    tracing::Span::current().record("kind", event.kind.as_str());

    let tracked = state.tracker.track(&event).is_some();
    tracing::Span::current().record("tracked", tracked);

    Ok(Json(TrackResponse {
        status: TrackResponseCode::Ok,
    }))
}
