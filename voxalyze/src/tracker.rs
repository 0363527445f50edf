use std::sync::Arc;

use metrics::counter;
use tokio::task::JoinHandle;
use tracing::{debug, error, instrument};

use crate::api::CollectorError;
use crate::classify::{is_debug_origin, skip_reason};
use crate::collector::{Collector, HttpCollector, PrintCollector};
use crate::config::TrackerConfig;
use crate::debug::DebugSession;
use crate::event::{AlexaRequest, InboundEvent};

pub const PLUGIN_NAME: &str = "Voxalyze";

/// Forwards Alexa launch requests to the Voxalyze collector for campaign
/// attribution. Every other request type and platform is ignored.
pub struct Tracker {
    config: TrackerConfig,
    collector: Arc<dyn Collector + Send + Sync>,
    debug: DebugSession,
}

impl Tracker {
    /// Initialize the collector client from the configured API key.
    pub fn install(config: TrackerConfig) -> anyhow::Result<Tracker> {
        let collector = HttpCollector::new(&config)?;
        Ok(Self::with_collector(config, collector))
    }

    /// A tracker that logs payloads instead of sending them.
    pub fn printing(config: TrackerConfig) -> Tracker {
        Self::with_collector(config, PrintCollector {})
    }

    pub fn with_collector<C: Collector + Send + Sync + 'static>(
        config: TrackerConfig,
        collector: C,
    ) -> Tracker {
        Tracker {
            config,
            collector: Arc::new(collector),
            debug: DebugSession::new(),
        }
    }

    pub fn name(&self) -> &'static str {
        PLUGIN_NAME
    }

    pub fn debug_session(&self) -> &DebugSession {
        &self.debug
    }

    /// Classify the event and build the payload to forward, if any.
    pub fn prepare(&self, event: &InboundEvent) -> Option<AlexaRequest> {
        if let Some(reason) = skip_reason(event) {
            debug!(
                platform = event.platform.as_str(),
                kind = event.kind.as_str(),
                "skipping request: {}",
                reason
            );
            counter!("voxalyze_requests_total", "outcome" => reason).increment(1);
            return None;
        }

        counter!("voxalyze_requests_total", "outcome" => "tracked").increment(1);

        if is_debug_origin(event) {
            let substitution = self
                .debug
                .substitute(&event.payload, self.config.debug_skill_id());
            return Some(substitution.into_payload());
        }

        Some(event.payload.clone())
    }

    /// Forward the event and wait for the collector's answer.
    ///
    /// Returns `Ok(false)` when the event was not eligible for tracking.
    /// Collector failures are handed back as they are, without retrying.
    #[instrument(skip_all, fields(platform = %event.platform, kind = event.kind.as_str()))]
    pub async fn dispatch(&self, event: &InboundEvent) -> Result<bool, CollectorError> {
        match self.prepare(event) {
            None => Ok(false),
            Some(payload) => {
                send(self.collector.clone(), payload).await?;
                Ok(true)
            }
        }
    }

    /// Forward the event on a detached task, so the caller never waits on the
    /// collector. Returns `None` when nothing was sent.
    pub fn track(&self, event: &InboundEvent) -> Option<JoinHandle<Result<(), CollectorError>>> {
        let payload = self.prepare(event)?;
        let collector = self.collector.clone();

        Some(tokio::spawn(async move {
            let result = send(collector, payload).await;
            if let Err(err) = &result {
                error!("failed to dispatch tracking payload: {}", err);
            }
            result
        }))
    }
}

async fn send(
    collector: Arc<dyn Collector + Send + Sync>,
    payload: AlexaRequest,
) -> Result<(), CollectorError> {
    match collector.dispatch(payload).await {
        Ok(()) => {
            counter!("voxalyze_dispatch_total", "result" => "ok").increment(1);
            Ok(())
        }
        Err(err) => {
            counter!("voxalyze_dispatch_total", "result" => err.cause()).increment(1);
            Err(err)
        }
    }
}
