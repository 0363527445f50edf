#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::post;
use axum::{Json, Router};
use rand::distributions::Alphanumeric;
use rand::Rng;
use serde_json::{json, Value};
use tokio::net::TcpListener;

use voxalyze::collector::API_KEY_HEADER;
use voxalyze::config::{EnvMsDuration, TrackerConfig};

pub fn random_string(prefix: &str, length: usize) -> String {
    let suffix: String = rand::thread_rng()
        .sample_iter(Alphanumeric)
        .take(length)
        .map(char::from)
        .collect();
    format!("{}{}", prefix, suffix)
}

pub fn tracker_config(collector_url: &str, debug_skill_id: Option<&str>) -> TrackerConfig {
    TrackerConfig {
        api_key: random_string("vox_", 16),
        debug_skill_id: debug_skill_id.map(String::from),
        collector_url: collector_url.to_string(),
        request_timeout: EnvMsDuration(Duration::from_millis(2000)),
    }
}

pub fn alexa_request(request_type: &str, user_id: &str) -> Value {
    json!({
        "version": "1.0",
        "session": {
            "new": true,
            "sessionId": random_string("amzn1.echo-api.session.", 12),
            "application": {"applicationId": "amzn1.ask.skill.production"},
            "user": {"userId": user_id}
        },
        "context": {
            "System": {
                "application": {"applicationId": "amzn1.ask.skill.production"},
                "user": {"userId": user_id},
                "device": {"deviceId": "amzn1.ask.device.1", "supportedInterfaces": {}},
                "apiEndpoint": "https://api.amazonalexa.com"
            }
        },
        "request": {
            "type": request_type,
            "requestId": random_string("amzn1.echo-api.request.", 12),
            "timestamp": "2024-03-01T12:00:00Z",
            "locale": "en-US"
        }
    })
}

#[derive(Clone, Debug)]
pub struct Received {
    pub api_key: Option<String>,
    pub body: Value,
}

type Inbox = Arc<Mutex<Vec<Received>>>;

/// A local stand-in for the Voxalyze collector that records what it receives.
pub struct StubCollector {
    pub url: String,
    received: Inbox,
}

impl StubCollector {
    pub async fn start() -> Self {
        Self::responding_with(StatusCode::OK).await
    }

    pub async fn responding_with(status: StatusCode) -> Self {
        let received = Inbox::default();
        let app = Router::new()
            .route("/collect", post(collect))
            .with_state((received.clone(), status));

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind stub collector");
        let addr = listener.local_addr().expect("no local address");
        tokio::spawn(async move {
            axum::serve(listener, app)
                .await
                .expect("stub collector failed")
        });

        Self {
            url: format!("http://{}/collect", addr),
            received,
        }
    }

    pub fn received(&self) -> Vec<Received> {
        self.received.lock().unwrap().clone()
    }

    /// Wait until at least `count` payloads arrived, dispatch is detached.
    pub async fn wait_for(&self, count: usize) -> Vec<Received> {
        tokio::time::timeout(Duration::from_secs(5), async {
            loop {
                let received = self.received();
                if received.len() >= count {
                    return received;
                }
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .expect("timed out waiting for the collector")
    }
}

async fn collect(
    State((received, status)): State<(Inbox, StatusCode)>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> StatusCode {
    let api_key = headers
        .get(API_KEY_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(String::from);

    received.lock().unwrap().push(Received { api_key, body });
    status
}
