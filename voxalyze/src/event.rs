use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::api::TrackError;

pub const ALEXA_SKILL: &str = "AlexaSkill";

/// Voice assistant platform a request was produced by.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Platform {
    AlexaSkill,
    Other(String),
}

impl Platform {
    /// Alexa requests always carry a `context.System` block and a typed `request`.
    pub fn detect(value: &Value) -> Platform {
        let has_system = value
            .pointer("/context/System")
            .map_or(false, Value::is_object);
        let has_request_type = value
            .pointer("/request/type")
            .map_or(false, Value::is_string);

        if has_system && has_request_type {
            Platform::AlexaSkill
        } else {
            Platform::Other(String::from("unknown"))
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Platform::AlexaSkill => ALEXA_SKILL,
            Platform::Other(name) => name.as_str(),
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RequestKind {
    Launch,
    Intent,
    SessionEnded,
    Other(String),
}

impl RequestKind {
    pub fn from_alexa_type(request_type: &str) -> RequestKind {
        match request_type {
            "LaunchRequest" => RequestKind::Launch,
            "IntentRequest" => RequestKind::Intent,
            "SessionEndedRequest" => RequestKind::SessionEnded,
            other => RequestKind::Other(other.to_owned()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            RequestKind::Launch => "launch",
            RequestKind::Intent => "intent",
            RequestKind::SessionEnded => "session_ended",
            RequestKind::Other(_) => "other",
        }
    }
}

/// Keeps a present member even when it holds `null`, so absent and null stay
/// distinguishable and both serialize back the way they came in.
fn present<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

/// Object held by `value`, replacing it with an empty one if it holds anything else.
fn object_mut(value: &mut Value) -> &mut Map<String, Value> {
    if !value.is_object() {
        *value = Value::Object(Map::new());
    }
    match value {
        Value::Object(map) => map,
        _ => unreachable!("value was just made an object"),
    }
}

fn set_identity(holder: &mut Value, application_id: &str, user_id: &str) {
    let holder = object_mut(holder);
    object_mut(holder.entry("application").or_insert(Value::Null))
        .insert(String::from("applicationId"), Value::from(application_id));
    object_mut(holder.entry("user").or_insert(Value::Null))
        .insert(String::from("userId"), Value::from(user_id));
}

/// A raw Alexa request envelope, as forwarded to the collector.
///
/// The members carrying identity and request type are kept as raw JSON and
/// only read through the typed accessors below, so nulls and unexpected types
/// serialize back untouched. Everything else lives in `extra`.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct AlexaRequest {
    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub session: Option<Value>,
    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub context: Option<Value>,
    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub request: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl AlexaRequest {
    /// Wrap a payload we could not interpret, keeping it as an opaque blob.
    pub fn opaque(value: Value) -> AlexaRequest {
        let extra = match value {
            Value::Object(map) => map,
            other => Map::from_iter([(String::from("payload"), other)]),
        };

        AlexaRequest {
            extra,
            ..Default::default()
        }
    }

    fn session_str(&self, pointer: &str) -> Option<&str> {
        self.session.as_ref()?.pointer(pointer)?.as_str()
    }

    fn system_str(&self, pointer: &str) -> Option<&str> {
        self.context.as_ref()?.get("System")?.pointer(pointer)?.as_str()
    }

    pub fn request_type(&self) -> Option<&str> {
        self.request.as_ref()?.get("type")?.as_str()
    }

    /// The skill id, read from the session first and `context.System` after.
    pub fn application_id(&self) -> Option<&str> {
        self.session_str("/application/applicationId")
            .or_else(|| self.system_str("/application/applicationId"))
    }

    /// The invoking user's id. The session copy wins over `context.System`,
    /// matching how Jovo resolves the Alexa user id.
    pub fn user_id(&self) -> Option<&str> {
        self.session_str("/user/userId").or_else(|| self.system_str("/user/userId"))
    }

    /// Returns a copy with every application and user id replaced.
    ///
    /// `context.System` is created when missing; the session copy is only
    /// rewritten when the request has a session object.
    pub fn with_identity(&self, application_id: &str, user_id: &str) -> AlexaRequest {
        let mut rewritten = self.clone();

        let context = object_mut(rewritten.context.get_or_insert(Value::Null));
        let system = context.entry("System").or_insert(Value::Null);
        set_identity(system, application_id, user_id);

        if let Some(session) = rewritten.session.as_mut().filter(|s| s.is_object()) {
            set_identity(session, application_id, user_id);
        }

        rewritten
    }
}

/// One assistant interaction as seen by the tracker.
#[derive(Clone, Debug, PartialEq)]
pub struct InboundEvent {
    pub platform: Platform,
    pub kind: RequestKind,
    pub user_id: Option<String>,
    pub payload: AlexaRequest,
}

impl InboundEvent {
    pub fn from_alexa(payload: AlexaRequest) -> InboundEvent {
        let kind = payload
            .request_type()
            .map_or(RequestKind::Other(String::new()), RequestKind::from_alexa_type);

        InboundEvent {
            platform: Platform::AlexaSkill,
            kind,
            user_id: payload.user_id().map(String::from),
            payload,
        }
    }

    pub fn from_value(value: Value) -> Result<InboundEvent, TrackError> {
        match Platform::detect(&value) {
            Platform::AlexaSkill => Ok(InboundEvent::from_alexa(serde_json::from_value(value)?)),
            platform => Ok(InboundEvent {
                platform,
                kind: RequestKind::Other(String::new()),
                user_id: None,
                payload: AlexaRequest::opaque(value),
            }),
        }
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<InboundEvent, TrackError> {
        tracing::debug!(len = bytes.len(), "decoding inbound request");

        if bytes.is_empty() {
            return Err(TrackError::EmptyBody);
        }

        let value: Value = serde_json::from_slice(bytes)?;
        InboundEvent::from_value(value)
    }
}
