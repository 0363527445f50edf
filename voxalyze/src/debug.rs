use metrics::counter;
use once_cell::sync::OnceCell;
use tracing::warn;
use uuid::Uuid;

use crate::event::AlexaRequest;

pub const SKILL_ID_PREFIX: &str = "amzn1.ask.skill.";
pub const DEBUG_USER_ID_PREFIX: &str = "amzn1.ask.account.JOVO-DEBUGGER-";

/// Identity state for debugger traffic, owned by one tracker.
///
/// The synthetic user id is generated on the first configured debug request and
/// then reused for the lifetime of the process, so the collector groups all
/// debugger launches under a single test user. It is never persisted.
#[derive(Debug, Default)]
pub struct DebugSession {
    user_id: OnceCell<String>,
}

/// Result of running a debugger request through the substitution.
#[derive(Debug, Clone, PartialEq)]
pub enum Substitution {
    /// No debug skill id is configured, the payload is forwarded unchanged.
    Unconfigured {
        payload: AlexaRequest,
        candidate_skill_id: String,
    },
    Rewritten(AlexaRequest),
}

impl Substitution {
    pub fn into_payload(self) -> AlexaRequest {
        match self {
            Substitution::Unconfigured { payload, .. } => payload,
            Substitution::Rewritten(payload) => payload,
        }
    }

    pub fn payload(&self) -> &AlexaRequest {
        match self {
            Substitution::Unconfigured { payload, .. } => payload,
            Substitution::Rewritten(payload) => payload,
        }
    }
}

impl DebugSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// The synthetic user id, if a debug request has already been rewritten.
    pub fn user_id(&self) -> Option<&str> {
        self.user_id.get().map(String::as_str)
    }

    fn user_id_or_init(&self) -> &str {
        self.user_id
            .get_or_init(|| format!("{}{}", DEBUG_USER_ID_PREFIX, Uuid::new_v4()))
    }

    /// Point a debugger request at the debug skill and the synthetic user.
    ///
    /// Without a debug skill id the operator is warned on every call, each time
    /// with a fresh candidate id, and the payload goes out as it came in.
    pub fn substitute(&self, payload: &AlexaRequest, debug_skill_id: Option<&str>) -> Substitution {
        match debug_skill_id.filter(|skill_id| !skill_id.is_empty()) {
            None => {
                counter!("voxalyze_debug_requests_total", "configured" => "false").increment(1);

                let candidate_skill_id = candidate_skill_id();
                warn!("{}", setup_notice(&candidate_skill_id));

                Substitution::Unconfigured {
                    payload: payload.clone(),
                    candidate_skill_id,
                }
            }
            Some(skill_id) => {
                counter!("voxalyze_debug_requests_total", "configured" => "true").increment(1);

                Substitution::Rewritten(payload.with_identity(skill_id, self.user_id_or_init()))
            }
        }
    }
}

pub fn candidate_skill_id() -> String {
    format!("{}{}", SKILL_ID_PREFIX, Uuid::new_v4())
}

/// Operator instructions printed while debugger traffic has nowhere to go.
pub fn setup_notice(candidate_skill_id: &str) -> String {
    let rule = "=".repeat(72);

    format!(
        "\n{rule}\n\
         Voxalyze: request from the Jovo debugger, but no debug skill id is configured.\n\
         Debugger launches are forwarded unchanged and count as production traffic.\n\
         \n\
         To keep them apart, register this skill id in your Voxalyze account:\n\
         \n\
         \x20   {candidate_skill_id}\n\
         \n\
         then set it in the tracker configuration:\n\
         \n\
         \x20   DEBUG_SKILL_ID={candidate_skill_id}\n\
         {rule}"
    )
}
