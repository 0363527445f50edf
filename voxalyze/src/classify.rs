use crate::event::{InboundEvent, Platform, RequestKind};

/// User id the Jovo debugger sends in place of a real Alexa account.
pub const DEBUGGER_USER_ID: &str = "jovo-debugger-user";

/// Only Alexa launch requests are attributed; everything else is skipped.
pub fn is_trackable(event: &InboundEvent) -> bool {
    event.platform == Platform::AlexaSkill && event.kind == RequestKind::Launch
}

pub fn is_debug_origin(event: &InboundEvent) -> bool {
    event.user_id.as_deref() == Some(DEBUGGER_USER_ID)
}

/// Why an event was not forwarded, used as a metric label.
pub fn skip_reason(event: &InboundEvent) -> Option<&'static str> {
    if event.platform != Platform::AlexaSkill {
        Some("unsupported_platform")
    } else if event.kind != RequestKind::Launch {
        Some("not_launch")
    } else {
        None
    }
}
