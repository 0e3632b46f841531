use shared::{
    domain::{EventType, HandlerId},
    error::ValidationError,
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("handler {handler}: failed to acquire SDK handle")]
    Acquire {
        handler: HandlerId,
        #[source]
        source: anyhow::Error,
    },
    #[error("handler {handler}: {action} on {event_type} needs an event target")]
    MissingTarget {
        handler: HandlerId,
        event_type: EventType,
        action: &'static str,
    },
    #[error("handler {handler}: {action} failed")]
    Sdk {
        handler: HandlerId,
        action: &'static str,
        #[source]
        source: anyhow::Error,
    },
    #[error("handler {handler}: {event_type} is bound more than once")]
    DuplicateBinding {
        handler: HandlerId,
        event_type: EventType,
    },
    #[error("handler {handler}: invalid action")]
    InvalidAction {
        handler: HandlerId,
        #[source]
        source: ValidationError,
    },
}
