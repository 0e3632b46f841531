use std::sync::Arc;

use sdk_integration::{InteractionEvent, PresentationSdk, SdkProvider};
use shared::{
    domain::{EnvContext, EventType, NodeRef},
    protocol::ActionSpec,
};
use tracing::{debug, warn};

mod error;
mod scope;
mod table;

pub use error::DispatchError;
pub use table::HandlerTable;

use scope::{EventScope, SdkScope};

/// What a dispatch did. Informational only: callers may ignore it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    Performed {
        event_type: EventType,
        action: &'static str,
    },
    Ignored,
}

/// Runs one handler's table against incoming events.
///
/// Each [`handle`](Self::handle) call acquires its own SDK handle and
/// releases it, together with the event, before returning.
#[derive(Clone)]
pub struct EventDispatcher {
    table: Arc<HandlerTable>,
    provider: Arc<dyn SdkProvider>,
    env: Option<EnvContext>,
}

impl EventDispatcher {
    pub fn new(table: Arc<HandlerTable>, provider: Arc<dyn SdkProvider>) -> Self {
        Self {
            table,
            provider,
            env: None,
        }
    }

    /// Environment passed to handles that support `setEnv`. Without one,
    /// `setEnv` is never called, even on capable handles.
    pub fn with_env(mut self, env: EnvContext) -> Self {
        self.env = Some(env);
        self
    }

    pub fn handle<E: InteractionEvent>(&self, event: E) -> Result<DispatchOutcome, DispatchError> {
        let event = EventScope::new(event);
        let handler = self.table.id();

        let sdk = self
            .provider
            .acquire()
            .map_err(|source| DispatchError::Acquire {
                handler: handler.clone(),
                source,
            })?;
        let mut sdk = SdkScope::new(sdk);

        if let Some(env) = &self.env {
            match sdk.env_config() {
                Some(config) => config.set_env(env),
                None => debug!(%handler, "sdk handle has no setEnv, skipping environment"),
            }
        }

        let Some((event_type, action)) = self.table.resolve(event.event_type()) else {
            debug!(%handler, event_type = event.event_type(), "no action bound");
            return Ok(DispatchOutcome::Ignored);
        };

        self.perform(&mut *sdk, event_type, action, event.target())?;
        debug!(%handler, %event_type, action = action.name(), "action performed");

        Ok(DispatchOutcome::Performed {
            event_type,
            action: action.name(),
        })
    }

    fn perform(
        &self,
        sdk: &mut dyn PresentationSdk,
        event_type: EventType,
        action: &ActionSpec,
        target: Option<&NodeRef>,
    ) -> Result<(), DispatchError> {
        let result = match action {
            ActionSpec::OpenUrl {
                url,
                target: url_target,
            } => sdk.open_url(url, url_target),
            ActionSpec::PresentState {
                from_state,
                to_state,
                options,
            } => {
                let node = self.require_target(target, event_type, action)?;
                sdk.present_state(node, from_state, to_state, options)
            }
            ActionSpec::DismissState => {
                let node = self.require_target(target, event_type, action)?;
                sdk.dismiss_state(node)
            }
            ActionSpec::SetState {
                from_state,
                to_state,
                options,
            } => {
                let node = self.require_target(target, event_type, action)?;
                sdk.set_state(node, from_state, to_state, options)
            }
            ActionSpec::SetCurrentFrame { frame_id } => sdk.set_current_frame(frame_id),
            ActionSpec::PresentFrame { frame_id } => sdk.present_frame(frame_id),
            ActionSpec::DismissFrame => sdk.dismiss_frame(),
        };

        result.map_err(|source| {
            warn!(
                handler = %self.table.id(),
                %event_type,
                action = action.name(),
                error = %source,
                "sdk call failed"
            );
            DispatchError::Sdk {
                handler: self.table.id().clone(),
                action: action.name(),
                source,
            }
        })
    }

    fn require_target<'a>(
        &self,
        target: Option<&'a NodeRef>,
        event_type: EventType,
        action: &ActionSpec,
    ) -> Result<&'a NodeRef, DispatchError> {
        target.ok_or_else(|| DispatchError::MissingTarget {
            handler: self.table.id().clone(),
            event_type,
            action: action.name(),
        })
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
