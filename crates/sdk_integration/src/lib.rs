use shared::domain::{EnvContext, FrameId, NodeRef, StateId, TransitionOptions, UiEvent};

mod recording;

pub use recording::{RecordingProvider, RecordingSdk, SdkCall};

/// Optional `setEnv` capability of an SDK handle.
pub trait EnvConfigurable {
    fn set_env(&mut self, env: &EnvContext);
}

/// Optional explicit release of a host-owned object.
pub trait Releasable {
    fn release(&mut self);
}

/// Presentation and navigation operations of the host SDK.
///
/// Optional capabilities are exposed through accessors returning `None` by
/// default, so a handle only opts in to what it supports.
pub trait PresentationSdk: Send {
    fn open_url(&mut self, url: &str, target: &str) -> anyhow::Result<()>;
    fn present_state(
        &mut self,
        target: &NodeRef,
        from_state: &StateId,
        to_state: &StateId,
        options: &TransitionOptions,
    ) -> anyhow::Result<()>;
    fn dismiss_state(&mut self, target: &NodeRef) -> anyhow::Result<()>;
    fn set_state(
        &mut self,
        target: &NodeRef,
        from_state: &StateId,
        to_state: &StateId,
        options: &TransitionOptions,
    ) -> anyhow::Result<()>;
    fn set_current_frame(&mut self, frame_id: &FrameId) -> anyhow::Result<()>;
    fn present_frame(&mut self, frame_id: &FrameId) -> anyhow::Result<()>;
    fn dismiss_frame(&mut self) -> anyhow::Result<()>;

    fn env_config(&mut self) -> Option<&mut dyn EnvConfigurable> {
        None
    }

    fn releaser(&mut self) -> Option<&mut dyn Releasable> {
        None
    }
}

/// Hands out a fresh SDK handle per dispatch.
pub trait SdkProvider: Send + Sync {
    fn acquire(&self) -> anyhow::Result<Box<dyn PresentationSdk>>;
}

/// An event delivered by the UI layer.
pub trait InteractionEvent {
    fn event_type(&self) -> &str;
    fn target(&self) -> Option<&NodeRef>;

    fn releaser(&mut self) -> Option<&mut dyn Releasable> {
        None
    }
}

impl InteractionEvent for UiEvent {
    fn event_type(&self) -> &str {
        &self.event_type
    }

    fn target(&self) -> Option<&NodeRef> {
        self.target.as_ref()
    }
}

impl<E: InteractionEvent + ?Sized> InteractionEvent for &mut E {
    fn event_type(&self) -> &str {
        (**self).event_type()
    }

    fn target(&self) -> Option<&NodeRef> {
        (**self).target()
    }

    fn releaser(&mut self) -> Option<&mut dyn Releasable> {
        (**self).releaser()
    }
}
