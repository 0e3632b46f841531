use std::sync::{Arc, Mutex, PoisonError};

use anyhow::bail;
use serde::Serialize;
use shared::domain::{EnvContext, FrameId, NodeRef, StateId, TransitionOptions};
use tracing::debug;

use crate::{EnvConfigurable, PresentationSdk, Releasable, SdkProvider};

/// One observed SDK invocation, in call order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "call", rename_all = "snake_case")]
pub enum SdkCall {
    SetEnv {
        env: EnvContext,
    },
    OpenUrl {
        url: String,
        target: String,
    },
    PresentState {
        target: NodeRef,
        from_state: StateId,
        to_state: StateId,
        options: TransitionOptions,
    },
    DismissState {
        target: NodeRef,
    },
    SetState {
        target: NodeRef,
        from_state: StateId,
        to_state: StateId,
        options: TransitionOptions,
    },
    SetCurrentFrame {
        frame_id: FrameId,
    },
    PresentFrame {
        frame_id: FrameId,
    },
    DismissFrame,
    Release,
}

impl SdkCall {
    pub fn name(&self) -> &'static str {
        match self {
            SdkCall::SetEnv { .. } => "set_env",
            SdkCall::OpenUrl { .. } => "open_url",
            SdkCall::PresentState { .. } => "present_state",
            SdkCall::DismissState { .. } => "dismiss_state",
            SdkCall::SetState { .. } => "set_state",
            SdkCall::SetCurrentFrame { .. } => "set_current_frame",
            SdkCall::PresentFrame { .. } => "present_frame",
            SdkCall::DismissFrame => "dismiss_frame",
            SdkCall::Release => "release",
        }
    }

    /// Calls that change what the host presents, as opposed to handle
    /// bookkeeping.
    pub fn is_state_mutating(&self) -> bool {
        !matches!(self, SdkCall::SetEnv { .. } | SdkCall::Release)
    }
}

type CallLog = Arc<Mutex<Vec<SdkCall>>>;

/// SDK handle that records calls instead of presenting anything.
pub struct RecordingSdk {
    calls: CallLog,
    env_capable: bool,
    release_capable: bool,
    fail_on: Option<&'static str>,
}

impl RecordingSdk {
    fn record(&self, call: SdkCall) -> anyhow::Result<()> {
        let name = call.name();
        debug!(call = name, ?call, "sdk call");
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(call);
        if self.fail_on == Some(name) {
            bail!("sdk rejected {name}");
        }
        Ok(())
    }
}

impl PresentationSdk for RecordingSdk {
    fn open_url(&mut self, url: &str, target: &str) -> anyhow::Result<()> {
        self.record(SdkCall::OpenUrl {
            url: url.to_string(),
            target: target.to_string(),
        })
    }

    fn present_state(
        &mut self,
        target: &NodeRef,
        from_state: &StateId,
        to_state: &StateId,
        options: &TransitionOptions,
    ) -> anyhow::Result<()> {
        self.record(SdkCall::PresentState {
            target: target.clone(),
            from_state: from_state.clone(),
            to_state: to_state.clone(),
            options: *options,
        })
    }

    fn dismiss_state(&mut self, target: &NodeRef) -> anyhow::Result<()> {
        self.record(SdkCall::DismissState {
            target: target.clone(),
        })
    }

    fn set_state(
        &mut self,
        target: &NodeRef,
        from_state: &StateId,
        to_state: &StateId,
        options: &TransitionOptions,
    ) -> anyhow::Result<()> {
        self.record(SdkCall::SetState {
            target: target.clone(),
            from_state: from_state.clone(),
            to_state: to_state.clone(),
            options: *options,
        })
    }

    fn set_current_frame(&mut self, frame_id: &FrameId) -> anyhow::Result<()> {
        self.record(SdkCall::SetCurrentFrame {
            frame_id: frame_id.clone(),
        })
    }

    fn present_frame(&mut self, frame_id: &FrameId) -> anyhow::Result<()> {
        self.record(SdkCall::PresentFrame {
            frame_id: frame_id.clone(),
        })
    }

    fn dismiss_frame(&mut self) -> anyhow::Result<()> {
        self.record(SdkCall::DismissFrame)
    }

    fn env_config(&mut self) -> Option<&mut dyn EnvConfigurable> {
        if self.env_capable {
            Some(self as &mut dyn EnvConfigurable)
        } else {
            None
        }
    }

    fn releaser(&mut self) -> Option<&mut dyn Releasable> {
        if self.release_capable {
            Some(self as &mut dyn Releasable)
        } else {
            None
        }
    }
}

impl EnvConfigurable for RecordingSdk {
    fn set_env(&mut self, env: &EnvContext) {
        // setEnv has no failure channel
        let _ = self.record(SdkCall::SetEnv { env: env.clone() });
    }
}

impl Releasable for RecordingSdk {
    fn release(&mut self) {
        let _ = self.record(SdkCall::Release);
    }
}

/// Provider whose handles all append to one shared call log.
#[derive(Clone, Default)]
pub struct RecordingProvider {
    calls: CallLog,
    env_capable: bool,
    release_capable: bool,
    fail_on: Option<&'static str>,
}

impl RecordingProvider {
    /// Handles that support both `setEnv` and explicit release.
    pub fn new() -> Self {
        Self::default().with_env(true).with_release(true)
    }

    pub fn with_env(mut self, capable: bool) -> Self {
        self.env_capable = capable;
        self
    }

    pub fn with_release(mut self, capable: bool) -> Self {
        self.release_capable = capable;
        self
    }

    /// Makes the named SDK operation fail after it is recorded.
    pub fn failing_on(mut self, call: &'static str) -> Self {
        self.fail_on = Some(call);
        self
    }

    pub fn calls(&self) -> Vec<SdkCall> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn take_calls(&self) -> Vec<SdkCall> {
        std::mem::take(&mut *self.calls.lock().unwrap_or_else(PoisonError::into_inner))
    }
}

impl SdkProvider for RecordingProvider {
    fn acquire(&self) -> anyhow::Result<Box<dyn PresentationSdk>> {
        Ok(Box::new(RecordingSdk {
            calls: Arc::clone(&self.calls),
            env_capable: self.env_capable,
            release_capable: self.release_capable,
            fail_on: self.fail_on,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capabilities_follow_provider_flags() {
        let bare = RecordingProvider::default();
        let mut sdk = bare.acquire().expect("sdk");
        assert!(sdk.env_config().is_none());
        assert!(sdk.releaser().is_none());

        let full = RecordingProvider::new();
        let mut sdk = full.acquire().expect("sdk");
        sdk.env_config()
            .expect("env capability")
            .set_env(&EnvContext::from("preview"));
        sdk.releaser().expect("release capability").release();
        assert_eq!(
            full.calls(),
            vec![
                SdkCall::SetEnv {
                    env: EnvContext::from("preview")
                },
                SdkCall::Release
            ]
        );
    }

    #[test]
    fn failing_call_is_still_recorded() {
        let provider = RecordingProvider::new().failing_on("dismiss_state");
        let mut sdk = provider.acquire().expect("sdk");
        let err = sdk
            .dismiss_state(&NodeRef::from("1:80"))
            .expect_err("injected failure");
        assert!(err.to_string().contains("dismiss_state"));
        assert_eq!(provider.take_calls().len(), 1);
        assert!(provider.calls().is_empty());
    }

    #[test]
    fn calls_serialize_with_sdk_option_names() {
        let call = SdkCall::PresentState {
            target: "19:17".into(),
            from_state: "19:17".into(),
            to_state: "19:28".into(),
            options: TransitionOptions::default(),
        };
        let value = serde_json::to_value(&call).expect("json");
        assert_eq!(value["call"], "present_state");
        assert_eq!(value["options"]["animation"]["timingFunction"], "linear");
    }
}
