//! Per-dispatch ownership of the SDK handle and the incoming event.
//!
//! Both are released from `Drop`, so release runs on every exit path of a
//! dispatch, including error returns and unwinding.

use std::ops::{Deref, DerefMut};

use sdk_integration::{InteractionEvent, PresentationSdk};
use tracing::trace;

pub(crate) struct SdkScope {
    sdk: Box<dyn PresentationSdk>,
}

impl SdkScope {
    pub(crate) fn new(sdk: Box<dyn PresentationSdk>) -> Self {
        Self { sdk }
    }
}

impl Deref for SdkScope {
    type Target = dyn PresentationSdk;

    fn deref(&self) -> &Self::Target {
        self.sdk.as_ref()
    }
}

impl DerefMut for SdkScope {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.sdk.as_mut()
    }
}

impl Drop for SdkScope {
    fn drop(&mut self) {
        match self.sdk.releaser() {
            Some(releaser) => releaser.release(),
            None => trace!("sdk handle has no release capability"),
        }
    }
}

pub(crate) struct EventScope<E: InteractionEvent> {
    event: E,
}

impl<E: InteractionEvent> EventScope<E> {
    pub(crate) fn new(event: E) -> Self {
        Self { event }
    }
}

impl<E: InteractionEvent> Deref for EventScope<E> {
    type Target = E;

    fn deref(&self) -> &Self::Target {
        &self.event
    }
}

impl<E: InteractionEvent> Drop for EventScope<E> {
    fn drop(&mut self) {
        match self.event.releaser() {
            Some(releaser) => releaser.release(),
            None => trace!("event has no release capability"),
        }
    }
}
