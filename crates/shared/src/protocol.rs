use serde::{Deserialize, Serialize};
use url::{ParseError, Url};

use crate::{
    domain::{EventType, FrameId, HandlerId, StateId, TransitionOptions},
    error::{ValidationCode, ValidationError},
};

pub const DEFAULT_URL_TARGET: &str = "_blank";

fn default_url_target() -> String {
    DEFAULT_URL_TARGET.to_string()
}

/// Side effect bound to one event type of a handler.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ActionSpec {
    /// `url` is handed to the SDK verbatim; relative locators are allowed.
    OpenUrl {
        url: String,
        #[serde(default = "default_url_target")]
        target: String,
    },
    PresentState {
        from_state: StateId,
        to_state: StateId,
        #[serde(default)]
        options: TransitionOptions,
    },
    DismissState,
    SetState {
        from_state: StateId,
        to_state: StateId,
        #[serde(default)]
        options: TransitionOptions,
    },
    SetCurrentFrame {
        frame_id: FrameId,
    },
    PresentFrame {
        frame_id: FrameId,
    },
    DismissFrame,
}

impl ActionSpec {
    pub fn name(&self) -> &'static str {
        match self {
            ActionSpec::OpenUrl { .. } => "open_url",
            ActionSpec::PresentState { .. } => "present_state",
            ActionSpec::DismissState => "dismiss_state",
            ActionSpec::SetState { .. } => "set_state",
            ActionSpec::SetCurrentFrame { .. } => "set_current_frame",
            ActionSpec::PresentFrame { .. } => "present_frame",
            ActionSpec::DismissFrame => "dismiss_frame",
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        match self {
            ActionSpec::OpenUrl { url, target } => {
                validate_url(url)?;
                if target.trim().is_empty() {
                    return Err(ValidationError::new(
                        ValidationCode::EmptyUrlTarget,
                        "open_url target must not be empty",
                    ));
                }
                Ok(())
            }
            ActionSpec::PresentState {
                from_state,
                to_state,
                options,
            }
            | ActionSpec::SetState {
                from_state,
                to_state,
                options,
            } => {
                if from_state.is_blank() || to_state.is_blank() {
                    return Err(ValidationError::new(
                        ValidationCode::EmptyStateId,
                        format!("{} requires non-empty state ids", self.name()),
                    ));
                }
                validate_duration(options.animation.duration)
            }
            ActionSpec::SetCurrentFrame { frame_id } | ActionSpec::PresentFrame { frame_id } => {
                if frame_id.is_blank() {
                    return Err(ValidationError::new(
                        ValidationCode::EmptyFrameId,
                        format!("{} requires a non-empty frame id", self.name()),
                    ));
                }
                Ok(())
            }
            ActionSpec::DismissState | ActionSpec::DismissFrame => Ok(()),
        }
    }
}

fn validate_url(url: &str) -> Result<(), ValidationError> {
    if url.trim().is_empty() {
        return Err(ValidationError::new(
            ValidationCode::EmptyUrl,
            "open_url url must not be empty",
        ));
    }
    match Url::parse(url) {
        Ok(_) | Err(ParseError::RelativeUrlWithoutBase) => Ok(()),
        Err(err) => Err(ValidationError::new(
            ValidationCode::InvalidUrl,
            format!("open_url url '{url}' is malformed: {err}"),
        )),
    }
}

fn validate_duration(duration: f64) -> Result<(), ValidationError> {
    if duration.is_finite() && duration >= 0.0 {
        Ok(())
    } else {
        Err(ValidationError::new(
            ValidationCode::InvalidDuration,
            format!("animation duration must be a finite, non-negative number of seconds, got {duration}"),
        ))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Binding {
    pub on: EventType,
    pub action: ActionSpec,
}

/// Data form of one generated handler: the node id it was generated for and
/// its event bindings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HandlerRecord {
    pub id: HandlerId,
    #[serde(default)]
    pub bindings: Vec<Binding>,
}

impl HandlerRecord {
    pub fn new(id: impl Into<HandlerId>) -> Self {
        Self {
            id: id.into(),
            bindings: Vec::new(),
        }
    }

    pub fn bind(mut self, on: EventType, action: ActionSpec) -> Self {
        self.bindings.push(Binding { on, action });
        self
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.id.is_blank() {
            return Err(ValidationError::new(
                ValidationCode::EmptyHandlerId,
                "handler id must not be empty",
            ));
        }
        self.bindings
            .iter()
            .try_for_each(|binding| binding.action.validate())
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CatalogDocument {
    #[serde(default)]
    pub handlers: Vec<HandlerRecord>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Animation, AnimationKind, TimingFunction};

    fn hover_options() -> TransitionOptions {
        TransitionOptions {
            animation: Animation {
                kind: AnimationKind::None,
                timing_function: TimingFunction::Linear,
                duration: 0.3,
            },
            reset_scroll_position: false,
        }
    }

    #[test]
    fn open_url_target_defaults_to_blank() {
        let action: ActionSpec = serde_json::from_str(
            r#"{"type": "open_url", "url": "https://docs.verygoodgraphics.com/start/overview"}"#,
        )
        .expect("action");
        match action {
            ActionSpec::OpenUrl { url, target } => {
                assert_eq!(url, "https://docs.verygoodgraphics.com/start/overview");
                assert_eq!(target, DEFAULT_URL_TARGET);
            }
            other => panic!("unexpected action {other:?}"),
        }
    }

    fn open_url(url: &str) -> ActionSpec {
        ActionSpec::OpenUrl {
            url: url.into(),
            target: DEFAULT_URL_TARGET.into(),
        }
    }

    #[test]
    fn open_url_keeps_the_literal_text() {
        let action: ActionSpec =
            serde_json::from_str(r#"{"type": "open_url", "url": "https://Example.com:443"}"#)
                .expect("action");
        assert_eq!(action, open_url("https://Example.com:443"));
        action.validate().expect("valid");

        let back = serde_json::to_value(&action).expect("serialize");
        assert_eq!(back["url"], "https://Example.com:443");
    }

    #[test]
    fn relative_url_is_accepted_and_malformed_url_is_not() {
        open_url("/docs/start").validate().expect("relative");
        open_url("../pricing").validate().expect("relative");

        assert_eq!(
            open_url("https://exa mple.com").validate().expect_err("malformed").code,
            ValidationCode::InvalidUrl
        );
        assert_eq!(
            open_url("  ").validate().expect_err("blank").code,
            ValidationCode::EmptyUrl
        );
    }

    #[test]
    fn negative_or_nan_duration_fails_validation() {
        for duration in [-0.1, f64::NAN, f64::INFINITY] {
            let mut options = hover_options();
            options.animation.duration = duration;
            let action = ActionSpec::SetState {
                from_state: "1:70".into(),
                to_state: "1:87".into(),
                options,
            };
            let err = action.validate().expect_err("invalid duration");
            assert_eq!(err.code, ValidationCode::InvalidDuration);
        }
    }

    #[test]
    fn blank_state_id_fails_validation() {
        let action = ActionSpec::PresentState {
            from_state: "1:80".into(),
            to_state: " ".into(),
            options: hover_options(),
        };
        assert_eq!(
            action.validate().expect_err("blank").code,
            ValidationCode::EmptyStateId
        );
    }

    #[test]
    fn handler_record_reads_from_toml() {
        let raw = r#"
            [[handlers]]
            id = "1:80"

            [[handlers.bindings]]
            on = "mouseenter"
            action = { type = "present_state", from_state = "1:80", to_state = "1:22", options = { animation = { type = "none", timingFunction = "linear", duration = 0.15 }, resetScrollPosition = false } }

            [[handlers.bindings]]
            on = "mouseleave"
            action = { type = "dismiss_state" }
        "#;
        let document: CatalogDocument = toml::from_str(raw).expect("toml");
        assert_eq!(document.handlers.len(), 1);
        let record = &document.handlers[0];
        assert_eq!(record.id.as_str(), "1:80");
        assert_eq!(record.bindings.len(), 2);
        assert_eq!(record.bindings[1].action, ActionSpec::DismissState);
        record.validate().expect("valid");
    }
}
