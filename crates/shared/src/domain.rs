use std::{borrow::Borrow, fmt, str::FromStr};

use serde::{Deserialize, Serialize};

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }

            pub fn is_blank(&self) -> bool {
                self.0.trim().is_empty()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl Borrow<str> for $name {
            fn borrow(&self) -> &str {
                &self.0
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }
    };
}

id_newtype!(HandlerId);
id_newtype!(NodeRef);
id_newtype!(StateId);
id_newtype!(FrameId);
id_newtype!(EnvContext);

/// Interaction kinds the runtime forwards to handlers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EventType {
    #[serde(rename = "click")]
    Click,
    #[serde(rename = "dblclick")]
    DoubleClick,
    #[serde(rename = "contextmenu")]
    ContextMenu,
    #[serde(rename = "mouseenter")]
    MouseEnter,
    #[serde(rename = "mouseleave")]
    MouseLeave,
    #[serde(rename = "mousedown")]
    MouseDown,
    #[serde(rename = "mouseup")]
    MouseUp,
    #[serde(rename = "mousemove")]
    MouseMove,
    #[serde(rename = "keydown")]
    KeyDown,
    #[serde(rename = "keyup")]
    KeyUp,
    #[serde(rename = "touchstart")]
    TouchStart,
    #[serde(rename = "touchmove")]
    TouchMove,
    #[serde(rename = "touchend")]
    TouchEnd,
}

impl EventType {
    pub const ALL: [EventType; 13] = [
        EventType::Click,
        EventType::DoubleClick,
        EventType::ContextMenu,
        EventType::MouseEnter,
        EventType::MouseLeave,
        EventType::MouseDown,
        EventType::MouseUp,
        EventType::MouseMove,
        EventType::KeyDown,
        EventType::KeyUp,
        EventType::TouchStart,
        EventType::TouchMove,
        EventType::TouchEnd,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            EventType::Click => "click",
            EventType::DoubleClick => "dblclick",
            EventType::ContextMenu => "contextmenu",
            EventType::MouseEnter => "mouseenter",
            EventType::MouseLeave => "mouseleave",
            EventType::MouseDown => "mousedown",
            EventType::MouseUp => "mouseup",
            EventType::MouseMove => "mousemove",
            EventType::KeyDown => "keydown",
            EventType::KeyUp => "keyup",
            EventType::TouchStart => "touchstart",
            EventType::TouchMove => "touchmove",
            EventType::TouchEnd => "touchend",
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownEventType(pub String);

impl fmt::Display for UnknownEventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown event type '{}'", self.0)
    }
}

impl std::error::Error for UnknownEventType {}

impl FromStr for EventType {
    type Err = UnknownEventType;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        EventType::ALL
            .into_iter()
            .find(|kind| kind.as_str() == value)
            .ok_or_else(|| UnknownEventType(value.to_string()))
    }
}

/// A UI event as delivered by the host runtime.
///
/// `event_type` stays a raw string: anything outside [`EventType`] is simply
/// unmatched by every handler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UiEvent {
    #[serde(rename = "type")]
    pub event_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<NodeRef>,
}

impl UiEvent {
    pub fn new(event_type: impl Into<String>, target: Option<NodeRef>) -> Self {
        Self {
            event_type: event_type.into(),
            target,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AnimationKind {
    None,
    Dissolve,
    SmartAnimate,
    MoveIn,
    MoveOut,
    Push,
    SlideIn,
    SlideOut,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TimingFunction {
    Linear,
    Ease,
    EaseIn,
    EaseOut,
    EaseInOut,
}

/// Visual transition applied by the SDK. `duration` is in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Animation {
    #[serde(rename = "type")]
    pub kind: AnimationKind,
    pub timing_function: TimingFunction,
    pub duration: f64,
}

impl Default for Animation {
    fn default() -> Self {
        Self {
            kind: AnimationKind::None,
            timing_function: TimingFunction::Linear,
            duration: 0.3,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransitionOptions {
    pub animation: Animation,
    #[serde(default)]
    pub reset_scroll_position: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_type_names_match_dom_spelling() {
        for kind in EventType::ALL {
            let json = serde_json::to_string(&kind).expect("serialize");
            assert_eq!(json, format!("\"{}\"", kind.as_str()));
            assert_eq!(kind.as_str().parse::<EventType>(), Ok(kind));
        }
    }

    #[test]
    fn unknown_event_type_is_reported_not_guessed() {
        assert_eq!(
            "MouseEnter".parse::<EventType>(),
            Err(UnknownEventType("MouseEnter".to_string()))
        );
        assert!("wheel".parse::<EventType>().is_err());
    }

    #[test]
    fn transition_options_use_sdk_wire_names() {
        let raw = r#"{"animation": {"type": "none", "timingFunction": "linear", "duration": 0.15000000596046448}, "resetScrollPosition": false}"#;
        let options: TransitionOptions = serde_json::from_str(raw).expect("options");
        assert_eq!(options.animation.kind, AnimationKind::None);
        assert_eq!(options.animation.timing_function, TimingFunction::Linear);
        assert!((options.animation.duration - 0.15).abs() < 1e-6);
        assert!(!options.reset_scroll_position);

        let back = serde_json::to_value(options).expect("serialize");
        assert_eq!(back["animation"]["timingFunction"], "linear");
        assert_eq!(back["resetScrollPosition"], false);
    }

    #[test]
    fn ui_event_target_is_optional() {
        let event: UiEvent = serde_json::from_str(r#"{"type": "click"}"#).expect("event");
        assert_eq!(event.event_type, "click");
        assert!(event.target.is_none());
    }
}
