use serde::{Deserialize, Serialize};
use std::time::SystemTime;

/// Represents the phase of a keystroke
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum KeyPhase {
    KeyDown,
    KeyUp,
    KeyPress,
}

impl std::fmt::Display for KeyPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            KeyPhase::KeyDown => "keydown",
            KeyPhase::KeyUp => "keyup",
            KeyPhase::KeyPress => "keypress",
        };
        write!(f, "{name}")
    }
}

/// A programmatically constructed keyboard event, shaped so that listeners
/// cannot tell it apart from one produced by real user interaction
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SyntheticKeyEvent {
    /// Which phase of the keystroke this event describes
    pub phase: KeyPhase,

    /// The logical key value, e.g. "Enter"
    pub key: String,

    /// The physical key identifier, e.g. "Enter"
    pub code: String,

    /// Legacy numeric key code many hosts still switch on
    #[serde(rename = "keyCode")]
    pub key_code: u16,

    /// Legacy alias of `keyCode`
    pub which: u16,

    /// Whether ancestor listeners observe the event
    pub bubbles: bool,
}

impl SyntheticKeyEvent {
    /// Create one phase of an Enter keystroke
    pub fn enter(phase: KeyPhase) -> Self {
        Self {
            phase,
            key: "Enter".to_string(),
            code: "Enter".to_string(),
            key_code: 13,
            which: 13,
            bubbles: true,
        }
    }

    /// The full forged Enter keystroke, in dispatch order
    pub fn enter_sequence() -> [SyntheticKeyEvent; 3] {
        [
            Self::enter(KeyPhase::KeyDown),
            Self::enter(KeyPhase::KeyUp),
            Self::enter(KeyPhase::KeyPress),
        ]
    }

    /// Convert to JSON string
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// An input-change notification from an observed text field
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct InputEvent {
    /// The field's value after the change
    pub value: String,

    /// When the change happened (milliseconds since epoch), if the host
    /// carries a wall clock
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp_ms: Option<u64>,
}

impl InputEvent {
    /// Create an input event stamped with the current wall-clock time
    pub fn now(value: String) -> Self {
        let now = SystemTime::now()
            .duration_since(SystemTime::UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as u64;

        Self {
            value,
            timestamp_ms: Some(now),
        }
    }
}
