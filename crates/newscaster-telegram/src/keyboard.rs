//! Reply keyboard shown to the operator.

use newscaster_core::ControllerState;
use teloxide::types::{KeyboardButton, KeyboardMarkup};

pub const START_BUTTON: &str = "▶️ Start";
pub const PAUSE_BUTTON: &str = "⏸️ Pause";
pub const STOP_BUTTON: &str = "🛑 Stop";
pub const RESTART_BUTTON: &str = "🔄 Restart";
pub const STATS_BUTTON: &str = "📊 Stats";
pub const SOURCES_BUTTON: &str = "📝 Sources";
pub const HELP_BUTTON: &str = "❓ Help";
pub const INFO_BUTTON: &str = "ℹ️ Info";

/// Actions reachable through the keyboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Button {
    Start,
    Pause,
    Stop,
    Restart,
    Stats,
    Sources,
    Help,
    Info,
}

impl Button {
    /// Match the text sent by a keyboard press.
    pub fn parse(text: &str) -> Option<Self> {
        match text.trim() {
            START_BUTTON => Some(Button::Start),
            PAUSE_BUTTON => Some(Button::Pause),
            STOP_BUTTON => Some(Button::Stop),
            RESTART_BUTTON => Some(Button::Restart),
            STATS_BUTTON => Some(Button::Stats),
            SOURCES_BUTTON => Some(Button::Sources),
            HELP_BUTTON => Some(Button::Help),
            INFO_BUTTON => Some(Button::Info),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Button::Start => START_BUTTON,
            Button::Pause => PAUSE_BUTTON,
            Button::Stop => STOP_BUTTON,
            Button::Restart => RESTART_BUTTON,
            Button::Stats => STATS_BUTTON,
            Button::Sources => SOURCES_BUTTON,
            Button::Help => HELP_BUTTON,
            Button::Info => INFO_BUTTON,
        }
    }
}

/// Button rows for the given controller state.
pub fn layout(state: ControllerState) -> Vec<Vec<Button>> {
    let controls = if state.is_running() {
        vec![Button::Pause, Button::Stop]
    } else {
        vec![Button::Start, Button::Restart]
    };

    vec![
        controls,
        vec![Button::Stats, Button::Sources],
        vec![Button::Help, Button::Info],
    ]
}

/// Build the reply keyboard for the given controller state.
pub fn main_keyboard(state: ControllerState) -> KeyboardMarkup {
    let rows = layout(state).into_iter().map(|row| {
        row.into_iter()
            .map(|button| KeyboardButton::new(button.label()))
            .collect::<Vec<_>>()
    });

    KeyboardMarkup::new(rows).resize_keyboard()
}
