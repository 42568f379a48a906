use crate::scheduler::{TaskHandle, TimerEvent, Timers};
use std::time::Duration;
use tracing::trace;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Key {
    Space,
    ArrowLeft,
    ArrowRight,
    Char(char),
    Other(String),
}

impl Key {
    /// Parse a DOM `KeyboardEvent.key` / `code` value.
    pub fn from_dom(key: &str) -> Self {
        match key {
            " " | "Space" | "Spacebar" => Key::Space,
            "ArrowLeft" | "Left" => Key::ArrowLeft,
            "ArrowRight" | "Right" => Key::ArrowRight,
            other => {
                let mut chars = other.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Key::Char(c),
                    _ => Key::Other(other.to_string()),
                }
            }
        }
    }
}

/// Element that had focus when the key was pressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KeyTarget {
    TextInput,
    TextArea,
    #[default]
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyEvent {
    pub key: Key,
    pub target: KeyTarget,
}

impl KeyEvent {
    pub fn new(key: Key) -> Self {
        Self {
            key,
            target: KeyTarget::Other,
        }
    }

    pub fn in_target(key: Key, target: KeyTarget) -> Self {
        Self { key, target }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ShellCommand {
    TogglePlay,
    Skip(f64),
    ToggleFullscreen,
}

/// Map a key press to a player command.
///
/// `Some` means the key was handled and its default action should be
/// suppressed. Typing into text fields never triggers playback shortcuts.
pub fn map_key(event: &KeyEvent, skip_seconds: f64) -> Option<ShellCommand> {
    if matches!(event.target, KeyTarget::TextInput | KeyTarget::TextArea) {
        return None;
    }
    match event.key {
        Key::Space => Some(ShellCommand::TogglePlay),
        Key::ArrowLeft => Some(ShellCommand::Skip(-skip_seconds)),
        Key::ArrowRight => Some(ShellCommand::Skip(skip_seconds)),
        Key::Char('f') | Key::Char('F') => Some(ShellCommand::ToggleFullscreen),
        _ => None,
    }
}

/// Auto-hiding controls overlay.
#[derive(Debug)]
pub struct ControlsVisibility {
    visible: bool,
    hide_delay: Duration,
    hide_timer: Option<TaskHandle>,
    generation: u64,
}

impl ControlsVisibility {
    pub fn new(hide_delay: Duration) -> Self {
        Self {
            visible: true,
            hide_delay,
            hide_timer: None,
            generation: 0,
        }
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Pointer moved: show now and re-arm the hide timer.
    pub fn on_activity(&mut self, timers: &dyn Timers) {
        self.visible = true;
        self.generation += 1;
        // Replacing the handle cancels the previous timer.
        self.hide_timer = Some(timers.once(self.hide_delay, TimerEvent::HideControls(self.generation)));
    }

    /// Returns whether the controls were hidden.
    pub fn on_hide_timer(&mut self, generation: u64, is_playing: bool) -> bool {
        if generation != self.generation {
            trace!(generation, current = self.generation, "Stale hide timer");
            return false;
        }
        self.hide_timer = None;
        if is_playing {
            self.visible = false;
        }
        !self.visible
    }

    pub fn on_pointer_left(&mut self, is_playing: bool, is_fullscreen: bool) {
        if is_playing && !is_fullscreen {
            self.cancel();
            self.visible = false;
        }
    }

    pub fn on_paused(&mut self) {
        self.cancel();
        self.visible = true;
    }

    pub fn cancel(&mut self) {
        if let Some(timer) = self.hide_timer.take() {
            timer.cancel();
        }
    }
}
