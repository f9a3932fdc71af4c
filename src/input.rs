//! Polled steering input
//!
//! Key and touch listeners only flip press flags; the host samples a
//! snapshot once per frame. Holding a key therefore steers smoothly
//! instead of producing one nudge per key-repeat event.

use crate::sim::InputState;

/// Logical steering controls
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Left,
    Right,
}

impl Control {
    /// Map a `KeyboardEvent.code` to a control
    pub fn from_key_code(code: &str) -> Option<Self> {
        match code {
            "ArrowLeft" | "KeyA" => Some(Control::Left),
            "ArrowRight" | "KeyD" => Some(Control::Right),
            _ => None,
        }
    }
}

/// Host-level commands that are not fed to the simulation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    TogglePause,
}

impl Command {
    pub fn from_key_code(code: &str) -> Option<Self> {
        match code {
            "Escape" | "KeyP" => Some(Command::TogglePause),
            _ => None,
        }
    }
}

/// Which sources currently hold each control down
///
/// Keyboard and touch are tracked separately so releasing a key does not
/// cancel a finger still on the on-screen button.
#[derive(Debug, Clone, Default)]
pub struct ControlState {
    keys_left: bool,
    keys_right: bool,
    touch_left: bool,
    touch_right: bool,
}

impl ControlState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Key press/release. Returns false for keys that are not controls.
    pub fn set_key(&mut self, code: &str, down: bool) -> bool {
        match Control::from_key_code(code) {
            Some(Control::Left) => self.keys_left = down,
            Some(Control::Right) => self.keys_right = down,
            None => return false,
        }
        true
    }

    /// On-screen button press/release
    pub fn set_touch(&mut self, control: Control, down: bool) {
        match control {
            Control::Left => self.touch_left = down,
            Control::Right => self.touch_right = down,
        }
    }

    /// Drop every held control (focus lost, new run)
    pub fn release_all(&mut self) {
        *self = Self::default();
    }

    /// Snapshot for this frame's tick
    pub fn snapshot(&self) -> InputState {
        InputState {
            left: self.keys_left || self.touch_left,
            right: self.keys_right || self.touch_right,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arrow_and_wasd_map_to_controls() {
        assert_eq!(Control::from_key_code("ArrowLeft"), Some(Control::Left));
        assert_eq!(Control::from_key_code("KeyA"), Some(Control::Left));
        assert_eq!(Control::from_key_code("ArrowRight"), Some(Control::Right));
        assert_eq!(Control::from_key_code("KeyD"), Some(Control::Right));
        assert_eq!(Control::from_key_code("KeyW"), None);
    }

    #[test]
    fn test_held_key_persists_across_snapshots() {
        let mut controls = ControlState::new();
        assert!(controls.set_key("ArrowLeft", true));
        assert_eq!(controls.snapshot(), InputState::LEFT);
        assert_eq!(controls.snapshot(), InputState::LEFT);
        controls.set_key("ArrowLeft", false);
        assert_eq!(controls.snapshot(), InputState::NONE);
    }

    #[test]
    fn test_touch_and_key_are_independent() {
        let mut controls = ControlState::new();
        controls.set_touch(Control::Right, true);
        controls.set_key("KeyD", true);
        controls.set_key("KeyD", false);
        assert_eq!(controls.snapshot(), InputState::RIGHT);
        controls.set_touch(Control::Right, false);
        assert_eq!(controls.snapshot(), InputState::NONE);
    }

    #[test]
    fn test_release_all() {
        let mut controls = ControlState::new();
        controls.set_key("KeyA", true);
        controls.set_touch(Control::Right, true);
        controls.release_all();
        assert_eq!(controls.snapshot(), InputState::NONE);
    }

    #[test]
    fn test_non_control_keys_are_ignored() {
        let mut controls = ControlState::new();
        assert!(!controls.set_key("Space", true));
        assert_eq!(Command::from_key_code("Escape"), Some(Command::TogglePause));
        assert_eq!(Command::from_key_code("KeyP"), Some(Command::TogglePause));
    }
}
