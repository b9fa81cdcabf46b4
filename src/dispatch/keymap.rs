//! Action-key mapping tables
//!
//! Features are resolved to logical action-key ids before translation into
//! application actions. The translation table itself belongs to application
//! configuration; this module owns only the feature→key table and the
//! default controller layout.

use std::collections::HashMap;

use crate::handler::InputKind;

/// A translated application action
#[derive(Debug, Clone, PartialEq)]
pub struct Action {
    pub id: u32,
    /// Magnitude for analog actions, 1.0 for digital presses
    pub amount: f32,
}

impl Action {
    pub fn new(id: u32, amount: f32) -> Self {
        Self { id, amount }
    }
}

/// Application-owned table translating a logical action key, in a window
/// context, into an action
pub trait ActionTranslator: Send + Sync {
    fn translate(&self, window: u32, key_id: u32) -> Option<Action>;
}

/// Destination for translated actions (the application action queue)
pub trait ActionSink: Send {
    fn queue_action(&mut self, action: Action);
}

/// Cardinal a stick is currently pointed at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StickDirection {
    Up,
    Down,
    Right,
    Left,
}

impl StickDirection {
    pub const ALL: [StickDirection; 4] = [
        StickDirection::Up,
        StickDirection::Down,
        StickDirection::Right,
        StickDirection::Left,
    ];
}

/// Logical action-key ids for the default controller layout
pub mod action_keys {
    pub const BUTTON_A: u32 = 1;
    pub const BUTTON_B: u32 = 2;
    pub const BUTTON_X: u32 = 3;
    pub const BUTTON_Y: u32 = 4;
    pub const START: u32 = 5;
    pub const BACK: u32 = 6;
    pub const GUIDE: u32 = 7;
    pub const LEFT_BUMPER: u32 = 8;
    pub const RIGHT_BUMPER: u32 = 9;
    pub const LEFT_THUMB: u32 = 10;
    pub const RIGHT_THUMB: u32 = 11;
    pub const LEFT_TRIGGER: u32 = 12;
    pub const RIGHT_TRIGGER: u32 = 13;
    pub const DPAD_UP: u32 = 14;
    pub const DPAD_DOWN: u32 = 15;
    pub const DPAD_LEFT: u32 = 16;
    pub const DPAD_RIGHT: u32 = 17;
    pub const LEFT_STICK_UP: u32 = 18;
    pub const LEFT_STICK_DOWN: u32 = 19;
    pub const LEFT_STICK_RIGHT: u32 = 20;
    pub const LEFT_STICK_LEFT: u32 = 21;
    pub const RIGHT_STICK_UP: u32 = 22;
    pub const RIGHT_STICK_DOWN: u32 = 23;
    pub const RIGHT_STICK_RIGHT: u32 = 24;
    pub const RIGHT_STICK_LEFT: u32 = 25;
}

/// One bound key: its logical id and how its consumer receives it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEntry {
    pub key_id: u32,
    pub kind: InputKind,
}

type TableKey = (String, Option<StickDirection>);

/// Feature (plus stick direction, where applicable) → logical action key
#[derive(Debug, Default, Clone)]
pub struct KeyTable {
    entries: HashMap<TableKey, KeyEntry>,
}

impl KeyTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bind(
        &mut self,
        feature: &str,
        direction: Option<StickDirection>,
        key_id: u32,
        kind: InputKind,
    ) {
        self.entries
            .insert((feature.to_string(), direction), KeyEntry { key_id, kind });
    }

    pub fn lookup(&self, feature: &str, direction: Option<StickDirection>) -> Option<KeyEntry> {
        self.entries
            .get(&(feature.to_string(), direction))
            .copied()
    }

    /// Whether a feature has any directional (stick) bindings
    pub fn is_stick(&self, feature: &str) -> bool {
        StickDirection::ALL
            .iter()
            .any(|dir| self.entries.contains_key(&(feature.to_string(), Some(*dir))))
    }

    /// The input kind a consumer expects for a feature.
    ///
    /// Stick features are inherently analog; unbound features report `None`.
    pub fn input_kind(&self, feature: &str) -> Option<InputKind> {
        if let Some(entry) = self.lookup(feature, None) {
            return Some(entry.kind);
        }
        if self.is_stick(feature) {
            return Some(InputKind::Analog);
        }
        None
    }

    /// The default controller layout: face/system/shoulder buttons and the
    /// d-pad digital, triggers analog, both sticks bound per cardinal
    pub fn default_controller() -> Self {
        use action_keys::*;

        let mut table = KeyTable::new();
        let digital: [(&str, u32); 15] = [
            ("a", BUTTON_A),
            ("b", BUTTON_B),
            ("x", BUTTON_X),
            ("y", BUTTON_Y),
            ("start", START),
            ("back", BACK),
            ("guide", GUIDE),
            ("leftbumper", LEFT_BUMPER),
            ("rightbumper", RIGHT_BUMPER),
            ("leftthumb", LEFT_THUMB),
            ("rightthumb", RIGHT_THUMB),
            ("up", DPAD_UP),
            ("down", DPAD_DOWN),
            ("left", DPAD_LEFT),
            ("right", DPAD_RIGHT),
        ];
        for (feature, key_id) in digital {
            table.bind(feature, None, key_id, InputKind::Digital);
        }

        table.bind("lefttrigger", None, LEFT_TRIGGER, InputKind::Analog);
        table.bind("righttrigger", None, RIGHT_TRIGGER, InputKind::Analog);

        let sticks = [
            ("leftstick", [
                (StickDirection::Up, LEFT_STICK_UP),
                (StickDirection::Down, LEFT_STICK_DOWN),
                (StickDirection::Right, LEFT_STICK_RIGHT),
                (StickDirection::Left, LEFT_STICK_LEFT),
            ]),
            ("rightstick", [
                (StickDirection::Up, RIGHT_STICK_UP),
                (StickDirection::Down, RIGHT_STICK_DOWN),
                (StickDirection::Right, RIGHT_STICK_RIGHT),
                (StickDirection::Left, RIGHT_STICK_LEFT),
            ]),
        ];
        for (feature, directions) in sticks {
            for (direction, key_id) in directions {
                table.bind(feature, Some(direction), key_id, InputKind::Digital);
            }
        }

        table
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_controller_layout() {
        let table = KeyTable::default_controller();

        assert_eq!(
            table.lookup("a", None),
            Some(KeyEntry {
                key_id: action_keys::BUTTON_A,
                kind: InputKind::Digital,
            })
        );
        assert_eq!(
            table.lookup("lefttrigger", None).map(|e| e.kind),
            Some(InputKind::Analog)
        );
        assert_eq!(
            table
                .lookup("leftstick", Some(StickDirection::Right))
                .map(|e| e.key_id),
            Some(action_keys::LEFT_STICK_RIGHT)
        );
        assert!(table.lookup("leftstick", None).is_none());
    }

    #[test]
    fn test_input_kind_resolution() {
        let table = KeyTable::default_controller();

        assert_eq!(table.input_kind("a"), Some(InputKind::Digital));
        assert_eq!(table.input_kind("lefttrigger"), Some(InputKind::Analog));
        assert_eq!(table.input_kind("leftstick"), Some(InputKind::Analog));
        assert_eq!(table.input_kind("unknown"), None);
    }

    #[test]
    fn test_bind_replaces() {
        let mut table = KeyTable::new();
        table.bind("a", None, 1, InputKind::Digital);
        table.bind("a", None, 2, InputKind::Analog);

        assert_eq!(
            table.lookup("a", None),
            Some(KeyEntry {
                key_id: 2,
                kind: InputKind::Analog,
            })
        );
    }
}
