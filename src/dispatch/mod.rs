//! Action dispatch
//!
//! The dispatcher is the default feature consumer: it resolves features to
//! logical action keys, translates them through the application's table for
//! the current window, and queues the resulting actions. Digital keys get
//! press-and-hold repeats; analog keys are re-queued every processed frame
//! while held.

pub mod keymap;
pub mod repeat;

pub use keymap::{action_keys, Action, ActionSink, ActionTranslator, KeyEntry, KeyTable, StickDirection};
pub use repeat::HoldRepeater;

use std::collections::HashMap;
use std::io;
use std::sync::Arc;
use std::time::{Duration, Instant};

use log::debug;
use parking_lot::Mutex;

use crate::handler::{InputKind, JoystickInputHandler};
use repeat::{HeldKey, SharedKeyStates, SharedSink};

/// Hold/repeat timing
#[derive(Debug, Clone, Copy)]
pub struct DispatcherSettings {
    pub hold_delay: Duration,
    pub repeat_interval: Duration,
}

impl Default for DispatcherSettings {
    fn default() -> Self {
        Self {
            hold_delay: Duration::from_millis(500),
            repeat_interval: Duration::from_millis(100),
        }
    }
}

/// Default controller handler: feature events in, application actions out
pub struct InputDispatcher {
    keymap: KeyTable,
    translator: Arc<dyn ActionTranslator>,
    sink: SharedSink,
    window: u32,
    states: SharedKeyStates,
    _repeater: HoldRepeater,
}

impl InputDispatcher {
    pub fn new(
        keymap: KeyTable,
        translator: Arc<dyn ActionTranslator>,
        sink: Arc<Mutex<dyn ActionSink>>,
        settings: DispatcherSettings,
    ) -> io::Result<Self> {
        let states: SharedKeyStates = Arc::new(Mutex::new(HashMap::new()));
        let repeater = HoldRepeater::spawn(
            Arc::clone(&states),
            Arc::clone(&sink),
            settings.hold_delay,
            settings.repeat_interval,
        )?;

        Ok(Self {
            keymap,
            translator,
            sink,
            window: 0,
            states,
            _repeater: repeater,
        })
    }

    /// Switch the window context used for action translation
    pub fn set_window(&mut self, window: u32) {
        self.window = window;
    }

    /// Re-queue every held analog key with its current magnitude.
    ///
    /// Called once per processed frame; this is what keeps a
    /// digitally-emulated analog press flowing continuously.
    pub fn process_frame(&mut self) {
        let repeats: Vec<Action> = {
            let states = self.states.lock();
            states
                .values()
                .filter(|key| key.kind == InputKind::Analog && key.magnitude > 0.0)
                .map(|key| Action::new(key.action.id, key.magnitude))
                .collect()
        };
        for action in repeats {
            self.queue(action);
        }
    }

    fn queue(&self, action: Action) {
        self.sink.lock().queue_action(action);
    }

    /// Translate and queue a key, recording it as held.
    ///
    /// Never called with the state lock held; the repeat thread takes the
    /// same locks in states-then-sink order.
    fn press_key(&self, entry: KeyEntry, magnitude: f32) -> bool {
        let action = match self.translator.translate(self.window, entry.key_id) {
            Some(action) => Action::new(action.id, magnitude),
            None => {
                debug!("key {} unbound in window {}", entry.key_id, self.window);
                return false;
            }
        };

        {
            let mut states = self.states.lock();
            let now = Instant::now();
            states
                .entry(entry.key_id)
                .and_modify(|key| key.magnitude = magnitude)
                .or_insert(HeldKey {
                    action: action.clone(),
                    kind: entry.kind,
                    magnitude,
                    pressed_at: now,
                    last_repeat: None,
                });
        }
        self.queue(action);
        true
    }

    /// Drop a key's held state; optionally queue a zero-amount action so
    /// consumers observe the release
    fn release_key(&self, key_id: u32, announce: bool) -> bool {
        let released = self.states.lock().remove(&key_id);
        match released {
            Some(key) => {
                if announce {
                    self.queue(Action::new(key.action.id, 0.0));
                }
                true
            }
            None => false,
        }
    }
}

impl JoystickInputHandler for InputDispatcher {
    fn input_kind(&self, feature: &str) -> InputKind {
        self.keymap.input_kind(feature).unwrap_or(InputKind::Digital)
    }

    fn on_button_press(&mut self, feature: &str, pressed: bool) -> bool {
        let entry = match self.keymap.lookup(feature, None) {
            Some(entry) => entry,
            None => return false,
        };

        if pressed {
            self.press_key(entry, 1.0)
        } else {
            self.release_key(entry.key_id, false);
            true
        }
    }

    fn on_button_motion(&mut self, feature: &str, magnitude: f32) -> bool {
        let entry = match self.keymap.lookup(feature, None) {
            Some(entry) => entry,
            None => return false,
        };

        if magnitude > 0.0 {
            self.press_key(entry, magnitude)
        } else {
            self.release_key(entry.key_id, true);
            true
        }
    }

    fn on_analog_stick_motion(&mut self, feature: &str, x: f32, y: f32) -> bool {
        if !self.keymap.is_stick(feature) {
            return false;
        }

        let current = pointed_direction(x, y);

        // Release every other cardinal before touching the pointed one, so
        // opposing directions can never both register as active
        for direction in StickDirection::ALL {
            if Some(direction) == current {
                continue;
            }
            if let Some(entry) = self.keymap.lookup(feature, Some(direction)) {
                self.release_key(entry.key_id, true);
            }
        }

        let direction = match current {
            Some(direction) => direction,
            None => return true,
        };
        let entry = match self.keymap.lookup(feature, Some(direction)) {
            Some(entry) => entry,
            None => return true,
        };
        let magnitude = match direction {
            StickDirection::Up | StickDirection::Down => y.abs(),
            StickDirection::Right | StickDirection::Left => x.abs(),
        };

        match entry.kind {
            InputKind::Digital => {
                let active = self.states.lock().contains_key(&entry.key_id);
                if magnitude >= 0.5 {
                    if !active {
                        self.press_key(entry, 1.0);
                    }
                } else if active {
                    self.release_key(entry.key_id, true);
                }
            }
            InputKind::Analog => {
                self.press_key(entry, magnitude);
            }
        }
        true
    }

    fn on_accelerometer_motion(&mut self, _feature: &str, _x: f32, _y: f32, _z: f32) -> bool {
        // Accelerometers have no action-key mapping
        false
    }
}

/// The cardinal a stick vector points at; ties go to the vertical axis
fn pointed_direction(x: f32, y: f32) -> Option<StickDirection> {
    if x == 0.0 && y == 0.0 {
        None
    } else if y.abs() >= x.abs() {
        Some(if y > 0.0 {
            StickDirection::Up
        } else {
            StickDirection::Down
        })
    } else {
        Some(if x > 0.0 {
            StickDirection::Right
        } else {
            StickDirection::Left
        })
    }
}
