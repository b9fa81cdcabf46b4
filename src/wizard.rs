//! Interactive mapping wizard
//!
//! Walks the user through a controller profile one feature at a time
//! ("press A", "move the stick up"), writing captured primitives into a
//! button map. Runs as a small state machine; primitives arrive from the
//! input thread while the UI drives focus and abort, so every transition
//! happens under one mutex.

use log::debug;
use parking_lot::Mutex;

use crate::feature::{FeatureType, JoystickFeature};
use crate::handler::ButtonMapper;
use crate::mapping::ButtonMap;
use crate::primitive::DriverPrimitive;

/// Where the wizard is in the prompt sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WizardState {
    Idle,
    PromptButton,
    PromptStickUp,
    PromptStickDown,
    PromptStickRight,
    PromptStickLeft,
    NextFeature,
    Finished,
}

impl WizardState {
    fn is_prompting(&self) -> bool {
        matches!(
            self,
            WizardState::PromptButton
                | WizardState::PromptStickUp
                | WizardState::PromptStickDown
                | WizardState::PromptStickRight
                | WizardState::PromptStickLeft
        )
    }
}

type FinishedCallback = Box<dyn Fn(bool) + Send + Sync>;

struct Session {
    state: WizardState,
    feature_index: usize,
    // Stick captures buffered until every needed direction is known
    up: Option<DriverPrimitive>,
    down: Option<DriverPrimitive>,
    right: Option<DriverPrimitive>,
    left: Option<DriverPrimitive>,
    auto_close: bool,
}

impl Session {
    fn new() -> Self {
        Self {
            state: WizardState::Idle,
            feature_index: 0,
            up: None,
            down: None,
            right: None,
            left: None,
            auto_close: true,
        }
    }

    fn clear_captures(&mut self) {
        self.up = None;
        self.down = None;
        self.right = None;
        self.left = None;
    }
}

/// Drives one mapping session over a fixed list of feature templates
pub struct ButtonMapperWizard {
    controller_id: String,
    features: Vec<JoystickFeature>,
    cancel_primitive: Option<DriverPrimitive>,
    on_finished: Option<FinishedCallback>,
    session: Mutex<Session>,
}

impl ButtonMapperWizard {
    /// `features` gives the names and types to prompt for, in order
    pub fn new(controller_id: &str, features: Vec<JoystickFeature>) -> Self {
        Self {
            controller_id: controller_id.to_string(),
            features,
            cancel_primitive: None,
            on_finished: None,
            session: Mutex::new(Session::new()),
        }
    }

    /// Designate a primitive that aborts the session from any prompt
    pub fn with_cancel(mut self, primitive: DriverPrimitive) -> Self {
        self.cancel_primitive = Some(primitive);
        self
    }

    /// Callback invoked when the session ends; receives whether it was
    /// aborted (in which case auto-close is suppressed)
    pub fn with_finished_callback(mut self, callback: FinishedCallback) -> Self {
        self.on_finished = Some(callback);
        self
    }

    /// Begin a session at the first feature.
    ///
    /// Returns false if a session is already active.
    pub fn start(&self) -> bool {
        let finished = {
            let mut session = self.session.lock();
            if session.state.is_prompting() {
                return false;
            }
            *session = Session::new();
            self.dispatch_current(&mut session)
        };
        self.notify(finished);
        true
    }

    /// Abort the active session, discarding any buffered captures
    pub fn abort(&self) {
        let finished = {
            let mut session = self.session.lock();
            if !session.state.is_prompting() {
                return;
            }
            Some(self.finish(&mut session, true))
        };
        self.notify(finished);
    }

    /// The UI moved focus to another feature; an active session on a
    /// different index is abandoned
    pub fn on_focus_changed(&self, feature_index: usize) {
        let finished = {
            let mut session = self.session.lock();
            if !session.state.is_prompting() || session.feature_index == feature_index {
                return;
            }
            Some(self.finish(&mut session, true))
        };
        self.notify(finished);
    }

    /// The feature currently prompted for, with the prompt state
    pub fn current_prompt(&self) -> Option<(String, WizardState)> {
        let session = self.session.lock();
        if !session.state.is_prompting() {
            return None;
        }
        self.features
            .get(session.feature_index)
            .map(|feature| (feature.name().to_string(), session.state))
    }

    /// Whether the last session ended without an abort
    pub fn auto_close(&self) -> bool {
        self.session.lock().auto_close
    }

    // === Transitions (session lock held) ===

    /// Enter the prompt for the current feature index, skipping feature
    /// types the flow has no prompts for. Returns the finish disposition
    /// when the feature list is exhausted.
    fn dispatch_current(&self, session: &mut Session) -> Option<bool> {
        loop {
            match self.features.get(session.feature_index) {
                None => return Some(self.finish(session, false)),
                Some(feature) => match feature.feature_type() {
                    FeatureType::Primitive => {
                        session.state = WizardState::PromptButton;
                        return None;
                    }
                    FeatureType::AnalogStick => {
                        session.state = WizardState::PromptStickUp;
                        return None;
                    }
                    FeatureType::Accelerometer => {
                        debug!("skipping {}: not promptable", feature.name());
                        session.feature_index += 1;
                    }
                },
            }
        }
    }

    fn advance(&self, session: &mut Session) -> Option<bool> {
        session.state = WizardState::NextFeature;
        session.feature_index += 1;
        session.clear_captures();
        self.dispatch_current(session)
    }

    fn finish(&self, session: &mut Session, aborted: bool) -> bool {
        session.state = WizardState::Finished;
        session.clear_captures();
        if aborted {
            session.auto_close = false;
        }
        debug!(
            "mapping session for {} {}",
            self.controller_id,
            if aborted { "aborted" } else { "complete" }
        );
        aborted
    }

    fn notify(&self, finished: Option<bool>) {
        if let Some(aborted) = finished {
            if let Some(callback) = &self.on_finished {
                callback(aborted);
            }
        }
    }
}

impl ButtonMapper for ButtonMapperWizard {
    fn controller_id(&self) -> &str {
        &self.controller_id
    }

    fn is_mapping(&self) -> bool {
        self.session.lock().state.is_prompting()
    }

    fn map_primitive(&self, button_map: &mut ButtonMap, primitive: &DriverPrimitive) -> bool {
        let mut finished: Option<bool> = None;

        let handled = {
            let mut session = self.session.lock();
            if !session.state.is_prompting() {
                return false;
            }

            if self.cancel_primitive.as_ref() == Some(primitive) {
                finished = Some(self.finish(&mut session, true));
                true
            } else if !primitive.is_valid() {
                false
            } else {
                let name = match self.features.get(session.feature_index) {
                    Some(feature) => feature.name().to_string(),
                    None => return false,
                };

                match session.state {
                    WizardState::PromptButton => {
                        if button_map.add_primitive_feature(&name, *primitive) {
                            debug!("{} mapped to {}", name, primitive);
                            finished = self.advance(&mut session);
                            true
                        } else {
                            false
                        }
                    }
                    WizardState::PromptStickUp => {
                        session.up = Some(*primitive);
                        if let Some(opposite) = primitive.opposite_semiaxis() {
                            // A full axis covers up and down in one gesture
                            session.down = Some(opposite);
                            session.state = WizardState::PromptStickRight;
                        } else {
                            session.state = WizardState::PromptStickDown;
                        }
                        true
                    }
                    WizardState::PromptStickDown => {
                        session.down = Some(*primitive);
                        session.state = WizardState::PromptStickRight;
                        true
                    }
                    WizardState::PromptStickRight => {
                        session.right = Some(*primitive);
                        if let Some(opposite) = primitive.opposite_semiaxis() {
                            session.left = Some(opposite);
                            // All four directions known: commit atomically
                            if button_map.add_analog_stick(
                                &name,
                                session.up,
                                session.down,
                                session.right,
                                session.left,
                            ) {
                                finished = self.advance(&mut session);
                                true
                            } else {
                                // Store refused; stay so the capture can be retried
                                false
                            }
                        } else {
                            session.state = WizardState::PromptStickLeft;
                            true
                        }
                    }
                    WizardState::PromptStickLeft => {
                        session.left = Some(*primitive);
                        if button_map.add_analog_stick(
                            &name,
                            session.up,
                            session.down,
                            session.right,
                            session.left,
                        ) {
                            finished = self.advance(&mut session);
                            true
                        } else {
                            false
                        }
                    }
                    _ => false,
                }
            }
        };

        self.notify(finished);
        handled
    }
}
