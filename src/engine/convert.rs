//! Digital/analog conversion
//!
//! Hardware reports a feature however it is wired; the consumer declares how
//! it wants to receive it. This adapter sits between the two and converts
//! press/release into magnitudes and magnitudes into thresholded
//! press/release.

use std::collections::HashSet;

use crate::handler::{InputKind, JoystickInputHandler};

/// Magnitude at which an analog report counts as a digital press
const DIGITAL_THRESHOLD: f32 = 0.5;

/// Adapter that reconciles the event's representation with the consumer's
/// declared input kind
pub struct DigitalAnalogConverter<H: JoystickInputHandler> {
    inner: H,
    /// Analog-reported features currently held past the digital threshold
    activated: HashSet<String>,
}

impl<H: JoystickInputHandler> DigitalAnalogConverter<H> {
    pub fn new(inner: H) -> Self {
        Self {
            inner,
            activated: HashSet::new(),
        }
    }

    pub fn inner(&self) -> &H {
        &self.inner
    }

    pub fn inner_mut(&mut self) -> &mut H {
        &mut self.inner
    }

    pub fn into_inner(self) -> H {
        self.inner
    }
}

impl<H: JoystickInputHandler> JoystickInputHandler for DigitalAnalogConverter<H> {
    fn input_kind(&self, feature: &str) -> InputKind {
        self.inner.input_kind(feature)
    }

    fn on_button_press(&mut self, feature: &str, pressed: bool) -> bool {
        match self.inner.input_kind(feature) {
            InputKind::Digital => self.inner.on_button_press(feature, pressed),
            InputKind::Analog => {
                let magnitude = if pressed { 1.0 } else { 0.0 };
                self.inner.on_button_motion(feature, magnitude)
            }
        }
    }

    fn on_button_motion(&mut self, feature: &str, magnitude: f32) -> bool {
        match self.inner.input_kind(feature) {
            InputKind::Analog => self.inner.on_button_motion(feature, magnitude),
            InputKind::Digital => {
                if magnitude >= DIGITAL_THRESHOLD {
                    if self.activated.insert(feature.to_string()) {
                        self.inner.on_button_press(feature, true)
                    } else {
                        // Still held past the threshold; already reported
                        true
                    }
                } else if self.activated.remove(feature) {
                    self.inner.on_button_press(feature, false)
                } else {
                    true
                }
            }
        }
    }

    fn on_analog_stick_motion(&mut self, feature: &str, x: f32, y: f32) -> bool {
        self.inner.on_analog_stick_motion(feature, x, y)
    }

    fn on_accelerometer_motion(&mut self, feature: &str, x: f32, y: f32, z: f32) -> bool {
        self.inner.on_accelerometer_motion(feature, x, y, z)
    }
}
