//! Input capability traits
//!
//! Seams between the translation engine, its consumers, and the mapping
//! wizard. Consumers receive feature-level events; the wizard receives raw
//! primitives while a mapping session is active.

use crate::mapping::ButtonMap;
use crate::primitive::DriverPrimitive;

/// How a consumer expects to receive a feature
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    /// Discrete press/release
    Digital,
    /// Continuous magnitude in [0, 1]
    Analog,
}

/// Consumer of feature-level input events.
///
/// Every event method returns whether the event was consumed.
pub trait JoystickInputHandler {
    /// The representation this consumer expects for a feature
    fn input_kind(&self, feature: &str) -> InputKind;

    /// A digital feature changed state
    fn on_button_press(&mut self, feature: &str, pressed: bool) -> bool;

    /// An analog feature reported a magnitude in [0, 1]
    fn on_button_motion(&mut self, feature: &str, magnitude: f32) -> bool;

    /// An analog stick reported a position, both components in [-1, 1]
    fn on_analog_stick_motion(&mut self, feature: &str, x: f32, y: f32) -> bool;

    /// An accelerometer reported a reading
    fn on_accelerometer_motion(&mut self, feature: &str, x: f32, y: f32, z: f32) -> bool;
}

/// Consumer of raw primitives during an interactive mapping session.
///
/// Implementations serialize internally; `map_primitive` may be called from
/// a different thread than the UI driving the session.
pub trait ButtonMapper {
    /// The controller profile being mapped
    fn controller_id(&self) -> &str;

    /// Whether a mapping session is currently active
    fn is_mapping(&self) -> bool;

    /// Offer a captured primitive to the active session.
    ///
    /// Returns false if no session is active or the primitive was not
    /// usable in the current prompt.
    fn map_primitive(&self, button_map: &mut ButtonMap, primitive: &DriverPrimitive) -> bool;
}
