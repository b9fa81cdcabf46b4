//! Driver event translation
//!
//! Consumes raw per-frame driver events (button edges, hat bitmasks, axis
//! positions) and emits feature-level events through a button map. Buttons
//! and hats are edge-triggered; axes are de-duplicated at rest and batched
//! per frame for multi-axis features.

use std::collections::{BTreeSet, HashMap};

use log::trace;

use crate::handler::JoystickInputHandler;
use crate::mapping::ButtonMap;
use crate::primitive::{DriverPrimitive, HatDirection, SemiAxisDirection};

/// Per-device driver state and the frame's pending multi-axis features.
///
/// State persists across frames exactly as last observed; release is only
/// ever driven by an explicit released/zero driver event.
#[derive(Default)]
pub struct DriverEventHandler {
    /// Last-known pressed state per button index
    buttons: HashMap<u32, bool>,
    /// Last-known direction bitmask per hat index
    hats: HashMap<u32, u8>,
    /// Last-known position per axis index, in [-1, 1]
    axes: HashMap<u32, f32>,
    /// Multi-axis features with motion this frame, flushed at end of frame
    pending: BTreeSet<String>,
}

impl DriverEventHandler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Process a button state report.
    ///
    /// Emits a press/release only on a state transition; repeated identical
    /// reports are ignored.
    pub fn handle_button(
        &mut self,
        index: u32,
        pressed: bool,
        map: &ButtonMap,
        out: &mut dyn JoystickInputHandler,
    ) -> bool {
        let previous = self.buttons.get(&index).copied().unwrap_or(false);
        if previous == pressed {
            return false;
        }
        self.buttons.insert(index, pressed);

        match map.feature_name(&DriverPrimitive::button(index)) {
            Some(feature) => {
                let feature = feature.to_string();
                out.on_button_press(&feature, pressed)
            }
            None => {
                trace!("unmapped button {}", index);
                false
            }
        }
    }

    /// Process a hat state report.
    ///
    /// The bitmask is decomposed into four independent cardinal sub-states;
    /// each flipped cardinal emits a press/release like a button.
    pub fn handle_hat(
        &mut self,
        index: u32,
        mask: u8,
        map: &ButtonMap,
        out: &mut dyn JoystickInputHandler,
    ) -> bool {
        let previous = self.hats.get(&index).copied().unwrap_or(0);
        if previous == mask {
            return false;
        }
        self.hats.insert(index, mask);

        let mut handled = false;
        for direction in HatDirection::CARDINALS {
            let bit = direction.mask();
            if (previous ^ mask) & bit == 0 {
                continue;
            }
            let active = mask & bit != 0;
            match map.feature_name(&DriverPrimitive::hat(index, direction)) {
                Some(feature) => {
                    let feature = feature.to_string();
                    handled |= out.on_button_press(&feature, active);
                }
                None => trace!("unmapped hat {} {}", index, direction),
            }
        }
        handled
    }

    /// Process an axis position report.
    ///
    /// Single-axis features (analog buttons/triggers) emit immediately; a
    /// feature fed by both halves of this axis is deferred to the
    /// end-of-frame batch so all of its axes are seen together.
    pub fn handle_axis(
        &mut self,
        index: u32,
        position: f32,
        map: &ButtonMap,
        out: &mut dyn JoystickInputHandler,
    ) -> bool {
        let previous = self.axes.get(&index).copied().unwrap_or(0.0);
        if previous == 0.0 && position == 0.0 {
            return false;
        }
        self.axes.insert(index, position);

        let positive = DriverPrimitive::semiaxis(index, SemiAxisDirection::Positive);
        let negative = DriverPrimitive::semiaxis(index, SemiAxisDirection::Negative);
        let positive_feature = map.feature_name(&positive).map(str::to_string);
        let negative_feature = map.feature_name(&negative).map(str::to_string);

        if let (Some(pos_name), Some(neg_name)) = (&positive_feature, &negative_feature) {
            if pos_name == neg_name {
                // Both halves feed one multi-axis feature
                self.pending.insert(pos_name.clone());
                return true;
            }
        }

        let mut handled = false;
        if let Some(feature) = &positive_feature {
            if position > 0.0 {
                handled |= out.on_button_motion(feature, position);
            } else if previous > 0.0 {
                handled |= out.on_button_motion(feature, 0.0);
            }
        }
        if let Some(feature) = &negative_feature {
            if position < 0.0 {
                handled |= out.on_button_motion(feature, -position);
            } else if previous < 0.0 {
                handled |= out.on_button_motion(feature, 0.0);
            }
        }

        if positive_feature.is_none() && negative_feature.is_none() {
            trace!("unmapped axis {}", index);
        }
        handled
    }

    /// End-of-frame batch: emit one coherent event per multi-axis feature
    /// that saw motion this frame, then clear the pending set.
    pub fn process_axis_motions(&mut self, map: &ButtonMap, out: &mut dyn JoystickInputHandler) {
        let pending = std::mem::take(&mut self.pending);
        for feature in pending {
            if let Some((up, down, right, left)) = map.analog_stick(&feature) {
                let x = self.direction_position(&right, &left);
                let y = self.direction_position(&up, &down);
                out.on_analog_stick_motion(&feature, x, y);
            } else if let Some((px, py, pz)) = map.accelerometer(&feature) {
                let x = self.signed_position(&px);
                let y = self.signed_position(&py);
                let z = self.signed_position(&pz);
                out.on_accelerometer_motion(&feature, x, y, z);
            } else {
                trace!("pending feature {} is not multi-axis", feature);
            }
        }
    }

    /// Last-known position of a semiaxis-bound primitive, inverted when the
    /// binding points at the negative half
    fn signed_position(&self, primitive: &Option<DriverPrimitive>) -> f32 {
        match primitive {
            Some(DriverPrimitive::SemiAxis(index, SemiAxisDirection::Positive)) => {
                self.axes.get(index).copied().unwrap_or(0.0)
            }
            Some(DriverPrimitive::SemiAxis(index, SemiAxisDirection::Negative)) => {
                -self.axes.get(index).copied().unwrap_or(0.0)
            }
            _ => 0.0,
        }
    }

    /// Axis value along a stick dimension: the primary slot wins, the
    /// opposing slot fills in (negated) when the primary is unbound
    fn direction_position(
        &self,
        primary: &Option<DriverPrimitive>,
        opposing: &Option<DriverPrimitive>,
    ) -> f32 {
        if primary.is_some() {
            self.signed_position(primary)
        } else {
            -self.signed_position(opposing)
        }
    }
}
