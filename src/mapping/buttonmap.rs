//! Button maps
//!
//! A button map is the per-(device, controller profile) association between
//! driver primitives and features. It keeps two indices: the authoritative
//! name→feature map loaded from the external store, and a primitive→name
//! lookup built from every feature's constituent primitives.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use log::{debug, trace};

use super::store::MappingStore;
use crate::feature::JoystickFeature;
use crate::primitive::DriverPrimitive;

/// Primitive↔feature lookup for one (device, controller) pair
pub struct ButtonMap {
    device_id: String,
    controller_id: String,
    store: Arc<dyn MappingStore>,
    /// Authoritative feature set, keyed by feature name
    features: BTreeMap<String, JoystickFeature>,
    /// Forward lookup from driver primitive to feature name
    driver_map: HashMap<DriverPrimitive, String>,
}

impl ButtonMap {
    pub fn new(device_id: &str, controller_id: &str, store: Arc<dyn MappingStore>) -> Self {
        Self {
            device_id: device_id.to_string(),
            controller_id: controller_id.to_string(),
            store,
            features: BTreeMap::new(),
            driver_map: HashMap::new(),
        }
    }

    pub fn device_id(&self) -> &str {
        &self.device_id
    }

    pub fn controller_id(&self) -> &str {
        &self.controller_id
    }

    pub fn feature_count(&self) -> usize {
        self.features.len()
    }

    /// Populate both indices from the store.
    ///
    /// Returns false and leaves the map empty when the store has no entry
    /// for this pair: an unmapped device, not an error.
    pub fn load(&mut self) -> bool {
        self.features.clear();
        self.driver_map.clear();

        let features = match self.store.get_features(&self.device_id, &self.controller_id) {
            Some(features) => features,
            None => {
                debug!(
                    "no button map stored for {} / {}",
                    self.device_id, self.controller_id
                );
                return false;
            }
        };

        for feature in features {
            self.features.insert(feature.name().to_string(), feature);
        }
        self.rebuild_driver_map();

        debug!(
            "loaded {} features for {} / {}",
            self.features.len(),
            self.device_id,
            self.controller_id
        );
        true
    }

    // === Queries ===

    /// The feature a primitive is bound to, if any
    pub fn feature_name(&self, primitive: &DriverPrimitive) -> Option<&str> {
        self.driver_map.get(primitive).map(String::as_str)
    }

    /// The feature definition by name
    pub fn feature(&self, name: &str) -> Option<&JoystickFeature> {
        self.features.get(name)
    }

    /// The single primitive of a button-type feature
    pub fn primitive_feature(&self, name: &str) -> Option<DriverPrimitive> {
        match self.features.get(name) {
            Some(JoystickFeature::Primitive { primitive, .. }) => Some(*primitive),
            _ => None,
        }
    }

    /// The (up, down, right, left) primitives of an analog stick feature
    #[allow(clippy::type_complexity)]
    pub fn analog_stick(
        &self,
        name: &str,
    ) -> Option<(
        Option<DriverPrimitive>,
        Option<DriverPrimitive>,
        Option<DriverPrimitive>,
        Option<DriverPrimitive>,
    )> {
        match self.features.get(name) {
            Some(JoystickFeature::AnalogStick {
                up,
                down,
                right,
                left,
                ..
            }) => Some((*up, *down, *right, *left)),
            _ => None,
        }
    }

    /// The (x, y, z) primitives of an accelerometer feature
    #[allow(clippy::type_complexity)]
    pub fn accelerometer(
        &self,
        name: &str,
    ) -> Option<(
        Option<DriverPrimitive>,
        Option<DriverPrimitive>,
        Option<DriverPrimitive>,
    )> {
        match self.features.get(name) {
            Some(JoystickFeature::Accelerometer {
                positive_x,
                positive_y,
                positive_z,
                ..
            }) => Some((*positive_x, *positive_y, *positive_z)),
            _ => None,
        }
    }

    // === Updates (wizard write path) ===

    /// Bind a single primitive to a button-type feature
    pub fn add_primitive_feature(&mut self, name: &str, primitive: DriverPrimitive) -> bool {
        if !primitive.is_valid() {
            trace!("refusing invalid primitive for feature {}", name);
            return false;
        }
        self.commit(JoystickFeature::primitive(name, primitive))
    }

    /// Bind up to four direction primitives to an analog stick feature
    pub fn add_analog_stick(
        &mut self,
        name: &str,
        up: Option<DriverPrimitive>,
        down: Option<DriverPrimitive>,
        right: Option<DriverPrimitive>,
        left: Option<DriverPrimitive>,
    ) -> bool {
        let slots = [up, down, right, left];
        if !slots_acceptable(&slots) {
            trace!("refusing analog stick {}: no valid directions", name);
            return false;
        }
        self.commit(JoystickFeature::analog_stick(name, up, down, right, left))
    }

    /// Bind up to three axis primitives to an accelerometer feature
    pub fn add_accelerometer(
        &mut self,
        name: &str,
        positive_x: Option<DriverPrimitive>,
        positive_y: Option<DriverPrimitive>,
        positive_z: Option<DriverPrimitive>,
    ) -> bool {
        let slots = [positive_x, positive_y, positive_z];
        if !slots_acceptable(&slots) {
            trace!("refusing accelerometer {}: no valid axes", name);
            return false;
        }
        self.commit(JoystickFeature::accelerometer(
            name, positive_x, positive_y, positive_z,
        ))
    }

    /// Upsert into the store, then refresh both in-memory indices.
    ///
    /// A failed store write leaves the in-memory map untouched.
    fn commit(&mut self, feature: JoystickFeature) -> bool {
        if !self
            .store
            .upsert_feature(&self.device_id, &self.controller_id, feature.clone())
        {
            return false;
        }

        self.features.insert(feature.name().to_string(), feature);
        self.rebuild_driver_map();
        true
    }

    fn rebuild_driver_map(&mut self) {
        self.driver_map.clear();
        for feature in self.features.values() {
            for primitive in feature.primitives() {
                self.driver_map
                    .insert(primitive, feature.name().to_string());

                // An accelerometer axis reports through both halves of the
                // axis, so its opposite semiaxis resolves to the same
                // feature. Analog sticks carry all four directions
                // explicitly and get no such inference.
                if feature.feature_type() == crate::feature::FeatureType::Accelerometer {
                    if let Some(opposite) = primitive.opposite_semiaxis() {
                        self.driver_map
                            .insert(opposite, feature.name().to_string());
                    }
                }
            }
        }
    }
}

fn slots_acceptable(slots: &[Option<DriverPrimitive>]) -> bool {
    let mut any = false;
    for slot in slots {
        if let Some(primitive) = slot {
            if !primitive.is_valid() {
                return false;
            }
            any = true;
        }
    }
    any
}
