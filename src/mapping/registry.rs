//! Device registry
//!
//! Owns one button map per (device, controller profile) pair for the
//! lifetime of the device's connection. Components refer to a map by its
//! key rather than holding a pointer into the registry.

use std::collections::HashMap;
use std::sync::Arc;

use log::info;

use super::buttonmap::ButtonMap;
use super::store::MappingStore;

type MapKey = (String, String);

/// Arena of button maps keyed by (device id, controller id)
pub struct DeviceRegistry {
    store: Arc<dyn MappingStore>,
    maps: HashMap<MapKey, ButtonMap>,
}

impl DeviceRegistry {
    pub fn new(store: Arc<dyn MappingStore>) -> Self {
        Self {
            store,
            maps: HashMap::new(),
        }
    }

    /// Create and load the map for a newly recognized device.
    ///
    /// Returns whether the store had an entry; an unmapped device still
    /// gets a usable, empty map.
    pub fn connect_device(&mut self, device_id: &str, controller_id: &str) -> bool {
        let mut map = ButtonMap::new(device_id, controller_id, Arc::clone(&self.store));
        let loaded = map.load();

        info!(
            "device {} connected with profile {} ({})",
            device_id,
            controller_id,
            if loaded { "mapped" } else { "unmapped" }
        );

        self.maps
            .insert((device_id.to_string(), controller_id.to_string()), map);
        loaded
    }

    /// Drop every map belonging to a disconnected device
    pub fn disconnect_device(&mut self, device_id: &str) {
        let before = self.maps.len();
        self.maps.retain(|(dev, _), _| dev != device_id);
        if self.maps.len() != before {
            info!("device {} disconnected", device_id);
        }
    }

    pub fn button_map(&self, device_id: &str, controller_id: &str) -> Option<&ButtonMap> {
        self.maps
            .get(&(device_id.to_string(), controller_id.to_string()))
    }

    pub fn button_map_mut(
        &mut self,
        device_id: &str,
        controller_id: &str,
    ) -> Option<&mut ButtonMap> {
        self.maps
            .get_mut(&(device_id.to_string(), controller_id.to_string()))
    }

    pub fn len(&self) -> usize {
        self.maps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.maps.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feature::JoystickFeature;
    use crate::mapping::store::{MappingStore, MemoryStore};
    use crate::primitive::DriverPrimitive;

    #[test]
    fn test_connect_unmapped_device() {
        let mut registry = DeviceRegistry::new(Arc::new(MemoryStore::new()));

        assert!(!registry.connect_device("dev", "ctrl"));
        let map = registry.button_map("dev", "ctrl").unwrap();
        assert_eq!(map.feature_count(), 0);
    }

    #[test]
    fn test_connect_mapped_device() {
        let store = Arc::new(MemoryStore::new());
        store.upsert_feature(
            "dev",
            "ctrl",
            JoystickFeature::primitive("a", DriverPrimitive::button(0)),
        );

        let mut registry = DeviceRegistry::new(store);
        assert!(registry.connect_device("dev", "ctrl"));
        assert_eq!(registry.button_map("dev", "ctrl").unwrap().feature_count(), 1);
    }

    #[test]
    fn test_disconnect_drops_all_profiles() {
        let mut registry = DeviceRegistry::new(Arc::new(MemoryStore::new()));
        registry.connect_device("dev1", "ctrl1");
        registry.connect_device("dev1", "ctrl2");
        registry.connect_device("dev2", "ctrl1");

        registry.disconnect_device("dev1");

        assert!(registry.button_map("dev1", "ctrl1").is_none());
        assert!(registry.button_map("dev1", "ctrl2").is_none());
        assert!(registry.button_map("dev2", "ctrl1").is_some());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_profiles_load_independent_snapshots() {
        let store = Arc::new(MemoryStore::new());
        let mut registry = DeviceRegistry::new(store);
        registry.connect_device("dev", "ctrl1");
        registry.connect_device("dev", "ctrl2");

        registry
            .button_map_mut("dev", "ctrl1")
            .unwrap()
            .add_primitive_feature("a", DriverPrimitive::button(0));

        assert_eq!(
            registry.button_map("dev", "ctrl1").unwrap().feature_count(),
            1
        );
        assert_eq!(
            registry.button_map("dev", "ctrl2").unwrap().feature_count(),
            0
        );
    }
}
