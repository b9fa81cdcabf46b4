//! Persistent mapping store contract
//!
//! Button maps are loaded from and written to an external store keyed by
//! (device id, controller id). The store is the only resource shared across
//! map instances: reads are concurrent, writes are exclusive per key.

use std::collections::{BTreeMap, HashMap};

use parking_lot::RwLock;

use crate::feature::JoystickFeature;

/// External feature store, keyed by (device id, controller id).
///
/// Upserts are idempotent per feature name.
pub trait MappingStore: Send + Sync {
    /// All stored features for the pair, or `None` when the device has no
    /// entry yet (an unmapped device, not an error).
    fn get_features(&self, device_id: &str, controller_id: &str) -> Option<Vec<JoystickFeature>>;

    /// Insert or replace a feature by name. Returns false on write failure.
    fn upsert_feature(
        &self,
        device_id: &str,
        controller_id: &str,
        feature: JoystickFeature,
    ) -> bool;
}

type StoreKey = (String, String);

/// In-memory store for tests and transient sessions
#[derive(Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<StoreKey, BTreeMap<String, JoystickFeature>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl MappingStore for MemoryStore {
    fn get_features(&self, device_id: &str, controller_id: &str) -> Option<Vec<JoystickFeature>> {
        let entries = self.entries.read();
        entries
            .get(&(device_id.to_string(), controller_id.to_string()))
            .map(|features| features.values().cloned().collect())
    }

    fn upsert_feature(
        &self,
        device_id: &str,
        controller_id: &str,
        feature: JoystickFeature,
    ) -> bool {
        let mut entries = self.entries.write();
        entries
            .entry((device_id.to_string(), controller_id.to_string()))
            .or_default()
            .insert(feature.name().to_string(), feature);
        true
    }
}
