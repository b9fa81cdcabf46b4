//! Button map storage and lookup
//!
//! The mapping layer associates driver primitives with controller features,
//! per (device, controller profile) pair. Maps are loaded from an external
//! store and updated incrementally by the mapping wizard.

pub mod buttonmap;
pub mod registry;
pub mod store;
pub mod templates;

pub use buttonmap::ButtonMap;
pub use registry::DeviceRegistry;
pub use store::{MappingStore, MemoryStore};
pub use templates::{MapDirectory, MapFileError};
