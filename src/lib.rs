//! Joystick input abstraction and button mapping
//!
//! Translates raw driver events from heterogeneous controllers into
//! semantic, controller-agnostic features, and dispatches those features as
//! application actions. Maps are populated interactively by the mapping
//! wizard and persisted through a pluggable store.
//!
//! Pipeline: driver events → [`engine::DriverEventHandler`] (through a
//! [`mapping::ButtonMap`]) → [`engine::DigitalAnalogConverter`] →
//! [`dispatch::InputDispatcher`] → application action queue. The wizard
//! runs orthogonally, writing captured primitives into the map.

pub mod dispatch;
pub mod engine;
pub mod feature;
pub mod handler;
pub mod mapping;
pub mod primitive;
pub mod wizard;

pub use dispatch::{Action, ActionSink, ActionTranslator, InputDispatcher, KeyTable};
pub use engine::{DigitalAnalogConverter, DriverEventHandler};
pub use feature::{FeatureType, JoystickFeature};
pub use handler::{ButtonMapper, InputKind, JoystickInputHandler};
pub use mapping::{ButtonMap, DeviceRegistry, MapDirectory, MappingStore, MemoryStore};
pub use primitive::{DriverPrimitive, HatDirection, SemiAxisDirection};
pub use wizard::{ButtonMapperWizard, WizardState};
