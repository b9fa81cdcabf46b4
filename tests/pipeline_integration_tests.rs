//! Integration tests for the full input pipeline
//!
//! Drives raw driver events through a button map, the digital/analog
//! converter and the dispatcher, and checks the actions that reach the
//! application queue.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

use padmap::dispatch::{action_keys, DispatcherSettings};
use padmap::primitive::SemiAxisDirection;
use padmap::{
    Action, ActionSink, ActionTranslator, ButtonMap, ButtonMapper, ButtonMapperWizard,
    DigitalAnalogConverter, DriverEventHandler, DriverPrimitive, InputDispatcher, JoystickFeature,
    KeyTable, MapDirectory, MappingStore, MemoryStore,
};

struct Identity;

impl ActionTranslator for Identity {
    fn translate(&self, _window: u32, key_id: u32) -> Option<Action> {
        Some(Action::new(key_id, 1.0))
    }
}

#[derive(Default)]
struct RecordingSink {
    actions: Vec<Action>,
}

impl ActionSink for RecordingSink {
    fn queue_action(&mut self, action: Action) {
        self.actions.push(action);
    }
}

struct Pipeline {
    map: ButtonMap,
    driver: DriverEventHandler,
    consumer: DigitalAnalogConverter<InputDispatcher>,
    sink: Arc<Mutex<RecordingSink>>,
}

impl Pipeline {
    fn new(store: Arc<dyn MappingStore>) -> Self {
        let mut map = ButtonMap::new("dev", "game.controller.default", store);
        map.load();

        let sink = Arc::new(Mutex::new(RecordingSink::default()));
        let settings = DispatcherSettings {
            hold_delay: Duration::from_secs(60),
            repeat_interval: Duration::from_secs(60),
        };
        let dispatcher = InputDispatcher::new(
            KeyTable::default_controller(),
            Arc::new(Identity),
            sink.clone() as Arc<Mutex<dyn ActionSink>>,
            settings,
        )
        .unwrap();

        Self {
            map,
            driver: DriverEventHandler::new(),
            consumer: DigitalAnalogConverter::new(dispatcher),
            sink,
        }
    }

    fn button(&mut self, index: u32, pressed: bool) {
        self.driver
            .handle_button(index, pressed, &self.map, &mut self.consumer);
    }

    fn axis(&mut self, index: u32, position: f32) {
        self.driver
            .handle_axis(index, position, &self.map, &mut self.consumer);
    }

    fn end_frame(&mut self) {
        self.driver.process_axis_motions(&self.map, &mut self.consumer);
        self.consumer.inner_mut().process_frame();
    }

    fn actions(&self) -> Vec<Action> {
        self.sink.lock().actions.clone()
    }
}

#[test]
fn test_unmapped_device_produces_no_actions() {
    let mut pipeline = Pipeline::new(Arc::new(MemoryStore::new()));

    pipeline.button(5, true);
    pipeline.button(5, false);
    pipeline.axis(0, 1.0);
    pipeline.end_frame();

    assert!(pipeline.actions().is_empty());
}

#[test]
fn test_mapped_button_fires_exactly_once_per_press() {
    let store = Arc::new(MemoryStore::new());
    let mut pipeline = Pipeline::new(store.clone());

    // Unmapped press: silence
    pipeline.button(5, true);
    assert!(pipeline.actions().is_empty());
    pipeline.button(5, false);

    // Map button 5 to "a" and reload
    pipeline.map.add_primitive_feature("a", DriverPrimitive::button(5));

    pipeline.button(5, true);
    pipeline.button(5, true); // duplicate report, no release in between
    assert_eq!(
        pipeline.actions(),
        vec![Action::new(action_keys::BUTTON_A, 1.0)]
    );

    pipeline.button(5, false);
    pipeline.button(5, true);
    assert_eq!(pipeline.actions().len(), 2);
}

#[test]
fn test_stick_axes_batch_into_one_action_per_frame() {
    let store = Arc::new(MemoryStore::new());
    store.upsert_feature(
        "dev",
        "game.controller.default",
        JoystickFeature::analog_stick(
            "leftstick",
            Some(DriverPrimitive::semiaxis(1, SemiAxisDirection::Positive)),
            Some(DriverPrimitive::semiaxis(1, SemiAxisDirection::Negative)),
            Some(DriverPrimitive::semiaxis(0, SemiAxisDirection::Positive)),
            Some(DriverPrimitive::semiaxis(0, SemiAxisDirection::Negative)),
        ),
    );
    let mut pipeline = Pipeline::new(store);

    // Mid-frame: nothing reaches the queue until the batch runs
    pipeline.axis(1, 1.0);
    assert!(pipeline.actions().is_empty());

    pipeline.end_frame();
    assert_eq!(
        pipeline.actions(),
        vec![Action::new(action_keys::LEFT_STICK_UP, 1.0)]
    );
}

#[test]
fn test_stick_direction_change_releases_before_activating() {
    let store = Arc::new(MemoryStore::new());
    store.upsert_feature(
        "dev",
        "game.controller.default",
        JoystickFeature::analog_stick(
            "leftstick",
            Some(DriverPrimitive::semiaxis(1, SemiAxisDirection::Positive)),
            Some(DriverPrimitive::semiaxis(1, SemiAxisDirection::Negative)),
            Some(DriverPrimitive::semiaxis(0, SemiAxisDirection::Positive)),
            Some(DriverPrimitive::semiaxis(0, SemiAxisDirection::Negative)),
        ),
    );
    let mut pipeline = Pipeline::new(store);

    pipeline.axis(1, 1.0);
    pipeline.end_frame();

    pipeline.axis(1, 0.0);
    pipeline.axis(0, 1.0);
    pipeline.end_frame();

    assert_eq!(
        pipeline.actions(),
        vec![
            Action::new(action_keys::LEFT_STICK_UP, 1.0),
            Action::new(action_keys::LEFT_STICK_UP, 0.0),
            Action::new(action_keys::LEFT_STICK_RIGHT, 1.0),
        ]
    );
}

#[test]
fn test_analog_trigger_on_digital_key_thresholds_once() {
    let store = Arc::new(MemoryStore::new());
    // "a" is a digital key; bind it to an analog semiaxis
    store.upsert_feature(
        "dev",
        "game.controller.default",
        JoystickFeature::primitive(
            "a",
            DriverPrimitive::semiaxis(2, SemiAxisDirection::Positive),
        ),
    );
    let mut pipeline = Pipeline::new(store);

    for position in [0.3, 0.5, 0.6, 0.3, 0.0] {
        pipeline.axis(2, position);
    }

    // One press despite several frames above threshold
    assert_eq!(
        pipeline.actions(),
        vec![Action::new(action_keys::BUTTON_A, 1.0)]
    );
}

#[test]
fn test_digital_press_on_analog_key_repeats_per_frame() {
    let store = Arc::new(MemoryStore::new());
    store.upsert_feature(
        "dev",
        "game.controller.default",
        JoystickFeature::primitive("lefttrigger", DriverPrimitive::button(7)),
    );
    let mut pipeline = Pipeline::new(store);

    pipeline.button(7, true);
    pipeline.end_frame();
    pipeline.end_frame();

    // Synthesized full-magnitude motion, then one repeat per frame held
    assert_eq!(
        pipeline.actions(),
        vec![
            Action::new(action_keys::LEFT_TRIGGER, 1.0),
            Action::new(action_keys::LEFT_TRIGGER, 1.0),
            Action::new(action_keys::LEFT_TRIGGER, 1.0),
        ]
    );

    pipeline.button(7, false);
    let count = pipeline.actions().len();
    pipeline.end_frame();
    assert_eq!(pipeline.actions().len(), count);
}

#[test]
fn test_file_store_round_trip_through_pipeline() {
    let dir = tempfile::TempDir::new().unwrap();
    let store = Arc::new(MapDirectory::new(dir.path()));

    // A wizard session writes the map
    {
        let mut map = ButtonMap::new("dev", "game.controller.default", store.clone());
        let wizard = ButtonMapperWizard::new(
            "game.controller.default",
            vec![
                JoystickFeature::primitive("a", DriverPrimitive::button(0)),
                JoystickFeature::analog_stick("leftstick", None, None, None, None),
            ],
        );
        wizard.start();
        wizard.map_primitive(&mut map, &DriverPrimitive::button(4));
        wizard.map_primitive(
            &mut map,
            &DriverPrimitive::semiaxis(1, SemiAxisDirection::Positive),
        );
        wizard.map_primitive(
            &mut map,
            &DriverPrimitive::semiaxis(0, SemiAxisDirection::Positive),
        );
        assert!(!wizard.is_mapping());
    }

    // A fresh pipeline loads it back from disk and translates events
    let mut pipeline = Pipeline::new(store);
    pipeline.button(4, true);
    pipeline.axis(1, -0.5);
    pipeline.end_frame();

    assert_eq!(
        pipeline.actions(),
        vec![
            Action::new(action_keys::BUTTON_A, 1.0),
            Action::new(action_keys::LEFT_STICK_DOWN, 1.0),
        ]
    );
}
