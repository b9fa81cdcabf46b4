//! Event translation engine
//!
//! Raw driver events enter here and leave as feature-level events:
//! the driver handler translates through a button map, and the converter
//! reconciles digital/analog representation with the consumer.

pub mod convert;
pub mod driver;

pub use convert::DigitalAnalogConverter;
pub use driver::DriverEventHandler;
