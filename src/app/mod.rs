//! Application core: pure domain logic, zero I/O.
//!
//! Motor speed mapping, the motor registry, HTTP request dispatch and the
//! frequency-tuning sweep.
//! All interaction with hardware happens through **port traits** defined
//! in [`ports`], keeping this layer fully testable without real peripherals.

pub mod events;
pub mod motor;
pub mod ports;
pub mod registry;
pub mod router;
pub mod tuning;
