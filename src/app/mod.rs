//! Application core: pure domain logic, zero I/O.
//!
//! This module contains the business rules for the door-mode controller:
//! mode transitions, output composition and classification requests.
//! All interaction with hardware happens through **port traits** defined
//! in [`ports`], keeping this layer fully testable without real peripherals.

pub mod commands;
pub mod events;
pub mod output;
pub mod ports;
pub mod service;
