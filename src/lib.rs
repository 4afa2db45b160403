//! Door-mode appliance controller.
//!
//! Exposes the pure-logic modules and `embedded-hal` drivers for
//! integration testing. All ESP-IDF-specific code is guarded by
//! `#[cfg(target_os = "espidf")]` within each module.

#![deny(unused_must_use)]

pub mod adapters;
pub mod app;
pub mod classifier;
pub mod config;
pub mod dispatcher;
pub mod drivers;
pub mod error;
pub mod events;
pub mod fsm;
pub mod pins;
