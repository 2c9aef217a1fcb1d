//! hlbridge firmware library.
//!
//! Bridges GPIO peripherals, an Azure IoT Hub device twin and a
//! real-time companion core.  Exposes every module so integration tests
//! can drive the application service with mock adapters.

#![deny(unused_must_use)]

pub mod adapters;
pub mod app;
pub mod config;
pub mod drivers;
pub mod error;
pub mod event_loop;
pub mod events;
pub mod intercore;
pub mod peripherals;
pub mod pins;
pub mod sensors;
pub mod telemetry;
pub mod twin;
