//! Application core: pure domain logic, zero I/O.
//!
//! This module contains the business rules of the bridge: device twin
//! synchronisation, telemetry, the inter-core relay and direct methods.
//! All interaction with the network and sensors happens through **port
//! traits** defined in [`ports`], keeping this layer fully testable
//! without real peripherals.

pub mod commands;
pub mod events;
pub mod ports;
pub mod service;
