//! Port traits: the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ AppService (domain)
//! ```
//!
//! Driven adapters (cloud client, inter-core socket, climate sensor,
//! config storage) implement these traits.  The
//! [`AppService`](super::service::AppService) consumes them via generics,
//! so the domain core never touches sockets or the network directly.
//! GPIO outputs use the `embedded-hal` [`OutputPin`](embedded_hal::digital::OutputPin)
//! trait instead of a port of their own.

use crate::config::SystemConfig;
use crate::error::{CloudError, InterCoreError, SensorError};
use crate::sensors::ClimateReading;

use super::events::CloudEvent;

// ───────────────────────────────────────────────────────────────
// Cloud port (driven adapter: domain ↔ IoT Hub)
// ───────────────────────────────────────────────────────────────

/// Device-side view of the IoT Hub client.
///
/// Sends are fire-and-forget: an `Ok` means the client accepted the
/// message for delivery, not that the hub received it.
pub trait CloudPort {
    /// Queue a device-to-cloud telemetry message.
    fn send_event(&mut self, payload: &str) -> Result<(), CloudError>;

    /// Queue a reported-properties patch.
    fn send_reported_state(&mut self, payload: &str) -> Result<(), CloudError>;

    /// Answer a direct method invocation.
    fn respond_to_method(&mut self, request_id: &str, status: u16, body: &str) -> Result<(), CloudError>;

    /// Give the client time to do network work.  Returns everything the
    /// hub delivered since the previous call.
    fn do_work(&mut self) -> Vec<CloudEvent>;
}

impl<T: CloudPort + ?Sized> CloudPort for Box<T> {
    fn send_event(&mut self, payload: &str) -> Result<(), CloudError> {
        (**self).send_event(payload)
    }

    fn send_reported_state(&mut self, payload: &str) -> Result<(), CloudError> {
        (**self).send_reported_state(payload)
    }

    fn respond_to_method(&mut self, request_id: &str, status: u16, body: &str) -> Result<(), CloudError> {
        (**self).respond_to_method(request_id, status, body)
    }

    fn do_work(&mut self) -> Vec<CloudEvent> {
        (**self).do_work()
    }
}

/// A cloud client that is never connected.
/// Used when no hub is configured; every send fails with
/// [`CloudError::NotConnected`].
pub struct NullCloud;

impl CloudPort for NullCloud {
    fn send_event(&mut self, _payload: &str) -> Result<(), CloudError> {
        Err(CloudError::NotConnected)
    }

    fn send_reported_state(&mut self, _payload: &str) -> Result<(), CloudError> {
        Err(CloudError::NotConnected)
    }

    fn respond_to_method(&mut self, _request_id: &str, _status: u16, _body: &str) -> Result<(), CloudError> {
        Err(CloudError::NotConnected)
    }

    fn do_work(&mut self) -> Vec<CloudEvent> {
        Vec::new()
    }
}

// ───────────────────────────────────────────────────────────────
// Inter-core port (driven adapter: domain → real-time core)
// ───────────────────────────────────────────────────────────────

/// Outbound half of the link to the real-time core.
/// Inbound messages arrive through the event loop instead.
pub trait InterCorePort {
    fn send(&mut self, message: &[u8]) -> Result<(), InterCoreError>;
}

// ───────────────────────────────────────────────────────────────
// Sensor port (driven adapter: hardware → domain)
// ───────────────────────────────────────────────────────────────

/// Temperature / humidity source for telemetry.
pub trait ClimateSensor {
    fn read(&mut self) -> Result<ClimateReading, SensorError>;
}

// ───────────────────────────────────────────────────────────────
// Configuration port (driven adapter: domain ↔ persistent config)
// ───────────────────────────────────────────────────────────────

/// Loads and persists system configuration.
///
/// Implementations MUST validate config values before persisting.
/// Invalid values are rejected with [`ConfigError::ValidationFailed`],
/// not silently clamped.
pub trait ConfigPort {
    /// Load configuration from persistent storage.
    fn load(&self) -> Result<SystemConfig, ConfigError>;

    /// Validate and persist configuration.
    fn save(&self, config: &SystemConfig) -> Result<(), ConfigError>;
}

// ───────────────────────────────────────────────────────────────
// Error types
// ───────────────────────────────────────────────────────────────

/// Errors from [`ConfigPort`] operations.
#[derive(Debug)]
pub enum ConfigError {
    /// No config found in storage (first boot).
    NotFound,
    /// Stored config failed deserialization.
    Corrupted,
    /// A config field failed validation.
    /// The `&'static str` describes which field and why.
    ValidationFailed(&'static str),
    /// Generic I/O error from the storage backend.
    IoError,
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NotFound => write!(f, "config not found"),
            Self::Corrupted => write!(f, "config corrupted"),
            Self::ValidationFailed(msg) => write!(f, "validation failed: {}", msg),
            Self::IoError => write!(f, "I/O error"),
        }
    }
}
