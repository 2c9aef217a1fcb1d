//! Unified error types for the bridge firmware.
//!
//! A single `Error` enum that every subsystem converts into, keeping the
//! top-level init path's error handling uniform.  All variants are `Copy`
//! so handlers can log and drop them without allocation.

use core::fmt;

use crate::app::ports::ConfigError;

// ---------------------------------------------------------------------------
// Top-level firmware error
// ---------------------------------------------------------------------------

/// Every fallible operation in the firmware funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// A GPIO output could not be opened or driven.
    Gpio(GpioError),
    /// The cloud client rejected an operation.
    Cloud(CloudError),
    /// The inter-core socket failed.
    InterCore(InterCoreError),
    /// A device twin document could not be applied.
    Twin(TwinError),
    /// The climate sensor could not be read.
    Sensor(SensorError),
    /// Peripheral or handler initialisation failed.
    Init(&'static str),
    /// Configuration is invalid or could not be loaded.
    Config(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Gpio(e) => write!(f, "gpio: {e}"),
            Self::Cloud(e) => write!(f, "cloud: {e}"),
            Self::InterCore(e) => write!(f, "inter-core: {e}"),
            Self::Twin(e) => write!(f, "device twin: {e}"),
            Self::Sensor(e) => write!(f, "sensor: {e}"),
            Self::Init(msg) => write!(f, "init: {msg}"),
            Self::Config(msg) => write!(f, "config: {msg}"),
        }
    }
}

impl std::error::Error for Error {}

// ---------------------------------------------------------------------------
// GPIO errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GpioError {
    /// The pin could not be exported to user space.
    ExportFailed(u32),
    /// The pin could not be configured as an output.
    DirectionFailed(u32),
    /// Writing the output level failed.
    WriteFailed(u32),
}

impl fmt::Display for GpioError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ExportFailed(pin) => write!(f, "GPIO {pin} export failed"),
            Self::DirectionFailed(pin) => write!(f, "GPIO {pin} could not be set as output"),
            Self::WriteFailed(pin) => write!(f, "GPIO {pin} write failed"),
        }
    }
}

impl std::error::Error for GpioError {}

impl embedded_hal::digital::Error for GpioError {
    fn kind(&self) -> embedded_hal::digital::ErrorKind {
        embedded_hal::digital::ErrorKind::Other
    }
}

impl From<GpioError> for Error {
    fn from(e: GpioError) -> Self {
        Self::Gpio(e)
    }
}

// ---------------------------------------------------------------------------
// Cloud errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloudError {
    /// No authenticated hub connection exists.
    NotConnected,
    /// The client refused to queue the message.
    PublishFailed,
}

impl fmt::Display for CloudError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotConnected => write!(f, "client not connected"),
            Self::PublishFailed => write!(f, "failed to hand over the message to the client"),
        }
    }
}

impl From<CloudError> for Error {
    fn from(e: CloudError) -> Self {
        Self::Cloud(e)
    }
}

// ---------------------------------------------------------------------------
// Inter-core errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterCoreError {
    /// The socket to the real-time core could not be created or connected.
    SocketFailed,
    /// A message could not be sent.
    SendFailed,
    /// Receiving from the socket failed.
    ReceiveFailed,
}

impl fmt::Display for InterCoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SocketFailed => write!(f, "unable to create socket"),
            Self::SendFailed => write!(f, "unable to send message"),
            Self::ReceiveFailed => write!(f, "unable to receive message"),
        }
    }
}

impl From<InterCoreError> for Error {
    fn from(e: InterCoreError) -> Self {
        Self::InterCore(e)
    }
}

// ---------------------------------------------------------------------------
// Device twin errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TwinError {
    /// The payload is not valid UTF-8.
    InvalidUtf8,
    /// The payload is not valid JSON.
    Parse,
    /// The document root is not a JSON object.
    NotAnObject,
    /// A reported-state document does not fit its buffer.
    ReportTooLarge,
}

impl fmt::Display for TwinError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidUtf8 => write!(f, "payload is not UTF-8"),
            Self::Parse => write!(f, "payload is not valid JSON"),
            Self::NotAnObject => write!(f, "document root is not an object"),
            Self::ReportTooLarge => write!(f, "reported state exceeds buffer"),
        }
    }
}

impl From<TwinError> for Error {
    fn from(e: TwinError) -> Self {
        Self::Twin(e)
    }
}

// ---------------------------------------------------------------------------
// Sensor errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorError {
    /// The bus transaction failed.
    ReadFailed,
    /// Reading is outside the physically plausible range.
    OutOfRange,
}

impl fmt::Display for SensorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ReadFailed => write!(f, "read failed"),
            Self::OutOfRange => write!(f, "reading out of range"),
        }
    }
}

impl From<SensorError> for Error {
    fn from(e: SensorError) -> Self {
        Self::Sensor(e)
    }
}

// ---------------------------------------------------------------------------
// Configuration errors
// ---------------------------------------------------------------------------

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Self::Config(match e {
            ConfigError::NotFound => "config not found",
            ConfigError::Corrupted => "config corrupted",
            ConfigError::ValidationFailed(msg) => msg,
            ConfigError::IoError => "config I/O error",
        })
    }
}
