//! Inbound cloud events.
//!
//! The cloud adapter yields these from [`CloudPort::do_work`](super::ports::CloudPort::do_work);
//! the [`AppService`](super::service::AppService) interprets each one.

use core::fmt;

/// Whether a twin document is the full twin or a desired-properties patch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TwinUpdate {
    /// Full document, `{"desired": {...}, "reported": {...}}`.
    Complete,
    /// Desired-properties patch, delivered without the `desired` wrapper.
    Partial,
}

/// Why the hub connection changed state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionReason {
    Ok,
    ExpiredSasToken,
    DeviceDisabled,
    BadCredential,
    RetryExpired,
    NoNetwork,
    CommunicationError,
}

impl fmt::Display for ConnectionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Ok => "connection ok",
            Self::ExpiredSasToken => "expired SAS token",
            Self::DeviceDisabled => "device disabled",
            Self::BadCredential => "bad credential",
            Self::RetryExpired => "retry expired",
            Self::NoNetwork => "no network",
            Self::CommunicationError => "communication error",
        };
        f.write_str(s)
    }
}

/// Everything the hub can deliver to the device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CloudEvent {
    /// The client (de)authenticated.
    ConnectionStatus {
        authenticated: bool,
        reason: ConnectionReason,
    },

    /// A device twin document arrived.
    TwinDocument { update: TwinUpdate, payload: Vec<u8> },

    /// The hub answered a reported-properties patch.
    ReportedStateAck { status: u16 },

    /// A direct method was invoked.
    MethodCall {
        name: String,
        request_id: String,
        payload: Vec<u8>,
    },

    /// The hub confirmed a telemetry message.
    MessageAccepted,
}
