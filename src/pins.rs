//! GPIO pin assignments for the MT3620 development board.
//!
//! Single source of truth for the default peripheral table in
//! [`SystemConfig`](crate::config::SystemConfig).  A config file may
//! override any of these.

// ---------------------------------------------------------------------------
// Device twin peripherals
// ---------------------------------------------------------------------------

/// Relay click board.  Driven by the `relay1` twin property and pulsed
/// on every message from the real-time core.
pub const RELAY_PIN: u32 = 0;

/// On-board LED (active LOW).  Driven by the `led1` twin property.
pub const LIGHT_PIN: u32 = 21;

// ---------------------------------------------------------------------------
// Direct method peripherals
// ---------------------------------------------------------------------------

/// Fan output, reserved for the `fanspeed` direct method.
pub const FAN_PIN: u32 = 4;

// ---------------------------------------------------------------------------
// Status outputs
// ---------------------------------------------------------------------------

/// Send-status LED (active LOW).  Lit while a telemetry message is sent.
pub const SEND_STATUS_PIN: u32 = 19;
