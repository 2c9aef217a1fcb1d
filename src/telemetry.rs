//! Device-to-cloud message formatting.
//!
//! Messages are formatted into fixed-capacity `heapless` strings; a
//! message that would not fit is dropped rather than truncated.

use core::fmt::Write;

use crate::sensors::ClimateReading;

/// Capacity of one telemetry message.
pub const JSON_MESSAGE_BYTES: usize = 100;

/// A formatted telemetry message.
pub type Message = heapless::String<JSON_MESSAGE_BYTES>;

/// `{"Temperature":"<t:.2>","Humidity":"<h:.1>","MsgId":<n>}`
///
/// Temperature and humidity are JSON strings, as the IoT Central device
/// template expects.
pub fn format_climate(reading: ClimateReading, msg_id: u32) -> Option<Message> {
    let mut msg = Message::new();
    write!(
        msg,
        "{{\"Temperature\":\"{:.2}\",\"Humidity\":\"{:.1}\",\"MsgId\":{}}}",
        reading.temperature_c, reading.humidity_pct, msg_id
    )
    .ok()?;
    Some(msg)
}

/// `{"ButtonPressed":<count>}`
pub fn format_button_pressed(count: u32) -> Option<Message> {
    let mut msg = Message::new();
    write!(msg, "{{\"ButtonPressed\":{}}}", count).ok()?;
    Some(msg)
}
