//! Inbound direct methods.
//!
//! Cloud-invoked request/response calls that the
//! [`AppService`](super::service::AppService) acts upon.  Parsing never
//! fails silently: every invocation maps to a command or to the error
//! response the hub should receive.

use serde_json::Value;

/// Method name for setting the fan speed.
pub const FAN_SPEED_METHOD: &str = "fanspeed";

/// Commands the hub can invoke on the device.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DeviceMethod {
    /// Set the fan speed (units are the caller's; the device stores it).
    FanSpeed { speed: i64 },
}

/// Status code and JSON body returned to the hub.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MethodResponse {
    pub status: u16,
    pub body: &'static str,
}

impl MethodResponse {
    pub const SUCCESS: Self = Self {
        status: 200,
        body: "\"Successfully invoke device method\"",
    };
    pub const NOT_FOUND: Self = Self {
        status: 404,
        body: "\"No method found\"",
    };
    pub const INVALID_JSON: Self = Self {
        status: 500,
        body: "\"Invalid JSON\"",
    };
}

/// Turn a method invocation into a command, or the response to send back.
///
/// The payload must be a JSON object.  A `speed` that is missing or not a
/// number reads as 0.
pub fn parse_method(name: &str, payload: &[u8]) -> Result<DeviceMethod, MethodResponse> {
    match name {
        FAN_SPEED_METHOD => {
            let value: Value =
                serde_json::from_slice(payload).map_err(|_| MethodResponse::INVALID_JSON)?;
            let Value::Object(map) = value else {
                return Err(MethodResponse::INVALID_JSON);
            };
            let speed = map.get("speed").and_then(Value::as_f64).unwrap_or(0.0);
            Ok(DeviceMethod::FanSpeed {
                speed: speed as i64,
            })
        }
        _ => Err(MethodResponse::NOT_FOUND),
    }
}
