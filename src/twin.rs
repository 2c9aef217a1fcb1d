//! Device twin synchroniser.
//!
//! Applies a cloud-pushed twin document to the twin-bound peripherals and
//! acknowledges every applied property with a reported-state patch.
//!
//! ```text
//!  payload ──▶ parse ──▶ desired (or root) ──▶ per peripheral:
//!                                                 value? ──▶ GPIO ──▶ report
//! ```
//!
//! Parsing happens before any side effect, so a malformed document
//! changes nothing.

use core::fmt::Write;

use embedded_hal::digital::OutputPin;
use log::{info, warn};
use serde_json::{Map, Value};

use crate::app::ports::CloudPort;
use crate::error::TwinError;
use crate::peripherals::TwinPeripheral;

/// Capacity of a reported-state document.
pub const REPORTED_STATE_BYTES: usize = 64;

/// Longest property name that still fits `{"<name>":false}`.
pub const MAX_PROPERTY_LEN: usize = REPORTED_STATE_BYTES - r#"{"":false}"#.len();

/// A formatted reported-state patch.
pub type ReportedState = heapless::String<REPORTED_STATE_BYTES>;

/// Parse `payload` and return the object holding the desired properties.
///
/// Full twin documents carry them under `desired`; desired-property
/// patches are the object itself.
pub fn desired_properties(payload: &[u8]) -> Result<Map<String, Value>, TwinError> {
    let text = core::str::from_utf8(payload).map_err(|_| TwinError::InvalidUtf8)?;
    let root: Value = serde_json::from_str(text).map_err(|_| TwinError::Parse)?;
    let Value::Object(mut root) = root else {
        return Err(TwinError::NotAnObject);
    };
    match root.remove("desired") {
        Some(Value::Object(desired)) => Ok(desired),
        Some(other) => {
            root.insert("desired".to_owned(), other);
            Ok(root)
        }
        None => Ok(root),
    }
}

/// The boolean `value` of `property`, if the document sets one.
pub fn desired_value(desired: &Map<String, Value>, property: &str) -> Option<bool> {
    desired.get(property)?.as_object()?.get("value")?.as_bool()
}

/// Format `{"<property>":true|false}`.
pub fn reported_state(property: &str, value: bool) -> Result<ReportedState, TwinError> {
    let mut doc = ReportedState::new();
    write!(doc, "{{\"{}\":{}}}", property, value).map_err(|_| TwinError::ReportTooLarge)?;
    Ok(doc)
}

/// Apply `payload` to `twins`, reporting each applied property to `cloud`.
///
/// Returns the number of peripherals updated.  GPIO and cloud failures
/// are logged per peripheral and do not stop the walk.
pub fn synchronize<P, C>(
    payload: &[u8],
    twins: &mut [&mut TwinPeripheral<P>],
    cloud: &mut C,
) -> Result<usize, TwinError>
where
    P: OutputPin,
    C: CloudPort + ?Sized,
{
    let desired = desired_properties(payload)?;
    let mut applied = 0;

    for twin in twins.iter_mut() {
        let Some(value) = desired_value(&desired, twin.property()) else {
            if desired.contains_key(twin.property()) {
                warn!("Twin: '{}' has no boolean value, ignored", twin.property());
            }
            continue;
        };

        if let Err(e) = twin.apply(value) {
            warn!("Twin: GPIO write for '{}' failed: {:?}", twin.property(), e);
        }
        applied += 1;
        report(cloud, twin.property(), value);
    }

    Ok(applied)
}

fn report<C: CloudPort + ?Sized>(cloud: &mut C, property: &str, value: bool) {
    let doc = match reported_state(property, value) {
        Ok(doc) => doc,
        Err(e) => {
            warn!("Twin: cannot report '{}': {}", property, e);
            return;
        }
    };
    match cloud.send_reported_state(&doc) {
        Ok(()) => info!("Reported state for '{}' to value '{}'", property, value),
        Err(e) => warn!("Failed to set reported state for '{}': {}", property, e),
    }
}
