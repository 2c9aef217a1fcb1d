//! System configuration parameters
//!
//! All tunable parameters for the bridge: timer periods, the peripheral
//! table, the hub connection and the inter-core socket location.
//! Values can be overridden by a JSON config file (see
//! [`FileConfigStore`](crate::adapters::config_store::FileConfigStore)).

use serde::{Deserialize, Serialize};

use crate::app::ports::ConfigError;
use crate::pins;
use crate::twin::MAX_PROPERTY_LEN;

/// Electrical level of a GPIO output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Low,
    High,
}

impl Level {
    pub fn is_high(self) -> bool {
        self == Level::High
    }
}

/// Where GPIO writes go.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GpioBackend {
    /// Linux sysfs GPIO (`/sys/class/gpio`).
    Sysfs,
    /// In-memory outputs, for running on a development host.
    Simulated,
}

/// One entry of the static peripheral table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeripheralConfig {
    /// GPIO line number.
    pub pin: u32,
    /// Level driven when the output is opened.
    pub initial_level: Level,
    /// `true` for active-LOW outputs.
    pub invert: bool,
    /// Symbolic name; doubles as the twin property / method key.
    pub name: String,
}

impl PeripheralConfig {
    fn new(pin: u32, initial_level: Level, invert: bool, name: &str) -> Self {
        Self {
            pin,
            initial_level,
            invert,
            name: name.to_owned(),
        }
    }
}

/// IoT Hub connection parameters.
///
/// The SAS token is minted off-device; renewal is the operator's job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HubConfig {
    /// Hub host name, e.g. `myhub.azure-devices.net`.
    pub host: String,
    /// Registered device id.
    pub device_id: String,
    /// Shared access signature used as the MQTT password.
    pub sas_token: String,
}

/// Core system configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SystemConfig {
    // --- Timers ---
    /// Cloud client work pump period (seconds)
    pub do_work_period_secs: u32,
    /// Sensor measure + telemetry period (seconds)
    pub measure_period_secs: u32,
    /// Heartbeat to the real-time core (seconds)
    pub heartbeat_period_secs: u32,

    // --- Relay pulse ---
    /// How long the relay is flipped when the real-time core signals (ms)
    pub relay_pulse_ms: u32,

    // --- Peripherals ---
    pub gpio_backend: GpioBackend,
    pub relay: PeripheralConfig,
    pub light: PeripheralConfig,
    pub fan: PeripheralConfig,
    pub send_status: PeripheralConfig,

    // --- Inter-core ---
    /// Directory holding the inter-core datagram sockets
    pub socket_dir: String,

    // --- Cloud ---
    /// MQTT keep-alive (seconds)
    pub keepalive_secs: u16,
    /// Hub connection; `None` runs the device offline.
    pub hub: Option<HubConfig>,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            // Timers
            do_work_period_secs: 1,
            measure_period_secs: 10,
            heartbeat_period_secs: 30,

            relay_pulse_ms: 100,

            // Peripherals
            gpio_backend: GpioBackend::Sysfs,
            relay: PeripheralConfig::new(pins::RELAY_PIN, Level::Low, false, "relay1"),
            light: PeripheralConfig::new(pins::LIGHT_PIN, Level::High, true, "led1"),
            fan: PeripheralConfig::new(pins::FAN_PIN, Level::Low, false, "fan1"),
            send_status: PeripheralConfig::new(
                pins::SEND_STATUS_PIN,
                Level::High,
                true,
                "SendStatus",
            ),

            socket_dir: "/run/hlbridge".to_owned(),

            keepalive_secs: 20,
            hub: None,
        }
    }
}

impl SystemConfig {
    /// All peripheral entries, in open order.
    pub fn peripheral_table(&self) -> [&PeripheralConfig; 4] {
        [&self.send_status, &self.relay, &self.light, &self.fan]
    }

    /// Reject configurations the firmware cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.do_work_period_secs == 0
            || self.measure_period_secs == 0
            || self.heartbeat_period_secs == 0
        {
            return Err(ConfigError::ValidationFailed("timer periods must be non-zero"));
        }
        if self.keepalive_secs == 0 {
            return Err(ConfigError::ValidationFailed("keepalive_secs must be non-zero"));
        }
        if self.socket_dir.is_empty() {
            return Err(ConfigError::ValidationFailed("socket_dir is empty"));
        }

        let table = self.peripheral_table();
        for (i, p) in table.iter().enumerate() {
            if !is_property_name(&p.name) {
                return Err(ConfigError::ValidationFailed(
                    "peripheral name must be 1..=54 characters of [A-Za-z0-9_]",
                ));
            }
            if table[..i].iter().any(|q| q.pin == p.pin) {
                return Err(ConfigError::ValidationFailed("duplicate GPIO pin"));
            }
        }
        if self.relay.name == self.light.name {
            return Err(ConfigError::ValidationFailed("twin properties must be distinct"));
        }

        if let Some(hub) = &self.hub {
            if hub.host.is_empty() || hub.device_id.is_empty() || hub.sas_token.is_empty() {
                return Err(ConfigError::ValidationFailed("hub host, device_id and sas_token are required"));
            }
            if hub.device_id.starts_with(char::is_whitespace) {
                return Err(ConfigError::ValidationFailed("hub device_id must not start with whitespace"));
            }
        }
        Ok(())
    }
}

/// Twin property names are embedded verbatim into reported-state JSON,
/// so they are restricted to identifier characters.
fn is_property_name(name: &str) -> bool {
    !name.is_empty()
        && name.len() <= MAX_PROPERTY_LEN
        && name.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'_')
}

// ---------------------------------------------------------------------------
// Command line
// ---------------------------------------------------------------------------

/// Positional arguments passed by the application manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchArgs {
    /// ID scope of the IoT Central application.
    pub scope_id: String,
    /// Component id of the real-time partner application.
    pub rt_component_id: String,
}

impl LaunchArgs {
    /// Parse `<scopeId> <rtCoreComponentId>`.  Exactly two arguments.
    pub fn parse<I, S>(args: I) -> Option<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut it = args.into_iter();
        let scope_id = it.next()?.into();
        let rt_component_id = it.next()?.into();
        if it.next().is_some() || scope_id.is_empty() || rt_component_id.is_empty() {
            return None;
        }
        Some(Self {
            scope_id,
            rt_component_id,
        })
    }
}
