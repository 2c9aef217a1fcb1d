//! Sensor subsystem.
//!
//! The telemetry producer reads a [`ClimateReading`] through the
//! [`ClimateSensor`](crate::app::ports::ClimateSensor) port each measure
//! tick.  The only source shipped here is the SHT31-shaped
//! [`climate::SimulatedSht31`].

pub mod climate;

/// One temperature / humidity sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClimateReading {
    /// Degrees Celsius.
    pub temperature_c: f32,
    /// Relative humidity, percent.
    pub humidity_pct: f32,
}
