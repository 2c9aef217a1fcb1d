//! SHT31-shaped temperature / humidity source.
//!
//! The I²C driver lives outside this crate; on a development host the
//! sensor is simulated.  Readings follow a slow triangle wave around a
//! base value so successive telemetry messages differ, and can be pinned
//! with [`SimulatedSht31::set_reading`] for tests.
//!
//! Readings outside the SHT31 operating range (-40..=125 °C,
//! 0..=100 %RH) are rejected as [`SensorError::OutOfRange`].

use crate::app::ports::ClimateSensor;
use crate::error::SensorError;

use super::ClimateReading;

const TEMP_MIN_C: f32 = -40.0;
const TEMP_MAX_C: f32 = 125.0;
const RH_MIN: f32 = 0.0;
const RH_MAX: f32 = 100.0;

/// Samples per half period of the simulated drift.
const DRIFT_STEPS: u32 = 20;

pub struct SimulatedSht31 {
    base: ClimateReading,
    /// Peak deviation applied to `base` (°C, %RH).
    swing: (f32, f32),
    sample: u32,
}

impl SimulatedSht31 {
    pub fn new() -> Self {
        Self {
            base: ClimateReading {
                temperature_c: 24.0,
                humidity_pct: 45.0,
            },
            swing: (2.0, 5.0),
            sample: 0,
        }
    }

    /// Pin every subsequent reading to `reading`.
    pub fn set_reading(&mut self, reading: ClimateReading) {
        self.base = reading;
        self.swing = (0.0, 0.0);
    }

    fn drift(&self) -> f32 {
        let period = DRIFT_STEPS * 2;
        let pos = self.sample % period;
        let tri = if pos < DRIFT_STEPS { pos } else { period - pos };
        (tri as f32 / DRIFT_STEPS as f32) * 2.0 - 1.0
    }
}

impl Default for SimulatedSht31 {
    fn default() -> Self {
        Self::new()
    }
}

impl ClimateSensor for SimulatedSht31 {
    fn read(&mut self) -> Result<ClimateReading, SensorError> {
        let d = self.drift();
        self.sample = self.sample.wrapping_add(1);
        let reading = ClimateReading {
            temperature_c: self.base.temperature_c + d * self.swing.0,
            humidity_pct: self.base.humidity_pct + d * self.swing.1,
        };
        check_range(reading)
    }
}

fn check_range(r: ClimateReading) -> Result<ClimateReading, SensorError> {
    if !(TEMP_MIN_C..=TEMP_MAX_C).contains(&r.temperature_c)
        || !(RH_MIN..=RH_MAX).contains(&r.humidity_pct)
    {
        return Err(SensorError::OutOfRange);
    }
    Ok(r)
}
