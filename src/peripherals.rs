//! Peripheral registry.
//!
//! The bridge drives a fixed set of GPIO outputs built once at start-up
//! from [`SystemConfig`]:
//!
//! | Peripheral    | Role                        | Default pin |
//! |---------------|-----------------------------|-------------|
//! | `relay`       | twin property `relay1`      | 0           |
//! | `light`       | twin property `led1`        | 21          |
//! | `fan`         | direct method `fanspeed`    | 4           |
//! | `send_status` | lit while telemetry is sent | 19          |
//!
//! Outputs are generic over [`OutputPin`], so tests substitute mock pins.
//! Dropping the set releases every output.

use embedded_hal::digital::{OutputPin, PinState};
use log::info;

use crate::app::commands::FAN_SPEED_METHOD;
use crate::config::{PeripheralConfig, SystemConfig};

// ───────────────────────────────────────────────────────────────
// Peripheral
// ───────────────────────────────────────────────────────────────

/// A named GPIO output with a logical polarity.
pub struct Peripheral<P> {
    invert: bool,
    name: String,
    output: P,
}

impl<P: OutputPin> Peripheral<P> {
    pub fn new(config: &PeripheralConfig, output: P) -> Self {
        Self {
            invert: config.invert,
            name: config.name.clone(),
            output,
        }
    }

    /// Drive the output to its logical `active` state.
    /// The electrical level is `active XOR invert`.
    pub fn drive(&mut self, active: bool) -> Result<(), P::Error> {
        self.output.set_state(PinState::from(active != self.invert))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The underlying output (tests inspect mock pins through this).
    pub fn output(&self) -> &P {
        &self.output
    }
}

// ───────────────────────────────────────────────────────────────
// Twin-bound peripheral
// ───────────────────────────────────────────────────────────────

/// A peripheral mirrored by a boolean device twin property.
pub struct TwinPeripheral<P> {
    peripheral: Peripheral<P>,
    twin_state: bool,
}

impl<P: OutputPin> TwinPeripheral<P> {
    pub fn new(peripheral: Peripheral<P>) -> Self {
        Self {
            peripheral,
            twin_state: false,
        }
    }

    /// The twin property key.
    pub fn property(&self) -> &str {
        self.peripheral.name()
    }

    /// Last desired value applied from the twin.
    pub fn twin_state(&self) -> bool {
        self.twin_state
    }

    /// Record `state` and drive the output to match.
    /// The cached state is updated even if the write fails.
    pub fn apply(&mut self, state: bool) -> Result<(), P::Error> {
        self.twin_state = state;
        self.peripheral.drive(state)
    }

    pub fn peripheral(&self) -> &Peripheral<P> {
        &self.peripheral
    }

    pub fn peripheral_mut(&mut self) -> &mut Peripheral<P> {
        &mut self.peripheral
    }
}

// ───────────────────────────────────────────────────────────────
// Method-bound peripheral
// ───────────────────────────────────────────────────────────────

/// A peripheral controlled by a direct method.
pub struct MethodPeripheral<P> {
    peripheral: Peripheral<P>,
    method: &'static str,
    speed: Option<i64>,
}

impl<P: OutputPin> MethodPeripheral<P> {
    pub fn new(peripheral: Peripheral<P>, method: &'static str) -> Self {
        Self {
            peripheral,
            method,
            speed: None,
        }
    }

    /// The direct method that controls this peripheral.
    pub fn method_name(&self) -> &'static str {
        self.method
    }

    /// Last speed requested through the method, if any.
    pub fn speed(&self) -> Option<i64> {
        self.speed
    }

    pub fn set_speed(&mut self, speed: i64) {
        self.speed = Some(speed);
    }

    pub fn peripheral(&self) -> &Peripheral<P> {
        &self.peripheral
    }
}

// ───────────────────────────────────────────────────────────────
// PeripheralSet
// ───────────────────────────────────────────────────────────────

/// Every output the firmware owns.
pub struct PeripheralSet<P> {
    pub relay: TwinPeripheral<P>,
    pub light: TwinPeripheral<P>,
    pub fan: MethodPeripheral<P>,
    pub send_status: Peripheral<P>,
}

impl<P: OutputPin> PeripheralSet<P> {
    /// Open every output in the table.  `open` receives each entry and
    /// must return the output already driven to its initial level.
    pub fn open<E>(
        config: &SystemConfig,
        mut open: impl FnMut(&PeripheralConfig) -> Result<P, E>,
    ) -> Result<Self, E> {
        let mut make = |c: &PeripheralConfig| -> Result<Peripheral<P>, E> {
            let output = open(c)?;
            info!(
                "Opened GPIO {} '{}' (initial={:?}, invert={})",
                c.pin, c.name, c.initial_level, c.invert
            );
            Ok(Peripheral::new(c, output))
        };

        let send_status = make(&config.send_status)?;
        let relay = TwinPeripheral::new(make(&config.relay)?);
        let light = TwinPeripheral::new(make(&config.light)?);
        let fan = MethodPeripheral::new(make(&config.fan)?, FAN_SPEED_METHOD);

        Ok(Self {
            relay,
            light,
            fan,
            send_status,
        })
    }

    /// The twin-bound peripherals, in synchronisation order.
    pub fn twins_mut(&mut self) -> [&mut TwinPeripheral<P>; 2] {
        [&mut self.relay, &mut self.light]
    }
}
