//! GPIO output driver.
//!
//! ## Dual-backend design
//!
//! On the device: Linux sysfs GPIO.  Each pin is exported, switched to an
//! output at its initial level in one `direction` write (`"high"` /
//! `"low"`), and then driven through its `value` file.
//! On a development host: an in-memory [`SimPin`] that only tracks the
//! level.
//!
//! Both implement the `embedded-hal` [`OutputPin`] trait, so the rest of
//! the firmware never sees which backend is active.

use std::fs::{File, OpenOptions};
use std::io::Write as _;
use std::os::unix::fs::FileExt;
use std::path::{Path, PathBuf};

use embedded_hal::digital::{ErrorType, OutputPin};
use log::debug;

use crate::config::{GpioBackend, Level};
use crate::error::GpioError;

/// Default sysfs GPIO root.
pub const SYSFS_ROOT: &str = "/sys/class/gpio";

// ── Sysfs ─────────────────────────────────────────────────────

/// Handle to a sysfs GPIO tree.
#[derive(Debug, Clone)]
pub struct SysfsGpio {
    root: PathBuf,
}

impl SysfsGpio {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Export `pin` (if needed) and configure it as an output at `level`.
    pub fn open_output(&self, pin: u32, level: Level) -> Result<SysfsPin, GpioError> {
        let dir = self.root.join(format!("gpio{pin}"));
        if !dir.exists() {
            write_file(&self.root.join("export"), pin.to_string().as_bytes())
                .map_err(|_| GpioError::ExportFailed(pin))?;
        }

        let direction: &[u8] = if level.is_high() { b"high" } else { b"low" };
        write_file(&dir.join("direction"), direction).map_err(|_| GpioError::DirectionFailed(pin))?;

        let value = OpenOptions::new()
            .write(true)
            .open(dir.join("value"))
            .map_err(|_| GpioError::DirectionFailed(pin))?;

        Ok(SysfsPin { pin, value })
    }
}

impl Default for SysfsGpio {
    fn default() -> Self {
        Self::new(SYSFS_ROOT)
    }
}

fn write_file(path: &Path, data: &[u8]) -> std::io::Result<()> {
    OpenOptions::new().write(true).truncate(true).open(path)?.write_all(data)
}

/// An exported sysfs output.  The value file is closed on drop.
#[derive(Debug)]
pub struct SysfsPin {
    pin: u32,
    value: File,
}

impl SysfsPin {
    pub fn pin(&self) -> u32 {
        self.pin
    }

    fn write(&mut self, high: bool) -> Result<(), GpioError> {
        let byte: &[u8] = if high { b"1" } else { b"0" };
        self.value
            .write_at(byte, 0)
            .map(|_| ())
            .map_err(|_| GpioError::WriteFailed(self.pin))
    }
}

// ── Simulated ─────────────────────────────────────────────────

/// In-memory output for host runs.
#[derive(Debug, Clone, Copy)]
pub struct SimPin {
    pin: u32,
    high: bool,
}

impl SimPin {
    pub fn new(pin: u32, level: Level) -> Self {
        Self {
            pin,
            high: level.is_high(),
        }
    }

    pub fn is_high(&self) -> bool {
        self.high
    }

    fn write(&mut self, high: bool) {
        debug!("gpio(sim): pin {} -> {}", self.pin, if high { "high" } else { "low" });
        self.high = high;
    }
}

// ── Backend-agnostic output ───────────────────────────────────

/// A GPIO output on whichever backend the config selects.
#[derive(Debug)]
pub enum GpioOutput {
    Sysfs(SysfsPin),
    Simulated(SimPin),
}

impl GpioOutput {
    /// Open `pin` as an output driven to `level`.
    pub fn open(backend: GpioBackend, pin: u32, level: Level) -> Result<Self, GpioError> {
        match backend {
            GpioBackend::Sysfs => SysfsGpio::default().open_output(pin, level).map(Self::Sysfs),
            GpioBackend::Simulated => Ok(Self::Simulated(SimPin::new(pin, level))),
        }
    }
}

impl ErrorType for GpioOutput {
    type Error = GpioError;
}

impl OutputPin for GpioOutput {
    fn set_low(&mut self) -> Result<(), GpioError> {
        match self {
            Self::Sysfs(p) => p.write(false),
            Self::Simulated(p) => {
                p.write(false);
                Ok(())
            }
        }
    }

    fn set_high(&mut self) -> Result<(), GpioError> {
        match self {
            Self::Sysfs(p) => p.write(true),
            Self::Simulated(p) => {
                p.write(true);
                Ok(())
            }
        }
    }
}
