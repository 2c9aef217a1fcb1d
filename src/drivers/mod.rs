//! Output drivers.

pub mod delay;
pub mod gpio;
