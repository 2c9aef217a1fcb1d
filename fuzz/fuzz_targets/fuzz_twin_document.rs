//! Fuzz target: device twin synchronisation
//!
//! Feeds arbitrary bytes to the synchroniser over simulated outputs and
//! asserts that a rejected document leaves every twin state untouched.
//!
//! cargo fuzz run fuzz_twin_document

#![no_main]

use hlbridge::app::ports::NullCloud;
use hlbridge::config::{GpioBackend, SystemConfig};
use hlbridge::drivers::gpio::GpioOutput;
use hlbridge::peripherals::PeripheralSet;
use hlbridge::twin::synchronize;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let config = SystemConfig::default();
    let Ok(mut set) = PeripheralSet::open(&config, |p| {
        GpioOutput::open(GpioBackend::Simulated, p.pin, p.initial_level)
    }) else {
        return;
    };

    match synchronize(data, &mut set.twins_mut(), &mut NullCloud) {
        Ok(applied) => assert!(applied <= 2),
        Err(_) => {
            assert!(!set.relay.twin_state());
            assert!(!set.light.twin_state());
        }
    }
});
