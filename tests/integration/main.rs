//! Integration test driver for `tests/integration/` submodule.
//!
//! Each `mod` below maps to a file that exercises a specific subsystem
//! against mock adapters.  All tests run on the host with no real
//! hardware, sockets to a real-time core, or IoT Hub required.

mod mock_hw;
mod runtime_tests;
mod service_tests;
mod twin_tests;
