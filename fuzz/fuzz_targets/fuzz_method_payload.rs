//! Fuzz target: direct method parsing
//!
//! Every invocation must map to a command or to one of the fixed error
//! responses, whatever the payload.
//!
//! cargo fuzz run fuzz_method_payload

#![no_main]

use hlbridge::app::commands::{FAN_SPEED_METHOD, MethodResponse, parse_method};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    match parse_method(FAN_SPEED_METHOD, data) {
        Ok(_) => {}
        Err(resp) => assert_eq!(resp, MethodResponse::INVALID_JSON),
    }
});
