//! Fuzz target for transform config ingestion and ordering.
//!
//! This fuzzer feeds arbitrary JSON to the config parser and the
//! execution-order resolver, checking for panics, crashes, or hangs.

#![no_main]

use labelwarp::config::fuzz_parse_config_str;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if data.len() > 10 * 1024 * 1024 {
        return;
    }

    let Ok(input) = std::str::from_utf8(data) else {
        return;
    };

    fuzz_parse_config_str(input);
});
