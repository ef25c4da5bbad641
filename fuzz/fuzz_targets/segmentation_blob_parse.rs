//! Fuzz target for segmentation blob extraction.
//!
//! This fuzzer feeds arbitrary JSON to the polymorphic segmentation blob
//! parser, checking for panics, crashes, or hangs.

#![no_main]

use labelwarp::extract::fuzz_parse_segmentation_blob;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if data.len() > 10 * 1024 * 1024 {
        return;
    }

    let Ok(input) = std::str::from_utf8(data) else {
        return;
    };

    fuzz_parse_segmentation_blob(input);
});
