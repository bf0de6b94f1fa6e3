//! Fuzz testing for the untrusted-input boundaries.
//!
//! This fuzz target covers the two places where arbitrary text enters the
//! gateway: submitted documents and provider completion text. It ensures
//! both paths:
//!
//! - Never panic on any input
//! - Always return a valid Result or classification
//! - Handle edge cases like empty strings, long strings, and invalid UTF-8
//!
//! # Running the Fuzz Tests
//!
//! ```bash
//! # Install cargo-fuzz (requires nightly)
//! cargo +nightly install cargo-fuzz
//!
//! # Run the validation fuzz target
//! cargo +nightly fuzz run fuzz_validation
//!
//! # Run with a time limit (e.g., 60 seconds)
//! cargo +nightly fuzz run fuzz_validation -- -max_total_time=60
//! ```
//!
//! # What This Tests
//!
//! - `validate_document`: document emptiness and length checks
//! - `parse_reply`: classification of raw provider completion text
//! - `RatePolicy::from_str`: policy string parsing

#![no_main]

use std::str::FromStr;

use libfuzzer_sys::fuzz_target;
use syndicate_gateway::analyzer::parse_reply;
use syndicate_gateway::rate_limit::RatePolicy;
use syndicate_gateway::validation::validate_document;

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        // Document validation (shouldn't panic at any limit)
        let _ = validate_document(s, 30000);
        let _ = validate_document(s, 0);
        let _ = validate_document(s, usize::MAX);

        // Provider reply classification (shouldn't panic)
        let _ = parse_reply(s);

        // Rate policy string parsing (shouldn't panic)
        let _ = RatePolicy::from_str(s);
    }
});
