//! Monotonic-enough wall clock reads and random identifier generation.
//!
//! Identifiers are never derived from the clock: trace ids are 128-bit,
//! span ids are 64-bit, and both come from the thread-local CSPRNG.

use std::time::{SystemTime, UNIX_EPOCH};

/// Returns the current wall-clock time in microseconds since the Unix epoch.
///
/// Computed as `floor(round(now_seconds * 1_000_000))`, i.e. nanosecond
/// precision rounded to the nearest microsecond rather than truncated.
pub fn now_micros() -> u64 {
    let since_epoch = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();
    let nanos = since_epoch.as_secs() * 1_000_000_000 + u64::from(since_epoch.subsec_nanos());
    (nanos + 500) / 1_000
}

/// Splits a microsecond timestamp into `(seconds, nanos)` the way the
/// protobuf wire format wants its `Timestamp` fields.
pub fn micros_to_seconds_nanos(micros: u64) -> (i64, i32) {
    let seconds = (micros / 1_000_000) as i64;
    let nanos = ((micros % 1_000_000) * 1_000) as i32;
    (seconds, nanos)
}

/// Generates a random 128-bit trace id. All-zero is reserved as invalid and
/// is resampled away (astronomically unlikely, but all-zero must never be
/// handed out as a valid id).
pub fn generate_trace_id() -> u128 {
    loop {
        let id: u128 = rand::random();
        if id != 0 {
            return id;
        }
    }
}

/// Generates a random 64-bit span id, same all-zero exclusion as trace ids.
pub fn generate_span_id() -> u64 {
    loop {
        let id: u64 = rand::random();
        if id != 0 {
            return id;
        }
    }
}

/// Generates the 64-bit GUID used for the reporter identity.
pub fn generate_guid() -> u64 {
    rand::random()
}

/// Lowercase, unpadded hex formatting of a 64-bit identifier.
pub fn id_to_hex_u64(id: u64) -> String {
    format!("{id:x}")
}

/// Lowercase hex formatting of a 128-bit identifier, zero-padded to 32
/// characters (the width W3C Trace Context requires on the wire).
pub fn id_to_hex_u128_padded(id: u128) -> String {
    format!("{id:032x}")
}

/// Lowercase, unpadded hex formatting of a 128-bit identifier (the width
/// the legacy text-map/B3 formats use on the wire).
pub fn id_to_hex_u128(id: u128) -> String {
    format!("{id:x}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_formatting_is_lowercase_and_unpadded() {
        assert_eq!(id_to_hex_u64(0xb341), "b341");
        assert_eq!(id_to_hex_u64(0xaef5705a09004083), "aef5705a09004083");
    }

    #[test]
    fn hex_formatting_128_is_zero_padded() {
        assert_eq!(
            id_to_hex_u128_padded(0x0af7651916cd43dd8448eb211c80319c),
            "0af7651916cd43dd8448eb211c80319c"
        );
        assert_eq!(id_to_hex_u128_padded(1), "0".repeat(31) + "1");
    }

    #[test]
    fn hex_formatting_128_unpadded_matches_64_bit_values() {
        assert_eq!(id_to_hex_u128(0xaef5705a09004083), "aef5705a09004083");
    }

    #[test]
    fn micros_to_seconds_nanos_splits_correctly() {
        assert_eq!(micros_to_seconds_nanos(1_500_000), (1, 500_000_000));
        assert_eq!(micros_to_seconds_nanos(0), (0, 0));
    }

    #[test]
    fn generated_ids_are_nonzero() {
        for _ in 0..1000 {
            assert_ne!(generate_trace_id(), 0);
            assert_ne!(generate_span_id(), 0);
        }
    }
}
