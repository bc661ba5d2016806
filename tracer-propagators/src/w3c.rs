//! The W3C Trace Context propagator.

use tracer_core::clock::{generate_span_id, generate_trace_id, id_to_hex_u128_padded, id_to_hex_u64};
use tracer_core::error::PropagationError;
use tracer_core::SpanContext;

use crate::carrier::TextMapCarrier;
use crate::Propagator;

const TRACEPARENT_KEY: &str = "traceparent";
const TRACESTATE_KEY: &str = "tracestate";
const TRACE_FLAGS_BAGGAGE_KEY: &str = "trace-flags";
const MAX_TRACESTATE_MEMBERS: usize = 32;

/// Full-width (00-prefixed) `traceparent` length, including both dashes and
/// the final two trace-flags hex digits.
const V0_TRACEPARENT_LEN: usize = 55;

fn is_hex_of_len(value: &str, len: usize) -> bool {
    value.len() == len && value.bytes().all(|b| b.is_ascii_hexdigit())
}

fn is_all_zero_hex(value: &str) -> bool {
    value.bytes().all(|b| b == b'0')
}

/// The W3C Trace Context propagator. Recoverable traceparent parse
/// failures (missing header, bad version, forbidden all-zero ids, short
/// post-v0 values) return a fresh random-rooted context rather than an
/// error; only duplicate headers are a hard
/// [`PropagationError::SpanContextCorrupted`].
#[derive(Clone, Copy, Debug, Default)]
pub struct W3cTraceContextPropagator;

impl Propagator for W3cTraceContextPropagator {
    type Carrier = dyn TextMapCarrier;

    fn inject(&self, context: &SpanContext, carrier: &mut Self::Carrier) -> Result<(), PropagationError> {
        let flags: u8 = context
            .get_baggage_item(TRACE_FLAGS_BAGGAGE_KEY)
            .and_then(|value| value.parse().ok())
            .unwrap_or(0);

        let traceparent = format!(
            "00-{}-{}-{:02x}",
            id_to_hex_u128_padded(context.trace_id),
            id_to_hex_u64_padded(context.span_id),
            flags
        );
        carrier.set(TRACEPARENT_KEY.to_string(), traceparent);

        for (key, value) in &context.baggage {
            if key == TRACE_FLAGS_BAGGAGE_KEY {
                continue;
            }
            carrier.set(key.clone(), value.clone());
        }
        Ok(())
    }

    fn extract(&self, carrier: &Self::Carrier) -> Result<SpanContext, PropagationError> {
        let keys = carrier.keys();
        if count_case_insensitive(&keys, TRACEPARENT_KEY) > 1 {
            return Err(PropagationError::SpanContextCorrupted(
                "multiple traceparent headers".to_string(),
            ));
        }
        if count_case_insensitive(&keys, TRACESTATE_KEY) > 1 {
            return Err(PropagationError::SpanContextCorrupted(
                "multiple tracestate headers".to_string(),
            ));
        }

        let Some(raw) = carrier.get(TRACEPARENT_KEY) else {
            return Ok(fresh_context());
        };

        let Some((trace_id, span_id, flags)) = parse_traceparent(raw) else {
            return Ok(fresh_context());
        };

        let mut context = SpanContext::new(trace_id, span_id);
        context.sampled = flags & 0x01 != 0;
        if flags & !0x01 != 0 {
            #[cfg(feature = "internal-logs")]
            tracing::warn!(name: "w3c_reserved_trace_flags_set", target: "tracer_propagators", flags);
        }
        context.set_baggage_item(TRACE_FLAGS_BAGGAGE_KEY, flags.to_string());

        if let Some(tracestate_raw) = carrier.get(TRACESTATE_KEY) {
            if let Some(validated) = validate_tracestate(tracestate_raw) {
                context.set_baggage_item(TRACESTATE_KEY, validated);
            }
        }

        for key in keys {
            let lower = key.to_ascii_lowercase();
            if lower == TRACEPARENT_KEY || lower == TRACESTATE_KEY {
                continue;
            }
            if let Some(value) = carrier.get(&lower) {
                context.set_baggage_item(&lower, value);
            }
        }

        Ok(context)
    }
}

fn id_to_hex_u64_padded(id: u64) -> String {
    format!("{id:016x}")
}

fn count_case_insensitive(keys: &[String], needle: &str) -> usize {
    keys.iter().filter(|k| k.eq_ignore_ascii_case(needle)).count()
}

fn fresh_context() -> SpanContext {
    SpanContext::new(generate_trace_id(), generate_span_id())
}

fn parse_traceparent(raw: &str) -> Option<(u128, u64, u8)> {
    let parts: Vec<&str> = raw.split('-').collect();
    if parts.len() < 4 {
        return None;
    }
    let (version, trace_id_hex, parent_id_hex, flags_hex) = (parts[0], parts[1], parts[2], parts[3]);

    if !is_hex_of_len(version, 2) || version.eq_ignore_ascii_case("ff") {
        return None;
    }
    if !is_hex_of_len(trace_id_hex, 32) || is_all_zero_hex(trace_id_hex) {
        return None;
    }
    if !is_hex_of_len(parent_id_hex, 16) || is_all_zero_hex(parent_id_hex) {
        return None;
    }
    if !is_hex_of_len(flags_hex, 2) {
        return None;
    }

    if version.eq_ignore_ascii_case("00") {
        if raw.len() != V0_TRACEPARENT_LEN {
            return None;
        }
    } else if raw.len() < V0_TRACEPARENT_LEN {
        return None;
    }

    let trace_id = u128::from_str_radix(trace_id_hex, 16).ok()?;
    let span_id = u64::from_str_radix(parent_id_hex, 16).ok()?;
    let flags = u8::from_str_radix(flags_hex, 16).ok()?;
    Some((trace_id, span_id, flags))
}

fn is_valid_tracestate_key(key: &str) -> bool {
    !key.is_empty()
        && key.bytes().next().is_some_and(|b| b.is_ascii_lowercase() || b.is_ascii_digit())
        && key
            .bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || matches!(b, b'-' | b'_' | b'*' | b'/' | b'@'))
}

/// Validates and rejoins a `tracestate` header: at most 32 comma-separated
/// `key=value` members, blank members skipped, a duplicate key aborting
/// with no partial state (returns `None`).
fn validate_tracestate(raw: &str) -> Option<String> {
    let mut seen = Vec::new();
    let mut members = Vec::new();

    for member in raw.split(',') {
        let member = member.trim();
        if member.is_empty() {
            continue;
        }
        let (key, value) = member.split_once('=')?;
        if !is_valid_tracestate_key(key) {
            return None;
        }
        if seen.contains(&key) {
            return None;
        }
        seen.push(key);
        members.push(format!("{key}={value}"));
        if members.len() > MAX_TRACESTATE_MEMBERS {
            return None;
        }
    }

    if members.is_empty() {
        None
    } else {
        Some(members.join(","))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::carrier::TextMapCarrierMap;

    #[test]
    fn forbidden_parent_id_yields_fresh_context_not_error() {
        let propagator = W3cTraceContextPropagator;
        let mut carrier = TextMapCarrierMap::new();
        carrier.set(
            TRACEPARENT_KEY.to_string(),
            "00-0af7651916cd43dd8448eb211c80319c-0000000000000000-01".to_string(),
        );

        let context = propagator.extract(&carrier).unwrap();
        assert!(context.is_valid());
    }

    #[test]
    fn missing_traceparent_yields_fresh_context() {
        let propagator = W3cTraceContextPropagator;
        let carrier = TextMapCarrierMap::new();
        let context = propagator.extract(&carrier).unwrap();
        assert!(context.is_valid());
    }

    #[test]
    fn valid_traceparent_round_trips() {
        let propagator = W3cTraceContextPropagator;
        let raw = "00-0af7651916cd43dd8448eb211c80319c-00f067aa0ba902b7-01";
        let mut carrier = TextMapCarrierMap::new();
        carrier.set(TRACEPARENT_KEY.to_string(), raw.to_string());

        let context = propagator.extract(&carrier).unwrap();
        assert_eq!(context.trace_id, 0x0af7651916cd43dd8448eb211c80319c);
        assert_eq!(context.span_id, 0x00f067aa0ba902b7);
        assert!(context.sampled);

        let mut reinjected = TextMapCarrierMap::new();
        propagator.inject(&context, &mut reinjected).unwrap();
        assert_eq!(reinjected.get(TRACEPARENT_KEY), Some(raw));
    }

    #[test]
    fn duplicate_traceparent_is_hard_corrupted() {
        struct DuplicateCarrier;
        impl TextMapCarrier for DuplicateCarrier {
            fn get(&self, key: &str) -> Option<&str> {
                if key.eq_ignore_ascii_case(TRACEPARENT_KEY) {
                    Some("00-0af7651916cd43dd8448eb211c80319c-00f067aa0ba902b7-01")
                } else {
                    None
                }
            }
            fn set(&mut self, _key: String, _value: String) {}
            fn keys(&self) -> Vec<String> {
                vec!["traceparent".to_string(), "Traceparent".to_string()]
            }
        }

        let propagator = W3cTraceContextPropagator;
        assert!(propagator.extract(&DuplicateCarrier).is_err());
    }

    #[test]
    fn tracestate_with_duplicate_key_is_dropped_entirely() {
        assert_eq!(validate_tracestate("a=1,b=2,a=3"), None);
        assert_eq!(validate_tracestate("a=1, b=2"), Some("a=1,b=2".to_string()));
    }
}
