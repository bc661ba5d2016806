//! The B3 multi-header propagator.

use tracer_core::clock::{generate_span_id, generate_trace_id, id_to_hex_u128, id_to_hex_u64};
use tracer_core::error::PropagationError;
use tracer_core::SpanContext;

use crate::carrier::TextMapCarrier;
use crate::Propagator;

const TRACE_ID_KEY: &str = "x-b3-traceid";
const SPAN_ID_KEY: &str = "x-b3-spanid";
const PARENT_SPAN_ID_KEY: &str = "x-b3-parentspanid";
const SAMPLED_KEY: &str = "x-b3-sampled";
const FLAGS_KEY: &str = "x-b3-flags";

const RESERVED_KEYS: [&str; 5] = [TRACE_ID_KEY, SPAN_ID_KEY, PARENT_SPAN_ID_KEY, SAMPLED_KEY, FLAGS_KEY];

/// B3's multi-header form. Trace/span ids are unpadded lowercase hex.
#[derive(Clone, Copy, Debug, Default)]
pub struct B3MultiPropagator;

impl Propagator for B3MultiPropagator {
    type Carrier = dyn TextMapCarrier;

    fn inject(&self, context: &SpanContext, carrier: &mut Self::Carrier) -> Result<(), PropagationError> {
        carrier.set(TRACE_ID_KEY.to_string(), id_to_hex_u128(context.trace_id));
        carrier.set(SPAN_ID_KEY.to_string(), id_to_hex_u64(context.span_id));

        // `x-b3-flags=1` (debug) implies sampled; the two are never both
        // emitted.
        let debug = carrier.get(FLAGS_KEY) == Some("1");
        if !debug {
            carrier.set(SAMPLED_KEY.to_string(), "1".to_string());
        }

        for (key, value) in &context.baggage {
            carrier.set(key.clone(), value.clone());
        }
        Ok(())
    }

    fn extract(&self, carrier: &Self::Carrier) -> Result<SpanContext, PropagationError> {
        let trace_id_hex = carrier.get(TRACE_ID_KEY);
        let span_id_hex = carrier.get(SPAN_ID_KEY);
        let sampled_raw = carrier.get(SAMPLED_KEY);
        let flags_raw = carrier.get(FLAGS_KEY);

        if trace_id_hex.is_none() && span_id_hex.is_none() && sampled_raw.is_none() && flags_raw.is_none() {
            return Err(PropagationError::SpanContextCorrupted(
                "none of trace_id+span_id, sampled, or flags present".to_string(),
            ));
        }

        let trace_id = match trace_id_hex {
            Some(hex) => u128::from_str_radix(hex, 16)
                .map_err(|_| PropagationError::SpanContextCorrupted("malformed x-b3-traceid".to_string()))?,
            None => generate_trace_id(),
        };
        let span_id = match span_id_hex {
            Some(hex) => u64::from_str_radix(hex, 16)
                .map_err(|_| PropagationError::SpanContextCorrupted("malformed x-b3-spanid".to_string()))?,
            None => generate_span_id(),
        };

        let sampled = flags_raw == Some("1")
            || matches!(sampled_raw, Some(value) if value == "1" || value == "true");

        let mut context = SpanContext::new(trace_id, span_id);
        context.sampled = sampled;

        if let Some(parent) = carrier.get(PARENT_SPAN_ID_KEY) {
            context.set_baggage_item(PARENT_SPAN_ID_KEY, parent);
        }

        for key in carrier.keys() {
            let lower = key.to_ascii_lowercase();
            if !RESERVED_KEYS.contains(&lower.as_str()) {
                if let Some(value) = carrier.get(&lower) {
                    context.set_baggage_item(&lower, value);
                }
            }
        }

        Ok(context)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::carrier::TextMapCarrierMap;

    #[test]
    fn inject_emits_sampled_one_when_unset() {
        let propagator = B3MultiPropagator;
        let context = SpanContext::new(0xaef5705a09004083, 0xb341);
        let mut carrier = TextMapCarrierMap::new();
        propagator.inject(&context, &mut carrier).unwrap();

        assert_eq!(carrier.get(TRACE_ID_KEY), Some("aef5705a09004083"));
        assert_eq!(carrier.get(SPAN_ID_KEY), Some("b341"));
        assert_eq!(carrier.get(SAMPLED_KEY), Some("1"));
    }

    #[test]
    fn inject_skips_sampled_when_flags_is_one() {
        let propagator = B3MultiPropagator;
        let context = SpanContext::new(1, 1);
        let mut carrier = TextMapCarrierMap::new();
        carrier.set(FLAGS_KEY.to_string(), "1".to_string());
        propagator.inject(&context, &mut carrier).unwrap();

        assert_eq!(carrier.get(SAMPLED_KEY), None);
    }

    #[test]
    fn extract_requires_at_least_one_recognized_field() {
        let propagator = B3MultiPropagator;
        let carrier = TextMapCarrierMap::new();
        assert!(propagator.extract(&carrier).is_err());
    }

    #[test]
    fn extract_accepts_sampled_only() {
        let propagator = B3MultiPropagator;
        let mut carrier = TextMapCarrierMap::new();
        carrier.set(SAMPLED_KEY.to_string(), "1".to_string());
        let context = propagator.extract(&carrier).unwrap();
        assert!(context.sampled);
    }
}
