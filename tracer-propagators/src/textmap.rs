//! The generic text map / legacy HTTP header propagator.

use percent_encoding::{utf8_percent_encode, percent_decode_str, NON_ALPHANUMERIC};

use tracer_core::clock::{id_to_hex_u128, id_to_hex_u64};
use tracer_core::error::PropagationError;
use tracer_core::SpanContext;

use crate::carrier::TextMapCarrier;
use crate::Propagator;

const TRACE_ID_KEY: &str = "ot-tracer-traceid";
const SPAN_ID_KEY: &str = "ot-tracer-spanid";
const SAMPLED_KEY: &str = "ot-tracer-sampled";
const BAGGAGE_PREFIX: &str = "ot-baggage-";

/// The legacy text-map format: unpadded hex ids, a literal `true`/`false`
/// sampled flag, and `ot-baggage-`-prefixed, URL-escaped baggage.
#[derive(Clone, Copy, Debug, Default)]
pub struct TextMapPropagator;

impl Propagator for TextMapPropagator {
    type Carrier = dyn TextMapCarrier;

    fn inject(&self, context: &SpanContext, carrier: &mut Self::Carrier) -> Result<(), PropagationError> {
        carrier.set(TRACE_ID_KEY.to_string(), id_to_hex_u128(context.trace_id));
        carrier.set(SPAN_ID_KEY.to_string(), id_to_hex_u64(context.span_id));
        carrier.set(SAMPLED_KEY.to_string(), context.sampled.to_string());

        for (key, value) in &context.baggage {
            let escaped = utf8_percent_encode(value, NON_ALPHANUMERIC).to_string();
            carrier.set(format!("{BAGGAGE_PREFIX}{key}"), escaped);
        }
        Ok(())
    }

    fn extract(&self, carrier: &Self::Carrier) -> Result<SpanContext, PropagationError> {
        let trace_id_hex = carrier.get(TRACE_ID_KEY);
        let span_id_hex = carrier.get(SPAN_ID_KEY);
        let sampled_raw = carrier.get(SAMPLED_KEY);

        let (trace_id_hex, span_id_hex, sampled_raw) = match (trace_id_hex, span_id_hex, sampled_raw) {
            (Some(t), Some(s), Some(sa)) => (t, s, sa),
            _ => {
                return Err(PropagationError::SpanContextCorrupted(
                    "missing one of ot-tracer-traceid/spanid/sampled".to_string(),
                ))
            }
        };

        let trace_id = u128::from_str_radix(trace_id_hex, 16)
            .map_err(|_| PropagationError::SpanContextCorrupted("malformed ot-tracer-traceid".to_string()))?;
        let span_id = u64::from_str_radix(span_id_hex, 16)
            .map_err(|_| PropagationError::SpanContextCorrupted("malformed ot-tracer-spanid".to_string()))?;
        let sampled = sampled_raw == "true";

        let mut context = SpanContext::new(trace_id, span_id);
        context.sampled = sampled;

        for key in carrier.keys() {
            let lower = key.to_ascii_lowercase();
            if let Some(baggage_key) = lower.strip_prefix(BAGGAGE_PREFIX) {
                if let Some(value) = carrier.get(&lower) {
                    let decoded = percent_decode_str(value).decode_utf8_lossy().into_owned();
                    context.set_baggage_item(baggage_key, decoded);
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
    fn round_trips_trace_and_span_ids() {
        let propagator = TextMapPropagator;
        let mut context = SpanContext::new(0xaef5705a09004083, 0xb341);
        context.sampled = true;
        context.set_baggage_item("checked", "baggage value");

        let mut carrier = TextMapCarrierMap::new();
        propagator.inject(&context, &mut carrier).unwrap();
        let extracted = propagator.extract(&carrier).unwrap();

        assert_eq!(extracted.trace_id, context.trace_id);
        assert_eq!(extracted.span_id, context.span_id);
        assert_eq!(extracted.sampled, context.sampled);
        assert_eq!(extracted.get_baggage_item("checked"), Some("baggage value"));
    }

    #[test]
    fn extract_requires_all_three_fields() {
        let propagator = TextMapPropagator;
        let mut carrier = TextMapCarrierMap::new();
        carrier.set(TRACE_ID_KEY.to_string(), "abc".to_string());
        assert!(propagator.extract(&carrier).is_err());
    }

    #[test]
    fn ids_are_formatted_as_unpadded_lowercase_hex() {
        let propagator = TextMapPropagator;
        let context = SpanContext::new(0xaef5705a09004083, 0xb341);
        let mut carrier = TextMapCarrierMap::new();
        propagator.inject(&context, &mut carrier).unwrap();

        assert_eq!(carrier.get(TRACE_ID_KEY), Some("aef5705a09004083"));
        assert_eq!(carrier.get(SPAN_ID_KEY), Some("b341"));
    }
}
