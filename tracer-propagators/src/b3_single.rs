//! The B3 single-header propagator: `b3: traceid-spanid-sampled[-parentspanid]`.

use tracer_core::clock::{generate_span_id, generate_trace_id, id_to_hex_u128, id_to_hex_u64};
use tracer_core::error::PropagationError;
use tracer_core::SpanContext;

use crate::carrier::TextMapCarrier;
use crate::Propagator;

const HEADER_KEY: &str = "b3";
const PARENT_SPAN_ID_BAGGAGE_KEY: &str = "x-b3-parentspanid";
const SAMPLED_BAGGAGE_KEY: &str = "x-b3-sampled";

/// Parses a `sampled` token: `"d"` means debug (`flags=1`, sampled);
/// anything else is a hex digit read as an integer (nonzero → sampled).
fn parse_sampled_token(token: &str) -> Result<(bool, String), PropagationError> {
    if token == "d" {
        return Ok((true, "1".to_string()));
    }
    let value = u64::from_str_radix(token, 16)
        .map_err(|_| PropagationError::SpanContextCorrupted("malformed b3 sampled token".to_string()))?;
    Ok((value != 0, value.to_string()))
}

/// B3's single-header form.
#[derive(Clone, Copy, Debug, Default)]
pub struct B3SinglePropagator;

impl Propagator for B3SinglePropagator {
    type Carrier = dyn TextMapCarrier;

    fn inject(&self, context: &SpanContext, carrier: &mut Self::Carrier) -> Result<(), PropagationError> {
        let mut value = format!(
            "{}-{}-{}",
            id_to_hex_u128(context.trace_id),
            id_to_hex_u64(context.span_id),
            if context.sampled { "1" } else { "0" }
        );
        if let Some(parent) = context.get_baggage_item(PARENT_SPAN_ID_BAGGAGE_KEY) {
            value.push('-');
            value.push_str(parent);
        }
        carrier.set(HEADER_KEY.to_string(), value);
        Ok(())
    }

    fn extract(&self, carrier: &Self::Carrier) -> Result<SpanContext, PropagationError> {
        let raw = carrier
            .get(HEADER_KEY)
            .ok_or_else(|| PropagationError::SpanContextCorrupted("missing b3 header".to_string()))?;
        let parts: Vec<&str> = raw.split('-').collect();

        let (trace_id, span_id, sampled_part, parent_part) = match parts.as_slice() {
            [sampled] => (None, None, Some(*sampled), None),
            [trace_id, span_id] => (Some(*trace_id), Some(*span_id), None, None),
            [trace_id, span_id, sampled] => (Some(*trace_id), Some(*span_id), Some(*sampled), None),
            [trace_id, span_id, sampled, parent] => (Some(*trace_id), Some(*span_id), Some(*sampled), Some(*parent)),
            _ => return Err(PropagationError::SpanContextCorrupted("malformed b3 header".to_string())),
        };

        let trace_id = match trace_id {
            Some(hex) => u128::from_str_radix(hex, 16)
                .map_err(|_| PropagationError::SpanContextCorrupted("malformed b3 trace id".to_string()))?,
            None => generate_trace_id(),
        };
        let span_id = match span_id {
            Some(hex) => u64::from_str_radix(hex, 16)
                .map_err(|_| PropagationError::SpanContextCorrupted("malformed b3 span id".to_string()))?,
            None => generate_span_id(),
        };

        let mut context = SpanContext::new(trace_id, span_id);

        if let Some(token) = sampled_part {
            let (sampled, baggage_value) = parse_sampled_token(token)?;
            context.sampled = sampled;
            context.set_baggage_item(SAMPLED_BAGGAGE_KEY, baggage_value);
        }

        if let Some(parent_hex) = parent_part {
            let parent_id = u64::from_str_radix(parent_hex, 16)
                .map_err(|_| PropagationError::SpanContextCorrupted("malformed b3 parent span id".to_string()))?;
            context.set_baggage_item(PARENT_SPAN_ID_BAGGAGE_KEY, parent_id.to_string());
        }

        Ok(context)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::carrier::TextMapCarrierMap;

    #[test]
    fn extracts_full_form_with_parent() {
        let propagator = B3SinglePropagator;
        let mut carrier = TextMapCarrierMap::new();
        carrier.set(HEADER_KEY.to_string(), "a12-b34-1-c56".to_string());

        let context = propagator.extract(&carrier).unwrap();
        assert_eq!(context.trace_id, 0xa12);
        assert_eq!(context.span_id, 0xb34);
        assert_eq!(context.get_baggage_item(SAMPLED_BAGGAGE_KEY), Some("1"));
        assert_eq!(
            context.get_baggage_item(PARENT_SPAN_ID_BAGGAGE_KEY),
            Some(0xc56u64.to_string()).as_deref()
        );
    }

    #[test]
    fn debug_token_implies_sampled() {
        let propagator = B3SinglePropagator;
        let mut carrier = TextMapCarrierMap::new();
        carrier.set(HEADER_KEY.to_string(), "a12-b34-d".to_string());
        let context = propagator.extract(&carrier).unwrap();
        assert!(context.sampled);
    }

    #[test]
    fn missing_header_is_corrupted() {
        let propagator = B3SinglePropagator;
        let carrier = TextMapCarrierMap::new();
        assert!(propagator.extract(&carrier).is_err());
    }
}
