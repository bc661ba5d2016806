//! The two binary-envelope propagators, both operating on a `Vec<u8>`
//! carrier.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use prost::Message as _;

use tracer_core::error::PropagationError;
use tracer_core::SpanContext;
use tracer_proto::{BasicTracerCarrier, BinaryCarrier, EnvoyCarrier};

use crate::Propagator;

fn context_to_envoy_fields(context: &SpanContext) -> (u64, u64, bool, std::collections::HashMap<String, String>) {
    (
        context.trace_id as u64,
        context.span_id,
        context.sampled,
        context.baggage.iter().map(|(k, v)| (k.clone(), v.clone())).collect(),
    )
}

fn apply_baggage(context: &mut SpanContext, baggage_items: std::collections::HashMap<String, String>) {
    for (key, value) in baggage_items {
        context.set_baggage_item(&key, value);
    }
}

/// The Envoy/legacy binary carrier: `{uint32 big-endian length}{protobuf}`.
/// Extract ignores the length prefix and decodes everything after it.
#[derive(Clone, Copy, Debug, Default)]
pub struct EnvoyBinaryPropagator;

impl Propagator for EnvoyBinaryPropagator {
    type Carrier = Vec<u8>;

    fn inject(&self, context: &SpanContext, carrier: &mut Self::Carrier) -> Result<(), PropagationError> {
        let (trace_id, span_id, sampled, baggage_items) = context_to_envoy_fields(context);
        let encoded = EnvoyCarrier {
            trace_id,
            span_id,
            sampled,
            baggage_items,
        }
        .encode_to_vec();

        carrier.clear();
        carrier.extend_from_slice(&(encoded.len() as u32).to_be_bytes());
        carrier.extend_from_slice(&encoded);
        Ok(())
    }

    fn extract(&self, carrier: &Self::Carrier) -> Result<SpanContext, PropagationError> {
        if carrier.len() < 4 {
            return Err(PropagationError::InvalidCarrier);
        }

        let message = EnvoyCarrier::decode(&carrier[4..])
            .map_err(|err| PropagationError::SpanContextCorrupted(err.to_string()))?;

        let mut context = SpanContext::new(message.trace_id as u128, message.span_id);
        context.sampled = message.sampled;
        apply_baggage(&mut context, message.baggage_items);
        Ok(context)
    }
}

/// The vendor binary wrapper: a protobuf `BinaryCarrier{basic_ctx}`,
/// base64-encoded on the wire.
#[derive(Clone, Copy, Debug, Default)]
pub struct LightStepBinaryPropagator;

impl Propagator for LightStepBinaryPropagator {
    type Carrier = Vec<u8>;

    fn inject(&self, context: &SpanContext, carrier: &mut Self::Carrier) -> Result<(), PropagationError> {
        let (trace_id, span_id, sampled, baggage_items) = context_to_envoy_fields(context);
        let wrapper = BinaryCarrier {
            basic_ctx: Some(BasicTracerCarrier {
                trace_id,
                span_id,
                sampled,
                baggage_items,
            }),
        };

        let encoded = wrapper.encode_to_vec();
        *carrier = BASE64.encode(encoded).into_bytes();
        Ok(())
    }

    fn extract(&self, carrier: &Self::Carrier) -> Result<SpanContext, PropagationError> {
        let decoded = BASE64.decode(carrier).map_err(|_| PropagationError::InvalidCarrier)?;
        let wrapper =
            BinaryCarrier::decode(decoded.as_slice()).map_err(|err| PropagationError::SpanContextCorrupted(err.to_string()))?;
        let basic = wrapper
            .basic_ctx
            .ok_or_else(|| PropagationError::SpanContextCorrupted("missing basic_ctx".to_string()))?;

        let mut context = SpanContext::new(basic.trace_id as u128, basic.span_id);
        context.sampled = basic.sampled;
        apply_baggage(&mut context, basic.baggage_items);
        Ok(context)
    }
}
