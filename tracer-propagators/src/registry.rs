//! A format-tag → propagator registry: a tracer facade dispatches `inject`/
//! `extract` through this rather than matching on format itself.

use std::collections::BTreeMap;

use tracer_core::error::PropagationError;
use tracer_core::SpanContext;

use crate::carrier::TextMapCarrier;
use crate::{
    B3MultiPropagator, B3SinglePropagator, EnvoyBinaryPropagator, LightStepBinaryPropagator, Propagator,
    TextMapPropagator, W3cTraceContextPropagator,
};

/// The supported wire formats. `HttpHeaders` and `TextMap` share one
/// implementation: the legacy `ot-tracer-*` format is just a string→string
/// map whether that map backs HTTP headers or something else, with no
/// behavioral difference between the two tags.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Format {
    TextMap,
    HttpHeaders,
    B3Multi,
    B3Single,
    TraceContext,
    Binary,
    LightStepBinary,
}

type TextMapEntry = Box<dyn Propagator<Carrier = dyn TextMapCarrier> + Send + Sync>;
type BinaryEntry = Box<dyn Propagator<Carrier = Vec<u8>> + Send + Sync>;

/// A registered set of propagators, keyed by [`Format`].
pub struct PropagatorRegistry {
    text_map: BTreeMap<Format, TextMapEntry>,
    binary: BTreeMap<Format, BinaryEntry>,
}

impl Default for PropagatorRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl PropagatorRegistry {
    /// An empty registry; every `inject`/`extract` call fails with
    /// `UnsupportedFormat` until formats are registered.
    pub fn empty() -> Self {
        PropagatorRegistry {
            text_map: BTreeMap::new(),
            binary: BTreeMap::new(),
        }
    }

    /// A registry pre-populated with every built-in format: text map, both
    /// B3 forms, W3C Trace Context, and both binary envelopes.
    pub fn with_defaults() -> Self {
        let mut registry = Self::empty();
        registry.register_text_map(Format::TextMap, Box::new(TextMapPropagator));
        registry.register_text_map(Format::HttpHeaders, Box::new(TextMapPropagator));
        registry.register_text_map(Format::B3Multi, Box::new(B3MultiPropagator));
        registry.register_text_map(Format::B3Single, Box::new(B3SinglePropagator));
        registry.register_text_map(Format::TraceContext, Box::new(W3cTraceContextPropagator));
        registry.register_binary(Format::Binary, Box::new(EnvoyBinaryPropagator));
        registry.register_binary(Format::LightStepBinary, Box::new(LightStepBinaryPropagator));
        registry
    }

    pub fn register_text_map(&mut self, format: Format, propagator: TextMapEntry) {
        self.text_map.insert(format, propagator);
    }

    pub fn register_binary(&mut self, format: Format, propagator: BinaryEntry) {
        self.binary.insert(format, propagator);
    }

    pub fn inject_text_map(
        &self,
        format: Format,
        context: &SpanContext,
        carrier: &mut dyn TextMapCarrier,
    ) -> Result<(), PropagationError> {
        self.text_map_propagator(format)?.inject(context, carrier)
    }

    pub fn extract_text_map(&self, format: Format, carrier: &dyn TextMapCarrier) -> Result<SpanContext, PropagationError> {
        self.text_map_propagator(format)?.extract(carrier)
    }

    pub fn inject_binary(
        &self,
        format: Format,
        context: &SpanContext,
        carrier: &mut Vec<u8>,
    ) -> Result<(), PropagationError> {
        self.binary_propagator(format)?.inject(context, carrier)
    }

    pub fn extract_binary(&self, format: Format, carrier: &Vec<u8>) -> Result<SpanContext, PropagationError> {
        self.binary_propagator(format)?.extract(carrier)
    }

    fn text_map_propagator(&self, format: Format) -> Result<&TextMapEntry, PropagationError> {
        self.text_map
            .get(&format)
            .ok_or_else(|| PropagationError::UnsupportedFormat(format!("{format:?}")))
    }

    fn binary_propagator(&self, format: Format) -> Result<&BinaryEntry, PropagationError> {
        self.binary
            .get(&format)
            .ok_or_else(|| PropagationError::UnsupportedFormat(format!("{format:?}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::carrier::{TextMapCarrier, TextMapCarrierMap};

    #[test]
    fn default_registry_dispatches_to_the_right_format() {
        let registry = PropagatorRegistry::with_defaults();
        let context = SpanContext::new(1, 1);

        let mut carrier = TextMapCarrierMap::new();
        registry.inject_text_map(Format::B3Multi, &context, &mut carrier).unwrap();
        assert!(carrier.get("x-b3-traceid").is_some());
    }

    #[test]
    fn unregistered_format_is_unsupported() {
        let registry = PropagatorRegistry::empty();
        let context = SpanContext::new(1, 1);
        let mut carrier = TextMapCarrierMap::new();
        assert!(matches!(
            registry.inject_text_map(Format::B3Multi, &context, &mut carrier),
            Err(PropagationError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn binary_formats_round_trip_through_the_registry() {
        let registry = PropagatorRegistry::with_defaults();
        let context = SpanContext::new(0xaef5705a09004083, 0xb341);

        let mut carrier = Vec::new();
        registry.inject_binary(Format::Binary, &context, &mut carrier).unwrap();
        let extracted = registry.extract_binary(Format::Binary, &carrier).unwrap();
        assert_eq!(extracted.trace_id, context.trace_id);
    }
}
