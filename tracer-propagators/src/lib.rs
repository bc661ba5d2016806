//! Context propagators: inject/extract of span contexts over text map, B3
//! (multi/single), W3C Trace Context, and binary wire formats.
//!
//! Every format implements the same narrow [`Propagator`] contract; the
//! wire-specific work (hex widths, header names, framing) lives in each
//! format's own module. [`registry::PropagatorRegistry`] is what a tracer
//! facade dispatches through at call time, keyed by format tag.

pub mod b3_multi;
pub mod b3_single;
pub mod binary;
pub mod carrier;
pub mod registry;
pub mod textmap;
pub mod w3c;

pub use b3_multi::B3MultiPropagator;
pub use b3_single::B3SinglePropagator;
pub use binary::{EnvoyBinaryPropagator, LightStepBinaryPropagator};
pub use carrier::{TextMapCarrier, TextMapCarrierMap};
pub use registry::{Format, PropagatorRegistry};
pub use textmap::TextMapPropagator;
pub use w3c::W3cTraceContextPropagator;

use tracer_core::error::PropagationError;
use tracer_core::SpanContext;

/// Serializes a [`SpanContext`] into, or reconstructs one from, a carrier of
/// some wire-specific shape.
///
/// `Carrier` is unsized for the text-map family (`dyn TextMapCarrier`, since
/// callers bring their own header-map type) and a plain `Vec<u8>` for the
/// binary envelopes.
pub trait Propagator {
    type Carrier: ?Sized;

    fn inject(&self, context: &SpanContext, carrier: &mut Self::Carrier) -> Result<(), PropagationError>;

    fn extract(&self, carrier: &Self::Carrier) -> Result<SpanContext, PropagationError>;
}
