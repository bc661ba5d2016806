//! Protobuf message definitions for the binary context-propagation
//! envelopes (Envoy-style and the vendor binary wrapper).

use prost::Message;
use std::collections::HashMap;

/// The Envoy/legacy binary carrier: a flat span-context message.
#[derive(Clone, PartialEq, Message)]
pub struct EnvoyCarrier {
    #[prost(fixed64, tag = "1")]
    pub trace_id: u64,
    #[prost(fixed64, tag = "2")]
    pub span_id: u64,
    #[prost(bool, tag = "3")]
    pub sampled: bool,
    #[prost(map = "string, string", tag = "4")]
    pub baggage_items: HashMap<String, String>,
}

/// The inner context message wrapped by `BinaryCarrier`.
#[derive(Clone, PartialEq, Message)]
pub struct BasicTracerCarrier {
    #[prost(fixed64, tag = "1")]
    pub trace_id: u64,
    #[prost(fixed64, tag = "2")]
    pub span_id: u64,
    #[prost(bool, tag = "3")]
    pub sampled: bool,
    #[prost(map = "string, string", tag = "4")]
    pub baggage_items: HashMap<String, String>,
}

/// The vendor binary wrapper envelope; wire bytes are base64-encoded before
/// leaving the process. `basic_ctx` sits at field 2 on the wire (field 1 is
/// reserved by the upstream schema for a span-kind discriminant this crate
/// doesn't need to round-trip).
#[derive(Clone, PartialEq, Message)]
pub struct BinaryCarrier {
    #[prost(message, optional, tag = "2")]
    pub basic_ctx: Option<BasicTracerCarrier>,
}
