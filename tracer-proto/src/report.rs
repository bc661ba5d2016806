//! Protobuf message definitions for the collector report envelope.
//!
//! These mirror the fixed external protobuf schema the collector speaks
//! (field-for-field equivalent of the `collector.proto` IDL); per the
//! purpose statement the IDL itself is an external contract this crate
//! doesn't redefine, it only needs wire-compatible Rust types. Written by
//! hand against `prost::Message` rather than generated via `prost-build`,
//! which is an equally supported way to consume prost.

use prost::Message;
use prost_types::Timestamp;

#[derive(Clone, PartialEq, Message)]
pub struct Auth {
    #[prost(string, tag = "1")]
    pub access_token: String,
}

#[derive(Clone, PartialEq, Message)]
pub struct KeyValue {
    #[prost(string, tag = "1")]
    pub key: String,
    #[prost(string, tag = "2")]
    pub string_value: String,
}

#[derive(Clone, PartialEq, Message)]
pub struct Reporter {
    #[prost(fixed64, tag = "1")]
    pub reporter_id: u64,
    #[prost(message, repeated, tag = "2")]
    pub tags: Vec<KeyValue>,
}

#[derive(Clone, PartialEq, Message)]
pub struct SpanContext {
    #[prost(fixed64, tag = "1")]
    pub trace_id: u64,
    #[prost(fixed64, tag = "2")]
    pub span_id: u64,
}

#[derive(Clone, Copy, PartialEq, Eq, prost::Enumeration)]
#[repr(i32)]
pub enum Relationship {
    ChildOf = 0,
    FollowsFrom = 1,
}

#[derive(Clone, PartialEq, Message)]
pub struct Reference {
    #[prost(enumeration = "Relationship", tag = "1")]
    pub relationship: i32,
    #[prost(message, optional, tag = "2")]
    pub span_context: Option<SpanContext>,
}

#[derive(Clone, PartialEq, Message)]
pub struct Log {
    #[prost(message, optional, tag = "1")]
    pub timestamp: Option<Timestamp>,
    #[prost(message, repeated, tag = "2")]
    pub fields: Vec<KeyValue>,
}

#[derive(Clone, PartialEq, Message)]
pub struct Span {
    #[prost(message, optional, tag = "1")]
    pub span_context: Option<SpanContext>,
    #[prost(string, tag = "2")]
    pub operation_name: String,
    #[prost(message, optional, tag = "3")]
    pub start_timestamp: Option<Timestamp>,
    #[prost(uint64, tag = "4")]
    pub duration_micros: u64,
    #[prost(message, repeated, tag = "5")]
    pub tags: Vec<KeyValue>,
    #[prost(message, repeated, tag = "6")]
    pub references: Vec<Reference>,
    #[prost(message, repeated, tag = "7")]
    pub logs: Vec<Log>,
}

#[derive(Clone, PartialEq, Message)]
pub struct Command {
    #[prost(bool, tag = "1")]
    pub disable: bool,
}

#[derive(Clone, PartialEq, Message)]
pub struct ReportRequest {
    #[prost(message, optional, tag = "1")]
    pub reporter: Option<Reporter>,
    #[prost(message, optional, tag = "2")]
    pub auth: Option<Auth>,
    #[prost(message, repeated, tag = "3")]
    pub spans: Vec<Span>,
}

#[derive(Clone, PartialEq, Message)]
pub struct ReportResponse {
    #[prost(message, repeated, tag = "1")]
    pub commands: Vec<Command>,
}
