//! Wire message definitions shared by the SDK's converters and connections.
//!
//! This crate carries no behavior of its own: it's the set of structs that
//! the collector's binary protocols agree on, kept separate from
//! `tracer-sdk` so the wire schema can be versioned independently of the
//! recorder/connection logic that uses it.

pub mod carrier;
pub mod legacy;
pub mod report;

pub use carrier::{BasicTracerCarrier, BinaryCarrier, EnvoyCarrier};
pub use legacy::{
    LegacyAuth, LegacyCommand, LegacyKeyValue, LegacyLogRecord, LegacyReportRequest,
    LegacyReportResponse, LegacyRuntime, LegacySpanRecord,
};
pub use report::{
    Auth, Command, KeyValue, Log, Reference, Relationship, Reporter, ReportRequest,
    ReportResponse, Span, SpanContext,
};
