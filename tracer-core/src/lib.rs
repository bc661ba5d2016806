//! Core data model for the span recorder.
//!
//! This crate has no knowledge of wire formats or transports; it defines
//! the shapes (`Span`, `SpanContext`, `LogRecord`, `ReporterIdentity`) that
//! `tracer-sdk` converts and ships, and the error taxonomy shared across the
//! workspace.

pub mod clock;
pub mod context;
pub mod encoding;
pub mod error;
pub mod identity;
pub mod span;

pub use context::SpanContext;
pub use error::{ConfigError, PropagationError};
pub use identity::ReporterIdentity;
pub use span::{LogRecord, Span};
