//! The transport abstraction: `open`/`report`/`close` plus a readiness
//! flag, behind a narrow trait so the recorder and flush worker never see
//! the wire-specific request/response types directly.

pub mod http;
pub mod legacy_binary;

pub use http::HttpConnection;
pub use legacy_binary::LegacyBinaryConnection;

use crate::error::TransportError;

/// A transport able to open, report, and close against a collector.
///
/// `report` returns `Ok(true)` when the collector responded with a command
/// requesting the recorder disable itself, `Ok(false)` otherwise, and `Err`
/// on any transport/serialization failure — the recorder is the only
/// caller, and it reacts identically to every `Err` variant (restore the
/// batch, keep going), so the trait collapses
/// the wire-specific response shape down to that one bit callers act on.
pub trait Connection: Send + Sync {
    type Auth;
    type Report;

    /// Attempts to (re)establish the connection. Returns the new readiness.
    fn open(&self) -> bool;

    /// Whether the connection is currently usable.
    fn is_ready(&self) -> bool;

    /// Transmits a report. Must not be called while `is_ready()` is false.
    fn report(&self, auth: &Self::Auth, report: &Self::Report) -> Result<bool, TransportError>;

    /// Releases any held transport resources. Idempotent.
    fn close(&self);
}
