//! The error taxonomy surfaced to callers. Transient transport failures and
//! buffer-full drops are deliberately *not* represented here — per the
//! propagation policy, those are recovered internally and are only
//! observable via the drop counter, `flush`'s boolean return, and tracing
//! events.

use thiserror::Error;

/// Errors raised while building a `RecorderOptions` (construction-time,
/// fatal to the caller).
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("access_token must be a non-empty string")]
    MissingAccessToken,
    #[error("max_span_records must be greater than zero")]
    InvalidBufferCap,
}

/// Errors raised by propagator `inject`/`extract`, surfaced directly to the
/// caller (these are programmer errors or genuinely corrupted wire input,
/// not transient failures).
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PropagationError {
    /// Extract found conflicting or malformed carrier input for a format
    /// that mandates strict failure.
    #[error("span context corrupted: {0}")]
    SpanContextCorrupted(String),
    /// Caller supplied a carrier of the wrong shape for the propagator.
    #[error("invalid carrier for this propagator format")]
    InvalidCarrier,
    /// `inject`/`extract` called against a format tag with no registered
    /// propagator.
    #[error("unsupported propagation format: {0}")]
    UnsupportedFormat(String),
}
