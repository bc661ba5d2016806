//! `SpanContext`: the identity carried across process boundaries.

use std::collections::BTreeMap;

/// The portion of a span's identity that crosses process boundaries:
/// trace id, span id, sampled flag, and baggage.
///
/// Immutable once a span finishes; baggage may accumulate entries during a
/// span's life (callers build up a `SpanContext` and hand it to the
/// recorder only at `finish`).
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct SpanContext {
    /// 128-bit trace identifier. Some legacy wire formats only carry 64
    /// bits; that truncation happens explicitly at serialization time, not
    /// here.
    pub trace_id: u128,
    /// 64-bit span identifier.
    pub span_id: u64,
    /// Whether this trace was sampled (and should be recorded/exported).
    pub sampled: bool,
    /// Baggage: case-insensitive string keys (canonicalized to lower case)
    /// mapped to string values, propagated alongside the context.
    pub baggage: BTreeMap<String, String>,
}

impl SpanContext {
    /// Builds a new context with random ids and default (unsampled) state.
    pub fn new(trace_id: u128, span_id: u64) -> Self {
        SpanContext {
            trace_id,
            span_id,
            sampled: false,
            baggage: BTreeMap::new(),
        }
    }

    /// A span context is invalid if either id is all-zero.
    pub fn is_valid(&self) -> bool {
        self.trace_id != 0 && self.span_id != 0
    }

    /// Sets a baggage entry, canonicalizing the key. No-op if the key isn't
    /// a valid baggage key per [`canonicalize_baggage_key`].
    pub fn set_baggage_item(&mut self, key: &str, value: impl Into<String>) {
        if let Some(canonical) = canonicalize_baggage_key(key) {
            self.baggage.insert(canonical, value.into());
        }
    }

    /// Reads a baggage entry, canonicalizing the lookup key the same way.
    pub fn get_baggage_item(&self, key: &str) -> Option<&str> {
        let canonical = canonicalize_baggage_key(key)?;
        self.baggage.get(&canonical).map(String::as_str)
    }
}

/// Canonicalizes a baggage key: lower-cases it and validates it matches
/// `[a-z0-9][-a-z0-9]*` (case-insensitively before lowering). Returns `None`
/// for keys that don't match, in which case the caller should drop the
/// entry rather than store it under a mangled key.
pub fn canonicalize_baggage_key(key: &str) -> Option<String> {
    if key.is_empty() {
        return None;
    }
    let lower = key.to_ascii_lowercase();
    let mut chars = lower.chars();
    let first = chars.next()?;
    if !(first.is_ascii_alphanumeric()) {
        return None;
    }
    if chars
        .clone()
        .all(|c| c.is_ascii_alphanumeric() || c == '-')
    {
        Some(lower)
    } else {
        None
    }
}
