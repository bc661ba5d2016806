//! The span and log record shapes the recorder consumes.

use crate::context::SpanContext;
use std::collections::BTreeMap;

/// A key prefix that marks a tag as a join id (a correlation attribute
/// separable at record time) rather than an ordinary attribute.
pub const JOIN_ID_TAG_PREFIX: &str = "join:";

/// A single log entry attached to a span: a timestamp plus an ordered
/// sequence of key/value fields.
#[derive(Clone, Debug, Default)]
pub struct LogRecord {
    /// Microseconds since the Unix epoch.
    pub timestamp_micros: u64,
    /// Ordered key/value fields. `Vec` rather than a map: insertion order
    /// is preserved on the wire.
    pub fields: Vec<(String, String)>,
}

impl LogRecord {
    pub fn new(timestamp_micros: u64) -> Self {
        LogRecord {
            timestamp_micros,
            fields: Vec::new(),
        }
    }

    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.push((key.into(), value.into()));
        self
    }
}

/// A finished span, as handed to the recorder. Ownership transfers to the
/// recorder at construction time (callers are expected to have already
/// converted any non-string tag/log values via [`crate::encoding::coerce_str`]).
#[derive(Clone, Debug)]
pub struct Span {
    pub context: SpanContext,
    pub operation_name: String,
    pub start_time_micros: u64,
    pub duration_micros: u64,
    pub parent_span_id: Option<u64>,
    pub tags: BTreeMap<String, String>,
    pub logs: Vec<LogRecord>,
}

impl Span {
    pub fn new(context: SpanContext, operation_name: impl Into<String>, start_time_micros: u64) -> Self {
        Span {
            context,
            operation_name: operation_name.into(),
            start_time_micros,
            duration_micros: 0,
            parent_span_id: None,
            tags: BTreeMap::new(),
            logs: Vec::new(),
        }
    }

    /// Splits `tags` into (ordinary attributes, join ids), consuming the
    /// join-id-prefixed keys' prefix in the process. Grounded in the
    /// source's handling of `constants.JOIN_ID_TAG_PREFIX`.
    pub fn split_join_ids(&self) -> (Vec<(&str, &str)>, Vec<(&str, &str)>) {
        let mut attributes = Vec::new();
        let mut join_ids = Vec::new();
        for (key, value) in &self.tags {
            if let Some(join_key) = key.strip_prefix(JOIN_ID_TAG_PREFIX) {
                join_ids.push((join_key, value.as_str()));
            } else {
                attributes.push((key.as_str(), value.as_str()));
            }
        }
        (attributes, join_ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_span() -> Span {
        let mut span = Span::new(SpanContext::new(1, 2), "op", 100);
        span.tags.insert("http.method".to_string(), "GET".to_string());
        span.tags.insert("join:request_id".to_string(), "abc123".to_string());
        span
    }

    #[test]
    fn join_ids_are_split_from_ordinary_attributes() {
        let span = sample_span();
        let (attrs, joins) = span.split_join_ids();
        assert_eq!(attrs, vec![("http.method", "GET")]);
        assert_eq!(joins, vec![("request_id", "abc123")]);
    }
}
