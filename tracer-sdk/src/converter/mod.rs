//! The converter capability interface: one trait, two zero-sized
//! implementations, rather than an inheritance hierarchy.

pub mod legacy_binary;
pub mod proto;

use std::collections::BTreeMap;

use tracer_core::{LogRecord, Span};

pub use legacy_binary::LegacyBinaryConverter;
pub use proto::ProtoConverter;

/// Translates in-memory span records into one of the two supported wire
/// schemas.
pub trait Converter {
    type Auth;
    type Runtime;
    type SpanRecord;
    type Report;

    fn create_auth(&self, access_token: &str) -> Self::Auth;

    fn create_runtime(
        &self,
        component_name: &str,
        tags: &BTreeMap<String, String>,
        guid: u64,
    ) -> Self::Runtime;

    fn create_span_record(&self, span: &Span, guid: u64) -> Self::SpanRecord;

    fn append_attribute(&self, record: &mut Self::SpanRecord, key: &str, value: &str);

    fn append_join_id(&self, record: &mut Self::SpanRecord, key: &str, value: &str);

    fn append_log(&self, record: &mut Self::SpanRecord, log: &LogRecord);

    fn create_report(&self, runtime: Self::Runtime, records: Vec<Self::SpanRecord>) -> Self::Report;

    fn combine_span_records(&self, report: &mut Self::Report, records: Vec<Self::SpanRecord>);

    fn num_span_records(&self, report: &Self::Report) -> usize;

    fn get_span_records(&self, report: &Self::Report) -> &[Self::SpanRecord];

    fn get_span_name<'a>(&self, record: &'a Self::SpanRecord) -> &'a str;

    /// Converts a finished span into a wire record in one call, applying
    /// tag/log value coercion and parent-reference handling. Built atop
    /// the lower-level methods above so each variant only has to say how a
    /// single attribute/log/parent-ref is appended.
    fn convert_span(&self, span: &Span, guid: u64) -> Self::SpanRecord {
        let mut record = self.create_span_record(span, guid);
        let (attributes, join_ids) = span.split_join_ids();
        for (key, value) in attributes {
            self.append_attribute(&mut record, key, value);
        }
        for (key, value) in join_ids {
            self.append_join_id(&mut record, key, value);
        }
        for log in &span.logs {
            self.append_log(&mut record, log);
        }
        self.append_parent_reference(&mut record, span.parent_span_id);
        record
    }

    /// Appends the parent-span reference in whatever shape this variant's
    /// wire schema uses. Default is a no-op; variants that need it override.
    fn append_parent_reference(&self, _record: &mut Self::SpanRecord, _parent_span_id: Option<u64>) {}
}
