//! The legacy binary converter variant: same logical content as
//! [`super::proto::ProtoConverter`], against the hand-rolled legacy binary
//! schema in `tracer_proto::legacy` instead of protobuf.

use std::collections::BTreeMap;

use tracer_core::clock::id_to_hex_u64;
use tracer_core::span::JOIN_ID_TAG_PREFIX;
use tracer_core::{LogRecord, Span};
use tracer_proto::{LegacyAuth, LegacyKeyValue, LegacyLogRecord, LegacyReportRequest, LegacyRuntime, LegacySpanRecord};

use super::Converter;

/// The attribute key this variant uses to carry a span's parent, rather
/// than a structured reference message.
pub const PARENT_SPAN_GUID_ATTRIBUTE: &str = "parent_span_guid";

/// Zero-sized marker implementing [`Converter`] against the legacy binary
/// report schema.
#[derive(Clone, Copy, Debug, Default)]
pub struct LegacyBinaryConverter;

impl Converter for LegacyBinaryConverter {
    type Auth = LegacyAuth;
    type Runtime = LegacyRuntime;
    type SpanRecord = LegacySpanRecord;
    type Report = LegacyReportRequest;

    fn create_auth(&self, access_token: &str) -> Self::Auth {
        LegacyAuth {
            access_token: access_token.to_string(),
        }
    }

    fn create_runtime(
        &self,
        component_name: &str,
        tags: &BTreeMap<String, String>,
        guid: u64,
    ) -> Self::Runtime {
        LegacyRuntime {
            guid: id_to_hex_u64(guid),
            start_micros: tracer_core::clock::now_micros(),
            group_name: component_name.to_string(),
            attrs: tags
                .iter()
                .map(|(k, v)| LegacyKeyValue {
                    key: k.clone(),
                    value: v.clone(),
                })
                .collect(),
        }
    }

    fn create_span_record(&self, span: &Span, guid: u64) -> Self::SpanRecord {
        LegacySpanRecord {
            trace_guid: format!("{:x}", span.context.trace_id),
            span_guid: id_to_hex_u64(span.context.span_id),
            runtime_guid: id_to_hex_u64(guid),
            span_name: span.operation_name.clone(),
            oldest_micros: span.start_time_micros,
            youngest_micros: span.start_time_micros + span.duration_micros,
            attributes: Vec::new(),
            join_ids: Vec::new(),
            log_records: Vec::new(),
        }
    }

    fn append_attribute(&self, record: &mut Self::SpanRecord, key: &str, value: &str) {
        record.attributes.push(LegacyKeyValue {
            key: key.to_string(),
            value: value.to_string(),
        });
    }

    fn append_join_id(&self, record: &mut Self::SpanRecord, key: &str, value: &str) {
        record.join_ids.push(LegacyKeyValue {
            key: format!("{JOIN_ID_TAG_PREFIX}{key}"),
            value: value.to_string(),
        });
    }

    fn append_log(&self, record: &mut Self::SpanRecord, log: &LogRecord) {
        record.log_records.push(LegacyLogRecord {
            timestamp_micros: log.timestamp_micros,
            fields: log
                .fields
                .iter()
                .map(|(k, v)| LegacyKeyValue {
                    key: k.clone(),
                    value: v.clone(),
                })
                .collect(),
        });
    }

    fn create_report(&self, runtime: Self::Runtime, records: Vec<Self::SpanRecord>) -> Self::Report {
        LegacyReportRequest {
            runtime,
            span_records: records,
        }
    }

    fn combine_span_records(&self, report: &mut Self::Report, records: Vec<Self::SpanRecord>) {
        report.span_records.extend(records);
    }

    fn num_span_records(&self, report: &Self::Report) -> usize {
        report.span_records.len()
    }

    fn get_span_records(&self, report: &Self::Report) -> &[Self::SpanRecord] {
        &report.span_records
    }

    fn get_span_name<'a>(&self, record: &'a Self::SpanRecord) -> &'a str {
        &record.span_name
    }

    fn append_parent_reference(&self, record: &mut Self::SpanRecord, parent_span_id: Option<u64>) {
        if let Some(parent_id) = parent_span_id {
            record.attributes.push(LegacyKeyValue {
                key: PARENT_SPAN_GUID_ATTRIBUTE.to_string(),
                value: id_to_hex_u64(parent_id),
            });
        }
    }
}
