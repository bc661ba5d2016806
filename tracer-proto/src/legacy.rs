//! The legacy binary wire record and its framing.
//!
//! The original transport for this format used the Thrift binary protocol;
//! per the purpose statement, the wire IDL is an external, fixed contract
//! this crate does not redefine. What's reproduced here is the *logical*
//! record shape (`thrift_converter.py`'s `SpanRecord`/`Runtime`/
//! `ReportRequest`) together with a length-prefixed binary framing
//! equivalent in spirit to `TBinaryProtocol`, hand-written directly against
//! `std::io` rather than pulled in from a Thrift codegen pipeline.

use std::io::{self, Read};

fn write_string(out: &mut Vec<u8>, s: &str) {
    let bytes = s.as_bytes();
    out.extend_from_slice(&(bytes.len() as u32).to_be_bytes());
    out.extend_from_slice(bytes);
}

fn read_string(input: &mut impl Read) -> io::Result<String> {
    let mut len_buf = [0u8; 4];
    input.read_exact(&mut len_buf)?;
    let len = u32::from_be_bytes(len_buf) as usize;
    let mut buf = vec![0u8; len];
    input.read_exact(&mut buf)?;
    String::from_utf8(buf).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}

fn write_u64(out: &mut Vec<u8>, v: u64) {
    out.extend_from_slice(&v.to_be_bytes());
}

fn read_u64(input: &mut impl Read) -> io::Result<u64> {
    let mut buf = [0u8; 8];
    input.read_exact(&mut buf)?;
    Ok(u64::from_be_bytes(buf))
}

fn write_bool(out: &mut Vec<u8>, v: bool) {
    out.push(u8::from(v));
}

fn read_bool(input: &mut impl Read) -> io::Result<bool> {
    let mut buf = [0u8; 1];
    input.read_exact(&mut buf)?;
    Ok(buf[0] != 0)
}

fn write_list<T>(out: &mut Vec<u8>, items: &[T], write_item: impl Fn(&mut Vec<u8>, &T)) {
    out.extend_from_slice(&(items.len() as u32).to_be_bytes());
    for item in items {
        write_item(out, item);
    }
}

fn read_list<T>(input: &mut impl Read, read_item: impl Fn(&mut dyn Read) -> io::Result<T>) -> io::Result<Vec<T>> {
    let mut len_buf = [0u8; 4];
    input.read_exact(&mut len_buf)?;
    let len = u32::from_be_bytes(len_buf) as usize;
    let mut items = Vec::with_capacity(len);
    for _ in 0..len {
        items.push(read_item(input)?);
    }
    Ok(items)
}

#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct LegacyKeyValue {
    pub key: String,
    pub value: String,
}

impl LegacyKeyValue {
    fn write(out: &mut Vec<u8>, kv: &LegacyKeyValue) {
        write_string(out, &kv.key);
        write_string(out, &kv.value);
    }

    fn read(input: &mut dyn Read) -> io::Result<LegacyKeyValue> {
        Ok(LegacyKeyValue {
            key: read_string(input)?,
            value: read_string(input)?,
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct LegacyLogRecord {
    pub timestamp_micros: u64,
    pub fields: Vec<LegacyKeyValue>,
}

impl LegacyLogRecord {
    fn write(out: &mut Vec<u8>, log: &LegacyLogRecord) {
        write_u64(out, log.timestamp_micros);
        write_list(out, &log.fields, LegacyKeyValue::write);
    }

    fn read(input: &mut dyn Read) -> io::Result<LegacyLogRecord> {
        Ok(LegacyLogRecord {
            timestamp_micros: read_u64(input)?,
            fields: read_list(input, LegacyKeyValue::read)?,
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct LegacySpanRecord {
    pub trace_guid: String,
    pub span_guid: String,
    pub runtime_guid: String,
    pub span_name: String,
    pub oldest_micros: u64,
    pub youngest_micros: u64,
    pub attributes: Vec<LegacyKeyValue>,
    pub join_ids: Vec<LegacyKeyValue>,
    pub log_records: Vec<LegacyLogRecord>,
}

impl LegacySpanRecord {
    pub fn write(&self, out: &mut Vec<u8>) {
        write_string(out, &self.trace_guid);
        write_string(out, &self.span_guid);
        write_string(out, &self.runtime_guid);
        write_string(out, &self.span_name);
        write_u64(out, self.oldest_micros);
        write_u64(out, self.youngest_micros);
        write_list(out, &self.attributes, LegacyKeyValue::write);
        write_list(out, &self.join_ids, LegacyKeyValue::write);
        write_list(out, &self.log_records, LegacyLogRecord::write);
    }

    pub fn read(input: &mut impl Read) -> io::Result<LegacySpanRecord> {
        Ok(LegacySpanRecord {
            trace_guid: read_string(input)?,
            span_guid: read_string(input)?,
            runtime_guid: read_string(input)?,
            span_name: read_string(input)?,
            oldest_micros: read_u64(input)?,
            youngest_micros: read_u64(input)?,
            attributes: read_list(input, LegacyKeyValue::read)?,
            join_ids: read_list(input, LegacyKeyValue::read)?,
            log_records: read_list(input, LegacyLogRecord::read)?,
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct LegacyAuth {
    pub access_token: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct LegacyRuntime {
    pub guid: String,
    pub start_micros: u64,
    pub group_name: String,
    pub attrs: Vec<LegacyKeyValue>,
}

impl LegacyRuntime {
    fn write(&self, out: &mut Vec<u8>) {
        write_string(out, &self.guid);
        write_u64(out, self.start_micros);
        write_string(out, &self.group_name);
        write_list(out, &self.attrs, LegacyKeyValue::write);
    }

    fn read(input: &mut impl Read) -> io::Result<LegacyRuntime> {
        Ok(LegacyRuntime {
            guid: read_string(input)?,
            start_micros: read_u64(input)?,
            group_name: read_string(input)?,
            attrs: read_list(input, LegacyKeyValue::read)?,
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct LegacyReportRequest {
    pub runtime: LegacyRuntime,
    pub span_records: Vec<LegacySpanRecord>,
}

impl LegacyReportRequest {
    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::new();
        self.runtime.write(&mut out);
        write_list(&mut out, &self.span_records, |out, span| span.write(out));
        out
    }

    pub fn decode(bytes: &[u8]) -> io::Result<LegacyReportRequest> {
        let mut cursor = bytes;
        let runtime = LegacyRuntime::read(&mut cursor)?;
        let span_records = read_list(&mut cursor, |r| LegacySpanRecord::read(r))?;
        Ok(LegacyReportRequest { runtime, span_records })
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct LegacyCommand {
    pub disable: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct LegacyReportResponse {
    pub commands: Vec<LegacyCommand>,
}

impl LegacyReportResponse {
    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::new();
        write_list(&mut out, &self.commands, |out, cmd| write_bool(out, cmd.disable));
        out
    }

    pub fn decode(bytes: &[u8]) -> io::Result<LegacyReportResponse> {
        let mut cursor = bytes;
        let commands = read_list(&mut cursor, |r| Ok(LegacyCommand { disable: read_bool(r)? }))?;
        Ok(LegacyReportResponse { commands })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_request_round_trips() {
        let request = LegacyReportRequest {
            runtime: LegacyRuntime {
                guid: "abc".into(),
                start_micros: 42,
                group_name: "svc".into(),
                attrs: vec![LegacyKeyValue {
                    key: "k".into(),
                    value: "v".into(),
                }],
            },
            span_records: vec![LegacySpanRecord {
                trace_guid: "1".into(),
                span_guid: "2".into(),
                runtime_guid: "abc".into(),
                span_name: "op".into(),
                oldest_micros: 100,
                youngest_micros: 200,
                attributes: vec![],
                join_ids: vec![],
                log_records: vec![],
            }],
        };

        let encoded = request.encode();
        let decoded = LegacyReportRequest::decode(&encoded).unwrap();
        assert_eq!(decoded, request);
    }

    #[test]
    fn report_response_round_trips() {
        let response = LegacyReportResponse {
            commands: vec![LegacyCommand { disable: true }, LegacyCommand { disable: false }],
        };
        let encoded = response.encode();
        let decoded = LegacyReportResponse::decode(&encoded).unwrap();
        assert_eq!(decoded, response);
    }
}
