//! The bounded span recorder: admission under a single mutex, a
//! lazily-started background flusher, restore-on-failure, and idempotent
//! shutdown.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use tracer_core::{ReporterIdentity, Span};

use crate::connection::Connection;
use crate::converter::Converter;
use crate::options::{RecorderOptions, FLUSH_THREAD_NAME};

struct RecorderInner<C: Converter, Conn> {
    converter: C,
    connection: Conn,
    options: RecorderOptions,
    identity: ReporterIdentity,
    buffer: Mutex<VecDeque<C::SpanRecord>>,
    disabled: AtomicBool,
    started: AtomicBool,
    drop_count: AtomicU64,
    flush_thread: Mutex<Option<thread::JoinHandle<()>>>,
}

/// The bounded, thread-safe span buffer plus background flusher.
///
/// Generic over the converter and connection so the same admission/flush
/// machinery backs both the protobuf and legacy binary transports.
pub struct Recorder<C: Converter, Conn> {
    inner: Arc<RecorderInner<C, Conn>>,
}

impl<C, Conn> Clone for Recorder<C, Conn>
where
    C: Converter,
{
    fn clone(&self) -> Self {
        Recorder {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<C, Conn> Recorder<C, Conn>
where
    C: Converter + Send + Sync + 'static,
    C::SpanRecord: Clone + Send + 'static,
    C::Report: Send + 'static,
    C::Auth: Send + Sync + 'static,
    Conn: Connection<Auth = C::Auth, Report = C::Report> + Send + Sync + 'static,
{
    /// Constructs a recorder. Pure: no thread, no socket — those are
    /// created lazily on the first `record` call, so the recorder stays
    /// fork-safe to construct ahead of a process fork.
    pub fn new(converter: C, connection: Conn, options: RecorderOptions, identity: ReporterIdentity) -> Self {
        Recorder {
            inner: Arc::new(RecorderInner {
                converter,
                connection,
                options,
                identity,
                buffer: Mutex::new(VecDeque::new()),
                disabled: AtomicBool::new(false),
                started: AtomicBool::new(false),
                drop_count: AtomicU64::new(0),
                flush_thread: Mutex::new(None),
            }),
        }
    }

    /// Number of spans dropped on admission because the buffer was full.
    /// Observable only via this counter — never surfaced as an error.
    pub fn drop_count(&self) -> u64 {
        self.inner.drop_count.load(Ordering::Relaxed)
    }

    /// The process-wide reporter identity attached to every report.
    pub fn identity(&self) -> &ReporterIdentity {
        &self.inner.identity
    }

    /// Admits a span. Fails silently after shutdown. The buffer size check
    /// runs twice, bracketing the conversion: a full buffer never pays the
    /// conversion cost, yet no span is admitted beyond the cap.
    pub fn record(&self, span: &Span) {
        if self.inner.disabled.load(Ordering::Acquire) {
            return;
        }
        self.ensure_started();

        {
            let buffer = self.inner.buffer.lock().unwrap_or_else(|poison| poison.into_inner());
            if buffer.len() >= self.inner.options.max_span_records {
                self.inner.drop_count.fetch_add(1, Ordering::Relaxed);
                return;
            }
        }

        let record = self.inner.converter.convert_span(span, self.inner.identity.guid);

        let mut buffer = self.inner.buffer.lock().unwrap_or_else(|poison| poison.into_inner());
        if buffer.len() >= self.inner.options.max_span_records {
            self.inner.drop_count.fetch_add(1, Ordering::Relaxed);
            return;
        }
        buffer.push_back(record);
    }

    /// Synchronously drains the current buffer. Returns `true` iff at
    /// least one record was transmitted in a successful report.
    pub fn flush(&self) -> bool {
        if self.inner.disabled.load(Ordering::Acquire) {
            return false;
        }
        Self::flush_worker(&self.inner)
    }

    /// Idempotent. First call optionally flushes, closes the connection,
    /// and marks the recorder disabled; subsequent calls are no-ops.
    pub fn shutdown(&self, flush: bool) -> bool {
        if self.inner.disabled.swap(true, Ordering::AcqRel) {
            return false;
        }

        let result = if flush { Self::flush_worker(&self.inner) } else { false };
        self.inner.connection.close();

        if let Some(handle) = self.inner.flush_thread.lock().unwrap_or_else(|p| p.into_inner()).take() {
            let _ = handle.join();
        }

        result
    }

    fn ensure_started(&self) {
        if self.inner.started.swap(true, Ordering::AcqRel) {
            return;
        }

        match self.inner.options.periodic_flush {
            Some(period) => {
                let inner = Arc::clone(&self.inner);
                let handle = thread::Builder::new()
                    .name(FLUSH_THREAD_NAME.to_string())
                    .spawn(move || Self::background_loop(inner, period))
                    .expect("failed to spawn background flush thread");
                *self.inner.flush_thread.lock().unwrap_or_else(|p| p.into_inner()) = Some(handle);
            }
            None => {
                #[cfg(feature = "internal-logs")]
                tracing::warn!(
                    name: "periodic_flush_disabled",
                    target: "tracer_sdk",
                    "periodic_flush_seconds <= 0: background flusher not started, flush() must be called explicitly"
                );
            }
        }
    }

    fn background_loop(inner: Arc<RecorderInner<C, Conn>>, period: Duration) {
        loop {
            if inner.disabled.load(Ordering::Acquire) {
                break;
            }
            if !inner.connection.is_ready() {
                thread::sleep(period);
                inner.connection.open();
            } else {
                Self::flush_worker(&inner);
                thread::sleep(period);
            }
        }
    }

    /// Drains the buffer, ships it, and restores on failure. Shared by
    /// `flush()`, `shutdown`, and the background loop.
    fn flush_worker(inner: &Arc<RecorderInner<C, Conn>>) -> bool {
        if !inner.connection.is_ready() && !inner.connection.open() {
            return false;
        }

        let batch: Vec<C::SpanRecord> = {
            let mut buffer = inner.buffer.lock().unwrap_or_else(|poison| poison.into_inner());
            std::mem::take(&mut *buffer).into_iter().collect()
        };

        if batch.is_empty() {
            return false;
        }

        let auth = inner.converter.create_auth(&inner.options.access_token);
        let runtime = inner
            .converter
            .create_runtime(&inner.identity.component_name, &inner.identity.tags, inner.identity.guid);
        let report = inner.converter.create_report(runtime, batch.clone());

        match inner.connection.report(&auth, &report) {
            Ok(should_disable) => {
                if should_disable {
                    #[cfg(feature = "internal-logs")]
                    tracing::debug!(name: "remote_disable_received", target: "tracer_sdk");
                    inner.disabled.store(true, Ordering::Release);
                    inner.connection.close();
                }
                true
            }
            Err(_err) => {
                #[cfg(feature = "internal-logs")]
                tracing::debug!(name: "report_failed", target: "tracer_sdk", error = %_err);
                Self::restore(inner, batch);
                false
            }
        }
    }

    /// Restores a failed batch into the buffer, preserving the cap by
    /// keeping the newest records. Never restores into a disabled recorder.
    fn restore(inner: &Arc<RecorderInner<C, Conn>>, mut failed_batch: Vec<C::SpanRecord>) {
        if inner.disabled.load(Ordering::Acquire) {
            return;
        }

        let mut buffer = inner.buffer.lock().unwrap_or_else(|poison| poison.into_inner());
        failed_batch.extend(buffer.drain(..));

        let cap = inner.options.max_span_records;
        let start = failed_batch.len().saturating_sub(cap);
        *buffer = failed_batch.split_off(start).into();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::converter::proto::ProtoConverter;
    use crate::options::RecorderOptionsBuilder;
    use std::collections::BTreeMap;
    use std::sync::Mutex as StdMutex;
    use tracer_core::SpanContext;
    use tracer_proto::{Auth, ReportRequest};

    #[derive(Default)]
    struct MockConnection {
        ready: AtomicBool,
        fail_next: AtomicBool,
        reports: StdMutex<Vec<ReportRequest>>,
        next_disable: AtomicBool,
    }

    impl Connection for MockConnection {
        type Auth = Auth;
        type Report = ReportRequest;

        fn open(&self) -> bool {
            self.ready.store(true, Ordering::Release);
            true
        }

        fn is_ready(&self) -> bool {
            self.ready.load(Ordering::Acquire)
        }

        fn report(&self, _auth: &Auth, report: &ReportRequest) -> Result<bool, crate::error::TransportError> {
            if self.fail_next.swap(false, Ordering::AcqRel) {
                return Err(crate::error::TransportError::Request("mock failure".to_string()));
            }
            self.reports.lock().unwrap().push(report.clone());
            Ok(self.next_disable.load(Ordering::Acquire))
        }

        fn close(&self) {
            self.ready.store(false, Ordering::Release);
        }
    }

    fn test_span(id: u64) -> Span {
        Span::new(SpanContext::new(1, id), "op", 100)
    }

    fn no_background_options() -> RecorderOptions {
        RecorderOptionsBuilder::new("token")
            .with_max_span_records(3)
            .with_periodic_flush(None)
            .build()
            .unwrap()
    }

    fn identity() -> ReporterIdentity {
        ReporterIdentity::new(Some("svc".to_string()), BTreeMap::new())
    }

    #[test]
    fn buffer_overflow_drops_new_spans_and_keeps_oldest() {
        let connection = MockConnection::default();
        let recorder = Recorder::new(ProtoConverter, connection, no_background_options(), identity());

        for id in 1..=4 {
            recorder.record(&test_span(id));
        }

        assert_eq!(recorder.drop_count(), 1);
        let buffer = recorder.inner.buffer.lock().unwrap();
        assert_eq!(buffer.len(), 3);
    }

    #[test]
    fn restore_on_failure_keeps_newest_records_within_cap() {
        let connection = MockConnection::default();
        connection.ready.store(true, Ordering::Release);
        connection.fail_next.store(true, Ordering::Release);
        let recorder = Recorder::new(ProtoConverter, connection, no_background_options(), identity());

        recorder.record(&test_span(1));
        recorder.record(&test_span(2));
        recorder.record(&test_span(3));
        assert!(!recorder.flush()); // fails, batch restored

        recorder.record(&test_span(4));
        recorder.record(&test_span(5));

        let buffer = recorder.inner.buffer.lock().unwrap();
        assert_eq!(buffer.len(), 3);
        let names: Vec<u64> = buffer
            .iter()
            .map(|r| r.span_context.as_ref().unwrap().span_id)
            .collect();
        assert_eq!(names, vec![3, 4, 5]);
    }

    #[test]
    fn successful_flush_empties_the_buffer() {
        let connection = MockConnection::default();
        connection.ready.store(true, Ordering::Release);
        let recorder = Recorder::new(ProtoConverter, connection, no_background_options(), identity());

        recorder.record(&test_span(1));
        assert!(recorder.flush());
        let buffer = recorder.inner.buffer.lock().unwrap();
        assert!(buffer.is_empty());
    }

    #[test]
    fn flush_on_empty_buffer_returns_false() {
        let connection = MockConnection::default();
        connection.ready.store(true, Ordering::Release);
        let recorder = Recorder::new(ProtoConverter, connection, no_background_options(), identity());
        assert!(!recorder.flush());
    }

    #[test]
    fn shutdown_is_idempotent() {
        let connection = MockConnection::default();
        connection.ready.store(true, Ordering::Release);
        let recorder = Recorder::new(ProtoConverter, connection, no_background_options(), identity());

        recorder.record(&test_span(1));
        assert!(recorder.shutdown(true));
        assert!(!recorder.shutdown(true));
        assert!(!recorder.shutdown(false));
    }

    #[test]
    fn no_record_is_admitted_after_shutdown() {
        let connection = MockConnection::default();
        connection.ready.store(true, Ordering::Release);
        let recorder = Recorder::new(ProtoConverter, connection, no_background_options(), identity());

        recorder.shutdown(false);
        recorder.record(&test_span(1));
        let buffer = recorder.inner.buffer.lock().unwrap();
        assert!(buffer.is_empty());
    }

    #[test]
    fn remote_disable_command_stops_future_admission() {
        let connection = MockConnection::default();
        connection.ready.store(true, Ordering::Release);
        connection.next_disable.store(true, Ordering::Release);
        let recorder = Recorder::new(ProtoConverter, connection, no_background_options(), identity());

        recorder.record(&test_span(1));
        assert!(recorder.flush());

        recorder.record(&test_span(2));
        let buffer = recorder.inner.buffer.lock().unwrap();
        assert!(buffer.is_empty());
        assert!(!recorder.flush());
    }
}
