//! The tracer facade: wires a [`Recorder`] and a [`PropagatorRegistry`]
//! behind the narrow surface instrumented code calls. In-process
//! scope/context activation is a separate concern this type does not own —
//! it only owns recording and propagation.

use tracer_core::error::PropagationError;
use tracer_core::{ReporterIdentity, Span, SpanContext};
use tracer_propagators::carrier::TextMapCarrier;
use tracer_propagators::{Format, PropagatorRegistry};

use crate::connection::Connection;
use crate::converter::Converter;
use crate::recorder::Recorder;

/// A recorder plus a propagator registry, the one object instrumented code
/// holds for the lifetime of the process.
pub struct Tracer<C: Converter, Conn> {
    recorder: Recorder<C, Conn>,
    propagators: PropagatorRegistry,
}

impl<C, Conn> Tracer<C, Conn>
where
    C: Converter + Send + Sync + 'static,
    C::SpanRecord: Clone + Send + 'static,
    C::Report: Send + 'static,
    C::Auth: Send + Sync + 'static,
    Conn: Connection<Auth = C::Auth, Report = C::Report> + Send + Sync + 'static,
{
    /// Builds a tracer around an already-constructed recorder, with the
    /// default propagator registry (every built-in format registered).
    pub fn new(recorder: Recorder<C, Conn>) -> Self {
        Tracer {
            recorder,
            propagators: PropagatorRegistry::with_defaults(),
        }
    }

    /// Builds a tracer with a caller-supplied propagator registry, for
    /// tests or deployments that only need a subset of formats registered.
    pub fn with_propagators(recorder: Recorder<C, Conn>, propagators: PropagatorRegistry) -> Self {
        Tracer { recorder, propagators }
    }

    pub fn identity(&self) -> &ReporterIdentity {
        self.recorder.identity()
    }

    /// Admits a finished span. See [`Recorder::record`].
    pub fn record(&self, span: &Span) {
        self.recorder.record(span);
    }

    /// Synchronously drains the buffer. See [`Recorder::flush`].
    pub fn flush(&self) -> bool {
        self.recorder.flush()
    }

    /// Idempotent shutdown. See [`Recorder::shutdown`].
    pub fn shutdown(&self, flush: bool) -> bool {
        self.recorder.shutdown(flush)
    }

    /// Injects a span context into a text-map carrier under the given
    /// format. An unregistered format is a caller-visible error.
    pub fn inject_text_map(
        &self,
        format: Format,
        context: &SpanContext,
        carrier: &mut dyn TextMapCarrier,
    ) -> Result<(), PropagationError> {
        self.propagators.inject_text_map(format, context, carrier)
    }

    /// Extracts a span context from a text-map carrier under the given
    /// format.
    pub fn extract_text_map(
        &self,
        format: Format,
        carrier: &dyn TextMapCarrier,
    ) -> Result<SpanContext, PropagationError> {
        self.propagators.extract_text_map(format, carrier)
    }

    /// Injects a span context into a binary-envelope carrier.
    pub fn inject_binary(&self, format: Format, context: &SpanContext, carrier: &mut Vec<u8>) -> Result<(), PropagationError> {
        self.propagators.inject_binary(format, context, carrier)
    }

    /// Extracts a span context from a binary-envelope carrier.
    pub fn extract_binary(&self, format: Format, carrier: &Vec<u8>) -> Result<SpanContext, PropagationError> {
        self.propagators.extract_binary(format, carrier)
    }
}

/// A scope-guard whose `Drop` impl flushes the wrapped tracer on exit,
/// tying cleanup to value lifetime rather than an explicit shutdown call.
pub struct TracerGuard<'a, C: Converter, Conn>(&'a Tracer<C, Conn>)
where
    C: Send + Sync + 'static,
    C::SpanRecord: Clone + Send + 'static,
    C::Report: Send + 'static,
    C::Auth: Send + Sync + 'static,
    Conn: Connection<Auth = C::Auth, Report = C::Report> + Send + Sync + 'static;

impl<'a, C, Conn> TracerGuard<'a, C, Conn>
where
    C: Converter + Send + Sync + 'static,
    C::SpanRecord: Clone + Send + 'static,
    C::Report: Send + 'static,
    C::Auth: Send + Sync + 'static,
    Conn: Connection<Auth = C::Auth, Report = C::Report> + Send + Sync + 'static,
{
    pub fn new(tracer: &'a Tracer<C, Conn>) -> Self {
        TracerGuard(tracer)
    }
}

impl<'a, C, Conn> Drop for TracerGuard<'a, C, Conn>
where
    C: Converter + Send + Sync + 'static,
    C::SpanRecord: Clone + Send + 'static,
    C::Report: Send + 'static,
    C::Auth: Send + Sync + 'static,
    Conn: Connection<Auth = C::Auth, Report = C::Report> + Send + Sync + 'static,
{
    fn drop(&mut self) {
        self.0.flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::converter::proto::ProtoConverter;
    use crate::options::RecorderOptionsBuilder;
    use std::collections::BTreeMap;
    use std::sync::atomic::{AtomicBool, Ordering};
    use tracer_proto::{Auth, ReportRequest};
    use tracer_propagators::carrier::TextMapCarrierMap;

    #[derive(Default)]
    struct MockConnection {
        ready: AtomicBool,
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
        fn report(&self, _auth: &Auth, _report: &ReportRequest) -> Result<bool, crate::error::TransportError> {
            Ok(false)
        }
        fn close(&self) {
            self.ready.store(false, Ordering::Release);
        }
    }

    fn test_tracer() -> Tracer<ProtoConverter, MockConnection> {
        let options = RecorderOptionsBuilder::new("token")
            .with_periodic_flush(None)
            .build()
            .unwrap();
        let identity = ReporterIdentity::new(Some("svc".to_string()), BTreeMap::new());
        let recorder = Recorder::new(ProtoConverter, MockConnection::default(), options, identity);
        Tracer::new(recorder)
    }

    #[test]
    fn inject_dispatches_to_the_registered_format() {
        let tracer = test_tracer();
        let context = SpanContext::new(0xaef5705a09004083, 0xb341);
        let mut carrier = TextMapCarrierMap::new();

        tracer.inject_text_map(Format::B3Multi, &context, &mut carrier).unwrap();
        let extracted = tracer.extract_text_map(Format::B3Multi, &carrier).unwrap();
        assert_eq!(extracted.trace_id, context.trace_id);
    }

    #[test]
    fn unregistered_format_is_an_error() {
        let recorder = {
            let options = RecorderOptionsBuilder::new("token")
                .with_periodic_flush(None)
                .build()
                .unwrap();
            let identity = ReporterIdentity::new(Some("svc".to_string()), BTreeMap::new());
            Recorder::new(ProtoConverter, MockConnection::default(), options, identity)
        };
        let tracer = Tracer::with_propagators(recorder, PropagatorRegistry::empty());
        let context = SpanContext::new(1, 1);
        let mut carrier = TextMapCarrierMap::new();
        assert!(tracer.inject_text_map(Format::B3Multi, &context, &mut carrier).is_err());
    }

    #[test]
    fn guard_flushes_on_drop() {
        let tracer = test_tracer();
        tracer.record(&Span::new(SpanContext::new(1, 1), "op", 0));
        {
            let _guard = TracerGuard::new(&tracer);
        }
        // Flush happened inside the guard's Drop; a second explicit flush
        // on an already-empty buffer returns false.
        assert!(!tracer.flush());
    }
}
