//! Recorder configuration: an immutable [`RecorderOptions`] built only
//! through [`RecorderOptionsBuilder`], which validates at construction
//! time instead of letting an invalid value surface later as a runtime
//! failure.

use std::collections::BTreeMap;
use std::time::Duration;

use tracer_core::ConfigError;

/// Default collector hostname.
pub const DEFAULT_COLLECTOR_HOST: &str = "collector.lightstep.com";
/// Default collector TCP port.
pub const DEFAULT_COLLECTOR_PORT: u16 = 443;
/// Default buffer cap.
pub const DEFAULT_MAX_SPAN_RECORDS: usize = 1000;
/// Default background flush cadence.
pub const DEFAULT_PERIODIC_FLUSH: Duration = Duration::from_millis(2_500);
/// Default per-HTTP-call timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
/// The name given to the background flush thread.
pub const FLUSH_THREAD_NAME: &str = "Flush Thread";
/// Consecutive transport failures before the legacy binary connection
/// forces itself not-ready.
pub const CONSECUTIVE_ERRORS_BEFORE_RECONNECT: u32 = 200;

/// Whether the collector connection runs over TLS.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CollectorEncryption {
    Tls,
    None,
}

/// Which wire transport a recorder uses.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Transport {
    Http,
    LegacyBinary,
}

/// Immutable recorder configuration, constructed only via
/// [`RecorderOptionsBuilder::build`].
#[derive(Clone, Debug)]
pub struct RecorderOptions {
    pub component_name: Option<String>,
    pub access_token: String,
    pub collector_host: String,
    pub collector_port: u16,
    pub collector_encryption: CollectorEncryption,
    pub tags: BTreeMap<String, String>,
    pub max_span_records: usize,
    pub periodic_flush: Option<Duration>,
    pub certificate_verification: bool,
    pub transport: Transport,
    pub timeout: Duration,
}

impl RecorderOptions {
    pub fn builder(access_token: impl Into<String>) -> RecorderOptionsBuilder {
        RecorderOptionsBuilder::new(access_token)
    }
}

/// Builder for [`RecorderOptions`]. `access_token` is required up front;
/// everything else has a documented default.
#[derive(Clone, Debug)]
pub struct RecorderOptionsBuilder {
    component_name: Option<String>,
    access_token: String,
    collector_host: String,
    collector_port: u16,
    collector_encryption: CollectorEncryption,
    tags: BTreeMap<String, String>,
    max_span_records: usize,
    periodic_flush: Option<Duration>,
    certificate_verification: bool,
    transport: Transport,
    timeout: Duration,
}

impl RecorderOptionsBuilder {
    pub fn new(access_token: impl Into<String>) -> Self {
        RecorderOptionsBuilder {
            component_name: None,
            access_token: access_token.into(),
            collector_host: DEFAULT_COLLECTOR_HOST.to_string(),
            collector_port: DEFAULT_COLLECTOR_PORT,
            collector_encryption: CollectorEncryption::Tls,
            tags: BTreeMap::new(),
            max_span_records: DEFAULT_MAX_SPAN_RECORDS,
            periodic_flush: Some(DEFAULT_PERIODIC_FLUSH),
            certificate_verification: true,
            transport: Transport::Http,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_component_name(mut self, component_name: impl Into<String>) -> Self {
        self.component_name = Some(component_name.into());
        self
    }

    pub fn with_collector_host(mut self, host: impl Into<String>) -> Self {
        self.collector_host = host.into();
        self
    }

    pub fn with_collector_port(mut self, port: u16) -> Self {
        self.collector_port = port;
        self
    }

    pub fn with_collector_encryption(mut self, encryption: CollectorEncryption) -> Self {
        self.collector_encryption = encryption;
        self
    }

    pub fn with_tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.insert(key.into(), value.into());
        self
    }

    pub fn with_max_span_records(mut self, cap: usize) -> Self {
        self.max_span_records = cap;
        self
    }

    /// `None`, or a zero duration, disables the background flusher: no
    /// thread is started, and spans only ship on an explicit `flush`.
    pub fn with_periodic_flush(mut self, period: Option<Duration>) -> Self {
        self.periodic_flush = period.filter(|d| !d.is_zero());
        self
    }

    pub fn with_certificate_verification(mut self, enabled: bool) -> Self {
        self.certificate_verification = enabled;
        self
    }

    pub fn with_transport(mut self, transport: Transport) -> Self {
        self.transport = transport;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Builds the immutable options, enforcing construction-time checks
    /// (non-empty access token, non-zero buffer cap).
    pub fn build(self) -> Result<RecorderOptions, ConfigError> {
        if self.access_token.is_empty() {
            return Err(ConfigError::MissingAccessToken);
        }
        if self.max_span_records == 0 {
            return Err(ConfigError::InvalidBufferCap);
        }

        Ok(RecorderOptions {
            component_name: self.component_name,
            access_token: self.access_token,
            collector_host: self.collector_host,
            collector_port: self.collector_port,
            collector_encryption: self.collector_encryption,
            tags: self.tags,
            max_span_records: self.max_span_records,
            periodic_flush: self.periodic_flush,
            certificate_verification: self.certificate_verification,
            transport: self.transport,
            timeout: self.timeout,
        })
    }
}
