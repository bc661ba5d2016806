//! The HTTP + protobuf connection variant.

use std::sync::Mutex;
use std::time::Duration;

use prost::Message as _;
use tracer_proto::{Auth, ReportRequest, ReportResponse};

use super::Connection;
use crate::error::TransportError;
use crate::options::CollectorEncryption;
use crate::url::{collector_url, PROTO_REPORT_PATH};

struct State {
    client: Option<reqwest::blocking::Client>,
}

/// Posts protobuf-encoded reports to `{scheme}://{host}:{port}/api/v2/reports`.
pub struct HttpConnection {
    url: String,
    timeout: Duration,
    certificate_verification: bool,
    state: Mutex<State>,
}

impl HttpConnection {
    pub fn new(
        host: &str,
        port: u16,
        encryption: CollectorEncryption,
        timeout: Duration,
        certificate_verification: bool,
    ) -> Self {
        HttpConnection {
            url: collector_url(host, port, encryption, PROTO_REPORT_PATH),
            timeout,
            certificate_verification,
            state: Mutex::new(State { client: None }),
        }
    }

    fn build_client(&self) -> reqwest::Result<reqwest::blocking::Client> {
        reqwest::blocking::Client::builder()
            .timeout(self.timeout)
            .danger_accept_invalid_certs(!self.certificate_verification)
            .build()
    }
}

impl Connection for HttpConnection {
    type Auth = Auth;
    type Report = ReportRequest;

    fn open(&self) -> bool {
        let mut state = self.state.lock().unwrap_or_else(|poison| poison.into_inner());
        match self.build_client() {
            Ok(client) => {
                state.client = Some(client);
                true
            }
            Err(err) => {
                #[cfg(feature = "internal-logs")]
                tracing::debug!(name: "http_connection_open_failed", target: "tracer_sdk", error = %err);
                state.client = None;
                false
            }
        }
    }

    fn is_ready(&self) -> bool {
        let state = self.state.lock().unwrap_or_else(|poison| poison.into_inner());
        state.client.is_some()
    }

    fn report(&self, auth: &Self::Auth, report: &Self::Report) -> Result<bool, TransportError> {
        let client = {
            let state = self.state.lock().unwrap_or_else(|poison| poison.into_inner());
            state.client.clone().ok_or(TransportError::NotReady)?
        };

        let mut outgoing = report.clone();
        outgoing.auth = Some(auth.clone());
        let body = outgoing.encode_to_vec();

        let response = client
            .post(&self.url)
            .header("Content-Type", "application/octet-stream")
            .header("Accept", "application/octet-stream")
            .header("Lightstep-Access-Token", auth.access_token.clone())
            .body(body)
            .send()
            .map_err(|err| TransportError::Request(err.to_string()))?;

        if !response.status().is_success() {
            return Err(TransportError::Request(format!(
                "collector returned status {}",
                response.status()
            )));
        }

        let bytes = response
            .bytes()
            .map_err(|err| TransportError::Request(err.to_string()))?;
        let decoded =
            ReportResponse::decode(bytes.as_ref()).map_err(|err| TransportError::Decode(err.to_string()))?;

        Ok(decoded.commands.iter().any(|command| command.disable))
    }

    fn close(&self) {
        let mut state = self.state.lock().unwrap_or_else(|poison| poison.into_inner());
        state.client = None;
    }
}
