//! The HTTP + legacy binary connection variant.
//!
//! Identical transport (HTTP, same headers) to [`super::HttpConnection`],
//! differing in collector path and wire encoding, plus a
//! consecutive-error-before-reconnect counter this variant alone tracks.

use std::sync::Mutex;
use std::time::Duration;

use tracer_proto::{LegacyAuth, LegacyReportRequest, LegacyReportResponse};

use super::Connection;
use crate::error::TransportError;
use crate::options::{CollectorEncryption, CONSECUTIVE_ERRORS_BEFORE_RECONNECT};
use crate::url::{collector_url, LEGACY_BINARY_REPORT_PATH};

struct State {
    client: Option<reqwest::blocking::Client>,
    consecutive_errors: u32,
}

pub struct LegacyBinaryConnection {
    url: String,
    timeout: Duration,
    certificate_verification: bool,
    state: Mutex<State>,
}

impl LegacyBinaryConnection {
    pub fn new(
        host: &str,
        port: u16,
        encryption: CollectorEncryption,
        timeout: Duration,
        certificate_verification: bool,
    ) -> Self {
        LegacyBinaryConnection {
            url: collector_url(host, port, encryption, LEGACY_BINARY_REPORT_PATH),
            timeout,
            certificate_verification,
            state: Mutex::new(State {
                client: None,
                consecutive_errors: 0,
            }),
        }
    }

    fn build_client(&self) -> reqwest::Result<reqwest::blocking::Client> {
        reqwest::blocking::Client::builder()
            .timeout(self.timeout)
            .danger_accept_invalid_certs(!self.certificate_verification)
            .build()
    }
}

impl Connection for LegacyBinaryConnection {
    type Auth = LegacyAuth;
    type Report = LegacyReportRequest;

    fn open(&self) -> bool {
        let mut state = self.state.lock().unwrap_or_else(|poison| poison.into_inner());
        match self.build_client() {
            Ok(client) => {
                state.client = Some(client);
                state.consecutive_errors = 0;
                true
            }
            Err(_) => {
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

        let result = self.do_report(&client, auth, report);

        let mut state = self.state.lock().unwrap_or_else(|poison| poison.into_inner());
        match &result {
            Ok(_) => state.consecutive_errors = 0,
            Err(_) => {
                state.consecutive_errors += 1;
                if state.consecutive_errors >= CONSECUTIVE_ERRORS_BEFORE_RECONNECT {
                    #[cfg(feature = "internal-logs")]
                    tracing::debug!(
                        name: "legacy_binary_connection_unrecoverable",
                        target: "tracer_sdk",
                        consecutive_errors = state.consecutive_errors,
                    );
                    state.client = None;
                    state.consecutive_errors = 0;
                }
            }
        }
        result
    }

    fn close(&self) {
        let mut state = self.state.lock().unwrap_or_else(|poison| poison.into_inner());
        state.client = None;
        state.consecutive_errors = 0;
    }
}

impl LegacyBinaryConnection {
    fn do_report(
        &self,
        client: &reqwest::blocking::Client,
        auth: &LegacyAuth,
        report: &LegacyReportRequest,
    ) -> Result<bool, TransportError> {
        let body = report.encode();

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
            LegacyReportResponse::decode(&bytes).map_err(|err| TransportError::Decode(err.to_string()))?;

        Ok(decoded.commands.iter().any(|command| command.disable))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derives_the_legacy_collector_url() {
        let connection = LegacyBinaryConnection::new(
            "collector.lightstep.com",
            443,
            CollectorEncryption::Tls,
            Duration::from_secs(30),
            true,
        );
        assert_eq!(
            connection.url,
            "https://collector.lightstep.com:443/_rpc/v1/reports/binary"
        );
    }

    #[test]
    fn forces_not_ready_after_too_many_consecutive_errors() {
        let connection = LegacyBinaryConnection::new(
            "127.0.0.1",
            1,
            CollectorEncryption::None,
            Duration::from_millis(50),
            true,
        );
        assert!(connection.open());

        let auth = LegacyAuth {
            access_token: "token".to_string(),
        };
        let report = LegacyReportRequest::default();

        for _ in 0..CONSECUTIVE_ERRORS_BEFORE_RECONNECT {
            let _ = connection.report(&auth, &report);
        }

        assert!(!connection.is_ready());
    }
}
