//! Collector URL derivation.

use crate::options::CollectorEncryption;

/// The protobuf variant's collector path.
pub const PROTO_REPORT_PATH: &str = "/api/v2/reports";
/// The legacy binary variant's collector path.
pub const LEGACY_BINARY_REPORT_PATH: &str = "/_rpc/v1/reports/binary";

/// Builds `scheme://host:port/path`, where scheme follows
/// `collector_encryption` (`None` → http, otherwise https).
pub fn collector_url(host: &str, port: u16, encryption: CollectorEncryption, path: &str) -> String {
    let scheme = match encryption {
        CollectorEncryption::Tls => "https",
        CollectorEncryption::None => "http",
    };
    format!("{scheme}://{host}:{port}{path}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tls_uses_https_scheme() {
        let url = collector_url("collector.lightstep.com", 443, CollectorEncryption::Tls, PROTO_REPORT_PATH);
        assert_eq!(url, "https://collector.lightstep.com:443/api/v2/reports");
    }

    #[test]
    fn none_uses_http_scheme() {
        let url = collector_url("localhost", 8080, CollectorEncryption::None, LEGACY_BINARY_REPORT_PATH);
        assert_eq!(url, "http://localhost:8080/_rpc/v1/reports/binary");
    }
}
