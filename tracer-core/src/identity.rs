//! `ReporterIdentity`: the immutable, process-wide descriptor attached to
//! every report.

use crate::clock::{generate_guid, id_to_hex_u64};
use std::collections::BTreeMap;
use std::env;

/// Tag key for the tracer's runtime platform (always `"rust"` here).
pub const TAG_TRACER_PLATFORM: &str = "lightstep.tracer_platform";
/// Tag key for the compiler/runtime version.
pub const TAG_TRACER_PLATFORM_VERSION: &str = "lightstep.tracer_platform_version";
/// Tag key for this crate's version.
pub const TAG_TRACER_VERSION: &str = "lightstep.tracer_version";
/// Tag key for the component (process) name.
pub const TAG_COMPONENT_NAME: &str = "lightstep.component_name";
/// Tag key for the reporter's GUID, hex-encoded.
pub const TAG_GUID: &str = "lightstep.guid";
/// Tag key for the observed hostname.
pub const TAG_HOSTNAME: &str = "hostname";

/// Immutable descriptor of the instrumented process, built once at recorder
/// construction and attached to every outgoing report.
#[derive(Clone, Debug)]
pub struct ReporterIdentity {
    pub guid: u64,
    pub component_name: String,
    pub tags: BTreeMap<String, String>,
}

impl ReporterIdentity {
    /// Builds a reporter identity, merging `caller_tags` under the six
    /// mandatory defaults (caller-supplied values for the same keys are
    /// overridden, matching the source's `tracer_tags.update({...})`
    /// last-write-wins merge order).
    pub fn new(component_name: Option<String>, caller_tags: BTreeMap<String, String>) -> Self {
        let guid = generate_guid();
        let component_name =
            component_name.unwrap_or_else(|| executable_name().unwrap_or_else(|| "unknown".to_string()));

        let mut tags = caller_tags;
        tags.insert(TAG_TRACER_PLATFORM.to_string(), "rust".to_string());
        tags.insert(
            TAG_TRACER_PLATFORM_VERSION.to_string(),
            rustc_version_hint().to_string(),
        );
        tags.insert(TAG_TRACER_VERSION.to_string(), env!("CARGO_PKG_VERSION").to_string());
        tags.insert(TAG_COMPONENT_NAME.to_string(), component_name.clone());
        tags.insert(TAG_GUID.to_string(), id_to_hex_u64(guid));
        tags.insert(TAG_HOSTNAME.to_string(), hostname().unwrap_or_else(|| "unknown".to_string()));

        ReporterIdentity {
            guid,
            component_name,
            tags,
        }
    }
}

fn executable_name() -> Option<String> {
    env::current_exe()
        .ok()
        .and_then(|path| path.file_name().map(|name| name.to_string_lossy().into_owned()))
}

fn rustc_version_hint() -> &'static str {
    option_env!("CARGO_PKG_RUST_VERSION").unwrap_or("unknown")
}

fn hostname() -> Option<String> {
    env::var("HOSTNAME")
        .ok()
        .filter(|h| !h.is_empty())
        .or_else(|| {
            // Fall back to the POSIX `uname -n` equivalent without pulling
            // in a platform crate: read what the OS itself exposes.
            std::fs::read_to_string("/etc/hostname")
                .ok()
                .map(|s| s.trim().to_string())
                .filter(|h| !h.is_empty())
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_tag_count_is_six() {
        let identity = ReporterIdentity::new(Some("svc".to_string()), BTreeMap::new());
        assert_eq!(identity.tags.len(), 6);
    }

    #[test]
    fn caller_tags_are_merged_but_defaults_win_on_conflict() {
        let mut caller_tags = BTreeMap::new();
        caller_tags.insert("env".to_string(), "prod".to_string());
        caller_tags.insert(TAG_COMPONENT_NAME.to_string(), "caller-supplied".to_string());

        let identity = ReporterIdentity::new(Some("svc".to_string()), caller_tags);
        assert_eq!(identity.tags.get("env").map(String::as_str), Some("prod"));
        assert_eq!(identity.tags.get(TAG_COMPONENT_NAME).map(String::as_str), Some("svc"));
        assert_eq!(identity.tags.len(), 7);
    }
}
