//! String coercion and error-to-string helpers used when building wire
//! records out of caller-supplied tag/log values.

use std::fmt::Display;

/// Coerces an arbitrary displayable value to a UTF-8 string. Never panics or
/// errors: values that can't be displayed cleanly are already impossible in
/// Rust's type system (everything here is `Display`), so this mostly exists
/// as the single chokepoint the converter calls through, matching the
/// source's `_coerce_str`.
pub fn coerce_str(value: impl Display) -> String {
    value.to_string()
}

/// The reserved log field name for an error's type name.
pub const ERROR_KIND_FIELD: &str = "error.kind";
/// The reserved log field name for a formatted stack trace.
pub const STACK_FIELD: &str = "stack";
/// The reserved log field name for a stringified error object.
pub const ERROR_OBJECT_FIELD: &str = "error.object";

/// Returns the simple type name of an error, for populating the
/// `error.kind` log field. Falls back to `"unknown"` only if `type_name`
/// ever returns an empty string, which it does not in practice.
pub fn error_kind_of<E: ?Sized>() -> &'static str {
    let full = std::any::type_name::<E>();
    full.rsplit("::").next().unwrap_or(full)
}

/// Formats a backtrace for the `stack` log field. Produces a multi-line
/// string when the backtrace was actually captured, otherwise a one-line
/// placeholder (backtraces are opt-in via `RUST_BACKTRACE`).
pub fn format_backtrace(backtrace: &std::backtrace::Backtrace) -> String {
    match backtrace.status() {
        std::backtrace::BacktraceStatus::Captured => backtrace.to_string(),
        _ => "<backtrace not captured>".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coerce_str_handles_common_types() {
        assert_eq!(coerce_str(42), "42");
        assert_eq!(coerce_str("hi"), "hi");
        assert_eq!(coerce_str(true), "true");
        assert_eq!(coerce_str(1.5), "1.5");
    }

    #[test]
    fn error_kind_of_strips_module_path() {
        struct MyError;
        assert!(error_kind_of::<MyError>().ends_with("MyError"));
        assert!(!error_kind_of::<MyError>().contains("::"));
    }
}
