//! Internal transport error type.
//!
//! Every variant here is recovered inside the recorder (batch restore,
//! `flush` returning `false`) rather than surfaced to callers. This type
//! exists only so `Connection::report` has something concrete to return up
//! to the flush worker, which converts every variant into the same
//! "restore and move on" handling.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("connection is not open")]
    NotReady,
    #[error("request failed: {0}")]
    Request(String),
    #[error("response could not be decoded: {0}")]
    Decode(String),
}
