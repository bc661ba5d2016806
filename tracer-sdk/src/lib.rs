//! The recorder, converters, connections, and tracer facade that ship
//! buffered spans to a collector.
//!
//! `tracer-core` defines the data model this crate converts and buffers;
//! `tracer-propagators` is the separate context-propagation suite the
//! [`tracer::Tracer`] facade wires in alongside the recorder.

pub mod connection;
pub mod converter;
pub mod error;
pub mod options;
pub mod recorder;
pub mod tracer;
pub mod url;

pub use error::TransportError;
pub use options::{CollectorEncryption, RecorderOptions, RecorderOptionsBuilder, Transport};
pub use recorder::Recorder;
pub use tracer::{Tracer, TracerGuard};
