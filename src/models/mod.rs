//! Data model shared by the parser, the scanner and the output layer
//!
//! Serialized field names follow the JSON boundary consumed by the HTTP
//! layer (`ipAddress`, `openPorts`, `networkRange`, ...), so a result
//! written with [`crate::output::to_json`] parses back into the same value.

pub mod host;
pub mod port;
pub mod scan_result;

pub use host::{Host, HostStatus};
pub use port::{Port, PortState, Transport};
pub use scan_result::{ScanOutcome, ScanResult, ScanRun};
