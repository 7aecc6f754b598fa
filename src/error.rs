//! Error handling for hostsweep
//!
//! Two layers: [`ExecutorError`] describes why one invocation of the external
//! scanning tool failed, [`ScanError`] is what library operations return.
//! Per-host failures inside a batch never surface here; they are folded into
//! the result as placeholder hosts by the scanner.

use std::time::Duration;
use thiserror::Error;

/// Substrings that identify "the tool is not installed" in captured output.
///
/// Covers POSIX shells, `cmd.exe` in English and Spanish locales, and the
/// loader message printed when the binary path itself is stale.
pub const TOOL_MISSING_MARKERS: &[&str] = &[
    "no se reconoce",
    "not recognized",
    "command not found",
    "No such file",
];

/// Failure of a single scan tool invocation
#[derive(Debug, Error)]
pub enum ExecutorError {
    #[error("{tool} is not installed or not on PATH. Install it from https://nmap.org/download.html and restart your terminal")]
    ToolMissing { tool: String },

    #[error("scan tool exited with status {}: {output_tail}", exit_code_display(.code))]
    ExitStatus {
        code: Option<i32>,
        output_tail: String,
    },

    #[error("failed to start scan tool: {0}")]
    Spawn(#[source] std::io::Error),

    #[error("scan tool did not finish within {0:?}")]
    Timeout(Duration),

    #[error("scan was cancelled")]
    Cancelled,
}

fn exit_code_display(code: &Option<i32>) -> String {
    match code {
        Some(code) => code.to_string(),
        None => "signal".to_string(),
    }
}

impl ExecutorError {
    /// Classify a non-zero exit using the captured text.
    pub fn from_exit(tool: &str, code: Option<i32>, lines: &[String]) -> Self {
        if output_indicates_missing_tool(lines) {
            return ExecutorError::ToolMissing {
                tool: tool.to_string(),
            };
        }

        let output_tail = lines
            .iter()
            .rev()
            .find(|line| !line.trim().is_empty())
            .map(|line| line.trim().to_string())
            .unwrap_or_default();

        ExecutorError::ExitStatus { code, output_tail }
    }

    /// Classify a spawn failure; `NotFound` means the binary does not exist.
    pub fn from_spawn(tool: &str, err: std::io::Error) -> Self {
        if err.kind() == std::io::ErrorKind::NotFound {
            ExecutorError::ToolMissing {
                tool: tool.to_string(),
            }
        } else {
            ExecutorError::Spawn(err)
        }
    }

    pub fn is_tool_missing(&self) -> bool {
        matches!(self, ExecutorError::ToolMissing { .. })
    }

    /// Timeouts and cancellations are both "the unit ran out of time".
    pub fn is_interrupted(&self) -> bool {
        matches!(self, ExecutorError::Timeout(_) | ExecutorError::Cancelled)
    }
}

/// True when any captured line carries a known "command not found" marker.
pub fn output_indicates_missing_tool(lines: &[String]) -> bool {
    lines.iter().any(|line| {
        TOOL_MISSING_MARKERS
            .iter()
            .any(|marker| line.contains(marker))
    })
}

/// Main error type for scanning operations
#[derive(Debug, Error)]
pub enum ScanError {
    #[error(transparent)]
    Executor(#[from] ExecutorError),

    #[error("Invalid target: {0}")]
    InvalidTarget(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("scanner has been shut down")]
    ShutDown,
}

impl ScanError {
    pub fn is_tool_missing(&self) -> bool {
        matches!(self, ScanError::Executor(e) if e.is_tool_missing())
    }
}

impl From<ipnetwork::IpNetworkError> for ScanError {
    fn from(err: ipnetwork::IpNetworkError) -> Self {
        ScanError::InvalidTarget(err.to_string())
    }
}

impl From<std::net::AddrParseError> for ScanError {
    fn from(err: std::net::AddrParseError) -> Self {
        ScanError::InvalidTarget(err.to_string())
    }
}
