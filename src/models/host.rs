//! Discovered network endpoint

use super::Port;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Liveness of a host
///
/// `Error` marks a host that discovery confirmed but whose detailed scan
/// failed or ran out of time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HostStatus {
    Up,
    Down,
    Unknown,
    Error,
}

impl fmt::Display for HostStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            HostStatus::Up => "up",
            HostStatus::Down => "down",
            HostStatus::Unknown => "unknown",
            HostStatus::Error => "error",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Host {
    #[serde(rename = "ipAddress")]
    pub address: String,
    #[serde(rename = "macAddress", default)]
    pub hardware_address: Option<String>,
    #[serde(default)]
    pub hostname: Option<String>,
    pub status: HostStatus,
    #[serde(rename = "operatingSystem", default)]
    pub operating_system: Option<String>,
    #[serde(default)]
    pub vendor: Option<String>,
    #[serde(rename = "responseTime", default)]
    pub response_time_ms: Option<u64>,
    /// Open ports only, in the order the tool reported them
    #[serde(rename = "openPorts", default)]
    pub ports: Vec<Port>,
}

impl Host {
    pub fn new(address: impl Into<String>, status: HostStatus) -> Self {
        Self {
            address: address.into(),
            hardware_address: None,
            hostname: None,
            status,
            operating_system: None,
            vendor: None,
            response_time_ms: None,
            ports: Vec::new(),
        }
    }

    /// Stand-in for a host whose detailed scan did not produce a record
    pub fn placeholder(address: impl Into<String>) -> Self {
        Self::new(address, HostStatus::Error)
    }

    pub fn with_hostname(mut self, hostname: Option<String>) -> Self {
        self.hostname = hostname;
        self
    }

    pub fn with_hardware(mut self, hardware_address: impl Into<String>, vendor: impl Into<String>) -> Self {
        self.hardware_address = Some(hardware_address.into());
        self.vendor = Some(vendor.into());
        self
    }

    pub fn is_up(&self) -> bool {
        self.status == HostStatus::Up
    }

    pub fn open_port_numbers(&self) -> Vec<u16> {
        self.ports.iter().map(|p| p.number).collect()
    }
}
