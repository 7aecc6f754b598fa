//! Target validation and local network detection

use crate::{Result, ScanError};
use ipnetwork::Ipv4Network;
use log::{info, warn};
use pnet::datalink::{self, NetworkInterface};
use std::fmt;
use std::net::Ipv4Addr;
use std::str::FromStr;

/// Range used when no local network can be detected
pub const DEFAULT_LOCAL_RANGE: &str = "192.168.1.0/24";

/// A validated scan target: one IPv4 address or an IPv4 CIDR block
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetSpec {
    Address(Ipv4Addr),
    Range(Ipv4Network),
}

impl TargetSpec {
    /// Parse and validate user input before it reaches a subprocess
    pub fn parse(input: &str) -> Result<Self> {
        let input = input.trim();
        if input.is_empty() {
            return Err(ScanError::InvalidTarget("target cannot be empty".to_string()));
        }

        if input.contains('/') {
            let network = Ipv4Network::from_str(input)?;
            return Ok(TargetSpec::Range(network));
        }

        let address = Ipv4Addr::from_str(input)
            .map_err(|_| ScanError::InvalidTarget(format!("'{}' is not an IPv4 address or CIDR range", input)))?;
        Ok(TargetSpec::Address(address))
    }

    /// Parse input that must name exactly one address
    pub fn parse_address(input: &str) -> Result<Ipv4Addr> {
        match Self::parse(input)? {
            TargetSpec::Address(address) => Ok(address),
            TargetSpec::Range(network) => Err(ScanError::InvalidTarget(format!(
                "expected a single address, got range {}",
                network
            ))),
        }
    }

    /// Number of addresses covered
    pub fn size(&self) -> u64 {
        match self {
            TargetSpec::Address(_) => 1,
            TargetSpec::Range(network) => 1u64 << (32 - u32::from(network.prefix())),
        }
    }
}

impl fmt::Display for TargetSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TargetSpec::Address(address) => write!(f, "{}", address),
            TargetSpec::Range(network) => write!(f, "{}", network),
        }
    }
}

/// Best-guess `/24` of the first active LAN interface.
///
/// Never fails; falls back to [`DEFAULT_LOCAL_RANGE`].
pub fn detect_local_range() -> String {
    match local_range_from(&datalink::interfaces()) {
        Some(range) => {
            info!("Detected local network {}", range);
            range
        }
        None => {
            warn!("Could not detect local network, using {}", DEFAULT_LOCAL_RANGE);
            DEFAULT_LOCAL_RANGE.to_string()
        }
    }
}

fn local_range_from(interfaces: &[NetworkInterface]) -> Option<String> {
    interfaces
        .iter()
        .filter(|iface| iface.is_up() && !iface.is_loopback())
        .flat_map(|iface| iface.ips.iter())
        .find_map(|ip| match ip.ip() {
            std::net::IpAddr::V4(v4) if !v4.is_loopback() && !v4.is_link_local() => {
                Some(slash_24(v4))
            }
            _ => None,
        })
}

fn slash_24(address: Ipv4Addr) -> String {
    let [a, b, c, _] = address.octets();
    format!("{}.{}.{}.0/24", a, b, c)
}
