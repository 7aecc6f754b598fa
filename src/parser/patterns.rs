//! Line recognizers for nmap's normal (human-readable) output
//!
//! Each recognizer looks at one line in isolation and returns a typed match
//! or `None`. Nothing here keeps state across lines.

use crate::models::{Port, PortState, Transport};
use once_cell::sync::Lazy;
use regex::Regex;
use std::net::Ipv4Addr;

static HOST_ANNOUNCEMENT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"Nmap scan report for (?:([\w.-]+) )?\(?(\d{1,3}\.\d{1,3}\.\d{1,3}\.\d{1,3})(?:\)|\s*$)").unwrap()
});

static HARDWARE_ADDRESS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"MAC Address: ([0-9A-Fa-f:]+) \(([^)]+)\)").unwrap());

static HOST_UP: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"Host is up(?: \((\d+(?:\.\d+)?)s latency\))?").unwrap());

static OPERATING_SYSTEM: Lazy<Regex> = Lazy::new(|| Regex::new(r"OS details: (.+)").unwrap());

static PORT_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*(\d+)/(tcp|udp)\s+(open|closed|filtered)\s+(\S+)(?:\s+(.+))?").unwrap()
});

/// `Nmap scan report for [hostname ](address)`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Announcement<'a> {
    pub address: &'a str,
    pub hostname: Option<&'a str>,
}

/// `MAC Address: <hw> (<vendor>)`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HardwareLine<'a> {
    pub hardware_address: &'a str,
    pub vendor: &'a str,
}

/// `Host is up[ (<secs>s latency)]`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HostUp {
    pub latency_ms: Option<u64>,
}

pub fn announcement(line: &str) -> Option<Announcement<'_>> {
    let caps = HOST_ANNOUNCEMENT.captures(line)?;
    let address = caps.get(2)?.as_str();

    // The pattern accepts any four 1-3 digit groups; reject 300.1.1.1 and friends.
    address.parse::<Ipv4Addr>().ok()?;

    let hostname = caps
        .get(1)
        .map(|m| m.as_str())
        .filter(|name| !name.is_empty());

    Some(Announcement { address, hostname })
}

pub fn hardware(line: &str) -> Option<HardwareLine<'_>> {
    let caps = HARDWARE_ADDRESS.captures(line)?;
    Some(HardwareLine {
        hardware_address: caps.get(1)?.as_str(),
        vendor: caps.get(2)?.as_str(),
    })
}

pub fn host_up(line: &str) -> Option<HostUp> {
    let caps = HOST_UP.captures(line)?;
    let latency_ms = caps
        .get(1)
        .and_then(|m| m.as_str().parse::<f64>().ok())
        .map(|secs| (secs * 1000.0).round() as u64);

    Some(HostUp { latency_ms })
}

pub fn operating_system(line: &str) -> Option<&str> {
    let caps = OPERATING_SYSTEM.captures(line)?;
    let os = caps.get(1)?.as_str().trim();
    if os.is_empty() {
        None
    } else {
        Some(os)
    }
}

/// `<number>/<tcp|udp> <state> <service>[ <version>]`, any state
pub fn port(line: &str) -> Option<Port> {
    let caps = PORT_LINE.captures(line)?;

    let number = caps.get(1)?.as_str().parse::<u16>().ok().filter(|n| *n > 0)?;
    let transport = caps.get(2)?.as_str().parse::<Transport>().ok()?;
    let state = caps.get(3)?.as_str().parse::<PortState>().ok()?;

    let mut port = Port::new(number, transport, state).with_service(caps.get(4)?.as_str());

    if let Some(version) = caps.get(5).map(|m| m.as_str().trim()).filter(|v| !v.is_empty()) {
        port = port.with_version(version);
    }

    Some(port)
}
