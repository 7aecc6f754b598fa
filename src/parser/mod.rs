//! Scan output interpreter
//!
//! Turns the line-oriented, human-readable output of one nmap invocation
//! into [`Host`](crate::models::Host) records. Parsing is pure and lenient:
//! unexpected lines are ignored, absent data leaves fields empty, and no
//! input can make it fail.

pub mod detailed;
pub mod discovery;
pub mod patterns;

pub use detailed::{host_is_up, parse_detailed};
pub use discovery::{parse_discovery, DiscoveryMachine, DiscoveryState, PendingHost};

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn prop_parsers_never_panic_and_are_pure(lines in prop::collection::vec(".{0,80}", 0..40)) {
            let first = parse_discovery(&lines);
            let second = parse_discovery(&lines);
            prop_assert_eq!(first, second);

            let first = parse_detailed(&lines, "10.0.0.1");
            let second = parse_detailed(&lines, "10.0.0.1");
            prop_assert_eq!(&first, &second);
            prop_assert_eq!(first.address.as_str(), "10.0.0.1");
        }

        #[test]
        fn prop_k_announced_hosts_with_hardware(octets in prop::collection::btree_set(1u8..=254, 0..30)) {
            let mut lines = Vec::new();
            for (i, octet) in octets.iter().enumerate() {
                lines.push(format!("Nmap scan report for 10.1.2.{}", octet));
                lines.push("Host is up (0.0010s latency).".to_string());
                lines.push(format!("MAC Address: 02:00:00:00:00:{:02X} (Vendor {})", octet, i));
            }

            let hosts = parse_discovery(&lines);
            prop_assert_eq!(hosts.len(), octets.len());
            for host in &hosts {
                prop_assert_eq!(host.status, crate::models::HostStatus::Up);
                prop_assert!(host.ports.is_empty());
                prop_assert!(host.hardware_address.is_some());
            }
        }
    }
}
