//! CIDR range expansion
//!
//! Ranges are parsed non-strictly: host bits in the base address are
//! ignored, so `192.168.1.5/30` covers `192.168.1.4` through `192.168.1.7`.
//! Network and broadcast addresses are part of the expansion.

use crate::probe::Target;
use crate::{Result, SweepError};
use crate::config::DEFAULT_MAX_RANGE_ADDRESSES;
use ipnetwork::IpNetwork;
use log::debug;

/// Expands address ranges into individual targets
pub struct TargetParser {
    max_range_addresses: u64,
}

impl Default for TargetParser {
    fn default() -> Self {
        Self {
            max_range_addresses: DEFAULT_MAX_RANGE_ADDRESSES,
        }
    }
}

impl TargetParser {
    /// Create a parser refusing ranges with more than `max_range_addresses` addresses
    pub fn new(max_range_addresses: u64) -> Self {
        Self { max_range_addresses }
    }

    /// Parse a range string such as `10.0.0.0/24`. A bare address is a
    /// single-host range.
    pub fn parse_network(&self, range: &str) -> Result<IpNetwork> {
        let range = range.trim();
        if range.is_empty() {
            return Err(SweepError::InvalidTarget("Empty range".to_string()));
        }

        range
            .parse::<IpNetwork>()
            .map_err(|e| SweepError::InvalidTarget(format!("{}: {}", range, e)))
    }

    /// Expand a range into its addresses, in ascending order
    pub fn parse_range(&self, range: &str) -> Result<Vec<Target>> {
        let network = self.parse_network(range)?;
        let count = address_count(&network);

        if count > u128::from(self.max_range_addresses) {
            return Err(SweepError::InvalidTarget(format!(
                "{} covers {} addresses, more than the limit of {}",
                range.trim(),
                count,
                self.max_range_addresses
            )));
        }

        debug!("Expanding {} into {} addresses", network, count);

        Ok(network.iter().map(Target::from).collect())
    }
}

/// Number of addresses covered by a network, saturating for huge IPv6 ranges
pub fn address_count(network: &IpNetwork) -> u128 {
    let max_prefix: u8 = match network {
        IpNetwork::V4(_) => 32,
        IpNetwork::V6(_) => 128,
    };
    let host_bits = u32::from(max_prefix - network.prefix());
    1u128.checked_shl(host_bits).unwrap_or(u128::MAX)
}

/// Utility function to expand a range with a given size limit
pub fn targets_from_range(range: &str, max_range_addresses: u64) -> Result<Vec<Target>> {
    TargetParser::new(max_range_addresses).parse_range(range)
}
