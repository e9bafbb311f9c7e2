//! Network operators (@ipMatch).

use super::Operator;
use crate::engine::Transaction;
use crate::error::{Error, Result};
use ipnetwork::IpNetwork;
use std::net::IpAddr;

/// IP match operator (@ipMatch).
pub struct IpMatchOperator {
    argument: String,
    networks: Vec<IpNetwork>,
}

impl IpMatchOperator {
    /// Create from a space- or comma-separated IP/CIDR list.
    pub fn new(ips: &str) -> Result<Self> {
        let networks = ips
            .split(|c: char| c.is_whitespace() || c == ',')
            .filter(|s| !s.is_empty())
            .map(parse_network)
            .collect::<Result<Vec<_>>>()?;

        if networks.is_empty() {
            return Err(Error::InvalidIp {
                value: ips.to_string(),
                message: "empty network list".to_string(),
            });
        }

        Ok(Self {
            argument: ips.to_string(),
            networks,
        })
    }

    /// Check if an IP is in any of the networks.
    fn contains(&self, ip: IpAddr) -> bool {
        self.networks.iter().any(|net| net.contains(ip))
    }
}

/// Bare addresses become host networks (/32 or /128).
fn parse_network(s: &str) -> Result<IpNetwork> {
    let parsed = match s.parse::<IpAddr>() {
        Ok(ip) => Ok(IpNetwork::from(ip)),
        Err(_) => s.parse::<IpNetwork>(),
    };
    parsed.map_err(|e| Error::InvalidIp {
        value: s.to_string(),
        message: e.to_string(),
    })
}

impl Operator for IpMatchOperator {
    fn name(&self) -> &'static str {
        "ipMatch"
    }

    fn args(&self) -> &str {
        &self.argument
    }

    fn matches(&self, _tx: &Transaction, value: &str) -> bool {
        value
            .trim()
            .parse::<IpAddr>()
            .map(|ip| self.contains(ip))
            .unwrap_or(false)
    }
}
