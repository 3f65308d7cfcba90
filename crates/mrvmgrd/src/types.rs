//! Type definitions for mrvmgrd

use serde::{Deserialize, Serialize};

/// A logical network as committed by the orchestration layer.
///
/// Immutable once created; an update event replaces the record as a
/// whole, never mutates it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MrvNetwork {
    /// Opaque network identifier.
    pub network_id: String,
    /// VLAN / service identifier.
    pub vlan_id: u16,
    /// Physical network tag, used for per-switch scoping.
    pub physical_network: String,
    /// Display name.
    pub name: String,
}

impl MrvNetwork {
    /// Creates a new network record.
    pub fn new(
        network_id: impl Into<String>,
        vlan_id: u16,
        physical_network: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            network_id: network_id.into(),
            vlan_id,
            physical_network: physical_network.into(),
            name: name.into(),
        }
    }
}

/// A logical port bound to a host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MrvPort {
    /// Opaque port identifier.
    pub port_id: String,
    /// Owning network identifier.
    pub network_id: String,
    /// Host the port is bound to (short name, no domain).
    pub host: String,
}

impl MrvPort {
    /// Creates a new port record.
    pub fn new(
        port_id: impl Into<String>,
        network_id: impl Into<String>,
        host: impl Into<String>,
    ) -> Self {
        Self {
            port_id: port_id.into(),
            network_id: network_id.into(),
            host: host.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_network_new() {
        let net = MrvNetwork::new("n1", 100, "physnet1", "tenant-net");
        assert_eq!(net.network_id, "n1");
        assert_eq!(net.vlan_id, 100);
        assert_eq!(net.physical_network, "physnet1");
    }

    #[test]
    fn test_port_new() {
        let port = MrvPort::new("p1", "n1", "compute1");
        assert_eq!(port.port_id, "p1");
        assert_eq!(port.network_id, "n1");
        assert_eq!(port.host, "compute1");
    }
}
