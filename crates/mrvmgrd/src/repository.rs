//! In-memory store of the desired network/port state.
//!
//! Add operations insert only if absent and report whether anything
//! changed; delete operations return the removed record only if one
//! existed. Callers use those signals to decide whether to fan out to
//! the switches, which keeps replayed lifecycle events idempotent.

use std::collections::HashMap;
use std::sync::RwLock;

use crate::types::{MrvNetwork, MrvPort};

/// Authoritative desired-state store.
///
/// Interior locking makes each operation individually atomic; the sync
/// worker reads while lifecycle hooks write.
#[derive(Debug, Default)]
pub struct Repository {
    networks: RwLock<HashMap<String, MrvNetwork>>,
    ports: RwLock<HashMap<String, MrvPort>>,
}

impl Repository {
    /// Creates an empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a network unless one with the same id exists.
    ///
    /// Returns the stored record on insert, `None` if it already
    /// existed.
    pub fn add_network(&self, network: MrvNetwork) -> Option<MrvNetwork> {
        let mut networks = self.networks.write().unwrap();
        if networks.contains_key(&network.network_id) {
            return None;
        }
        networks.insert(network.network_id.clone(), network.clone());
        Some(network)
    }

    /// Looks up a network by id.
    pub fn get_network(&self, network_id: &str) -> Option<MrvNetwork> {
        self.networks.read().unwrap().get(network_id).cloned()
    }

    /// Deletes a network, returning it only if it existed.
    pub fn del_network(&self, network_id: &str) -> Option<MrvNetwork> {
        self.networks.write().unwrap().remove(network_id)
    }

    /// Snapshot of all networks, keyed by network id.
    pub fn networks(&self) -> HashMap<String, MrvNetwork> {
        self.networks.read().unwrap().clone()
    }

    /// Stores a port unless one with the same id exists.
    pub fn add_port(&self, port: MrvPort) -> Option<MrvPort> {
        let mut ports = self.ports.write().unwrap();
        if ports.contains_key(&port.port_id) {
            return None;
        }
        ports.insert(port.port_id.clone(), port.clone());
        Some(port)
    }

    /// Looks up a port by id.
    pub fn get_port(&self, port_id: &str) -> Option<MrvPort> {
        self.ports.read().unwrap().get(port_id).cloned()
    }

    /// Deletes a port, returning it only if it existed.
    pub fn del_port(&self, port_id: &str) -> Option<MrvPort> {
        self.ports.write().unwrap().remove(port_id)
    }

    /// Snapshot of all ports, keyed by port id.
    pub fn ports(&self) -> HashMap<String, MrvPort> {
        self.ports.read().unwrap().clone()
    }
}
