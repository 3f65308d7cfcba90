//! SwitchMgr - per-switch reconciler.
//!
//! Owns one device's scope and the last state successfully applied to
//! it, and turns entity add/delete calls plus full-state reconcile
//! passes into NETCONF config transactions.
//!
//! Transport failures stop at this boundary: they are logged with the
//! switch identifier and reported as `false`, never propagated as
//! errors. The periodic sync worker retries until a pass is clean.

use std::collections::HashMap;

use tracing::{debug, info, warn};

use mrv_netconf::{apply_transaction, NetconfResult, Session, SessionConfig};

use crate::commands::{
    build_add_network, build_add_port, build_del_network, build_del_port, ConfigFragment,
};
use crate::config::SwitchScope;
use crate::types::{MrvNetwork, MrvPort};

/// Reconciler for one switch.
///
/// The `nets`/`ports` maps hold what was last successfully applied to
/// this device. They live in-process only; after a restart the first
/// full pass rebuilds them, which is safe because device object names
/// derive deterministically from the logical entities.
pub struct SwitchMgr {
    scope: SwitchScope,

    /// Networks applied to this switch, by network id.
    nets: HashMap<String, MrvNetwork>,

    /// Ports applied to this switch, by port id.
    ports: HashMap<String, MrvPort>,

    /// Mock mode for testing: capture fragments instead of pushing.
    #[cfg(test)]
    mock_mode: bool,

    /// Simulated transport failure in mock mode.
    #[cfg(test)]
    mock_fail: bool,

    /// Fragments captured in mock mode.
    #[cfg(test)]
    captured: Vec<ConfigFragment>,
}

impl SwitchMgr {
    /// Creates a reconciler for one switch scope.
    pub fn new(scope: SwitchScope) -> Self {
        Self {
            scope,
            nets: HashMap::new(),
            ports: HashMap::new(),
            #[cfg(test)]
            mock_mode: false,
            #[cfg(test)]
            mock_fail: false,
            #[cfg(test)]
            captured: Vec::new(),
        }
    }

    /// Enables mock mode for testing.
    #[cfg(test)]
    pub fn with_mock_mode(mut self) -> Self {
        self.mock_mode = true;
        self
    }

    /// Toggles simulated transport failure (mock mode only).
    #[cfg(test)]
    pub fn set_mock_failure(&mut self, fail: bool) {
        self.mock_fail = fail;
    }

    /// Fragments captured in mock mode, in application order.
    #[cfg(test)]
    pub fn captured_fragments(&self) -> &[ConfigFragment] {
        &self.captured
    }

    /// Clears captured fragments (for phased assertions).
    #[cfg(test)]
    pub fn clear_captured(&mut self) {
        self.captured.clear();
    }

    /// The scope this reconciler serves.
    pub fn scope(&self) -> &SwitchScope {
        &self.scope
    }

    /// Creates the network's ELAN on this switch.
    ///
    /// No-op (reported as success) when the network's physical-network
    /// tag is outside this switch's subnets.
    pub async fn add_network(&mut self, net: &MrvNetwork) -> bool {
        if !self.scope.serves_subnet(&net.physical_network) {
            debug!(
                "Switch {}: network {} ({}) out of scope",
                self.scope.switch_id, net.network_id, net.physical_network
            );
            return true;
        }
        let fragments = build_add_network(net);
        let ok = self.apply_config(&fragments).await;
        if ok {
            info!(
                "Switch {}: added network {} (vlan {})",
                self.scope.switch_id, net.network_id, net.vlan_id
            );
            self.nets.insert(net.network_id.clone(), net.clone());
        }
        ok
    }

    /// Deletes the network's ELAN from this switch.
    ///
    /// Always attempted, with no scope filter: the network may have
    /// left this switch's scope between creation and deletion, and the
    /// caller already knows the deletion is warranted.
    pub async fn del_network(&mut self, net: &MrvNetwork) -> bool {
        let fragments = build_del_network(net);
        let ok = self.apply_config(&fragments).await;
        if ok {
            info!(
                "Switch {}: deleted network {} (vlan {})",
                self.scope.switch_id, net.network_id, net.vlan_id
            );
            self.nets.remove(&net.network_id);
        }
        ok
    }

    /// Creates the port's AC and attaches it to the owning ELAN.
    ///
    /// No-op when the network is unresolved (it may belong to another
    /// physical scope) or the port's host has no link on this switch.
    pub async fn add_port(&mut self, port: &MrvPort, net: Option<&MrvNetwork>) -> bool {
        let Some(net) = net else {
            debug!(
                "Switch {}: port {} has no resolved network",
                self.scope.switch_id, port.port_id
            );
            return true;
        };
        let Some(link) = self.scope.link_for(&port.host) else {
            debug!(
                "Switch {}: host {} not linked, skipping port {}",
                self.scope.switch_id, port.host, port.port_id
            );
            return true;
        };
        let fragments = build_add_port(port, net, link);
        let ok = self.apply_config(&fragments).await;
        if ok {
            info!(
                "Switch {}: added port {} on network {}",
                self.scope.switch_id, port.port_id, net.network_id
            );
            self.ports.insert(port.port_id.clone(), port.clone());
        }
        ok
    }

    /// Detaches and deletes the port's AC. Same guards as `add_port`.
    pub async fn del_port(&mut self, port: &MrvPort, net: Option<&MrvNetwork>) -> bool {
        let Some(net) = net else {
            return true;
        };
        let Some(link) = self.scope.link_for(&port.host) else {
            return true;
        };
        let fragments = build_del_port(port, net, link);
        let ok = self.apply_config(&fragments).await;
        if ok {
            info!(
                "Switch {}: deleted port {} from network {}",
                self.scope.switch_id, port.port_id, net.network_id
            );
            self.ports.remove(&port.port_id);
        }
        ok
    }

    /// Full-state reconciliation against the desired state.
    ///
    /// Order within the pass: stale ports are detached first, then
    /// stale networks removed, then new in-scope networks created,
    /// then new in-scope ports attached. That guarantees an ELAN
    /// exists before any AC references it and no AC outlives its ELAN
    /// deletion ordering.
    ///
    /// The last-applied maps advance only on successful applies; the
    /// first transport failure aborts the remainder of the pass and
    /// returns `false`. Re-running with unchanged desired state after
    /// a clean pass produces no device traffic.
    pub async fn reconcile(
        &mut self,
        desired_nets: &HashMap<String, MrvNetwork>,
        desired_ports: &HashMap<String, MrvPort>,
    ) -> bool {
        // Stale ports.
        let stale_ports: Vec<MrvPort> = self
            .ports
            .values()
            .filter(|p| !desired_ports.contains_key(&p.port_id))
            .cloned()
            .collect();
        for port in stale_ports {
            let Some(net) = self.nets.get(&port.network_id).cloned() else {
                // The owning ELAN is already gone from this switch;
                // its ACs went with it.
                debug!(
                    "Switch {}: dropping stale port {} with no tracked network",
                    self.scope.switch_id, port.port_id
                );
                self.ports.remove(&port.port_id);
                continue;
            };
            let Some(link) = self.scope.link_for(&port.host).map(str::to_string) else {
                self.ports.remove(&port.port_id);
                continue;
            };
            let fragments = build_del_port(&port, &net, &link);
            if !self.apply_config(&fragments).await {
                return false;
            }
            self.ports.remove(&port.port_id);
        }

        // Stale networks.
        let stale_nets: Vec<MrvNetwork> = self
            .nets
            .values()
            .filter(|n| !desired_nets.contains_key(&n.network_id))
            .cloned()
            .collect();
        for net in stale_nets {
            let fragments = build_del_network(&net);
            if !self.apply_config(&fragments).await {
                return false;
            }
            self.nets.remove(&net.network_id);
        }

        // New networks, scope-filtered.
        for net in desired_nets.values() {
            if self.nets.contains_key(&net.network_id) {
                continue;
            }
            if !self.scope.serves_subnet(&net.physical_network) {
                continue;
            }
            let fragments = build_add_network(net);
            if !self.apply_config(&fragments).await {
                return false;
            }
            self.nets.insert(net.network_id.clone(), net.clone());
        }

        // New ports, scope-filtered; the owning ELAN must exist on
        // this switch or the reference commit would be rejected.
        for port in desired_ports.values() {
            if self.ports.contains_key(&port.port_id) {
                continue;
            }
            let Some(net) = desired_nets.get(&port.network_id) else {
                continue;
            };
            if !self.nets.contains_key(&net.network_id) {
                continue;
            }
            let Some(link) = self.scope.link_for(&port.host).map(str::to_string) else {
                continue;
            };
            let fragments = build_add_port(port, net, &link);
            if !self.apply_config(&fragments).await {
                return false;
            }
            self.ports.insert(port.port_id.clone(), port.clone());
        }

        true
    }

    /// Applies fragments to the device (or captures them in mock mode).
    async fn apply_config(&mut self, fragments: &[ConfigFragment]) -> bool {
        #[cfg(test)]
        if self.mock_mode {
            if self.mock_fail {
                warn!(
                    "Switch {}: simulated transport failure",
                    self.scope.switch_id
                );
                return false;
            }
            self.captured.extend_from_slice(fragments);
            return true;
        }

        let result = self.push_fragments(fragments).await;
        self.finish_apply(result)
    }

    /// Converts a transport outcome into the boolean the control loop
    /// consumes. Transient transport trouble and a device rejecting
    /// the config are logged apart; both are retried by the periodic
    /// pass.
    fn finish_apply(&self, result: NetconfResult<()>) -> bool {
        match result {
            Ok(()) => true,
            Err(e) if e.is_transient() => {
                warn!(
                    "Transport failure for switch {}: {}",
                    self.scope.switch_id, e
                );
                false
            }
            Err(e) => {
                warn!("Switch {} rejected config: {}", self.scope.switch_id, e);
                false
            }
        }
    }

    /// One NETCONF session per call, applying all fragments as one
    /// logical transaction. Fragments already committed are not rolled
    /// back on a later failure; the next full pass repairs whatever is
    /// left inconsistent.
    async fn push_fragments(&self, fragments: &[ConfigFragment]) -> NetconfResult<()> {
        let session_cfg = SessionConfig::new(
            self.scope.host.clone(),
            self.scope.username.clone(),
            self.scope.password.clone(),
        );
        let mut session = Session::connect(&session_cfg).await?;

        let texts: Vec<&str> = fragments.iter().map(|f| f.as_str()).collect();
        let result = apply_transaction(&mut session, &texts).await;

        session.close().await;
        result
    }
}
