//! Driver facade: lifecycle hooks from the orchestration layer.
//!
//! Each hook persists the entity through the [`Repository`], and only
//! on a genuine state change fans the operation out to every switch
//! reconciler and re-arms the periodic sync worker. Replayed or
//! duplicate events therefore generate no device traffic.

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::debug;

use crate::config::{load_config, DriverConfig};
use crate::error::DriverResult;
use crate::repository::Repository;
use crate::switch_mgr::SwitchMgr;
use crate::sync::SyncWorker;
use crate::types::{MrvNetwork, MrvPort};

/// Only VLAN segments are programmable on this equipment.
const VLAN_NETWORK_TYPE: &str = "vlan";

/// Network lifecycle event fields, as extracted by the caller.
#[derive(Debug, Clone)]
pub struct NetworkEvent {
    /// Network identifier.
    pub network_id: String,
    /// Provider network type; non-VLAN events are ignored.
    pub network_type: String,
    /// Segmentation (VLAN) id.
    pub vlan_id: u16,
    /// Provider physical network tag.
    pub physical_network: String,
    /// Display name.
    pub name: String,
}

/// Port lifecycle event fields.
#[derive(Debug, Clone)]
pub struct PortEvent {
    /// Port identifier.
    pub port_id: String,
    /// Owning network identifier.
    pub network_id: String,
    /// Binding host, possibly fully qualified.
    pub host: String,
}

/// The mechanism-driver facade owning the engine's moving parts.
pub struct MrvDriver {
    repo: Arc<Repository>,
    switches: Vec<Arc<Mutex<SwitchMgr>>>,
    sync: SyncWorker,
}

impl MrvDriver {
    /// Builds the driver from a resolved configuration.
    pub fn new(config: DriverConfig) -> Self {
        let repo = Arc::new(Repository::new());
        let switches: Vec<Arc<Mutex<SwitchMgr>>> = config
            .switches
            .into_iter()
            .map(|scope| Arc::new(Mutex::new(SwitchMgr::new(scope))))
            .collect();
        let sync = SyncWorker::new(Arc::clone(&repo), switches.clone(), config.sync_interval);
        Self {
            repo,
            switches,
            sync,
        }
    }

    /// Builds the driver from a config file path.
    pub fn from_config_file(path: impl AsRef<std::path::Path>) -> DriverResult<Self> {
        Ok(Self::new(load_config(path)?))
    }

    /// The desired-state repository.
    pub fn repository(&self) -> &Arc<Repository> {
        &self.repo
    }

    /// Arms the periodic sync worker.
    pub fn start(&mut self) {
        self.sync.start();
    }

    /// Stops the periodic sync worker.
    pub async fn stop(&mut self) {
        self.sync.stop().await;
    }

    /// Returns true while the sync worker is armed.
    pub fn sync_running(&self) -> bool {
        self.sync.is_running()
    }

    /// Network created by the orchestration layer.
    pub async fn network_created(&mut self, event: NetworkEvent) {
        self.upsert_network(event).await;
    }

    /// Network updated. The records are immutable, so an update is an
    /// insert-if-absent like creation; an already-known network is a
    /// no-op.
    pub async fn network_updated(&mut self, event: NetworkEvent) {
        self.upsert_network(event).await;
    }

    async fn upsert_network(&mut self, event: NetworkEvent) {
        if event.network_type != VLAN_NETWORK_TYPE {
            debug!(
                "Ignoring non-VLAN network {} (type {})",
                event.network_id, event.network_type
            );
            return;
        }

        let network = MrvNetwork::new(
            event.network_id,
            event.vlan_id,
            event.physical_network,
            event.name,
        );
        let Some(added) = self.repo.add_network(network) else {
            return;
        };

        for switch in &self.switches {
            switch.lock().await.add_network(&added).await;
        }
        self.sync.rearm();
    }

    /// Network deleted by the orchestration layer.
    pub async fn network_deleted(&mut self, network_id: &str) {
        let Some(deleted) = self.repo.del_network(network_id) else {
            return;
        };

        for switch in &self.switches {
            switch.lock().await.del_network(&deleted).await;
        }
        self.sync.rearm();
    }

    /// Port bound or updated by the orchestration layer.
    pub async fn port_updated(&mut self, event: PortEvent) {
        let port = MrvPort::new(
            event.port_id,
            event.network_id,
            short_hostname(&event.host),
        );
        let Some(added) = self.repo.add_port(port) else {
            return;
        };

        let network = self.repo.get_network(&added.network_id);
        for switch in &self.switches {
            switch.lock().await.add_port(&added, network.as_ref()).await;
        }
        self.sync.rearm();
    }

    /// Port deleted by the orchestration layer.
    pub async fn port_deleted(&mut self, port_id: &str) {
        let Some(deleted) = self.repo.del_port(port_id) else {
            return;
        };

        let network = self.repo.get_network(&deleted.network_id);
        for switch in &self.switches {
            switch
                .lock()
                .await
                .del_port(&deleted, network.as_ref())
                .await;
        }
        self.sync.rearm();
    }
}

/// Strips the domain from a binding host name.
fn short_hostname(host: &str) -> String {
    host.split('.').next().unwrap_or(host).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn driver() -> MrvDriver {
        // No switches: exercises the repository and worker plumbing
        // without any device traffic.
        MrvDriver::new(DriverConfig {
            sync_interval: Duration::from_millis(20),
            switches: Vec::new(),
        })
    }

    fn vlan_event(id: &str, vlan: u16) -> NetworkEvent {
        NetworkEvent {
            network_id: id.to_string(),
            network_type: "vlan".to_string(),
            vlan_id: vlan,
            physical_network: "physnet1".to_string(),
            name: "tenant-net".to_string(),
        }
    }

    #[tokio::test]
    async fn test_network_created_persists() {
        let mut drv = driver();
        drv.network_created(vlan_event("n1", 100)).await;
        let net = drv.repository().get_network("n1").unwrap();
        assert_eq!(net.vlan_id, 100);
        drv.stop().await;
    }

    #[tokio::test]
    async fn test_non_vlan_network_ignored() {
        let mut drv = driver();
        let mut ev = vlan_event("n1", 100);
        ev.network_type = "vxlan".to_string();
        drv.network_created(ev).await;
        assert!(drv.repository().get_network("n1").is_none());
        // No genuine change, so the worker was never armed.
        assert!(!drv.sync_running());
    }

    #[tokio::test]
    async fn test_duplicate_event_is_noop() {
        let mut drv = driver();
        drv.network_created(vlan_event("n1", 100)).await;
        drv.stop().await;
        drv.network_updated(vlan_event("n1", 100)).await;
        // Second event changed nothing and did not re-arm.
        assert!(!drv.sync_running());
    }

    #[tokio::test]
    async fn test_event_rearms_sync_worker() {
        let mut drv = driver();
        drv.network_created(vlan_event("n1", 100)).await;
        assert!(drv.sync_running());
        drv.stop().await;
    }

    #[tokio::test]
    async fn test_port_host_is_shortened() {
        let mut drv = driver();
        drv.network_created(vlan_event("n1", 100)).await;
        drv.port_updated(PortEvent {
            port_id: "p1".to_string(),
            network_id: "n1".to_string(),
            host: "compute1.example.org".to_string(),
        })
        .await;
        assert_eq!(drv.repository().get_port("p1").unwrap().host, "compute1");
        drv.stop().await;
    }

    #[tokio::test]
    async fn test_delete_unknown_entities_is_noop() {
        let mut drv = driver();
        drv.network_deleted("ghost").await;
        drv.port_deleted("ghost").await;
        assert!(!drv.sync_running());
    }

    #[test]
    fn test_short_hostname() {
        assert_eq!(short_hostname("compute1.example.org"), "compute1");
        assert_eq!(short_hostname("compute1"), "compute1");
    }
}
