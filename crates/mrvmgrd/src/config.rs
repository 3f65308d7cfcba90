//! Configuration file loading.
//!
//! The daemon reads one YAML file describing the switches it manages:
//!
//! ```yaml
//! sync_interval_secs: 35
//! switches:
//!   sw1:
//!     host: 10.1.1.1
//!     username: admin
//!     password: secret
//!     vlan_subnets: [physnet1, physnet2]
//!     links:
//!       - "compute1:ge1"
//!       - "compute2:ge2"
//! ```
//!
//! `links` entries are `node:port` pairs; malformed entries are
//! skipped with a warning, never fatal. Omitted credentials fall back
//! to `admin` with an empty password, and an omitted host falls back
//! to the switch identifier.

use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use tracing::warn;

use crate::error::{DriverError, DriverResult};

/// Default full-resync interval.
pub const DEFAULT_SYNC_INTERVAL_SECS: u64 = 35;

/// Default device username.
const DEFAULT_USERNAME: &str = "admin";

/// Per-switch scope and credentials, resolved and validated.
///
/// Read-only after load; the reconciler never mutates it.
#[derive(Debug, Clone)]
pub struct SwitchScope {
    /// Switch identifier from the config file.
    pub switch_id: String,
    /// Device host or address.
    pub host: String,
    /// SSH username.
    pub username: String,
    /// SSH password.
    pub password: String,
    /// Physical-network tags this switch serves.
    pub vlan_subnets: HashSet<String>,
    /// Host name → device interface name.
    pub links: HashMap<String, String>,
}

impl SwitchScope {
    /// Returns true if a physical-network tag is in scope.
    pub fn serves_subnet(&self, physical_network: &str) -> bool {
        self.vlan_subnets.contains(physical_network)
    }

    /// Resolves a host to its device link, if mapped.
    pub fn link_for(&self, host: &str) -> Option<&str> {
        self.links.get(host).map(String::as_str)
    }
}

/// Whole-daemon configuration.
#[derive(Debug, Clone)]
pub struct DriverConfig {
    /// Full-resync interval.
    pub sync_interval: Duration,
    /// Resolved switch scopes, keyed by switch identifier.
    pub switches: Vec<SwitchScope>,
}

/// Raw file shape, before defaulting and link parsing.
#[derive(Debug, Deserialize)]
struct RawConfig {
    #[serde(default)]
    sync_interval_secs: Option<u64>,
    #[serde(default)]
    switches: HashMap<String, RawSwitch>,
}

#[derive(Debug, Deserialize)]
struct RawSwitch {
    #[serde(default)]
    host: Option<String>,
    #[serde(default)]
    username: Option<String>,
    #[serde(default)]
    password: Option<String>,
    #[serde(default)]
    vlan_subnets: Vec<String>,
    #[serde(default)]
    links: Vec<String>,
}

/// Loads and resolves the config file.
pub fn load_config(path: impl AsRef<Path>) -> DriverResult<DriverConfig> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|source| DriverError::ConfigRead {
        path: path.display().to_string(),
        source,
    })?;
    parse_config(&text)
}

/// Parses config text; split out for tests.
pub(crate) fn parse_config(text: &str) -> DriverResult<DriverConfig> {
    let raw: RawConfig = serde_yaml::from_str(text)?;

    let mut switches: Vec<SwitchScope> = raw
        .switches
        .into_iter()
        .map(|(switch_id, sw)| resolve_switch(switch_id, sw))
        .collect();
    // Deterministic iteration order for fan-out and logs.
    switches.sort_by(|a, b| a.switch_id.cmp(&b.switch_id));

    Ok(DriverConfig {
        sync_interval: Duration::from_secs(
            raw.sync_interval_secs.unwrap_or(DEFAULT_SYNC_INTERVAL_SECS),
        ),
        switches,
    })
}

fn resolve_switch(switch_id: String, raw: RawSwitch) -> SwitchScope {
    let mut links = HashMap::new();
    for entry in &raw.links {
        match entry.split_once(':') {
            Some((node, port)) if !node.trim().is_empty() && !port.trim().is_empty() => {
                links.insert(node.trim().to_string(), port.trim().to_string());
            }
            _ => {
                warn!(
                    "Switch {}: skipping malformed link entry '{}' (expected node:port)",
                    switch_id, entry
                );
            }
        }
    }

    let vlan_subnets: HashSet<String> = raw
        .vlan_subnets
        .iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();

    if vlan_subnets.is_empty() && links.is_empty() {
        warn!(
            "Switch {}: empty scope (no vlan_subnets, no links); it will never receive config",
            switch_id
        );
    }

    let host = raw.host.unwrap_or_else(|| switch_id.clone());

    SwitchScope {
        switch_id,
        host,
        username: raw.username.unwrap_or_else(|| DEFAULT_USERNAME.to_string()),
        password: raw.password.unwrap_or_default(),
        vlan_subnets,
        links,
    }
}
