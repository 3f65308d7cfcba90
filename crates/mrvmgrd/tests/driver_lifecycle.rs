//! Driver lifecycle integration tests
//!
//! Exercises the public API end to end: config file loading, driver
//! construction, lifecycle hooks and repository state. Device traffic
//! is avoided by configuring no switches or empty scopes.

use std::io::Write;

use mrvmgrd::{load_config, MrvDriver, NetworkEvent, PortEvent};

fn write_config(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().expect("Failed to create temp file");
    file.write_all(contents.as_bytes())
        .expect("Failed to write config");
    file
}

/// Scenario:
/// 1. Load a config with two switches and a malformed link entry
/// 2. Verify scopes, defaults and that the bad entry was skipped
#[test]
fn test_config_file_round_trip() {
    let file = write_config(
        r#"
sync_interval_secs: 15
switches:
  leaf1:
    host: 192.0.2.10
    username: operator
    password: secret
    vlan_subnets: [physnet1]
    links:
      - "compute1:ge1"
      - "not-a-link"
  leaf2:
    vlan_subnets: [physnet2]
"#,
    );

    let cfg = load_config(file.path()).expect("Config should load");
    assert_eq!(cfg.sync_interval.as_secs(), 15);
    assert_eq!(cfg.switches.len(), 2);

    let leaf1 = &cfg.switches[0];
    assert_eq!(leaf1.switch_id, "leaf1");
    assert_eq!(leaf1.host, "192.0.2.10");
    assert_eq!(leaf1.link_for("compute1"), Some("ge1"));
    assert_eq!(leaf1.links.len(), 1);

    let leaf2 = &cfg.switches[1];
    assert_eq!(leaf2.host, "leaf2");
    assert_eq!(leaf2.username, "admin");
}

#[test]
fn test_missing_config_file_is_error() {
    assert!(load_config("/nonexistent/mrvmgrd.yaml").is_err());
}

/// Scenario:
/// 1. Build a driver with no switches
/// 2. Feed it a network create, a port bind and the matching deletes
/// 3. Verify repository state after each step
#[tokio::test]
async fn test_lifecycle_hooks_drive_repository() {
    let file = write_config("switches: {}\nsync_interval_secs: 1\n");
    let mut driver = MrvDriver::from_config_file(file.path()).expect("Driver should build");

    driver
        .network_created(NetworkEvent {
            network_id: "n1".to_string(),
            network_type: "vlan".to_string(),
            vlan_id: 100,
            physical_network: "physnet1".to_string(),
            name: "tenant-net".to_string(),
        })
        .await;
    driver
        .port_updated(PortEvent {
            port_id: "p1".to_string(),
            network_id: "n1".to_string(),
            host: "compute1.example.org".to_string(),
        })
        .await;

    let repo = driver.repository();
    assert_eq!(repo.networks().len(), 1);
    assert_eq!(repo.get_port("p1").unwrap().host, "compute1");

    driver.port_deleted("p1").await;
    driver.network_deleted("n1").await;
    assert!(driver.repository().networks().is_empty());
    assert!(driver.repository().ports().is_empty());

    driver.stop().await;
}
