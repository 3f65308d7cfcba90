//! NETCONF config fragment builders for ELAN and AC objects.
//!
//! Pure functions turning logical networks and ports into the MRV
//! device schema. A network maps to one `config-elan` service object;
//! a port maps to one `ac-interface` plus a reference to it under the
//! owning network's service object.
//!
//! Fragment order within one operation is load-bearing: an interface
//! is created before the service object references it, and a reference
//! is removed before the interface it points to is deleted.

use crate::types::{MrvNetwork, MrvPort};

/// MRV MPLS-ELAN schema namespace.
pub const ELAN_NS: &str = "http://www.mrv.com/ns/mpls-elan";

/// MRV access-interface schema namespace.
pub const AC_NS: &str = "http://www.mrv.com/ns/ac";

/// NETCONF base namespace, carried for the `operation` attribute.
pub const NC_BASE_NS: &str = "urn:ietf:params:xml:ns:netconf:base:1.0";

/// Name prefix for ELAN objects owned by this driver.
pub const ELAN_PREFIX: &str = "ML2-";

/// Description prefix embedding the owning logical identifier.
pub const DESCRIPTION_PREFIX: &str = "ML2:";

/// One atomic device configuration change, ready for `edit-config`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigFragment(String);

impl ConfigFragment {
    /// Returns the fragment as a `<config>` document.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ConfigFragment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Escapes a value for interpolation into XML element content.
///
/// Identifiers and names originate from orchestration-layer input and
/// must never be able to break out of their element.
pub fn xml_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

/// ELAN object name for a network: `ML2-<vlan>`.
pub fn elan_name(net: &MrvNetwork) -> String {
    format!("{}{}", ELAN_PREFIX, net.vlan_id)
}

/// ELAN service identifier: the VLAN id.
pub fn elan_service_id(net: &MrvNetwork) -> String {
    net.vlan_id.to_string()
}

/// ELAN description embedding the logical network identifier.
pub fn elan_description(net: &MrvNetwork) -> String {
    format!("{}{}", DESCRIPTION_PREFIX, net.network_id)
}

/// AC interface name for a port: `<link>.<vlan>`.
pub fn ac_name(link: &str, net: &MrvNetwork) -> String {
    format!("{}.{}", link, net.vlan_id)
}

/// AC outer tag: the VLAN id.
pub fn ac_outer_tag(net: &MrvNetwork) -> String {
    net.vlan_id.to_string()
}

/// AC description embedding the logical port identifier.
pub fn ac_description(port: &MrvPort) -> String {
    format!("{}{}", DESCRIPTION_PREFIX, port.port_id)
}

/// Creates the ELAN service object for a network. One fragment.
pub fn build_add_network(net: &MrvNetwork) -> Vec<ConfigFragment> {
    vec![ConfigFragment(format!(
        "<config>\
         <mpls_elan_objects xmlns=\"{elan_ns}\">\
         <config-elans>\
         <config-elan xmlns:nc=\"{nc_ns}\" nc:operation=\"create\">\
         <name>{name}</name>\
         <service-id>{service_id}</service-id>\
         <description>{description}</description>\
         <enable>true</enable>\
         </config-elan>\
         </config-elans>\
         </mpls_elan_objects>\
         </config>",
        elan_ns = ELAN_NS,
        nc_ns = NC_BASE_NS,
        name = xml_escape(&elan_name(net)),
        service_id = xml_escape(&elan_service_id(net)),
        description = xml_escape(&elan_description(net)),
    ))]
}

/// Deletes the ELAN service object for a network. One fragment.
pub fn build_del_network(net: &MrvNetwork) -> Vec<ConfigFragment> {
    vec![ConfigFragment(format!(
        "<config>\
         <mpls_elan_objects xmlns=\"{elan_ns}\">\
         <config-elans>\
         <config-elan xmlns:nc=\"{nc_ns}\" nc:operation=\"delete\">\
         <name>{name}</name>\
         </config-elan>\
         </config-elans>\
         </mpls_elan_objects>\
         </config>",
        elan_ns = ELAN_NS,
        nc_ns = NC_BASE_NS,
        name = xml_escape(&elan_name(net)),
    ))]
}

/// Creates the AC interface for a port and attaches it to the owning
/// network's ELAN. Two fragments, in that order.
pub fn build_add_port(port: &MrvPort, net: &MrvNetwork, link: &str) -> Vec<ConfigFragment> {
    let ac = xml_escape(&ac_name(link, net));
    vec![
        ConfigFragment(format!(
            "<config>\
             <ac_objects xmlns=\"{ac_ns}\">\
             <ac-interface xmlns:nc=\"{nc_ns}\" nc:operation=\"create\">\
             <name>{name}</name>\
             <outer-tags>{outer_tag}</outer-tags>\
             <description>{description}</description>\
             <enable>true</enable>\
             </ac-interface>\
             </ac_objects>\
             </config>",
            ac_ns = AC_NS,
            nc_ns = NC_BASE_NS,
            name = ac,
            outer_tag = xml_escape(&ac_outer_tag(net)),
            description = xml_escape(&ac_description(port)),
        )),
        ConfigFragment(format!(
            "<config>\
             <mpls_elan_objects xmlns=\"{elan_ns}\">\
             <config-elans>\
             <config-elan>\
             <name>{name}</name>\
             <acs xmlns:nc=\"{nc_ns}\" nc:operation=\"create\">\
             <ac>{ac_name}</ac>\
             </acs>\
             </config-elan>\
             </config-elans>\
             </mpls_elan_objects>\
             </config>",
            elan_ns = ELAN_NS,
            nc_ns = NC_BASE_NS,
            name = xml_escape(&elan_name(net)),
            ac_name = ac,
        )),
    ]
}

/// Detaches a port's AC from the ELAN and deletes the interface.
/// Two fragments, the exact reverse of [`build_add_port`].
pub fn build_del_port(_port: &MrvPort, net: &MrvNetwork, link: &str) -> Vec<ConfigFragment> {
    let ac = xml_escape(&ac_name(link, net));
    vec![
        ConfigFragment(format!(
            "<config>\
             <mpls_elan_objects xmlns=\"{elan_ns}\">\
             <config-elans>\
             <config-elan>\
             <name>{name}</name>\
             <acs xmlns:nc=\"{nc_ns}\" nc:operation=\"delete\">\
             <ac>{ac_name}</ac>\
             </acs>\
             </config-elan>\
             </config-elans>\
             </mpls_elan_objects>\
             </config>",
            elan_ns = ELAN_NS,
            nc_ns = NC_BASE_NS,
            name = xml_escape(&elan_name(net)),
            ac_name = ac,
        )),
        ConfigFragment(format!(
            "<config>\
             <ac_objects xmlns=\"{ac_ns}\">\
             <ac-interface xmlns:nc=\"{nc_ns}\" nc:operation=\"delete\">\
             <name>{name}</name>\
             </ac-interface>\
             </ac_objects>\
             </config>",
            ac_ns = AC_NS,
            nc_ns = NC_BASE_NS,
            name = ac,
        )),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn net(vlan: u16, physnet: &str) -> MrvNetwork {
        MrvNetwork::new("n1", vlan, physnet, "tenant-net")
    }

    #[test]
    fn test_elan_naming() {
        let n = net(100, "physnet1");
        assert_eq!(elan_name(&n), "ML2-100");
        assert_eq!(elan_service_id(&n), "100");
        assert_eq!(elan_description(&n), "ML2:n1");
    }

    #[test]
    fn test_ac_naming() {
        let n = net(100, "physnet1");
        let p = MrvPort::new("p1", "n1", "hostA");
        assert_eq!(ac_name("eth1", &n), "eth1.100");
        assert_eq!(ac_outer_tag(&n), "100");
        assert_eq!(ac_description(&p), "ML2:p1");
    }

    #[test]
    fn test_build_add_network() {
        let frags = build_add_network(&net(100, "physnet1"));
        assert_eq!(frags.len(), 1);
        let xml = frags[0].as_str();
        assert!(xml.contains("<name>ML2-100</name>"));
        assert!(xml.contains("<service-id>100</service-id>"));
        assert!(xml.contains("<description>ML2:n1</description>"));
        assert!(xml.contains("nc:operation=\"create\""));
        assert!(xml.contains(ELAN_NS));
    }

    #[test]
    fn test_build_del_network() {
        let frags = build_del_network(&net(100, "physnet1"));
        assert_eq!(frags.len(), 1);
        let xml = frags[0].as_str();
        assert!(xml.contains("<name>ML2-100</name>"));
        assert!(xml.contains("nc:operation=\"delete\""));
        assert!(!xml.contains("service-id"));
    }

    #[test]
    fn test_build_add_port_order() {
        let n = net(100, "physnet1");
        let p = MrvPort::new("p1", "n1", "hostA");
        let frags = build_add_port(&p, &n, "eth1");
        assert_eq!(frags.len(), 2);
        // Interface first, reference second.
        assert!(frags[0].as_str().contains("<ac-interface"));
        assert!(frags[0].as_str().contains("<name>eth1.100</name>"));
        assert!(frags[0].as_str().contains("<outer-tags>100</outer-tags>"));
        assert!(frags[1].as_str().contains("<name>ML2-100</name>"));
        assert!(frags[1].as_str().contains("<ac>eth1.100</ac>"));
        assert!(frags[1].as_str().contains("nc:operation=\"create\""));
    }

    #[test]
    fn test_build_del_port_reverses_add() {
        let n = net(100, "physnet1");
        let p = MrvPort::new("p1", "n1", "hostA");
        let del = build_del_port(&p, &n, "eth1");
        assert_eq!(del.len(), 2);
        // Reference removed first, interface deleted second.
        assert!(del[0].as_str().contains("<ac>eth1.100</ac>"));
        assert!(del[0].as_str().contains("nc:operation=\"delete\""));
        assert!(del[1].as_str().contains("<ac-interface"));
        assert!(del[1].as_str().contains("<name>eth1.100</name>"));
        assert!(del[1].as_str().contains("nc:operation=\"delete\""));
    }

    #[test]
    fn test_xml_escape() {
        assert_eq!(xml_escape("plain"), "plain");
        assert_eq!(
            xml_escape("<evil>&\"'"),
            "&lt;evil&gt;&amp;&quot;&apos;"
        );
    }

    #[test]
    fn test_hostile_identifiers_are_escaped() {
        let n = MrvNetwork::new("a</description><enable>false</enable>", 100, "physnet1", "x");
        let frags = build_add_network(&n);
        let xml = frags[0].as_str();
        assert!(!xml.contains("<description>ML2:a</description><enable>false"));
        assert!(xml.contains("&lt;/description&gt;"));
    }
}
