//! # Asset Extraction
//!
//! Builds an `arf:asset` describing the scanned machine from the target
//! information of an XCCDF TestResult:
//!
//! ```text
//! arf:asset id="assetN"
//! └── ai:computing-device
//!     ├── ai:connections
//!     │   └── ai:connection (one per address / MAC fact)
//!     ├── ai:fqdn
//!     └── ai:hostname
//! ```

pub mod ipv6;

use crate::api::errors::ComposeError;
use crate::diagnostics::Diagnostics;
use crate::ids::next_asset_id;
use crate::namespaces::{ArfNamespace, NamespaceRegistry};
use crate::xml::{Document, NodeId};
use arf_core::logging::codes;

pub use ipv6::expand_ipv6;

pub const FACT_MAC: &str = "urn:xccdf:fact:asset:identifier:mac";
pub const FACT_FQDN: &str = "urn:xccdf:fact:asset:identifier:fqdn";
pub const FACT_HOST_NAME: &str = "urn:xccdf:fact:asset:identifier:host_name";

/// An asset appended to the `assets` container
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Asset {
    pub node: NodeId,
    pub id: String,
}

struct AssetBuilder<'a> {
    doc: &'a mut Document,
    ns: &'a NamespaceRegistry,
    computing_device: NodeId,
    connections: NodeId,
    fqdn: Option<NodeId>,
    hostname: Option<NodeId>,
}

impl AssetBuilder<'_> {
    fn ai_element(&mut self, local: &str) -> Result<NodeId, ComposeError> {
        Ok(self.doc.create_element(self.ns.qname(ArfNamespace::Ai, local)?))
    }

    fn add_ip_address(&mut self, address: &str, diagnostics: &mut Diagnostics) -> Result<(), ComposeError> {
        let connection = self.ai_element("connection")?;
        self.doc.append_child(self.connections, connection);
        let ip_address = self.ai_element("ip-address")?;
        self.doc.append_child(connection, ip_address);

        if address.contains('.') {
            self.doc
                .append_text_element(ip_address, self.ns.qname(ArfNamespace::Ai, "ip-v4")?, address);
        } else {
            let expanded = expand_ipv6(address).unwrap_or_else(|| {
                diagnostics.warning(
                    codes::assets::INVALID_IPV6_ADDRESS,
                    "Target address is neither IPv4 nor a valid IPv6 address, storing it verbatim",
                    &[("address", address)],
                );
                address.to_string()
            });
            self.doc
                .append_text_element(ip_address, self.ns.qname(ArfNamespace::Ai, "ip-v6")?, &expanded);
        }
        Ok(())
    }

    fn add_mac_address(&mut self, mac: &str) -> Result<(), ComposeError> {
        let connection = self.ai_element("connection")?;
        self.doc.append_child(self.connections, connection);
        self.doc
            .append_text_element(connection, self.ns.qname(ArfNamespace::Ai, "mac-address")?, mac);
        Ok(())
    }

    /// First fqdn wins; it is kept ahead of the hostname
    fn add_fqdn(&mut self, fqdn: &str) -> Result<(), ComposeError> {
        if self.fqdn.is_some() {
            return Ok(());
        }
        let node = self.ai_element("fqdn")?;
        self.doc.set_text(node, fqdn);
        match self.hostname {
            Some(hostname) => self.doc.insert_before(hostname, node),
            None => self.doc.append_child(self.computing_device, node),
        }
        self.fqdn = Some(node);
        Ok(())
    }

    /// First hostname wins; it is kept after the fqdn
    fn add_hostname(&mut self, hostname: &str) -> Result<(), ComposeError> {
        if self.hostname.is_some() {
            return Ok(());
        }
        let node = self.ai_element("hostname")?;
        self.doc.set_text(node, hostname);
        match self.fqdn {
            Some(fqdn) => self.doc.insert_after(fqdn, node),
            None => self.doc.append_child(self.computing_device, node),
        }
        self.hostname = Some(node);
        Ok(())
    }
}

/// Append a new asset for the TestResult `test_result` of `results` to the
/// `assets` container of `doc`
pub fn add_asset_from_test_result(
    doc: &mut Document,
    ns: &NamespaceRegistry,
    assets: NodeId,
    results: &Document,
    test_result: NodeId,
    diagnostics: &mut Diagnostics,
) -> Result<Asset, ComposeError> {
    let id = next_asset_id(doc, assets);

    let asset = doc.create_element(ns.qname(ArfNamespace::Arf, "asset")?);
    doc.set_attribute(asset, "id", &id);
    doc.append_child(assets, asset);

    let computing_device = doc.create_element(ns.qname(ArfNamespace::Ai, "computing-device")?);
    doc.append_child(asset, computing_device);
    let connections = doc.create_element(ns.qname(ArfNamespace::Ai, "connections")?);
    doc.append_child(computing_device, connections);

    let mut builder = AssetBuilder {
        doc: &mut *doc,
        ns,
        computing_device,
        connections,
        fqdn: None,
        hostname: None,
    };

    for child in results.element_children(test_result) {
        match results.local_name(child) {
            Some("target-address") => {
                let address = results.text_content(child);
                builder.add_ip_address(&address, diagnostics)?;
            }
            Some("target-facts") => {
                for fact in results.children_named(child, "fact") {
                    let value = results.text_content(fact);
                    match results.attribute(fact, "name") {
                        Some(FACT_MAC) => builder.add_mac_address(&value)?,
                        Some(FACT_FQDN) => builder.add_fqdn(&value)?,
                        Some(FACT_HOST_NAME) => builder.add_hostname(&value)?,
                        _ => {}
                    }
                }
            }
            _ => {}
        }
    }

    if doc.children(connections).is_empty() {
        doc.detach(connections);
    }

    Ok(Asset { node: asset, id })
}
