//! Empty asset report collection

use crate::namespaces::{ArfNamespace, NamespaceRegistry};
use crate::xml::{Document, NodeId, QName};

/// Identifier of the single report request
pub const REPORT_REQUEST_ID: &str = "collection1";

/// Handles to the fixed parts of a composite document
#[derive(Debug, Clone, Copy)]
pub struct Skeleton {
    pub root: NodeId,
    pub relationships: NodeId,
    pub report_requests: NodeId,
    pub report_request: NodeId,
    /// `arf:content` of the report request; the data stream goes here
    pub request_content: NodeId,
    pub assets: NodeId,
    pub reports: NodeId,
}

fn named(ns: ArfNamespace, local: &str) -> QName {
    QName::qualified(ns.uri(), Some(ns.conventional_prefix()), local)
}

/// Build the collection with its four containers in schema order:
/// relationships, report-requests, assets, reports
pub fn build_skeleton() -> (Document, Skeleton, NamespaceRegistry) {
    let (mut doc, root) = Document::with_root(named(ArfNamespace::Arf, "asset-report-collection"));
    for ns in [ArfNamespace::Arf, ArfNamespace::Core, ArfNamespace::Ai] {
        doc.declare_namespace(root, Some(ns.conventional_prefix()), ns.uri());
    }

    let relationships = doc.create_element(named(ArfNamespace::Core, "relationships"));
    doc.declare_namespace(
        relationships,
        Some(ArfNamespace::ArfVocab.conventional_prefix()),
        ArfNamespace::ArfVocab.uri(),
    );
    doc.append_child(root, relationships);

    let report_requests = doc.create_element(named(ArfNamespace::Arf, "report-requests"));
    doc.append_child(root, report_requests);
    let report_request = doc.create_element(named(ArfNamespace::Arf, "report-request"));
    doc.set_attribute(report_request, "id", REPORT_REQUEST_ID);
    doc.append_child(report_requests, report_request);
    let request_content = doc.create_element(named(ArfNamespace::Arf, "content"));
    doc.append_child(report_request, request_content);

    let assets = doc.create_element(named(ArfNamespace::Arf, "assets"));
    doc.append_child(root, assets);
    let reports = doc.create_element(named(ArfNamespace::Arf, "reports"));
    doc.append_child(root, reports);

    let registry = NamespaceRegistry::from_document(&doc, root);
    let skeleton = Skeleton {
        root,
        relationships,
        report_requests,
        report_request,
        request_content,
        assets,
        reports,
    };
    (doc, skeleton, registry)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_container_order_and_namespaces() {
        let (doc, skeleton, registry) = build_skeleton();

        let names: Vec<&str> = doc
            .element_children(skeleton.root)
            .filter_map(|c| doc.local_name(c))
            .collect();
        assert_eq!(names, ["relationships", "report-requests", "assets", "reports"]);

        for ns in [
            ArfNamespace::Arf,
            ArfNamespace::Core,
            ArfNamespace::Ai,
            ArfNamespace::ArfVocab,
        ] {
            assert!(registry.contains(ns), "{:?} not registered", ns);
        }
        assert!(!registry.contains(ArfNamespace::Xlink));
        assert_eq!(doc.attribute(skeleton.report_request, "id"), Some("collection1"));
    }

    #[test]
    fn test_serialized_skeleton() {
        let (doc, _, _) = build_skeleton();
        let out = doc.to_xml_string(false);
        assert!(out.contains(
            r#"<arf:asset-report-collection xmlns:arf="http://scap.nist.gov/schema/asset-reporting-format/1.1" xmlns:core="http://scap.nist.gov/schema/reporting-core/1.1" xmlns:ai="http://scap.nist.gov/schema/asset-identification/1.1">"#
        ));
        assert!(out.contains(
            r#"<core:relationships xmlns:arfvocab="http://scap.nist.gov/specifications/arf/vocabulary/relationships/1.0#"/>"#
        ));
    }
}
