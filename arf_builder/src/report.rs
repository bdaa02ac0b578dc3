//! `arf:report` creation

use crate::api::errors::ComposeError;
use crate::import::clone_into;
use crate::namespaces::{ArfNamespace, NamespaceRegistry};
use crate::xml::{Document, NodeId};

/// Append `arf:report id=<report_id>` to `reports`, holding an `arf:content`
/// with a copy of the root element of `source`. Returns the report node.
pub fn create_report(
    doc: &mut Document,
    ns: &NamespaceRegistry,
    reports: NodeId,
    source: &Document,
    report_id: &str,
) -> Result<NodeId, ComposeError> {
    let source_root = source
        .root()
        .ok_or(ComposeError::EmptyDocument { role: "report" })?;

    let report = doc.create_element(ns.qname(ArfNamespace::Arf, "report")?);
    doc.set_attribute(report, "id", report_id);
    let content = doc.create_element(ns.qname(ArfNamespace::Arf, "content")?);
    doc.append_child(report, content);
    doc.append_child(reports, report);

    clone_into(doc, content, source, source_root);
    Ok(report)
}
