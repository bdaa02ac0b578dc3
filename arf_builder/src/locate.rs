//! Read-only lookups of containers and components by local name

use crate::xml::{Document, NodeId};

/// Direct child of the root element with the given local name
pub fn locate_container(doc: &Document, container: &str) -> Option<NodeId> {
    doc.first_child_named(doc.root()?, container)
}

/// Child of `container` with the given local name and `id` attribute
pub fn locate_component(doc: &Document, container: &str, component: &str, id: &str) -> Option<NodeId> {
    let container = locate_container(doc, container)?;
    doc.children_named(container, component)
        .find(|candidate| doc.attribute(*candidate, "id") == Some(id))
}

/// The `content` child of a report or report request
pub fn inner_content(doc: &Document, parent: NodeId) -> Option<NodeId> {
    doc.first_child_named(parent, "content")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xml::parse_str;

    const ARF: &str = r#"<arf:asset-report-collection xmlns:arf="http://scap.nist.gov/schema/asset-reporting-format/1.1">
        <arf:reports>
          <arf:report id="xccdf1"><arf:content><TestResult/></arf:content></arf:report>
          <arf:report id="oval0"><arf:content><oval_results/></arf:content></arf:report>
        </arf:reports>
      </arf:asset-report-collection>"#;

    #[test]
    fn test_locate_component_by_id() {
        let doc = parse_str(ARF).unwrap();
        let report = locate_component(&doc, "reports", "report", "oval0").unwrap();
        let content = inner_content(&doc, report).unwrap();
        let inner = doc.element_children(content).next().unwrap();
        assert_eq!(doc.local_name(inner), Some("oval_results"));
    }

    #[test]
    fn test_absent_is_none() {
        let doc = parse_str(ARF).unwrap();
        assert!(locate_container(&doc, "assets").is_none());
        assert!(locate_component(&doc, "reports", "report", "xccdf9").is_none());
        assert!(locate_component(&doc, "reports", "asset", "xccdf1").is_none());
    }
}
