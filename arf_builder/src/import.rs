//! Moving subtrees between documents
//!
//! Every import ends with namespace reconciliation of the new subtree so
//! that names keep their namespace URIs under their new ancestors.

use crate::xml::{Document, NodeId};

/// Deep-copy `node` of `source` and append it under `parent`; the source is
/// left untouched
pub fn clone_into(target: &mut Document, parent: NodeId, source: &Document, node: NodeId) -> NodeId {
    let copy = target.import_node(source, node);
    target.append_child(parent, copy);
    target.reconcile_namespaces(copy);
    copy
}

/// Move `node` out of `source` and append it under `parent` without copying
/// it; afterwards the source no longer contains the node
pub fn adopt_into(target: &mut Document, parent: NodeId, source: &mut Document, node: NodeId) -> NodeId {
    let moved = target.adopt_node(source, node);
    target.append_child(parent, moved);
    target.reconcile_namespaces(moved);
    moved
}

/// Standalone document whose root is a copy of `node`
pub fn wrap_as_document(source: &Document, node: NodeId) -> Document {
    let mut doc = Document::new();
    let root = doc.import_node(source, node);
    doc.set_root(root);
    doc.reconcile_namespaces(root);
    doc
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xml::{parse_str, QName};

    const SOURCE: &str = r#"<ds:data-stream-collection xmlns:ds="urn:ds" xmlns:x="urn:x">
        <ds:component id="c1"><x:Benchmark x:id="b"/></ds:component>
      </ds:data-stream-collection>"#;

    #[test]
    fn test_clone_keeps_source() {
        let source = parse_str(SOURCE).unwrap();
        let before = source.to_xml_string(false);
        let (mut target, root) = Document::with_root(QName::local("bundle"));

        let copy = clone_into(&mut target, root, &source, source.root().unwrap());

        assert_eq!(source.to_xml_string(false), before);
        assert_eq!(target.parent(copy), Some(root));
        assert_eq!(target.lookup_namespace_uri(copy, Some("ds")), Some("urn:ds"));
    }

    #[test]
    fn test_adopt_detaches_source_root() {
        let mut source = parse_str(SOURCE).unwrap();
        let root_of_source = source.root().unwrap();
        let (mut target, root) = Document::with_root(QName::local("bundle"));

        adopt_into(&mut target, root, &mut source, root_of_source);

        assert!(source.root().is_none());
        assert_eq!(target.element_children(root).count(), 1);
    }

    #[test]
    fn test_wrapped_inner_node_declares_inherited_namespaces() {
        let source = parse_str(SOURCE).unwrap();
        let benchmark = source
            .descendants(source.root().unwrap())
            .into_iter()
            .find(|n| source.has_local_name(*n, "Benchmark"))
            .unwrap();

        let wrapped = wrap_as_document(&source, benchmark);
        let out = wrapped.to_xml_string(false);

        assert!(out.contains(r#"xmlns:x="urn:x""#));
        assert!(!out.contains("urn:ds"));
    }
}
