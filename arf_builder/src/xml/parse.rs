//! Loading documents with `roxmltree`

use super::error::XmlError;
use super::tree::{Document, NodeId, QName, XML_NAMESPACE};
use arf_core::config::compile_time::documents::MAX_TREE_DEPTH;

/// Parse a document from text. DTDs are accepted; blank text is dropped
/// only from element-only content so the writer can re-indent it.
pub fn parse_str(text: &str) -> Result<Document, XmlError> {
    let options = roxmltree::ParsingOptions {
        allow_dtd: true,
        ..roxmltree::ParsingOptions::default()
    };
    let source = roxmltree::Document::parse_with_options(text, options)?;

    let mut doc = Document::new();
    let mut has_root = false;

    for node in source.root().children() {
        match node.node_type() {
            roxmltree::NodeType::Element => {
                let root = import_element(&mut doc, node, None, 1)?;
                doc.set_root(root);
                has_root = true;
            }
            roxmltree::NodeType::Comment => {
                let comment = doc.create_comment(node.text().unwrap_or_default());
                doc.push_top_level(comment);
            }
            roxmltree::NodeType::PI => {
                if let Some(pi) = node.pi() {
                    let id = doc.create_processing_instruction(pi.target, pi.value);
                    doc.push_top_level(id);
                }
            }
            _ => {}
        }
    }

    if !has_root {
        return Err(XmlError::MissingRoot);
    }

    Ok(doc)
}

/// Parse a document from raw bytes, which must be UTF-8
pub fn parse_bytes(bytes: &[u8]) -> Result<Document, XmlError> {
    let text = std::str::from_utf8(bytes)?;
    parse_str(text.strip_prefix('\u{feff}').unwrap_or(text))
}

fn import_element(
    doc: &mut Document,
    node: roxmltree::Node<'_, '_>,
    parent: Option<roxmltree::Node<'_, '_>>,
    depth: usize,
) -> Result<NodeId, XmlError> {
    if depth > MAX_TREE_DEPTH {
        return Err(XmlError::TooDeep {
            limit: MAX_TREE_DEPTH,
        });
    }

    let tag = node.tag_name();
    let name = match tag.namespace().filter(|uri| !uri.is_empty()) {
        Some(uri) => QName {
            namespace: Some(uri.to_string()),
            prefix: element_prefix(node, uri),
            local: tag.name().to_string(),
        },
        None => QName::local(tag.name()),
    };
    let id = doc.create_element(name);

    for (prefix, uri) in local_declarations(node, parent) {
        doc.declare_namespace(id, prefix.as_deref(), &uri);
    }

    for attribute in node.attributes() {
        let name = match attribute.namespace().filter(|uri| !uri.is_empty()) {
            Some(uri) => QName {
                namespace: Some(uri.to_string()),
                prefix: attribute_prefix(node, uri),
                local: attribute.name().to_string(),
            },
            None => QName::local(attribute.name()),
        };
        doc.set_attribute_qualified(id, name, attribute.value());
    }

    // Mixed content keeps its blank text
    let element_only = node.children().any(|c| c.is_element())
        && !node
            .children()
            .any(|c| c.is_text() && !c.text().unwrap_or_default().trim().is_empty());

    for child in node.children() {
        match child.node_type() {
            roxmltree::NodeType::Element => {
                let child_id = import_element(doc, child, Some(node), depth + 1)?;
                doc.append_child(id, child_id);
            }
            roxmltree::NodeType::Text => {
                let text = child.text().unwrap_or_default();
                if element_only && text.trim().is_empty() {
                    continue;
                }
                let text_id = doc.create_text(text);
                doc.append_child(id, text_id);
            }
            roxmltree::NodeType::Comment => {
                let comment = doc.create_comment(child.text().unwrap_or_default());
                doc.append_child(id, comment);
            }
            roxmltree::NodeType::PI => {
                if let Some(pi) = child.pi() {
                    let pi_id = doc.create_processing_instruction(pi.target, pi.value);
                    doc.append_child(id, pi_id);
                }
            }
            roxmltree::NodeType::Root => {}
        }
    }

    Ok(id)
}

/// Prefix to spell an element in `uri`; the default namespace wins when it matches
fn element_prefix(node: roxmltree::Node<'_, '_>, uri: &str) -> Option<String> {
    let mut named = None;
    for ns in node.namespaces() {
        if ns.uri() != uri {
            continue;
        }
        match ns.name() {
            None => return None,
            Some(prefix) if named.is_none() => named = Some(prefix.to_string()),
            Some(_) => {}
        }
    }
    named
}

fn attribute_prefix(node: roxmltree::Node<'_, '_>, uri: &str) -> Option<String> {
    if uri == XML_NAMESPACE {
        return Some("xml".to_string());
    }
    node.namespaces()
        .filter(|ns| ns.uri() == uri)
        .find_map(|ns| ns.name().map(str::to_string))
}

/// Declarations made on `node` itself: its in-scope set minus its parent's
fn local_declarations(
    node: roxmltree::Node<'_, '_>,
    parent: Option<roxmltree::Node<'_, '_>>,
) -> Vec<(Option<String>, String)> {
    let in_parent = |prefix: Option<&str>, uri: &str| {
        parent.is_some_and(|p| {
            p.namespaces()
                .any(|ns| ns.name() == prefix && ns.uri() == uri)
        })
    };

    let mut declarations: Vec<(Option<String>, String)> = node
        .namespaces()
        .filter(|ns| ns.name() != Some("xml"))
        .filter(|ns| !in_parent(ns.name(), ns.uri()))
        .map(|ns| (ns.name().map(str::to_string), ns.uri().to_string()))
        .collect();

    let parent_default = parent.and_then(|p| p.namespaces().find(|ns| ns.name().is_none()));
    let own_default = node.namespaces().any(|ns| ns.name().is_none());
    if parent_default.is_some() && !own_default {
        declarations.push((None, String::new()));
    }

    declarations
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_parse_keeps_prefixes_and_declarations() {
        let doc = parse_str(
            r#"<?xml version="1.0"?>
            <ds:data-stream-collection xmlns:ds="urn:ds" xmlns:xlink="http://www.w3.org/1999/xlink" id="c1">
              <ds:component id="x"><inner xmlns="urn:inner"><leaf/></inner></ds:component>
            </ds:data-stream-collection>"#,
        )
        .unwrap();

        let root = doc.root().unwrap();
        assert_eq!(doc.name(root).unwrap().lexical(), "ds:data-stream-collection");
        assert_eq!(doc.element(root).unwrap().namespaces.len(), 2);
        assert_eq!(doc.attribute(root, "id"), Some("c1"));

        let component = doc.first_child_named(root, "component").unwrap();
        assert!(doc.element(component).unwrap().namespaces.is_empty());

        let inner = doc.first_child_named(component, "inner").unwrap();
        assert_eq!(doc.namespace(inner), Some("urn:inner"));
        assert_eq!(doc.name(inner).unwrap().prefix, None);
        let leaf = doc.first_child_named(inner, "leaf").unwrap();
        assert!(doc.element(leaf).unwrap().namespaces.is_empty());
    }

    #[test]
    fn test_parse_drops_blank_text_between_elements() {
        let doc = parse_str("<a>\n  <b> keep </b>\n</a>").unwrap();
        let root = doc.root().unwrap();
        assert_eq!(doc.children(root).len(), 1);
        let b = doc.first_child_named(root, "b").unwrap();
        assert_eq!(doc.text_content(b), " keep ");
    }

    #[test]
    fn test_parse_keeps_blank_text_in_mixed_content() {
        let doc = parse_str(
            "<p>Run <code>a</code> <code>b</code> now\n  <em>x</em>\n</p>",
        )
        .unwrap();
        let root = doc.root().unwrap();
        assert_eq!(doc.children(root).len(), 7);
        assert_eq!(doc.text_content(root), "Run a b now\n  x\n");
    }

    #[test]
    fn test_parse_records_default_undeclaration() {
        let doc = parse_str(r#"<a xmlns="urn:a"><b xmlns=""/></a>"#).unwrap();
        let root = doc.root().unwrap();
        let b = doc.first_child_named(root, "b").unwrap();
        assert_eq!(doc.namespace(b), None);
        assert_eq!(doc.element(b).unwrap().namespaces[0].uri, "");
    }

    #[test]
    fn test_parse_namespaced_attribute() {
        let doc = parse_str(
            r##"<r xmlns:xlink="http://www.w3.org/1999/xlink"><c xlink:href="#a" xml:lang="en"/></r>"##,
        )
        .unwrap();
        let c = doc.first_child_named(doc.root().unwrap(), "c").unwrap();
        assert_eq!(
            doc.attribute_ns(c, "http://www.w3.org/1999/xlink", "href"),
            Some("#a")
        );
        assert_eq!(doc.attribute_ns(c, XML_NAMESPACE, "lang"), Some("en"));
    }

    #[test]
    fn test_parse_errors() {
        assert_matches!(parse_str("<a><b></a>"), Err(XmlError::Parse { .. }));
        assert_matches!(parse_bytes(&[0x3c, 0xff, 0xfe]), Err(XmlError::InvalidUtf8(_)));
    }

    #[test]
    fn test_parse_rejects_excessive_depth() {
        let depth = MAX_TREE_DEPTH + 1;
        let text = format!("{}{}", "<a>".repeat(depth), "</a>".repeat(depth));
        assert_matches!(parse_str(&text), Err(XmlError::TooDeep { .. }));
    }
}
