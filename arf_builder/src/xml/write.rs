//! Serializing documents

use super::error::XmlError;
use super::tree::{Document, NodeId, NodeKind};
use std::fmt::Write as _;
use std::path::Path;

const INDENT: &str = "  ";

impl Document {
    /// Serialize with an XML declaration. With `indent`, elements whose
    /// children are all non-text nodes put each child on its own line.
    pub fn to_xml_string(&self, indent: bool) -> String {
        let mut out = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
        for node in self.top_level() {
            self.write_node(&mut out, *node, 0, indent);
            out.push('\n');
        }
        out
    }

    /// Serialize a single subtree without an XML declaration
    pub fn node_to_string(&self, node: NodeId) -> String {
        let mut out = String::new();
        self.write_node(&mut out, node, 0, false);
        out
    }

    /// Write the document to a file
    pub fn write_to(&self, path: impl AsRef<Path>, indent: bool) -> Result<(), XmlError> {
        std::fs::write(path, self.to_xml_string(indent))?;
        Ok(())
    }

    fn write_node(&self, out: &mut String, node: NodeId, depth: usize, indent: bool) {
        match self.kind(node) {
            NodeKind::Text(text) => out.push_str(&escape_text(text)),
            NodeKind::Comment(text) => {
                let _ = write!(out, "<!--{}-->", text);
            }
            NodeKind::ProcessingInstruction { target, data } => match data {
                Some(data) => {
                    let _ = write!(out, "<?{} {}?>", target, data);
                }
                None => {
                    let _ = write!(out, "<?{}?>", target);
                }
            },
            NodeKind::Element(element) => {
                out.push('<');
                out.push_str(&element.name.lexical());

                for decl in &element.namespaces {
                    match &decl.prefix {
                        Some(prefix) => {
                            let _ = write!(out, " xmlns:{}=\"{}\"", prefix, escape_attribute(&decl.uri));
                        }
                        None => {
                            let _ = write!(out, " xmlns=\"{}\"", escape_attribute(&decl.uri));
                        }
                    }
                }

                for attribute in &element.attributes {
                    let _ = write!(
                        out,
                        " {}=\"{}\"",
                        attribute.name.lexical(),
                        escape_attribute(&attribute.value)
                    );
                }

                let children = self.children(node);
                if children.is_empty() {
                    out.push_str("/>");
                    return;
                }
                out.push('>');

                let format = indent
                    && children
                        .iter()
                        .all(|c| !matches!(self.kind(*c), NodeKind::Text(_)));

                for child in children {
                    if format {
                        out.push('\n');
                        out.push_str(&INDENT.repeat(depth + 1));
                    }
                    self.write_node(out, *child, depth + 1, indent);
                }

                if format {
                    out.push('\n');
                    out.push_str(&INDENT.repeat(depth));
                }
                let _ = write!(out, "</{}>", element.name.lexical());
            }
        }
    }
}

fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '\r' => out.push_str("&#13;"),
            _ => out.push(c),
        }
    }
    out
}

fn escape_attribute(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\n' => out.push_str("&#10;"),
            '\r' => out.push_str("&#13;"),
            '\t' => out.push_str("&#9;"),
            _ => out.push(c),
        }
    }
    out
}
