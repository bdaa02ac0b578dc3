//! # Document Tree
//!
//! Owned, mutable XML documents: parsing through `roxmltree`, an arena tree
//! that supports cross-document copies, namespace reconciliation, and a
//! formatting writer.

pub mod error;
mod namespace;
mod parse;
mod tree;
mod write;

pub use error::XmlError;
pub use parse::{parse_bytes, parse_str};
pub use tree::{
    Attribute, Document, Element, NamespaceDecl, NodeId, NodeKind, QName, XML_NAMESPACE,
};
