//! `core:relationship` entries of the composite document

use crate::api::errors::ComposeError;
use crate::namespaces::{ArfNamespace, NamespaceRegistry};
use crate::xml::{Document, NodeId};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RelationshipType {
    /// A report was produced for a report request
    CreatedFor,
    /// A report describes an asset
    IsAbout,
}

impl RelationshipType {
    pub const fn term(self) -> &'static str {
        match self {
            RelationshipType::CreatedFor => "createdFor",
            RelationshipType::IsAbout => "isAbout",
        }
    }

    pub fn from_term(term: &str) -> Option<Self> {
        match term {
            "createdFor" => Some(RelationshipType::CreatedFor),
            "isAbout" => Some(RelationshipType::IsAbout),
            _ => None,
        }
    }
}

/// Append `core:relationship type=<vocab>:<term> subject=<subject>` with a
/// single `core:ref` child holding `reference`
pub fn add_relationship(
    doc: &mut Document,
    ns: &NamespaceRegistry,
    relationships: NodeId,
    kind: RelationshipType,
    subject: &str,
    reference: &str,
) -> Result<NodeId, ComposeError> {
    let relationship = doc.create_element(ns.qname(ArfNamespace::Core, "relationship")?);
    doc.set_attribute(
        relationship,
        "type",
        &ns.qualified_value(ArfNamespace::ArfVocab, kind.term())?,
    );
    doc.set_attribute(relationship, "subject", subject);
    doc.append_text_element(relationship, ns.qname(ArfNamespace::Core, "ref")?, reference);
    doc.append_child(relationships, relationship);
    Ok(relationship)
}
