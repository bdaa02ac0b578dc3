//! Well-known namespaces of the composite document and the registry of
//! prefixes they are declared under

use crate::api::errors::ComposeError;
use crate::xml::{Document, NodeId, QName};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ArfNamespace {
    /// Asset Reporting Format 1.1
    Arf,
    /// Reporting core 1.1
    Core,
    /// Asset identification 1.1
    Ai,
    /// ARF relationship vocabulary
    ArfVocab,
    Xlink,
}

impl ArfNamespace {
    pub const ALL: [ArfNamespace; 5] = [
        ArfNamespace::Arf,
        ArfNamespace::Core,
        ArfNamespace::Ai,
        ArfNamespace::ArfVocab,
        ArfNamespace::Xlink,
    ];

    pub const fn uri(self) -> &'static str {
        match self {
            ArfNamespace::Arf => "http://scap.nist.gov/schema/asset-reporting-format/1.1",
            ArfNamespace::Core => "http://scap.nist.gov/schema/reporting-core/1.1",
            ArfNamespace::Ai => "http://scap.nist.gov/schema/asset-identification/1.1",
            ArfNamespace::ArfVocab => {
                "http://scap.nist.gov/specifications/arf/vocabulary/relationships/1.0#"
            }
            ArfNamespace::Xlink => "http://www.w3.org/1999/xlink",
        }
    }

    /// Prefix used when this crate declares the namespace
    pub const fn conventional_prefix(self) -> &'static str {
        match self {
            ArfNamespace::Arf => "arf",
            ArfNamespace::Core => "core",
            ArfNamespace::Ai => "ai",
            ArfNamespace::ArfVocab => "arfvocab",
            ArfNamespace::Xlink => "xlink",
        }
    }
}

/// Prefixes under which the well-known namespaces are declared in one
/// composite document
#[derive(Debug, Clone, Default)]
pub struct NamespaceRegistry {
    prefixes: BTreeMap<ArfNamespace, String>,
}

impl NamespaceRegistry {
    /// Collect the declarations made on the composite root and its direct
    /// children
    pub fn from_document(doc: &Document, root: NodeId) -> Self {
        let mut prefixes = BTreeMap::new();

        for node in std::iter::once(root).chain(doc.element_children(root)) {
            let Some(element) = doc.element(node) else {
                continue;
            };
            for decl in &element.namespaces {
                let Some(prefix) = &decl.prefix else {
                    continue;
                };
                if let Some(ns) = ArfNamespace::ALL.iter().find(|ns| ns.uri() == decl.uri) {
                    prefixes.entry(*ns).or_insert_with(|| prefix.clone());
                }
            }
        }

        Self { prefixes }
    }

    pub fn contains(&self, namespace: ArfNamespace) -> bool {
        self.prefixes.contains_key(&namespace)
    }

    /// Prefix the namespace is declared under
    pub fn prefix(&self, namespace: ArfNamespace) -> Result<&str, ComposeError> {
        self.prefixes
            .get(&namespace)
            .map(String::as_str)
            .ok_or(ComposeError::NamespaceNotFound {
                uri: namespace.uri(),
            })
    }

    /// Element or attribute name in a registered namespace
    pub fn qname(&self, namespace: ArfNamespace, local: &str) -> Result<QName, ComposeError> {
        let prefix = self.prefix(namespace)?;
        Ok(QName::qualified(namespace.uri(), Some(prefix), local))
    }

    /// `prefix:value` spelling, as used for relationship types
    pub fn qualified_value(&self, namespace: ArfNamespace, value: &str) -> Result<String, ComposeError> {
        Ok(format!("{}:{}", self.prefix(namespace)?, value))
    }
}
