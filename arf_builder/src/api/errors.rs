//! # Composition Errors

use crate::xml::XmlError;
use arf_core::logging::codes;
use arf_core::Code;

/// Fatal errors raised while composing or exporting an ARF document
#[derive(Debug, thiserror::Error)]
pub enum ComposeError {
    /// Error from the document tree layer
    #[error("XML error: {0}")]
    Xml(#[from] XmlError),

    /// Input document could not be loaded
    #[error("Failed to load {role} document '{path}': {source}")]
    DocumentLoad {
        role: &'static str,
        path: String,
        #[source]
        source: XmlError,
    },

    /// Input file does not exist
    #[error("File not found: {path}")]
    FileNotFound { path: String },

    /// Input file exceeds the configured size limit
    #[error("Document '{path}' is {size} bytes, limit is {limit}")]
    DocumentTooLarge { path: String, size: u64, limit: u64 },

    /// Input document has no root element
    #[error("The {role} document has no root element")]
    EmptyDocument { role: &'static str },

    /// Namespace expected in the composite document is not declared
    #[error("Namespace '{uri}' is not declared in the composite document")]
    NamespaceNotFound { uri: &'static str },

    /// Result document root is neither TestResult nor Benchmark
    #[error("Unknown root element '{element}' in given XCCDF result document, expected TestResult or Benchmark")]
    UnknownResultRoot { element: String },

    /// No free identifier could be found for a generated id
    #[error("No free identifier for '{base}' after {attempts} attempts")]
    IdentifierSpaceExhausted { base: String, attempts: usize },

    /// Generated identifier base exceeds the length limit
    #[error("Generated identifier is {length} characters, limit is {limit}")]
    IdentifierTooLong { length: usize, limit: usize },

    /// Requested component is not present in the container
    #[error("Could not find any {component} of id '{id}' in {container}")]
    ComponentNotFound {
        container: String,
        component: String,
        id: String,
    },

    /// Component has no arf:content child
    #[error("Component '{id}' has no 'arf:content' node inside")]
    ContentNotFound { id: String },

    /// arf:content has no element child
    #[error("Could not find any child inside 'arf:content' node when looking for '{id}'")]
    EmptyContent { id: String },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ComposeError {
    /// Check if this error only affects one export and the caller may continue
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            ComposeError::ComponentNotFound { .. }
                | ComposeError::ContentNotFound { .. }
                | ComposeError::EmptyContent { .. }
                | ComposeError::UnknownResultRoot { .. }
        )
    }

    /// Diagnostic code matching this error
    pub fn code(&self) -> Code {
        match self {
            ComposeError::Xml(XmlError::MissingRoot) | ComposeError::EmptyDocument { .. } => {
                codes::documents::MISSING_ROOT_ELEMENT
            }
            ComposeError::Xml(XmlError::Io(_)) | ComposeError::Io(_) => codes::documents::IO_ERROR,
            ComposeError::Xml(_) | ComposeError::DocumentLoad { .. } => {
                codes::documents::PARSE_FAILURE
            }
            ComposeError::FileNotFound { .. } => codes::documents::DOCUMENT_NOT_FOUND,
            ComposeError::DocumentTooLarge { .. } => codes::documents::DOCUMENT_TOO_LARGE,
            ComposeError::NamespaceNotFound { .. } => codes::structure::NAMESPACE_NOT_FOUND,
            ComposeError::UnknownResultRoot { .. } => codes::structure::UNKNOWN_RESULT_ROOT,
            ComposeError::IdentifierSpaceExhausted { .. } | ComposeError::IdentifierTooLong { .. } => {
                codes::identifiers::IDENTIFIER_SPACE_EXHAUSTED
            }
            ComposeError::ComponentNotFound { .. } => codes::export::COMPONENT_NOT_FOUND,
            ComposeError::ContentNotFound { .. } => codes::export::CONTENT_NOT_FOUND,
            ComposeError::EmptyContent { .. } => codes::export::CONTENT_EMPTY,
        }
    }

    /// Get a user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            ComposeError::DocumentLoad { role, path, source } => {
                format!("Could not read the {} file {}: {}", role, path, source)
            }
            ComposeError::FileNotFound { path } => format!("File not found: {}", path),
            ComposeError::DocumentTooLarge { path, limit, .. } => {
                format!("{} is larger than the {} byte limit", path, limit)
            }
            ComposeError::UnknownResultRoot { element } => format!(
                "The result file is rooted at '{}'; pass an XCCDF TestResult or Benchmark",
                element
            ),
            ComposeError::IdentifierSpaceExhausted { base, .. } => format!(
                "Too many tailoring components named like '{}' already exist",
                base
            ),
            other => other.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recoverable_classification() {
        assert!(ComposeError::ContentNotFound { id: "x".into() }.is_recoverable());
        assert!(!ComposeError::NamespaceNotFound { uri: "urn:x" }.is_recoverable());
        assert!(!ComposeError::Xml(XmlError::MissingRoot).is_recoverable());
    }

    #[test]
    fn test_codes_match_registry() {
        let error = ComposeError::IdentifierSpaceExhausted {
            base: "scap_org.open-scap_comp_t.xml_tailoring".into(),
            attempts: 1000,
        };
        assert_eq!(error.code().as_str(), "E030");
        assert_eq!(
            ComposeError::Xml(XmlError::MissingRoot).code(),
            codes::documents::MISSING_ROOT_ELEMENT
        );
    }

    #[test]
    fn test_user_message() {
        let error = ComposeError::UnknownResultRoot {
            element: "oval_results".into(),
        };
        assert!(error.user_message().contains("oval_results"));
    }
}
