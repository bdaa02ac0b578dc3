//! Consolidated diagnostic codes and classification system
//!
//! Single source of truth for all codes emitted during composition, their
//! metadata, and classification functions.

use std::collections::HashMap;
use std::sync::OnceLock;

// ============================================================================
// CODE WRAPPER TYPE
// ============================================================================

/// Universal code wrapper for error, warning and success codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Code(&'static str);

impl Code {
    pub const fn new(code: &'static str) -> Self {
        Self(code)
    }

    pub fn as_str(&self) -> &'static str {
        self.0
    }
}

impl std::fmt::Display for Code {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// ERROR CLASSIFICATION TYPES
// ============================================================================

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Critical = 0,
    High = 1,
    Medium = 2,
    Low = 3,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Critical => "Critical",
            Severity::High => "High",
            Severity::Medium => "Medium",
            Severity::Low => "Low",
        }
    }
}

/// Complete metadata for a code
#[derive(Debug, Clone)]
pub struct ErrorMetadata {
    pub code: &'static str,
    pub category: &'static str,
    pub severity: Severity,
    pub recoverable: bool,
    pub requires_halt: bool,
    pub description: &'static str,
    pub recommended_action: &'static str,
}

impl ErrorMetadata {
    pub fn new(
        code: &'static str,
        category: &'static str,
        severity: Severity,
        recoverable: bool,
        requires_halt: bool,
        description: &'static str,
        recommended_action: &'static str,
    ) -> Self {
        Self {
            code,
            category,
            severity,
            recoverable,
            requires_halt,
            description,
            recommended_action,
        }
    }
}

// ============================================================================
// CODE CONSTANTS
// ============================================================================

/// System error codes
pub mod system {
    use super::Code;

    pub const INTERNAL_ERROR: Code = Code::new("ERR001");
    pub const INITIALIZATION_FAILURE: Code = Code::new("ERR002");
}

/// Document loading and writing codes
pub mod documents {
    use super::Code;

    pub const DOCUMENT_NOT_FOUND: Code = Code::new("E005");
    pub const DOCUMENT_TOO_LARGE: Code = Code::new("E007");
    pub const PARSE_FAILURE: Code = Code::new("E010");
    pub const IO_ERROR: Code = Code::new("E011");
    pub const MISSING_ROOT_ELEMENT: Code = Code::new("E012");
}

/// Composite document structure codes
pub mod structure {
    use super::Code;

    pub const NAMESPACE_NOT_FOUND: Code = Code::new("E020");
    pub const UNKNOWN_RESULT_ROOT: Code = Code::new("E021");
    pub const LEGACY_CHECKLIST_VERSION: Code = Code::new("W022");
    pub const TEST_RESULT_LIMIT_REACHED: Code = Code::new("W023");
}

/// Identifier allocation codes
pub mod identifiers {
    use super::Code;

    pub const IDENTIFIER_SPACE_EXHAUSTED: Code = Code::new("E030");
}

/// Asset identification codes
pub mod assets {
    use super::Code;

    pub const INVALID_IPV6_ADDRESS: Code = Code::new("W040");
}

/// Cross-reference injection codes
pub mod references {
    use super::Code;

    pub const MISSING_TARGET_ANCHOR: Code = Code::new("E050");
    pub const REPORT_CONTENT_MISSING: Code = Code::new("E051");
    pub const REPORT_CONTENT_EMPTY: Code = Code::new("E052");
    pub const TEST_RESULT_NOT_FOUND: Code = Code::new("E053");
    pub const UNRESOLVED_SUB_REPORT: Code = Code::new("W054");
    pub const SUB_REPORT_LIMIT_REACHED: Code = Code::new("W055");
}

/// Tailoring merge codes
pub mod tailoring {
    use super::Code;

    pub const TIMESTAMP_UNAVAILABLE: Code = Code::new("W060");
}

/// Sub-component export codes
pub mod export {
    use super::Code;

    pub const COMPONENT_NOT_FOUND: Code = Code::new("E070");
    pub const CONTENT_NOT_FOUND: Code = Code::new("E071");
    pub const CONTENT_EMPTY: Code = Code::new("E072");
    pub const MULTIPLE_CONTENT_ROOTS: Code = Code::new("W073");
}

// ============================================================================
// SUCCESS CODE CONSTANTS
// ============================================================================

/// Success codes
pub mod success {
    use super::Code;

    pub const SYSTEM_INITIALIZATION_COMPLETED: Code = Code::new("I004");
    pub const DOCUMENT_LOADED: Code = Code::new("I006");
    pub const SKELETON_BUILT: Code = Code::new("I010");
    pub const DATASTREAM_IMPORTED: Code = Code::new("I011");
    pub const TAILORING_MERGED: Code = Code::new("I012");
    pub const REPORT_EMBEDDED: Code = Code::new("I013");
    pub const COMPOSITION_COMPLETE: Code = Code::new("I014");
    pub const COMPONENT_EXPORTED: Code = Code::new("I015");
    pub const DOCUMENT_WRITTEN: Code = Code::new("I016");
}

// ============================================================================
// METADATA REGISTRY
// ============================================================================

static ERROR_REGISTRY: OnceLock<HashMap<&'static str, ErrorMetadata>> = OnceLock::new();

fn get_error_registry() -> &'static HashMap<&'static str, ErrorMetadata> {
    ERROR_REGISTRY.get_or_init(|| {
        use Severity::*;

        let entries = [
            // System
            ErrorMetadata::new(
                "ERR001",
                "System",
                Critical,
                false,
                true,
                "Critical internal system error",
                "Contact system administrator or file bug report",
            ),
            ErrorMetadata::new(
                "ERR002",
                "System",
                Critical,
                false,
                true,
                "Logging or configuration initialization failed",
                "Check ARF_* environment variables and the configuration file",
            ),
            // Documents
            ErrorMetadata::new(
                "E005",
                "Documents",
                High,
                false,
                true,
                "Input document could not be found",
                "Verify the path passed for the data stream, results or sub-report",
            ),
            ErrorMetadata::new(
                "E007",
                "Documents",
                High,
                false,
                true,
                "Input document exceeds the configured size limit",
                "Raise documents.max_document_size in the build profile",
            ),
            ErrorMetadata::new(
                "E010",
                "Documents",
                High,
                false,
                true,
                "Input document is not well-formed XML",
                "Validate the input document with an XML parser",
            ),
            ErrorMetadata::new(
                "E011",
                "Documents",
                High,
                false,
                true,
                "I/O error while reading or writing a document",
                "Check file permissions and available disk space",
            ),
            ErrorMetadata::new(
                "E012",
                "Documents",
                High,
                false,
                true,
                "Document has no root element",
                "Provide a document with a root element",
            ),
            // Structure
            ErrorMetadata::new(
                "E020",
                "Structure",
                Critical,
                false,
                true,
                "Required namespace is not declared in the composite document",
                "File bug report: the skeleton must declare all ARF namespaces",
            ),
            ErrorMetadata::new(
                "E021",
                "Structure",
                High,
                true,
                false,
                "Result document root is neither TestResult nor Benchmark",
                "Pass an XCCDF result document",
            ),
            ErrorMetadata::new(
                "W022",
                "Structure",
                Low,
                true,
                false,
                "XCCDF 1.1 results cannot produce a valid ARF document",
                "Convert the input to XCCDF 1.2 before exporting",
            ),
            ErrorMetadata::new(
                "W023",
                "Structure",
                Medium,
                true,
                false,
                "Benchmark contains more TestResults than the configured limit",
                "Raise composition.max_embedded_test_results",
            ),
            // Identifiers
            ErrorMetadata::new(
                "E030",
                "Identifiers",
                High,
                false,
                true,
                "No free identifier could be allocated",
                "Remove stale tailoring components from the data stream",
            ),
            // Assets
            ErrorMetadata::new(
                "W040",
                "Assets",
                Low,
                true,
                false,
                "Target address could not be expanded as IPv6",
                "Check target-address values in the TestResult",
            ),
            // References
            ErrorMetadata::new(
                "E050",
                "References",
                Medium,
                true,
                false,
                "TestResult has no target, target-address or target-facts element",
                "Fix the result content; XCCDF requires a target element",
            ),
            ErrorMetadata::new(
                "E051",
                "References",
                Medium,
                true,
                false,
                "Report has no content element",
                "Inspect the report wrapper",
            ),
            ErrorMetadata::new(
                "E052",
                "References",
                Medium,
                true,
                false,
                "Report content contains no element",
                "Inspect the embedded report",
            ),
            ErrorMetadata::new(
                "E053",
                "References",
                Medium,
                true,
                false,
                "No TestResult found in report content",
                "Inspect the embedded report",
            ),
            ErrorMetadata::new(
                "W054",
                "References",
                Low,
                true,
                false,
                "Sub-result mapping entry could not be resolved to a document",
                "Check the sub-result source and destination tables",
            ),
            ErrorMetadata::new(
                "W055",
                "References",
                Medium,
                true,
                false,
                "More sub-result documents than the configured limit",
                "Raise composition.max_sub_reports",
            ),
            // Tailoring
            ErrorMetadata::new(
                "W060",
                "Tailoring",
                Low,
                true,
                false,
                "Tailoring file timestamp could not be determined",
                "Check that the tailoring file path is readable",
            ),
            // Export
            ErrorMetadata::new(
                "E070",
                "Export",
                Medium,
                true,
                false,
                "Requested component was not found in the container",
                "List the component ids present in the ARF document",
            ),
            ErrorMetadata::new(
                "E071",
                "Export",
                Medium,
                true,
                false,
                "Component has no arf:content element",
                "Inspect the component in the ARF document",
            ),
            ErrorMetadata::new(
                "E072",
                "Export",
                Medium,
                true,
                false,
                "arf:content element has no child element",
                "Inspect the component in the ARF document",
            ),
            ErrorMetadata::new(
                "W073",
                "Export",
                Low,
                true,
                false,
                "arf:content holds multiple elements; only the last one is used",
                "Inspect the component in the ARF document",
            ),
            // Success
            ErrorMetadata::new(
                "I004",
                "System",
                Low,
                true,
                false,
                "Logging system initialized",
                "Continue",
            ),
            ErrorMetadata::new(
                "I006",
                "Documents",
                Low,
                true,
                false,
                "Document loaded",
                "Continue",
            ),
            ErrorMetadata::new(
                "I010",
                "Composition",
                Low,
                true,
                false,
                "Composite skeleton built",
                "Continue to data stream import",
            ),
            ErrorMetadata::new(
                "I011",
                "Composition",
                Low,
                true,
                false,
                "Source data stream imported as report request",
                "Continue to tailoring merge",
            ),
            ErrorMetadata::new(
                "I012",
                "Composition",
                Low,
                true,
                false,
                "Tailoring embedded into the source data stream",
                "Continue to result processing",
            ),
            ErrorMetadata::new(
                "I013",
                "Composition",
                Low,
                true,
                false,
                "Report embedded",
                "Continue",
            ),
            ErrorMetadata::new(
                "I014",
                "Composition",
                Low,
                true,
                false,
                "Composite document finalized",
                "Hand the document to the writer",
            ),
            ErrorMetadata::new(
                "I015",
                "Export",
                Low,
                true,
                false,
                "Component content exported",
                "Continue",
            ),
            ErrorMetadata::new(
                "I016",
                "Documents",
                Low,
                true,
                false,
                "Document written",
                "Continue",
            ),
        ];

        entries.into_iter().map(|meta| (meta.code, meta)).collect()
    })
}

// ============================================================================
// CLASSIFICATION FUNCTIONS
// ============================================================================

/// Get metadata for a specific code
pub fn get_error_metadata(code: &str) -> Option<&'static ErrorMetadata> {
    get_error_registry().get(code)
}

/// Get severity from code
pub fn get_severity(code: &str) -> Severity {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.severity)
        .unwrap_or(Severity::Medium)
}

/// Check if the condition is recoverable
pub fn is_recoverable(code: &str) -> bool {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.recoverable)
        .unwrap_or(true)
}

/// Check if the condition requires aborting the composition
pub fn requires_halt(code: &str) -> bool {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.requires_halt)
        .unwrap_or(false)
}

/// Get human-readable description for code
pub fn get_description(code: &str) -> &'static str {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.description)
        .unwrap_or("Unknown error")
}

/// Get recommended action for code
pub fn get_action(code: &str) -> &'static str {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.recommended_action)
        .unwrap_or("No specific action available")
}

/// Get category from code
pub fn get_category(code: &str) -> &'static str {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.category)
        .unwrap_or("Unknown")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_constant_has_metadata() {
        let codes = [
            system::INTERNAL_ERROR,
            system::INITIALIZATION_FAILURE,
            documents::DOCUMENT_NOT_FOUND,
            documents::DOCUMENT_TOO_LARGE,
            documents::PARSE_FAILURE,
            documents::IO_ERROR,
            documents::MISSING_ROOT_ELEMENT,
            structure::NAMESPACE_NOT_FOUND,
            structure::UNKNOWN_RESULT_ROOT,
            structure::LEGACY_CHECKLIST_VERSION,
            structure::TEST_RESULT_LIMIT_REACHED,
            identifiers::IDENTIFIER_SPACE_EXHAUSTED,
            assets::INVALID_IPV6_ADDRESS,
            references::MISSING_TARGET_ANCHOR,
            references::REPORT_CONTENT_MISSING,
            references::REPORT_CONTENT_EMPTY,
            references::TEST_RESULT_NOT_FOUND,
            references::UNRESOLVED_SUB_REPORT,
            references::SUB_REPORT_LIMIT_REACHED,
            tailoring::TIMESTAMP_UNAVAILABLE,
            export::COMPONENT_NOT_FOUND,
            export::CONTENT_NOT_FOUND,
            export::CONTENT_EMPTY,
            export::MULTIPLE_CONTENT_ROOTS,
            success::SYSTEM_INITIALIZATION_COMPLETED,
            success::DOCUMENT_LOADED,
            success::SKELETON_BUILT,
            success::DATASTREAM_IMPORTED,
            success::TAILORING_MERGED,
            success::REPORT_EMBEDDED,
            success::COMPOSITION_COMPLETE,
            success::COMPONENT_EXPORTED,
            success::DOCUMENT_WRITTEN,
        ];

        for code in codes {
            assert!(
                get_error_metadata(code.as_str()).is_some(),
                "missing metadata for {}",
                code
            );
        }
    }

    #[test]
    fn test_injection_failures_do_not_halt() {
        assert!(!requires_halt(references::MISSING_TARGET_ANCHOR.as_str()));
        assert!(is_recoverable(references::MISSING_TARGET_ANCHOR.as_str()));
        assert!(requires_halt(documents::PARSE_FAILURE.as_str()));
    }

    #[test]
    fn test_unknown_code_defaults() {
        assert_eq!(get_description("X999"), "Unknown error");
        assert_eq!(get_category("X999"), "Unknown");
        assert_eq!(get_severity("X999"), Severity::Medium);
    }
}
