//! # Reference Injection
//!
//! Links an embedded XCCDF TestResult back into the composite document:
//! a `target-id-ref` pointing at the asset, and `check-content-ref` hrefs
//! rewritten to `#<report id>` for sub-reports embedded alongside it.

use crate::locate::inner_content;
use crate::namespaces::ArfNamespace;
use crate::subreports::SubReportIndex;
use crate::xml::{Document, NodeId, QName};
use arf_core::logging::codes;
use arf_core::Code;

/// Per-report injection failures; composition continues past them
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InjectError {
    #[error("Report '{report_id}' has no content element")]
    MissingContent { report_id: String },

    #[error("Content of report '{report_id}' holds no element")]
    EmptyContent { report_id: String },

    #[error("Report '{report_id}' holds '{element}', expected TestResult or Benchmark")]
    UnexpectedContent { report_id: String, element: String },

    #[error("No TestResult found in report '{report_id}'")]
    TestResultNotFound { report_id: String },

    #[error("TestResult in report '{report_id}' has no target, target-address or target-facts element")]
    MissingTargetAnchor { report_id: String },
}

impl InjectError {
    pub fn code(&self) -> Code {
        match self {
            InjectError::MissingContent { .. } => codes::references::REPORT_CONTENT_MISSING,
            InjectError::EmptyContent { .. } => codes::references::REPORT_CONTENT_EMPTY,
            InjectError::UnexpectedContent { .. } | InjectError::TestResultNotFound { .. } => {
                codes::references::TEST_RESULT_NOT_FOUND
            }
            InjectError::MissingTargetAnchor { .. } => codes::references::MISSING_TARGET_ANCHOR,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct InjectOutcome {
    /// False when an equal `target-id-ref` was already present
    pub target_ref_inserted: bool,
    pub rewritten_hrefs: usize,
}

const ANCHOR_NAMES: [&str; 3] = ["target", "target-address", "target-facts"];

/// TestResult held by a report: the first TestResult inside `arf:content`,
/// otherwise the last TestResult of a Benchmark found there
pub fn find_test_result(doc: &Document, report: NodeId, report_id: &str) -> Result<NodeId, InjectError> {
    let content = inner_content(doc, report).ok_or_else(|| InjectError::MissingContent {
        report_id: report_id.to_string(),
    })?;

    let mut inner = None;
    for child in doc.element_children(content) {
        inner = Some(child);
        if doc.has_local_name(child, "TestResult") {
            return Ok(child);
        }
    }
    let inner = inner.ok_or_else(|| InjectError::EmptyContent {
        report_id: report_id.to_string(),
    })?;

    if !doc.has_local_name(inner, "Benchmark") {
        return Err(InjectError::UnexpectedContent {
            report_id: report_id.to_string(),
            element: doc.local_name(inner).unwrap_or_default().to_string(),
        });
    }

    doc.last_child_named(inner, "TestResult")
        .ok_or_else(|| InjectError::TestResultNotFound {
            report_id: report_id.to_string(),
        })
}

/// Insert `target-id-ref system=<ai> name=<asset_id> href=""` after the last
/// target element of the TestResult. Returns false when an equal reference
/// already follows the anchor.
pub fn inject_target_id_ref(
    doc: &mut Document,
    test_result: NodeId,
    asset_id: &str,
    report_id: &str,
) -> Result<bool, InjectError> {
    let anchor = doc
        .element_children(test_result)
        .filter(|child| ANCHOR_NAMES.iter().any(|name| doc.has_local_name(*child, name)))
        .last()
        .ok_or_else(|| InjectError::MissingTargetAnchor {
            report_id: report_id.to_string(),
        })?;

    for sibling in doc.following_element_siblings(anchor) {
        if !doc.has_local_name(sibling, "target-id-ref") {
            break;
        }
        if doc.attribute(sibling, "system") == Some(ArfNamespace::Ai.uri())
            && doc.attribute(sibling, "name") == Some(asset_id)
        {
            return Ok(false);
        }
    }

    let name = match doc.name(anchor) {
        Some(anchor_name) => QName {
            local: "target-id-ref".to_string(),
            ..anchor_name.clone()
        },
        None => QName::local("target-id-ref"),
    };
    let reference = doc.create_element(name);
    doc.set_attribute(reference, "system", ArfNamespace::Ai.uri());
    doc.set_attribute(reference, "name", asset_id);
    doc.set_attribute(reference, "href", "");
    doc.insert_after(anchor, reference);
    Ok(true)
}

/// Point `check-content-ref` hrefs of every rule result at the embedded
/// sub-report they name. Returns the number of rewritten hrefs.
pub fn rewrite_check_refs(doc: &mut Document, test_result: NodeId, index: &SubReportIndex) -> usize {
    let rule_results: Vec<NodeId> = doc.children_named(test_result, "rule-result").collect();
    let mut rewritten = 0;
    for rule_result in rule_results {
        rewritten += rewrite_in_checks(doc, rule_result, index);
    }
    rewritten
}

fn rewrite_in_checks(doc: &mut Document, parent: NodeId, index: &SubReportIndex) -> usize {
    let mut rewritten = 0;
    let children: Vec<NodeId> = doc.element_children(parent).collect();

    for child in children {
        if doc.has_local_name(child, "complex-check") {
            rewritten += rewrite_in_checks(doc, child, index);
        } else if doc.has_local_name(child, "check") {
            let refs: Vec<NodeId> = doc.children_named(child, "check-content-ref").collect();
            for check_ref in refs {
                let target = doc
                    .attribute(check_ref, "href")
                    .and_then(|href| index.report_id_for(href))
                    .map(|report_id| format!("#{}", report_id));
                if let Some(target) = target {
                    doc.set_attribute(check_ref, "href", &target);
                    rewritten += 1;
                }
            }
        }
    }

    rewritten
}

/// Inject the asset reference into the TestResult of `report` and rewrite
/// its check references. Check references are rewritten even when the
/// target reference could not be placed.
pub fn inject_refs(
    doc: &mut Document,
    report: NodeId,
    report_id: &str,
    asset_id: &str,
    index: &SubReportIndex,
) -> Result<InjectOutcome, InjectError> {
    let test_result = find_test_result(doc, report, report_id)?;

    let inserted = inject_target_id_ref(doc, test_result, asset_id, report_id);
    let rewritten_hrefs = rewrite_check_refs(doc, test_result, index);

    Ok(InjectOutcome {
        target_ref_inserted: inserted?,
        rewritten_hrefs,
    })
}
