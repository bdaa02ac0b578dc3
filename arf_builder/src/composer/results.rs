//! Embedding XCCDF results as reports

use super::skeleton::{Skeleton, REPORT_REQUEST_ID};
use super::{ReportKind, ReportRecord};
use crate::api::{ComposeError, ComposerConfig};
use crate::assets::add_asset_from_test_result;
use crate::diagnostics::Diagnostics;
use crate::import::wrap_as_document;
use crate::inject::inject_refs;
use crate::namespaces::NamespaceRegistry;
use crate::relationships::{add_relationship, RelationshipType};
use crate::report::create_report;
use crate::subreports::SubReportIndex;
use crate::xml::{Document, NodeId};
use arf_core::config::compile_time::composition::MAX_EMBEDDED_TEST_RESULTS;
use arf_core::logging::codes;
use arf_core::log_success;

const LEGACY_XCCDF_SUFFIX: &str = "xccdf/1.1";

/// Shared state for the reports added by one composition
pub struct ResultEmbedder<'a> {
    pub doc: &'a mut Document,
    pub skeleton: &'a Skeleton,
    pub ns: &'a NamespaceRegistry,
    pub index: &'a SubReportIndex,
    pub diagnostics: &'a mut Diagnostics,
}

impl ResultEmbedder<'_> {
    /// Add one TestResult as a report together with its asset, both
    /// relationships, and its injected references. `source` is the document
    /// the report content is copied from; `test_result` is its TestResult.
    pub fn embed(
        &mut self,
        source: &Document,
        test_result: NodeId,
        report_id: &str,
    ) -> Result<ReportRecord, ComposeError> {
        let report = create_report(self.doc, self.ns, self.skeleton.reports, source, report_id)?;
        add_relationship(
            self.doc,
            self.ns,
            self.skeleton.relationships,
            RelationshipType::CreatedFor,
            report_id,
            REPORT_REQUEST_ID,
        )?;

        let asset = add_asset_from_test_result(
            self.doc,
            self.ns,
            self.skeleton.assets,
            source,
            test_result,
            self.diagnostics,
        )?;
        add_relationship(
            self.doc,
            self.ns,
            self.skeleton.relationships,
            RelationshipType::IsAbout,
            report_id,
            &asset.id,
        )?;

        let (injected, rewritten_hrefs) =
            match inject_refs(self.doc, report, report_id, &asset.id, self.index) {
                Ok(outcome) => (true, outcome.rewritten_hrefs),
                Err(error) => {
                    self.diagnostics.error(
                        error.code(),
                        &error.to_string(),
                        &[("report", report_id), ("asset", &asset.id)],
                    );
                    (false, 0)
                }
            };

        log_success!(codes::success::REPORT_EMBEDDED, "XCCDF result embedded",
            "report" => report_id,
            "asset" => asset.id
        );

        Ok(ReportRecord {
            report_id: report_id.to_string(),
            kind: ReportKind::TestResult,
            asset_id: Some(asset.id),
            injected,
            rewritten_hrefs,
        })
    }
}

/// Embed the TestResult root of `results`, or every TestResult child of a
/// Benchmark root, as `xccdf1`, `xccdf2`, ...
pub fn embed_test_results(
    doc: &mut Document,
    skeleton: &Skeleton,
    ns: &NamespaceRegistry,
    results: &Document,
    index: &SubReportIndex,
    config: &ComposerConfig,
    diagnostics: &mut Diagnostics,
) -> Result<Vec<ReportRecord>, ComposeError> {
    let root = results
        .root()
        .ok_or(ComposeError::EmptyDocument { role: "results" })?;

    if results
        .namespace(root)
        .is_some_and(|uri| uri.ends_with(LEGACY_XCCDF_SUFFIX))
    {
        diagnostics.warning(
            codes::structure::LEGACY_CHECKLIST_VERSION,
            "XCCDF 1.1 results found, ARF reports are expected to carry XCCDF 1.2",
            &[],
        );
    }

    let mut embedder = ResultEmbedder {
        doc,
        skeleton,
        ns,
        index,
        diagnostics,
    };

    if results.has_local_name(root, "TestResult") {
        return Ok(vec![embedder.embed(results, root, &config.report_id(1))?]);
    }

    if results.has_local_name(root, "Benchmark") {
        let mut records = Vec::new();
        for (position, test_result) in results.children_named(root, "TestResult").enumerate() {
            if position >= MAX_EMBEDDED_TEST_RESULTS {
                embedder.diagnostics.warning(
                    codes::structure::TEST_RESULT_LIMIT_REACHED,
                    "TestResult limit reached, remaining results are not embedded",
                    &[("embedded", &position.to_string())],
                );
                break;
            }
            let wrapped = wrap_as_document(results, test_result);
            let Some(wrapped_root) = wrapped.root() else {
                continue;
            };
            records.push(embedder.embed(&wrapped, wrapped_root, &config.report_id(position + 1))?);
        }
        return Ok(records);
    }

    let element = results.local_name(root).unwrap_or_default().to_string();
    if config.strict_result_root {
        return Err(ComposeError::UnknownResultRoot { element });
    }
    embedder.diagnostics.error(
        codes::structure::UNKNOWN_RESULT_ROOT,
        &format!(
            "Unknown root element '{}' in given XCCDF result document, expected TestResult or Benchmark",
            element
        ),
        &[],
    );
    Ok(Vec::new())
}
