//! # ARF Composer
//!
//! Builds one asset report collection from a source data stream, an XCCDF
//! result document, an optional tailoring, and any sub-reports the results
//! reference. Composition runs through a fixed sequence of stages:
//!
//! ```text
//! Init → SkeletonBuilt → DatastreamImported → [TailoringMerged]
//!      → ResultsEmbedded → SubReportsEmbedded → Complete
//! ```
//!
//! Per-report problems (a TestResult without a target, an invalid address)
//! are reported as diagnostics on the outcome. Anything that leaves the
//! document structurally incomplete aborts with a [`ComposeError`].

pub mod results;
pub mod skeleton;

use crate::api::{ComposeError, ComposerConfig, ImportMode};
use crate::diagnostics::Diagnostics;
use crate::import::{adopt_into, clone_into};
use crate::report::create_report;
use crate::subreports::SubReportIndex;
use crate::tailoring::{merge_tailoring, TailoringSource};
use crate::xml::{Document, XmlError};
use arf_core::config::compile_time::composition::MAX_SUB_REPORTS;
use arf_core::logging::codes;
use arf_core::{log_debug, log_success, LogEvent};
use serde::Serialize;
use std::path::Path;

pub use skeleton::{build_skeleton, Skeleton, REPORT_REQUEST_ID};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum ComposeStage {
    Init,
    SkeletonBuilt,
    DatastreamImported,
    TailoringMerged,
    ResultsEmbedded,
    SubReportsEmbedded,
    Complete,
}

impl ComposeStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            ComposeStage::Init => "init",
            ComposeStage::SkeletonBuilt => "skeleton-built",
            ComposeStage::DatastreamImported => "datastream-imported",
            ComposeStage::TailoringMerged => "tailoring-merged",
            ComposeStage::ResultsEmbedded => "results-embedded",
            ComposeStage::SubReportsEmbedded => "sub-reports-embedded",
            ComposeStage::Complete => "complete",
        }
    }
}

fn advance(stage: &mut ComposeStage, next: ComposeStage) {
    log_debug!("Composition stage changed",
        "from" => stage.as_str(),
        "to" => next.as_str()
    );
    *stage = next;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReportKind {
    TestResult,
    SubReport,
}

/// One `arf:report` added by a composition
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportRecord {
    pub report_id: String,
    pub kind: ReportKind,
    /// Asset the report is about; sub-reports have none
    pub asset_id: Option<String>,
    /// Whether the asset reference was placed in the TestResult
    pub injected: bool,
    pub rewritten_hrefs: usize,
}

/// Inputs of one composition
#[derive(Debug, Clone)]
pub struct ComposeRequest {
    pub datastream: Document,
    pub results: Document,
    pub tailoring: Option<TailoringSource>,
    pub sub_reports: SubReportIndex,
}

impl ComposeRequest {
    pub fn new(datastream: Document, results: Document) -> Self {
        Self {
            datastream,
            results,
            tailoring: None,
            sub_reports: SubReportIndex::new(),
        }
    }

    pub fn with_tailoring(mut self, tailoring: TailoringSource) -> Self {
        self.tailoring = Some(tailoring);
        self
    }

    pub fn with_sub_reports(mut self, sub_reports: SubReportIndex) -> Self {
        self.sub_reports = sub_reports;
        self
    }
}

#[derive(Debug, Clone)]
pub struct ComposeOutcome {
    pub document: Document,
    pub stage: ComposeStage,
    pub diagnostics: Vec<LogEvent>,
    /// Diagnostics past the retention limit; logged but not kept
    pub dropped_diagnostics: usize,
    pub reports: Vec<ReportRecord>,
}

impl ComposeOutcome {
    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(LogEvent::is_error)
    }

    pub fn errors(&self) -> impl Iterator<Item = &LogEvent> {
        self.diagnostics.iter().filter(|event| event.is_error())
    }

    pub fn warnings(&self) -> impl Iterator<Item = &LogEvent> {
        self.diagnostics.iter().filter(|event| event.is_warning())
    }

    pub fn report(&self, report_id: &str) -> Option<&ReportRecord> {
        self.reports.iter().find(|record| record.report_id == report_id)
    }

    pub fn to_xml_string(&self, indent: bool) -> String {
        self.document.to_xml_string(indent)
    }

    pub fn write_to(&self, path: impl AsRef<Path>, indent: bool) -> Result<(), XmlError> {
        self.document.write_to(path, indent)
    }
}

#[derive(Debug, Clone, Default)]
pub struct Composer {
    config: ComposerConfig,
}

impl Composer {
    pub fn new(config: ComposerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ComposerConfig {
        &self.config
    }

    /// Compose a complete asset report collection
    pub fn compose(&self, request: ComposeRequest) -> Result<ComposeOutcome, ComposeError> {
        let ComposeRequest {
            mut datastream,
            results: xccdf_results,
            tailoring,
            sub_reports,
        } = request;
        let mut diagnostics = Diagnostics::new();
        let mut stage = ComposeStage::Init;

        let (mut doc, skeleton, ns) = build_skeleton();
        advance(&mut stage, ComposeStage::SkeletonBuilt);

        let datastream_root = datastream
            .root()
            .ok_or(ComposeError::EmptyDocument { role: "data stream" })?;
        let bundle_root = match self.config.import_mode {
            ImportMode::Clone => {
                clone_into(&mut doc, skeleton.request_content, &datastream, datastream_root)
            }
            ImportMode::Adopt => {
                adopt_into(&mut doc, skeleton.request_content, &mut datastream, datastream_root)
            }
        };
        log_success!(codes::success::DATASTREAM_IMPORTED, "Data stream imported",
            "mode" => self.config.import_mode.as_str()
        );
        advance(&mut stage, ComposeStage::DatastreamImported);

        if let Some(tailoring) = &tailoring {
            if let Some(ids) = merge_tailoring(&mut doc, bundle_root, tailoring, &mut diagnostics)? {
                log_success!(codes::success::TAILORING_MERGED, "Tailoring added to data stream",
                    "component" => ids.component_id,
                    "path" => tailoring.path
                );
                advance(&mut stage, ComposeStage::TailoringMerged);
            }
        }

        let mut index = if self.config.embed_sub_reports {
            sub_reports
        } else {
            SubReportIndex::new()
        };
        for href in index.truncate(MAX_SUB_REPORTS) {
            diagnostics.warning(
                codes::references::SUB_REPORT_LIMIT_REACHED,
                "Sub-report limit reached, reference left unresolved",
                &[("href", &href)],
            );
        }

        let mut reports = results::embed_test_results(
            &mut doc,
            &skeleton,
            &ns,
            &xccdf_results,
            &index,
            &self.config,
            &mut diagnostics,
        )?;
        advance(&mut stage, ComposeStage::ResultsEmbedded);

        for (_, sub_report) in index.iter() {
            create_report(
                &mut doc,
                &ns,
                skeleton.reports,
                &sub_report.document,
                &sub_report.report_id,
            )?;
            reports.push(ReportRecord {
                report_id: sub_report.report_id.clone(),
                kind: ReportKind::SubReport,
                asset_id: None,
                injected: false,
                rewritten_hrefs: 0,
            });
        }
        advance(&mut stage, ComposeStage::SubReportsEmbedded);

        advance(&mut stage, ComposeStage::Complete);
        log_success!(codes::success::COMPOSITION_COMPLETE, "Asset report collection composed",
            "reports" => reports.len(),
            "diagnostics" => diagnostics.len()
        );

        let dropped_diagnostics = diagnostics.dropped();
        Ok(ComposeOutcome {
            document: doc,
            stage,
            diagnostics: diagnostics.into_events(),
            dropped_diagnostics,
            reports,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::locate::{inner_content, locate_component, locate_container};
    use crate::xml::{parse_str, NodeId};
    use arf_core::config::compile_time::composition::MAX_DIAGNOSTICS;
    use assert_matches::assert_matches;

    const DATASTREAM: &str = r##"<ds:data-stream-collection xmlns:ds="http://scap.nist.gov/schema/scap/source/1.2" xmlns:xlink="http://www.w3.org/1999/xlink" id="scap_collection">
      <ds:data-stream id="ds1">
        <ds:checklists><ds:component-ref id="cref1" xlink:href="#comp1"/></ds:checklists>
      </ds:data-stream>
      <ds:component id="comp1"><Benchmark xmlns="http://checklists.nist.gov/xccdf/1.2" id="xccdf_b"/></ds:component>
    </ds:data-stream-collection>"##;

    const TEST_RESULT: &str = r#"<TestResult xmlns="http://checklists.nist.gov/xccdf/1.2" id="xccdf_tr">
      <target>host</target>
      <target-address>192.168.1.10</target-address>
      <target-facts>
        <fact name="urn:xccdf:fact:asset:identifier:fqdn" type="string">host.example.com</fact>
      </target-facts>
      <rule-result idref="r1">
        <check system="http://oval.mitre.org/XMLSchema/oval-definitions-5">
          <check-content-ref href="ssg-oval.xml" name="oval:def:1"/>
        </check>
      </rule-result>
    </TestResult>"#;

    const BENCHMARK: &str = r#"<Benchmark xmlns="http://checklists.nist.gov/xccdf/1.2" id="b">
      <TestResult id="first"><target>one</target><target-address>10.0.0.1</target-address></TestResult>
      <TestResult id="second"><target>two</target><target-address>fe80::1</target-address></TestResult>
    </Benchmark>"#;

    fn sub_reports() -> SubReportIndex {
        let mut index = SubReportIndex::new();
        index.insert(
            "ssg-oval.xml",
            "oval0",
            parse_str(r#"<oval_results xmlns="http://oval.mitre.org/XMLSchema/oval-results-5"/>"#).unwrap(),
        );
        index
    }

    fn request(results: &str) -> ComposeRequest {
        ComposeRequest::new(parse_str(DATASTREAM).unwrap(), parse_str(results).unwrap())
            .with_sub_reports(sub_reports())
    }

    fn relationships(doc: &Document) -> Vec<(String, String, String)> {
        let container = locate_container(doc, "relationships").unwrap();
        doc.children_named(container, "relationship")
            .map(|rel| {
                let reference = doc.first_child_named(rel, "ref").unwrap();
                (
                    doc.attribute(rel, "type").unwrap().to_string(),
                    doc.attribute(rel, "subject").unwrap().to_string(),
                    doc.text_content(reference),
                )
            })
            .collect()
    }

    fn embedded_test_result(doc: &Document, report_id: &str) -> NodeId {
        let report = locate_component(doc, "reports", "report", report_id).unwrap();
        let content = inner_content(doc, report).unwrap();
        doc.first_child_named(content, "TestResult").unwrap()
    }

    #[test]
    fn test_compose_single_test_result() {
        let outcome = Composer::default().compose(request(TEST_RESULT)).unwrap();
        let doc = &outcome.document;
        let root = doc.root().unwrap();

        assert_eq!(outcome.stage, ComposeStage::Complete);
        assert!(!outcome.has_errors());

        let containers: Vec<&str> = doc.element_children(root).filter_map(|c| doc.local_name(c)).collect();
        assert_eq!(containers, ["relationships", "report-requests", "assets", "reports"]);

        let report_ids: Vec<&str> = outcome.reports.iter().map(|r| r.report_id.as_str()).collect();
        assert_eq!(report_ids, ["xccdf1", "oval0"]);
        let record = outcome.report("xccdf1").unwrap();
        assert_eq!(record.asset_id.as_deref(), Some("asset0"));
        assert!(record.injected);
        assert_eq!(record.rewritten_hrefs, 1);

        assert_eq!(
            relationships(doc),
            [
                ("arfvocab:createdFor".to_string(), "xccdf1".to_string(), "collection1".to_string()),
                ("arfvocab:isAbout".to_string(), "xccdf1".to_string(), "asset0".to_string()),
            ]
        );

        let test_result = embedded_test_result(doc, "xccdf1");
        let reference = doc.first_child_named(test_result, "target-id-ref").unwrap();
        assert_eq!(doc.attribute(reference, "name"), Some("asset0"));
        assert_eq!(doc.namespace(reference), Some("http://checklists.nist.gov/xccdf/1.2"));
        let check_ref = doc
            .descendants(test_result)
            .into_iter()
            .find(|n| doc.has_local_name(*n, "check-content-ref"))
            .unwrap();
        assert_eq!(doc.attribute(check_ref, "href"), Some("#oval0"));

        let request = locate_component(doc, "report-requests", "report-request", "collection1").unwrap();
        let bundle = doc
            .element_children(inner_content(doc, request).unwrap())
            .next()
            .unwrap();
        assert_eq!(doc.attribute(bundle, "id"), Some("scap_collection"));
    }

    #[test]
    fn test_output_reparses() {
        let outcome = Composer::default().compose(request(TEST_RESULT)).unwrap();
        let text = outcome.to_xml_string(true);
        let reparsed = parse_str(&text).unwrap();
        assert_eq!(reparsed.to_xml_string(true), text);

        let test_result = embedded_test_result(&reparsed, "xccdf1");
        assert_eq!(
            reparsed.namespace(test_result),
            Some("http://checklists.nist.gov/xccdf/1.2")
        );
    }

    #[test]
    fn test_bundle_mixed_content_survives() {
        let datastream = parse_str(
            r#"<ds:data-stream-collection xmlns:ds="http://scap.nist.gov/schema/scap/source/1.2" id="dsc">
                 <ds:component id="c1">
                   <Benchmark xmlns="http://checklists.nist.gov/xccdf/1.2" xmlns:h="http://www.w3.org/1999/xhtml" id="b">
                     <description><h:p>Run <h:code>a</h:code> <h:code>b</h:code> now</h:p></description>
                   </Benchmark>
                 </ds:component>
               </ds:data-stream-collection>"#,
        )
        .unwrap();
        let results = parse_str(TEST_RESULT).unwrap();

        let outcome = Composer::default()
            .compose(ComposeRequest::new(datastream, results))
            .unwrap();

        for indent in [true, false] {
            let text = outcome.to_xml_string(indent);
            assert!(
                text.contains("<h:p>Run <h:code>a</h:code> <h:code>b</h:code> now</h:p>"),
                "{}",
                text
            );
        }
    }

    #[test]
    fn test_diagnostics_past_limit_are_counted() {
        let extra = 3;
        let addresses: String = (0..MAX_DIAGNOSTICS + extra)
            .map(|_| "<target-address>zz::1::2</target-address>")
            .collect();
        let results = format!(
            r#"<TestResult xmlns="http://checklists.nist.gov/xccdf/1.2" id="tr"><target>host</target>{}</TestResult>"#,
            addresses
        );

        let outcome = Composer::default()
            .compose(ComposeRequest::new(parse_str(DATASTREAM).unwrap(), parse_str(&results).unwrap()))
            .unwrap();

        assert_eq!(outcome.diagnostics.len(), MAX_DIAGNOSTICS);
        assert_eq!(outcome.dropped_diagnostics, extra);
    }

    #[test]
    fn test_scanner_host_collection() {
        let datastream = parse_str(
            r#"<ds:data-stream-collection xmlns:ds="http://scap.nist.gov/schema/scap/source/1.2" id="xccdf_org.test_ds"/>"#,
        )
        .unwrap();
        let results = parse_str(
            r#"<TestResult xmlns="http://checklists.nist.gov/xccdf/1.2" id="tr">
                 <target-address>10.0.0.5</target-address>
                 <target-facts>
                   <fact name="urn:xccdf:fact:asset:identifier:host_name" type="string">scanner1</fact>
                 </target-facts>
               </TestResult>"#,
        )
        .unwrap();

        let outcome = Composer::default()
            .compose(ComposeRequest::new(datastream, results))
            .unwrap();
        let summary = crate::summary::CompositionSummary::from_document(&outcome.document);

        assert_eq!(summary.reports, ["xccdf1"]);
        assert_eq!(summary.assets.len(), 1);
        assert_eq!(summary.assets[0].id, "asset0");
        assert_eq!(summary.assets[0].addresses, ["10.0.0.5"]);
        assert_eq!(summary.assets[0].hostname.as_deref(), Some("scanner1"));
        assert_eq!(
            relationships(&outcome.document),
            [
                ("arfvocab:createdFor".to_string(), "xccdf1".to_string(), "collection1".to_string()),
                ("arfvocab:isAbout".to_string(), "xccdf1".to_string(), "asset0".to_string()),
            ]
        );

        let test_result = embedded_test_result(&outcome.document, "xccdf1");
        let reference = outcome
            .document
            .first_child_named(test_result, "target-id-ref")
            .unwrap();
        assert_eq!(outcome.document.attribute(reference, "name"), Some("asset0"));
    }

    #[test]
    fn test_benchmark_results_each_get_report_and_asset() {
        let outcome = Composer::default().compose(request(BENCHMARK)).unwrap();
        let doc = &outcome.document;

        let assets: Vec<Option<&str>> = outcome.reports.iter().map(|r| r.asset_id.as_deref()).collect();
        assert_eq!(assets, [Some("asset0"), Some("asset1"), None]);
        assert_eq!(outcome.reports[1].report_id, "xccdf2");

        assert!(relationships(doc).contains(&(
            "arfvocab:isAbout".to_string(),
            "xccdf2".to_string(),
            "asset1".to_string()
        )));

        let second = embedded_test_result(doc, "xccdf2");
        assert_eq!(doc.attribute(second, "id"), Some("second"));
        let ip = doc
            .descendants(locate_container(doc, "assets").unwrap())
            .into_iter()
            .find(|n| doc.has_local_name(*n, "ip-v6"))
            .unwrap();
        assert_eq!(doc.text_content(ip), "fe80:0000:0000:0000:0000:0000:0000:0001");
    }

    #[test]
    fn test_unknown_root_adds_no_reports() {
        let outcome = Composer::default().compose(request("<oval_results/>")).unwrap();

        assert_eq!(outcome.stage, ComposeStage::Complete);
        assert!(outcome.has_errors());
        assert!(outcome
            .errors()
            .any(|e| e.code == codes::structure::UNKNOWN_RESULT_ROOT));
        assert!(outcome.reports.iter().all(|r| r.kind == ReportKind::SubReport));
        let assets = locate_container(&outcome.document, "assets").unwrap();
        assert_eq!(outcome.document.element_children(assets).count(), 0);
    }

    #[test]
    fn test_unknown_root_strict() {
        let composer = Composer::new(ComposerConfig::new().with_strict_result_root(true));
        assert_matches!(
            composer.compose(request("<oval_results/>")),
            Err(ComposeError::UnknownResultRoot { element }) if element == "oval_results"
        );
    }

    #[test]
    fn test_adopt_and_clone_produce_same_document() {
        let cloned = Composer::default().compose(request(TEST_RESULT)).unwrap();
        let adopted = Composer::new(ComposerConfig::new().with_import_mode(ImportMode::Adopt))
            .compose(request(TEST_RESULT))
            .unwrap();
        assert_eq!(cloned.to_xml_string(false), adopted.to_xml_string(false));
    }

    #[test]
    fn test_missing_target_is_reported_per_report() {
        let results = r#"<TestResult xmlns="http://checklists.nist.gov/xccdf/1.2" id="tr">
            <rule-result idref="r1"><check system="oval"><check-content-ref href="ssg-oval.xml"/></check></rule-result>
          </TestResult>"#;
        let outcome = Composer::default().compose(request(results)).unwrap();

        let record = outcome.report("xccdf1").unwrap();
        assert!(!record.injected);
        assert!(outcome
            .errors()
            .any(|e| e.code == codes::references::MISSING_TARGET_ANCHOR));

        let doc = &outcome.document;
        let test_result = embedded_test_result(doc, "xccdf1");
        let check_ref = doc
            .descendants(test_result)
            .into_iter()
            .find(|n| doc.has_local_name(*n, "check-content-ref"))
            .unwrap();
        assert_eq!(doc.attribute(check_ref, "href"), Some("#oval0"));
    }

    #[test]
    fn test_sub_reports_disabled() {
        let composer = Composer::new(ComposerConfig::new().with_sub_reports(false));
        let outcome = composer.compose(request(TEST_RESULT)).unwrap();

        assert_eq!(outcome.reports.len(), 1);
        let doc = &outcome.document;
        assert!(locate_component(doc, "reports", "report", "oval0").is_none());
        let check_ref = doc
            .descendants(embedded_test_result(doc, "xccdf1"))
            .into_iter()
            .find(|n| doc.has_local_name(*n, "check-content-ref"))
            .unwrap();
        assert_eq!(doc.attribute(check_ref, "href"), Some("ssg-oval.xml"));
    }

    #[test]
    fn test_tailoring_merged_into_bundle() {
        let tailoring = TailoringSource::new(
            "tailoring.xml",
            parse_str(r#"<Tailoring xmlns="http://checklists.nist.gov/xccdf/1.2" id="t"/>"#).unwrap(),
        )
        .with_timestamp("2024-05-06T07:08:09");
        let outcome = Composer::default()
            .compose(request(TEST_RESULT).with_tailoring(tailoring))
            .unwrap();
        let doc = &outcome.document;

        let bundle = doc
            .descendants(doc.root().unwrap())
            .into_iter()
            .find(|n| doc.has_local_name(*n, "data-stream-collection"))
            .unwrap();
        let component = doc.last_child_named(bundle, "component").unwrap();
        assert_eq!(
            doc.attribute(component, "id"),
            Some("scap_org.open-scap_comp_tailoring.xml_tailoring")
        );
        let checklists = doc
            .descendants(bundle)
            .into_iter()
            .find(|n| doc.has_local_name(*n, "checklists"))
            .unwrap();
        assert_eq!(doc.children_named(checklists, "component-ref").count(), 2);
    }

    #[test]
    fn test_legacy_xccdf_warns() {
        let results = r#"<TestResult xmlns="http://checklists.nist.gov/xccdf/1.1" id="tr"><target>h</target></TestResult>"#;
        let outcome = Composer::default().compose(request(results)).unwrap();
        assert!(outcome
            .warnings()
            .any(|e| e.code == codes::structure::LEGACY_CHECKLIST_VERSION));
        assert!(outcome.report("xccdf1").unwrap().injected);
    }

    #[test]
    fn test_empty_datastream_rejected() {
        let request = ComposeRequest::new(Document::new(), parse_str(TEST_RESULT).unwrap());
        assert_matches!(
            Composer::default().compose(request),
            Err(ComposeError::EmptyDocument { role: "data stream" })
        );
    }
}
