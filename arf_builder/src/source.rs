//! Loading input documents from disk and composing from files

use crate::api::ComposeError;
use crate::composer::{ComposeOutcome, ComposeRequest, Composer};
use crate::subreports::SubReportIndex;
use crate::tailoring::{TailoringSource, NO_TAILORING};
use crate::xml::{parse_bytes, Document};
use arf_core::config::compile_time::documents::MAX_DOCUMENT_SIZE;
use arf_core::logging::{self, codes};
use arf_core::{log_error, log_info, log_success};
use std::fs;
use std::path::{Path, PathBuf};

/// Prefix of report ids given to embedded sub-reports (`oval0`, `oval1`, ...)
pub const SUB_REPORT_ID_PREFIX: &str = "oval";

/// Read and parse `path`, checking it against the size limit
pub fn load_document(path: &Path, role: &'static str) -> Result<Document, ComposeError> {
    logging::with_document_context(path.to_path_buf(), role, || -> Result<Document, ComposeError> {
        let display = path.display().to_string();
        let metadata = fs::metadata(path).map_err(|error| match error.kind() {
            std::io::ErrorKind::NotFound => ComposeError::FileNotFound {
                path: display.clone(),
            },
            _ => ComposeError::Io(error),
        })?;

        if metadata.len() > MAX_DOCUMENT_SIZE {
            return Err(ComposeError::DocumentTooLarge {
                path: display,
                size: metadata.len(),
                limit: MAX_DOCUMENT_SIZE,
            });
        }

        let bytes = fs::read(path)?;
        let document = match parse_bytes(&bytes) {
            Ok(document) => document,
            Err(source) => {
                log_error!(codes::documents::PARSE_FAILURE, "Document could not be parsed",
                    "role" => role,
                    "error" => source
                );
                return Err(ComposeError::DocumentLoad {
                    role,
                    path: display,
                    source,
                });
            }
        };

        log_success!(codes::success::DOCUMENT_LOADED, "Document loaded",
            "role" => role,
            "path" => display
        );
        Ok(document)
    })
}

/// Load a tailoring file, stamping it with the file's modification time.
/// The placeholder path yields a source that merges nothing.
pub fn load_tailoring(path: &Path) -> Result<TailoringSource, ComposeError> {
    let path_text = path.to_string_lossy();
    if path_text == NO_TAILORING {
        return Ok(TailoringSource::new(NO_TAILORING, Document::new()));
    }

    let document = load_document(path, "tailoring")?;
    let source = TailoringSource::new(&path_text, document);
    Ok(match fs::metadata(path).and_then(|metadata| metadata.modified()) {
        Ok(modified) => source.with_modified_time(modified),
        Err(_) => source,
    })
}

/// Input files of one composition
#[derive(Debug, Clone, Default)]
pub struct ComposeInputs {
    pub datastream: PathBuf,
    pub results: PathBuf,
    pub tailoring: Option<PathBuf>,
    /// Sub-result files; each is referenced by the path exactly as given
    pub sub_reports: Vec<PathBuf>,
}

impl ComposeInputs {
    pub fn new(datastream: impl Into<PathBuf>, results: impl Into<PathBuf>) -> Self {
        Self {
            datastream: datastream.into(),
            results: results.into(),
            ..Self::default()
        }
    }

    pub fn with_tailoring(mut self, path: impl Into<PathBuf>) -> Self {
        self.tailoring = Some(path.into());
        self
    }

    pub fn with_sub_report(mut self, path: impl Into<PathBuf>) -> Self {
        self.sub_reports.push(path.into());
        self
    }
}

/// Load all inputs, compose, and write the collection to `target`
pub fn compose_files(
    composer: &Composer,
    inputs: &ComposeInputs,
    target: &Path,
) -> Result<ComposeOutcome, ComposeError> {
    log_info!("Composing asset report collection",
        "datastream" => inputs.datastream.display(),
        "results" => inputs.results.display(),
        "target" => target.display()
    );

    let datastream = load_document(&inputs.datastream, "data stream")?;
    let results = load_document(&inputs.results, "results")?;

    let mut request = ComposeRequest::new(datastream, results);
    if let Some(path) = &inputs.tailoring {
        request = request.with_tailoring(load_tailoring(path)?);
    }

    let mut index = SubReportIndex::new();
    for (position, path) in inputs.sub_reports.iter().enumerate() {
        let document = load_document(path, "sub-report")?;
        index.insert(
            &path.to_string_lossy(),
            &format!("{}{}", SUB_REPORT_ID_PREFIX, position),
            document,
        );
    }
    request = request.with_sub_reports(index);

    let outcome = composer.compose(request)?;
    outcome.write_to(target, composer.config().indent_output)?;
    log_success!(codes::success::DOCUMENT_WRITTEN, "Asset report collection written",
        "path" => target.display()
    );
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_missing_file() {
        assert_matches!(
            load_document(Path::new("/nonexistent/results.xml"), "results"),
            Err(ComposeError::FileNotFound { .. })
        );
    }

    #[test]
    fn test_parse_failure_names_role() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.xml");
        fs::write(&path, "<a><b></a>").unwrap();

        let error = load_document(&path, "results").unwrap_err();
        assert_matches!(error, ComposeError::DocumentLoad { role: "results", .. });
        assert_eq!(error.code(), codes::documents::PARSE_FAILURE);
    }

    #[test]
    fn test_tailoring_gets_timestamp() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tailoring.xml");
        fs::write(&path, r#"<Tailoring xmlns="http://checklists.nist.gov/xccdf/1.2"/>"#).unwrap();

        let source = load_tailoring(&path).unwrap();
        assert!(source.timestamp.is_some());
        assert!(!source.is_placeholder());
    }

    #[test]
    fn test_tailoring_placeholder() {
        let source = load_tailoring(Path::new(NO_TAILORING)).unwrap();
        assert!(source.is_placeholder());
    }

    #[test]
    fn test_compose_files_end_to_end() {
        let dir = tempfile::tempdir().unwrap();
        let datastream = dir.path().join("ds.xml");
        let results = dir.path().join("results.xml");
        let oval = dir.path().join("oval.xml.result.xml");
        let target = dir.path().join("arf.xml");

        fs::write(
            &datastream,
            r#"<ds:data-stream-collection xmlns:ds="http://scap.nist.gov/schema/scap/source/1.2" id="dsc"/>"#,
        )
        .unwrap();
        fs::write(
            &results,
            format!(
                r#"<TestResult xmlns="http://checklists.nist.gov/xccdf/1.2" id="tr">
                     <target>host</target>
                     <rule-result idref="r"><check system="oval"><check-content-ref href="{}"/></check></rule-result>
                   </TestResult>"#,
                oval.display()
            ),
        )
        .unwrap();
        fs::write(&oval, r#"<oval_results xmlns="http://oval.mitre.org/XMLSchema/oval-results-5"/>"#).unwrap();

        let inputs = ComposeInputs::new(&datastream, &results).with_sub_report(&oval);
        let outcome = compose_files(&Composer::default(), &inputs, &target).unwrap();

        let ids: Vec<&str> = outcome.reports.iter().map(|r| r.report_id.as_str()).collect();
        assert_eq!(ids, ["xccdf1", "oval0"]);
        assert_eq!(outcome.reports[0].rewritten_hrefs, 1);

        let written = fs::read_to_string(&target).unwrap();
        assert!(written.contains(r##"href="#oval0""##));
        assert!(written.contains(r#"<arf:report id="oval0">"#));
    }
}
