//! Diagnostic collector grouped by document, with cargo-style output

use super::events::LogEvent;
use crate::config::compile_time::logging::*;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

/// Document currently being processed on this thread
#[derive(Debug, Clone)]
pub struct DocumentContext {
    pub document_path: PathBuf,
    pub role: &'static str,
    pub start_time: Instant,
}

impl DocumentContext {
    pub fn new(document_path: PathBuf, role: &'static str) -> Self {
        Self {
            document_path,
            role,
            start_time: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }
}

/// Summary of collected diagnostics
#[derive(Debug, Clone, Default)]
pub struct ProcessingSummary {
    pub total_documents: usize,
    pub clean_documents: usize,
    pub failed_documents: usize,
    pub documents_with_warnings: usize,
    pub total_errors: usize,
    pub total_warnings: usize,
    pub total_processing_time: Duration,
}

impl ProcessingSummary {
    pub fn has_errors(&self) -> bool {
        self.total_errors > 0
    }
}

/// Thread-safe diagnostic collector
pub struct ErrorCollector {
    document_events: Mutex<BTreeMap<PathBuf, Vec<LogEvent>>>,
    processing_start: Instant,
}

impl ErrorCollector {
    pub fn new() -> Self {
        Self {
            document_events: Mutex::new(BTreeMap::new()),
            processing_start: Instant::now(),
        }
    }

    fn events(&self) -> MutexGuard<'_, BTreeMap<PathBuf, Vec<LogEvent>>> {
        self.document_events
            .lock()
            .unwrap_or_else(|e| e.into_inner())
    }

    /// Record an event for a specific document
    pub fn record_event(&self, document_path: &Path, event: LogEvent) {
        let mut events = self.events();

        if events.values().map(Vec::len).sum::<usize>() >= LOG_BUFFER_SIZE {
            return;
        }

        let document_events = events.entry(document_path.to_path_buf()).or_default();

        if document_events.len() < MAX_LOG_EVENTS_PER_DOCUMENT {
            document_events.push(event);
        } else if document_events.len() == MAX_LOG_EVENTS_PER_DOCUMENT {
            document_events.push(LogEvent::warning(&format!(
                "Too many events for document (limit: {})",
                MAX_LOG_EVENTS_PER_DOCUMENT
            )));
        }
    }

    /// Register a document so it shows up in summaries even without events
    pub fn record_document(&self, context: &DocumentContext) {
        self.events()
            .entry(context.document_path.clone())
            .or_default();
    }

    pub fn get_document_events(&self, document_path: &Path) -> Vec<LogEvent> {
        self.events()
            .get(document_path)
            .cloned()
            .unwrap_or_default()
    }

    pub fn get_document_errors(&self, document_path: &Path) -> Vec<LogEvent> {
        self.events()
            .get(document_path)
            .map(|events| events.iter().filter(|e| e.is_error()).cloned().collect())
            .unwrap_or_default()
    }

    pub fn get_all_document_events(&self) -> BTreeMap<PathBuf, Vec<LogEvent>> {
        self.events().clone()
    }

    pub fn get_summary(&self) -> ProcessingSummary {
        let events = self.events();

        let mut summary = ProcessingSummary {
            total_documents: events.len(),
            total_processing_time: self.processing_start.elapsed(),
            ..Default::default()
        };

        for document_events in events.values() {
            let errors = document_events.iter().filter(|e| e.is_error()).count();
            let warnings = document_events.iter().filter(|e| e.is_warning()).count();

            if errors > 0 {
                summary.failed_documents += 1;
            } else if warnings > 0 {
                summary.documents_with_warnings += 1;
            } else {
                summary.clean_documents += 1;
            }

            summary.total_errors += errors;
            summary.total_warnings += warnings;
        }

        summary
    }

    /// Errors that must abort composition
    pub fn get_critical_errors(&self) -> Vec<(PathBuf, LogEvent)> {
        self.events()
            .iter()
            .flat_map(|(path, events)| {
                events
                    .iter()
                    .filter(|e| e.is_error() && e.requires_halt())
                    .map(move |e| (path.clone(), e.clone()))
            })
            .collect()
    }

}

impl Default for ErrorCollector {
    fn default() -> Self {
        Self::new()
    }
}

fn push_context(output: &mut String, event: &LogEvent) {
    for (key, value) in &event.context {
        if key != "document" && key != "role" {
            output.push_str(&format!("  = {}: {}\n", key, value));
        }
    }
}

/// Format collected diagnostics in cargo-style output
pub fn format_cargo_style_errors(collector: &ErrorCollector) -> String {
    let mut output = String::new();

    for (document_path, events) in &collector.get_all_document_events() {
        let errors: Vec<_> = events.iter().filter(|e| e.is_error()).collect();
        let warnings: Vec<_> = events.iter().filter(|e| e.is_warning()).collect();

        if errors.is_empty() && warnings.is_empty() {
            continue;
        }

        output.push_str(&format!("Composing {}...\n", document_path.display()));

        for event in errors {
            output.push_str(&format!(
                "error[{}]: {}\n",
                event.code.as_str(),
                event.message
            ));
            output.push_str(&format!(
                "  = severity: {}, category: {}\n",
                event.severity(),
                event.category()
            ));
            push_context(&mut output, event);

            let action = event.recommended_action();
            if action != "No specific action available" {
                output.push_str(&format!("  = help: {}\n", action));
            }
        }

        for event in warnings {
            output.push_str(&format!(
                "warning[{}]: {}\n",
                event.code.as_str(),
                event.message
            ));
            push_context(&mut output, event);
        }

        output.push('\n');
    }

    let summary = collector.get_summary();
    if summary.total_errors > 0 {
        output.push_str(&format!("Total errors: {}\n", summary.total_errors));
    }
    if summary.total_warnings > 0 {
        output.push_str(&format!("Total warnings: {}\n", summary.total_warnings));
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::codes;

    #[test]
    fn test_collector_groups_by_document() {
        let collector = ErrorCollector::new();
        let results = PathBuf::from("results.xml");
        let datastream = PathBuf::from("ds.xml");

        collector.record_event(
            &results,
            LogEvent::error(codes::references::MISSING_TARGET_ANCHOR, "no target"),
        );
        collector.record_event(
            &datastream,
            LogEvent::warning_with_code(codes::structure::LEGACY_CHECKLIST_VERSION, "1.1"),
        );
        collector.record_document(&DocumentContext::new(PathBuf::from("oval.xml"), "sub-report"));

        let summary = collector.get_summary();
        assert_eq!(summary.total_documents, 3);
        assert_eq!(summary.failed_documents, 1);
        assert_eq!(summary.documents_with_warnings, 1);
        assert_eq!(summary.clean_documents, 1);
        assert_eq!(collector.get_document_errors(&results).len(), 1);
    }

    #[test]
    fn test_critical_errors() {
        let collector = ErrorCollector::new();
        let path = PathBuf::from("ds.xml");

        collector.record_event(&path, LogEvent::error(codes::documents::PARSE_FAILURE, "bad"));
        collector.record_event(
            &path,
            LogEvent::error(codes::references::TEST_RESULT_NOT_FOUND, "none"),
        );

        let critical = collector.get_critical_errors();
        assert_eq!(critical.len(), 1);
        assert_eq!(critical[0].1.code.as_str(), "E010");
    }

    #[test]
    fn test_cargo_style_output() {
        let collector = ErrorCollector::new();
        let path = PathBuf::from("results.xml");
        collector.record_event(
            &path,
            LogEvent::error(codes::references::MISSING_TARGET_ANCHOR, "no target")
                .with_context("report", "xccdf1"),
        );

        let output = format_cargo_style_errors(&collector);
        assert!(output.contains("Composing results.xml..."));
        assert!(output.contains("error[E050]: no target"));
        assert!(output.contains("= report: xccdf1"));
        assert!(output.contains("Total errors: 1"));
    }

    #[test]
    fn test_per_document_limit() {
        let collector = ErrorCollector::new();
        let path = PathBuf::from("big.xml");
        for _ in 0..MAX_LOG_EVENTS_PER_DOCUMENT + 5 {
            collector.record_event(&path, LogEvent::warning("again"));
        }
        assert_eq!(
            collector.get_document_events(&path).len(),
            MAX_LOG_EVENTS_PER_DOCUMENT + 1
        );
    }
}
