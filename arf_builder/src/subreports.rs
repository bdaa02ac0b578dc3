//! Index of sub-result documents (typically OVAL results) referenced from
//! XCCDF `check-content-ref` elements
//!
//! Callers describe sub-reports with three maps: destination file to parsed
//! document, referenced href to destination file, and referenced href to
//! report id. [`SubReportIndex::resolve`] joins them into one entry per href.

use crate::diagnostics::Diagnostics;
use crate::xml::Document;
use arf_core::logging::codes;
use std::collections::BTreeMap;

#[derive(Debug, Clone)]
pub struct SubReport {
    pub report_id: String,
    pub document: Document,
}

#[derive(Debug, Clone, Default)]
pub struct SubReportIndex {
    entries: BTreeMap<String, SubReport>,
}

impl SubReportIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Join the three caller maps; hrefs whose destination or document is
    /// missing are dropped with a warning
    pub fn resolve(
        sources: &BTreeMap<String, Document>,
        destinations: &BTreeMap<String, String>,
        report_ids: &BTreeMap<String, String>,
        diagnostics: &mut Diagnostics,
    ) -> Self {
        let mut index = Self::new();

        for (href, report_id) in report_ids {
            let Some(destination) = destinations.get(href) else {
                diagnostics.warning(
                    codes::references::UNRESOLVED_SUB_REPORT,
                    "No destination file recorded for referenced sub-report",
                    &[("href", href), ("report", report_id)],
                );
                continue;
            };
            let Some(document) = sources.get(destination) else {
                diagnostics.warning(
                    codes::references::UNRESOLVED_SUB_REPORT,
                    "No document loaded for sub-report destination",
                    &[("href", href), ("destination", destination)],
                );
                continue;
            };
            index.insert(href, report_id, document.clone());
        }

        index
    }

    pub fn insert(&mut self, href: &str, report_id: &str, document: Document) {
        self.entries.insert(
            href.to_string(),
            SubReport {
                report_id: report_id.to_string(),
                document,
            },
        );
    }

    /// Report id a check href is rewritten to
    pub fn report_id_for(&self, href: &str) -> Option<&str> {
        self.entries.get(href).map(|entry| entry.report_id.as_str())
    }

    /// Entries in href order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &SubReport)> {
        self.entries.iter().map(|(href, entry)| (href.as_str(), entry))
    }

    /// Keep the first `max` entries in href order, returning the dropped hrefs
    pub fn truncate(&mut self, max: usize) -> Vec<String> {
        let dropped: Vec<String> = self.entries.keys().skip(max).cloned().collect();
        for href in &dropped {
            self.entries.remove(href);
        }
        dropped
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xml::parse_str;

    fn maps() -> (
        BTreeMap<String, Document>,
        BTreeMap<String, String>,
        BTreeMap<String, String>,
    ) {
        let mut sources = BTreeMap::new();
        sources.insert(
            "ssg-oval.xml.result.xml".to_string(),
            parse_str("<oval_results/>").unwrap(),
        );
        let mut destinations = BTreeMap::new();
        destinations.insert(
            "ssg-oval.xml".to_string(),
            "ssg-oval.xml.result.xml".to_string(),
        );
        let mut report_ids = BTreeMap::new();
        report_ids.insert("ssg-oval.xml".to_string(), "oval0".to_string());
        (sources, destinations, report_ids)
    }

    #[test]
    fn test_resolve_joins_maps() {
        let (sources, destinations, report_ids) = maps();
        let mut diagnostics = Diagnostics::new();

        let index = SubReportIndex::resolve(&sources, &destinations, &report_ids, &mut diagnostics);

        assert_eq!(index.len(), 1);
        assert_eq!(index.report_id_for("ssg-oval.xml"), Some("oval0"));
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn test_resolve_drops_unresolved() {
        let (sources, destinations, mut report_ids) = maps();
        report_ids.insert("missing.xml".to_string(), "oval1".to_string());
        let mut diagnostics = Diagnostics::new();

        let index = SubReportIndex::resolve(&sources, &destinations, &report_ids, &mut diagnostics);

        assert_eq!(index.len(), 1);
        assert!(index.report_id_for("missing.xml").is_none());
        assert!(diagnostics.has_code(codes::references::UNRESOLVED_SUB_REPORT));
    }

    #[test]
    fn test_truncate() {
        let mut index = SubReportIndex::new();
        for (href, id) in [("a.xml", "oval0"), ("b.xml", "oval1"), ("c.xml", "oval2")] {
            index.insert(href, id, parse_str("<oval_results/>").unwrap());
        }
        assert_eq!(index.truncate(2), ["c.xml"]);
        assert_eq!(index.len(), 2);
    }
}
