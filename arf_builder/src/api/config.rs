//! Composer configuration

use arf_core::ComposerPreferences;
use serde::{Deserialize, Serialize};

/// How the source data stream enters the composite document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImportMode {
    /// Deep copy; the source document stays intact
    #[default]
    Clone,
    /// Move; the source document loses its root element
    Adopt,
}

impl ImportMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImportMode::Clone => "clone",
            ImportMode::Adopt => "adopt",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposerConfig {
    pub import_mode: ImportMode,

    /// Treat a result root other than TestResult/Benchmark as fatal
    pub strict_result_root: bool,

    /// Embed sub-reports and rewrite check references to them
    pub embed_sub_reports: bool,

    pub indent_output: bool,

    /// Prefix of embedded XCCDF report ids (`xccdf1`, `xccdf2`, ...)
    pub report_id_prefix: String,
}

impl Default for ComposerConfig {
    fn default() -> Self {
        Self {
            import_mode: ImportMode::Clone,
            strict_result_root: false,
            embed_sub_reports: true,
            indent_output: true,
            report_id_prefix: "xccdf".to_string(),
        }
    }
}

impl ComposerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Configuration from runtime preferences
    pub fn from_preferences(preferences: &ComposerPreferences) -> Self {
        Self {
            import_mode: if preferences.adopt_datastream {
                ImportMode::Adopt
            } else {
                ImportMode::Clone
            },
            strict_result_root: preferences.strict_result_root,
            embed_sub_reports: preferences.embed_sub_reports,
            indent_output: preferences.indent_output,
            ..Self::default()
        }
    }

    pub fn with_import_mode(mut self, mode: ImportMode) -> Self {
        self.import_mode = mode;
        self
    }

    pub fn with_strict_result_root(mut self, strict: bool) -> Self {
        self.strict_result_root = strict;
        self
    }

    pub fn with_sub_reports(mut self, embed: bool) -> Self {
        self.embed_sub_reports = embed;
        self
    }

    pub fn with_indent(mut self, indent: bool) -> Self {
        self.indent_output = indent;
        self
    }

    pub fn with_report_id_prefix(mut self, prefix: &str) -> Self {
        self.report_id_prefix = prefix.to_string();
        self
    }

    /// Id of the `index`-th embedded XCCDF report, counting from 1
    pub fn report_id(&self, index: usize) -> String {
        format!("{}{}", self.report_id_prefix, index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let config = ComposerConfig::new()
            .with_import_mode(ImportMode::Adopt)
            .with_strict_result_root(true)
            .with_report_id_prefix("result");

        assert_eq!(config.import_mode, ImportMode::Adopt);
        assert!(config.strict_result_root);
        assert_eq!(config.report_id(2), "result2");
    }

    #[test]
    fn test_from_preferences() {
        let preferences = ComposerPreferences {
            adopt_datastream: true,
            strict_result_root: false,
            indent_output: false,
            embed_sub_reports: false,
        };
        let config = ComposerConfig::from_preferences(&preferences);

        assert_eq!(config.import_mode, ImportMode::Adopt);
        assert!(!config.indent_output);
        assert!(!config.embed_sub_reports);
        assert_eq!(config.report_id(1), "xccdf1");
    }
}
