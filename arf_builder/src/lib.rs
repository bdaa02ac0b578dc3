//! # ARF Builder
//!
//! Composes SCAP Asset Reporting Format (ARF) 1.1 result collections: the
//! evaluated source data stream, XCCDF TestResults as reports, an asset per
//! scanned target, the relationships between them, and any OVAL results the
//! checks reference. Also exports single components of an existing
//! collection back to standalone files.
//!
//! ```no_run
//! use arf_builder::prelude::*;
//! use std::path::Path;
//!
//! let composer = Composer::new(ComposerConfig::default());
//! let inputs = ComposeInputs::new("ssg-ds.xml", "results-xccdf.xml")
//!     .with_sub_report("ssg-oval.xml.result.xml");
//! let outcome = compose_files(&composer, &inputs, Path::new("arf.xml"))?;
//! for event in outcome.warnings() {
//!     eprintln!("{}", event.format());
//! }
//! # Ok::<(), ComposeError>(())
//! ```

pub mod api;
pub mod assets;
pub mod composer;
pub mod diagnostics;
pub mod dump;
pub mod ids;
pub mod import;
pub mod inject;
pub mod locate;
pub mod namespaces;
pub mod relationships;
pub mod report;
pub mod source;
pub mod subreports;
pub mod summary;
pub mod tailoring;
pub mod xml;

pub use api::{ComposeError, ComposerConfig, ImportMode};
pub use composer::{ComposeOutcome, ComposeRequest, ComposeStage, Composer, ReportRecord};

pub mod prelude {
    pub use crate::api::{ComposeError, ComposerConfig, ImportMode};
    pub use crate::composer::{
        ComposeOutcome, ComposeRequest, ComposeStage, Composer, ReportKind, ReportRecord,
    };
    pub use crate::diagnostics::Diagnostics;
    pub use crate::dump::{dump_arf_content, extract_arf_content, DumpedComponent};
    pub use crate::source::{compose_files, load_document, load_tailoring, ComposeInputs};
    pub use crate::subreports::SubReportIndex;
    pub use crate::summary::CompositionSummary;
    pub use crate::tailoring::TailoringSource;
    pub use crate::xml::{parse_str, Document};
}
