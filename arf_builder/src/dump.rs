//! Exporting the content of an ARF component to a standalone file

use crate::api::ComposeError;
use crate::diagnostics::Diagnostics;
use crate::import::wrap_as_document;
use crate::locate::{inner_content, locate_component};
use crate::xml::Document;
use arf_core::log_success;
use arf_core::logging::codes;
use std::path::{Path, PathBuf};

/// Content of one component as a standalone document
#[derive(Debug, Clone)]
pub struct DumpedComponent {
    /// `<target_dir>/<component>.xml`
    pub path: PathBuf,
    pub document: Document,
    pub diagnostics: Diagnostics,
}

impl DumpedComponent {
    pub fn write(&self, indent: bool) -> Result<(), ComposeError> {
        self.document.write_to(&self.path, indent)?;
        log_success!(codes::success::DOCUMENT_WRITTEN, "Component content written",
            "path" => self.path.display()
        );
        Ok(())
    }
}

/// Extract the last element inside `arf:content` of the `component` with
/// the given id under `container`. Nothing is written.
pub fn extract_arf_content(
    doc: &Document,
    container: &str,
    component: &str,
    id: &str,
    target_dir: &Path,
) -> Result<DumpedComponent, ComposeError> {
    let node = locate_component(doc, container, component, id).ok_or_else(|| {
        ComposeError::ComponentNotFound {
            container: container.to_string(),
            component: component.to_string(),
            id: id.to_string(),
        }
    })?;
    let content = inner_content(doc, node).ok_or_else(|| ComposeError::ContentNotFound {
        id: id.to_string(),
    })?;

    let mut diagnostics = Diagnostics::new();
    let elements: Vec<_> = doc.element_children(content).collect();
    let inner = *elements.last().ok_or_else(|| ComposeError::EmptyContent {
        id: id.to_string(),
    })?;
    if elements.len() > 1 {
        diagnostics.warning(
            codes::export::MULTIPLE_CONTENT_ROOTS,
            "More than one element found inside 'arf:content', exporting the last one",
            &[("id", id), ("count", &elements.len().to_string())],
        );
    }

    log_success!(codes::success::COMPONENT_EXPORTED, "Component content extracted",
        "component" => component,
        "id" => id
    );
    Ok(DumpedComponent {
        path: target_dir.join(format!("{}.xml", component)),
        document: wrap_as_document(doc, inner),
        diagnostics,
    })
}

/// Extract and write the content of a component
pub fn dump_arf_content(
    doc: &Document,
    container: &str,
    component: &str,
    id: &str,
    target_dir: &Path,
    indent: bool,
) -> Result<DumpedComponent, ComposeError> {
    let dumped = extract_arf_content(doc, container, component, id, target_dir)?;
    dumped.write(indent)?;
    Ok(dumped)
}
