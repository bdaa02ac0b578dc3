//! # Tailoring Merge
//!
//! Adds an XCCDF tailoring document to the embedded data stream as a new
//! component and registers it under the data stream's checklists through a
//! `component-ref`.

use crate::api::errors::ComposeError;
use crate::diagnostics::Diagnostics;
use crate::ids::{allocate_unique, mangle_filepath};
use crate::import::clone_into;
use crate::namespaces::ArfNamespace;
use crate::xml::{Document, NodeId, QName};
use arf_core::logging::codes;
use chrono::{DateTime, Local};
use std::time::SystemTime;

/// Path value meaning "no tailoring file"
pub const NO_TAILORING: &str = "NONEXISTENT";

const COMPONENT_ID_PREFIX: &str = "scap_org.open-scap_comp_";
const COMPONENT_REF_ID_PREFIX: &str = "scap_org.open-scap_cref_";
const ID_SUFFIX: &str = "_tailoring";

/// A parsed tailoring document with the path it was read from
#[derive(Debug, Clone)]
pub struct TailoringSource {
    pub path: String,
    pub document: Document,
    /// Last modification time, `YYYY-MM-DDTHH:MM:SS` local time
    pub timestamp: Option<String>,
}

impl TailoringSource {
    pub fn new(path: &str, document: Document) -> Self {
        Self {
            path: path.to_string(),
            document,
            timestamp: None,
        }
    }

    pub fn with_timestamp(mut self, timestamp: &str) -> Self {
        self.timestamp = Some(timestamp.to_string());
        self
    }

    pub fn with_modified_time(mut self, modified: SystemTime) -> Self {
        self.timestamp = Some(format_timestamp(modified));
        self
    }

    pub fn is_placeholder(&self) -> bool {
        self.path == NO_TAILORING
    }
}

/// Local-time `YYYY-MM-DDTHH:MM:SS`
pub fn format_timestamp(time: SystemTime) -> String {
    DateTime::<Local>::from(time)
        .format("%Y-%m-%dT%H:%M:%S")
        .to_string()
}

/// Identifiers given to a merged tailoring
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TailoringIds {
    pub component_id: String,
    pub component_ref_id: String,
}

fn has_component(doc: &Document, bundle_root: NodeId, id: &str) -> bool {
    doc.children_named(bundle_root, "component")
        .any(|component| doc.attribute(component, "id") == Some(id))
}

fn has_component_ref(doc: &Document, bundle_root: NodeId, id: &str) -> bool {
    doc.children_named(bundle_root, "data-stream").any(|stream| {
        doc.descendants(stream).into_iter().any(|node| {
            doc.has_local_name(node, "component-ref") && doc.attribute(node, "id") == Some(id)
        })
    })
}

/// Component and component-ref ids for a tailoring read from `path`
pub fn allocate_tailoring_ids(
    doc: &Document,
    bundle_root: NodeId,
    path: &str,
) -> Result<TailoringIds, ComposeError> {
    let mangled = mangle_filepath(path);

    let component_id = allocate_unique(
        &format!("{}{}{}", COMPONENT_ID_PREFIX, mangled, ID_SUFFIX),
        |candidate| has_component(doc, bundle_root, candidate),
    )?;
    let component_ref_id = allocate_unique(
        &format!("{}{}{}", COMPONENT_REF_ID_PREFIX, mangled, ID_SUFFIX),
        |candidate| has_component_ref(doc, bundle_root, candidate),
    )?;

    Ok(TailoringIds {
        component_id,
        component_ref_id,
    })
}

/// Merge `tailoring` into the data stream collection rooted at
/// `bundle_root`. Returns `None` for the placeholder path.
pub fn merge_tailoring(
    doc: &mut Document,
    bundle_root: NodeId,
    tailoring: &TailoringSource,
    diagnostics: &mut Diagnostics,
) -> Result<Option<TailoringIds>, ComposeError> {
    if tailoring.is_placeholder() {
        return Ok(None);
    }
    let tailoring_root = tailoring
        .document
        .root()
        .ok_or(ComposeError::EmptyDocument { role: "tailoring" })?;

    let ids = allocate_tailoring_ids(doc, bundle_root, &tailoring.path)?;

    let bundle_name = doc
        .name(bundle_root)
        .cloned()
        .unwrap_or_else(|| QName::local("data-stream-collection"));
    let in_bundle_ns = |local: &str| QName {
        local: local.to_string(),
        ..bundle_name.clone()
    };

    let component = doc.create_element(in_bundle_ns("component"));
    doc.set_attribute(component, "id", &ids.component_id);
    match &tailoring.timestamp {
        Some(timestamp) => doc.set_attribute(component, "timestamp", timestamp),
        None => diagnostics.warning(
            codes::tailoring::TIMESTAMP_UNAVAILABLE,
            "Tailoring modification time unknown, component has no timestamp",
            &[("path", &tailoring.path)],
        ),
    }
    doc.append_child(bundle_root, component);
    clone_into(doc, component, &tailoring.document, tailoring_root);

    let checklists = match doc.first_child_named(bundle_root, "data-stream") {
        Some(stream) => match doc.first_child_named(stream, "checklists") {
            Some(checklists) => checklists,
            None => {
                let checklists = doc.create_element(in_bundle_ns("checklists"));
                doc.append_child(stream, checklists);
                checklists
            }
        },
        None => {
            let stream = doc.create_element(in_bundle_ns("data-stream"));
            doc.append_child(bundle_root, stream);
            let checklists = doc.create_element(in_bundle_ns("checklists"));
            doc.append_child(stream, checklists);
            checklists
        }
    };

    let component_ref = doc.create_element(in_bundle_ns("component-ref"));
    doc.set_attribute(component_ref, "id", &ids.component_ref_id);
    let xlink = ArfNamespace::Xlink;
    let prefix = match doc.lookup_prefix(checklists, xlink.uri()) {
        Some(prefix) => prefix.to_string(),
        None => {
            doc.declare_namespace(component_ref, Some(xlink.conventional_prefix()), xlink.uri());
            xlink.conventional_prefix().to_string()
        }
    };
    doc.set_attribute_qualified(
        component_ref,
        QName::qualified(xlink.uri(), Some(&prefix), "href"),
        &format!("#{}", ids.component_id),
    );
    doc.append_child(checklists, component_ref);

    Ok(Some(ids))
}
