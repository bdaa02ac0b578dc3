//! Identifier generation for generated components
//!
//! Two policies are used. Asset ids take a single pass over the existing
//! siblings and bump the suffix whenever the current candidate is seen
//! ([`next_asset_id`]). Tailoring ids try the bare base first and then
//! append a three-digit counter until the id is free ([`allocate_unique`]).

use crate::api::errors::ComposeError;
use crate::xml::{Document, NodeId};
use arf_core::config::compile_time::identifiers::{MAX_ID_ATTEMPTS, MAX_ID_LENGTH};

pub const ASSET_ID_PREFIX: &str = "asset";

/// Next `asset<N>` id for a new child of the `assets` container
pub fn next_asset_id(doc: &Document, assets: NodeId) -> String {
    dense_suffix_id(doc, assets, "asset", ASSET_ID_PREFIX, 0)
}

/// Single-pass scan over the `component` children of `container`: every
/// one whose `id` equals the current candidate advances the suffix
pub fn dense_suffix_id(
    doc: &Document,
    container: NodeId,
    component: &str,
    prefix: &str,
    start: usize,
) -> String {
    let mut suffix = start;
    for child in doc.children_named(container, component) {
        if doc.attribute(child, "id") == Some(format!("{}{}", prefix, suffix).as_str()) {
            suffix += 1;
        }
    }
    format!("{}{}", prefix, suffix)
}

/// `base` when free, otherwise `base000`, `base001`, ...
pub fn allocate_unique(
    base: &str,
    mut exists: impl FnMut(&str) -> bool,
) -> Result<String, ComposeError> {
    if base.len() > MAX_ID_LENGTH {
        return Err(ComposeError::IdentifierTooLong {
            length: base.len(),
            limit: MAX_ID_LENGTH,
        });
    }

    if !exists(base) {
        return Ok(base.to_string());
    }

    for counter in 0..MAX_ID_ATTEMPTS {
        let candidate = format!("{}{:03}", base, counter);
        if !exists(&candidate) {
            return Ok(candidate);
        }
    }

    Err(ComposeError::IdentifierSpaceExhausted {
        base: base.to_string(),
        attempts: MAX_ID_ATTEMPTS,
    })
}

/// Make a file path usable inside an identifier
pub fn mangle_filepath(path: &str) -> String {
    path.chars()
        .map(|c| if c == '/' || c == '\\' { '-' } else { c })
        .collect()
}
