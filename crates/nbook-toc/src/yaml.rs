//! Persisted YAML form of the TOC.
//!
//! The file is either a single page mapping or a sequence of entries. A
//! sequence is normalized so that its first element becomes the root page and
//! every later top-level element is appended to the root's children. This
//! lets authors write a flat list of top-level sections:
//!
//! ```yaml
//! - file: index
//! - file: intro
//!   title: Introduction
//! - divider: true
//! - file: guide/index
//!   numbered: true
//!   pages:
//!   - file: guide/setup
//! ```

use serde::Deserialize;

use crate::error::TocError;
use crate::model::{PageNode, TocEntry};

/// Top-level document shape.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawToc {
    Entries(Vec<TocEntry>),
    Page(PageNode),
}

/// Parse YAML text into a root page.
///
/// # Errors
///
/// Returns [`TocError::Parse`] for malformed YAML or entries that match no
/// known shape, and [`TocError::Invalid`] for an empty list or a list whose
/// first element is not a page.
pub fn deserialize(text: &str) -> Result<PageNode, TocError> {
    if text.trim().is_empty() {
        return Err(TocError::Invalid("file is empty".to_owned()));
    }

    match serde_yaml::from_str(text)? {
        RawToc::Page(root) => Ok(root),
        RawToc::Entries(entries) => normalize(entries),
    }
}

/// Fold a flat top-level sequence into a single root page.
fn normalize(entries: Vec<TocEntry>) -> Result<PageNode, TocError> {
    let mut entries = entries.into_iter();
    let mut root = match entries.next() {
        Some(TocEntry::Page(page)) => page,
        Some(_) => {
            return Err(TocError::Invalid(
                "the first entry must be a page with a `file` key".to_owned(),
            ));
        }
        None => return Err(TocError::Invalid("no entries".to_owned())),
    };

    let siblings: Vec<TocEntry> = entries.collect();
    if !siblings.is_empty() {
        root.children.get_or_insert_with(Vec::new).extend(siblings);
    }
    Ok(root)
}

/// Render a root page as YAML.
///
/// A root with children is written in the flat form (root first, children as
/// top-level siblings); otherwise the root is written as a one-element list.
/// Either way [`deserialize`] restores an identical tree.
///
/// # Errors
///
/// Returns [`TocError::Parse`] if serialization fails.
pub fn serialize(root: &PageNode) -> Result<String, TocError> {
    let entries: Vec<TocEntry> = if root.has_children() {
        let mut head = root.clone();
        let children = head.children.take().unwrap_or_default();
        std::iter::once(TocEntry::Page(head))
            .chain(children)
            .collect()
    } else {
        vec![TocEntry::Page(root.clone())]
    };

    Ok(serde_yaml::to_string(&entries)?)
}
