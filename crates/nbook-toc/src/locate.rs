//! Page lookup by path.
//!
//! Paths are compared without their extension, so `intro`, `intro.md` and
//! `intro.ipynb` all name the same page.

use crate::model::{PageNode, TocEntry};
use crate::scanner::CONTENT_EXTENSIONS;

/// Depth-first, pre-order search for the page whose path matches `target`.
///
/// Returns the first match. Dividers, headers and absent child lists are
/// skipped. Returns `None` when nothing matches; callers decide whether that
/// is an error.
pub fn find_by_path<'a>(root: &'a PageNode, target: &str) -> Option<&'a PageNode> {
    let target = strip_suffix(target);
    find_stripped(root, &target)
}

fn find_stripped<'a>(page: &'a PageNode, target: &str) -> Option<&'a PageNode> {
    if strip_suffix(&page.file) == target {
        return Some(page);
    }
    page.children()
        .iter()
        .filter_map(TocEntry::as_page)
        .find_map(|child| find_stripped(child, target))
}

/// Remove a content extension (`.md`, `.ipynb`, `.rst`) from the last
/// component of a `/`-separated path.
///
/// Any other dotted suffix is part of the page name. Leading dots (hidden
/// files) are not treated as extensions, and backslashes are normalized
/// to `/`.
///
/// ```
/// use nbook_toc::strip_suffix;
///
/// assert_eq!(strip_suffix("guide/index.md"), "guide/index");
/// assert_eq!(strip_suffix("guide/index"), "guide/index");
/// assert_eq!(strip_suffix("notes/release.v2"), "notes/release.v2");
/// assert_eq!(strip_suffix("notes/release.v2.md"), "notes/release.v2");
/// ```
pub fn strip_suffix(path: &str) -> String {
    let path = path.replace('\\', "/");
    let name_start = path.rfind('/').map_or(0, |i| i + 1);
    match path[name_start..].rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() && CONTENT_EXTENSIONS.contains(&ext) => {
            path[..name_start + stem.len()].to_owned()
        }
        _ => path,
    }
}
