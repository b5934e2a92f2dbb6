//! Navigation entries for a page's children.

use nbook_toc::{PageNode, TocEntry, strip_suffix};

/// One line of a navigation block.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NavEntry {
    /// Link to a child page, relative to the referencing page's directory.
    Page { title: Option<String>, path: String },
    /// Visual separator.
    Divider,
    /// Group label.
    Header(String),
}

/// Compute the navigation entries for `page`'s children.
///
/// TOC paths are relative to the content root, but navigation links resolve
/// relative to the page that holds them, so each child path is re-expressed
/// relative to `page`'s directory. Markers pass through unchanged. A page
/// without children yields no entries.
pub fn compute_entries(page: &PageNode) -> Vec<NavEntry> {
    let base = parent_dir(&page.file);
    page.children()
        .iter()
        .map(|child| match child {
            TocEntry::Divider => NavEntry::Divider,
            TocEntry::Header(text) => NavEntry::Header(text.clone()),
            TocEntry::Page(child) => NavEntry::Page {
                title: child.title.clone(),
                path: relative_path(&strip_suffix(&child.file), base),
            },
        })
        .collect()
}

fn parent_dir(path: &str) -> &str {
    path.rfind('/').map_or("", |i| &path[..i])
}

/// Express `target` relative to directory `base` (both `/`-separated and
/// relative to the same root).
///
/// ```
/// use nbook_nav::relative_path;
///
/// assert_eq!(relative_path("docs/guide/index", "docs"), "guide/index");
/// assert_eq!(relative_path("api/types", "docs/guide"), "../../api/types");
/// ```
pub fn relative_path(target: &str, base: &str) -> String {
    let target: Vec<&str> = segments(target).collect();
    let base: Vec<&str> = segments(base).collect();

    let common = target
        .iter()
        .zip(&base)
        .take_while(|(a, b)| a == b)
        .count();

    let mut parts: Vec<&str> = std::iter::repeat_n("..", base.len() - common).collect();
    parts.extend(&target[common..]);
    if parts.is_empty() {
        ".".to_owned()
    } else {
        parts.join("/")
    }
}

fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.split(['/', '\\']).filter(|s| !s.is_empty() && *s != ".")
}
