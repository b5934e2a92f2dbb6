//! In-memory TOC tree.
//!
//! A TOC is a tree of [`PageNode`]s. Each page may carry an ordered list of
//! children, which are either further pages or pseudo-entries
//! ([`TocEntry::Divider`], [`TocEntry::Header`]) that only exist in rendered
//! navigation and never resolve to a file.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::TocError;
use crate::locate::{find_by_path, strip_suffix};
use crate::yaml;

/// One entry in a page's child list.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawEntry", into = "RawEntry")]
pub enum TocEntry {
    /// A content page.
    Page(PageNode),
    /// A visual separator.
    Divider,
    /// A group label.
    Header(String),
}

impl TocEntry {
    /// The page behind this entry, if it is one.
    pub fn as_page(&self) -> Option<&PageNode> {
        match self {
            Self::Page(page) => Some(page),
            Self::Divider | Self::Header(_) => None,
        }
    }
}

impl From<PageNode> for TocEntry {
    fn from(page: PageNode) -> Self {
        Self::Page(page)
    }
}

/// One content page in the TOC.
///
/// `file` is relative to the content root and may omit the extension.
/// `children` keeps the difference between an absent `pages` key and an
/// empty one so that trees survive a YAML round trip unchanged; for
/// navigation both mean "no children".
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PageNode {
    pub file: String,
    #[serde(default, alias = "name", skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub numbered: bool,
    #[serde(default, rename = "pages", skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<TocEntry>>,
}

#[allow(clippy::trivially_copy_pass_by_ref)]
fn is_false(value: &bool) -> bool {
    !*value
}

impl PageNode {
    /// Create a page with no title and no children.
    pub fn new(file: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            ..Self::default()
        }
    }

    /// Set the display title.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Set the `numbered` flag.
    #[must_use]
    pub fn numbered(mut self, numbered: bool) -> Self {
        self.numbered = numbered;
        self
    }

    /// Set the child list.
    #[must_use]
    pub fn with_children(mut self, children: Vec<TocEntry>) -> Self {
        self.children = Some(children);
        self
    }

    /// Child entries; empty when the `pages` key is absent.
    pub fn children(&self) -> &[TocEntry] {
        self.children.as_deref().unwrap_or_default()
    }

    /// Whether the page has at least one child entry.
    pub fn has_children(&self) -> bool {
        !self.children().is_empty()
    }

    /// Append a child, creating the child list if absent.
    pub fn push_child(&mut self, entry: impl Into<TocEntry>) {
        self.children.get_or_insert_with(Vec::new).push(entry.into());
    }

    /// Page path without its extension.
    pub fn stem_path(&self) -> String {
        strip_suffix(&self.file)
    }
}

/// A loaded table of contents.
///
/// The root page is the book's entry point (the first top-level entry of the
/// persisted file). A `TocTree` is built once per build and never mutated.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TocTree {
    root: PageNode,
    source: Option<PathBuf>,
}

impl TocTree {
    /// Wrap a root page.
    pub fn new(root: PageNode) -> Self {
        Self { root, source: None }
    }

    /// Parse a TOC from YAML text.
    pub fn from_yaml(text: &str) -> Result<Self, TocError> {
        yaml::deserialize(text).map(Self::new)
    }

    /// Load a TOC from a file.
    ///
    /// Paths listed in the file are not checked here; a missing page only
    /// surfaces when that page is rendered.
    pub fn load(path: &Path) -> Result<Self, TocError> {
        if !path.exists() {
            return Err(TocError::NotFound(path.to_path_buf()));
        }
        let text = std::fs::read_to_string(path).map_err(|source| TocError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let root = yaml::deserialize(&text).map_err(|e| e.in_file(path))?;
        Ok(Self {
            root,
            source: Some(path.to_path_buf()),
        })
    }

    /// Serialize back to YAML.
    pub fn to_yaml(&self) -> Result<String, TocError> {
        yaml::serialize(&self.root)
    }

    /// Root page.
    pub fn root(&self) -> &PageNode {
        &self.root
    }

    /// File this tree was loaded from, if any.
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    /// Document name of the build entry point (root file without extension).
    pub fn master_doc(&self) -> String {
        self.root.stem_path()
    }

    /// Find the first page (pre-order) whose path matches `path`.
    pub fn find(&self, path: &str) -> Option<&PageNode> {
        find_by_path(&self.root, path)
    }

    /// All pages in pre-order, root first.
    pub fn pages(&self) -> Pages<'_> {
        Pages {
            stack: vec![&self.root],
        }
    }

    /// Page paths that appear more than once, in first-seen order.
    ///
    /// Lookups resolve to the first pre-order match, so every later
    /// occurrence of these paths is unreachable.
    pub fn duplicate_paths(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut reported = HashSet::new();
        let mut duplicates = Vec::new();
        for page in self.pages() {
            let path = page.stem_path();
            if !seen.insert(path.clone()) && reported.insert(path.clone()) {
                duplicates.push(path);
            }
        }
        duplicates
    }
}

/// Pre-order iterator over the pages of a [`TocTree`].
pub struct Pages<'a> {
    stack: Vec<&'a PageNode>,
}

impl<'a> Iterator for Pages<'a> {
    type Item = &'a PageNode;

    fn next(&mut self) -> Option<Self::Item> {
        let page = self.stack.pop()?;
        self.stack
            .extend(page.children().iter().rev().filter_map(TocEntry::as_page));
        Some(page)
    }
}

/// Wire shape of a [`TocEntry`].
#[derive(Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum RawEntry {
    Page(PageNode),
    Divider(DividerMarker),
    Header(HeaderMarker),
}

#[derive(Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct DividerMarker {
    divider: bool,
}

#[derive(Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct HeaderMarker {
    header: String,
}

impl From<RawEntry> for TocEntry {
    fn from(raw: RawEntry) -> Self {
        match raw {
            RawEntry::Page(page) => Self::Page(page),
            RawEntry::Divider(_) => Self::Divider,
            RawEntry::Header(marker) => Self::Header(marker.header),
        }
    }
}

impl From<TocEntry> for RawEntry {
    fn from(entry: TocEntry) -> Self {
        match entry {
            TocEntry::Page(page) => Self::Page(page),
            TocEntry::Divider => Self::Divider(DividerMarker { divider: true }),
            TocEntry::Header(header) => Self::Header(HeaderMarker { header }),
        }
    }
}
