//! The navigation sink seam.

use nbook_toc::PageNode;

use crate::entry::NavEntry;
use crate::error::InjectError;

/// Rendering options of a navigation block.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NavFlags {
    /// Ask the renderer for numeric section labels.
    pub numbered: bool,
    /// Keep the block out of the page body; it only feeds the sidebar.
    pub hidden: bool,
    /// List only page titles, not their inner headings.
    pub titles_only: bool,
}

impl Default for NavFlags {
    fn default() -> Self {
        Self {
            numbered: false,
            hidden: true,
            titles_only: true,
        }
    }
}

impl NavFlags {
    /// Flags for the navigation block of `page`.
    pub fn for_page(page: &PageNode) -> Self {
        Self {
            numbered: page.numbered,
            ..Self::default()
        }
    }
}

/// Something a page's navigation block can be attached to.
///
/// Implemented by [`SourceSink`](crate::SourceSink) for raw page text and by
/// [`TreeSink`](crate::TreeSink) for parsed pages. Both must produce
/// navigationally equivalent output.
pub trait NavigationSink {
    /// Attach one navigation block for page `parent` listing `entries`.
    ///
    /// Callers guarantee a single call per page per build.
    fn attach(
        &mut self,
        parent: &str,
        entries: &[NavEntry],
        flags: NavFlags,
    ) -> Result<(), InjectError>;
}

/// Attach `entries` to `sink` unless there are none.
///
/// Returns whether the sink was touched.
pub fn inject(
    sink: &mut dyn NavigationSink,
    parent: &str,
    entries: &[NavEntry],
    flags: NavFlags,
) -> Result<bool, InjectError> {
    if entries.is_empty() {
        return Ok(false);
    }
    sink.attach(parent, entries, flags)?;
    Ok(true)
}

/// Render the textual `toctree` directive block.
///
/// ````text
///
/// ```{toctree}
/// :hidden:
/// :titlesonly:
/// :numbered:
///
/// Title <relative/path>
/// ++ divider
/// ++ header: Text
/// ```
/// ````
pub fn toctree_block(entries: &[NavEntry], flags: NavFlags) -> String {
    let mut block = String::from("\n```{toctree}\n");
    if flags.hidden {
        block.push_str(":hidden:\n");
    }
    if flags.titles_only {
        block.push_str(":titlesonly:\n");
    }
    if flags.numbered {
        block.push_str(":numbered:\n");
    }
    block.push('\n');

    for entry in entries {
        match entry {
            NavEntry::Page {
                title: Some(title),
                path,
            } => {
                block.push_str(title);
                block.push_str(" <");
                block.push_str(path);
                block.push('>');
            }
            NavEntry::Page { title: None, path } => block.push_str(path),
            NavEntry::Divider => block.push_str("++ divider"),
            NavEntry::Header(text) => {
                block.push_str("++ header: ");
                block.push_str(text);
            }
        }
        block.push('\n');
    }

    block.push_str("```\n");
    block
}
