//! Build-scoped state and per-page hooks.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use nbook_toc::{PageNode, TOC_FILENAME, TocError, TocTree};

use crate::entry::{NavEntry, compute_entries};
use crate::error::InjectError;
use crate::notebook;
use crate::sink::{NavFlags, inject};
use crate::source::{SourceFormat, SourceSink};
use crate::tree::{DocTree, TreeSink};

/// Where navigation is injected during a build.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum InjectionStrategy {
    /// Append directive text to the raw page source before parsing.
    #[default]
    Source,
    /// Attach navigation nodes to the parsed page tree.
    Tree,
}

impl FromStr for InjectionStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "source" => Ok(Self::Source),
            "tree" => Ok(Self::Tree),
            other => Err(format!(
                "unknown injection strategy '{other}', expected 'source' or 'tree'"
            )),
        }
    }
}

/// Read-only state shared by every page hook of one build.
///
/// Holds the loaded TOC (if the build uses one) and the active injection
/// strategy. Hooks only read from it, so one context can serve pages
/// processed in parallel.
#[derive(Clone, Debug)]
pub struct BuildContext {
    toc: Option<TocTree>,
    strategy: InjectionStrategy,
}

impl BuildContext {
    /// Context for a build driven by `toc`.
    ///
    /// Logs a warning for every page path listed more than once; lookups
    /// resolve to the first occurrence.
    pub fn new(toc: TocTree, strategy: InjectionStrategy) -> Self {
        for path in toc.duplicate_paths() {
            tracing::warn!(
                path = %path,
                "Page listed more than once in the table of contents; only the first entry is used"
            );
        }
        Self {
            toc: Some(toc),
            strategy,
        }
    }

    /// Load the TOC at `path` and build a context from it.
    pub fn load(path: &Path, strategy: InjectionStrategy) -> Result<Self, TocError> {
        let toc = TocTree::load(path)?;
        tracing::info!(
            path = %path.display(),
            master_doc = %toc.master_doc(),
            "Loaded table of contents"
        );
        Ok(Self::new(toc, strategy))
    }

    /// Context for builds without a TOC (single pages); hooks do nothing.
    pub fn without_toc() -> Self {
        Self {
            toc: None,
            strategy: InjectionStrategy::default(),
        }
    }

    pub fn toc(&self) -> Option<&TocTree> {
        self.toc.as_ref()
    }

    pub fn strategy(&self) -> InjectionStrategy {
        self.strategy
    }

    /// Entry point document of the build, if a TOC is loaded.
    pub fn master_doc(&self) -> Option<String> {
        self.toc.as_ref().map(TocTree::master_doc)
    }

    /// Path of the TOC file, for error messages.
    fn toc_path(&self) -> PathBuf {
        self.toc
            .as_ref()
            .and_then(TocTree::source)
            .map_or_else(|| PathBuf::from(TOC_FILENAME), Path::to_path_buf)
    }

    /// Find the TOC node of the page at `page_path` (relative to the content
    /// root, extension optional).
    ///
    /// Returns `Ok(None)` when no TOC is loaded.
    ///
    /// # Errors
    ///
    /// Returns [`InjectError::PageNotInToc`] if the page is not listed.
    pub fn locate(&self, page_path: &Path) -> Result<Option<&PageNode>, InjectError> {
        let Some(toc) = &self.toc else {
            return Ok(None);
        };
        let path = page_path.to_string_lossy().replace('\\', "/");
        toc.find(&path)
            .map(Some)
            .ok_or_else(|| InjectError::PageNotInToc {
                path,
                toc: self.toc_path(),
            })
    }

    fn navigation_for(
        &self,
        page_path: &Path,
    ) -> Result<Option<(String, Vec<NavEntry>, NavFlags)>, InjectError> {
        let Some(page) = self.locate(page_path)? else {
            return Ok(None);
        };
        let entries = compute_entries(page);
        if entries.is_empty() {
            return Ok(None);
        }
        Ok(Some((page.stem_path(), entries, NavFlags::for_page(page))))
    }

    /// Source-preprocessing hook: append navigation to the raw text of the
    /// page at `page_path`.
    ///
    /// Does nothing unless a TOC is loaded and the strategy is
    /// [`InjectionStrategy::Source`]. Returns whether the source changed.
    pub fn on_source_read(&self, page_path: &Path, source: &mut String) -> Result<bool, InjectError> {
        if self.strategy != InjectionStrategy::Source {
            return Ok(false);
        }
        let Some((parent, entries, flags)) = self.navigation_for(page_path)? else {
            return Ok(false);
        };
        inject(&mut SourceSink::new(page_path, source), &parent, &entries, flags)
    }

    /// Parsed-tree hook: attach a navigation node to the parsed page.
    ///
    /// Does nothing unless a TOC is loaded and the strategy is
    /// [`InjectionStrategy::Tree`]. Returns whether the tree changed.
    pub fn on_doctree_read(&self, page_path: &Path, tree: &mut DocTree) -> Result<bool, InjectError> {
        if self.strategy != InjectionStrategy::Tree {
            return Ok(false);
        }
        let Some((parent, entries, flags)) = self.navigation_for(page_path)? else {
            return Ok(false);
        };
        inject(&mut TreeSink::new(tree), &parent, &entries, flags)
    }

    /// Run the active strategy's hook on the raw text of a page.
    ///
    /// Under [`InjectionStrategy::Tree`] markdown and notebook pages are
    /// parsed into a [`DocTree`], passed to [`Self::on_doctree_read`] and
    /// written back. Pages without navigation are never parsed.
    pub fn process_page(&self, page_path: &Path, source: &mut String) -> Result<bool, InjectError> {
        if self.strategy == InjectionStrategy::Source {
            return self.on_source_read(page_path, source);
        }
        if self.navigation_for(page_path)?.is_none() {
            return Ok(false);
        }

        match SourceFormat::from_path(page_path) {
            SourceFormat::Markdown => {
                let mut tree = DocTree::from_markdown(source);
                let changed = self.on_doctree_read(page_path, &mut tree)?;
                *source = tree.to_markdown();
                Ok(changed)
            }
            SourceFormat::Notebook => {
                let path = page_path.display().to_string();
                let invalid = |message: String| InjectError::InvalidNotebook {
                    path: path.clone(),
                    message,
                };
                let nb = notebook::parse(&path, source).map_err(invalid)?;
                let mut tree = DocTree::from_notebook(&nb);
                let changed = self.on_doctree_read(page_path, &mut tree)?;
                *source = notebook::write(&tree.to_notebook(&nb)).map_err(|e| invalid(e.to_string()))?;
                Ok(changed)
            }
            SourceFormat::Other(ext) => Err(InjectError::UnsupportedFormat(ext)),
        }
    }
}
