//! Source-level injection.
//!
//! Appends a textual `toctree` directive to a page's raw source before the
//! compiler parses it. Markdown gets the block appended to the text; a
//! notebook gets it as a new trailing markdown cell.

use std::path::Path;

use crate::entry::NavEntry;
use crate::error::InjectError;
use crate::notebook;
use crate::sink::{NavFlags, NavigationSink, toctree_block};

/// Source format of a page, decided by file extension.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SourceFormat {
    /// `.md`
    Markdown,
    /// `.ipynb`
    Notebook,
    /// Anything else; carries the extension (with dot) or an empty string.
    Other(String),
}

impl SourceFormat {
    /// Detect the format of `path`.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some("md") => Self::Markdown,
            Some("ipynb") => Self::Notebook,
            Some(ext) => Self::Other(format!(".{ext}")),
            None => Self::Other(String::new()),
        }
    }
}

/// [`NavigationSink`] writing into a page's raw source text.
///
/// Format support is checked when something is attached, so a page in an
/// unsupported format only fails if it actually has children.
pub struct SourceSink<'a> {
    path: &'a Path,
    format: SourceFormat,
    source: &'a mut String,
}

impl<'a> SourceSink<'a> {
    /// Create a sink for the page at `path` whose text is `source`.
    pub fn new(path: &'a Path, source: &'a mut String) -> Self {
        Self {
            path,
            format: SourceFormat::from_path(path),
            source,
        }
    }

    fn append_notebook_cell(&mut self, block: &str) -> Result<(), InjectError> {
        let path = self.path.display().to_string();
        let mut nb = notebook::parse(&path, self.source.as_str())
            .map_err(|message| Self::invalid(&path, message))?;
        if let Some(cells) = notebook::cells_mut(&mut nb) {
            cells.push(notebook::markdown_cell(block));
        }
        *self.source = notebook::write(&nb).map_err(|e| Self::invalid(&path, e.to_string()))?;
        Ok(())
    }

    fn invalid(path: &str, message: String) -> InjectError {
        InjectError::InvalidNotebook {
            path: path.to_owned(),
            message,
        }
    }
}

impl NavigationSink for SourceSink<'_> {
    fn attach(
        &mut self,
        parent: &str,
        entries: &[NavEntry],
        flags: NavFlags,
    ) -> Result<(), InjectError> {
        let block = toctree_block(entries, flags);
        match self.format {
            SourceFormat::Markdown => self.source.push_str(&block),
            SourceFormat::Notebook => self.append_notebook_cell(&block)?,
            SourceFormat::Other(ref ext) => {
                return Err(InjectError::UnsupportedFormat(ext.clone()));
            }
        }
        tracing::debug!(page = parent, entries = entries.len(), "Injected toctree into source");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::Value;

    fn entries() -> Vec<NavEntry> {
        vec![NavEntry::Page {
            title: None,
            path: "intro".to_owned(),
        }]
    }

    #[test]
    fn test_format_detection() {
        assert_eq!(SourceFormat::from_path(Path::new("a.md")), SourceFormat::Markdown);
        assert_eq!(
            SourceFormat::from_path(Path::new("a/b.ipynb")),
            SourceFormat::Notebook
        );
        assert_eq!(
            SourceFormat::from_path(Path::new("a.rst")),
            SourceFormat::Other(".rst".to_owned())
        );
        assert_eq!(
            SourceFormat::from_path(Path::new("README")),
            SourceFormat::Other(String::new())
        );
    }

    #[test]
    fn test_markdown_appends_block() {
        let mut source = "# Home\n\nWelcome.\n".to_owned();
        let path = Path::new("index.md");

        SourceSink::new(path, &mut source)
            .attach("index", &entries(), NavFlags::default())
            .unwrap();

        assert_eq!(
            source,
            "# Home\n\nWelcome.\n\n```{toctree}\n:hidden:\n:titlesonly:\n\nintro\n```\n"
        );
    }

    #[test]
    fn test_notebook_appends_markdown_cell() {
        let mut source = r#"{"cells": [{"cell_type": "code", "source": "1"}], "nbformat": 4}"#
            .to_owned();
        let path = Path::new("index.ipynb");

        SourceSink::new(path, &mut source)
            .attach("index", &entries(), NavFlags::default())
            .unwrap();

        let nb: Value = serde_json::from_str(&source).unwrap();
        let cells = nb["cells"].as_array().unwrap();
        assert_eq!(cells.len(), 2);
        assert_eq!(cells[1]["cell_type"], "markdown");
        assert_eq!(
            cells[1]["source"],
            toctree_block(&entries(), NavFlags::default())
        );
        assert_eq!(nb["nbformat"], 4);
    }

    #[test]
    fn test_invalid_notebook() {
        let mut source = "{".to_owned();
        let err = SourceSink::new(Path::new("x.ipynb"), &mut source)
            .attach("x", &entries(), NavFlags::default())
            .unwrap_err();

        assert!(matches!(err, InjectError::InvalidNotebook { .. }));
        assert_eq!(source, "{");
    }

    #[test]
    fn test_unsupported_format() {
        let mut source = "Title\n=====\n".to_owned();
        let err = SourceSink::new(Path::new("page.rst"), &mut source)
            .attach("page", &entries(), NavFlags::default())
            .unwrap_err();

        assert!(matches!(err, InjectError::UnsupportedFormat(ref ext) if ext == ".rst"));
        assert_eq!(source, "Title\n=====\n");
    }
}
