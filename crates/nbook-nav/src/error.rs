//! Injection error types.

use std::path::PathBuf;

/// Error raised while attaching navigation to a page.
#[derive(Debug, thiserror::Error)]
pub enum InjectError {
    /// The rendered page has no entry in the TOC.
    #[error(
        "The following path in your table of contents couldn't be found:\n\n{path}\n\n\
         Double check your `{}` file to make sure the paths are correct.",
        .toc.display()
    )]
    PageNotInToc { path: String, toc: PathBuf },
    /// Source-level injection into a format other than markdown or notebook.
    #[error("Only markdown and ipynb files are supported, got: {0}")]
    UnsupportedFormat(String),
    /// The notebook source is not valid nbformat JSON.
    #[error("Invalid notebook {path}: {message}")]
    InvalidNotebook { path: String, message: String },
}
