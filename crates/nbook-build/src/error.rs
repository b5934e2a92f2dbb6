//! Build error types.

use std::path::PathBuf;
use std::process::ExitStatus;

use nbook_config::ConfigError;
use nbook_nav::InjectError;
use nbook_toc::TocError;

/// Error returned by book and page builds.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("Book directory not found: {}", .0.display())]
    BookNotFound(PathBuf),

    #[error("Page not found: {}", .0.display())]
    PageNotFound(PathBuf),

    /// No `--toc` given and the book has no `_toc.yml`.
    #[error(
        "Couldn't find a Table of Contents file in {}. To auto-generate one, run\n\n\tnbook toc {}",
        .0.display(),
        .0.display()
    )]
    MissingToc(PathBuf),

    /// A TOC entry names a page that is not in the book.
    #[error(
        "The following path in your table of contents couldn't be found:\n\n{path}\n\n\
         Double check your `{}` file to make sure the paths are correct.",
        .toc.display()
    )]
    MissingPage { path: String, toc: PathBuf },

    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Toc(#[from] TocError),

    #[error("{0}")]
    Inject(#[from] InjectError),

    #[error("Invalid exclude pattern '{pattern}': {source}")]
    Pattern {
        pattern: String,
        source: glob::PatternError,
    },

    #[error("Failed to access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// External program could not be started.
    #[error("Failed to run {program}: {source}")]
    Spawn {
        program: String,
        source: std::io::Error,
    },

    /// External program ran but reported failure.
    #[error("{program} failed ({status})")]
    CommandFailed { program: String, status: ExitStatus },
}

impl BuildError {
    pub(crate) fn io(path: impl Into<PathBuf>) -> impl FnOnce(std::io::Error) -> Self {
        let path = path.into();
        move |source| Self::Io { path, source }
    }
}
