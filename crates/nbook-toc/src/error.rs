//! TOC error types.

use std::path::PathBuf;

/// Error loading or parsing a persisted TOC.
#[derive(Debug, thiserror::Error)]
pub enum TocError {
    /// The TOC file does not exist.
    #[error("Table of contents not found: {}", .0.display())]
    NotFound(PathBuf),
    /// The TOC file could not be read.
    #[error("Failed to read table of contents {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The YAML could not be parsed into TOC entries.
    #[error("Invalid table of contents: {0}")]
    Parse(#[from] serde_yaml::Error),
    /// The YAML parsed but does not describe a usable tree.
    #[error("Invalid table of contents: {0}")]
    Invalid(String),
}

impl TocError {
    /// Attach the TOC file path to a parse failure.
    pub(crate) fn in_file(self, path: &std::path::Path) -> Self {
        match self {
            Self::Parse(e) => Self::Invalid(format!("{}: {e}", path.display())),
            Self::Invalid(msg) => Self::Invalid(format!("{}: {msg}", path.display())),
            other => other,
        }
    }
}

/// Error generating a TOC from a content directory.
#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    /// Scan root does not exist or is not a directory.
    #[error("Content directory not found: {}", .0.display())]
    NotFound(PathBuf),
    /// No allow-listed content file exists anywhere under the root.
    #[error("No content files were found in {}", .0.display())]
    NoContent(PathBuf),
    /// Directory listing or TOC write failed.
    #[error("I/O error at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The generated tree could not be serialized.
    #[error(transparent)]
    Toc(#[from] TocError),
}
