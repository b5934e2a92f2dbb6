//! CLI error types.

use nbook_build::BuildError;
use nbook_toc::ScanError;

/// CLI error type.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Build(#[from] BuildError),

    #[error("{0}")]
    Scan(#[from] ScanError),

    #[error("{0}")]
    Validation(String),
}
