//! `nbook toc` command implementation.

use std::path::PathBuf;

use clap::Args;
use nbook_toc::{ScanOptions, TOC_FILENAME, write_toc};

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the toc command.
///
/// Files and folders are ordered by name. A file called `index` (any
/// content extension) anchors its folder.
#[derive(Args)]
pub(crate) struct TocArgs {
    /// Content folder to scan.
    path: PathBuf,

    /// Character in file names replaced by spaces when deriving titles.
    #[arg(long, default_value = "_")]
    filename_split_char: String,

    /// Skip files and folders whose path contains this text (repeatable).
    #[arg(long)]
    skip_text: Vec<String>,

    /// Folder the TOC is written to (default: `path`).
    #[arg(long)]
    output_folder: Option<PathBuf>,
}

impl TocArgs {
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let options = ScanOptions {
            split_char: self.filename_split_char,
            skip: self.skip_text,
        };
        let target = self
            .output_folder
            .as_deref()
            .unwrap_or(&self.path)
            .join(TOC_FILENAME);
        if target.exists() {
            output.warning(&format!("Overwriting existing {}", target.display()));
        }
        let written = write_toc(&self.path, &options, self.output_folder.as_deref())?;

        output.success(&format!(
            "Table of Contents written to {}",
            written.display()
        ));
        Ok(())
    }
}
