//! `nbook create` command implementation.

use std::fs;
use std::path::{Path, PathBuf};

use clap::Args;

use crate::error::CliError;
use crate::output::Output;

/// Files of the starter book, relative to its root.
const TEMPLATE: &[(&str, &str)] = &[
    ("_config.yml", include_str!("../../template/_config.yml")),
    ("_toc.yml", include_str!("../../template/_toc.yml")),
    ("intro.md", include_str!("../../template/intro.md")),
    ("content.md", include_str!("../../template/content.md")),
];

/// Arguments for the create command.
#[derive(Args)]
pub(crate) struct CreateArgs {
    /// Directory to create the book in; must not exist yet.
    path_output: PathBuf,
}

impl CreateArgs {
    pub(crate) fn execute(self) -> Result<(), CliError> {
        create_book(&self.path_output)?;
        Output::new().success(&format!(
            "Your book template can be found at {}",
            self.path_output.display()
        ));
        Ok(())
    }
}

/// Write the starter book into `path`.
fn create_book(path: &Path) -> Result<(), CliError> {
    if path.is_dir() {
        return Err(CliError::Validation(format!(
            "The output book already exists. Delete {} first.",
            path.display()
        )));
    }
    fs::create_dir_all(path)?;
    for (name, content) in TEMPLATE {
        fs::write(path.join(name), content)?;
    }
    tracing::info!(path = %path.display(), files = TEMPLATE.len(), "Created book");
    Ok(())
}
