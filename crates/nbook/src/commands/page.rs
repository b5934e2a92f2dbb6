//! `nbook page` command implementation.

use std::path::PathBuf;

use clap::Args;
use nbook_build::{PageOptions, SphinxCompiler, build_page};

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the page command.
#[derive(Args)]
pub(crate) struct PageArgs {
    /// Page to build.
    path_page: PathBuf,

    /// Path to the output artifacts (default: the page's folder).
    #[arg(long)]
    path_output: Option<PathBuf>,

    /// Path to the YAML configuration file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Notebook execution mode (default: off).
    #[arg(long)]
    execute: Option<String>,

    /// Compiler executable.
    #[arg(long, env = "NBOOK_SPHINX_BUILD", default_value = "sphinx-build")]
    sphinx_build: String,
}

impl PageArgs {
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        output.info(&format!("Page: {}", self.path_page.display()));

        let options = PageOptions {
            page: self.path_page,
            output: self.path_output,
            config: self.config,
            execute: self.execute,
        };
        let compiler = SphinxCompiler::new().with_program(self.sphinx_build);
        let built = build_page(&options, &compiler)?;

        output.success(&format!(
            "Page built successfully to {}",
            built.output_dir.display()
        ));
        Ok(())
    }
}
