//! `nbook build` command implementation.

use std::path::PathBuf;

use clap::Args;
use nbook_build::{BookOptions, Builder, SphinxCompiler, build_book};
use nbook_nav::InjectionStrategy;

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the build command.
#[derive(Args)]
pub(crate) struct BuildArgs {
    /// Book root directory.
    path_book: PathBuf,

    /// Path to the output artifacts (default: the book directory).
    #[arg(long)]
    path_output: Option<PathBuf>,

    /// Path to the YAML configuration file (default: `<book>/_config.yml`).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Path to the Table of Contents YAML file (default: `<book>/_toc.yml`).
    #[arg(long)]
    toc: Option<PathBuf>,

    /// What kind of output to build: html, pdf_html, latex or latexpdf.
    #[arg(long, default_value_t = Builder::Html)]
    builder: Builder,

    /// Where navigation is injected: into page sources or parsed pages.
    #[arg(long, default_value = "source")]
    strategy: InjectionStrategy,

    /// Compiler executable.
    #[arg(long, env = "NBOOK_SPHINX_BUILD", default_value = "sphinx-build")]
    sphinx_build: String,
}

impl BuildArgs {
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        output.info(&format!("Book: {}", self.path_book.display()));
        output.info(&format!("Builder: {}", self.builder));

        let options = BookOptions {
            book: self.path_book,
            output: self.path_output,
            config: self.config,
            toc: self.toc,
            builder: self.builder,
            strategy: self.strategy,
        };
        let compiler = SphinxCompiler::new().with_program(self.sphinx_build);
        let built = build_book(&options, &compiler)?;

        output.success(&format!(
            "Finished generating {} for book",
            options.builder
        ));
        match built.pdf {
            Some(pdf) => output.highlight(&format!(
                "A PDF of your book can be found at: {}",
                pdf.display()
            )),
            None => output.highlight(&format!(
                "Your book can be found at: {}",
                built.output_dir.display()
            )),
        }
        Ok(())
    }
}
