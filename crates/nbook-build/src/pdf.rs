//! PDF post-processing of compiled output.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::BuildError;
use crate::compiler::run;

/// Environment variable naming the HTML-to-PDF converter.
pub const HTML_TO_PDF_ENV: &str = "NBOOK_HTML_TO_PDF";

const DEFAULT_HTML_TO_PDF: &str = "wkhtmltopdf";

fn default_make() -> &'static str {
    if cfg!(windows) { "make.bat" } else { "make" }
}

/// Convert the single-page HTML build at `html_dir` into `<pdf_dir>/book.pdf`.
///
/// Returns the path of the written PDF.
pub fn html_to_pdf(html_dir: &Path, pdf_dir: &Path) -> Result<PathBuf, BuildError> {
    fs::create_dir_all(pdf_dir).map_err(BuildError::io(pdf_dir))?;
    let output = pdf_dir.join("book.pdf");
    let program = std::env::var(HTML_TO_PDF_ENV).unwrap_or_else(|_| DEFAULT_HTML_TO_PDF.to_owned());

    tracing::info!(converter = %program, output = %output.display(), "Converting book HTML into PDF");
    run(Command::new(program).arg(html_dir.join("index.html")).arg(&output))?;
    Ok(output)
}

/// Compile the LaTeX build at `latex_dir` to PDF with `$MAKE all-pdf`.
pub fn latex_to_pdf(latex_dir: &Path) -> Result<(), BuildError> {
    let program = std::env::var("MAKE").unwrap_or_else(|_| default_make().to_owned());

    tracing::info!(make = %program, dir = %latex_dir.display(), "Converting book LaTeX into PDF");
    run(Command::new(program).arg("all-pdf").current_dir(latex_dir))
}
