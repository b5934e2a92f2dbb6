//! Whole-book and single-page builds.

use std::path::{Path, PathBuf};

use nbook_config::BookConfig;
use nbook_nav::{BuildContext, InjectionStrategy};
use nbook_toc::TOC_FILENAME;

use crate::BuildError;
use crate::builder::Builder;
use crate::compiler::{BuildRequest, Compiler};
use crate::pdf;
use crate::stage::everything_except;

/// Name of the build directory inside the output root.
pub const BUILD_DIR: &str = "_build";

/// Options for [`build_book`].
#[derive(Clone, Debug, Default)]
pub struct BookOptions {
    /// Book root directory.
    pub book: PathBuf,
    /// Output root (default: the book root).
    pub output: Option<PathBuf>,
    /// Explicit `_config.yml` (default: discovered in the book root).
    pub config: Option<PathBuf>,
    /// Explicit TOC file (default: `<book>/_toc.yml`).
    pub toc: Option<PathBuf>,
    pub builder: Builder,
    pub strategy: InjectionStrategy,
}

/// Options for [`build_page`].
#[derive(Clone, Debug, Default)]
pub struct PageOptions {
    /// Page to build.
    pub page: PathBuf,
    /// Output root (default: the page's folder).
    pub output: Option<PathBuf>,
    /// Explicit `_config.yml` (default: built-in defaults only).
    pub config: Option<PathBuf>,
    /// Notebook execution mode (default: `off`).
    pub execute: Option<String>,
}

/// Result of a successful build.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BuildOutput {
    /// Directory holding the compiler output.
    pub output_dir: PathBuf,
    /// PDF written by the post-processing step, if any.
    pub pdf: Option<PathBuf>,
}

fn absolute(path: &Path) -> Result<PathBuf, BuildError> {
    std::path::absolute(path).map_err(BuildError::io(path))
}

/// Build a whole book.
///
/// Loads the TOC and configuration, compiles with `compiler`, then runs the
/// builder's PDF step (`pdf_html`, `latexpdf`).
///
/// # Errors
///
/// Returns `BuildError::MissingToc` if no TOC is given and the book has none,
/// and any error from loading, compiling or post-processing.
pub fn build_book(options: &BookOptions, compiler: &dyn Compiler) -> Result<BuildOutput, BuildError> {
    let book = absolute(&options.book)?;
    if !book.is_dir() {
        return Err(BuildError::BookNotFound(book));
    }

    let toc_path = match &options.toc {
        Some(path) => absolute(path)?,
        None => {
            let path = book.join(TOC_FILENAME);
            if !path.is_file() {
                return Err(BuildError::MissingToc(options.book.clone()));
            }
            path
        }
    };
    let context = BuildContext::load(&toc_path, options.strategy)?;
    let config = BookConfig::load(&book, options.config.as_deref())?;

    let mut overrides = config.to_overrides();
    if let Some(master_doc) = context.master_doc() {
        overrides.set("master_doc", master_doc);
    }
    overrides.set("globaltoc_path", toc_path.display().to_string());
    options.builder.apply_overrides(&mut overrides);

    let output_root = match &options.output {
        Some(path) => absolute(path)?,
        None => book.clone(),
    };
    let build_dir = output_root.join(BUILD_DIR);
    let request = BuildRequest {
        source_dir: book,
        output_dir: build_dir.join(options.builder.output_dir_name()),
        build_dir,
        builder: options.builder,
        overrides,
    };
    tracing::info!(
        book = %request.source_dir.display(),
        builder = %options.builder,
        output = %request.output_dir.display(),
        "Building book"
    );
    compiler.compile(&request, &context)?;

    let pdf = match options.builder {
        Builder::PdfHtml => Some(pdf::html_to_pdf(
            &request.output_dir,
            &request.build_dir.join("pdf"),
        )?),
        Builder::LatexPdf => {
            pdf::latex_to_pdf(&request.output_dir)?;
            None
        }
        Builder::Html | Builder::Latex => None,
    };

    Ok(BuildOutput {
        output_dir: request.output_dir,
        pdf,
    })
}

/// Build a single page as a stand-alone HTML document.
///
/// No TOC is used: the page becomes the master document and every other
/// file in its folder is excluded.
///
/// # Errors
///
/// Returns `BuildError::PageNotFound` if the page does not exist, and any
/// error from loading the configuration or compiling.
pub fn build_page(options: &PageOptions, compiler: &dyn Compiler) -> Result<BuildOutput, BuildError> {
    let page = absolute(&options.page)?;
    if !page.is_file() {
        return Err(BuildError::PageNotFound(page));
    }
    let folder = page
        .parent()
        .map_or_else(|| PathBuf::from("."), Path::to_path_buf);
    let page_name = page
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();

    let config = match &options.config {
        Some(path) => BookConfig::load(&folder, Some(path))?,
        None => BookConfig::defaults()?,
    };
    let mut overrides = config.to_overrides();
    overrides.set("master_doc", page_name);
    overrides.extend_list("exclude_patterns", everything_except(&folder, &page)?);
    overrides.set(
        "jupyter_execute_notebooks",
        options.execute.as_deref().unwrap_or("off"),
    );
    overrides.set_nested("html_theme_options", "single_page", true);

    let output_root = match &options.output {
        Some(path) => absolute(path)?,
        None => folder.clone(),
    };
    let build_dir = output_root.join(BUILD_DIR);
    let request = BuildRequest {
        source_dir: folder,
        output_dir: build_dir.join(Builder::Html.output_dir_name()),
        build_dir,
        builder: Builder::Html,
        overrides,
    };
    tracing::info!(
        page = %page.display(),
        output = %request.output_dir.display(),
        "Building page"
    );
    compiler.compile(&request, &BuildContext::without_toc())?;

    Ok(BuildOutput {
        output_dir: request.output_dir,
        pdf: None,
    })
}
