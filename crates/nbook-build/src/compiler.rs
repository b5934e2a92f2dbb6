//! The external document compiler.

use std::collections::HashSet;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use nbook_config::Overrides;
use nbook_nav::BuildContext;
use nbook_toc::scanner::CONTENT_EXTENSIONS;
use nbook_toc::{TOC_FILENAME, strip_suffix};

use crate::BuildError;
use crate::builder::Builder;
use crate::stage::{Excludes, stage};

/// Name of the staging directory inside the build directory.
pub const STAGING_DIR: &str = ".staging";

/// Everything a compiler needs for one run.
#[derive(Clone, Debug, PartialEq)]
pub struct BuildRequest {
    /// Book (or page folder) to compile.
    pub source_dir: PathBuf,
    /// `_build` directory; holds the staging copy and all outputs.
    pub build_dir: PathBuf,
    /// Where the compiler writes its output.
    pub output_dir: PathBuf,
    pub builder: Builder,
    pub overrides: Overrides,
}

impl BuildRequest {
    pub fn staging_dir(&self) -> PathBuf {
        self.build_dir.join(STAGING_DIR)
    }
}

/// External compiler turning book sources into output.
///
/// The compiler calls the per-page hooks of `context` on every page it
/// reads.
pub trait Compiler {
    /// Compile the sources described by `request`.
    ///
    /// # Errors
    ///
    /// Returns an error if a page hook fails or the compiler itself fails.
    fn compile(&self, request: &BuildRequest, context: &BuildContext) -> Result<(), BuildError>;
}

/// [`Compiler`] driving `sphinx-build`.
///
/// Sources are copied into a staging directory where the navigation hooks
/// rewrite them, then the staging copy is handed to `sphinx-build` with the
/// request overrides as `-D` definitions.
#[derive(Clone, Debug)]
pub struct SphinxCompiler {
    program: String,
}

impl Default for SphinxCompiler {
    fn default() -> Self {
        Self {
            program: "sphinx-build".to_owned(),
        }
    }
}

impl SphinxCompiler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use `program` instead of `sphinx-build` from `PATH`.
    #[must_use]
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    /// Stage the sources and run the page hooks on every content page.
    ///
    /// Returns the staging directory.
    pub fn prepare(&self, request: &BuildRequest, context: &BuildContext) -> Result<PathBuf, BuildError> {
        let staging = request.staging_dir();
        let excludes = Excludes::new(&request.overrides.exclude_patterns())?;
        let staged = stage(
            &request.source_dir,
            &staging,
            &excludes,
            &[request.build_dir.as_path()],
        )?;
        check_toc_pages(context, &staged)?;

        let mut injected = 0;
        for rel in staged.iter().filter(|rel| is_page(rel)) {
            let path = staging.join(rel);
            let mut text = fs::read_to_string(&path).map_err(BuildError::io(&path))?;
            if context.process_page(Path::new(rel), &mut text)? {
                fs::write(&path, text).map_err(BuildError::io(&path))?;
                injected += 1;
            }
        }
        tracing::info!(
            pages = staged.iter().filter(|rel| is_page(rel)).count(),
            injected,
            "Prepared book sources"
        );
        Ok(staging)
    }

    /// The `sphinx-build` invocation compiling `staging`.
    pub fn command(&self, request: &BuildRequest, staging: &Path) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.arg("-b").arg(request.builder.compiler_builder()).arg("-C");
        for define in request.overrides.to_define_args() {
            cmd.arg("-D").arg(define);
        }
        cmd.arg(staging).arg(&request.output_dir);
        cmd
    }
}

impl Compiler for SphinxCompiler {
    fn compile(&self, request: &BuildRequest, context: &BuildContext) -> Result<(), BuildError> {
        let staging = self.prepare(request, context)?;
        let mut cmd = self.command(request, &staging);
        tracing::info!(
            program = %self.program,
            builder = request.builder.compiler_builder(),
            output = %request.output_dir.display(),
            "Running compiler"
        );
        run(&mut cmd)
    }
}

/// Fail on the first TOC page with no staged source file.
fn check_toc_pages(context: &BuildContext, staged: &[String]) -> Result<(), BuildError> {
    let Some(toc) = context.toc() else {
        return Ok(());
    };
    let available: HashSet<String> = staged
        .iter()
        .filter(|rel| is_page(rel))
        .map(|rel| strip_suffix(rel))
        .collect();
    match toc.pages().find(|page| !available.contains(&page.stem_path())) {
        Some(page) => Err(BuildError::MissingPage {
            path: page.file.clone(),
            toc: toc
                .source()
                .map_or_else(|| PathBuf::from(TOC_FILENAME), Path::to_path_buf),
        }),
        None => Ok(()),
    }
}

fn is_page(rel: &str) -> bool {
    Path::new(rel)
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| CONTENT_EXTENSIONS.contains(&ext))
}

/// Run `cmd` to completion, failing on a non-zero exit.
pub(crate) fn run(cmd: &mut Command) -> Result<(), BuildError> {
    let program = cmd.get_program().to_string_lossy().into_owned();
    tracing::debug!(
        program = %program,
        args = ?cmd.get_args().map(OsString::from).collect::<Vec<_>>(),
        "Spawning"
    );
    let status = cmd.status().map_err(|source| BuildError::Spawn {
        program: program.clone(),
        source,
    })?;
    if !status.success() {
        return Err(BuildError::CommandFailed { program, status });
    }
    Ok(())
}
