//! Copying a book into the staging directory the compiler reads from.

use std::fs;
use std::path::{Path, PathBuf};

use glob::{MatchOptions, Pattern};

use crate::BuildError;

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

/// Compiled `exclude_patterns`, matched against `/`-separated paths
/// relative to the book root.
#[derive(Debug, Default)]
pub(crate) struct Excludes {
    patterns: Vec<Pattern>,
}

impl Excludes {
    pub(crate) fn new(raw: &[String]) -> Result<Self, BuildError> {
        let patterns = raw
            .iter()
            .map(|pattern| compile(pattern))
            .collect::<Result<_, _>>()?;
        Ok(Self { patterns })
    }

    pub(crate) fn is_excluded(&self, rel_path: &str) -> bool {
        self.patterns
            .iter()
            .any(|p| p.matches_with(rel_path, MATCH_OPTIONS))
    }
}

/// Compile one exclude pattern.
///
/// A `**` glued to other text inside a path component (`**.ipynb_checkpoints`)
/// matches that text at any depth, so it is rewritten as `**/*.ipynb_checkpoints`.
fn compile(raw: &str) -> Result<Pattern, BuildError> {
    let text = raw
        .split('/')
        .map(|part| {
            if part == "**" || !part.contains("**") {
                part.to_owned()
            } else if let Some(rest) = part.strip_prefix("**") {
                format!("**/*{}", rest.replace("**", "*"))
            } else {
                part.replace("**", "*")
            }
        })
        .collect::<Vec<_>>()
        .join("/");
    Pattern::new(&text).map_err(|source| BuildError::Pattern {
        pattern: raw.to_owned(),
        source,
    })
}

/// Relative `/`-separated path of `path` under `root`.
pub(crate) fn rel_path(path: &Path, root: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .to_string_lossy()
        .replace('\\', "/")
}

/// Copy `source` into `staging`, leaving out excluded paths and the
/// directories in `skip`.
///
/// Returns the relative paths of the staged files, sorted.
pub(crate) fn stage(
    source: &Path,
    staging: &Path,
    excludes: &Excludes,
    skip: &[&Path],
) -> Result<Vec<String>, BuildError> {
    if staging.exists() {
        fs::remove_dir_all(staging).map_err(BuildError::io(staging))?;
    }
    fs::create_dir_all(staging).map_err(BuildError::io(staging))?;

    let mut staged = Vec::new();
    let mut walker = Walker {
        source,
        staging,
        excludes,
        skip,
        staged: &mut staged,
    };
    walker.copy_dir(source)?;
    staged.sort();
    tracing::debug!(files = staged.len(), staging = %staging.display(), "Staged book sources");
    Ok(staged)
}

struct Walker<'a> {
    source: &'a Path,
    staging: &'a Path,
    excludes: &'a Excludes,
    skip: &'a [&'a Path],
    staged: &'a mut Vec<String>,
}

impl Walker<'_> {
    fn copy_dir(&mut self, dir: &Path) -> Result<(), BuildError> {
        let entries = fs::read_dir(dir).map_err(BuildError::io(dir))?;
        let mut entries: Vec<(PathBuf, bool)> = entries
            .filter_map(Result::ok)
            .map(|e| {
                let is_dir = e.file_type().is_ok_and(|t| t.is_dir());
                (e.path(), is_dir)
            })
            .collect();
        entries.sort();

        for (path, is_dir) in entries {
            if self.skip.iter().any(|s| *s == path) {
                continue;
            }
            let rel = rel_path(&path, self.source);
            if self.excludes.is_excluded(&rel) {
                tracing::debug!(path = %rel, "Excluded from build");
                continue;
            }
            let target = self.staging.join(&rel);
            if is_dir {
                fs::create_dir_all(&target).map_err(BuildError::io(&target))?;
                self.copy_dir(&path)?;
            } else {
                fs::copy(&path, &target).map_err(BuildError::io(&path))?;
                self.staged.push(rel);
            }
        }
        Ok(())
    }
}

/// Every file and directory under `root` except `keep`, as escaped exclude
/// patterns. `_build` is listed but not descended into.
pub(crate) fn everything_except(root: &Path, keep: &Path) -> Result<Vec<String>, BuildError> {
    let mut out = Vec::new();
    collect_except(root, root, keep, &mut out)?;
    out.sort();
    Ok(out)
}

fn collect_except(
    root: &Path,
    dir: &Path,
    keep: &Path,
    out: &mut Vec<String>,
) -> Result<(), BuildError> {
    for entry in fs::read_dir(dir).map_err(BuildError::io(dir))? {
        let entry = entry.map_err(BuildError::io(dir))?;
        let path = entry.path();
        if path == keep {
            continue;
        }
        let rel = rel_path(&path, root);
        out.push(Pattern::escape(&rel));
        if entry.file_type().is_ok_and(|t| t.is_dir()) && rel != "_build" {
            collect_except(root, &path, keep, out)?;
        }
    }
    Ok(())
}
