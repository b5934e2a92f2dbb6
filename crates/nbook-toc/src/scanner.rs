//! TOC discovery by filesystem walking.
//!
//! Each directory that holds at least one content file becomes a section:
//! its `index.*` file (or the alphanumerically first content file) is the
//! section's anchor page, the remaining files are the anchor's children, and
//! the anchors of subdirectories are appended after them. Directories without
//! content files contribute nothing, including their subdirectories.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use crate::TOC_FILENAME;
use crate::error::ScanError;
use crate::model::PageNode;
use crate::yaml;

/// File extensions that count as book content.
pub const CONTENT_EXTENSIONS: &[&str] = &["md", "ipynb", "rst"];

/// Entry names that are never scanned.
pub const EXCLUDED_NAMES: &[&str] = &["_build", "Thumbs.db", ".DS_Store", ".ipynb_checkpoints"];

/// Options for [`scan`].
#[derive(Clone, Debug)]
pub struct ScanOptions {
    /// Characters in file names replaced by spaces when deriving titles.
    pub split_char: String,
    /// Files and directories whose relative path contains any of these are
    /// skipped.
    pub skip: Vec<String>,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            split_char: "_".to_owned(),
            skip: Vec::new(),
        }
    }
}

impl ScanOptions {
    fn is_skipped(&self, rel_path: &str) -> bool {
        self.skip
            .iter()
            .any(|s| !s.is_empty() && rel_path.contains(s.as_str()))
    }
}

/// A content file found during a scan.
///
/// Only lives for the duration of the scan; each one becomes a [`PageNode`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentFile {
    /// Absolute path on disk.
    pub path: PathBuf,
    /// `/`-separated path from the scan root, without extension.
    pub rel_path: String,
    /// Display title derived from the file (or directory) name.
    pub title: String,
}

impl ContentFile {
    fn is_index(&self) -> bool {
        self.path.file_stem().is_some_and(|s| s == "index")
    }

    fn into_page(self) -> PageNode {
        PageNode::new(self.rel_path).with_title(self.title)
    }
}

/// Scan `root` and build a TOC tree.
///
/// Returns `Ok(None)` when no directory under `root` holds a content file.
///
/// # Errors
///
/// Returns [`ScanError::NotFound`] if `root` is not a directory and
/// [`ScanError::Io`] if a directory cannot be listed.
pub fn scan(root: &Path, options: &ScanOptions) -> Result<Option<PageNode>, ScanError> {
    if !root.is_dir() {
        return Err(ScanError::NotFound(root.to_path_buf()));
    }
    let root = fs::canonicalize(root).map_err(|source| ScanError::Io {
        path: root.to_path_buf(),
        source,
    })?;
    Scanner::new(&root, options).scan_directory(&root)
}

/// Scan `root` and render the result as `_toc.yml` text.
///
/// # Errors
///
/// Returns [`ScanError::NoContent`] if the whole root holds no content file.
pub fn generate_toc(root: &Path, options: &ScanOptions) -> Result<String, ScanError> {
    let tree = scan(root, options)?.ok_or_else(|| ScanError::NoContent(root.to_path_buf()))?;
    Ok(yaml::serialize(&tree)?)
}

/// Generate a TOC for `root` and write it to `<output_folder>/_toc.yml`.
///
/// `output_folder` defaults to `root`. Nothing is written if generation
/// fails. Returns the path of the written file.
pub fn write_toc(
    root: &Path,
    options: &ScanOptions,
    output_folder: Option<&Path>,
) -> Result<PathBuf, ScanError> {
    let text = generate_toc(root, options)?;
    let folder = output_folder.unwrap_or(root);
    fs::create_dir_all(folder).map_err(|source| ScanError::Io {
        path: folder.to_path_buf(),
        source,
    })?;
    let output_file = folder.join(TOC_FILENAME);
    fs::write(&output_file, text).map_err(|source| ScanError::Io {
        path: output_file.clone(),
        source,
    })?;
    tracing::info!(path = %output_file.display(), "Wrote table of contents");
    Ok(output_file)
}

/// Derive a display title from a file or directory name.
///
/// Every occurrence of `split` becomes a space and each word is capitalized.
///
/// ```
/// use nbook_toc::scanner::derive_title;
///
/// assert_eq!(derive_title("getting_started", "_"), "Getting Started");
/// assert_eq!(derive_title("02-API-reference", "-"), "02 Api Reference");
/// ```
pub fn derive_title(name: &str, split: &str) -> String {
    let spaced = if split.is_empty() {
        name.to_owned()
    } else {
        name.replace(split, " ")
    };
    spaced
        .split_whitespace()
        .map(capitalize)
        .collect::<Vec<_>>()
        .join(" ")
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

/// Walks a canonical content root.
struct Scanner<'a> {
    root: &'a Path,
    options: &'a ScanOptions,
}

impl<'a> Scanner<'a> {
    fn new(root: &'a Path, options: &'a ScanOptions) -> Self {
        Self { root, options }
    }

    /// Build the section anchored in `dir`, or `None` if `dir` has no
    /// content files.
    fn scan_directory(&self, dir: &Path) -> Result<Option<PageNode>, ScanError> {
        let entries = fs::read_dir(dir).map_err(|source| ScanError::Io {
            path: dir.to_path_buf(),
            source,
        })?;

        // Cache file_type to avoid repeated stat calls
        let mut entries: Vec<_> = entries
            .filter_map(Result::ok)
            .map(|e| {
                let is_dir = e.file_type().is_ok_and(|t| t.is_dir());
                (e.path(), is_dir)
            })
            .filter(|(path, _)| {
                path.file_name()
                    .is_some_and(|n| !EXCLUDED_NAMES.iter().any(|x| n == *x))
            })
            .collect();
        entries.sort_by(|a, b| a.0.file_name().cmp(&b.0.file_name()));

        let mut files: Vec<ContentFile> = entries
            .iter()
            .filter(|(path, is_dir)| !is_dir && is_content_file(path))
            .map(|(path, _)| self.content_file(path))
            .collect();

        if files.is_empty() {
            tracing::debug!(dir = %dir.display(), "No content files, skipping directory");
            return Ok(None);
        }

        let anchor_idx = files.iter().position(ContentFile::is_index).unwrap_or(0);
        let mut anchor = files.remove(anchor_idx).into_page();

        // Pages are named without extension, so `a.md` and `a.ipynb` collide
        let mut names = HashSet::from([anchor.file.clone()]);
        for file in files {
            if self.options.is_skipped(&self.relative(&file.path)) {
                tracing::debug!(path = %file.path.display(), "Skipping file");
                continue;
            }
            if !names.insert(file.rel_path.clone()) {
                tracing::warn!(
                    path = %file.path.display(),
                    page = %file.rel_path,
                    "Another file already provides this page, skipping"
                );
                continue;
            }
            anchor.push_child(file.into_page());
        }

        for (path, _) in entries.iter().filter(|(_, is_dir)| *is_dir) {
            if self.options.is_skipped(&self.relative(path)) {
                tracing::debug!(dir = %path.display(), "Skipping directory");
                continue;
            }
            if let Some(section) = self.scan_directory(path)? {
                anchor.push_child(section);
            }
        }

        Ok(Some(anchor))
    }

    fn content_file(&self, path: &Path) -> ContentFile {
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();

        // "index" says nothing about the page, so name it after its directory
        let title_source = if stem == "index" {
            path.parent()
                .and_then(Path::file_name)
                .map_or_else(|| stem.clone(), |n| n.to_string_lossy().into_owned())
        } else {
            stem
        };

        ContentFile {
            path: path.to_path_buf(),
            rel_path: strip_extension(&self.relative(path)),
            title: derive_title(&title_source, &self.options.split_char),
        }
    }

    /// `/`-separated path of `path` relative to the scan root.
    fn relative(&self, path: &Path) -> String {
        let rel = path.strip_prefix(self.root).unwrap_or(path);
        rel.components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/")
    }
}

fn is_content_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| CONTENT_EXTENSIONS.contains(&e))
}

fn strip_extension(rel_path: &str) -> String {
    match Path::new(rel_path).extension() {
        Some(ext) => rel_path[..rel_path.len() - ext.len() - 1].to_owned(),
        None => rel_path.to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TocEntry;
    use pretty_assertions::assert_eq;

    fn create_test_dir() -> tempfile::TempDir {
        tempfile::tempdir().unwrap()
    }

    fn child_files(page: &PageNode) -> Vec<&str> {
        page.children()
            .iter()
            .filter_map(TocEntry::as_page)
            .map(|p| p.file.as_str())
            .collect()
    }

    #[test]
    fn test_derive_title() {
        assert_eq!(derive_title("intro", "_"), "Intro");
        assert_eq!(derive_title("my_first_page", "_"), "My First Page");
        assert_eq!(derive_title("UPPER_case", "_"), "Upper Case");
        assert_eq!(derive_title("a-b_c", "-"), "A B_c");
        assert_eq!(derive_title("__x__", "_"), "X");
        assert_eq!(derive_title("no split", ""), "No Split");
    }

    #[test]
    fn test_index_is_anchor_regardless_of_order() {
        let temp_dir = create_test_dir();
        fs::write(temp_dir.path().join("aaa.md"), "# A").unwrap();
        fs::write(temp_dir.path().join("index.md"), "# Home").unwrap();

        let root = scan(temp_dir.path(), &ScanOptions::default())
            .unwrap()
            .unwrap();

        assert_eq!(root.file, "index");
        assert_eq!(child_files(&root), vec!["aaa"]);
    }

    #[test]
    fn test_first_file_is_anchor_without_index() {
        let temp_dir = create_test_dir();
        fs::write(temp_dir.path().join("b.md"), "").unwrap();
        fs::write(temp_dir.path().join("a.ipynb"), "{}").unwrap();
        fs::write(temp_dir.path().join("c.rst"), "").unwrap();

        let root = scan(temp_dir.path(), &ScanOptions::default())
            .unwrap()
            .unwrap();

        assert_eq!(root.file, "a");
        assert_eq!(root.title.as_deref(), Some("A"));
        assert_eq!(child_files(&root), vec!["b", "c"]);
    }

    #[test]
    fn test_same_stem_as_anchor_not_listed_as_child() {
        let temp_dir = create_test_dir();
        fs::write(temp_dir.path().join("index.md"), "").unwrap();
        fs::write(temp_dir.path().join("index.ipynb"), "{}").unwrap();
        fs::write(temp_dir.path().join("other.md"), "").unwrap();

        let root = scan(temp_dir.path(), &ScanOptions::default())
            .unwrap()
            .unwrap();

        assert_eq!(root.file, "index");
        assert_eq!(child_files(&root), vec!["other"]);
    }

    #[test]
    fn test_same_stem_siblings_listed_once() {
        let temp_dir = create_test_dir();
        fs::write(temp_dir.path().join("index.md"), "").unwrap();
        fs::write(temp_dir.path().join("lesson.ipynb"), "{}").unwrap();
        fs::write(temp_dir.path().join("lesson.md"), "").unwrap();

        let root = scan(temp_dir.path(), &ScanOptions::default())
            .unwrap()
            .unwrap();

        assert_eq!(child_files(&root), vec!["lesson"]);
    }

    #[test]
    fn test_dotted_file_names_keep_their_dots() {
        let temp_dir = create_test_dir();
        fs::write(temp_dir.path().join("index.md"), "").unwrap();
        fs::write(temp_dir.path().join("release.v2.md"), "").unwrap();

        let root = scan(temp_dir.path(), &ScanOptions::default())
            .unwrap()
            .unwrap();

        assert_eq!(child_files(&root), vec!["release.v2"]);
    }

    #[test]
    fn test_ignores_unsupported_and_excluded_files() {
        let temp_dir = create_test_dir();
        fs::write(temp_dir.path().join("index.md"), "").unwrap();
        fs::write(temp_dir.path().join("image.png"), "").unwrap();
        fs::write(temp_dir.path().join("notes.txt"), "").unwrap();
        fs::write(temp_dir.path().join("Thumbs.db"), "").unwrap();

        let root = scan(temp_dir.path(), &ScanOptions::default())
            .unwrap()
            .unwrap();

        assert!(root.children.is_none());
    }

    #[test]
    fn test_leaf_anchor_omits_children() {
        let temp_dir = create_test_dir();
        fs::write(temp_dir.path().join("index.md"), "").unwrap();

        let root = scan(temp_dir.path(), &ScanOptions::default())
            .unwrap()
            .unwrap();

        assert_eq!(root.children, None);
    }

    #[test]
    fn test_subdirectories_follow_files() {
        let temp_dir = create_test_dir();
        fs::write(temp_dir.path().join("index.md"), "").unwrap();
        fs::write(temp_dir.path().join("zeta.md"), "").unwrap();
        let guide = temp_dir.path().join("a_guide");
        fs::create_dir(&guide).unwrap();
        fs::write(guide.join("index.md"), "").unwrap();
        fs::write(guide.join("setup.md"), "").unwrap();

        let root = scan(temp_dir.path(), &ScanOptions::default())
            .unwrap()
            .unwrap();

        assert_eq!(child_files(&root), vec!["zeta", "a_guide/index"]);
        let guide_page = root.children()[1].as_page().unwrap();
        assert_eq!(guide_page.title.as_deref(), Some("A Guide"));
        assert_eq!(child_files(guide_page), vec!["a_guide/setup"]);
    }

    #[test]
    fn test_directory_without_files_is_skipped_entirely() {
        let temp_dir = create_test_dir();
        fs::write(temp_dir.path().join("index.md"), "").unwrap();
        let outer = temp_dir.path().join("outer");
        let inner = outer.join("inner");
        fs::create_dir_all(&inner).unwrap();
        fs::write(inner.join("deep.md"), "").unwrap();

        let root = scan(temp_dir.path(), &ScanOptions::default())
            .unwrap()
            .unwrap();

        assert!(root.children.is_none());
    }

    #[test]
    fn test_skips_checkpoints_and_build_dirs() {
        let temp_dir = create_test_dir();
        fs::write(temp_dir.path().join("index.md"), "").unwrap();
        for name in [".ipynb_checkpoints", "_build"] {
            let dir = temp_dir.path().join(name);
            fs::create_dir(&dir).unwrap();
            fs::write(dir.join("index.md"), "").unwrap();
        }

        let root = scan(temp_dir.path(), &ScanOptions::default())
            .unwrap()
            .unwrap();

        assert!(root.children.is_none());
    }

    #[test]
    fn test_skip_text_filters_files_and_dirs() {
        let temp_dir = create_test_dir();
        fs::write(temp_dir.path().join("index.md"), "").unwrap();
        fs::write(temp_dir.path().join("keep.md"), "").unwrap();
        fs::write(temp_dir.path().join("draft_post.md"), "").unwrap();
        let drafts = temp_dir.path().join("drafts");
        fs::create_dir(&drafts).unwrap();
        fs::write(drafts.join("index.md"), "").unwrap();

        let options = ScanOptions {
            skip: vec!["draft".to_owned()],
            ..ScanOptions::default()
        };
        let root = scan(temp_dir.path(), &options).unwrap().unwrap();

        assert_eq!(child_files(&root), vec!["keep"]);
    }

    #[test]
    fn test_skip_text_matches_relative_path_only() {
        let temp_dir = create_test_dir();
        let book = temp_dir.path().join("tmpbook");
        fs::create_dir(&book).unwrap();
        fs::write(book.join("index.md"), "").unwrap();
        fs::write(book.join("page.md"), "").unwrap();

        let options = ScanOptions {
            skip: vec!["tmpbook".to_owned()],
            ..ScanOptions::default()
        };
        let root = scan(&book, &options).unwrap().unwrap();

        assert_eq!(child_files(&root), vec!["page"]);
    }

    #[test]
    fn test_index_title_comes_from_directory() {
        let temp_dir = create_test_dir();
        let book = temp_dir.path().join("my_book");
        fs::create_dir(&book).unwrap();
        fs::write(book.join("index.md"), "").unwrap();

        let root = scan(&book, &ScanOptions::default()).unwrap().unwrap();

        assert_eq!(root.title.as_deref(), Some("My Book"));
    }

    #[test]
    fn test_custom_split_char() {
        let temp_dir = create_test_dir();
        fs::write(temp_dir.path().join("first-steps.md"), "").unwrap();

        let options = ScanOptions {
            split_char: "-".to_owned(),
            ..ScanOptions::default()
        };
        let root = scan(temp_dir.path(), &options).unwrap().unwrap();

        assert_eq!(root.title.as_deref(), Some("First Steps"));
    }

    #[test]
    fn test_empty_root_returns_none() {
        let temp_dir = create_test_dir();
        fs::create_dir(temp_dir.path().join("empty")).unwrap();

        assert!(
            scan(temp_dir.path(), &ScanOptions::default())
                .unwrap()
                .is_none()
        );
    }

    #[test]
    fn test_missing_root_is_error() {
        let err = scan(Path::new("/nonexistent/book"), &ScanOptions::default()).unwrap_err();
        assert!(matches!(err, ScanError::NotFound(_)));
    }

    #[test]
    fn test_generate_toc_fails_on_empty_root() {
        let temp_dir = create_test_dir();
        let err = generate_toc(temp_dir.path(), &ScanOptions::default()).unwrap_err();
        assert!(matches!(err, ScanError::NoContent(_)));
        assert!(err.to_string().contains("No content files"));
    }

    #[test]
    fn test_write_toc_defaults_to_root() {
        let temp_dir = create_test_dir();
        fs::write(temp_dir.path().join("index.md"), "").unwrap();
        fs::write(temp_dir.path().join("intro.md"), "").unwrap();

        let written = write_toc(temp_dir.path(), &ScanOptions::default(), None).unwrap();

        assert_eq!(written, temp_dir.path().join(TOC_FILENAME));
        let text = fs::read_to_string(&written).unwrap();
        assert!(text.starts_with("- file: index\n"));
        assert!(text.contains("- file: intro\n  title: Intro\n"));
    }

    #[test]
    fn test_write_toc_nothing_written_on_failure() {
        let temp_dir = create_test_dir();
        let out = temp_dir.path().join("out");

        assert!(write_toc(temp_dir.path(), &ScanOptions::default(), Some(&out)).is_err());
        assert!(!out.join(TOC_FILENAME).exists());
    }
}
