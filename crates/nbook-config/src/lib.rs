//! Book configuration for nbook.
//!
//! A book is configured by an optional `_config.yml` in its root. The file
//! is merged over the built-in defaults (see `default_config.yml`): every
//! top-level key present in the book's file replaces the default key of the
//! same name wholesale.
//!
//! The merged configuration uses author-friendly names. [`yaml_to_overrides`]
//! translates it into the key/value overrides understood by the compiler.
//!
//! ## Environment Variable Expansion
//!
//! String values of these fields support environment variable expansion:
//!
//! - `${VAR}` - expands to the value of VAR, errors if unset
//! - `${VAR:-default}` - expands to VAR if set, otherwise uses default
//!
//! Expanded fields:
//! - `logo`
//! - `repository.url`
//! - `html.favicon`
//! - `html.google_analytics_id`

mod expand;
pub mod overrides;

use std::path::{Path, PathBuf};

use serde_yaml::{Mapping, Value};

pub use overrides::Overrides;

use expand::expand_env;

/// Configuration filename looked up in the book root.
pub const CONFIG_FILENAME: &str = "_config.yml";

/// Patterns the compiler always ignores, before any user patterns.
pub const DEFAULT_EXCLUDE_PATTERNS: &[&str] =
    &["_build", "Thumbs.db", ".DS_Store", "**.ipynb_checkpoints"];

/// Compiler extensions every build loads. `myst_nb` reads markdown and
/// notebook pages; without it only `.rst` sources are compiled.
pub const DEFAULT_EXTENSIONS: &[&str] = &["myst_nb", "sphinx_togglebutton", "sphinx_copybutton"];

/// HTML theme understood by the `html_theme_options` this crate produces.
pub const HTML_THEME: &str = "sphinx_book_theme";

const DEFAULT_CONFIG: &str = include_str!("default_config.yml");

const EXPANDED_FIELDS: &[&str] = &[
    "logo",
    "repository.url",
    "html.favicon",
    "html.google_analytics_id",
];

/// Top-level keys renamed one-to-one.
const TRANSLATIONS: &[(&str, &str)] = &[
    ("logo", "html_logo"),
    ("title", "html_title"),
    ("execute_notebooks", "jupyter_execute_notebooks"),
];

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Explicitly requested file does not exist.
    #[error("Path to a _config.yml file was given, but not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    /// YAML parsing error.
    #[error("Failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: serde_yaml::Error,
    },
    /// Structurally invalid configuration.
    #[error("Configuration error: {0}")]
    Invalid(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`repository.url`").
        field: String,
        /// Error message (e.g., "${`REPO_URL`} not set").
        message: String,
    },
}

/// Merged book configuration.
#[derive(Clone, Debug, PartialEq)]
pub struct BookConfig {
    values: Mapping,
    path: Option<PathBuf>,
}

impl BookConfig {
    /// The built-in configuration with nothing merged over it.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Parse` if the embedded defaults are malformed.
    pub fn defaults() -> Result<Self, ConfigError> {
        Ok(Self {
            values: parse_mapping(DEFAULT_CONFIG, Path::new("default_config.yml"))?,
            path: None,
        })
    }

    /// Load the configuration of the book rooted at `book_dir`.
    ///
    /// When `explicit` is given it must exist. Otherwise `<book_dir>/_config.yml`
    /// is used if present, and the defaults alone if not.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::NotFound` if `explicit` does not exist, and
    /// `Io`, `Parse`, `Invalid` or `EnvVar` if the file cannot be used.
    pub fn load(book_dir: &Path, explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let path = match explicit {
            Some(path) if !path.exists() => return Err(ConfigError::NotFound(path.to_path_buf())),
            Some(path) => Some(path.to_path_buf()),
            None => Some(book_dir.join(CONFIG_FILENAME)).filter(|p| p.is_file()),
        };

        let Some(path) = path else {
            tracing::debug!(book = %book_dir.display(), "No _config.yml found, using defaults");
            return Self::defaults();
        };

        let text = std::fs::read_to_string(&path).map_err(|source| ConfigError::Io {
            path: path.clone(),
            source,
        })?;
        let mut config = Self::merged(&text, &path)?;
        tracing::info!(path = %path.display(), "Loaded book configuration");
        config.path = Some(path);
        Ok(config)
    }

    /// Merge `text` over the defaults.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Parse`, `Invalid` or `EnvVar` if the text cannot be used.
    pub fn from_yaml(text: &str) -> Result<Self, ConfigError> {
        Self::merged(text, Path::new(CONFIG_FILENAME))
    }

    fn merged(text: &str, path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::defaults()?;
        for (key, value) in parse_mapping(text, path)? {
            config.values.insert(key, value);
        }
        expand_fields(&mut config.values)?;
        Ok(config)
    }

    /// File the configuration was read from, if any.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    pub fn title(&self) -> Option<&str> {
        self.get("title").and_then(Value::as_str)
    }

    pub fn values(&self) -> &Mapping {
        &self.values
    }

    /// Compiler overrides for this configuration.
    pub fn to_overrides(&self) -> Overrides {
        yaml_to_overrides(&self.values)
    }
}

fn parse_mapping(text: &str, path: &Path) -> Result<Mapping, ConfigError> {
    let value: Value = serde_yaml::from_str(text).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    match value {
        Value::Null => Ok(Mapping::new()),
        Value::Mapping(map) => Ok(map),
        _ => Err(ConfigError::Invalid(format!(
            "{} must contain a mapping of settings",
            path.display()
        ))),
    }
}

fn expand_fields(values: &mut Mapping) -> Result<(), ConfigError> {
    for field in EXPANDED_FIELDS {
        let (section, key) = match field.split_once('.') {
            Some((section, key)) => (Some(section), key),
            None => (None, *field),
        };
        let map = match section {
            Some(section) => match values.get_mut(section).and_then(Value::as_mapping_mut) {
                Some(map) => map,
                None => continue,
            },
            None => &mut *values,
        };
        if let Some(Value::String(text)) = map.get_mut(key) {
            *text = expand_env(text, field)?;
        }
    }
    Ok(())
}

fn section<'a>(config: &'a Mapping, key: &str) -> Option<&'a Mapping> {
    config.get(key).and_then(Value::as_mapping)
}

fn field(section: Option<&Mapping>, key: &str) -> Value {
    section
        .and_then(|map| map.get(key))
        .cloned()
        .unwrap_or(Value::Null)
}

/// Translate a book configuration into compiler overrides.
///
/// The result always carries `extensions` ([`DEFAULT_EXTENSIONS`]),
/// `html_theme`, `html_theme_options` and `exclude_patterns` (starting with
/// [`DEFAULT_EXCLUDE_PATTERNS`]). Absent or empty `html` and
/// `latex` sections produce no keys; missing values inside a present section
/// are null.
pub fn yaml_to_overrides(config: &Mapping) -> Overrides {
    let mut out = Overrides::new();
    out.extend_list("extensions", DEFAULT_EXTENSIONS.iter().copied());
    out.set("html_theme", HTML_THEME);
    out.set("html_theme_options", Mapping::new());
    out.extend_list("exclude_patterns", DEFAULT_EXCLUDE_PATTERNS.iter().copied());

    let launch_buttons = section(config, "launch_buttons").cloned().unwrap_or_default();
    out.set_nested("html_theme_options", "launch_buttons", launch_buttons);

    let repository = section(config, "repository");
    out.set_nested(
        "html_theme_options",
        "path_to_docs",
        field(repository, "path_to_book"),
    );
    out.set_nested("html_theme_options", "repository_url", field(repository, "url"));

    if let Some(html) = section(config, "html").filter(|m| !m.is_empty()) {
        out.set("html_favicon", field(Some(html), "favicon"));
        out.set_nested(
            "html_theme_options",
            "sidebar_footer_text",
            field(Some(html), "sidebar_footer_text"),
        );
        out.set("google_analytics_id", field(Some(html), "google_analytics_id"));
    }
    if let Some(latex) = section(config, "latex").filter(|m| !m.is_empty()) {
        out.set("latex_engine", field(Some(latex), "latex_engine"));
    }

    match config.get("exclude_patterns") {
        Some(Value::Sequence(patterns)) => out.extend_list("exclude_patterns", patterns.iter().cloned()),
        Some(pattern @ Value::String(_)) => out.extend_list("exclude_patterns", [pattern.clone()]),
        _ => {}
    }

    for (key, renamed) in TRANSLATIONS {
        if let Some(value) = config.get(*key) {
            out.set(renamed, value.clone());
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn overrides_of(yaml: &str) -> Overrides {
        BookConfig::from_yaml(yaml).unwrap().to_overrides()
    }

    #[test]
    fn test_defaults_parse() {
        let config = BookConfig::defaults().unwrap();
        assert_eq!(config.title(), Some("My Book"));
        assert!(config.path().is_none());
    }

    #[test]
    fn test_top_level_keys_replace_defaults() {
        let config = BookConfig::from_yaml("title: Guide\nhtml:\n  favicon: icon.png\n").unwrap();

        assert_eq!(config.title(), Some("Guide"));
        let html = config.get("html").and_then(Value::as_mapping).unwrap();
        assert_eq!(html.len(), 1);
        assert_eq!(config.get("latex").unwrap()["latex_engine"], "pdflatex");
    }

    #[test]
    fn test_empty_file_is_defaults() {
        assert_eq!(
            BookConfig::from_yaml("").unwrap(),
            BookConfig::defaults().unwrap()
        );
    }

    #[test]
    fn test_non_mapping_rejected() {
        let err = BookConfig::from_yaml("- a\n- b\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_default_translation() {
        let out = BookConfig::defaults().unwrap().to_overrides();

        let keys: Vec<_> = out.iter().map(|(k, _)| k).collect();
        assert_eq!(
            keys,
            vec![
                "extensions",
                "html_theme",
                "html_theme_options",
                "exclude_patterns",
                "html_favicon",
                "google_analytics_id",
                "latex_engine",
                "html_logo",
                "html_title",
                "jupyter_execute_notebooks",
            ]
        );
        assert_eq!(
            out.exclude_patterns(),
            vec!["_build", "Thumbs.db", ".DS_Store", "**.ipynb_checkpoints"]
        );
        assert_eq!(out.get("html_title"), Some(&Value::from("My Book")));
        assert_eq!(out.get("latex_engine"), Some(&Value::from("pdflatex")));
        assert!(
            out.to_define_args()
                .contains(&"extensions=myst_nb,sphinx_togglebutton,sphinx_copybutton".to_owned())
        );
        assert_eq!(out.get("html_theme"), Some(&Value::from("sphinx_book_theme")));
    }

    #[test]
    fn test_repository_and_launch_buttons() {
        let out = overrides_of(
            "repository:\n  url: https://github.com/org/book\n  path_to_book: docs\n\
             launch_buttons:\n  binderhub_url: https://mybinder.org\n",
        );

        let theme = out.get("html_theme_options").unwrap();
        assert_eq!(theme["repository_url"], "https://github.com/org/book");
        assert_eq!(theme["path_to_docs"], "docs");
        assert_eq!(
            theme["launch_buttons"]["binderhub_url"],
            "https://mybinder.org"
        );
    }

    #[test]
    fn test_missing_repository_values_are_null() {
        let out = overrides_of("repository: {}\n");
        let theme = out.get("html_theme_options").unwrap();
        assert_eq!(theme["repository_url"], Value::Null);
        assert!(
            !out.to_define_args()
                .iter()
                .any(|arg| arg.starts_with("html_theme_options.repository_url"))
        );
    }

    #[test]
    fn test_empty_html_section_skipped() {
        let out = overrides_of("html: {}\nlatex: {}\n");
        assert!(out.get("html_favicon").is_none());
        assert!(out.get("latex_engine").is_none());
    }

    #[test]
    fn test_user_exclude_patterns_appended() {
        let out = overrides_of("exclude_patterns: [drafts/*, '*.bak']\n");
        assert_eq!(
            out.exclude_patterns(),
            vec![
                "_build",
                "Thumbs.db",
                ".DS_Store",
                "**.ipynb_checkpoints",
                "drafts/*",
                "*.bak"
            ]
        );
    }

    #[test]
    fn test_env_expansion() {
        let config = BookConfig::from_yaml(
            "repository:\n  url: ${NBOOK_TEST_UNSET_REPO:-https://example.com/repo}\n",
        )
        .unwrap();
        assert_eq!(
            config.get("repository").unwrap()["url"],
            "https://example.com/repo"
        );
    }

    #[test]
    fn test_env_expansion_unset_is_error() {
        let err = BookConfig::from_yaml("html:\n  google_analytics_id: ${NBOOK_TEST_UNSET_GA}\n")
            .unwrap_err();
        assert!(matches!(err, ConfigError::EnvVar { ref field, .. } if field == "html.google_analytics_id"));
    }

    #[test]
    fn test_load_discovers_config_in_book() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("_config.yml"), "title: Found\n").unwrap();

        let config = BookConfig::load(dir.path(), None).unwrap();

        assert_eq!(config.title(), Some("Found"));
        assert_eq!(config.path(), Some(dir.path().join("_config.yml").as_path()));
    }

    #[test]
    fn test_load_without_config_uses_defaults() {
        let dir = TempDir::new().unwrap();
        let config = BookConfig::load(dir.path(), None).unwrap();
        assert_eq!(config.title(), Some("My Book"));
    }

    #[test]
    fn test_load_explicit_missing_is_error() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("other.yml");

        let err = BookConfig::load(dir.path(), Some(&missing)).unwrap_err();

        assert!(matches!(err, ConfigError::NotFound(_)));
        assert!(err.to_string().contains("other.yml"));
    }

    #[test]
    fn test_load_parse_error_names_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("_config.yml");
        std::fs::write(&path, "title: [unclosed\n").unwrap();

        let err = BookConfig::load(dir.path(), None).unwrap_err();

        assert!(matches!(err, ConfigError::Parse { .. }));
        assert!(err.to_string().contains(&path.display().to_string()));
    }
}
