//! Output kinds a book can be built into.

use std::fmt;
use std::str::FromStr;

use nbook_config::Overrides;

/// What kind of output to build.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Builder {
    /// Multi-page HTML site.
    #[default]
    Html,
    /// Single-page HTML converted to PDF.
    PdfHtml,
    /// LaTeX sources.
    Latex,
    /// LaTeX sources compiled to PDF.
    LatexPdf,
}

impl Builder {
    pub const ALL: [Self; 4] = [Self::Html, Self::PdfHtml, Self::Latex, Self::LatexPdf];

    pub fn name(self) -> &'static str {
        match self {
            Self::Html => "html",
            Self::PdfHtml => "pdf_html",
            Self::Latex => "latex",
            Self::LatexPdf => "latexpdf",
        }
    }

    /// Builder name passed to the compiler.
    pub fn compiler_builder(self) -> &'static str {
        match self {
            Self::Html => "html",
            Self::PdfHtml => "singlehtml",
            Self::Latex | Self::LatexPdf => "latex",
        }
    }

    /// Directory under `_build` that receives the compiler output.
    pub fn output_dir_name(self) -> &'static str {
        match self {
            Self::Html | Self::PdfHtml => "html",
            Self::Latex | Self::LatexPdf => "latex",
        }
    }

    /// Apply builder-specific overrides on top of the translated config.
    pub fn apply_overrides(self, overrides: &mut Overrides) {
        match self {
            Self::PdfHtml => overrides.set_nested("html_theme_options", "single_page", true),
            Self::LatexPdf => overrides.set("latex_engine", "xelatex"),
            Self::Html | Self::Latex => {}
        }
    }
}

impl fmt::Display for Builder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Builder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|builder| builder.name() == s)
            .ok_or_else(|| {
                let names: Vec<_> = Self::ALL.into_iter().map(Self::name).collect();
                format!("must be one of ({}), got '{s}'", names.join(", "))
            })
    }
}
