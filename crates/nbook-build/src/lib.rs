//! Book builds for nbook.
//!
//! A build loads the book's TOC and configuration, translates the
//! configuration into compiler overrides, and hands the book to a
//! [`Compiler`]. The compiler runs the navigation hooks from `nbook-nav`
//! on every page it reads.
//!
//! ```text
//! _toc.yml ──▶ BuildContext ─┐
//!                            ├──▶ Compiler::compile ──▶ _build/<html|latex>
//! _config.yml ──▶ Overrides ─┘                            │
//!                                           pdf_html / latexpdf post-step
//! ```

mod book;
mod builder;
mod compiler;
mod error;
pub mod pdf;
mod stage;

pub use book::{BUILD_DIR, BookOptions, BuildOutput, PageOptions, build_book, build_page};
pub use builder::Builder;
pub use compiler::{BuildRequest, Compiler, STAGING_DIR, SphinxCompiler};
pub use error::BuildError;
