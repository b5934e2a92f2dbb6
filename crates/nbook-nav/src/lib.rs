//! Navigation injection for nbook builds.
//!
//! The external compiler renders each page on its own. For it to produce a
//! navigable book, every page that has children in the TOC must carry a
//! navigation block (a `toctree`) listing them. This crate computes those
//! blocks and attaches them to a page, either to its raw source before
//! parsing or to its parsed tree afterwards.
//!
//! # Flow
//!
//! ```text
//! BuildContext ──find page──▶ PageNode ──compute_entries──▶ [NavEntry]
//!                                                              │
//!                              NavigationSink::attach ◀────────┘
//!                              ├── SourceSink (markdown / notebook text)
//!                              └── TreeSink   (parsed DocTree)
//! ```
//!
//! Only one sink kind is active per build, selected by
//! [`InjectionStrategy`].

mod context;
mod entry;
mod error;
mod notebook;
mod sink;
pub mod source;
pub mod tree;

pub use context::{BuildContext, InjectionStrategy};
pub use entry::{NavEntry, compute_entries, relative_path};
pub use error::InjectError;
pub use sink::{NavFlags, NavigationSink, inject, toctree_block};
pub use source::{SourceFormat, SourceSink};
pub use tree::{Block, DocTree, NavNode, Section, TreeSink};
