//! Table of contents for nbook.
//!
//! A book's navigation is described by a `_toc.yml` file in the content root.
//! This crate owns everything about that file:
//!
//! - [`TocEntry`] / [`PageNode`] / [`TocTree`]: the in-memory tree
//! - [`yaml`]: reading and writing the persisted YAML form
//! - [`locate`]: finding the node of a rendered page
//! - [`scanner`]: generating a TOC from a content directory
//!
//! # Example
//!
//! ```
//! use nbook_toc::TocTree;
//!
//! let tree = TocTree::from_yaml("- file: index\n- file: intro\n").unwrap();
//! assert_eq!(tree.master_doc(), "index");
//! assert!(tree.find("intro").is_some());
//! ```

mod error;
pub mod locate;
mod model;
pub mod scanner;
pub mod yaml;

pub use error::{ScanError, TocError};
pub use locate::{find_by_path, strip_suffix};
pub use model::{PageNode, Pages, TocEntry, TocTree};
pub use scanner::{ContentFile, ScanOptions, generate_toc, scan, write_toc};

/// Conventional name of the persisted TOC within the content root.
pub const TOC_FILENAME: &str = "_toc.yml";
