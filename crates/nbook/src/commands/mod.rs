//! CLI command implementations.

mod build;
mod create;
mod page;
mod toc;

pub(crate) use build::BuildArgs;
pub(crate) use create::CreateArgs;
pub(crate) use page::PageArgs;
pub(crate) use toc::TocArgs;
