//! Tree-level injection.
//!
//! [`DocTree`] is the part of a parsed page that navigation cares about: an
//! optional preamble, the top-level sections, and the navigation nodes
//! attached to them. Content blocks are kept verbatim (raw markdown spans or
//! notebook cells) so a tree can be written back without loss.
//!
//! Navigation is attached to the last top-level section of the page, or to
//! the end of the document when the page has no headings.

use pulldown_cmark::{Event, Options, Parser, Tag, TagEnd};
use serde_json::Value;

use crate::entry::NavEntry;
use crate::error::InjectError;
use crate::notebook;
use crate::sink::{NavFlags, NavigationSink, toctree_block};

/// Verbatim page content.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Block {
    /// A span of markdown source.
    Text(String),
    /// A notebook cell.
    Cell(Value),
}

/// Navigation node attached to a page.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NavNode {
    /// Page the node belongs to.
    pub parent: String,
    pub entries: Vec<NavEntry>,
    pub flags: NavFlags,
}

impl NavNode {
    /// Directive text equivalent to this node.
    pub fn to_directive(&self) -> String {
        toctree_block(&self.entries, self.flags)
    }
}

/// A top-level section.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Section {
    pub title: String,
    /// Section content, including the heading and any subsections.
    pub blocks: Vec<Block>,
    pub nav: Vec<NavNode>,
}

/// Parsed page.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DocTree {
    /// Content before the first top-level heading.
    pub preamble: Vec<Block>,
    pub sections: Vec<Section>,
    /// Navigation attached at document level (pages without sections).
    pub nav: Vec<NavNode>,
}

/// A heading found in markdown text.
struct Heading {
    offset: usize,
    level: usize,
    title: String,
}

fn headings(text: &str) -> Vec<Heading> {
    let options = Options::ENABLE_YAML_STYLE_METADATA_BLOCKS;
    let mut found = Vec::new();
    let mut current: Option<Heading> = None;

    for (event, range) in Parser::new_ext(text, options).into_offset_iter() {
        match event {
            Event::Start(Tag::Heading { level, .. }) => {
                current = Some(Heading {
                    offset: range.start,
                    level: level as usize,
                    title: String::new(),
                });
            }
            Event::Text(t) | Event::Code(t) => {
                if let Some(heading) = current.as_mut() {
                    heading.title.push_str(&t);
                }
            }
            Event::End(TagEnd::Heading(_)) => {
                if let Some(heading) = current.take() {
                    found.push(heading);
                }
            }
            _ => {}
        }
    }

    found
}

impl DocTree {
    /// Parse markdown, splitting at the shallowest heading level present.
    pub fn from_markdown(text: &str) -> Self {
        let all = headings(text);
        let Some(top) = all.iter().map(|h| h.level).min() else {
            return Self {
                preamble: text_blocks(text),
                ..Self::default()
            };
        };
        let tops: Vec<Heading> = all.into_iter().filter(|h| h.level == top).collect();

        let mut tree = Self {
            preamble: text_blocks(&text[..tops[0].offset]),
            ..Self::default()
        };
        for (i, heading) in tops.iter().enumerate() {
            let end = tops.get(i + 1).map_or(text.len(), |next| next.offset);
            tree.sections.push(Section {
                title: heading.title.clone(),
                blocks: text_blocks(&text[heading.offset..end]),
                nav: Vec::new(),
            });
        }
        tree
    }

    /// Build a tree from a parsed notebook.
    ///
    /// A markdown cell whose first heading is at the shallowest level found
    /// in the notebook opens a new top-level section.
    pub fn from_notebook(notebook: &Value) -> Self {
        let cells = notebook
            .get("cells")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();

        let first_headings: Vec<Option<Heading>> = cells
            .iter()
            .map(|cell| {
                notebook::markdown_source(cell).and_then(|s| headings(&s).into_iter().next())
            })
            .collect();
        let top = first_headings.iter().flatten().map(|h| h.level).min();

        let mut tree = Self::default();
        for (cell, heading) in cells.into_iter().zip(first_headings) {
            match heading {
                Some(h) if Some(h.level) == top => tree.sections.push(Section {
                    title: h.title,
                    blocks: vec![Block::Cell(cell)],
                    nav: Vec::new(),
                }),
                _ => match tree.sections.last_mut() {
                    Some(section) => section.blocks.push(Block::Cell(cell)),
                    None => tree.preamble.push(Block::Cell(cell)),
                },
            }
        }
        tree
    }

    /// All navigation nodes, in document order.
    pub fn nav_nodes(&self) -> impl Iterator<Item = &NavNode> {
        self.sections
            .iter()
            .flat_map(|s| s.nav.iter())
            .chain(self.nav.iter())
    }

    /// Write the tree back as markdown.
    ///
    /// Navigation nodes are rendered as `toctree` directives at the end of
    /// the section they are attached to.
    pub fn to_markdown(&self) -> String {
        let mut out = String::new();
        push_text(&mut out, &self.preamble);
        for section in &self.sections {
            push_text(&mut out, &section.blocks);
            for nav in &section.nav {
                out.push_str(&nav.to_directive());
            }
        }
        for nav in &self.nav {
            out.push_str(&nav.to_directive());
        }
        out
    }

    /// Write the tree back into `notebook`, replacing its cells.
    ///
    /// Navigation nodes become markdown cells at the end of their section.
    pub fn to_notebook(&self, notebook: &Value) -> Value {
        let mut cells: Vec<Value> = Vec::new();
        push_cells(&mut cells, &self.preamble);
        for section in &self.sections {
            push_cells(&mut cells, &section.blocks);
            cells.extend(section.nav.iter().map(|n| notebook::markdown_cell(&n.to_directive())));
        }
        cells.extend(self.nav.iter().map(|n| notebook::markdown_cell(&n.to_directive())));

        let mut out = notebook.clone();
        if let Some(slot) = notebook::cells_mut(&mut out) {
            *slot = cells;
        }
        out
    }
}

fn text_blocks(text: &str) -> Vec<Block> {
    if text.is_empty() {
        Vec::new()
    } else {
        vec![Block::Text(text.to_owned())]
    }
}

fn push_text(out: &mut String, blocks: &[Block]) {
    for block in blocks {
        if let Block::Text(text) = block {
            out.push_str(text);
        }
    }
}

fn push_cells(out: &mut Vec<Value>, blocks: &[Block]) {
    for block in blocks {
        if let Block::Cell(cell) = block {
            out.push(cell.clone());
        }
    }
}

/// [`NavigationSink`] attaching navigation nodes to a parsed page.
pub struct TreeSink<'a> {
    tree: &'a mut DocTree,
}

impl<'a> TreeSink<'a> {
    pub fn new(tree: &'a mut DocTree) -> Self {
        Self { tree }
    }
}

impl NavigationSink for TreeSink<'_> {
    fn attach(
        &mut self,
        parent: &str,
        entries: &[NavEntry],
        flags: NavFlags,
    ) -> Result<(), InjectError> {
        let node = NavNode {
            parent: parent.to_owned(),
            entries: entries.to_vec(),
            flags,
        };
        match self.tree.sections.last_mut() {
            Some(section) => section.nav.push(node),
            None => self.tree.nav.push(node),
        }
        tracing::debug!(page = parent, entries = entries.len(), "Attached toctree node");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::SourceSink;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::path::Path;

    const PAGE: &str = "\
---
title: front matter
---
Intro text.

# First

Body.

## Sub

More.

# Second

Last.
";

    fn entries() -> Vec<NavEntry> {
        vec![
            NavEntry::Page {
                title: Some("Intro".to_owned()),
                path: "intro".to_owned(),
            },
            NavEntry::Divider,
        ]
    }

    #[test]
    fn test_from_markdown_splits_top_level_sections() {
        let tree = DocTree::from_markdown(PAGE);

        let titles: Vec<_> = tree.sections.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, vec!["First", "Second"]);
        assert_eq!(
            tree.preamble,
            vec![Block::Text(
                "---\ntitle: front matter\n---\nIntro text.\n\n".to_owned()
            )]
        );
        assert_eq!(tree.to_markdown(), PAGE);
    }

    #[test]
    fn test_from_markdown_uses_shallowest_level() {
        let tree = DocTree::from_markdown("## A\n\n### A.1\n\n## B\n");
        let titles: Vec<_> = tree.sections.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, vec!["A", "B"]);
    }

    #[test]
    fn test_from_markdown_without_headings() {
        let tree = DocTree::from_markdown("just text\n");
        assert!(tree.sections.is_empty());
        assert_eq!(tree.to_markdown(), "just text\n");
    }

    #[test]
    fn test_attach_goes_to_last_section() {
        let mut tree = DocTree::from_markdown(PAGE);

        TreeSink::new(&mut tree)
            .attach("index", &entries(), NavFlags::default())
            .unwrap();

        assert!(tree.sections[0].nav.is_empty());
        assert_eq!(tree.sections[1].nav.len(), 1);
        assert_eq!(tree.sections[1].nav[0].parent, "index");
        assert_eq!(tree.nav_nodes().count(), 1);
    }

    #[test]
    fn test_attach_without_sections_goes_to_document() {
        let mut tree = DocTree::from_markdown("no headings\n");

        TreeSink::new(&mut tree)
            .attach("index", &entries(), NavFlags::default())
            .unwrap();

        assert_eq!(tree.nav.len(), 1);
    }

    #[test]
    fn test_tree_and_source_strategies_render_the_same() {
        let flags = NavFlags {
            numbered: true,
            ..NavFlags::default()
        };

        let mut tree = DocTree::from_markdown(PAGE);
        TreeSink::new(&mut tree)
            .attach("index", &entries(), flags)
            .unwrap();

        let mut source = PAGE.to_owned();
        SourceSink::new(Path::new("index.md"), &mut source)
            .attach("index", &entries(), flags)
            .unwrap();

        assert_eq!(tree.to_markdown(), source);
    }

    #[test]
    fn test_notebook_sections_and_write_back() {
        let nb = json!({
            "cells": [
                {"cell_type": "code", "source": "import x"},
                {"cell_type": "markdown", "source": ["# Title\n", "text"]},
                {"cell_type": "code", "source": "x.run()"},
                {"cell_type": "markdown", "source": "## Detail"},
                {"cell_type": "markdown", "source": "# Next"},
            ],
            "metadata": {"kernelspec": {"name": "python3"}},
            "nbformat": 4,
        });

        let mut tree = DocTree::from_notebook(&nb);
        assert_eq!(tree.preamble.len(), 1);
        let titles: Vec<_> = tree.sections.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, vec!["Title", "Next"]);
        assert_eq!(tree.sections[0].blocks.len(), 3);

        TreeSink::new(&mut tree)
            .attach("nb", &entries(), NavFlags::default())
            .unwrap();
        let out = tree.to_notebook(&nb);

        let cells = out["cells"].as_array().unwrap();
        assert_eq!(cells.len(), 6);
        assert_eq!(
            cells[5]["source"],
            toctree_block(&entries(), NavFlags::default())
        );
        assert_eq!(out["metadata"], nb["metadata"]);
    }
}
