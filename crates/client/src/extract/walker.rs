//! Structural walk over a parsed HTML tree.
//!
//! Emits [`ContentBlock`]s in document order. Headings, paragraphs and list
//! items get their own blocks; inline text runs are merged onto the previous
//! block while that block is still an open line.
//!
//! The walk uses an explicit stack, so deeply nested markup cannot exhaust the
//! call stack. Elements deeper than `max_depth` are not visited.

use std::collections::HashSet;

use ego_tree::{NodeId, NodeRef, iter::Edge};
use scraper::{Html, Node};

/// One unit of emitted text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentBlock {
    pub kind: BlockKind,
    /// Leading spaces in the rendered block.
    pub indent: usize,
    pub text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
    /// Bare text run outside any structural element.
    Text,
    /// `h1`..`h6`, carrying the level.
    Heading(u8),
    Paragraph,
    ListItem,
}

impl ContentBlock {
    fn heading(level: u8, text: String) -> Self {
        Self { kind: BlockKind::Heading(level), indent: (level as usize - 1) * 4, text }
    }

    /// Headings and paragraphs close their line; text runs and list items stay open.
    pub fn ends_with_line_break(&self) -> bool {
        matches!(self.kind, BlockKind::Heading(_) | BlockKind::Paragraph)
    }

    /// Render the block as it appears in the joined output.
    pub fn render(&self) -> String {
        let pad = " ".repeat(self.indent);
        match self.kind {
            BlockKind::Heading(_) => format!("\n{pad}{}\n", self.text),
            BlockKind::Paragraph => format!("{pad}{}\n", self.text),
            BlockKind::ListItem => format!("{pad}- {}", self.text),
            BlockKind::Text => format!("{pad}{}", self.text),
        }
    }
}

/// Collects blocks and tracks whether the last one is still an open line.
#[derive(Debug, Default)]
struct BlockAccumulator {
    blocks: Vec<ContentBlock>,
    open_line: bool,
}

impl BlockAccumulator {
    fn push_text(&mut self, level: usize, text: String) {
        if self.open_line
            && let Some(last) = self.blocks.last_mut()
        {
            last.text.push(' ');
            last.text.push_str(&text);
            return;
        }
        self.push(ContentBlock { kind: BlockKind::Text, indent: level, text });
    }

    fn push(&mut self, block: ContentBlock) {
        self.open_line = !block.ends_with_line_break();
        self.blocks.push(block);
    }
}

struct Frame<'a> {
    node: NodeRef<'a, Node>,
    level: usize,
    depth: usize,
}

/// Pre-order walker that turns a parsed document into content blocks.
#[derive(Debug, Clone)]
pub struct StructuralWalker {
    max_depth: usize,
    skip_tags: HashSet<String>,
}

impl StructuralWalker {
    pub fn new(max_depth: usize, skip_tags: &[String]) -> Self {
        Self { max_depth, skip_tags: skip_tags.iter().map(|t| t.to_ascii_lowercase()).collect() }
    }

    /// Walk the whole document starting at its root.
    pub fn walk(&self, html: &Html) -> Vec<ContentBlock> {
        let mut acc = BlockAccumulator::default();
        let mut stack = Vec::new();
        self.push_children(&mut stack, html.tree.root(), 0, 1);

        while let Some(Frame { node, level, depth }) = stack.pop() {
            match node.value() {
                Node::Text(text) => {
                    let text = collapse_spaces(text);
                    if !text.is_empty() {
                        acc.push_text(level, text);
                    }
                }
                Node::Element(element) => {
                    let name = element.name().to_ascii_lowercase();
                    if self.skip_tags.contains(&name) {
                        continue;
                    }

                    if let Some(heading) = heading_level(&name) {
                        acc.push(ContentBlock::heading(heading, self.flattened_text(node)));
                    } else if name == "p" {
                        let text = self.flattened_text(node);
                        if !text.is_empty() {
                            acc.push(ContentBlock { kind: BlockKind::Paragraph, indent: level, text });
                        }
                    } else if name == "ul" || name == "ol" {
                        for li in node.children().filter(|c| is_element(*c, "li")) {
                            acc.push(ContentBlock {
                                kind: BlockKind::ListItem,
                                indent: level + 2,
                                text: self.flattened_text(li),
                            });
                        }
                    } else if depth < self.max_depth {
                        self.push_children(&mut stack, node, level, depth + 1);
                    }
                }
                _ => {}
            }
        }

        acc.blocks
    }

    fn push_children<'a>(&self, stack: &mut Vec<Frame<'a>>, parent: NodeRef<'a, Node>, level: usize, depth: usize) {
        // Reversed so the first child is popped first.
        let children: Vec<_> = parent.children().collect();
        stack.extend(children.into_iter().rev().map(|node| Frame { node, level, depth }));
    }

    /// Visible text of a subtree, whitespace-collapsed and trimmed.
    ///
    /// Skipped tags contribute nothing. Block-level boundaries and `<br>`
    /// separate words the way a renderer would.
    pub fn flattened_text(&self, node: NodeRef<'_, Node>) -> String {
        let mut out = String::new();
        let mut skipping: Option<NodeId> = None;

        for edge in node.traverse() {
            match edge {
                Edge::Open(n) => {
                    if skipping.is_some() {
                        continue;
                    }
                    match n.value() {
                        Node::Text(text) => out.push_str(text),
                        Node::Element(element) => {
                            let name = element.name().to_ascii_lowercase();
                            if self.skip_tags.contains(&name) {
                                skipping = Some(n.id());
                            } else if is_block_level(&name) {
                                out.push(' ');
                            }
                        }
                        _ => {}
                    }
                }
                Edge::Close(n) => {
                    if skipping == Some(n.id()) {
                        skipping = None;
                    } else if skipping.is_none()
                        && let Node::Element(element) = n.value()
                        && is_block_level(&element.name().to_ascii_lowercase())
                    {
                        out.push(' ');
                    }
                }
            }
        }

        collapse_spaces(&out)
    }
}

fn heading_level(name: &str) -> Option<u8> {
    match name.as_bytes() {
        [b'h', d @ b'1'..=b'6'] => Some(d - b'0'),
        _ => None,
    }
}

fn is_element(node: NodeRef<'_, Node>, name: &str) -> bool {
    matches!(node.value(), Node::Element(e) if e.name().eq_ignore_ascii_case(name))
}

fn is_block_level(name: &str) -> bool {
    matches!(
        name,
        "address"
            | "article"
            | "aside"
            | "blockquote"
            | "br"
            | "dd"
            | "div"
            | "dl"
            | "dt"
            | "figcaption"
            | "figure"
            | "footer"
            | "form"
            | "h1"
            | "h2"
            | "h3"
            | "h4"
            | "h5"
            | "h6"
            | "header"
            | "hr"
            | "li"
            | "main"
            | "nav"
            | "ol"
            | "p"
            | "pre"
            | "section"
            | "table"
            | "td"
            | "th"
            | "tr"
            | "ul"
    )
}

/// Collapse whitespace runs to single spaces and trim.
fn collapse_spaces(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
