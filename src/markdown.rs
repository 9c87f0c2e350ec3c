//! Structured rendering of transcript messages.
//!
//! Assistant content is written in markdown; this module maps it onto a tree
//! of [`Block`] and [`Inline`] values covering the grammar the assistant
//! produces: headings, paragraphs, lists, code spans and blocks, links and
//! blockquotes. User content is never interpreted; it renders as one
//! preformatted literal.
//!
//! Everything here is a pure function of a single [`Message`]; presentation
//! (ANSI, or anything else) lives with the consumer.

use pulldown_cmark::{CodeBlockKind, Event, HeadingLevel, Parser, Tag};

use crate::types::{Message, MessageRole};

/// The renderable form of one transcript message.
#[derive(Debug, Clone, PartialEq)]
pub enum Rendered {
    /// User content, verbatim.
    Preformatted(String),

    /// Assistant content, parsed into markup blocks.
    Document(Vec<Block>),
}

/// A block-level markup element.
#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    /// A heading with depth 1 through 6.
    Heading {
        /// Heading depth, 1 is outermost.
        level: u8,
        /// Inline content of the heading.
        content: Vec<Inline>,
    },

    /// A paragraph of inline content.
    Paragraph(Vec<Inline>),

    /// An ordered or unordered list; each item is a block sequence.
    List {
        /// True for numbered lists.
        ordered: bool,
        /// First number of an ordered list.
        start: u64,
        /// The items, in order.
        items: Vec<Vec<Block>>,
    },

    /// A fenced or indented code block.
    CodeBlock {
        /// Language tag from the fence info string, if any.
        language: Option<String>,
        /// The code, verbatim.
        code: String,
    },

    /// A quoted block sequence.
    Blockquote(Vec<Block>),

    /// A thematic break.
    Rule,
}

/// An inline markup element.
#[derive(Debug, Clone, PartialEq)]
pub enum Inline {
    /// Plain text.
    Text(String),

    /// An inline code span.
    Code(String),

    /// Emphasized content.
    Emphasis(Vec<Inline>),

    /// Strongly emphasized content.
    Strong(Vec<Inline>),

    /// A hyperlink.
    Link {
        /// The link destination.
        href: String,
        /// The link text.
        content: Vec<Inline>,
    },
}

/// Render one transcript message to its structured form.
pub fn render_message(message: &Message) -> Rendered {
    match message.role {
        MessageRole::User => Rendered::Preformatted(message.content.clone()),
        MessageRole::Assistant => Rendered::Document(parse_markdown(&message.content)),
    }
}

/// Parse assistant markdown into markup blocks.
pub fn parse_markdown(text: &str) -> Vec<Block> {
    let mut builder = TreeBuilder::default();
    for event in Parser::new(text) {
        match event {
            Event::Start(tag) => builder.start(tag),
            Event::End(_) => builder.end(),
            Event::Text(text) => builder.text(&text),
            Event::Code(code) => builder.push_inline(Inline::Code(code.to_string())),
            Event::Html(html) | Event::InlineHtml(html) => builder.text(&html),
            Event::SoftBreak => builder.text(" "),
            Event::HardBreak => builder.text("\n"),
            Event::Rule => builder.push_block(Block::Rule),
            _ => {}
        }
    }
    builder.finish()
}

/// An open container on the builder stack.
enum Frame {
    Paragraph(Vec<Inline>),
    Heading { level: u8, content: Vec<Inline> },
    Blockquote(Vec<Block>),
    List {
        ordered: bool,
        start: u64,
        items: Vec<Vec<Block>>,
    },
    Item {
        blocks: Vec<Block>,
        inlines: Vec<Inline>,
    },
    CodeBlock {
        language: Option<String>,
        code: String,
    },
    Inline(InlineKind, Vec<Inline>),
    Other(Vec<Block>),
}

enum InlineKind {
    Emphasis,
    Strong,
    Link(String),
}

/// Folds the parser's event stream into a block tree.
///
/// Start events push a frame; the matching End event pops it and folds the
/// finished element into its parent. Containers the grammar does not model
/// become transparent frames whose children splice into the parent.
#[derive(Default)]
struct TreeBuilder {
    blocks: Vec<Block>,
    stack: Vec<Frame>,
}

impl TreeBuilder {
    fn start(&mut self, tag: Tag<'_>) {
        let frame = match tag {
            Tag::Paragraph => Frame::Paragraph(Vec::new()),
            Tag::Heading { level, .. } => Frame::Heading {
                level: heading_depth(level),
                content: Vec::new(),
            },
            Tag::BlockQuote(_) => Frame::Blockquote(Vec::new()),
            Tag::CodeBlock(kind) => Frame::CodeBlock {
                language: code_language(&kind),
                code: String::new(),
            },
            Tag::List(start) => Frame::List {
                ordered: start.is_some(),
                start: start.unwrap_or(1),
                items: Vec::new(),
            },
            Tag::Item => Frame::Item {
                blocks: Vec::new(),
                inlines: Vec::new(),
            },
            Tag::Emphasis => Frame::Inline(InlineKind::Emphasis, Vec::new()),
            Tag::Strong => Frame::Inline(InlineKind::Strong, Vec::new()),
            Tag::Link { dest_url, .. } => {
                Frame::Inline(InlineKind::Link(dest_url.to_string()), Vec::new())
            }
            // Images degrade to links on a text surface.
            Tag::Image { dest_url, .. } => {
                Frame::Inline(InlineKind::Link(dest_url.to_string()), Vec::new())
            }
            _ => Frame::Other(Vec::new()),
        };
        self.stack.push(frame);
    }

    fn end(&mut self) {
        let Some(frame) = self.stack.pop() else {
            return;
        };
        match frame {
            Frame::Paragraph(content) => {
                if !content.is_empty() {
                    self.push_block(Block::Paragraph(content));
                }
            }
            Frame::Heading { level, content } => {
                self.push_block(Block::Heading { level, content });
            }
            Frame::Blockquote(children) => {
                self.push_block(Block::Blockquote(children));
            }
            Frame::List {
                ordered,
                start,
                items,
            } => {
                self.push_block(Block::List {
                    ordered,
                    start,
                    items,
                });
            }
            Frame::Item {
                mut blocks,
                inlines,
            } => {
                if !inlines.is_empty() {
                    blocks.push(Block::Paragraph(inlines));
                }
                let leftover = match self.stack.last_mut() {
                    Some(Frame::List { items, .. }) => {
                        items.push(blocks);
                        None
                    }
                    _ => Some(blocks),
                };
                if let Some(blocks) = leftover {
                    for block in blocks {
                        self.push_block(block);
                    }
                }
            }
            Frame::CodeBlock { language, code } => {
                self.push_block(Block::CodeBlock { language, code });
            }
            Frame::Inline(kind, content) => {
                let inline = match kind {
                    InlineKind::Emphasis => Inline::Emphasis(content),
                    InlineKind::Strong => Inline::Strong(content),
                    InlineKind::Link(href) => Inline::Link { href, content },
                };
                self.push_inline(inline);
            }
            Frame::Other(children) => {
                for block in children {
                    self.push_block(block);
                }
            }
        }
    }

    fn text(&mut self, text: &str) {
        let sunk = match self.stack.last_mut() {
            Some(Frame::CodeBlock { code, .. }) => {
                code.push_str(text);
                true
            }
            Some(Frame::Paragraph(content))
            | Some(Frame::Heading { content, .. })
            | Some(Frame::Inline(_, content)) => {
                append_text(content, text);
                true
            }
            Some(Frame::Item { inlines, .. }) => {
                append_text(inlines, text);
                true
            }
            _ => false,
        };
        if !sunk {
            self.push_block(Block::Paragraph(vec![Inline::Text(text.to_string())]));
        }
    }

    fn push_inline(&mut self, inline: Inline) {
        let leftover = match self.stack.last_mut() {
            Some(Frame::Paragraph(content))
            | Some(Frame::Heading { content, .. })
            | Some(Frame::Inline(_, content)) => {
                content.push(inline);
                None
            }
            Some(Frame::Item { inlines, .. }) => {
                inlines.push(inline);
                None
            }
            _ => Some(inline),
        };
        if let Some(inline) = leftover {
            self.push_block(Block::Paragraph(vec![inline]));
        }
    }

    fn push_block(&mut self, block: Block) {
        match self.stack.last_mut() {
            Some(Frame::Blockquote(children)) | Some(Frame::Other(children)) => {
                children.push(block);
            }
            Some(Frame::Item { blocks, inlines }) => {
                if !inlines.is_empty() {
                    blocks.push(Block::Paragraph(std::mem::take(inlines)));
                }
                blocks.push(block);
            }
            Some(Frame::List { items, .. }) => {
                items.push(vec![block]);
            }
            _ => self.blocks.push(block),
        }
    }

    fn finish(mut self) -> Vec<Block> {
        while !self.stack.is_empty() {
            self.end();
        }
        self.blocks
    }
}

/// Append text to an inline sequence, merging with a trailing text node.
fn append_text(sink: &mut Vec<Inline>, text: &str) {
    if let Some(Inline::Text(existing)) = sink.last_mut() {
        existing.push_str(text);
    } else {
        sink.push(Inline::Text(text.to_string()));
    }
}

fn heading_depth(level: HeadingLevel) -> u8 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}

fn code_language(kind: &CodeBlockKind<'_>) -> Option<String> {
    match kind {
        CodeBlockKind::Fenced(info) => info
            .split_whitespace()
            .next()
            .map(|lang| lang.to_string()),
        CodeBlockKind::Indented => None,
    }
}
