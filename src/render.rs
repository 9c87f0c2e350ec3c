//! Terminal output for transcript messages.
//!
//! This module consumes the markup trees produced by [`crate::markdown`] and
//! flattens them to plain text with optional ANSI styling. It is presentation
//! glue only; the structured form is the boundary.

use std::io::{self, Stdout, Write};

use crate::markdown::{Block, Inline, Rendered, render_message};
use crate::types::Message;

/// ANSI escape code for bold text (used for headings and strong emphasis).
const ANSI_BOLD: &str = "\x1b[1m";

/// ANSI escape code for italic text (used for emphasis).
const ANSI_ITALIC: &str = "\x1b[3m";

/// ANSI escape code to reset all styling.
const ANSI_RESET: &str = "\x1b[0m";

/// ANSI escape code for cyan text (used for link targets).
const ANSI_CYAN: &str = "\x1b[36m";

/// ANSI escape code for yellow text (used for code).
const ANSI_YELLOW: &str = "\x1b[33m";

/// Trait for rendering transcript output.
///
/// This abstraction allows for different rendering strategies: plain text
/// with ANSI styling, plain text for piping, or something richer.
pub trait Renderer {
    /// Print a transcript message.
    fn print_message(&mut self, message: &Message);

    /// Print an informational message.
    fn print_info(&mut self, info: &str);

    /// Print an error message.
    fn print_error(&mut self, error: &str);
}

/// Plain text renderer with optional ANSI styling.
pub struct PlainTextRenderer {
    stdout: Stdout,
    use_color: bool,
}

impl PlainTextRenderer {
    /// Creates a new PlainTextRenderer with ANSI colors enabled.
    pub fn new() -> Self {
        Self {
            stdout: io::stdout(),
            use_color: true,
        }
    }

    /// Creates a new PlainTextRenderer with specified color setting.
    pub fn with_color(use_color: bool) -> Self {
        Self {
            stdout: io::stdout(),
            use_color,
        }
    }

    fn flush(&mut self) {
        let _ = self.stdout.flush();
    }
}

impl Default for PlainTextRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer for PlainTextRenderer {
    fn print_message(&mut self, message: &Message) {
        match render_message(message) {
            Rendered::Preformatted(content) => {
                println!("{content}");
            }
            Rendered::Document(blocks) => {
                print!("{}", render_blocks(&blocks, self.use_color, true));
            }
        }
        println!();
        self.flush();
    }

    fn print_info(&mut self, info: &str) {
        println!("{info}");
        self.flush();
    }

    fn print_error(&mut self, error: &str) {
        eprintln!("\nError: {error}");
    }
}

/// Flatten blocks to text, one line per terminal row, each ending in a
/// newline. `blank_between` inserts an empty line between sibling blocks.
fn render_blocks(blocks: &[Block], use_color: bool, blank_between: bool) -> String {
    let mut out = String::new();
    for (i, block) in blocks.iter().enumerate() {
        if i > 0 && blank_between {
            out.push('\n');
        }
        render_block(&mut out, block, use_color);
    }
    out
}

fn render_block(out: &mut String, block: &Block, use_color: bool) {
    match block {
        Block::Heading { level, content } => {
            let text = render_inlines(content, use_color);
            let hashes = "#".repeat(usize::from(*level));
            if use_color {
                out.push_str(&format!("{ANSI_BOLD}{hashes} {text}{ANSI_RESET}\n"));
            } else {
                out.push_str(&format!("{hashes} {text}\n"));
            }
        }
        Block::Paragraph(content) => {
            out.push_str(&render_inlines(content, use_color));
            out.push('\n');
        }
        Block::List {
            ordered,
            start,
            items,
        } => {
            for (idx, item) in items.iter().enumerate() {
                let marker = if *ordered {
                    format!("{}. ", start + idx as u64)
                } else {
                    "- ".to_string()
                };
                let body = render_blocks(item, use_color, false);
                for (line_no, line) in body.lines().enumerate() {
                    if line_no == 0 {
                        out.push_str(&marker);
                    } else {
                        out.push_str(&" ".repeat(marker.len()));
                    }
                    out.push_str(line);
                    out.push('\n');
                }
            }
        }
        Block::CodeBlock { code, .. } => {
            if use_color {
                out.push_str(ANSI_YELLOW);
            }
            for line in code.lines() {
                out.push_str("    ");
                out.push_str(line);
                out.push('\n');
            }
            if use_color {
                out.push_str(ANSI_RESET);
            }
        }
        Block::Blockquote(children) => {
            let body = render_blocks(children, use_color, false);
            for line in body.lines() {
                out.push_str("> ");
                out.push_str(line);
                out.push('\n');
            }
        }
        Block::Rule => {
            out.push_str("-----\n");
        }
    }
}

fn render_inlines(inlines: &[Inline], use_color: bool) -> String {
    let mut out = String::new();
    for inline in inlines {
        match inline {
            Inline::Text(text) => out.push_str(text),
            Inline::Code(code) => {
                if use_color {
                    out.push_str(&format!("{ANSI_YELLOW}{code}{ANSI_RESET}"));
                } else {
                    out.push_str(&format!("`{code}`"));
                }
            }
            Inline::Emphasis(children) => {
                let inner = render_inlines(children, use_color);
                if use_color {
                    out.push_str(&format!("{ANSI_ITALIC}{inner}{ANSI_RESET}"));
                } else {
                    out.push_str(&format!("*{inner}*"));
                }
            }
            Inline::Strong(children) => {
                let inner = render_inlines(children, use_color);
                if use_color {
                    out.push_str(&format!("{ANSI_BOLD}{inner}{ANSI_RESET}"));
                } else {
                    out.push_str(&format!("**{inner}**"));
                }
            }
            Inline::Link { href, content } => {
                let label = render_inlines(content, use_color);
                if label.is_empty() || label == *href {
                    if use_color {
                        out.push_str(&format!("{ANSI_CYAN}{href}{ANSI_RESET}"));
                    } else {
                        out.push_str(href);
                    }
                } else if use_color {
                    out.push_str(&format!("{label} ({ANSI_CYAN}{href}{ANSI_RESET})"));
                } else {
                    out.push_str(&format!("{label} ({href})"));
                }
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markdown::parse_markdown;

    fn plain(markdown: &str) -> String {
        render_blocks(&parse_markdown(markdown), false, true)
    }

    #[test]
    fn renderer_default_has_color() {
        let renderer = PlainTextRenderer::new();
        assert!(renderer.use_color);
    }

    #[test]
    fn renderer_without_color() {
        let renderer = PlainTextRenderer::with_color(false);
        assert!(!renderer.use_color);
    }

    #[test]
    fn heading_and_paragraph() {
        assert_eq!(plain("# Title\n\nbody"), "# Title\n\nbody\n");
    }

    #[test]
    fn inline_styles_round_trip_to_markers() {
        assert_eq!(
            plain("before **bold** and *soft* and `code` after"),
            "before **bold** and *soft* and `code` after\n"
        );
    }

    #[test]
    fn links_show_their_target() {
        assert_eq!(
            plain("see [the docs](https://kb.example.com/docs)"),
            "see the docs (https://kb.example.com/docs)\n"
        );
    }

    #[test]
    fn bare_links_are_not_doubled() {
        assert_eq!(
            plain("<https://kb.example.com>"),
            "https://kb.example.com\n"
        );
    }

    #[test]
    fn unordered_list_markers() {
        assert_eq!(plain("- alpha\n- beta\n"), "- alpha\n- beta\n");
    }

    #[test]
    fn ordered_list_numbering() {
        assert_eq!(plain("3. third\n4. fourth\n"), "3. third\n4. fourth\n");
    }

    #[test]
    fn nested_list_indents_continuations() {
        assert_eq!(
            plain("- outer\n  - inner\n"),
            "- outer\n  - inner\n"
        );
    }

    #[test]
    fn code_blocks_are_indented() {
        assert_eq!(
            plain("```rust\nfn main() {}\n```\n"),
            "    fn main() {}\n"
        );
    }

    #[test]
    fn blockquotes_are_prefixed() {
        assert_eq!(plain("> body\n"), "> body\n");
    }
}
