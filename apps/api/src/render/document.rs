//! DOCUMENT format — pagination and layout over the TEXT blocks.
//!
//! Page geometry comes from `RenderConfig`. Layout rules:
//! - lines longer than the page width word-wrap;
//! - a block that fits on one page is never split across a page boundary;
//! - a block taller than a page wraps mid-block, with a continuation marker
//!   opening each follow-on page;
//! - pages are separated by a form feed and carry a numbered header.

use crate::config::RenderConfig;
use crate::models::result::TailoredResult;
use crate::render::text::{blocks, Block};

const CONTINUATION_MARKER: &str = "(continued)";
const PAGE_BREAK: &str = "\u{c}";

pub fn render_document(result: &TailoredResult, config: &RenderConfig) -> String {
    let wrapped: Vec<Block> = blocks(result)
        .into_iter()
        .map(|b| wrap_block(&b, config.page_width))
        .collect();
    let pages = paginate(&wrapped, config.page_lines);

    let mut out = String::new();
    for (i, page) in pages.iter().enumerate() {
        if i > 0 {
            out.push_str(PAGE_BREAK);
            out.push('\n');
        }
        out.push_str(&format!("--- Page {} ---\n", i + 1));
        for line in page {
            out.push_str(line);
            out.push('\n');
        }
    }
    out
}

/// Word-wraps every line of a block to the given width. Indivisible tokens
/// longer than the width get a line of their own.
fn wrap_block(block: &Block, width: usize) -> Block {
    let mut lines = Vec::new();
    for line in &block.lines {
        if line.chars().count() <= width {
            lines.push(line.clone());
            continue;
        }
        let mut current = String::new();
        for word in line.split_whitespace() {
            let needed = if current.is_empty() {
                word.chars().count()
            } else {
                current.chars().count() + 1 + word.chars().count()
            };
            if needed > width && !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            if !current.is_empty() {
                current.push(' ');
            }
            current.push_str(word);
        }
        if !current.is_empty() {
            lines.push(current);
        }
    }
    Block { lines }
}

/// Packs wrapped blocks into pages of `page_lines` rows. Blocks on the same
/// page are separated by one blank line, which counts toward the budget.
fn paginate(blocks: &[Block], page_lines: usize) -> Vec<Vec<String>> {
    let mut pages: Vec<Vec<String>> = Vec::new();
    let mut current: Vec<String> = Vec::new();

    for block in blocks {
        if block.lines.is_empty() {
            continue;
        }
        let separator = usize::from(!current.is_empty());
        let height = block.lines.len();

        if height <= page_lines {
            // Whole block must land on a single page.
            if current.len() + separator + height > page_lines {
                pages.push(std::mem::take(&mut current));
            } else if separator == 1 {
                current.push(String::new());
            }
            current.extend(block.lines.iter().cloned());
        } else {
            // Taller than a page: fill the current page, then continue on
            // fresh pages under a continuation marker.
            if separator == 1 && current.len() + 2 <= page_lines {
                current.push(String::new());
            }
            let mut remaining: &[String] = &block.lines;
            let mut first_chunk = true;
            while !remaining.is_empty() {
                if current.len() >= page_lines {
                    pages.push(std::mem::take(&mut current));
                    if !first_chunk && page_lines > 1 {
                        current.push(CONTINUATION_MARKER.to_string());
                    }
                }
                let space = page_lines - current.len();
                let take = space.min(remaining.len());
                current.extend(remaining[..take].iter().cloned());
                remaining = &remaining[take..];
                first_chunk = false;
            }
        }
    }

    if !current.is_empty() {
        pages.push(current);
    }
    if pages.is_empty() {
        pages.push(Vec::new());
    }
    pages
}
