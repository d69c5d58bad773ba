//! Text layout helpers for help output
//!
//! All widths are visible terminal columns (via `unicode-width`), not bytes.

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Indentation used by every help section
pub const SECTION_INDENT: usize = 2;

/// Gap between a table's name column and its description column
pub const COLUMN_GAP: usize = 2;

/// Narrowest description column before a table stacks descriptions under names
const MIN_DESCRIPTION_WIDTH: usize = 20;

/// Continuation indent used when the usage prefix is too wide to align under
const FALLBACK_USAGE_INDENT: usize = 4;

/// Visible width of `text`
pub fn display_width(text: &str) -> usize {
    UnicodeWidthStr::width(text)
}

/// Pad `text` with spaces up to `width` visible columns
pub fn pad_end(text: &str, width: usize) -> String {
    let mut out = text.to_string();
    out.extend(std::iter::repeat(' ').take(width.saturating_sub(display_width(text))));
    out
}

/// Split a word that is wider than `width` into chunks that fit
fn hard_break(word: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_width = 0;

    for ch in word.chars() {
        let w = ch.width().unwrap_or(0);
        if current_width + w > width && !current.is_empty() {
            chunks.push(std::mem::take(&mut current));
            current_width = 0;
        }
        current.push(ch);
        current_width += w;
    }
    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}

/// Greedy word wrap. Explicit newlines are kept; no line exceeds `width`.
pub fn wrap(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut lines = Vec::new();

    for paragraph in text.lines() {
        if paragraph.trim().is_empty() {
            lines.push(String::new());
            continue;
        }

        let mut current = String::new();
        for word in paragraph.split_whitespace() {
            let pieces = if display_width(word) > width {
                hard_break(word, width)
            } else {
                vec![word.to_string()]
            };

            for piece in pieces {
                if current.is_empty() {
                    current = piece;
                } else if display_width(&current) + 1 + display_width(&piece) <= width {
                    current.push(' ');
                    current.push_str(&piece);
                } else {
                    lines.push(std::mem::replace(&mut current, piece));
                }
            }
        }
        lines.push(current);
    }

    lines
}

/// Prefix every non-empty line with `indent` spaces
pub fn indent(lines: &[String], indent: usize) -> Vec<String> {
    let pad = " ".repeat(indent);
    lines
        .iter()
        .map(|line| if line.is_empty() { String::new() } else { format!("{}{}", pad, line) })
        .collect()
}

/// Lay out `prefix` followed by `tokens`, breaking onto a new line whenever
/// the next word would cross `width`.
///
/// Continuation lines are indented one column past the prefix so the tokens
/// line up, unless that leaves no room, in which case a small fixed indent
/// is used instead. A prefix wider than `width` is itself wrapped; the words
/// that do not fit start the continuation lines.
pub fn flow(prefix: &str, tokens: &[String], width: usize) -> Vec<String> {
    let width = width.max(1);
    let widest = tokens.iter().map(|t| display_width(t)).max().unwrap_or(0);
    let prefix_fits = display_width(prefix) <= width;
    let mut continuation = display_width(prefix) + 1;
    if !prefix_fits || continuation + widest > width {
        continuation = FALLBACK_USAGE_INDENT.min(width - 1);
    }
    let pad = " ".repeat(continuation);
    let room = width - continuation;

    let mut lines = Vec::new();
    let (mut current, spill): (String, Vec<&str>) = if prefix_fits {
        (prefix.to_string(), Vec::new())
    } else {
        (String::new(), prefix.split_whitespace().collect())
    };

    for word in spill.into_iter().chain(tokens.iter().map(String::as_str)) {
        let pieces = if display_width(word) > room {
            hard_break(word, room)
        } else {
            vec![word.to_string()]
        };

        for piece in pieces {
            if current.is_empty() {
                current = piece;
            } else if display_width(&current) + 1 + display_width(&piece) <= width {
                current.push(' ');
                current.push_str(&piece);
            } else {
                lines.push(std::mem::replace(&mut current, format!("{}{}", pad, piece)));
            }
        }
    }

    lines.push(current);
    lines
}

/// Two-column table: names padded to the widest one, descriptions wrapped
/// into the remaining width with continuation lines under the description
/// column.
///
/// When the description column would be too narrow, each description is
/// stacked below its name instead.
pub fn table(rows: &[(String, String)], width: usize) -> Vec<String> {
    let name_width = rows.iter().map(|(name, _)| display_width(name)).max().unwrap_or(0);
    let description_column = SECTION_INDENT + name_width + COLUMN_GAP;
    let description_width = width.saturating_sub(description_column);
    let stacked = description_width < MIN_DESCRIPTION_WIDTH;

    let mut lines = Vec::new();
    for (name, description) in rows {
        let name_cell = format!("{}{}", " ".repeat(SECTION_INDENT), name);

        if stacked {
            lines.push(name_cell);
            let nested = SECTION_INDENT * 2;
            lines.extend(indent(&wrap(description, width.saturating_sub(nested)), nested));
            continue;
        }

        let wrapped = if description.is_empty() {
            Vec::new()
        } else {
            wrap(description, description_width)
        };
        let mut wrapped = wrapped.into_iter();

        match wrapped.next() {
            Some(first) if !first.is_empty() => {
                lines.push(format!("{}{}{}", pad_end(&name_cell, SECTION_INDENT + name_width), " ".repeat(COLUMN_GAP), first));
            }
            _ => lines.push(name_cell),
        }

        let pad = " ".repeat(description_column);
        for line in wrapped {
            if line.is_empty() {
                lines.push(String::new());
            } else {
                lines.push(format!("{}{}", pad, line));
            }
        }
    }

    lines
}
