//! Line-oriented block parser.
//!
//! Each input line is classified once ([`classify`]) and then fed to a small
//! state machine ([`BlockState`]) that decides which tags to open and close.
//! Code fences take priority over everything else: while a fence is open,
//! lines are copied through escaped and never classified further.

use crate::escape::escape_html;
use crate::inline::InlineParser;

/// Marker emitted for blank lines and stripped when the parser finishes.
const EMPTY_PARAGRAPH: &str = "<p></p>";

/// Kind of list currently open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListKind {
    /// `-`, `*` or `+` items rendered as `<ul>`.
    Unordered,
    /// `1.` style items rendered as `<ol>`.
    Ordered,
}

impl ListKind {
    fn tag(self) -> &'static str {
        match self {
            Self::Unordered => "ul",
            Self::Ordered => "ol",
        }
    }
}

/// Block-level classification of a single raw line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind<'a> {
    /// Three backticks, optionally followed by a language tag.
    Fence {
        /// First whitespace-delimited word after the backticks (may be empty).
        language: &'a str,
    },
    /// `#` to `######` followed by whitespace.
    Heading {
        /// Number of `#` characters (1-6).
        level: u8,
        /// Heading text with the marker and following whitespace removed.
        text: &'a str,
    },
    /// Unordered or ordered list item.
    ListItem {
        /// List the item belongs to.
        kind: ListKind,
        /// Item text with the marker and following whitespace removed.
        text: &'a str,
    },
    /// Empty or whitespace-only line.
    Blank,
    /// Anything else, rendered as a paragraph.
    Text(&'a str),
}

/// Classify a raw line.
///
/// Rules are checked in priority order: fence, heading, unordered item,
/// ordered item, blank, text.
#[must_use]
pub fn classify(line: &str) -> LineKind<'_> {
    if let Some(language) = parse_fence(line) {
        return LineKind::Fence { language };
    }
    if let Some((level, text)) = parse_heading(line) {
        return LineKind::Heading { level, text };
    }
    if let Some(text) = parse_unordered_item(line) {
        return LineKind::ListItem {
            kind: ListKind::Unordered,
            text,
        };
    }
    if let Some(text) = parse_ordered_item(line) {
        return LineKind::ListItem {
            kind: ListKind::Ordered,
            text,
        };
    }
    if line.trim().is_empty() {
        return LineKind::Blank;
    }
    LineKind::Text(line)
}

fn parse_fence(line: &str) -> Option<&str> {
    let rest = line.strip_prefix("```")?;
    Some(rest.split_whitespace().next().unwrap_or(""))
}

fn parse_heading(line: &str) -> Option<(u8, &str)> {
    let hashes = line.bytes().take_while(|&b| b == b'#').count();
    if !(1..=6).contains(&hashes) {
        return None;
    }
    let rest = &line[hashes..];
    if !rest.starts_with(char::is_whitespace) {
        return None;
    }
    let level = u8::try_from(hashes).ok()?;
    Some((level, rest.trim_start()))
}

fn parse_unordered_item(line: &str) -> Option<&str> {
    let trimmed = line.trim_start();
    let rest = trimmed.strip_prefix(['-', '*', '+'])?;
    after_marker(rest)
}

fn parse_ordered_item(line: &str) -> Option<&str> {
    let trimmed = line.trim_start();
    let digits = trimmed.bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 {
        return None;
    }
    let rest = trimmed[digits..].strip_prefix('.')?;
    after_marker(rest)
}

/// A list marker must be followed by at least one whitespace character.
fn after_marker(rest: &str) -> Option<&str> {
    if rest.starts_with(char::is_whitespace) {
        Some(rest.trim_start())
    } else {
        None
    }
}

/// State carried between lines of a single render call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum BlockState {
    /// Outside any list or fence.
    #[default]
    Normal,
    /// Inside a fenced code block.
    InCodeFence {
        /// Language tag from the opening fence.
        language: String,
    },
    /// Inside an open list.
    InList(ListKind),
}

/// Block parser for one render call.
pub(crate) struct BlockParser<'r> {
    state: BlockState,
    output: String,
    inline: &'r InlineParser,
    code_class_prefix: &'r str,
}

impl<'r> BlockParser<'r> {
    pub(crate) fn new(inline: &'r InlineParser, code_class_prefix: &'r str) -> Self {
        Self {
            state: BlockState::Normal,
            output: String::new(),
            inline,
            code_class_prefix,
        }
    }

    /// Current state, exposed for transition tests.
    #[cfg(test)]
    pub(crate) fn state(&self) -> &BlockState {
        &self.state
    }

    /// Process one line (without its line break).
    pub(crate) fn feed(&mut self, line: &str) {
        if matches!(self.state, BlockState::InCodeFence { .. }) {
            if parse_fence(line).is_some() {
                self.output.push_str("</code></pre>");
                self.state = BlockState::Normal;
            } else {
                self.output.push_str(&escape_html(line));
                self.output.push('\n');
            }
            return;
        }

        match classify(line) {
            LineKind::Fence { language } => {
                self.close_list();
                self.output.push_str(&format!(
                    r#"<pre><code class="{}{}">"#,
                    escape_html(self.code_class_prefix),
                    escape_html(language)
                ));
                self.state = BlockState::InCodeFence {
                    language: language.to_owned(),
                };
            }
            LineKind::Heading { level, text } => {
                self.close_list();
                let content = self.inline.parse(&escape_html(text));
                self.output.push_str(&format!("<h{level}>{content}</h{level}>"));
            }
            LineKind::ListItem { kind, text } => {
                self.open_list(kind);
                let content = self.inline.parse(&escape_html(text));
                self.output.push_str(&format!("<li>{content}</li>"));
            }
            LineKind::Blank => {
                self.close_list();
                self.output.push_str(EMPTY_PARAGRAPH);
            }
            LineKind::Text(text) => {
                self.close_list();
                let content = self.inline.parse(&escape_html(text));
                self.output.push_str(&format!("<p>{content}</p>"));
            }
        }
    }

    /// Close any open list and return the finished fragment.
    ///
    /// An unterminated code fence is left open.
    pub(crate) fn finish(mut self) -> String {
        if let BlockState::InCodeFence { language } = &self.state {
            tracing::debug!(language = %language, "Code fence left open at end of input");
        }
        self.close_list();
        self.output.replace(EMPTY_PARAGRAPH, "")
    }

    fn open_list(&mut self, kind: ListKind) {
        if self.state == BlockState::InList(kind) {
            return;
        }
        self.close_list();
        self.output.push('<');
        self.output.push_str(kind.tag());
        self.output.push('>');
        self.state = BlockState::InList(kind);
    }

    fn close_list(&mut self) {
        if let BlockState::InList(kind) = self.state {
            self.output.push_str("</");
            self.output.push_str(kind.tag());
            self.output.push('>');
            self.state = BlockState::Normal;
        }
    }
}
