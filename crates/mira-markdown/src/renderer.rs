//! Markdown to HTML renderer for chat messages.

use crate::block::BlockParser;
use crate::escape::escape_html;
use crate::inline::InlineParser;

/// Default class prefix for fenced code blocks (`lang-rust`).
const DEFAULT_CODE_CLASS_PREFIX: &str = "lang-";

/// Renders untrusted markdown text to a safe HTML fragment.
///
/// A renderer holds only options; every call to [`render`](Self::render)
/// starts from fresh block state, so one instance can be shared between
/// threads.
#[derive(Debug, Clone)]
pub struct Renderer {
    inline: InlineParser,
    code_class_prefix: String,
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer {
    /// Create a renderer with default options.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inline: InlineParser::new(true),
            code_class_prefix: DEFAULT_CODE_CLASS_PREFIX.to_owned(),
        }
    }

    /// Control whether links get `target="_blank" rel="noopener noreferrer"`.
    ///
    /// Enabled by default.
    #[must_use]
    pub fn with_link_target(mut self, enabled: bool) -> Self {
        self.inline = InlineParser::new(enabled);
        self
    }

    /// Set the class prefix used on `<code>` inside fenced blocks.
    #[must_use]
    pub fn with_code_class_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.code_class_prefix = prefix.into();
        self
    }

    /// Render markdown text to HTML.
    #[must_use]
    pub fn render(&self, text: &str) -> String {
        let normalized = normalize_line_endings(text);
        let mut parser = BlockParser::new(&self.inline, &self.code_class_prefix);
        for line in normalized.split('\n') {
            parser.feed(line);
        }
        parser.finish()
    }

    /// Render optional text. `None` renders as an empty string.
    #[must_use]
    pub fn render_opt(&self, text: Option<&str>) -> String {
        text.map(|t| self.render(t)).unwrap_or_default()
    }

    /// Render a single line of inline markdown without block structure.
    #[must_use]
    pub fn render_inline(&self, text: &str) -> String {
        self.inline.parse(&escape_html(text))
    }
}

/// Render markdown text with default options.
///
/// # Examples
///
/// ```
/// assert_eq!(mira_markdown::render("# Title"), "<h1>Title</h1>");
/// assert_eq!(
///     mira_markdown::render("- a\n- b"),
///     "<ul><li>a</li><li>b</li></ul>"
/// );
/// ```
#[must_use]
pub fn render(text: &str) -> String {
    Renderer::new().render(text)
}

/// Collapse `\r\n` and lone `\r` into `\n`.
fn normalize_line_endings(text: &str) -> std::borrow::Cow<'_, str> {
    if text.contains('\r') {
        std::borrow::Cow::Owned(text.replace("\r\n", "\n").replace('\r', "\n"))
    } else {
        std::borrow::Cow::Borrowed(text)
    }
}
