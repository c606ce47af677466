//! Inline substitutions applied within a single escaped line.
//!
//! Passes run in a fixed order: code spans, links, bold, italic. Code spans
//! and finished anchors are moved out of the line into a [`Stash`] and
//! replaced by a token, so later passes never rewrite their contents. The
//! token format `&@N;` cannot occur in escaped text because every `&` that
//! survives escaping starts a named or numeric entity.

use std::sync::LazyLock;

use regex::{Captures, Regex};

/// Code span delimited by single backticks.
static CODE_SPAN_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"`([^`]+)`").unwrap());

/// Link in `[text](url)` form.
///
/// The destination may contain one level of balanced parentheses, as in
/// `javascript:alert(1)` or `https://en.wikipedia.org/wiki/Rust_(language)`.
static LINK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[([^\]]+)\]\(((?:[^()]|\([^()]*\))+)\)").unwrap()
});

/// Bold with asterisks. Content must not start with a marker so that
/// `***x***` splits into an outer italic and an inner bold.
static BOLD_STAR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*\*([^*].*?)\*\*").unwrap());

static BOLD_UNDERSCORE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"__([^_].*?)__").unwrap());

static ITALIC_STAR_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\*(.+?)\*").unwrap());

static ITALIC_UNDERSCORE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"_(.+?)_").unwrap());

/// Script pseudo-scheme, matched on the normalized destination.
static SCRIPT_SCHEME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^javascript:").unwrap());

static TOKEN_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"&@(\d+);").unwrap());

/// A fragment lifted out of the line.
struct Fragment {
    /// Rendered markup restored into the output.
    html: String,
    /// Escaped source text, restored where markup is not allowed (link targets).
    source: String,
}

/// Fragments removed from a line while later passes run.
#[derive(Default)]
struct Stash {
    fragments: Vec<Fragment>,
}

impl Stash {
    /// Store a fragment and return the token standing in for it.
    fn push(&mut self, html: String, source: String) -> String {
        let token = format!("&@{};", self.fragments.len());
        self.fragments.push(Fragment { html, source });
        token
    }

    /// Replace tokens with their rendered markup.
    fn restore_html(&self, text: &str) -> String {
        self.restore(text, true)
    }

    /// Replace tokens with the text they were created from.
    fn restore_source(&self, text: &str) -> String {
        self.restore(text, false)
    }

    fn restore(&self, text: &str, markup: bool) -> String {
        if self.fragments.is_empty() {
            return text.to_owned();
        }
        TOKEN_RE
            .replace_all(text, |caps: &Captures| {
                caps[1]
                    .parse::<usize>()
                    .ok()
                    .and_then(|index| self.fragments.get(index))
                    .map_or_else(
                        || caps[0].to_owned(),
                        |fragment| {
                            if markup {
                                fragment.html.clone()
                            } else {
                                fragment.source.clone()
                            }
                        },
                    )
            })
            .into_owned()
    }
}

/// Whether a link destination uses the `javascript:` scheme.
///
/// Normalized the way browsers read a URL: ASCII tab and newline are
/// removed anywhere, then leading C0 controls and whitespace are skipped.
pub(crate) fn is_script_url(url: &str) -> bool {
    let compact: String = url
        .chars()
        .filter(|&c| !matches!(c, '\t' | '\n' | '\r'))
        .collect();
    let scheme = compact.trim_start_matches(|c: char| c <= ' ' || c.is_whitespace());
    SCRIPT_SCHEME_RE.is_match(scheme)
}

/// Inline markdown parser.
#[derive(Debug, Clone)]
pub(crate) struct InlineParser {
    link_target: bool,
}

impl InlineParser {
    /// Create a parser. With `link_target` set, anchors open in a new tab.
    pub(crate) fn new(link_target: bool) -> Self {
        Self { link_target }
    }

    /// Apply inline substitutions to an already escaped line.
    pub(crate) fn parse(&self, escaped: &str) -> String {
        let mut stash = Stash::default();

        let text = CODE_SPAN_RE.replace_all(escaped, |caps: &Captures| {
            stash.push(format!("<code>{}</code>", &caps[1]), caps[0].to_owned())
        });

        let text = LINK_RE
            .replace_all(&text, |caps: &Captures| {
                let url = stash.restore_source(&caps[2]);
                if is_script_url(&url) {
                    return caps[1].to_owned();
                }
                let label = stash.restore_html(&emphasis(&caps[1]));
                let anchor = self.anchor(&url, &label);
                stash.push(anchor, caps[0].to_owned())
            })
            .into_owned();

        stash.restore_html(&emphasis(&text))
    }

    fn anchor(&self, url: &str, label: &str) -> String {
        if self.link_target {
            format!(r#"<a href="{url}" target="_blank" rel="noopener noreferrer">{label}</a>"#)
        } else {
            format!(r#"<a href="{url}">{label}</a>"#)
        }
    }
}

/// Bold then italic, each over the whole text in one sweep.
fn emphasis(text: &str) -> String {
    let text = BOLD_STAR_RE.replace_all(text, "<strong>$1</strong>");
    let text = BOLD_UNDERSCORE_RE.replace_all(&text, "<strong>$1</strong>");
    let text = ITALIC_STAR_RE.replace_all(&text, "<em>$1</em>");
    ITALIC_UNDERSCORE_RE
        .replace_all(&text, "<em>$1</em>")
        .into_owned()
}
