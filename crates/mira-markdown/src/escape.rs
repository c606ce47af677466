//! HTML escaping for untrusted text.

/// Escape HTML special characters.
///
/// Replaces `&`, `<`, `>`, `"` and `'` with named entities. Every other
/// character is copied through unchanged.
///
/// # Examples
///
/// ```
/// use mira_markdown::escape_html;
///
/// assert_eq!(escape_html("<b>Tom & Jerry</b>"), "&lt;b&gt;Tom &amp; Jerry&lt;/b&gt;");
/// ```
#[must_use]
pub fn escape_html(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            '\'' => result.push_str("&#39;"),
            _ => result.push(c),
        }
    }
    result
}
