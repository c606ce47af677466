//! Safe markdown renderer for chat messages.
//!
//! Converts untrusted text (model replies or user input) into an HTML
//! fragment built only from a small, fixed set of tags. Input is escaped
//! before any markup is produced, so raw HTML from the input never reaches
//! the output.
//!
//! # Stages
//!
//! - [`escape_html`]: neutralizes `&`, `<`, `>`, `"` and `'`.
//! - Block parser: a per-line state machine ([`BlockState`], [`classify`])
//!   producing headings, lists, fenced code and paragraphs.
//! - Inline parser: code spans, links, bold and italic within a line.
//!
//! # Example
//!
//! ```
//! use mira_markdown::Renderer;
//!
//! let html = Renderer::new().render("# Hello\n\n**Bold** text");
//! assert_eq!(html, "<h1>Hello</h1><p><strong>Bold</strong> text</p>");
//! ```

mod block;
mod escape;
mod inline;
mod renderer;

pub use block::{BlockState, LineKind, ListKind, classify};
pub use escape::escape_html;
pub use renderer::{Renderer, render};
