//! `mira render` command implementation.

use std::io::Read;
use std::path::{Path, PathBuf};

use clap::Args;
use mira_markdown::Renderer;

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the render command.
#[derive(Args)]
pub(crate) struct RenderArgs {
    /// Markdown file to render (default: stdin, also with `-`).
    file: Option<PathBuf>,

    /// Do not open links in a new tab.
    #[arg(long)]
    no_link_target: bool,

    /// Class prefix for fenced code blocks.
    #[arg(long, default_value = "lang-")]
    code_class_prefix: String,
}

impl RenderArgs {
    /// Execute the render command.
    ///
    /// # Errors
    ///
    /// Returns an error if the input cannot be read or output cannot be written.
    pub(crate) fn execute(self, output: &Output) -> Result<(), CliError> {
        let source = read_source(self.file.as_deref())?;
        let renderer = self.renderer();
        tracing::debug!(bytes = source.len(), "Rendering markdown");
        output.result(&renderer.render(&source))?;
        Ok(())
    }

    fn renderer(&self) -> Renderer {
        Renderer::new()
            .with_link_target(!self.no_link_target)
            .with_code_class_prefix(self.code_class_prefix.as_str())
    }
}

/// Read markdown from a file, or stdin when `path` is absent or `-`.
fn read_source(path: Option<&Path>) -> Result<String, CliError> {
    match path {
        Some(path) if path != Path::new("-") => Ok(std::fs::read_to_string(path)?),
        _ => {
            let mut source = String::new();
            std::io::stdin().read_to_string(&mut source)?;
            Ok(source)
        }
    }
}
