//! `mira request` command implementation.

use std::path::PathBuf;

use clap::Args;
use mira_chat::{ChatMessage, ChatRequest, Conversation};
use mira_config::{CliSettings, Config};

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the request command.
#[derive(Args)]
pub(crate) struct RequestArgs {
    /// User message to send.
    message: String,

    /// Path to configuration file (default: auto-discover mira.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Model identifier (overrides config).
    #[arg(long, env = "MIRA_MODEL")]
    model: Option<String>,

    /// Chat-completion endpoint (overrides config).
    #[arg(long)]
    endpoint: Option<String>,

    /// Also print request headers to stderr (authorization redacted).
    #[arg(long)]
    headers: bool,
}

impl RequestArgs {
    /// Execute the request command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration fails, the message is empty, or
    /// the body cannot be serialized.
    pub(crate) fn execute(self, output: &Output) -> Result<(), CliError> {
        let cli_settings = CliSettings {
            model: self.model,
            endpoint: self.endpoint,
        };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;
        if let Some(path) = &config.config_path {
            output.note(&format!("Using {}", path.display()));
        }

        let request = build_request(&config, &self.message)?;
        if request.instructions_truncated {
            output.note("Embedded instructions were truncated.");
        }
        if self.headers {
            output.note(&format!("POST {}", request.endpoint));
            for (name, value) in &request.headers {
                let shown = if name.eq_ignore_ascii_case("authorization") {
                    "Bearer <redacted>"
                } else {
                    value.as_str()
                };
                output.note(&format!("{name}: {shown}"));
            }
        }

        output.result(&request.body_json()?)?;
        Ok(())
    }
}

/// Build the request a fresh conversation would send for `message`.
fn build_request(config: &Config, message: &str) -> Result<ChatRequest, CliError> {
    let message = message.trim();
    if message.is_empty() {
        return Err(CliError::Validation("message cannot be empty".to_owned()));
    }

    let mut conversation = Conversation::new();
    if let Some(greeting) = config.assistant.greeting.as_deref().filter(|g| !g.is_empty()) {
        conversation.push(ChatMessage::assistant(greeting));
    }
    conversation.push(ChatMessage::user(message));

    Ok(ChatRequest::build(
        &config.assistant,
        &config.provider,
        &conversation,
    ))
}
