use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::Parser;
use mentor_chat::{ChatClientConfig, ChatError};

/// Chat with the AI startup mentor from a terminal.
#[derive(Parser, Debug)]
#[command(name = "mentor-chat", version)]
pub struct Cli {
    /// Chat function URL. Defaults to `MENTOR_CHAT_URL`.
    #[arg(long)]
    pub endpoint: Option<String>,

    /// Timeout for a single reply, in seconds.
    #[arg(long)]
    pub timeout_secs: Option<u64>,

    /// JSON file to resume the conversation from and save it to.
    #[arg(long)]
    pub history: Option<PathBuf>,

    /// Log level used when `MENTOR_LOG_LEVEL` and `RUST_LOG` are unset.
    #[arg(long, default_value = "warn")]
    pub log_level: String,
}

/// Loads `.env` next to the crate, then from the working directory.
pub fn load_env() {
    let _ = dotenvy::from_path(Path::new(concat!(env!("CARGO_MANIFEST_DIR"), "/.env")));
    dotenvy::dotenv().ok();
}

impl Cli {
    /// Client config from the environment, with flag overrides applied.
    pub fn client_config(&self) -> Result<ChatClientConfig, ChatError> {
        let config = match &self.endpoint {
            Some(endpoint) => ChatClientConfig::new(
                endpoint.clone(),
                std::env::var("MENTOR_CHAT_API_KEY").unwrap_or_default(),
            ),
            None => ChatClientConfig::from_env()?,
        };
        Ok(config)
    }

    pub fn reply_timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}
