use std::io::Write as _;
use std::path::Path;
use std::sync::Arc;

use anyhow::Context as _;
use clap::Parser as _;
use mentor_chat::observability::{LogConfig, init_observability};
use mentor_chat::prelude::*;
use tokio::io::{AsyncBufReadExt as _, BufReader};
use tracing::debug;

mod config;

use config::Cli;

const QUIT: &str = "/quit";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    config::load_env();
    let cli = Cli::parse();
    init_observability(&LogConfig::from_env(&cli.log_level));

    let transport = HttpChatTransport::new(cli.client_config()?)?;
    let conversation = match &cli.history {
        Some(path) => load_history(path)?,
        None => Conversation::new(),
    };
    let mut options = ChatOptions::default();
    if let Some(timeout) = cli.reply_timeout() {
        options = options.timeout(timeout);
    }
    let mut session =
        ChatSession::with_conversation(Arc::new(transport), conversation).options(options);

    eprintln!("Ask your mentor anything. {QUIT} exits, Ctrl-C stops a reply.");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    prompt();
    while let Some(line) = lines.next_line().await? {
        let text = line.trim();
        if text == QUIT {
            break;
        }
        if text.is_empty() {
            prompt();
            continue;
        }

        let run = match session.submit(text).await {
            Ok(run) => run,
            Err(err) => {
                eprintln!("{err}");
                prompt();
                continue;
            }
        };
        let abort = run.abort_handle();
        let outcome = {
            let drive = session.drive(run, |_, event| {
                if let ChatEvent::Delta { fragment, .. } = event {
                    print!("{fragment}");
                    let _ = std::io::stdout().flush();
                }
            });
            tokio::pin!(drive);
            loop {
                tokio::select! {
                    res = &mut drive => break res?,
                    _ = tokio::signal::ctrl_c() => abort.abort(),
                }
            }
        };
        println!();
        report(&outcome);

        if let Some(path) = &cli.history {
            save_history(path, session.conversation())?;
        }
        prompt();
    }
    Ok(())
}

fn prompt() {
    print!("> ");
    let _ = std::io::stdout().flush();
}

fn report(outcome: &StreamOutcome) {
    if let Some(notice) = outcome.notice() {
        match notice.kind {
            NoticeKind::ServiceUnavailable => eprintln!("[unavailable] {}", notice.message),
            NoticeKind::Error => eprintln!("[error] {}", notice.message),
        }
    }
    match outcome {
        StreamOutcome::Cancelled => eprintln!("(reply stopped)"),
        StreamOutcome::Failed { reason } => debug!(%reason, "reply failed"),
        _ => {}
    }
}

fn load_history(path: &Path) -> anyhow::Result<Conversation> {
    if !path.exists() {
        return Ok(Conversation::new());
    }
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading history from {}", path.display()))?;
    let conversation: Conversation = serde_json::from_str(&raw)
        .with_context(|| format!("parsing history in {}", path.display()))?;
    debug!(messages = conversation.len(), "loaded conversation history");
    Ok(conversation)
}

fn save_history(path: &Path, conversation: &Conversation) -> anyhow::Result<()> {
    let raw = serde_json::to_string_pretty(conversation)?;
    std::fs::write(path, raw).with_context(|| format!("writing history to {}", path.display()))
}
