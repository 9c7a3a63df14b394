use std::io::Write as _;
use std::sync::Arc;

use mentor_chat::observability::{LogConfig, init_observability};
use mentor_chat::prelude::*;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), ChatError> {
    init_observability(&LogConfig::from_env("warn"));
    let mut session = ChatSession::new(Arc::new(HttpChatTransport::from_env()?));

    let mut run = session
        .submit("Give me three questions to ask my first customers.")
        .await?;

    while let Some(event) = run.next_event().await {
        session.apply(&event)?;
        match &event {
            ChatEvent::Delta { fragment, .. } => {
                print!("{fragment}");
                let _ = std::io::stdout().flush();
            }
            ChatEvent::Finished { outcome, .. } => {
                println!();
                if let Some(notice) = outcome.notice() {
                    eprintln!("{}", notice.message);
                }
                break;
            }
            ChatEvent::StreamOpened { .. } => {}
        }
    }

    Ok(())
}
