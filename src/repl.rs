use colored::*;
use tokio::io::{AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};

use crate::error::Result;
use crate::events::{DisplayEvent, EventKind};
use crate::session::{Hub, MenuChoice, SessionState};

/// One line of terminal input
#[derive(Debug, PartialEq, Eq)]
pub enum Command {
    Choice(MenuChoice),
    Message(String),
    Quit,
    Empty,
    Unknown(String),
}

pub fn parse_command(line: &str) -> Command {
    let line = line.trim();
    if line.is_empty() {
        return Command::Empty;
    }

    match line.strip_prefix('/') {
        Some("quit") | Some("exit") => Command::Quit,
        Some(name) => match name.parse::<MenuChoice>() {
            Ok(choice) => Command::Choice(choice),
            Err(_) => Command::Unknown(name.to_string()),
        },
        None => Command::Message(line.to_string()),
    }
}

/// Render one event as terminal text
pub fn render(event: &DisplayEvent) -> String {
    let mut out = String::new();

    if let Some(author) = &event.author {
        out.push_str(&format!("{}\n", author.bold()));
    }

    let body = match event.kind {
        EventKind::Banner | EventKind::Intro | EventKind::Menu => event.content.bold().to_string(),
        EventKind::Status => event.content.dimmed().italic().to_string(),
        EventKind::Result => event.content.clone(),
        EventKind::Diagnostic => event.content.yellow().to_string(),
        EventKind::Error => event.content.red().to_string(),
        EventKind::Ready => event.content.green().to_string(),
    };
    out.push_str(&body);

    for action in &event.actions {
        out.push_str(&format!("\n  {} {}", format!("/{}", action.value).cyan(), action.label));
    }

    out
}

async fn emit<W: AsyncWrite + Unpin>(out: &mut W, events: &[DisplayEvent]) -> Result<()> {
    for event in events {
        out.write_all(render(event).as_bytes()).await?;
        out.write_all(b"\n\n").await?;
    }
    out.flush().await?;
    Ok(())
}

/// Terminal chat loop over stdin/stdout; one conversation per process
pub async fn run(hub: &Hub) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();
    let mut state = SessionState::default();

    emit(&mut stdout, &hub.start()).await?;

    while let Some(line) = lines.next_line().await? {
        let events = match parse_command(&line) {
            Command::Quit => break,
            Command::Empty => continue,
            Command::Choice(choice) => {
                let (next, events) = hub.select(state, choice);
                state = next;
                events
            }
            Command::Message(text) => {
                let (next, events) = hub.handle_user_message(state, &text).await;
                state = next;
                events
            }
            Command::Unknown(name) => vec![DisplayEvent::diagnostic(format!(
                "⚠️ Unknown command `/{name}`. Try /menu, /product, /mood, /country or /quit."
            ))],
        };
        emit(&mut stdout, &events).await?;
    }

    tracing::info!("repl: input closed, exiting");
    Ok(())
}
