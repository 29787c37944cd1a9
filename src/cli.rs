//! Interactive terminal chat over a single document.
//!
//! ```text
//! chat <document-path>
//! ```
//!
//! Lines starting with `/` are commands: `/action question|callback|appointment`,
//! `/reset` and `/quit`. Anything else is sent to the assistant under the
//! current action.

use anyhow::{bail, Context};
use doc_assistant::application::{AssistantReply, ReplyKind};
use doc_assistant::domain::Action;
use doc_assistant::infrastructure::{init_tracing, AppConfig, Services};
use std::io::Write;
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, BufReader};

const HELP: &str = "Commands: /action question|callback|appointment, /reset, /quit";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing("warn");

    let Some(path) = std::env::args_os().nth(1).map(PathBuf::from) else {
        bail!("usage: chat <document-path>");
    };

    let config = AppConfig::load()?;
    let services = Services::from_config(&config).await?;
    let (doc, chunks) = services
        .documents
        .ingest_file(&path)
        .await
        .with_context(|| format!("failed to load document {}", path.display()))?;

    println!("Loaded {} ({} passages).", doc.name, chunks.len());
    println!("{HELP}");

    let assistant = services.assistant;
    let conversation = assistant.start_conversation().await?;
    let id = conversation.id;
    let mut action = Action::AnswerQuestion;
    print_reply(&assistant.handle(id, action, None).await?);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("> ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        if line.trim().is_empty() {
            continue;
        }

        let result = match parse_command(line.trim()) {
            Some(Command::Quit) => break,
            Some(Command::Reset) => {
                assistant.reset(id).await?;
                action = Action::AnswerQuestion;
                println!("Conversation reset.");
                continue;
            }
            Some(Command::Select(Ok(selected))) => {
                action = selected;
                assistant.handle(id, action, None).await
            }
            Some(Command::Select(Err(e))) => {
                println!("error: {e}");
                continue;
            }
            Some(Command::Unknown) => {
                println!("{HELP}");
                continue;
            }
            None => assistant.handle(id, action, Some(&line)).await,
        };

        match result {
            Ok(reply) => {
                print_reply(&reply);
                if reply.kind == ReplyKind::Completed {
                    action = Action::AnswerQuestion;
                }
            }
            Err(e) => println!("error: {e}"),
        }
    }

    assistant.end_conversation(id).await?;
    Ok(())
}

enum Command {
    Select(Result<Action, doc_assistant::domain::DomainError>),
    Reset,
    Quit,
    Unknown,
}

fn parse_command(line: &str) -> Option<Command> {
    let rest = line.strip_prefix('/')?;
    let (name, arg) = rest.split_once(' ').unwrap_or((rest, ""));

    Some(match name {
        "action" => Command::Select(arg.parse()),
        "reset" => Command::Reset,
        "quit" | "exit" => Command::Quit,
        _ => Command::Unknown,
    })
}

fn print_reply(reply: &AssistantReply) {
    println!("{}", reply.message);
    if reply.kind == ReplyKind::Retry {
        if let Some(prompt) = &reply.prompt {
            println!("{prompt}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_commands() {
        assert!(matches!(
            parse_command("/action callback"),
            Some(Command::Select(Ok(Action::RequestCallback)))
        ));
        assert!(matches!(
            parse_command("/action dance"),
            Some(Command::Select(Err(_)))
        ));
        assert!(matches!(parse_command("/reset"), Some(Command::Reset)));
        assert!(matches!(parse_command("/quit"), Some(Command::Quit)));
        assert!(matches!(parse_command("/what"), Some(Command::Unknown)));
        assert!(parse_command("next monday").is_none());
    }
}
