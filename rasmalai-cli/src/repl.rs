//! Interactive chat loop

use anyhow::Result;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use rasmalai_chat::ConversationManager;
use rasmalai_core::session::{Message, Sender};
use rasmalai_core::utils::expand_tilde;
use rasmalai_providers::{GenerativeProvider, ImageAttachment};
use std::io::Write;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};

const HELP: &str = "\
Commands:
  /new            start a new chat
  /list           list saved chats
  /open <n>       open chat number n
  /delete <n>     delete chat number n
  /image <path>   attach an image to the next message (/image alone clears it)
  /help           show this help
  /quit           exit
Start a line with // to send a message that begins with /.";

/// One line of REPL input
#[derive(Debug, PartialEq, Eq)]
pub enum ReplCommand {
    Message(String),
    New,
    List,
    Open(usize),
    Delete(usize),
    Image(Option<String>),
    Help,
    Quit,
    Invalid(String),
}

impl ReplCommand {
    pub fn parse(line: &str) -> Self {
        let trimmed = line.trim();
        let Some(rest) = trimmed.strip_prefix('/') else {
            return Self::Message(line.trim_end_matches(['\r', '\n']).to_string());
        };
        // "//" sends the rest of the line as a message starting with "/"
        if rest.starts_with('/') {
            return Self::Message(rest.trim_end_matches(['\r', '\n']).to_string());
        }

        let (name, arg) = match rest.split_once(char::is_whitespace) {
            Some((name, arg)) => (name, arg.trim()),
            None => (rest, ""),
        };

        match name {
            "new" => Self::New,
            "list" | "ls" => Self::List,
            "open" => parse_index(arg).map_or_else(|| usage("/open <n>"), Self::Open),
            "delete" | "rm" => parse_index(arg).map_or_else(|| usage("/delete <n>"), Self::Delete),
            "image" => Self::Image((!arg.is_empty()).then(|| arg.to_string())),
            "help" | "?" => Self::Help,
            "quit" | "exit" | "q" => Self::Quit,
            other => Self::Invalid(format!("Unknown command /{}. Try /help", other)),
        }
    }
}

fn parse_index(arg: &str) -> Option<usize> {
    arg.parse::<usize>().ok().filter(|n| *n > 0)
}

fn usage(form: &str) -> ReplCommand {
    ReplCommand::Invalid(format!("Usage: {}", form))
}

/// Id of the session shown as number `n` (1-based) in the list
pub fn session_id_at(manager: &ConversationManager, n: usize) -> Option<String> {
    n.checked_sub(1)
        .and_then(|i| manager.history().at(i))
        .map(|s| s.id.clone())
}

pub fn print_message(message: &Message) {
    let label = match message.sender {
        Sender::User => style("You").green().bold(),
        Sender::Ai => style("Rasmalai").magenta().bold(),
    };
    if let Some(image) = &message.image_ref {
        println!("{} {}", label, style(format!("[image: {}]", image)).dim());
    }
    if !message.text.trim().is_empty() {
        println!("{}: {}", label, message.text);
    }
}

pub fn print_transcript(manager: &ConversationManager) {
    println!("\n{}", style(manager.current_title()).bold().cyan());
    for message in manager.current_messages() {
        print_message(message);
    }
}

pub fn print_sessions(manager: &ConversationManager) {
    if manager.history().is_empty() {
        println!("{}", style("No chats yet").dim());
        return;
    }
    for (i, session) in manager.history().iter().enumerate() {
        let marker = if manager.active_session_id() == Some(session.id.as_str()) {
            "*"
        } else {
            " "
        };
        println!(
            "{}{:>3}. {}  {}",
            marker,
            i + 1,
            session.title,
            style(&session.created_at).dim()
        );
    }
}

fn thinking_spinner() -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    if let Ok(template) = ProgressStyle::with_template("{spinner} {msg}") {
        spinner.set_style(template);
    }
    spinner.set_message("thinking...");
    spinner.enable_steady_tick(Duration::from_millis(120));
    spinner
}

/// Send one turn and print the reply
pub async fn send_and_render(
    manager: &mut ConversationManager,
    provider: &dyn GenerativeProvider,
    text: &str,
    image: Option<ImageAttachment>,
) -> bool {
    let Some(turn) = manager.begin_send(text, image) else {
        return false;
    };

    let spinner = thinking_spinner();
    let result = turn.dispatch(provider).await;
    spinner.finish_and_clear();

    if let Some(reply) = manager.complete_send(turn, result) {
        print_message(&reply);
    }
    true
}

/// Run the interactive loop until /quit or end of input
pub async fn run(manager: &mut ConversationManager, provider: &dyn GenerativeProvider) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut attachment: Option<ImageAttachment> = None;

    print_transcript(manager);
    println!("{}", style("Type /help for commands.").dim());

    loop {
        match &attachment {
            Some(image) => print!("{} > ", style(format!("[{}]", image.preview)).dim()),
            None => print!("> "),
        }
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            println!();
            break;
        };

        match ReplCommand::parse(&line) {
            ReplCommand::Message(text) => {
                let image = attachment.take();
                if !send_and_render(manager, provider, &text, image.clone()).await {
                    attachment = image;
                }
            }
            ReplCommand::New => {
                attachment = None;
                manager.start_new_chat();
                print_transcript(manager);
            }
            ReplCommand::List => print_sessions(manager),
            ReplCommand::Open(n) => match session_id_at(manager, n) {
                Some(id) => {
                    manager.select_session(&id);
                    print_transcript(manager);
                }
                None => println!("{}", style(format!("No chat number {}", n)).yellow()),
            },
            ReplCommand::Delete(n) => match session_id_at(manager, n) {
                Some(id) => {
                    let was_active = manager.active_session_id() == Some(id.as_str());
                    manager.delete_session(&id);
                    println!("{}", style(format!("Deleted chat {}", n)).dim());
                    if was_active {
                        print_transcript(manager);
                    }
                }
                None => println!("{}", style(format!("No chat number {}", n)).yellow()),
            },
            ReplCommand::Image(path) => {
                let candidate = path.map(|p| ImageAttachment::from_path(expand_tilde(&p)));
                attachment = match candidate {
                    Some(image) => match image.mime_type() {
                        Ok(_) => Some(image),
                        Err(e) => {
                            println!("{}", style(e.to_string()).yellow());
                            None
                        }
                    },
                    None => None,
                };
            }
            ReplCommand::Help => println!("{}", HELP),
            ReplCommand::Quit => break,
            ReplCommand::Invalid(msg) => println!("{}", style(msg).yellow()),
        }
    }

    Ok(())
}
