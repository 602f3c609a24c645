use anyhow::Result;
use colored::Colorize;
use std::path::PathBuf;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio_util::sync::CancellationToken;
use tracing::warn;

use crate::{
    app::{ChatApp, Config, SubmitOutcome},
    attachments::{FileAttachment, ImageAttachment, InputSource, TranslateTemplate, VoiceRecorder},
    models::{ChatMessage, MessageRole},
};

/// A parsed line of shell input
#[derive(Debug, Clone, PartialEq)]
pub enum ShellCommand {
    /// Plain text for the model
    Send(String),
    New,
    History,
    Load(usize),
    ClearHistory,
    File(PathBuf),
    Image(PathBuf),
    Voice,
    Translate(Option<String>),
    Help,
    Quit,
    Unknown(String),
}

impl ShellCommand {
    pub fn parse(line: &str) -> Self {
        let trimmed = line.trim();
        let Some(rest) = trimmed.strip_prefix('/') else {
            return ShellCommand::Send(line.to_string());
        };

        let (name, arg) = match rest.split_once(char::is_whitespace) {
            Some((name, arg)) => (name, arg.trim()),
            None => (rest, ""),
        };

        match name {
            "new" | "clear" => ShellCommand::New,
            "history" => ShellCommand::History,
            "load" => match arg.parse::<usize>() {
                Ok(n) if n > 0 => ShellCommand::Load(n),
                _ => ShellCommand::Unknown(format!("/load expects a session number, got '{}'", arg)),
            },
            "clear-history" => ShellCommand::ClearHistory,
            "file" if !arg.is_empty() => ShellCommand::File(PathBuf::from(arg)),
            "image" if !arg.is_empty() => ShellCommand::Image(PathBuf::from(arg)),
            "file" | "image" => ShellCommand::Unknown(format!("/{} expects a path", name)),
            "voice" => ShellCommand::Voice,
            "translate" => {
                ShellCommand::Translate((!arg.is_empty()).then(|| arg.to_string()))
            }
            "help" | "?" => ShellCommand::Help,
            "quit" | "exit" | "q" => ShellCommand::Quit,
            other => ShellCommand::Unknown(format!("unknown command /{}", other)),
        }
    }
}

/// Combine a pending fragment with the line the user typed after it
pub fn compose_message(pending: Option<&str>, line: &str) -> String {
    let line = line.trim();
    match pending {
        None => line.to_string(),
        Some(fragment) if line.is_empty() => fragment.trim().to_string(),
        Some(fragment) if fragment.ends_with(char::is_whitespace) => {
            format!("{}{}", fragment, line)
        }
        Some(fragment) => format!("{} {}", fragment, line),
    }
}

const HELP: &str = "\
Commands:
  /new, /clear        start a new chat
  /history            list past chats
  /load <n>           reopen chat number <n> from /history
  /clear-history      forget all past chats
  /file <path>        ask about a file
  /image <path>       ask about an image
  /voice              record a voice message
  /translate [lang]   start a translation request
  /help               show this help
  /quit               exit";

/// Line-oriented interactive chat shell
pub struct Shell {
    app: ChatApp,
    config: Config,
    user_label: String,
    pending: Option<String>,
}

impl Shell {
    pub fn new(app: ChatApp, config: Config) -> Self {
        let user_label = speaker_label(config.ui.user_name.as_deref());
        Self {
            app,
            config,
            user_label,
            pending: None,
        }
    }

    pub async fn run(mut self) -> Result<()> {
        println!(
            "{} {}",
            "Hi! How can I help you?".bold(),
            format!("({})", self.app.gateway().model_name()).dimmed()
        );
        println!("{}", "Type /help for commands.".dimmed());

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            self.prompt();

            let line = tokio::select! {
                line = lines.next_line() => line?,
                _ = tokio::signal::ctrl_c() => None,
            };
            let Some(line) = line else {
                println!();
                break;
            };

            match ShellCommand::parse(&line) {
                ShellCommand::Quit => break,
                command => self.dispatch(command).await,
            }
        }

        Ok(())
    }

    fn prompt(&self) {
        use std::io::Write;

        if let Some(pending) = &self.pending {
            println!("{} {}", "pending:".yellow(), pending);
        }
        print!("{} ", self.user_label.cyan().bold());
        let _ = std::io::stdout().flush();
    }

    async fn dispatch(&mut self, command: ShellCommand) {
        match command {
            ShellCommand::Send(line) => {
                let text = compose_message(self.pending.as_deref(), &line);
                if text.is_empty() {
                    return;
                }
                self.pending = None;
                self.send(&text).await;
            }
            ShellCommand::New => {
                self.app.new_chat().await;
                self.pending = None;
                self.notify("Started a new chat");
            }
            ShellCommand::History => self.print_history(),
            ShellCommand::Load(n) => self.load(n).await,
            ShellCommand::ClearHistory => {
                self.app.clear_history().await;
                self.pending = None;
                self.notify("Chat history cleared");
            }
            ShellCommand::File(path) => self.attach(&FileAttachment::new(path)).await,
            ShellCommand::Image(path) => self.attach(&ImageAttachment::new(path)).await,
            ShellCommand::Voice => {
                println!("{}", "Recording...".yellow());
                let recorder =
                    VoiceRecorder::new(Duration::from_millis(self.config.ui.voice_duration_ms));
                self.attach(&recorder).await;
            }
            ShellCommand::Translate(language) => {
                let language = language.unwrap_or_else(|| self.config.ui.language.clone());
                self.attach(&TranslateTemplate::new(language)).await;
            }
            ShellCommand::Help => println!("{}", HELP),
            ShellCommand::Unknown(message) => println!("{}", message.red()),
            ShellCommand::Quit => {}
        }
    }

    async fn send(&mut self, text: &str) {
        println!("{}", "Thinking... (Ctrl-C to cancel)".dimmed());

        let cancel = CancellationToken::new();
        let watcher = {
            let cancel = cancel.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    cancel.cancel();
                }
            })
        };

        let outcome = self.app.submit(text, &cancel).await;
        watcher.abort();

        match outcome {
            SubmitOutcome::Ignored => {}
            SubmitOutcome::Replied { reply, archived } => {
                print_message(&self.user_label, &ChatMessage::assistant(reply));
                if archived.is_some() {
                    self.notify("Saved to chat history");
                }
            }
            SubmitOutcome::Failed(error) => {
                println!("{} {}", "veda>".red().bold(), error.user_message().red());
            }
        }
    }

    async fn attach(&mut self, source: &dyn InputSource) {
        match source.produce().await {
            Ok(fragment) => {
                self.pending = Some(fragment.text);
                self.notify(&fragment.notification);
            }
            Err(e) => {
                warn!(source = source.label(), error = %e, "input source failed");
                println!("{}", e.to_string().red());
            }
        }
    }

    async fn load(&mut self, n: usize) {
        let Some(id) = self.app.sessions().get(n - 1).map(|s| s.id) else {
            println!("{}", format!("No chat number {} in history", n).red());
            return;
        };

        match self.app.load_session(id).await {
            Ok(messages) => {
                println!("{}", "--- loaded chat ---".dimmed());
                for message in messages {
                    print_message(&self.user_label, message);
                }
                self.pending = None;
            }
            Err(e) => println!("{}", e.to_string().red()),
        }
    }

    fn print_history(&self) {
        let sessions = self.app.sessions();
        if sessions.is_empty() {
            println!("{}", "No chats yet.".dimmed());
            return;
        }

        let current = self.app.current_session_id();
        for (i, session) in sessions.iter().enumerate() {
            let marker = if Some(session.id) == current { "*" } else { " " };
            println!("{} {:>2}. {}", marker, i + 1, session.summary());
        }
    }

    fn notify(&self, message: &str) {
        if self.config.ui.notifications {
            println!("{}", message.dimmed());
        }
    }
}

/// Prompt label for the user's own lines
pub fn speaker_label(user_name: Option<&str>) -> String {
    match user_name.map(str::trim) {
        Some(name) if !name.is_empty() => format!("{}>", name),
        _ => "you>".to_string(),
    }
}

fn print_message(user_label: &str, message: &ChatMessage) {
    match message.role {
        MessageRole::User => println!("{} {}", user_label.cyan().bold(), message.content),
        MessageRole::Assistant => println!("{} {}", "veda>".green().bold(), message.content),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_plain_text_is_sent_verbatim() {
        assert_eq!(
            ShellCommand::parse("what is rust?"),
            ShellCommand::Send("what is rust?".to_string())
        );
    }

    #[test]
    fn test_commands_with_arguments() {
        assert_eq!(ShellCommand::parse("/load 2"), ShellCommand::Load(2));
        assert_eq!(
            ShellCommand::parse("/file  ./report.pdf "),
            ShellCommand::File(PathBuf::from("./report.pdf"))
        );
        assert_eq!(
            ShellCommand::parse("/translate French"),
            ShellCommand::Translate(Some("French".to_string()))
        );
        assert_eq!(ShellCommand::parse("/translate"), ShellCommand::Translate(None));
        assert_eq!(ShellCommand::parse("/clear"), ShellCommand::New);
        assert_eq!(ShellCommand::parse("/exit"), ShellCommand::Quit);
    }

    #[test]
    fn test_bad_commands_are_reported() {
        assert!(matches!(ShellCommand::parse("/load zero"), ShellCommand::Unknown(_)));
        assert!(matches!(ShellCommand::parse("/load 0"), ShellCommand::Unknown(_)));
        assert!(matches!(ShellCommand::parse("/file"), ShellCommand::Unknown(_)));
        assert!(matches!(ShellCommand::parse("/dance"), ShellCommand::Unknown(_)));
    }

    #[test]
    fn test_speaker_label_uses_configured_name() {
        assert_eq!(speaker_label(None), "you>");
        assert_eq!(speaker_label(Some("   ")), "you>");
        assert_eq!(speaker_label(Some(" Ada ")), "Ada>");
    }

    #[test]
    fn test_compose_with_pending_fragment() {
        assert_eq!(compose_message(None, "  hi  "), "hi");
        assert_eq!(
            compose_message(Some("Translate this text to Spanish: "), "good morning"),
            "Translate this text to Spanish: good morning"
        );
        assert_eq!(
            compose_message(Some("Analyze this file: a.txt (1.00 KB)"), "summarize it"),
            "Analyze this file: a.txt (1.00 KB) summarize it"
        );
        assert_eq!(
            compose_message(Some("Analyze this image: cat.png"), ""),
            "Analyze this image: cat.png"
        );
    }
}
