use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "veda")]
#[command(version)]
#[command(about = "A terminal chat client for the Gemini API", long_about = None)]
pub struct Cli {
    /// Model to use (e.g., gemini-2.5-flash)
    #[arg(short, long)]
    pub model: Option<String>,

    /// Path to configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Seconds to wait for a reply before giving up
    #[arg(long)]
    pub timeout_secs: Option<u64>,

    /// Non-interactive prompt to execute
    #[arg(short, long)]
    pub prompt: Option<String>,

    /// Output format for non-interactive mode
    #[arg(long, value_enum, default_value_t = OutputFormat::Text, requires = "prompt")]
    pub output_format: OutputFormat,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize configuration
    Init,
    /// Start a chat session (default)
    Chat,
    /// Show version information
    Version,
    /// Check configuration and credentials
    Status,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Plain text output
    Text,
    /// JSON structured output
    Json,
    /// Markdown formatted output
    Markdown,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_with_format() {
        let cli = Cli::try_parse_from(["veda", "-p", "Hello", "--output-format", "json"]).unwrap();
        assert_eq!(cli.prompt.as_deref(), Some("Hello"));
        assert!(matches!(cli.output_format, OutputFormat::Json));
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_output_format_requires_prompt() {
        assert!(Cli::try_parse_from(["veda", "--output-format", "json"]).is_err());
    }

    #[test]
    fn test_subcommand_and_overrides() {
        let cli = Cli::try_parse_from(["veda", "-m", "gemini-1.5-pro", "--timeout-secs", "5", "status"])
            .unwrap();
        assert_eq!(cli.model.as_deref(), Some("gemini-1.5-pro"));
        assert_eq!(cli.timeout_secs, Some(5));
        assert!(matches!(cli.command, Some(Commands::Status)));
    }
}
