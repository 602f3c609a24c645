/// Runtime orchestrator module - Gateway

mod non_interactive;
mod orchestrator;
mod shell;

pub use non_interactive::{NonInteractiveResult, NonInteractiveRunner};
pub use orchestrator::Orchestrator;
pub use shell::{compose_message, speaker_label, Shell, ShellCommand};
