use anyhow::Result;
use colored::Colorize;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::{
    app::{load_config, ChatApp, Config},
    cli::{handle_command, Cli},
    gateway::ChatGateway,
    models::BackendFactory,
};

use super::{NonInteractiveRunner, Shell};

/// Main runtime orchestrator
pub struct Orchestrator {
    cli: Cli,
    config: Config,
}

impl Orchestrator {
    /// Create a new orchestrator from CLI args
    pub fn new(cli: Cli) -> Result<Self> {
        let mut config = match load_config(cli.config.as_deref()) {
            Ok(cfg) => cfg,
            Err(e) if cli.config.is_none() => {
                eprintln!("{} Failed to load config: {:#}. Using defaults.", "warning:".yellow(), e);
                Config::default()
            }
            Err(e) => return Err(e),
        };

        // CLI arguments override every config source
        if let Some(model) = &cli.model {
            config.gemini.model = model.clone();
        }
        if let Some(secs) = cli.timeout_secs {
            config.gemini.timeout_secs = secs;
        }

        Ok(Self { cli, config })
    }

    /// Run the orchestrator
    ///
    /// Returns `false` when a one-shot prompt failed.
    pub async fn run(self) -> Result<bool> {
        if let Some(command) = &self.cli.command {
            if handle_command(command, &self.config)? {
                return Ok(true);
            }
        }

        let backend = BackendFactory::create(&self.config)?;
        let gateway = ChatGateway::new(backend, self.config.gemini.timeout());
        let app = ChatApp::new(gateway);
        info!(model = %self.config.gemini.model, "chat client ready");

        if let Some(prompt) = self.cli.prompt.clone() {
            let mut runner = NonInteractiveRunner::new(app);
            let result = runner.execute(prompt, &CancellationToken::new()).await;
            println!(
                "{}",
                NonInteractiveRunner::format_result(&result, self.cli.output_format)
            );
            return Ok(result.is_success());
        }

        Shell::new(app, self.config).run().await?;
        Ok(true)
    }
}
