use anyhow::Result;
use colored::Colorize;

use crate::{
    app::{get_config_dir, init_config, Config},
    models::BackendFactory,
};

use super::Commands;

/// Handle CLI subcommands
///
/// Returns `true` when the command was fully handled and the process should
/// exit instead of opening the chat shell.
pub fn handle_command(command: &Commands, config: &Config) -> Result<bool> {
    match command {
        Commands::Init => {
            println!("Initializing Veda configuration...");
            match init_config()? {
                Some(path) => println!("Created default configuration at: {}", path.display()),
                None => println!("Configuration already exists, leaving it untouched."),
            }
            Ok(true)
        }
        Commands::Version => {
            show_version();
            Ok(true)
        }
        Commands::Status => {
            show_status(config)?;
            Ok(true)
        }
        Commands::Chat => Ok(false),
    }
}

/// Show version information
pub fn show_version() {
    println!("Veda v{}", env!("CARGO_PKG_VERSION"));
    println!("   A terminal chat client for the Gemini API");
}

/// Show configuration and credential status
fn show_status(config: &Config) -> Result<()> {
    println!("Veda Status:");
    println!();

    let config_path = get_config_dir()?.join("config.toml");
    if config_path.exists() {
        println!("  [OK] Configuration: {}", config_path.display());
    } else {
        println!("  [WARNING] Configuration: Not found (using defaults)");
    }

    println!("  [OK] Model: {}", config.gemini.model.green());
    println!("  [OK] Endpoint: {}", config.gemini.base_url);

    if BackendFactory::has_credential(config) {
        println!("  [OK] API key: Set");
    } else {
        println!(
            "  [ERROR] API key: Not set (export {} or set gemini.api_key)",
            config.gemini.api_key_env
        );
    }

    println!();
    Ok(())
}
