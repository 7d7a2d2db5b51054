use clap::{Parser, Subcommand};
use std::path::Path;

use anonymizer_bot::application::errors::BotError;
use anonymizer_bot::domain::entities::setting_definitions;
use anonymizer_bot::infrastructure::adapters::ConsoleAdapter;
use anonymizer_bot::infrastructure::config::Config;

#[derive(Parser)]
#[command(name = "anonymizer-bot")]
#[command(about = "Relays direct messages from room members anonymously into a post room", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file path
    #[arg(short, long, default_value = "config.yaml")]
    config: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the bot against the console dev host
    Run,
    /// Show version
    Version,
    /// Generate default config
    InitConfig,
    /// List the settings the bot registers
    Settings,
}

fn main() {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_target(false)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run => run_bot(&cli.config),
        Commands::Version => {
            println!("anonymizer-bot v{}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        Commands::InitConfig => init_config(&cli.config),
        Commands::Settings => {
            list_settings();
            Ok(())
        }
    };

    if let Err(e) = result {
        tracing::error!("{}", e);
        std::process::exit(1);
    }
}

fn load_config(config_path: &str) -> Config {
    if !Path::new(config_path).exists() {
        return Config::load_env();
    }

    match Config::load(config_path) {
        Ok(mut config) => {
            config.apply_env();
            config
        }
        Err(e) => {
            tracing::warn!("Failed to load config: {}, using defaults", e);
            Config::load_env()
        }
    }
}

fn run_bot(config_path: &str) -> Result<(), BotError> {
    let config = load_config(config_path);
    tracing::info!("Starting {}", config.bot.name);

    if !config.adapters.console.as_ref().is_some_and(|c| c.enabled) {
        tracing::warn!("Console adapter disabled in config, nothing to run");
        return Ok(());
    }

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async {
        let adapter = ConsoleAdapter::from_config(&config).await;
        adapter.run().await
    })
}

fn init_config(config_path: &str) -> Result<(), BotError> {
    if Path::new(config_path).exists() {
        println!("{} already exists, not overwriting", config_path);
        return Ok(());
    }

    let yaml = Config::default().to_yaml()?;
    std::fs::write(config_path, yaml)?;
    println!("Wrote default config to {}", config_path);
    Ok(())
}

fn list_settings() {
    for def in setting_definitions() {
        let required = if def.required { "required" } else { "optional" };
        let default = def.default.as_deref().unwrap_or("-");
        println!("{:<18} {:<8} default: {:<22} {}", def.id.key(), required, default, def.label);
        if let Some(desc) = &def.description {
            println!("{:<18} {}", "", desc);
        }
    }
}
