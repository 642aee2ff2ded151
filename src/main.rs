mod dialogue;
mod gateway;
mod texts;

use agenda_channels::WhatsAppChannel;
use agenda_core::config;
use agenda_memory::Store;
use agenda_oracle::OracleClient;
use clap::{Parser, Subcommand};
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "agenda", version, about = "Agenda — WhatsApp appointment assistant")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to config file.
    #[arg(short, long, default_value = "config.toml")]
    config: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the assistant.
    Start,
    /// Check configuration and oracle availability.
    Status,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let cfg = config::load(&cli.config)?;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cfg.agenda.log_level)),
        )
        .init();

    match cli.command {
        Commands::Start => {
            let mut channels: HashMap<String, Arc<dyn agenda_core::traits::Channel>> =
                HashMap::new();

            if cfg.whatsapp.enabled {
                if cfg.whatsapp.verify_token.is_empty() || cfg.whatsapp.access_token.is_empty() {
                    anyhow::bail!(
                        "WhatsApp is enabled but verify_token/access_token are empty. \
                         Set them in config.toml."
                    );
                }
                let channel = WhatsAppChannel::new(cfg.whatsapp.clone());
                channels.insert("whatsapp".to_string(), Arc::new(channel));
            }

            if channels.is_empty() {
                anyhow::bail!("No channels enabled. Enable at least one channel in config.toml.");
            }

            let store = Store::new(&cfg.memory).await?;
            let oracle = OracleClient::from_config(&cfg.oracle);

            println!("Agenda — starting assistant...");
            let store = Arc::new(store);
            let gw = Arc::new(gateway::Gateway::new(
                channels,
                store.clone(),
                store,
                Arc::new(oracle),
                cfg.oracle.history_turns,
            ));
            gw.run().await?;
        }
        Commands::Status => {
            println!("Agenda — Status Check\n");
            println!("Config: {}", cli.config);
            println!("Database: {}", cfg.memory.db_path);
            println!();

            let oracle = OracleClient::from_config(&cfg.oracle);
            println!(
                "  oracle ({}): {}",
                cfg.oracle.model,
                if oracle.is_available().await {
                    "available"
                } else {
                    "unreachable"
                }
            );

            println!(
                "  whatsapp: {}",
                if !cfg.whatsapp.enabled {
                    "disabled"
                } else if cfg.whatsapp.verify_token.is_empty()
                    || cfg.whatsapp.access_token.is_empty()
                {
                    "enabled but missing tokens"
                } else {
                    "configured"
                }
            );
        }
    }

    Ok(())
}
