use std::path::PathBuf;
use std::sync::Arc;

use address_forecast::{
    AppConfig, ForecastResolver, MemoryCache, NominatimClient, OpenMeteoClient, logging, web,
};
use anyhow::Context;
use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "address-forecast", version, about = "Weather forecasts for free-text addresses")]
struct Cli {
    /// Path to a TOML config file (defaults to ./config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the HTTP API
    Serve,
    /// Resolve one address and print the forecast as JSON
    Forecast { address: String },
    /// Print address suggestions for a partial query
    Suggest { query: String },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = AppConfig::load_from_path(cli.config)?;
    logging::init(&config.logging)?;

    let geocoder = Arc::new(NominatimClient::new(&config.geocoding)?);
    let forecasts = Arc::new(OpenMeteoClient::new(&config.forecast)?);
    let cache = Arc::new(MemoryCache::new());
    let resolver = ForecastResolver::new(geocoder, forecasts, cache.clone());

    match cli.command {
        Command::Serve => web::run(&config.server, resolver, cache).await?,
        Command::Forecast { address } => {
            if address.trim().is_empty() {
                anyhow::bail!("Please enter a valid address");
            }
            let record = resolver.resolve(&address).await?;
            let json = serde_json::to_string_pretty(&record)
                .context("Failed to serialize forecast")?;
            println!("{json}");
        }
        Command::Suggest { query } => {
            let suggestions = resolver.suggest(&query).await;
            let json = serde_json::to_string_pretty(&suggestions)
                .context("Failed to serialize suggestions")?;
            println!("{json}");
        }
    }

    Ok(())
}
