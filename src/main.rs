//! @ai:module:intent CLI for the car KPI comparison suite
//! @ai:module:layer presentation

use anyhow::Result;
use carkpi::{
    catalog::{Catalog, EXPECTED_CARS},
    collector::Collector,
    config::KpiConfig,
    dashboard::DashboardRenderer,
    report::ReportGenerator,
    ChatClient, MockChatClient,
};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "carkpi")]
#[command(about = "Car KPI comparison suite: collect, dashboard, export")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Collect KPI values via the chat API and write the JSON files
    Collect {
        /// Run without making API calls (mocked replies)
        #[arg(long)]
        dry_run: bool,
    },

    /// Render the interactive HTML dashboard from the JSON files
    Dashboard,

    /// Export the formatted Excel report from the JSON files
    Export,

    /// Initialize default configuration
    Init {
        /// Output path for config file
        #[arg(short, long, default_value = "carkpi.toml")]
        output: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("carkpi=info".parse()?),
        )
        .init();

    let cli = Cli::parse();
    let config = load_or_default_config(cli.config)?;

    match cli.command {
        Commands::Collect { dry_run } => collect(config, dry_run).await,
        Commands::Dashboard => {
            let renderer = DashboardRenderer::new(config.paths);
            renderer.render()
        }
        Commands::Export => {
            let generator = ReportGenerator::new(config.paths);
            generator.run()
        }
        Commands::Init { output } => init_config(output),
    }
}

/// @ai:intent Run the collector with the real or mock client
/// @ai:effects network, fs:write
async fn collect(mut config: KpiConfig, dry_run: bool) -> Result<()> {
    config.run.dry_run = config.run.dry_run || dry_run;

    if config.run.dry_run {
        tracing::info!("Running in dry-run mode");
        let client = Arc::new(MockChatClient::new("42"));

        let needs_catalog = Catalog::load(&config.paths.catalog_file)
            .map(|catalog| !catalog.has_expected_cars())
            .unwrap_or(true);

        if needs_catalog {
            let placeholder = (1..=EXPECTED_CARS)
                .map(|i| format!("Placeholder Car {}", i))
                .collect::<Vec<_>>()
                .join("\n");
            client.push_response(placeholder);
        }

        Collector::new(client, config.paths).run().await
    } else {
        let client = Arc::new(ChatClient::new(config.api)?);
        Collector::new(client, config.paths).run().await
    }
}

/// @ai:intent Initialize default configuration file
/// @ai:effects fs:write
fn init_config(output: PathBuf) -> Result<()> {
    let config = KpiConfig::default();
    config.save(&output)?;
    println!("Configuration saved to {}", output.display());
    Ok(())
}

/// @ai:intent Load configuration or use defaults
/// @ai:effects fs:read
fn load_or_default_config(path: Option<PathBuf>) -> Result<KpiConfig> {
    match path {
        Some(p) => KpiConfig::load(&p),
        None => {
            let default_path = PathBuf::from("carkpi.toml");

            if default_path.exists() {
                KpiConfig::load(&default_path)
            } else {
                Ok(KpiConfig::default())
            }
        }
    }
}
