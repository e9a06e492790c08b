use std::process::ExitCode;
use std::time::Instant;

use anyhow::Result;
use clap::{Parser, Subcommand};
use feedloader::config::AppConfig;
use feedloader::{pipeline, IngestError};

#[derive(Parser)]
#[command(name = "feedloader", about = "Load an HTTP API feed into PostgreSQL")]
struct Cli {
    /// Optional config file, overridden by environment variables
    #[arg(long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create the staging and curated tables from the API schema
    CreateTables,
    /// Ingest every page of the API into the curated table
    Ingest,
}

async fn run(cli: Cli) -> Result<()> {
    let now = Instant::now();

    let config = AppConfig::load(cli.config.as_deref())?;
    tracing::info!("Configuration loaded for table '{}'", config.table.name);

    match cli.command {
        Command::CreateTables => pipeline::create_tables(&config).await?,
        Command::Ingest => {
            pipeline::ingest(&config).await?;
        }
    }

    tracing::info!("Done in {}ms", now.elapsed().as_millis());
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{:#}", e);
            let code = e
                .downcast_ref::<IngestError>()
                .map(IngestError::exit_code)
                .unwrap_or(2);
            ExitCode::from(code)
        }
    }
}
