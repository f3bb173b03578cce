use anyhow::Result;
use clap::Parser;
use contact_manager::cli::{self, Cli};
use contact_manager::{config, db};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr, stdout carries command output
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    // Load configuration
    let config = config::init()?;
    let url = match cli.database_url {
        Some(url) => url,
        None => config.database_url()?,
    };

    // Connect only; each command sets up the schema it needs
    let mut db = db::init(&url, config.connect_timeout()).await?;
    info!(dialect = ?db.dialect(), "database connection established");

    cli::report(cli::run(&mut db, cli.command).await)?;

    Ok(())
}
