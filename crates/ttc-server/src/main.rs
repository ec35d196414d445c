//! `ttc-server` binary entry point

use anyhow::Context;
use ttc_server::cli::{self, CliCommand};
use ttc_server::{logging, ServiceConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = cli::parse();
    let config = ServiceConfig::load(&cli.overrides).context("loading configuration")?;

    if cli.command == CliCommand::CheckConfig {
        print!("{}", toml::to_string_pretty(&config.redacted())?);
        return Ok(());
    }

    logging::init(&config.log).context("installing log subscriber")?;
    tracing::info!("ttc-server {}", ttc_server::VERSION);

    match cli.command {
        CliCommand::Seed => {
            let inserted = ttc_server::seed(&config).await?;
            println!("Seeded {inserted} charities");
        }
        CliCommand::Serve | CliCommand::CheckConfig => {
            ttc_server::run(&config, async {
                if let Err(e) = tokio::signal::ctrl_c().await {
                    tracing::error!("Failed to listen for shutdown signal: {}", e);
                    std::future::pending::<()>().await;
                }
                tracing::info!("Shutdown signal received");
            })
            .await?;
        }
    }
    Ok(())
}
