use apron_cli::cli::{Cli, Command};
use apron_cli::{bootstrap, commands, shell};
use apron_store::app_config::Config;
use clap::Parser;
use std::process::ExitCode;
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    let config = Config::load()?;
    bootstrap::init_tracing(&config.logging);

    tracing::debug!("Storage backend {:?}", config.storage.backend);
    let mut store = bootstrap::open_store(&config)?;

    if let Command::Shell = cli.command {
        let sweep_every = Duration::from_millis(config.notifications.sweep_interval_ms);
        shell::run(Arc::new(Mutex::new(store)), sweep_every).await?;
        return Ok(ExitCode::SUCCESS);
    }

    let outcome = commands::execute(&mut store, cli.command);
    if let Some(err) = store.last_persistence_error() {
        tracing::warn!("Last write did not reach storage: {}", err);
    }

    match outcome {
        Ok(value) => {
            println!("{}", serde_json::to_string_pretty(&value)?);
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            eprintln!("{}", serde_json::to_string_pretty(&commands::failure(&e))?);
            Ok(ExitCode::FAILURE)
        }
    }
}
