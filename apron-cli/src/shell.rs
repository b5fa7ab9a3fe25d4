use crate::cli::ShellLine;
use crate::commands::{execute, failure};
use apron_ops::{spawn_expiry_sweeper, SharedStore};
use clap::Parser;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;

/// Read commands from stdin until EOF or `exit`.
///
/// The store stays open for the whole session, so notifications raised by
/// one command expire in the background while the operator types the next.
pub async fn run(store: SharedStore, sweep_every: Duration) -> anyhow::Result<()> {
    let sweeper = spawn_expiry_sweeper(store.clone(), sweep_every);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if matches!(line, "exit" | "quit") {
            break;
        }

        let parsed = match ShellLine::try_parse_from(line.split_whitespace()) {
            Ok(parsed) => parsed,
            Err(e) => {
                eprintln!("{}", e);
                continue;
            }
        };

        let mut guard = store
            .lock()
            .map_err(|_| anyhow::anyhow!("Store lock poisoned"))?;
        match execute(&mut guard, parsed.command) {
            Ok(value) => println!("{}", serde_json::to_string_pretty(&value)?),
            Err(e) => eprintln!("{}", failure(&e)),
        }
    }

    sweeper.abort();
    info!("Shell closed");
    Ok(())
}
