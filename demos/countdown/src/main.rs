//! Terminal countdown board
//!
//! Usage:
//!   EXCAVATE_RPC_URL=https://... countdown
//!
//! Prints every tier's countdown once a second until Ctrl-C. When the
//! network is unreachable the board keeps counting from the last sample.
//! Type `r` + Enter to retry the fetch now, `d` + Enter to dismiss the error.

use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use excavate_core::{ExcavateResult, SystemClock};
use excavate_runtime::{
    log_retry_result, DisplaySnapshot, Estimator, EstimatorConfig, MintAccounts,
};
use excavate_transport::{RpcClockSource, RpcConfig};

const DEFAULT_FILTER: &str = "info,excavate=debug";

#[tokio::main]
async fn main() -> ExcavateResult<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let rpc = RpcConfig::from_env()?;
    let accounts = MintAccounts::from_env()?;
    info!(url = %rpc.url, "starting countdown board");

    let source = Arc::new(RpcClockSource::new(rpc)?);
    let estimator = Estimator::start(source, Arc::new(SystemClock), EstimatorConfig::default())?;

    let mut ticker = tokio::time::interval(Duration::from_secs(1));
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut input_open = true;
    let mut prepared = false;

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("received Ctrl-C");
                break;
            }
            line = lines.next_line(), if input_open => {
                match line {
                    Ok(Some(line)) => match Command::parse(&line) {
                        Some(Command::Retry) => {
                            tokio::select! {
                                _ = tokio::signal::ctrl_c() => {
                                    info!("received Ctrl-C");
                                    break;
                                }
                                result = estimator.retry() => log_retry_result(&result),
                            }
                        }
                        Some(Command::Dismiss) => estimator.dismiss_error(),
                        None => debug!(line = line.trim(), "ignored input"),
                    },
                    Ok(None) => input_open = false,
                    Err(e) => {
                        warn!(error = %e, "stdin closed");
                        input_open = false;
                    }
                }
                continue;
            }
            _ = ticker.tick() => {}
        }

        let snapshot = estimator.snapshot();
        print_board(&snapshot);
        if snapshot.error.is_some() {
            continue;
        }

        let imminent = snapshot.board.entries().iter().any(|e| e.imminent);
        if imminent && !prepared && accounts.collection.is_some() {
            match estimator.prepare_mint(accounts.clone()) {
                Ok(intent) => {
                    let tiers: Vec<_> = intent.imminent_tiers().collect();
                    info!(asset = %intent.asset.address(), ?tiers, "mint intent ready");
                    prepared = true;
                }
                Err(e) => warn!(error = %e, "could not prepare mint"),
            }
        } else if !imminent {
            prepared = false;
        }
    }

    estimator.shutdown();
    Ok(())
}

/// Board commands read from stdin, one per line
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Command {
    Retry,
    Dismiss,
}

impl Command {
    fn parse(line: &str) -> Option<Self> {
        match line.trim() {
            "r" | "retry" => Some(Command::Retry),
            "d" | "dismiss" => Some(Command::Dismiss),
            _ => None,
        }
    }
}

fn print_board(snapshot: &DisplaySnapshot) {
    if snapshot.loading {
        println!("Loading...");
    }
    for entry in snapshot.board.entries() {
        let marker = if entry.imminent { " <<" } else { "" };
        println!(
            "{} {:<10} {:>10}{}",
            entry.tier.icon, entry.tier.name, entry.formatted, marker
        );
    }
    match &snapshot.error {
        Some(message) => println!("{message} [r] retry  [d] dismiss"),
        None if snapshot.show_last_updated() => println!("Updated {}", snapshot.last_updated),
        None => {}
    }
    println!();
}
