use std::path::PathBuf;
use std::sync::Arc;

use alloy_primitives::Address;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use wallet_monitor::app;
use wallet_monitor::config::{default_config_path, ResolvedConfig};
use wallet_monitor::models::NetworkId;
use wallet_monitor::valuation::ValuationEngine;
use wallet_monitor::wallet::WalletSession;

#[derive(Parser)]
#[command(name = "wallet-monitor")]
#[command(about = "Multi-network wallet balance and valuation monitor")]
struct Cli {
    /// Path to config file
    #[arg(short, long, default_value_os_t = default_config_path())]
    config: PathBuf,

    /// Emit logs as JSON lines on stderr.
    #[arg(long)]
    log_json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Show current configuration
    Config,

    /// List supported networks and their assets
    Networks,

    /// Quote USD prices by price key (e.g. "ethereum", "usd-coin")
    Price {
        #[arg(required = true)]
        keys: Vec<String>,
    },

    /// Value an account's holdings on one network
    Holdings {
        #[arg(long)]
        address: Address,

        /// Chain id, decimal or 0x-prefixed hex
        #[arg(long)]
        network: NetworkId,

        /// Keep running and print every updated view until Ctrl-C
        #[arg(long)]
        watch: bool,

        #[arg(long)]
        json: bool,
    },

    /// Show block number and native balance for an account
    Status {
        #[arg(long)]
        address: Address,

        #[arg(long)]
        network: NetworkId,
    },
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_level(true);

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(layer.json())
            .init();
    } else {
        tracing_subscriber::registry().with(filter).with(layer).init();
    }
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_holdings(output: &app::HoldingsOutput, json: bool) -> Result<()> {
    if json {
        print_json(output)
    } else {
        print!("{}", app::render_holdings(output));
        Ok(())
    }
}

async fn watch_holdings(
    engine: ValuationEngine,
    config: &ResolvedConfig,
    address: Address,
    network: NetworkId,
    json: bool,
) -> Result<()> {
    let session = WalletSession::new();
    session.connect(address, network);

    let (mut views, handle) = Arc::new(engine).watch(session.subscribe());
    loop {
        tokio::select! {
            changed = views.changed() => {
                if changed.is_err() {
                    break;
                }
                let view = views.borrow_and_update().clone();
                let output = app::holdings_output(&view, Some(address), &config.display);
                print_holdings(&output, json)?;
            }
            _ = tokio::signal::ctrl_c() => {
                info!("interrupted, stopping");
                break;
            }
        }
    }

    session.disconnect();
    handle.abort();
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_json);

    let config = ResolvedConfig::load_or_default(&cli.config)?;

    match cli.command {
        Command::Config => {
            print_json(&app::config_output(&cli.config, &config))?;
        }
        Command::Networks => {
            let engine = ValuationEngine::from_config(&config)?;
            print_json(&app::list_networks(engine.registry(), &config))?;
        }
        Command::Price { keys } => {
            let engine = ValuationEngine::from_config(&config)?;
            print_json(&app::quote_prices(engine.oracle(), &keys).await)?;
        }
        Command::Holdings {
            address,
            network,
            watch,
            json,
        } => {
            let engine = ValuationEngine::from_config(&config)?;
            if watch {
                watch_holdings(engine, &config, address, network, json).await?;
            } else {
                let output = app::holdings_snapshot(
                    &engine,
                    address,
                    network,
                    &config.display,
                    config.quotes.timeout,
                )
                .await?;
                print_holdings(&output, json)?;
            }
        }
        Command::Status { address, network } => {
            let engine = ValuationEngine::from_config(&config)?;
            let status = app::network_status(
                engine.registry(),
                engine.balances(),
                address,
                network,
                config.valuation.amount_decimals,
            )
            .await;
            print_json(&status).context("Failed to render status")?;
        }
    }

    Ok(())
}
