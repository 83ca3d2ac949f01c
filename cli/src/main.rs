// Copyright 2025 Nearcast Contributors
// SPDX-License-Identifier: Apache-2.0, MIT

use std::process::ExitCode;
use std::time::Duration;

use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::Serialize;
use stderrlog::Timestamp;
use tracing::debug;

use nearcast_provider::{
    json_rpc::Url,
    tx::{BroadcastMode as SdkBroadcastMode, TxResult},
    Error,
};
use nearcast_sdk::{
    network::{load_networks, Network as SdkNetwork, NetworkConfig, DEFAULT_NETWORKS_PATH},
    TxParams,
};

use crate::account::{handle_account, AccountArgs};
use crate::key::{handle_key, KeyArgs};
use crate::tx::{handle_tx, TxArgs};

mod account;
mod key;
mod tx;

#[derive(Clone, Debug, Parser)]
#[command(name = "nearcast", author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
    /// Network presets for RPC URLs [default: testnet].
    #[arg(short, long, env = "NEARCAST_NETWORK", value_enum)]
    network: Option<Network>,
    /// Networks file overriding the built-in presets.
    #[arg(long, env = "NEARCAST_NETWORKS_FILE", default_value = DEFAULT_NETWORKS_PATH)]
    networks_file: String,
    /// Node JSON-RPC URL.
    #[arg(long, env = "NEARCAST_RPC_URL")]
    rpc_url: Option<Url>,
    /// Timeout for a single RPC request.
    #[arg(long, env = "NEARCAST_RPC_TIMEOUT", value_parser = humantime::parse_duration)]
    rpc_timeout: Option<Duration>,
    /// Logging verbosity (repeat for more verbose logging).
    #[arg(short, long, env = "NEARCAST_LOG_VERBOSITY", action = clap::ArgAction::Count)]
    verbosity: u8,
    /// Silence logging.
    #[arg(short, long, env = "NEARCAST_LOG_QUIET", default_value_t = false)]
    quiet: bool,
}

#[derive(Clone, Debug, Subcommand)]
enum Commands {
    /// Key related commands.
    #[clap(alias = "keys")]
    Key(KeyArgs),
    /// Account related commands.
    #[clap(alias = "accounts")]
    Account(AccountArgs),
    /// Transaction related commands.
    Tx(TxArgs),
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
enum Network {
    /// Network presets for mainnet.
    Mainnet,
    /// Network presets for testnet.
    Testnet,
    /// Network presets for a local node.
    Localnet,
}

impl Network {
    pub fn get(&self) -> SdkNetwork {
        match self {
            Network::Mainnet => SdkNetwork::Mainnet,
            Network::Testnet => SdkNetwork::Testnet,
            Network::Localnet => SdkNetwork::Localnet,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
enum BroadcastMode {
    /// Return immediately after the transaction is broadcasted.
    Async,
    /// Wait for the final execution outcome before returning.
    Commit,
}

impl BroadcastMode {
    pub fn get(&self) -> SdkBroadcastMode {
        match self {
            BroadcastMode::Async => SdkBroadcastMode::Async,
            BroadcastMode::Commit => SdkBroadcastMode::Commit,
        }
    }
}

#[derive(Clone, Debug, Args)]
struct TxParamArgs {
    /// Access key nonce for the transaction. Must be above the key's current nonce.
    #[arg(long)]
    nonce: Option<u64>,
    /// Broadcast mode for the transaction.
    #[arg(short, long, value_enum, env = "NEARCAST_BROADCAST_MODE", default_value_t = BroadcastMode::Commit)]
    broadcast_mode: BroadcastMode,
}

impl TxParamArgs {
    /// Creates transaction params from tx related CLI arguments.
    pub fn to_tx_params(&self) -> TxParams {
        TxParams {
            nonce: self.nonce,
            broadcast_mode: self.broadcast_mode.get(),
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(err) = stderrlog::new()
        .modules([
            module_path!(),
            "nearcast_provider",
            "nearcast_sdk",
            "nearcast_signer",
        ])
        .quiet(cli.quiet)
        .verbosity(cli.verbosity as usize)
        .timestamp(Timestamp::Millisecond)
        .init()
    {
        eprintln!("Error: cannot initialize logging: {err}");
        return ExitCode::FAILURE;
    }

    let result = match &cli.command {
        Commands::Key(args) => handle_key(args).await,
        Commands::Account(args) => handle_account(&cli, args).await,
        Commands::Tx(args) => handle_tx(&cli, args).await,
    };
    match result {
        Ok(code) => code,
        Err(err) => {
            eprintln!("Error: {err:?}");
            ExitCode::from(error_code(&err))
        }
    }
}

/// Maps a failure to the process exit code scripts can branch on.
fn error_code(err: &anyhow::Error) -> u8 {
    match err.downcast_ref::<Error>() {
        Some(Error::Network(_)) => 2,
        Some(Error::Validation(_)) => 4,
        Some(Error::NotFound(_)) => 5,
        Some(Error::Signing(_)) => 6,
        _ => 1,
    }
}

/// Exit code for a broadcast result: on-chain rejection is reported as 3.
fn result_code<T>(res: &TxResult<T>) -> ExitCode {
    if res.is_rejected() {
        ExitCode::from(3)
    } else {
        ExitCode::SUCCESS
    }
}

/// Returns the network config for the CLI overrides, falling back to
/// `preferred` and then the default network.
fn get_network_config(cli: &Cli, preferred: Option<SdkNetwork>) -> anyhow::Result<NetworkConfig> {
    let network = cli
        .network
        .map(|n| n.get())
        .or(preferred)
        .unwrap_or_default();
    let mut specs = load_networks(&cli.networks_file)?;
    let spec = specs
        .remove(&network.to_string())
        .ok_or_else(|| anyhow::anyhow!("network '{network}' is not configured"))?;
    let mut config = spec.into_network_config()?;
    if let Some(url) = &cli.rpc_url {
        config.rpc_url = url.clone();
    }
    if let Some(timeout) = cli.rpc_timeout {
        config.rpc_timeout = timeout;
    }
    debug!(%network, rpc_url = %config.rpc_url, "using network");
    Ok(config)
}

/// Print serializable to stdout as pretty formatted JSON.
fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(&value)?;
    println!("{}", json);
    Ok(())
}
