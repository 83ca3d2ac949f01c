// Copyright 2025 Nearcast Contributors
// SPDX-License-Identifier: Apache-2.0, MIT

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{error::ErrorKind, Args, CommandFactory, Subcommand};
use serde_json::Value;

use nearcast_provider::{
    message::AccessKey,
    types::{AccountId, CryptoHash, PublicKey},
    util::{parse_account_id, parse_gas, parse_near_amount, parse_public_key},
};
use nearcast_sdk::{
    config::TxConfig,
    tx::{CallOptions, Tx, DEFAULT_CALL_GAS},
};
use nearcast_signer::{
    key::{parse_secret_key, SecretKey},
    Wallet,
};

use crate::{get_network_config, print_json, result_code, Cli, TxParamArgs};

#[derive(Clone, Debug, Args)]
pub struct TxArgs {
    #[command(subcommand)]
    command: TxCommands,
}

#[derive(Clone, Debug, Subcommand)]
enum TxCommands {
    /// Call a contract method.
    Call(CallArgs),
    /// Transfer NEAR to another account.
    Transfer(TransferArgs),
    /// Add an access key to the signer account.
    AddKey(AddKeyArgs),
    /// Delete an access key from the signer account.
    DeleteKey(DeleteKeyArgs),
    /// Send the transaction described in a TOML file.
    Send(SendArgs),
    /// Get the outcome of a transaction.
    Status(StatusArgs),
}

#[derive(Clone, Debug, Args)]
struct SignerArgs {
    /// Account that signs and pays for the transaction.
    #[arg(short, long, env = "NEARCAST_SIGNER", value_parser = parse_account_id)]
    signer: AccountId,
    /// Ed25519 private key of one of the signer's access keys.
    #[arg(short, long, env = "NEARCAST_PRIVATE_KEY", value_parser = parse_secret_key, hide_env_values = true)]
    private_key: SecretKey,
}

impl SignerArgs {
    fn wallet(&self) -> Wallet {
        Wallet::new_ed25519(self.private_key.clone(), self.signer.clone())
    }
}

#[derive(Clone, Debug, Args)]
struct CallArgs {
    /// Contract account.
    #[arg(value_parser = parse_account_id)]
    receiver: AccountId,
    /// Method to call.
    method: String,
    /// JSON arguments.
    #[arg(long, value_parser = parse_json, default_value = "{}")]
    args: Value,
    /// Prepaid gas, raw or with a Tgas suffix [default: 30 Tgas].
    #[arg(long, value_parser = parse_gas)]
    gas: Option<u64>,
    /// Attached deposit in NEAR, or yoctoNEAR with a `yocto` suffix.
    #[arg(long, value_parser = parse_near_amount, default_value = "0")]
    deposit: u128,
    #[command(flatten)]
    signer: SignerArgs,
    #[command(flatten)]
    tx_args: TxParamArgs,
}

#[derive(Clone, Debug, Args)]
struct TransferArgs {
    /// The recipient account.
    #[arg(value_parser = parse_account_id)]
    receiver: AccountId,
    /// The amount to transfer in NEAR, or yoctoNEAR with a `yocto` suffix.
    #[arg(value_parser = parse_near_amount)]
    amount: u128,
    #[command(flatten)]
    signer: SignerArgs,
    #[command(flatten)]
    tx_args: TxParamArgs,
}

#[derive(Clone, Debug, Args)]
struct AddKeyArgs {
    /// The public key to add.
    #[arg(value_parser = parse_public_key)]
    public_key: PublicKey,
    /// Contract the key is allowed to call.
    #[arg(long, value_parser = parse_account_id)]
    receiver: Option<AccountId>,
    /// Methods the key is allowed to call (all methods if empty).
    #[arg(long, value_delimiter = ',', requires = "receiver")]
    method_names: Vec<String>,
    /// Amount of NEAR the key may spend on gas.
    #[arg(long, value_parser = parse_near_amount, requires = "receiver")]
    allowance: Option<u128>,
    /// Add a full access key.
    #[arg(long, conflicts_with = "receiver")]
    full_access: bool,
    #[command(flatten)]
    signer: SignerArgs,
    #[command(flatten)]
    tx_args: TxParamArgs,
}

#[derive(Clone, Debug, Args)]
struct DeleteKeyArgs {
    /// The public key to delete.
    #[arg(value_parser = parse_public_key)]
    public_key: PublicKey,
    #[command(flatten)]
    signer: SignerArgs,
    #[command(flatten)]
    tx_args: TxParamArgs,
}

#[derive(Clone, Debug, Args)]
struct SendArgs {
    /// Path to the transaction file.
    path: PathBuf,
    /// Ed25519 private key of one of the signer's access keys.
    #[arg(short, long, env = "NEARCAST_PRIVATE_KEY", value_parser = parse_secret_key, hide_env_values = true)]
    private_key: SecretKey,
    #[command(flatten)]
    tx_args: TxParamArgs,
}

#[derive(Clone, Debug, Args)]
struct StatusArgs {
    /// Transaction hash.
    hash: CryptoHash,
    /// Account that signed the transaction.
    #[arg(long, value_parser = parse_account_id)]
    sender: AccountId,
}

fn parse_json(s: &str) -> Result<Value, serde_json::Error> {
    serde_json::from_str(s)
}

/// Transaction commands handler.
pub async fn handle_tx(cli: &Cli, args: &TxArgs) -> anyhow::Result<ExitCode> {
    match &args.command {
        TxCommands::Call(args) => {
            let provider = get_network_config(cli, None)?.provider()?;
            let mut signer = args.signer.wallet();
            let res = Tx::call(
                &provider,
                &mut signer,
                args.receiver.clone(),
                &args.method,
                CallOptions {
                    args: args.args.clone(),
                    gas: args.gas.unwrap_or(DEFAULT_CALL_GAS),
                    deposit: args.deposit,
                    tx_params: args.tx_args.to_tx_params(),
                },
            )
            .await?;
            print_json(&res)?;
            Ok(result_code(&res))
        }
        TxCommands::Transfer(args) => {
            let provider = get_network_config(cli, None)?.provider()?;
            let mut signer = args.signer.wallet();
            let res = Tx::transfer(
                &provider,
                &mut signer,
                args.receiver.clone(),
                args.amount,
                args.tx_args.to_tx_params(),
            )
            .await?;
            print_json(&res)?;
            Ok(result_code(&res))
        }
        TxCommands::AddKey(args) => {
            let access_key = match (&args.receiver, args.full_access) {
                (Some(receiver), _) => AccessKey::function_call(
                    receiver.clone(),
                    args.method_names.clone(),
                    args.allowance,
                ),
                (None, true) => AccessKey::full_access(),
                (None, false) => Cli::command()
                    .error(
                        ErrorKind::MissingRequiredArgument,
                        "the following required arguments were not provided: --receiver OR --full-access",
                    )
                    .exit(),
            };
            let provider = get_network_config(cli, None)?.provider()?;
            let mut signer = args.signer.wallet();
            let res = Tx::add_key(
                &provider,
                &mut signer,
                args.public_key,
                access_key,
                args.tx_args.to_tx_params(),
            )
            .await?;
            print_json(&res)?;
            Ok(result_code(&res))
        }
        TxCommands::DeleteKey(args) => {
            let provider = get_network_config(cli, None)?.provider()?;
            let mut signer = args.signer.wallet();
            let res = Tx::delete_key(
                &provider,
                &mut signer,
                args.public_key,
                args.tx_args.to_tx_params(),
            )
            .await?;
            print_json(&res)?;
            Ok(result_code(&res))
        }
        TxCommands::Send(args) => {
            let config = TxConfig::from_file(&args.path).await?;
            let actions = config.actions()?;
            let provider = get_network_config(cli, config.network)?.provider()?;
            let mut signer = Wallet::new_ed25519(args.private_key.clone(), config.signer_id);
            let res = Tx::send(
                &provider,
                &mut signer,
                config.receiver_id,
                actions,
                args.tx_args.to_tx_params(),
            )
            .await?;
            print_json(&res)?;
            Ok(result_code(&res))
        }
        TxCommands::Status(args) => {
            let provider = get_network_config(cli, None)?.provider()?;
            let res = Tx::status(&provider, &args.hash, &args.sender).await?;
            print_json(&res)?;
            Ok(result_code(&res))
        }
    }
}
