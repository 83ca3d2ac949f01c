// Copyright 2025 Nearcast Contributors
// SPDX-License-Identifier: Apache-2.0, MIT

use std::process::ExitCode;

use clap::{error::ErrorKind, Args, CommandFactory, Subcommand};
use serde_json::json;

use nearcast_provider::{
    types::{AccountId, PublicKey},
    util::{parse_account_id, parse_public_key},
};
use nearcast_sdk::account::Account;
use nearcast_signer::key::{parse_secret_key, SecretKey};

use crate::{get_network_config, print_json, Cli};

#[derive(Clone, Debug, Args)]
pub struct AccountArgs {
    #[command(subcommand)]
    command: AccountCommands,
}

#[derive(Clone, Debug, Subcommand)]
enum AccountCommands {
    /// Get the nonce and permission of an access key.
    AccessKey(AccessKeyArgs),
}

#[derive(Clone, Debug, Args)]
struct AccessKeyArgs {
    /// Account the key belongs to.
    #[arg(value_parser = parse_account_id)]
    account_id: AccountId,
    /// Public key to look up. Takes precedence over the private key.
    #[arg(long, value_parser = parse_public_key)]
    public_key: Option<PublicKey>,
    /// Private key whose public key is looked up.
    #[arg(short, long, env = "NEARCAST_PRIVATE_KEY", value_parser = parse_secret_key, hide_env_values = true)]
    private_key: Option<SecretKey>,
}

/// Account commands handler.
pub async fn handle_account(cli: &Cli, args: &AccountArgs) -> anyhow::Result<ExitCode> {
    let provider = get_network_config(cli, None)?.provider()?;

    match &args.command {
        AccountCommands::AccessKey(args) => {
            let public_key = get_public_key(args);
            let info = Account::access_key_of(&provider, &args.account_id, &public_key).await?;
            print_json(&json!({
                "account_id": args.account_id,
                "public_key": public_key,
                "nonce": info.nonce,
                "next_nonce": info.next_nonce()?,
                "permission": info.permission,
                "block_hash": info.block_hash,
                "block_height": info.block_height,
            }))?;
        }
    }
    Ok(ExitCode::SUCCESS)
}

/// Returns the public key from the public or private key arg.
fn get_public_key(args: &AccessKeyArgs) -> PublicKey {
    if let Some(pk) = args.public_key {
        pk
    } else if let Some(sk) = &args.private_key {
        sk.public_key()
    } else {
        Cli::command()
            .error(
                ErrorKind::MissingRequiredArgument,
                "the following required arguments were not provided: --public-key OR --private-key",
            )
            .exit();
    }
}
