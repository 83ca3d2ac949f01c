// Copyright 2025 Nearcast Contributors
// SPDX-License-Identifier: Apache-2.0, MIT

use std::process::ExitCode;

use clap::{Args, Subcommand};
use serde_json::json;

use nearcast_signer::key::{parse_secret_key, random_secretkey, SecretKey};

use crate::print_json;

#[derive(Clone, Debug, Args)]
pub struct KeyArgs {
    #[command(subcommand)]
    command: KeyCommands,
}

#[derive(Clone, Debug, Subcommand)]
enum KeyCommands {
    /// Create a new Ed25519 key from a random seed (key details are NOT sent to the network).
    Create,
    /// Show the public key and implicit account ID of a private key.
    Info(InfoArgs),
}

#[derive(Clone, Debug, Args)]
struct InfoArgs {
    /// Ed25519 private key, `ed25519:<base58>`.
    #[arg(short, long, env = "NEARCAST_PRIVATE_KEY", value_parser = parse_secret_key, hide_env_values = true)]
    private_key: SecretKey,
}

/// Key commands handler.
pub async fn handle_key(args: &KeyArgs) -> anyhow::Result<ExitCode> {
    match &args.command {
        KeyCommands::Create => {
            let sk = random_secretkey();
            let pk = sk.public_key();
            print_json(&json!({
                "private_key": sk.to_key_string(),
                "public_key": pk.to_string(),
                "implicit_account_id": hex::encode(pk.key_data()),
            }))?;
        }
        KeyCommands::Info(args) => {
            let pk = args.private_key.public_key();
            print_json(&json!({
                "public_key": pk.to_string(),
                "implicit_account_id": hex::encode(pk.key_data()),
            }))?;
        }
    }
    Ok(ExitCode::SUCCESS)
}
