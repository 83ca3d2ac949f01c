// Copyright 2025 Nearcast Contributors
// SPDX-License-Identifier: Apache-2.0, MIT

use base64::Engine;
use serde_json::Value;
use tracing::debug;

use nearcast_provider::message::{AccessKey, Action, FunctionCallAction};
use nearcast_provider::query::QueryProvider;
use nearcast_provider::response::{decode_bytes, decode_empty, FinalExecutionOutcome, FinalExecutionStatus};
use nearcast_provider::tx::TxResult;
use nearcast_provider::types::{AccountId, CryptoHash, PublicKey};
use nearcast_provider::util::GAS_PER_TGAS;
use nearcast_provider::{Provider, Result};
use nearcast_signer::Signer;

use crate::TxParams;

/// Gas attached to a function call when none is given.
pub const DEFAULT_CALL_GAS: u64 = 30 * GAS_PER_TGAS;

/// Options for calling a contract method.
#[derive(Clone, Debug)]
pub struct CallOptions {
    /// JSON arguments passed to the method.
    pub args: Value,
    /// Prepaid gas.
    pub gas: u64,
    /// Attached deposit in yoctoNEAR.
    pub deposit: u128,
    pub tx_params: TxParams,
}

impl Default for CallOptions {
    fn default() -> Self {
        Self {
            args: Value::Object(Default::default()),
            gas: DEFAULT_CALL_GAS,
            deposit: 0,
            tx_params: Default::default(),
        }
    }
}

/// A static wrapper around transaction methods.
pub struct Tx {}

impl Tx {
    /// Call `method_name` on `receiver_id`. The committed result carries the
    /// method's return value.
    pub async fn call(
        provider: &impl Provider,
        signer: &mut impl Signer,
        receiver_id: AccountId,
        method_name: &str,
        options: CallOptions,
    ) -> Result<TxResult<Value>> {
        let action = FunctionCallAction::json(method_name, &options.args, options.gas, options.deposit)?;
        Self::send(
            provider,
            signer,
            receiver_id,
            vec![Action::function_call(action)],
            options.tx_params,
        )
        .await
    }

    /// Transfer `amount` yoctoNEAR to `receiver_id`.
    pub async fn transfer(
        provider: &impl Provider,
        signer: &mut impl Signer,
        receiver_id: AccountId,
        amount: u128,
        tx_params: TxParams,
    ) -> Result<TxResult<()>> {
        signer
            .send_transaction(
                provider,
                receiver_id,
                vec![Action::transfer(amount)],
                tx_params.nonce,
                tx_params.broadcast_mode,
                decode_empty,
            )
            .await
    }

    /// Add `public_key` to the signer's account.
    pub async fn add_key(
        provider: &impl Provider,
        signer: &mut impl Signer,
        public_key: PublicKey,
        access_key: AccessKey,
        tx_params: TxParams,
    ) -> Result<TxResult<()>> {
        let account_id = signer.account_id().clone();
        signer
            .send_transaction(
                provider,
                account_id,
                vec![Action::add_key(public_key, access_key)],
                tx_params.nonce,
                tx_params.broadcast_mode,
                decode_empty,
            )
            .await
    }

    /// Remove `public_key` from the signer's account.
    pub async fn delete_key(
        provider: &impl Provider,
        signer: &mut impl Signer,
        public_key: PublicKey,
        tx_params: TxParams,
    ) -> Result<TxResult<()>> {
        let account_id = signer.account_id().clone();
        signer
            .send_transaction(
                provider,
                account_id,
                vec![Action::delete_key(public_key)],
                tx_params.nonce,
                tx_params.broadcast_mode,
                decode_empty,
            )
            .await
    }

    /// Sign and broadcast an arbitrary list of actions.
    pub async fn send(
        provider: &impl Provider,
        signer: &mut impl Signer,
        receiver_id: AccountId,
        actions: Vec<Action>,
        tx_params: TxParams,
    ) -> Result<TxResult<Value>> {
        signer
            .send_transaction(
                provider,
                receiver_id,
                actions,
                tx_params.nonce,
                tx_params.broadcast_mode,
                decode_return_value,
            )
            .await
    }

    /// Look up the outcome of a previously broadcast transaction.
    pub async fn status(
        provider: &impl QueryProvider,
        hash: &CryptoHash,
        sender_id: &AccountId,
    ) -> Result<TxResult<Value>> {
        let outcome = provider.tx_status(hash, sender_id).await?;
        debug!(%hash, status = ?outcome.status, "fetched transaction status");
        match &outcome.status {
            FinalExecutionStatus::SuccessValue(_) => {
                let data = decode_return_value(&outcome)?;
                Ok(TxResult::committed(outcome, Some(data)))
            }
            FinalExecutionStatus::Failure(failure) => Ok(TxResult::rejected(*hash, failure.clone())),
            FinalExecutionStatus::NotStarted | FinalExecutionStatus::Started => {
                Ok(TxResult::pending(*hash))
            }
        }
    }
}

/// Decode a method's return value: JSON when it parses, a UTF-8 string when
/// it does not, base64 otherwise. An empty return is `null`.
pub fn decode_return_value(outcome: &FinalExecutionOutcome) -> Result<Value> {
    let data = decode_bytes(outcome)?;
    if data.is_empty() {
        return Ok(Value::Null);
    }
    if let Ok(value) = serde_json::from_slice(&data) {
        return Ok(value);
    }
    Ok(match String::from_utf8(data) {
        Ok(s) => Value::String(s),
        Err(e) => Value::String(base64::engine::general_purpose::STANDARD.encode(e.into_bytes())),
    })
}
