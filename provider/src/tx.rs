// Copyright 2025 Nearcast Contributors
// SPDX-License-Identifier: Apache-2.0, MIT

use std::str::FromStr;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;

use crate::error::{Error, Result};
use crate::message::SignedTransaction;
use crate::response::FinalExecutionOutcome;
use crate::types::CryptoHash;

/// Controls how the provider waits for the result of a transaction.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub enum BroadcastMode {
    /// Return the transaction hash as soon as the node accepts the payload.
    Async,
    /// Wait until the node reports the final execution outcome.
    #[default]
    Commit,
}

impl FromStr for BroadcastMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "async" => Self::Async,
            "commit" => Self::Commit,
            _ => return Err(Error::validation(format!("invalid broadcast mode '{s}'"))),
        })
    }
}

/// Where a broadcast transaction ended up.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TxStatus {
    /// Accepted by the node; the outcome was not awaited.
    Pending,
    /// Executed successfully.
    Committed(Box<FinalExecutionOutcome>),
    /// Refused before execution, or executed and failed. The payload is the
    /// node's structured reason.
    Rejected(Value),
}

/// The result of a transaction.
#[derive(Debug, Clone, Serialize)]
pub struct TxResult<T>
where
    T: 'static,
{
    /// The transaction hash.
    pub hash: CryptoHash,
    /// The transaction's current status.
    pub status: TxStatus,
    /// Data returned by the transaction.
    #[serde(skip_serializing_if = "is_data_empty")]
    pub data: Option<T>,
}

fn is_data_empty<T>(data: &Option<T>) -> bool
where
    T: 'static,
{
    match data {
        None => true,
        Some(_) if std::any::TypeId::of::<T>() == std::any::TypeId::of::<()>() => true,
        _ => false,
    }
}

impl<T> TxResult<T>
where
    T: 'static,
{
    /// Create a new result with status pending.
    pub fn pending(hash: CryptoHash) -> Self {
        TxResult {
            hash,
            status: TxStatus::Pending,
            data: None,
        }
    }

    /// Create a new result with status committed.
    pub fn committed(outcome: FinalExecutionOutcome, data: Option<T>) -> Self {
        TxResult {
            hash: outcome.transaction.hash,
            status: TxStatus::Committed(Box::new(outcome)),
            data,
        }
    }

    /// Create a new result with status rejected.
    pub fn rejected(hash: CryptoHash, reason: Value) -> Self {
        TxResult {
            hash,
            status: TxStatus::Rejected(reason),
            data: None,
        }
    }

    pub fn is_committed(&self) -> bool {
        matches!(self.status, TxStatus::Committed(_))
    }

    pub fn is_rejected(&self) -> bool {
        matches!(self.status, TxStatus::Rejected(_))
    }
}

/// Provider for submitting transactions.
#[async_trait]
pub trait TxProvider: Send + Sync {
    /// Broadcast a signed transaction. `f` decodes the return value of a
    /// committed transaction and is not called for pending or rejected ones.
    async fn perform<F, T>(
        &self,
        tx: SignedTransaction,
        broadcast_mode: BroadcastMode,
        f: F,
    ) -> Result<TxResult<T>>
    where
        F: FnOnce(&FinalExecutionOutcome) -> Result<T> + Sync + Send,
        T: Sync + Send;

    /// Broadcast an already encoded transaction. The payload is checked
    /// locally before anything is sent.
    async fn perform_raw(
        &self,
        encoded: &str,
        broadcast_mode: BroadcastMode,
    ) -> Result<TxResult<()>> {
        let tx = SignedTransaction::from_base64(encoded)?;
        self.perform(tx, broadcast_mode, |_| Ok(())).await
    }
}
