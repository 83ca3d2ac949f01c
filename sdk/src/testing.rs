// Copyright 2025 Nearcast Contributors
// SPDX-License-Identifier: Apache-2.0, MIT

use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::{json, Value};

use nearcast_provider::message::SignedTransaction;
use nearcast_provider::query::{AccessKeyInfo, QueryProvider};
use nearcast_provider::response::{FinalExecutionOutcome, FinalExecutionStatus};
use nearcast_provider::tx::{BroadcastMode, TxProvider, TxResult};
use nearcast_provider::types::{AccountId, CryptoHash, PublicKey};
use nearcast_provider::{Error, Result};

/// In-memory node: serves one access key and executes every broadcast
/// with a fixed final status.
pub(crate) struct MockProvider {
    nonce: u64,
    status: Value,
    pub sent: Mutex<Vec<SignedTransaction>>,
}

impl MockProvider {
    pub fn new(nonce: u64) -> Self {
        Self {
            nonce,
            status: json!({"SuccessValue": ""}),
            sent: Mutex::new(vec![]),
        }
    }

    pub fn with_status(mut self, status: Value) -> Self {
        self.status = status;
        self
    }

    pub fn last_sent(&self) -> SignedTransaction {
        self.sent.lock().unwrap().last().cloned().unwrap()
    }

    fn outcome(&self, hash: &CryptoHash, tx: &SignedTransaction) -> Result<FinalExecutionOutcome> {
        let t = &tx.transaction;
        Ok(serde_json::from_value(json!({
            "status": self.status,
            "transaction": {
                "hash": hash,
                "signer_id": t.signer_id,
                "public_key": t.public_key,
                "nonce": t.nonce,
                "receiver_id": t.receiver_id,
            },
            "transaction_outcome": {
                "id": hash,
                "block_hash": t.block_hash,
                "outcome": {
                    "gas_burnt": 2428000000000u64,
                    "executor_id": t.signer_id,
                    "status": {"SuccessReceiptId": hash}
                }
            },
            "receipts_outcome": []
        }))?)
    }
}

#[async_trait]
impl QueryProvider for MockProvider {
    async fn access_key(
        &self,
        _account_id: &AccountId,
        _public_key: &PublicKey,
    ) -> Result<AccessKeyInfo> {
        Ok(serde_json::from_value(json!({
            "nonce": self.nonce,
            "permission": "FullAccess",
            "block_height": 100,
            "block_hash": "GGJQ8yjmo7aEoj8ZpAhGehnq9BSWFx4xswHYzDwwAP2n"
        }))?)
    }

    async fn tx_status(
        &self,
        hash: &CryptoHash,
        _sender_id: &AccountId,
    ) -> Result<FinalExecutionOutcome> {
        let sent = self.sent.lock().unwrap();
        for tx in sent.iter() {
            if tx.hash()? == *hash {
                return self.outcome(hash, tx);
            }
        }
        Err(Error::NotFound(format!("transaction {hash}")))
    }
}

#[async_trait]
impl TxProvider for MockProvider {
    async fn perform<F, T>(
        &self,
        tx: SignedTransaction,
        broadcast_mode: BroadcastMode,
        f: F,
    ) -> Result<TxResult<T>>
    where
        F: FnOnce(&FinalExecutionOutcome) -> Result<T> + Sync + Send,
        T: Sync + Send,
    {
        let hash = tx.hash()?;
        let outcome = self.outcome(&hash, &tx)?;
        self.sent.lock().unwrap().push(tx);
        if broadcast_mode == BroadcastMode::Async {
            return Ok(TxResult::pending(hash));
        }
        match outcome.status {
            FinalExecutionStatus::Failure(ref failure) => {
                Ok(TxResult::rejected(hash, failure.clone()))
            }
            _ => {
                let data = f(&outcome)?;
                Ok(TxResult::committed(outcome, Some(data)))
            }
        }
    }
}
