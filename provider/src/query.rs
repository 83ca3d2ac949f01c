// Copyright 2025 Nearcast Contributors
// SPDX-License-Identifier: Apache-2.0, MIT

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};
use crate::response::FinalExecutionOutcome;
use crate::types::{AccountId, CryptoHash, PublicKey};

/// Access key state returned by the node, together with the block it was
/// read at. The block hash is what new transactions must reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccessKeyInfo {
    /// Last nonce used with this key.
    pub nonce: u64,
    pub block_hash: CryptoHash,
    pub block_height: u64,
    /// `"FullAccess"` or a `{"FunctionCall": {...}}` object.
    pub permission: Value,
}

impl AccessKeyInfo {
    /// Nonce the next transaction signed with this key must carry.
    pub fn next_nonce(&self) -> Result<u64> {
        next_nonce_after(self.nonce)
    }

    /// Parses the `result` of an access key query.
    ///
    /// Older nodes report a missing key as a successful response whose
    /// body carries an `error` string instead of the view.
    pub fn from_query_result(
        account_id: &AccountId,
        public_key: &PublicKey,
        result: Value,
    ) -> Result<Self> {
        if let Some(err) = result.get("error").and_then(Value::as_str) {
            return Err(if err.contains("does not exist") {
                Error::NotFound(format!(
                    "access key {public_key} for account {account_id}: {err}"
                ))
            } else {
                Error::Rpc(err.to_string())
            });
        }
        Ok(serde_json::from_value(result)?)
    }
}

/// Nonce that follows `nonce`. A key whose nonce reached `u64::MAX` can no
/// longer sign.
pub fn next_nonce_after(nonce: u64) -> Result<u64> {
    nonce
        .checked_add(1)
        .ok_or_else(|| Error::validation("access key nonce exhausted"))
}

/// Provider for reading chain state.
#[async_trait]
pub trait QueryProvider: Send + Sync {
    /// Fetch the access key binding `public_key` to `account_id`.
    async fn access_key(
        &self,
        account_id: &AccountId,
        public_key: &PublicKey,
    ) -> Result<AccessKeyInfo>;

    /// Fetch the outcome of a previously broadcast transaction.
    async fn tx_status(
        &self,
        hash: &CryptoHash,
        sender_id: &AccountId,
    ) -> Result<FinalExecutionOutcome>;
}
