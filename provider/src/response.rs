// Copyright 2025 Nearcast Contributors
// SPDX-License-Identifier: Apache-2.0, MIT

use std::fmt::{self, Display};

use base64::Engine;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};
use crate::types::{AccountId, CryptoHash, PublicKey};

/// Final status of a transaction's main receipt chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FinalExecutionStatus {
    NotStarted,
    Started,
    /// The chain executed the transaction and it failed; the payload is the
    /// node's structured error.
    Failure(Value),
    /// Base64 of the value returned by the last receipt.
    SuccessValue(String),
}

/// Status of a single transaction or receipt outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExecutionStatus {
    Unknown,
    Failure(Value),
    SuccessValue(String),
    SuccessReceiptId(CryptoHash),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionOutcome {
    #[serde(default)]
    pub logs: Vec<String>,
    #[serde(default)]
    pub receipt_ids: Vec<CryptoHash>,
    #[serde(default)]
    pub gas_burnt: u64,
    /// Burnt tokens in yoctoNEAR, as a decimal string.
    #[serde(default)]
    pub tokens_burnt: String,
    pub executor_id: AccountId,
    pub status: ExecutionStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionOutcomeWithId {
    pub id: CryptoHash,
    pub block_hash: CryptoHash,
    pub outcome: ExecutionOutcome,
}

/// The parts of the echoed transaction callers care about.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionView {
    pub hash: CryptoHash,
    pub signer_id: AccountId,
    pub public_key: PublicKey,
    pub nonce: u64,
    pub receiver_id: AccountId,
}

/// What `broadcast_tx_commit` and `tx` return.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinalExecutionOutcome {
    pub status: FinalExecutionStatus,
    pub transaction: TransactionView,
    pub transaction_outcome: ExecutionOutcomeWithId,
    #[serde(default)]
    pub receipts_outcome: Vec<ExecutionOutcomeWithId>,
}

impl FinalExecutionOutcome {
    /// Whether the main receipt chain finished successfully.
    pub fn is_success(&self) -> bool {
        matches!(self.status, FinalExecutionStatus::SuccessValue(_))
    }

    /// Total gas burnt by the transaction and all of its receipts.
    pub fn total_gas_burnt(&self) -> u64 {
        self.receipts_outcome
            .iter()
            .fold(self.transaction_outcome.outcome.gas_burnt, |acc, r| {
                acc.saturating_add(r.outcome.gas_burnt)
            })
    }

    /// Logs emitted by every receipt, in execution order.
    pub fn logs(&self) -> Vec<&str> {
        self.receipts_outcome
            .iter()
            .flat_map(|r| r.outcome.logs.iter().map(String::as_str))
            .collect()
    }
}

/// JSON-RPC error object. The node nests a machine readable `cause`
/// under a coarse `name`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RpcErrorObject {
    #[serde(default)]
    pub code: i64,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub cause: Option<RpcErrorCause>,
    #[serde(default)]
    pub data: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RpcErrorCause {
    pub name: String,
    #[serde(default)]
    pub info: Option<Value>,
}

/// How the pipeline should treat an error object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RpcErrorKind {
    /// The request may succeed if sent again.
    Transient,
    /// The record does not exist.
    NotFound,
    /// The node refused the transaction before executing it.
    InvalidTransaction,
    /// The request itself was malformed.
    InvalidRequest,
    Other,
}

impl RpcErrorObject {
    pub fn cause_name(&self) -> Option<&str> {
        self.cause.as_ref().map(|c| c.name.as_str())
    }

    pub fn kind(&self) -> RpcErrorKind {
        match self.cause_name() {
            Some("TIMEOUT_ERROR") | Some("INTERNAL_ERROR") | Some("NO_SYNCED_BLOCKS")
            | Some("NOT_SYNCED_YET") => RpcErrorKind::Transient,
            Some("UNKNOWN_ACCESS_KEY")
            | Some("UNKNOWN_ACCOUNT")
            | Some("UNKNOWN_TRANSACTION")
            | Some("UNKNOWN_BLOCK") => RpcErrorKind::NotFound,
            Some("INVALID_TRANSACTION") => RpcErrorKind::InvalidTransaction,
            Some("PARSE_ERROR") | Some("INVALID_ACCOUNT") => RpcErrorKind::InvalidRequest,
            _ => match self.name.as_deref() {
                Some("REQUEST_VALIDATION_ERROR") => RpcErrorKind::InvalidRequest,
                Some("INTERNAL_ERROR") => RpcErrorKind::Transient,
                _ => RpcErrorKind::Other,
            },
        }
    }

    /// Whether the node refused the transaction because its nonce was used.
    pub fn is_invalid_nonce(&self) -> bool {
        let needle = "InvalidNonce";
        let in_value = |v: &Option<Value>| v.as_ref().is_some_and(|v| v.to_string().contains(needle));
        in_value(&self.data) || self.cause.as_ref().is_some_and(|c| in_value(&c.info))
    }

    /// Structured detail for display: the cause info, else the data field.
    pub fn detail(&self) -> Value {
        self.cause
            .as_ref()
            .and_then(|c| c.info.clone())
            .or_else(|| self.data.clone())
            .unwrap_or(Value::Null)
    }
}

impl Display for RpcErrorObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.name, self.cause_name()) {
            (Some(name), Some(cause)) => write!(f, "{name}/{cause}: {}", self.detail()),
            _ => write!(f, "code={} message={} data={}", self.code, self.message, self.detail()),
        }
    }
}

impl From<RpcErrorObject> for Error {
    fn from(e: RpcErrorObject) -> Self {
        match e.kind() {
            RpcErrorKind::Transient => Error::Network(e.to_string()),
            RpcErrorKind::NotFound => Error::NotFound(e.to_string()),
            RpcErrorKind::InvalidRequest => Error::Validation(e.to_string()),
            RpcErrorKind::InvalidTransaction | RpcErrorKind::Other => Error::Rpc(e.to_string()),
        }
    }
}

/// Decode the base64 `SuccessValue` of a committed transaction.
pub(crate) fn decode_data(data: &str) -> Result<Vec<u8>> {
    base64::engine::general_purpose::STANDARD
        .decode(data)
        .map_err(|e| Error::Decode(format!("error parsing base64 to bytes: {e}")))
}

/// Parse the value returned by a committed transaction as raw bytes.
pub fn decode_bytes(outcome: &FinalExecutionOutcome) -> Result<Vec<u8>> {
    match &outcome.status {
        FinalExecutionStatus::SuccessValue(data) => decode_data(data),
        other => Err(Error::Decode(format!(
            "transaction {} has no return value: {other:?}",
            outcome.transaction.hash
        ))),
    }
}

/// Ignore the value returned by a committed transaction.
pub fn decode_empty(_: &FinalExecutionOutcome) -> Result<()> {
    Ok(())
}

/// Parse the value returned by a committed transaction as JSON of type `T`.
pub fn decode_as<T>(outcome: &FinalExecutionOutcome) -> Result<T>
where
    T: for<'de> Deserialize<'de>,
{
    let data = decode_bytes(outcome)?;
    serde_json::from_slice::<T>(&data)
        .map_err(|e| Error::Decode(format!("error parsing data as {}: {e}", std::any::type_name::<T>())))
}
