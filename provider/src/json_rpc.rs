// Copyright 2025 Nearcast Contributors
// SPDX-License-Identifier: Apache-2.0, MIT

//! JSON-RPC transport and the provider built on it.

use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use backoff::{ExponentialBackoff, ExponentialBackoffBuilder};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::message::SignedTransaction;
use crate::query::{AccessKeyInfo, QueryProvider};
use crate::response::{FinalExecutionOutcome, FinalExecutionStatus, RpcErrorKind, RpcErrorObject};
use crate::tx::{BroadcastMode, TxProvider, TxResult};
use crate::types::{AccountId, CryptoHash, PublicKey};

pub use reqwest::Url;

const DEFAULT_RPC_TIMEOUT: Duration = Duration::from_secs(60);
const REQUEST_ID: &str = "nearcast";

/// What the node answered: a `result` or an `error` object.
pub type RpcReply = std::result::Result<Value, RpcErrorObject>;

/// A JSON-RPC transport. Transport failures are returned as
/// [`Error::Network`]; error objects sent by the node are returned as
/// `Ok(Err(_))` so callers can classify them.
#[async_trait]
pub trait Client: Send + Sync {
    async fn call(&self, method: &str, params: Value) -> Result<RpcReply>;
}

#[derive(Deserialize)]
struct JsonRpcResponse {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<RpcErrorObject>,
}

/// [`Client`] over HTTP(S).
#[derive(Debug, Clone)]
pub struct HttpClient {
    url: Url,
    inner: reqwest::Client,
}

impl HttpClient {
    pub fn new(url: Url, timeout: Option<Duration>) -> Result<Self> {
        let inner = reqwest::Client::builder()
            .timeout(timeout.unwrap_or(DEFAULT_RPC_TIMEOUT))
            .build()?;
        Ok(Self { url, inner })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }
}

#[async_trait]
impl Client for HttpClient {
    async fn call(&self, method: &str, params: Value) -> Result<RpcReply> {
        let body = json!({
            "jsonrpc": "2.0",
            "id": REQUEST_ID,
            "method": method,
            "params": params,
        });
        debug!(url = %self.url, method, "sending rpc request");
        let response = self.inner.post(self.url.clone()).json(&body).send().await?;
        let status = response.status();
        let text = response.text().await?;
        parse_reply(method, status, &text)
    }
}

/// Parses an HTTP response body into an [`RpcReply`]. A body that is not
/// JSON-RPC on a non-2xx status is a transport failure.
fn parse_reply(method: &str, status: reqwest::StatusCode, text: &str) -> Result<RpcReply> {
    let parsed: JsonRpcResponse = match serde_json::from_str(text) {
        Ok(parsed) => parsed,
        Err(_) if !status.is_success() => {
            return Err(Error::Network(format!("{method}: http status {status}")))
        }
        Err(e) => return Err(Error::Decode(format!("{method}: {e}"))),
    };
    match (parsed.result, parsed.error) {
        (_, Some(error)) => Ok(Err(error)),
        (Some(result), None) => Ok(Ok(result)),
        (None, None) => Err(Error::Decode(format!(
            "{method}: response has neither result nor error"
        ))),
    }
}

/// Bounds on resending a request after a transient failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryConfig {
    pub initial_interval: Duration,
    pub max_interval: Duration,
    /// Give up once this much time has passed since the first attempt.
    pub max_elapsed: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            initial_interval: Duration::from_millis(500),
            max_interval: Duration::from_secs(5),
            max_elapsed: Duration::from_secs(60),
        }
    }
}

impl RetryConfig {
    fn policy(&self) -> ExponentialBackoff {
        ExponentialBackoffBuilder::new()
            .with_initial_interval(self.initial_interval)
            .with_max_interval(self.max_interval)
            .with_max_elapsed_time(Some(self.max_elapsed))
            .build()
    }
}

/// A JSON-RPC based chain provider.
#[derive(Debug, Clone)]
pub struct JsonRpcProvider<C = HttpClient> {
    inner: C,
    retry: RetryConfig,
}

impl JsonRpcProvider<HttpClient> {
    pub fn new_http(url: Url, timeout: Option<Duration>, retry: Option<RetryConfig>) -> Result<Self> {
        Ok(Self::with_client(
            HttpClient::new(url, timeout)?,
            retry.unwrap_or_default(),
        ))
    }
}

impl<C: Client> JsonRpcProvider<C> {
    pub fn with_client(inner: C, retry: RetryConfig) -> Self {
        Self { inner, retry }
    }

    pub fn underlying(&self) -> &C {
        &self.inner
    }

    /// Sends a request, retrying transport failures and transient node
    /// errors. Returns the reply and the number of attempts made.
    async fn request(&self, method: &str, params: Value) -> Result<(RpcReply, u32)> {
        let inner = &self.inner;
        let attempts = &AtomicU32::new(0);
        let reply = backoff::future::retry(self.retry.policy(), || {
            let params = params.clone();
            async move {
                let attempt = attempts.fetch_add(1, Ordering::Relaxed) + 1;
                match inner.call(method, params).await {
                    Ok(Err(obj)) if obj.kind() == RpcErrorKind::Transient => {
                        warn!(method, attempt, error = %obj, "transient rpc error; retrying");
                        Err(backoff::Error::transient(Error::from(obj)))
                    }
                    Ok(reply) => Ok(reply),
                    Err(e) if e.is_transient() => {
                        warn!(method, attempt, error = %e, "rpc transport error; retrying");
                        Err(backoff::Error::transient(e))
                    }
                    Err(e) => Err(backoff::Error::permanent(e)),
                }
            }
        })
        .await?;
        Ok((reply, attempts.load(Ordering::Relaxed)))
    }

    async fn request_result(&self, method: &str, params: Value) -> Result<Value> {
        let (reply, _) = self.request(method, params).await?;
        reply.map_err(Error::from)
    }
}

#[async_trait]
impl<C: Client> QueryProvider for JsonRpcProvider<C> {
    async fn access_key(
        &self,
        account_id: &AccountId,
        public_key: &PublicKey,
    ) -> Result<AccessKeyInfo> {
        let path = format!("access_key/{account_id}/{public_key}");
        let result = self
            .request_result("query", json!([path, ""]))
            .await
            .map_err(|e| match e {
                Error::NotFound(msg) => Error::NotFound(format!(
                    "access key {public_key} for account {account_id}: {msg}"
                )),
                e => e,
            })?;
        let info = AccessKeyInfo::from_query_result(account_id, public_key, result)?;
        debug!(
            account = %account_id,
            nonce = info.nonce,
            block_hash = %info.block_hash,
            "fetched access key"
        );
        Ok(info)
    }

    async fn tx_status(
        &self,
        hash: &CryptoHash,
        sender_id: &AccountId,
    ) -> Result<FinalExecutionOutcome> {
        let result = self
            .request_result("tx", json!([hash.to_string(), sender_id.to_string()]))
            .await?;
        Ok(serde_json::from_value(result)?)
    }
}

#[async_trait]
impl<C: Client> TxProvider for JsonRpcProvider<C> {
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
        let encoded = tx.to_base64()?;
        let signer_id = &tx.transaction.signer_id;
        debug!(%hash, nonce = tx.transaction.nonce, ?broadcast_mode, "broadcasting transaction");

        match broadcast_mode {
            BroadcastMode::Async => {
                let result = self
                    .request_result("broadcast_tx_async", json!([encoded]))
                    .await?;
                let accepted: CryptoHash = serde_json::from_value(result)?;
                if accepted != hash {
                    warn!(%hash, %accepted, "node reported a different transaction hash");
                }
                Ok(TxResult::pending(accepted))
            }
            BroadcastMode::Commit => {
                let (reply, attempts) = self
                    .request("broadcast_tx_commit", json!([encoded]))
                    .await?;
                let outcome = match reply {
                    Ok(result) => serde_json::from_value::<FinalExecutionOutcome>(result)?,
                    // An earlier attempt may have landed before its response was
                    // lost, in which case the resubmission trips over the used nonce.
                    Err(obj) if attempts > 1 && obj.is_invalid_nonce() => {
                        info!(%hash, "nonce already used after resubmission; looking up outcome");
                        match self.tx_status(&hash, signer_id).await {
                            Ok(outcome) => outcome,
                            Err(Error::NotFound(_)) => {
                                return Ok(TxResult::rejected(hash, obj.detail()))
                            }
                            Err(e) => return Err(e),
                        }
                    }
                    Err(obj) if obj.kind() == RpcErrorKind::InvalidTransaction => {
                        info!(%hash, error = %obj, "transaction rejected by node");
                        return Ok(TxResult::rejected(hash, obj.detail()));
                    }
                    Err(obj) => return Err(Error::from(obj)),
                };
                match outcome.status {
                    FinalExecutionStatus::SuccessValue(_) => {
                        info!(%hash, gas_burnt = outcome.total_gas_burnt(), "transaction committed");
                        let data = f(&outcome)?;
                        Ok(TxResult::committed(outcome, Some(data)))
                    }
                    FinalExecutionStatus::Failure(ref failure) => {
                        info!(%hash, %failure, "transaction failed on chain");
                        Ok(TxResult::rejected(hash, failure.clone()))
                    }
                    FinalExecutionStatus::NotStarted | FinalExecutionStatus::Started => {
                        Err(Error::Network(format!(
                            "transaction {hash} did not finish before the node responded"
                        )))
                    }
                }
            }
        }
    }
}
