// Copyright 2025 Nearcast Contributors
// SPDX-License-Identifier: Apache-2.0, MIT

use thiserror::Error;

/// Convenience alias used across the provider, signer and SDK crates.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors surfaced by the transaction pipeline.
///
/// An on-chain execution failure is not an error: it is reported as
/// [`crate::tx::TxStatus::Rejected`] and must be inspected by the caller.
#[derive(Debug, Error)]
pub enum Error {
    /// The RPC endpoint could not be reached, or kept timing out.
    #[error("network error: {0}")]
    Network(String),

    /// The requested record (access key, account, transaction) does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// Transaction inputs are malformed.
    #[error("validation error: {0}")]
    Validation(String),

    /// Key material is malformed or a signature cannot be produced/verified.
    #[error("signing error: {0}")]
    Signing(String),

    /// The node answered with an error we do not classify.
    #[error("rpc error: {0}")]
    Rpc(String),

    /// A response could not be decoded.
    #[error("decode error: {0}")]
    Decode(String),
}

impl Error {
    pub fn validation(msg: impl Into<String>) -> Self {
        Error::Validation(msg.into())
    }

    pub fn signing(msg: impl Into<String>) -> Self {
        Error::Signing(msg.into())
    }

    /// Whether retrying the same request may succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, Error::Network(_))
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            Error::Decode(e.to_string())
        } else {
            Error::Network(e.to_string())
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Decode(e.to_string())
    }
}
