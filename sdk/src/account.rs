// Copyright 2025 Nearcast Contributors
// SPDX-License-Identifier: Apache-2.0, MIT

use nearcast_provider::query::{AccessKeyInfo, QueryProvider};
use nearcast_provider::types::{AccountId, PublicKey};
use nearcast_provider::{Error, Result};
use nearcast_signer::Signer;

/// A static wrapper around account queries.
pub struct Account {}

impl Account {
    /// Get the access key a [`Signer`] signs with.
    pub async fn access_key(
        provider: &impl QueryProvider,
        signer: &impl Signer,
    ) -> Result<AccessKeyInfo> {
        let public_key = signer.public_key().ok_or_else(|| {
            Error::signing(format!(
                "signer for {} has no public key",
                signer.account_id()
            ))
        })?;
        provider.access_key(signer.account_id(), &public_key).await
    }

    /// Get the access key binding `public_key` to `account_id`.
    pub async fn access_key_of(
        provider: &impl QueryProvider,
        account_id: &AccountId,
        public_key: &PublicKey,
    ) -> Result<AccessKeyInfo> {
        provider.access_key(account_id, public_key).await
    }

    /// Get the last nonce used by a [`Signer`]'s access key.
    pub async fn nonce(provider: &impl QueryProvider, signer: &impl Signer) -> Result<u64> {
        Ok(Self::access_key(provider, signer).await?.nonce)
    }
}
