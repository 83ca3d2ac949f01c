// Copyright 2025 Nearcast Contributors
// SPDX-License-Identifier: Apache-2.0, MIT

use async_trait::async_trait;

use nearcast_provider::message::{Action, SignedTransaction, Transaction};
use nearcast_provider::response::FinalExecutionOutcome;
use nearcast_provider::tx::{BroadcastMode, TxResult};
use nearcast_provider::types::{AccountId, PublicKey};
use nearcast_provider::{Provider, Result};

use crate::key::SecretKey;

/// Trait that must be implemented by all signers.
#[async_trait]
pub trait Signer: Clone + Send + Sync {
    /// Returns the account the signer acts for.
    fn account_id(&self) -> &AccountId;

    /// Returns the signer [`PublicKey`] if it exists.
    fn public_key(&self) -> Option<PublicKey>;

    /// Returns the signer [`SecretKey`] if it exists.
    fn secret_key(&self) -> Option<SecretKey>;

    /// Fetches the access key, builds a transaction carrying `actions`,
    /// signs it and broadcasts it.
    ///
    /// `nonce` overrides the nonce the signer would pick; it must be above
    /// the access key's current nonce.
    #[allow(clippy::too_many_arguments)]
    async fn send_transaction<P, T, F>(
        &mut self,
        provider: &P,
        receiver_id: AccountId,
        actions: Vec<Action>,
        nonce: Option<u64>,
        broadcast_mode: BroadcastMode,
        decode_fn: F,
    ) -> Result<TxResult<T>>
    where
        P: Provider,
        T: Send + Sync,
        F: FnOnce(&FinalExecutionOutcome) -> Result<T> + Send + Sync;

    /// Signs the hash of a [`Transaction`].
    fn sign_transaction(&self, tx: Transaction) -> Result<SignedTransaction>;

    /// Verifies a [`SignedTransaction`] against its embedded public key.
    fn verify_transaction(&self, tx: &SignedTransaction) -> Result<()>;
}
