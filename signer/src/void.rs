// Copyright 2025 Nearcast Contributors
// SPDX-License-Identifier: Apache-2.0, MIT

use async_trait::async_trait;

use nearcast_provider::message::{Action, SignedTransaction, Transaction};
use nearcast_provider::response::FinalExecutionOutcome;
use nearcast_provider::tx::{BroadcastMode, TxResult};
use nearcast_provider::types::{AccountId, PublicKey};
use nearcast_provider::{Error, Provider, Result};

use crate::key::{self, SecretKey};
use crate::signer::Signer;

/// [`Signer`] implementation that is not capable of signing transactions.
///
/// Useful for read-only flows that still want to name an account.
#[derive(Clone, Debug)]
pub struct Void {
    account_id: AccountId,
}

impl Void {
    pub fn new(account_id: AccountId) -> Self {
        Self { account_id }
    }
}

#[async_trait]
impl Signer for Void {
    fn account_id(&self) -> &AccountId {
        &self.account_id
    }

    fn public_key(&self) -> Option<PublicKey> {
        None
    }

    fn secret_key(&self) -> Option<SecretKey> {
        None
    }

    async fn send_transaction<P, T, F>(
        &mut self,
        _provider: &P,
        _receiver_id: AccountId,
        _actions: Vec<Action>,
        _nonce: Option<u64>,
        _broadcast_mode: BroadcastMode,
        _decode_fn: F,
    ) -> Result<TxResult<T>>
    where
        P: Provider,
        T: Send + Sync,
        F: FnOnce(&FinalExecutionOutcome) -> Result<T> + Send + Sync,
    {
        Err(Error::signing("void signer cannot create transactions"))
    }

    fn sign_transaction(&self, _tx: Transaction) -> Result<SignedTransaction> {
        Err(Error::signing("void signer cannot sign transactions"))
    }

    /// Verification only needs the embedded public key, so it still works.
    fn verify_transaction(&self, tx: &SignedTransaction) -> Result<()> {
        let hash = tx.hash()?;
        key::verify(&tx.transaction.public_key, hash.as_bytes(), &tx.signature)
    }
}
