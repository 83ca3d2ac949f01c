// Copyright 2025 Nearcast Contributors
// SPDX-License-Identifier: Apache-2.0, MIT

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::{debug, info};

use nearcast_provider::message::{
    Action, BorshSchemaV0, SignedTransaction, Transaction, TransactionBuilder, TxSchema,
};
use nearcast_provider::query::{next_nonce_after, QueryProvider};
use nearcast_provider::response::FinalExecutionOutcome;
use nearcast_provider::tx::{BroadcastMode, TxResult};
use nearcast_provider::types::{AccountId, PublicKey};
use nearcast_provider::{Error, Provider, Result};

use crate::key::{self, SecretKey};
use crate::signer::Signer;

/// [`Signer`] implementation that relies on a local [`SecretKey`] to sign transactions.
///
/// Note, because [`Wallet`] tracks the last nonce it used behind a mutex,
/// using it across threads won't increase the speed at which it can sign transactions.
#[derive(Debug, Clone)]
pub struct Wallet {
    account_id: AccountId,
    sk: SecretKey,
    nonce: Arc<Mutex<u64>>,
}

#[async_trait]
impl Signer for Wallet {
    fn account_id(&self) -> &AccountId {
        &self.account_id
    }

    fn public_key(&self) -> Option<PublicKey> {
        Some(self.sk.public_key())
    }

    fn secret_key(&self) -> Option<SecretKey> {
        Some(self.sk.clone())
    }

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
        F: FnOnce(&FinalExecutionOutcome) -> Result<T> + Send + Sync,
    {
        let public_key = self.sk.public_key();

        // Always fetch: the block hash must be recent even when the nonce is known.
        let access_key = provider.access_key(&self.account_id, &public_key).await?;

        let mut nonce_guard = self.nonce.lock().await;
        let nonce = match nonce {
            Some(n) if n <= access_key.nonce => {
                return Err(Error::validation(format!(
                    "nonce {n} is already used; access key nonce is {}",
                    access_key.nonce
                )))
            }
            Some(n) => n,
            None => next_nonce_after(access_key.nonce.max(*nonce_guard))?,
        };

        let tx = TransactionBuilder::new(self.account_id.clone(), public_key, receiver_id)
            .nonce(nonce)
            .block_hash(access_key.block_hash)
            .actions(actions)
            .build()?;
        let signed = self.sign_transaction(tx)?;
        *nonce_guard = nonce;
        drop(nonce_guard);

        info!(
            signer = %self.account_id,
            receiver = %signed.transaction.receiver_id,
            nonce,
            actions = signed.transaction.actions.len(),
            "sending transaction"
        );
        provider.perform(signed, broadcast_mode, decode_fn).await
    }

    fn sign_transaction(&self, tx: Transaction) -> Result<SignedTransaction> {
        if tx.public_key != self.sk.public_key() {
            return Err(Error::signing(format!(
                "transaction public key {} does not belong to this wallet",
                tx.public_key
            )));
        }
        let hash = BorshSchemaV0::hash(&tx)?;
        let signature = self.sk.sign(hash.as_bytes());
        debug!(%hash, schema = BorshSchemaV0::VERSION, "signed transaction");
        Ok(SignedTransaction::new(tx, signature))
    }

    fn verify_transaction(&self, tx: &SignedTransaction) -> Result<()> {
        let hash = tx.hash()?;
        key::verify(&tx.transaction.public_key, hash.as_bytes(), &tx.signature)
    }
}

impl Wallet {
    /// Returns a new Ed25519 [`Wallet`] acting for `account_id`.
    pub fn new_ed25519(sk: SecretKey, account_id: AccountId) -> Self {
        Wallet {
            account_id,
            sk,
            nonce: Arc::new(Mutex::new(0)),
        }
    }

    /// Initialize the nonce from the access key's on-chain state.
    pub async fn init_nonce(&mut self, provider: &impl QueryProvider) -> Result<()> {
        let access_key = provider
            .access_key(&self.account_id, &self.sk.public_key())
            .await?;
        let mut nonce_guard = self.nonce.lock().await;
        *nonce_guard = access_key.nonce;
        Ok(())
    }

    /// Set the last used nonce to the given value.
    /// If `maybe_nonce` is `None`, it's fetched from the access key's on-chain state.
    pub async fn set_nonce(
        &mut self,
        maybe_nonce: Option<u64>,
        provider: &impl QueryProvider,
    ) -> Result<()> {
        if let Some(nonce) = maybe_nonce {
            let mut nonce_guard = self.nonce.lock().await;
            *nonce_guard = nonce;
        } else {
            self.init_nonce(provider).await?;
        }
        Ok(())
    }

    /// Last nonce this wallet used or observed.
    pub async fn nonce(&self) -> u64 {
        *self.nonce.lock().await
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;
    use std::sync::Mutex as StdMutex;

    use super::*;
    use async_trait::async_trait;
    use nearcast_provider::message::FunctionCallAction;
    use nearcast_provider::query::AccessKeyInfo;
    use nearcast_provider::tx::{TxProvider, TxStatus};
    use nearcast_provider::types::CryptoHash;
    use serde_json::json;

    /// Node stand-in: reports an access key with nonce 65 and records
    /// whatever gets broadcast.
    struct MockProvider {
        key_nonce: u64,
        broadcast: StdMutex<Vec<SignedTransaction>>,
    }

    impl Default for MockProvider {
        fn default() -> Self {
            Self {
                key_nonce: 65,
                broadcast: Default::default(),
            }
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
                "nonce": self.key_nonce,
                "permission": "FullAccess",
                "block_height": 580876,
                "block_hash": "GGJQ8yjmo7aEoj8ZpAhGehnq9BSWFx4xswHYzDwwAP2n"
            }))?)
        }

        async fn tx_status(
            &self,
            hash: &CryptoHash,
            _sender_id: &AccountId,
        ) -> Result<FinalExecutionOutcome> {
            Err(Error::NotFound(hash.to_string()))
        }
    }

    #[async_trait]
    impl TxProvider for MockProvider {
        async fn perform<F, T>(
            &self,
            tx: SignedTransaction,
            _broadcast_mode: BroadcastMode,
            _f: F,
        ) -> Result<TxResult<T>>
        where
            F: FnOnce(&FinalExecutionOutcome) -> Result<T> + Sync + Send,
            T: Sync + Send,
        {
            let hash = tx.hash()?;
            self.broadcast.lock().unwrap().push(tx);
            Ok(TxResult::rejected(hash, json!("mocked")))
        }
    }

    fn wallet() -> Wallet {
        Wallet::new_ed25519(
            crate::key::random_secretkey(),
            AccountId::from_str("a.test").unwrap(),
        )
    }

    fn claim() -> Vec<Action> {
        vec![Action::function_call(
            FunctionCallAction::json(
                "claim",
                &json!({"account_id": "b.test"}),
                300_000_000_000_000,
                0,
            )
            .unwrap(),
        )]
    }

    #[tokio::test]
    async fn test_set_nonce() {
        let mock_provider = MockProvider::default();
        let mut wallet = wallet();

        // Test setting a specific nonce value
        wallet.set_nonce(Some(50), &mock_provider).await.unwrap();
        assert_eq!(wallet.nonce().await, 50);

        // Test initializing nonce from provider
        wallet.set_nonce(None, &mock_provider).await.unwrap();
        assert_eq!(wallet.nonce().await, 65);
    }

    #[tokio::test]
    async fn sends_signed_transaction_with_next_nonce() {
        let provider = MockProvider::default();
        let mut wallet = wallet();
        let receiver = AccountId::from_str("a.test").unwrap();

        let res = wallet
            .send_transaction(
                &provider,
                receiver.clone(),
                claim(),
                None,
                BroadcastMode::Commit,
                |_| Ok(()),
            )
            .await
            .unwrap();
        assert!(matches!(res.status, TxStatus::Rejected(_)));

        let sent = provider.broadcast.lock().unwrap().pop().unwrap();
        assert_eq!(sent.transaction.nonce, 66);
        assert_eq!(sent.transaction.receiver_id, receiver);
        assert_eq!(
            sent.transaction.block_hash.to_string(),
            "GGJQ8yjmo7aEoj8ZpAhGehnq9BSWFx4xswHYzDwwAP2n"
        );
        assert_eq!(res.hash, sent.hash().unwrap());
        wallet.verify_transaction(&sent).unwrap();

        // A second send from the same wallet moves past the local nonce.
        wallet
            .send_transaction(&provider, receiver, claim(), None, BroadcastMode::Commit, |_| {
                Ok(())
            })
            .await
            .unwrap();
        let sent = provider.broadcast.lock().unwrap().pop().unwrap();
        assert_eq!(sent.transaction.nonce, 67);
    }

    #[tokio::test]
    async fn rejects_used_nonce() {
        let provider = MockProvider::default();
        let mut wallet = wallet();
        let res = wallet
            .send_transaction(
                &provider,
                AccountId::from_str("b.test").unwrap(),
                claim(),
                Some(65),
                BroadcastMode::Commit,
                |_| Ok(()),
            )
            .await;
        assert!(matches!(res, Err(Error::Validation(_))));
        assert!(provider.broadcast.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn exhausted_key_nonce_is_validation_error() {
        let provider = MockProvider {
            key_nonce: u64::MAX,
            ..Default::default()
        };
        let mut wallet = wallet();
        let res = wallet
            .send_transaction(
                &provider,
                AccountId::from_str("b.test").unwrap(),
                claim(),
                None,
                BroadcastMode::Commit,
                |_| Ok(()),
            )
            .await;
        assert!(matches!(res, Err(Error::Validation(ref m)) if m.contains("exhausted")));
        assert!(provider.broadcast.lock().unwrap().is_empty());
        assert_eq!(wallet.nonce().await, 0);
    }

    #[tokio::test]
    async fn rejects_empty_actions() {
        let provider = MockProvider::default();
        let mut wallet = wallet();
        let res = wallet
            .send_transaction(
                &provider,
                AccountId::from_str("b.test").unwrap(),
                vec![],
                None,
                BroadcastMode::Commit,
                |_| Ok(()),
            )
            .await;
        assert!(matches!(res, Err(Error::Validation(_))));
        // The failed build must not consume a nonce.
        assert_eq!(wallet.nonce().await, 0);
    }

    #[test]
    fn tampered_transaction_fails_verification() {
        let wallet = wallet();
        let tx = TransactionBuilder::new(
            wallet.account_id().clone(),
            wallet.public_key().unwrap(),
            AccountId::from_str("b.test").unwrap(),
        )
        .nonce(1)
        .actions(claim())
        .build()
        .unwrap();
        let mut signed = wallet.sign_transaction(tx).unwrap();
        wallet.verify_transaction(&signed).unwrap();

        signed.transaction.nonce = 2;
        assert!(matches!(
            wallet.verify_transaction(&signed),
            Err(Error::Signing(_))
        ));
    }

    #[test]
    fn refuses_foreign_public_key() {
        let wallet = wallet();
        let tx = TransactionBuilder::new(
            wallet.account_id().clone(),
            crate::key::random_secretkey().public_key(),
            AccountId::from_str("b.test").unwrap(),
        )
        .nonce(1)
        .actions(claim())
        .build()
        .unwrap();
        assert!(matches!(
            wallet.sign_transaction(tx),
            Err(Error::Signing(_))
        ));
    }
}
