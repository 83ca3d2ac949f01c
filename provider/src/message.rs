// Copyright 2025 Nearcast Contributors
// SPDX-License-Identifier: Apache-2.0, MIT

use base64::Engine;
use borsh::{BorshDeserialize, BorshSerialize};
use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::error::{Error, Result};
use crate::types::{AccountId, CryptoHash, PublicKey, Signature};

/// Create a new account at the transaction's receiver ID.
#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct CreateAccountAction;

/// Deploy Wasm code to the receiver account.
#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct DeployContractAction {
    pub code: Vec<u8>,
}

/// Call a contract method.
#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct FunctionCallAction {
    pub method_name: String,
    /// Call arguments, JSON encoded by convention.
    pub args: Vec<u8>,
    /// Prepaid gas.
    pub gas: u64,
    /// Attached deposit in yoctoNEAR.
    pub deposit: u128,
}

impl FunctionCallAction {
    /// Builds a call whose arguments are serialized as JSON.
    pub fn json<A: Serialize>(
        method_name: impl Into<String>,
        args: &A,
        gas: u64,
        deposit: u128,
    ) -> Result<Self> {
        let args = serde_json::to_vec(args)
            .map_err(|e| Error::validation(format!("cannot encode call arguments: {e}")))?;
        Ok(Self {
            method_name: method_name.into(),
            args,
            gas,
            deposit,
        })
    }
}

/// Transfer tokens to the receiver account.
#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct TransferAction {
    pub deposit: u128,
}

/// Stake tokens with the given validator key.
#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct StakeAction {
    pub stake: u128,
    pub public_key: PublicKey,
}

/// Scope of an access key.
#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub enum AccessKeyPermission {
    FunctionCall(FunctionCallPermission),
    FullAccess,
}

/// Restricts a key to calling `method_names` (all methods when empty) on
/// `receiver_id`, spending at most `allowance` yoctoNEAR on gas.
#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct FunctionCallPermission {
    pub allowance: Option<u128>,
    pub receiver_id: AccountId,
    pub method_names: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct AccessKey {
    /// Starting nonce, normally zero; the chain overrides it on insertion.
    pub nonce: u64,
    pub permission: AccessKeyPermission,
}

impl AccessKey {
    pub fn full_access() -> Self {
        Self {
            nonce: 0,
            permission: AccessKeyPermission::FullAccess,
        }
    }

    pub fn function_call(
        receiver_id: AccountId,
        method_names: Vec<String>,
        allowance: Option<u128>,
    ) -> Self {
        Self {
            nonce: 0,
            permission: AccessKeyPermission::FunctionCall(FunctionCallPermission {
                allowance,
                receiver_id,
                method_names,
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct AddKeyAction {
    pub public_key: PublicKey,
    pub access_key: AccessKey,
}

#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct DeleteKeyAction {
    pub public_key: PublicKey,
}

#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct DeleteAccountAction {
    pub beneficiary_id: AccountId,
}

/// An atomic operation within a transaction.
///
/// Variant order is the wire tag and must not change.
#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub enum Action {
    CreateAccount(CreateAccountAction),
    DeployContract(DeployContractAction),
    FunctionCall(Box<FunctionCallAction>),
    Transfer(TransferAction),
    Stake(Box<StakeAction>),
    AddKey(Box<AddKeyAction>),
    DeleteKey(Box<DeleteKeyAction>),
    DeleteAccount(DeleteAccountAction),
}

impl Action {
    pub fn function_call(action: FunctionCallAction) -> Self {
        Action::FunctionCall(Box::new(action))
    }

    pub fn transfer(deposit: u128) -> Self {
        Action::Transfer(TransferAction { deposit })
    }

    pub fn add_key(public_key: PublicKey, access_key: AccessKey) -> Self {
        Action::AddKey(Box::new(AddKeyAction {
            public_key,
            access_key,
        }))
    }

    pub fn delete_key(public_key: PublicKey) -> Self {
        Action::DeleteKey(Box::new(DeleteKeyAction { public_key }))
    }

    pub fn stake(stake: u128, public_key: PublicKey) -> Self {
        Action::Stake(Box::new(StakeAction { stake, public_key }))
    }

    /// Short action name used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Action::CreateAccount(_) => "create_account",
            Action::DeployContract(_) => "deploy_contract",
            Action::FunctionCall(_) => "function_call",
            Action::Transfer(_) => "transfer",
            Action::Stake(_) => "stake",
            Action::AddKey(_) => "add_key",
            Action::DeleteKey(_) => "delete_key",
            Action::DeleteAccount(_) => "delete_account",
        }
    }

    /// Prepaid gas carried by this action.
    pub fn gas(&self) -> u64 {
        match self {
            Action::FunctionCall(a) => a.gas,
            _ => 0,
        }
    }

    /// Tokens this action moves out of the signer's balance.
    pub fn deposit(&self) -> u128 {
        match self {
            Action::FunctionCall(a) => a.deposit,
            Action::Transfer(a) => a.deposit,
            _ => 0,
        }
    }

    fn validate(&self) -> Result<()> {
        match self {
            Action::FunctionCall(a) => {
                if a.method_name.is_empty() {
                    return Err(Error::validation("function call method name is empty"));
                }
                if a.gas == 0 {
                    return Err(Error::validation(format!(
                        "function call '{}' has no gas attached",
                        a.method_name
                    )));
                }
            }
            Action::AddKey(a) => {
                if let AccessKeyPermission::FunctionCall(p) = &a.access_key.permission {
                    if p.method_names.iter().any(|m| m.is_empty()) {
                        return Err(Error::validation("access key method names cannot be empty"));
                    }
                }
            }
            _ => {}
        }
        Ok(())
    }
}

/// An unsigned transaction.
///
/// Field order is the canonical wire order.
#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct Transaction {
    pub signer_id: AccountId,
    pub public_key: PublicKey,
    pub nonce: u64,
    pub receiver_id: AccountId,
    /// Recent block hash; the node rejects stale ones.
    pub block_hash: CryptoHash,
    pub actions: Vec<Action>,
}

impl Transaction {
    /// Checks the invariants every well-formed transaction holds.
    pub fn validate(&self) -> Result<()> {
        if self.actions.is_empty() {
            return Err(Error::validation("transaction has no actions"));
        }
        if self.nonce == 0 {
            return Err(Error::validation("transaction nonce must be positive"));
        }
        let mut gas: u64 = 0;
        let mut deposit: u128 = 0;
        for action in &self.actions {
            action.validate()?;
            gas = gas
                .checked_add(action.gas())
                .ok_or_else(|| Error::validation("total prepaid gas overflows u64"))?;
            deposit = deposit
                .checked_add(action.deposit())
                .ok_or_else(|| Error::validation("total deposit overflows u128"))?;
        }
        Ok(())
    }

    /// Returns the transaction hash under the default schema.
    pub fn hash(&self) -> Result<CryptoHash> {
        BorshSchemaV0::hash(self)
    }
}

/// Assembles a [`Transaction`], validating it on [`build`](Self::build).
#[derive(Debug, Clone)]
pub struct TransactionBuilder {
    signer_id: AccountId,
    public_key: PublicKey,
    receiver_id: AccountId,
    nonce: u64,
    block_hash: CryptoHash,
    actions: Vec<Action>,
}

impl TransactionBuilder {
    pub fn new(signer_id: AccountId, public_key: PublicKey, receiver_id: AccountId) -> Self {
        Self {
            signer_id,
            public_key,
            receiver_id,
            nonce: 0,
            block_hash: CryptoHash::default(),
            actions: vec![],
        }
    }

    pub fn nonce(mut self, nonce: u64) -> Self {
        self.nonce = nonce;
        self
    }

    pub fn block_hash(mut self, block_hash: CryptoHash) -> Self {
        self.block_hash = block_hash;
        self
    }

    pub fn action(mut self, action: Action) -> Self {
        self.actions.push(action);
        self
    }

    pub fn actions(mut self, actions: impl IntoIterator<Item = Action>) -> Self {
        self.actions.extend(actions);
        self
    }

    pub fn build(self) -> Result<Transaction> {
        let tx = Transaction {
            signer_id: self.signer_id,
            public_key: self.public_key,
            nonce: self.nonce,
            receiver_id: self.receiver_id,
            block_hash: self.block_hash,
            actions: self.actions,
        };
        tx.validate()?;
        Ok(tx)
    }
}

/// A transaction plus the signature over its hash.
#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct SignedTransaction {
    pub transaction: Transaction,
    pub signature: Signature,
}

impl SignedTransaction {
    pub fn new(transaction: Transaction, signature: Signature) -> Self {
        Self {
            transaction,
            signature,
        }
    }

    /// Hash of the inner transaction, which is also the on-chain transaction ID.
    pub fn hash(&self) -> Result<CryptoHash> {
        self.transaction.hash()
    }

    /// Base64 of the canonical encoding, as expected by the broadcast methods.
    pub fn to_base64(&self) -> Result<String> {
        let bytes = BorshSchemaV0::serialize_signed(self)?;
        Ok(base64::engine::general_purpose::STANDARD.encode(bytes))
    }

    /// Parses a base64 payload produced by [`to_base64`](Self::to_base64).
    pub fn from_base64(s: &str) -> Result<Self> {
        let bytes = base64::engine::general_purpose::STANDARD
            .decode(s.trim())
            .map_err(|e| Error::validation(format!("payload is not valid base64: {e}")))?;
        BorshSchemaV0::deserialize_signed(&bytes)
    }
}

/// The canonical encoding and digest the chain expects. The encoding is
/// defined by the chain, so it is kept behind a trait and versioned.
pub trait TxSchema {
    /// Schema identifier, reported in logs.
    const VERSION: &'static str;

    fn serialize_transaction(tx: &Transaction) -> Result<Vec<u8>>;

    fn serialize_signed(tx: &SignedTransaction) -> Result<Vec<u8>>;

    fn deserialize_signed(bytes: &[u8]) -> Result<SignedTransaction>;

    fn digest(bytes: &[u8]) -> CryptoHash;

    fn hash(tx: &Transaction) -> Result<CryptoHash> {
        Ok(Self::digest(&Self::serialize_transaction(tx)?))
    }
}

/// Borsh encoding of transaction V0 with SHA-256 digests.
#[derive(Debug, Clone, Copy, Default)]
pub struct BorshSchemaV0;

impl TxSchema for BorshSchemaV0 {
    const VERSION: &'static str = "borsh-v0";

    fn serialize_transaction(tx: &Transaction) -> Result<Vec<u8>> {
        borsh::to_vec(tx).map_err(|e| Error::validation(format!("cannot encode transaction: {e}")))
    }

    fn serialize_signed(tx: &SignedTransaction) -> Result<Vec<u8>> {
        borsh::to_vec(tx)
            .map_err(|e| Error::validation(format!("cannot encode signed transaction: {e}")))
    }

    fn deserialize_signed(bytes: &[u8]) -> Result<SignedTransaction> {
        borsh::from_slice(bytes)
            .map_err(|e| Error::validation(format!("payload is not a signed transaction: {e}")))
    }

    fn digest(bytes: &[u8]) -> CryptoHash {
        CryptoHash(Sha256::digest(bytes).into())
    }
}

/// Convenience method to serialize a [`Transaction`] for signing.
pub fn serialize(tx: &Transaction) -> Result<Vec<u8>> {
    BorshSchemaV0::serialize_transaction(tx)
}

/// Convenience method to serialize a [`SignedTransaction`] for broadcast.
pub fn serialize_signed(tx: &SignedTransaction) -> Result<Vec<u8>> {
    BorshSchemaV0::serialize_signed(tx)
}
