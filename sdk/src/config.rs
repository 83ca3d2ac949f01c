// Copyright 2025 Nearcast Contributors
// SPDX-License-Identifier: Apache-2.0, MIT

//! Transaction files.
//!
//! A transaction can be described in TOML and sent as-is:
//!
//! ```toml
//! signer_id = "alice.testnet"
//! receiver_id = "game.testnet"
//! network = "testnet"
//!
//! [[actions]]
//! type = "function_call"
//! method_name = "claim"
//! args = { account_id = "alice.testnet" }
//! gas = "300 Tgas"
//!
//! [[actions]]
//! type = "transfer"
//! amount = "0.5"
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use nearcast_provider::message::{
    AccessKey, Action, CreateAccountAction, DeleteAccountAction, FunctionCallAction,
};
use nearcast_provider::types::{AccountId, PublicKey};
use nearcast_provider::util::{parse_gas, parse_near_amount};
use nearcast_provider::{Error, Result};

use crate::network::Network;
use crate::tx::DEFAULT_CALL_GAS;

/// A transaction read from a TOML file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TxConfig {
    pub signer_id: AccountId,
    pub receiver_id: AccountId,
    /// Network the transaction is meant for. Takes precedence over the
    /// default network, not over an explicit one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub network: Option<Network>,
    pub actions: Vec<ActionSpec>,
}

/// One action of a [`TxConfig`]. Amounts and gas are strings in the
/// formats accepted by [`parse_near_amount`] and [`parse_gas`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ActionSpec {
    CreateAccount,
    FunctionCall {
        method_name: String,
        #[serde(default)]
        args: Option<Value>,
        #[serde(default)]
        gas: Option<String>,
        #[serde(default)]
        deposit: Option<String>,
    },
    Transfer {
        amount: String,
    },
    /// A full access key unless `receiver_id` restricts it to calls.
    AddKey {
        public_key: PublicKey,
        #[serde(default)]
        receiver_id: Option<AccountId>,
        #[serde(default)]
        method_names: Vec<String>,
        #[serde(default)]
        allowance: Option<String>,
    },
    DeleteKey {
        public_key: PublicKey,
    },
    DeleteAccount {
        beneficiary_id: AccountId,
    },
}

impl ActionSpec {
    pub fn to_action(&self) -> Result<Action> {
        Ok(match self {
            ActionSpec::CreateAccount => Action::CreateAccount(CreateAccountAction),
            ActionSpec::FunctionCall {
                method_name,
                args,
                gas,
                deposit,
            } => {
                let args = args
                    .clone()
                    .unwrap_or_else(|| Value::Object(Default::default()));
                let gas = gas.as_deref().map(parse_gas).transpose()?;
                let deposit = deposit.as_deref().map(parse_near_amount).transpose()?;
                Action::function_call(FunctionCallAction::json(
                    method_name.as_str(),
                    &args,
                    gas.unwrap_or(DEFAULT_CALL_GAS),
                    deposit.unwrap_or_default(),
                )?)
            }
            ActionSpec::Transfer { amount } => Action::transfer(parse_near_amount(amount)?),
            ActionSpec::AddKey {
                public_key,
                receiver_id,
                method_names,
                allowance,
            } => {
                let access_key = match receiver_id {
                    Some(receiver_id) => AccessKey::function_call(
                        receiver_id.clone(),
                        method_names.clone(),
                        allowance.as_deref().map(parse_near_amount).transpose()?,
                    ),
                    None if method_names.is_empty() && allowance.is_none() => {
                        AccessKey::full_access()
                    }
                    None => {
                        return Err(Error::validation(
                            "add_key with method_names or allowance needs a receiver_id",
                        ))
                    }
                };
                Action::add_key(*public_key, access_key)
            }
            ActionSpec::DeleteKey { public_key } => Action::delete_key(*public_key),
            ActionSpec::DeleteAccount { beneficiary_id } => {
                Action::DeleteAccount(DeleteAccountAction {
                    beneficiary_id: beneficiary_id.clone(),
                })
            }
        })
    }
}

impl TxConfig {
    pub fn from_toml(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(|e| Error::validation(format!("invalid transaction file: {e}")))
    }

    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            Error::validation(format!("cannot read transaction file {}: {e}", path.display()))
        })?;
        Self::from_toml(&content)
    }

    /// Converts every action, failing on the first malformed one.
    pub fn actions(&self) -> Result<Vec<Action>> {
        if self.actions.is_empty() {
            return Err(Error::validation("transaction file has no actions"));
        }
        self.actions
            .iter()
            .enumerate()
            .map(|(i, a)| {
                a.to_action()
                    .map_err(|e| Error::validation(format!("action {i}: {e}")))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use nearcast_provider::message::AccessKeyPermission;
    use nearcast_provider::util::{GAS_PER_TGAS, YOCTO_PER_NEAR};

    use super::*;

    const PK: &str = "ed25519:DcA2MzgpJbrUATQLLceocVckhhAqrkingax4oJ9kZ847";

    #[test]
    fn parses_transaction_file() {
        let config = TxConfig::from_toml(&format!(
            r#"
            signer_id = "a.test"
            receiver_id = "game.test"
            network = "localnet"

            [[actions]]
            type = "function_call"
            method_name = "claim"
            args = {{ account_id = "b.test" }}
            gas = "300 Tgas"

            [[actions]]
            type = "transfer"
            amount = "1.5"

            [[actions]]
            type = "add_key"
            public_key = "{PK}"
            receiver_id = "game.test"
            method_names = ["claim"]
            allowance = "0.25"

            [[actions]]
            type = "add_key"
            public_key = "{PK}"

            [[actions]]
            type = "delete_key"
            public_key = "{PK}"
            "#
        ))
        .unwrap();
        assert_eq!(config.network, Some(Network::Localnet));

        let actions = config.actions().unwrap();
        assert_eq!(actions.len(), 5);

        let Action::FunctionCall(call) = &actions[0] else {
            panic!("expected a function call");
        };
        assert_eq!(call.args, br#"{"account_id":"b.test"}"#.to_vec());
        assert_eq!(call.gas, 300 * GAS_PER_TGAS);
        assert_eq!(call.deposit, 0);

        assert_eq!(actions[1].deposit(), 3 * YOCTO_PER_NEAR / 2);

        let Action::AddKey(limited) = &actions[2] else {
            panic!("expected add key");
        };
        let AccessKeyPermission::FunctionCall(p) = &limited.access_key.permission else {
            panic!("expected a function call key");
        };
        assert_eq!(p.allowance, Some(YOCTO_PER_NEAR / 4));
        assert_eq!(p.method_names, vec!["claim".to_string()]);

        let Action::AddKey(full) = &actions[3] else {
            panic!("expected add key");
        };
        assert_eq!(full.access_key, AccessKey::full_access());
        assert!(matches!(actions[4], Action::DeleteKey(_)));
    }

    #[test]
    fn call_defaults() {
        let spec = ActionSpec::FunctionCall {
            method_name: "ping".into(),
            args: None,
            gas: None,
            deposit: None,
        };
        let Action::FunctionCall(call) = spec.to_action().unwrap() else {
            panic!("expected a function call");
        };
        assert_eq!(call.args, b"{}".to_vec());
        assert_eq!(call.gas, DEFAULT_CALL_GAS);
    }

    #[test]
    fn rejects_bad_files() {
        // no actions
        let config = TxConfig::from_toml(
            r#"
            signer_id = "a.test"
            receiver_id = "b.test"
            actions = []
            "#,
        )
        .unwrap();
        assert!(matches!(config.actions(), Err(Error::Validation(_))));

        // unknown action type
        assert!(matches!(
            TxConfig::from_toml(
                r#"
                signer_id = "a.test"
                receiver_id = "b.test"
                [[actions]]
                type = "teleport"
                "#
            ),
            Err(Error::Validation(_))
        ));

        // invalid account id
        assert!(TxConfig::from_toml(
            r#"
            signer_id = "A.test"
            receiver_id = "b.test"
            actions = []
            "#
        )
        .is_err());

        // restricted key without a receiver
        let spec = ActionSpec::AddKey {
            public_key: PK.parse().unwrap(),
            receiver_id: None,
            method_names: vec!["claim".into()],
            allowance: None,
        };
        assert!(matches!(spec.to_action(), Err(Error::Validation(_))));

        let spec = ActionSpec::Transfer {
            amount: "lots".into(),
        };
        assert!(matches!(spec.to_action(), Err(Error::Validation(_))));
    }

    #[tokio::test]
    async fn missing_file_is_validation_error() {
        assert!(matches!(
            TxConfig::from_file("/nonexistent/tx.toml").await,
            Err(Error::Validation(_))
        ));
    }
}
