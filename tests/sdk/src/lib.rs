// Copyright 2025 Nearcast Contributors
// SPDX-License-Identifier: Apache-2.0, MIT
mod account;
mod tx;

#[cfg(test)]
pub mod test_utils {
    use std::str::FromStr;
    use std::{env, fs, path::Path};

    use nearcast_provider::types::AccountId;
    use nearcast_sdk::network::{self, NetworkConfig};
    use nearcast_signer::{key::parse_secret_key, Wallet};

    const DEFAULT_TEST_TARGET_NETWORK_CONFIG_PATH: &str = "~/.config/nearcast/networks.toml";
    const DEFAULT_TEST_TARGET_NETWORK: &str = "localnet";

    pub fn get_network_config() -> NetworkConfig {
        let network_config_path = env::var("TEST_TARGET_NETWORK_CONFIG")
            .unwrap_or_else(|_| DEFAULT_TEST_TARGET_NETWORK_CONFIG_PATH.to_string());
        let network_config_path = shellexpand::full(network_config_path.as_str()).unwrap();
        let network_config_path = Path::new(network_config_path.as_ref());
        let mut specs = network::default_networks().unwrap();
        if network_config_path.exists() {
            let file_content = fs::read_to_string(network_config_path).unwrap();
            specs.extend(toml::from_str::<std::collections::HashMap<_, _>>(&file_content).unwrap());
        }
        let network = env::var("NEARCAST_NETWORK")
            .unwrap_or_else(|_| DEFAULT_TEST_TARGET_NETWORK.to_string());
        specs
            .remove(&network)
            .unwrap()
            .into_network_config()
            .unwrap()
    }

    /// The wallet the live tests run with, from `NEARCAST_ACCOUNT_ID` and
    /// `NEARCAST_PRIVATE_KEY`. `None` skips the test.
    pub fn get_runner_wallet() -> Option<Wallet> {
        let account_id = env::var("NEARCAST_ACCOUNT_ID").ok().filter(|s| !s.is_empty())?;
        let sk = env::var("NEARCAST_PRIVATE_KEY").ok().filter(|s| !s.is_empty())?;
        Some(Wallet::new_ed25519(
            parse_secret_key(&sk).unwrap(),
            AccountId::from_str(&account_id).unwrap(),
        ))
    }
}
