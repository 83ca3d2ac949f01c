// Copyright 2025 Nearcast Contributors
// SPDX-License-Identifier: Apache-2.0, MIT

use std::collections::HashMap;
use std::fmt::Display;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use anyhow::anyhow;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use tracing::debug;

use nearcast_provider::json_rpc::{JsonRpcProvider, RetryConfig, Url};

pub const DEFAULT_NETWORKS_PATH: &str = "~/.config/nearcast/networks.toml";

const DEFAULT_RPC_TIMEOUT: Duration = Duration::from_secs(60);

pub const MAINNET_NETWORK_NAME: &str = "mainnet";
const MAINNET_RPC_URL: &str = "https://rpc.mainnet.near.org";

pub const TESTNET_NETWORK_NAME: &str = "testnet";
const TESTNET_RPC_URL: &str = "https://rpc.testnet.near.org";

pub const LOCALNET_NETWORK_NAME: &str = "localnet";
const LOCALNET_RPC_URL: &str = "http://127.0.0.1:3030";

/// Built-in network presets keyed by name.
pub fn default_networks() -> anyhow::Result<HashMap<String, NetworkSpec>> {
    [Network::Mainnet, Network::Testnet, Network::Localnet]
        .into_iter()
        .map(|n| Ok((n.to_string(), n.spec()?)))
        .collect()
}

/// Load network specs from a TOML file, layered over the built-in presets.
///
/// A missing file is not an error; the presets are returned as-is.
pub fn load_networks(path: &str) -> anyhow::Result<HashMap<String, NetworkSpec>> {
    let path = shellexpand::full(path)?;
    let path = Path::new(path.as_ref());
    let mut specs = default_networks()?;
    if !path.exists() {
        return Ok(specs);
    }
    let content = std::fs::read_to_string(path)
        .map_err(|e| anyhow!("cannot read networks file {}: {e}", path.display()))?;
    let overrides: HashMap<String, NetworkSpec> = toml::from_str(&content)
        .map_err(|e| anyhow!("invalid networks file {}: {e}", path.display()))?;
    debug!(path = %path.display(), count = overrides.len(), "loaded network overrides");
    specs.extend(overrides);
    Ok(specs)
}

/// Serializable form of a network, as found in the networks file.
///
/// ```toml
/// [testnet]
/// rpc_url = "https://rpc.testnet.near.org"
/// rpc_timeout = "30s"
/// retry_max_elapsed = "2m"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkSpec {
    #[serde(serialize_with = "serialize_url", deserialize_with = "deserialize_url")]
    pub rpc_url: Url,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_duration",
        deserialize_with = "deserialize_duration"
    )]
    pub rpc_timeout: Option<Duration>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_duration",
        deserialize_with = "deserialize_duration"
    )]
    pub retry_max_elapsed: Option<Duration>,
}

fn serialize_url<S>(x: &Url, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(x.as_str())
}

fn deserialize_url<'de, D>(deserializer: D) -> Result<Url, D::Error>
where
    D: Deserializer<'de>,
{
    let buf = String::deserialize(deserializer)?;
    Url::from_str(&buf).map_err(serde::de::Error::custom)
}

fn serialize_duration<S>(x: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match x {
        Some(d) => serializer.serialize_str(&humantime::format_duration(*d).to_string()),
        None => serializer.serialize_none(),
    }
}

fn deserialize_duration<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
where
    D: Deserializer<'de>,
{
    let buf = String::deserialize(deserializer)?;
    humantime::parse_duration(&buf)
        .map(Some)
        .map_err(serde::de::Error::custom)
}

impl NetworkSpec {
    pub fn into_network_config(self) -> anyhow::Result<NetworkConfig> {
        if !matches!(self.rpc_url.scheme(), "http" | "https") {
            return Err(anyhow!(
                "rpc url '{}' must use http or https",
                self.rpc_url
            ));
        }
        let mut retry = RetryConfig::default();
        if let Some(max_elapsed) = self.retry_max_elapsed {
            retry.max_elapsed = max_elapsed;
        }
        Ok(NetworkConfig {
            rpc_url: self.rpc_url,
            rpc_timeout: self.rpc_timeout.unwrap_or(DEFAULT_RPC_TIMEOUT),
            retry,
        })
    }
}

/// Resolved connection settings for a network.
#[derive(Debug, Clone)]
pub struct NetworkConfig {
    pub rpc_url: Url,
    pub rpc_timeout: Duration,
    pub retry: RetryConfig,
}

impl NetworkConfig {
    /// Builds an HTTP JSON-RPC provider for this network.
    pub fn provider(&self) -> anyhow::Result<JsonRpcProvider> {
        Ok(JsonRpcProvider::new_http(
            self.rpc_url.clone(),
            Some(self.rpc_timeout),
            Some(self.retry),
        )?)
    }
}

/// Network presets for RPC URLs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub enum Network {
    /// Network presets for mainnet.
    Mainnet,
    /// Network presets for testnet.
    #[default]
    Testnet,
    /// Network presets for a local node.
    Localnet,
}

impl Network {
    fn rpc_url_str(&self) -> &'static str {
        match self {
            Network::Mainnet => MAINNET_RPC_URL,
            Network::Testnet => TESTNET_RPC_URL,
            Network::Localnet => LOCALNET_RPC_URL,
        }
    }

    pub fn rpc_url(&self) -> anyhow::Result<Url> {
        Ok(Url::from_str(self.rpc_url_str())?)
    }

    fn spec(&self) -> anyhow::Result<NetworkSpec> {
        Ok(NetworkSpec {
            rpc_url: self.rpc_url()?,
            rpc_timeout: None,
            retry_max_elapsed: None,
        })
    }

    pub fn get_config(&self) -> anyhow::Result<NetworkConfig> {
        self.spec()?.into_network_config()
    }
}

impl FromStr for Network {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            MAINNET_NETWORK_NAME => Ok(Network::Mainnet),
            TESTNET_NETWORK_NAME => Ok(Network::Testnet),
            LOCALNET_NETWORK_NAME => Ok(Network::Localnet),
            _ => Err(format!("unknown network '{s}'")),
        }
    }
}

impl Display for Network {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Network::Mainnet => write!(f, "{MAINNET_NETWORK_NAME}"),
            Network::Testnet => write!(f, "{TESTNET_NETWORK_NAME}"),
            Network::Localnet => write!(f, "{LOCALNET_NETWORK_NAME}"),
        }
    }
}

impl<'de> Deserialize<'de> for Network {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s: String = String::deserialize(deserializer)?;
        Network::from_str(&s).map_err(serde::de::Error::custom)
    }
}

impl Serialize for Network {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}
