//! Deployment configuration loaded from the environment.
//!
//! Every contract address the client talks to is deployment-specific, so
//! none are compiled in. `from_env` reads an optional `.env` file first and
//! then the `ALTERNUN_*` variables. `RPC_URL` names the deployment's
//! gateway (see [`crate::http_rpc`]) and has no default.

use std::env;

use serde::Deserialize;

use crate::{
    constants::{DEFAULT_MAX_MINE_ID, PUBLIC_PASSPHRASE, TESTNET_PASSPHRASE},
    simulation::ReserveAccounts,
    types::{LedgerId, MintClientError},
};

/// Prefix shared by every configuration variable
pub const ENV_PREFIX: &str = "ALTERNUN_";

/// Keys that must be present for [`DeploymentConfig::from_lookup`]
pub const REQUIRED_KEYS: [&str; 8] = [
    "RPC_URL",
    "NETWORK_PASSPHRASE",
    "ADMIN",
    "ORACLE",
    "GBT_MINTER",
    "GBT_TOKEN",
    "STABLE_TOKEN",
    "PROJECT_VAULT",
];

/// Known networks and their passphrases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NetworkPreset {
    Testnet,
    Public,
}

impl NetworkPreset {
    pub fn passphrase(self) -> &'static str {
        match self {
            NetworkPreset::Testnet => TESTNET_PASSPHRASE,
            NetworkPreset::Public => PUBLIC_PASSPHRASE,
        }
    }

    pub fn from_passphrase(passphrase: &str) -> Option<Self> {
        match passphrase {
            TESTNET_PASSPHRASE => Some(NetworkPreset::Testnet),
            PUBLIC_PASSPHRASE => Some(NetworkPreset::Public),
            _ => None,
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "testnet" => Some(NetworkPreset::Testnet),
            "public" | "mainnet" => Some(NetworkPreset::Public),
            _ => None,
        }
    }
}

/// Addresses and network settings of one deployment.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DeploymentConfig {
    pub rpc_url: String,
    pub network_passphrase: String,
    /// Admin account; pays for reads and signs admin operations
    pub admin: LedgerId,
    pub oracle: LedgerId,
    pub gbt_minter: LedgerId,
    pub gbt_token: LedgerId,
    pub stable_token: LedgerId,
    pub project_vault: LedgerId,
    #[serde(default)]
    pub treasury: Option<LedgerId>,
    #[serde(default)]
    pub max_mine_id: u32,
    /// Treasury pools reported in reserve snapshots
    #[serde(default)]
    pub pools: Vec<LedgerId>,
}

impl DeploymentConfig {
    /// Load from `.env` (if present) and the process environment.
    pub fn from_env() -> Result<Self, MintClientError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(format!("{ENV_PREFIX}{key}")).ok())
    }

    /// Build from any key lookup; keys are passed without the prefix.
    ///
    /// `NETWORK_PASSPHRASE` also accepts a preset name (`testnet`,
    /// `public`).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, MintClientError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let network_passphrase = get("NETWORK_PASSPHRASE").map(|value| {
            NetworkPreset::from_name(&value)
                .map(|preset| preset.passphrase().to_string())
                .unwrap_or(value)
        });

        let missing = missing_keys(|key| match key {
            "NETWORK_PASSPHRASE" => network_passphrase.clone(),
            other => get(other),
        });
        if !missing.is_empty() {
            return Err(MintClientError::Config(format!(
                "missing {}",
                missing
                    .iter()
                    .map(|key| format!("{ENV_PREFIX}{key}"))
                    .collect::<Vec<_>>()
                    .join(", ")
            )));
        }

        let max_mine_id = match get("MAX_MINE_ID") {
            Some(raw) => raw.parse().map_err(|_| {
                MintClientError::Config(format!("{ENV_PREFIX}MAX_MINE_ID is not a u32: {raw:?}"))
            })?,
            None => DEFAULT_MAX_MINE_ID,
        };
        let pools = get("POOLS")
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|pool| !pool.is_empty())
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default();

        // Presence was checked above
        let required = |key: &str| get(key).unwrap_or_default();
        Ok(Self {
            rpc_url: required("RPC_URL"),
            network_passphrase: network_passphrase.unwrap_or_default(),
            admin: required("ADMIN"),
            oracle: required("ORACLE"),
            gbt_minter: required("GBT_MINTER"),
            gbt_token: required("GBT_TOKEN"),
            stable_token: required("STABLE_TOKEN"),
            project_vault: required("PROJECT_VAULT"),
            treasury: get("TREASURY"),
            max_mine_id,
            pools,
        })
    }

    pub fn network(&self) -> Option<NetworkPreset> {
        NetworkPreset::from_passphrase(&self.network_passphrase)
    }

    /// Accounts for a reserve snapshot, with the admin as fee payer.
    pub fn reserve_accounts(&self) -> ReserveAccounts {
        ReserveAccounts {
            stable_token: self.stable_token.clone(),
            gbt_token: self.gbt_token.clone(),
            vault: self.project_vault.clone(),
            oracle: self.oracle.clone(),
            pools: self.pools.clone(),
            fee_payer: self.admin.clone(),
        }
    }
}

/// Required keys (unprefixed) for which `lookup` yields nothing usable.
pub fn missing_keys<F>(lookup: F) -> Vec<&'static str>
where
    F: Fn(&str) -> Option<String>,
{
    REQUIRED_KEYS
        .iter()
        .copied()
        .filter(|key| lookup(*key).map_or(true, |value| value.trim().is_empty()))
        .collect()
}
