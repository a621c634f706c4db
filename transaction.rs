//! Contract-invocation transactions and their lifecycle stages.
//!
//! A [`PendingOperation`] is built unsigned, turned into a
//! [`PreparedOperation`] once simulation has discovered its resource
//! footprint, and wrapped in a [`TransactionEnvelope`] for signing and
//! submission. Each stage consumes the previous one.

use std::time::{SystemTime, UNIX_EPOCH};

use base64::Engine;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::{
    rpc::{AccountState, SimulationResult},
    types::{LedgerId, MintClientError, SettlementId},
    value::ContractValue,
};

/// A single call of a contract function.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractInvocation {
    pub contract_id: LedgerId,
    pub function_name: String,
    pub args: Vec<ContractValue>,
}

impl ContractInvocation {
    pub fn new(contract_id: &str, function_name: &str, args: Vec<ContractValue>) -> Self {
        Self {
            contract_id: contract_id.to_string(),
            function_name: function_name.to_string(),
            args,
        }
    }
}

/// Validity window in unix seconds; `min_time = 0` means no lower bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeBounds {
    pub min_time: u64,
    pub max_time: u64,
}

impl TimeBounds {
    /// Window closing `timeout_secs` after `now`.
    pub fn expiring_after(now: u64, timeout_secs: u64) -> Self {
        Self {
            min_time: 0,
            max_time: now.saturating_add(timeout_secs),
        }
    }
}

/// Unsigned single-invocation transaction bound to a fee-payer account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingOperation {
    pub source_account: LedgerId,
    pub sequence: i64,
    pub fee: u32,
    pub time_bounds: TimeBounds,
    pub invocation: ContractInvocation,
}

impl PendingOperation {
    /// Build the next transaction for `account`, valid for `timeout_secs`
    /// from now.
    pub fn build(
        account: &AccountState,
        invocation: ContractInvocation,
        fee: u32,
        timeout_secs: u64,
    ) -> Result<Self, MintClientError> {
        Self::build_at(account, invocation, fee, unix_now(), timeout_secs)
    }

    pub fn build_at(
        account: &AccountState,
        invocation: ContractInvocation,
        fee: u32,
        now: u64,
        timeout_secs: u64,
    ) -> Result<Self, MintClientError> {
        let sequence = account.sequence.checked_add(1).ok_or_else(|| {
            MintClientError::Rpc(format!(
                "account {} has exhausted its sequence numbers",
                account.account_id
            ))
        })?;
        Ok(Self {
            source_account: account.account_id.clone(),
            sequence,
            fee,
            time_bounds: TimeBounds::expiring_after(now, timeout_secs),
            invocation,
        })
    }
}

/// Footprint and resource usage discovered by simulation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceFootprint {
    pub read_only: Vec<String>,
    pub read_write: Vec<String>,
    pub instructions: u64,
    pub read_bytes: u32,
    pub write_bytes: u32,
}

/// Resource-annotated transaction, still unsigned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreparedOperation {
    pub operation: PendingOperation,
    pub footprint: ResourceFootprint,
    pub resource_fee: i64,
}

impl PreparedOperation {
    /// Attach the footprint and resource fee of `simulation` to `operation`.
    pub fn assemble(operation: PendingOperation, simulation: &SimulationResult) -> Self {
        Self {
            operation,
            footprint: simulation.footprint.clone(),
            resource_fee: simulation.min_resource_fee,
        }
    }

    /// Inclusion fee plus resource fee.
    pub fn total_fee(&self) -> i64 {
        i64::from(self.operation.fee) + self.resource_fee
    }

    /// Network-bound transaction hash: `sha256(sha256(passphrase) || tx)`.
    pub fn hash(&self, network_passphrase: &str) -> Result<SettlementId, MintClientError> {
        let body = bincode::serialize(self).map_err(|e| MintClientError::Encoding(e.to_string()))?;
        let network_id = Sha256::digest(network_passphrase.as_bytes());

        let mut hasher = Sha256::new();
        hasher.update(network_id);
        hasher.update(&body);
        Ok(hex::encode(hasher.finalize()))
    }
}

/// Signature attached by the wallet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecoratedSignature {
    /// Last bytes of the signer's public key
    pub hint: Vec<u8>,
    pub signature: Vec<u8>,
}

/// Prepared transaction plus the signatures collected so far.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionEnvelope {
    pub tx: PreparedOperation,
    pub signatures: Vec<DecoratedSignature>,
}

impl TransactionEnvelope {
    pub fn unsigned(tx: PreparedOperation) -> Self {
        Self {
            tx,
            signatures: Vec::new(),
        }
    }

    pub fn is_signed(&self) -> bool {
        !self.signatures.is_empty()
    }

    /// Canonical encoding handed to wallets and RPC: base64 of bincode.
    pub fn to_encoding(&self) -> Result<String, MintClientError> {
        encode_base64(self)
    }

    pub fn from_encoding(encoded: &str) -> Result<Self, MintClientError> {
        decode_base64(encoded)
    }
}

/// base64 of the bincode serialization of `value`.
pub fn encode_base64<T: Serialize + ?Sized>(value: &T) -> Result<String, MintClientError> {
    let bytes = bincode::serialize(value).map_err(|e| MintClientError::Encoding(e.to_string()))?;
    Ok(base64::engine::general_purpose::STANDARD.encode(bytes))
}

pub fn decode_base64<T: DeserializeOwned>(encoded: &str) -> Result<T, MintClientError> {
    let bytes = base64::engine::general_purpose::STANDARD
        .decode(encoded.trim())
        .map_err(|e| MintClientError::Encoding(format!("invalid base64: {e}")))?;
    bincode::deserialize(&bytes).map_err(|e| MintClientError::Encoding(e.to_string()))
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs())
        .unwrap_or_default()
}
