//! Data types for the GBT mint client.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::amount::{FeeRateBps, ScaledAmount, TokenQuantity};

/// Opaque ledger address of an account or contract.
pub type LedgerId = String;

/// Transaction hash returned by the network once a submission is accepted.
pub type SettlementId = String;

/// Error types for the mint client
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MintClientError {
    #[error("Simulation failed: {0}")]
    SimulationFailed(String),

    #[error("Simulation succeeded but returned no value")]
    MissingReturnValue,

    #[error("Invalid token quantity: {0}")]
    InvalidQuantity(String),

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Oracle reported an invalid price: {0}")]
    OraclePriceInvalid(ScaledAmount),

    #[error("Quote does not meet the minimum mint threshold (output {output_qty})")]
    BelowMinimumThreshold { output_qty: TokenQuantity },

    #[error("Transaction rejected by the network: {0}")]
    SubmissionRejected(String),

    #[error("Transaction outcome unknown, check the ledger before retrying: {0}")]
    SubmissionOutcomeUnknown(String),

    #[error("Wallet failed to sign: {0}")]
    SigningFailed(String),

    #[error(
        "No candidate entry point succeeded (tried {}): {}",
        .attempted.join(", "),
        .last_error
    )]
    NoCandidateSucceeded {
        attempted: Vec<String>,
        last_error: Box<MintClientError>,
    },

    #[error("Wallet is on network {actual:?}, expected {expected:?}")]
    NetworkMismatch { expected: String, actual: String },

    #[error("RPC transport error: {0}")]
    Rpc(String),

    #[error("Failed to decode contract value: {0}")]
    Decode(String),

    #[error("Failed to encode or decode transaction: {0}")]
    Encoding(String),

    #[error("Amount {0} does not fit the contract's i128 range")]
    AmountOutOfRange(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result of a `preview_mint` simulation.
///
/// Advisory only: the ledger may observe a different price or capacity
/// when the real mint is included.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quote {
    /// GBT the minter would issue, in milli-grams
    pub output_qty: TokenQuantity,
    /// Stable amount left after the mint fee
    pub net_input: ScaledAmount,
    /// Mint fee charged on the gross input
    pub fee_input: ScaledAmount,
    /// Oracle price per gram at simulation time
    pub price: ScaledAmount,
    /// Whether the output reaches the contract's 1 gram minimum
    pub meets_minimum: bool,
    /// Mine capacity left after this mint, in milli-grams
    pub remaining_capacity: TokenQuantity,
}

/// Gross stable input sized to obtain a target GBT quantity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchasePlan {
    /// Gross stable amount to pass to `mint`
    pub gross: ScaledAmount,
    /// Fee rate estimated from the trial simulation
    pub fee_rate: FeeRateBps,
    /// Net stable amount the target quantity requires at the trial price
    pub needed_net: ScaledAmount,
    /// Authoritative quote simulated with `gross`
    pub quote: Quote,
}

/// Balances and oracle state read in one refresh.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReserveSnapshot {
    /// Stable balance held by each treasury pool, in pool order
    pub pool_balances: Vec<(LedgerId, ScaledAmount)>,
    /// GBT held by the project vault (token base units)
    pub vault_token_balance: num_bigint::BigInt,
    /// `total_locked` reported by the vault
    pub vault_total_locked: num_bigint::BigInt,
    /// Oracle price per gram
    pub oracle_price: ScaledAmount,
}
