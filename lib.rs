//! # GBT Mint Client
//!
//! A Rust library for quoting and submitting GBT (gold-backed token) mint,
//! deposit and withdrawal operations against the Alternun contracts.
//!
//! ## Problem
//!
//! The minter charges a percentage fee and converts the remaining stable
//! amount at the oracle price, flooring the result. Asking "how much do I
//! pay for N grams" therefore has no closed-form answer on the client: the
//! fee rate and price live on the ledger and may change between calls.
//!
//! ## Solution
//!
//! This crate provides functionality to:
//! 1. **Simulate** read-only contract calls (balances, oracle price,
//!    `preview_mint`) without signing anything
//! 2. **Quote** the smallest gross stable input that mints a target
//!    quantity, using round-up integer arithmetic and a verifying preview
//! 3. **Submit** invocations through simulate, prepare, external signing and
//!    send, never signing a transaction whose simulation failed
//! 4. **Withdraw** from vaults whose withdrawal entry point differs between
//!    deployments, by trying the known names in order
//!
//! ## Usage
//!
//! ```ignore
//! use gbt_mint_client::{
//!     mint_planned, plan_purchase, DeploymentConfig, JsonRpcLedger, LedgerContext,
//!     PurchaseRequest, TokenQuantity,
//! };
//!
//! let config = DeploymentConfig::from_env()?;
//! let ctx = LedgerContext::new(JsonRpcLedger::new(&config.rpc_url)?, &config.network_passphrase);
//!
//! let target = TokenQuantity::parse("2.5")?;
//! let request = PurchaseRequest::new(&config.gbt_minter, &config.admin, target)
//!     .with_max_mine_id(config.max_mine_id);
//! let plan = plan_purchase(&ctx, &request)?;
//! println!("pay {} for {}", plan.gross.to_usd_string(), plan.quote.output_qty);
//!
//! // `wallet` is anything implementing `WalletSigner`, including a closure
//! let hash = mint_planned(
//!     &ctx,
//!     &config.gbt_minter,
//!     &config.admin,
//!     &plan,
//!     config.max_mine_id,
//!     &wallet,
//! )?;
//! ```
//!
//! ## Amounts
//!
//! - Stable amounts and prices use 7 decimals (`ScaledAmount`)
//! - GBT quantities use 3 decimals, milli-grams (`TokenQuantity`)
//! - Both are arbitrary-precision integers; floats are never involved
//!
//! ## Important Notes
//!
//! - Quotes are advisory. The ledger may see a different price or capacity
//!   when the mint is included.
//! - `SubmissionOutcomeUnknown` means the transaction may have landed.
//!   Query the ledger before retrying.
//! - The crate emits `tracing` events but never installs a subscriber.

pub mod amount;
pub mod config;
pub mod constants;
pub mod fallback;
pub mod http_rpc;
pub mod quote;
pub mod rpc;
pub mod simulation;
pub mod submission;
pub mod transaction;
pub mod types;
pub mod value;

#[cfg(test)]
mod test_support;

// Re-export main public API
pub use amount::{ceil_div, round_div, FeeRateBps, ScaledAmount, TokenQuantity};
pub use config::{missing_keys, DeploymentConfig, NetworkPreset};
pub use fallback::{
    submit_with_fallback, withdraw_from_vault, CandidateCall, WithdrawEntryPoint, WithdrawRequest,
};
pub use http_rpc::JsonRpcLedger;
pub use quote::{estimate_fee_rate, gross_for_net, net_for_quantity, plan_purchase, PurchaseRequest};
pub use rpc::{
    AccountState, LedgerContext, LedgerRpc, SendResult, SimulationOutcome, SimulationResult,
    WalletSigner,
};
pub use simulation::{
    decode_quote, preview_mint, read_oracle_price, read_reserve_snapshot, read_token_balance,
    read_vault_total_locked, simulate_read, ReserveAccounts,
};
pub use submission::{deposit_to_vault, mint_gbt, mint_planned, submit};
pub use transaction::{
    ContractInvocation, PendingOperation, PreparedOperation, ResourceFootprint, TransactionEnvelope,
};
pub use types::{LedgerId, MintClientError, PurchasePlan, Quote, ReserveSnapshot, SettlementId};
pub use value::ContractValue;
