//! Hardcoded constants for the GBT mint client.
//!
//! Contains fixed-point scales, protocol thresholds, transaction windows,
//! network presets and the contract entry-point names this client calls.

/// Decimal places of stable amounts and oracle prices
pub const STABLE_DECIMALS: u32 = 7;

/// Raw units per 1.0 stable (1e7)
pub const STABLE_SCALE: i64 = 10_000_000;

/// Decimal places of GBT quantities (milli-grams)
pub const TOKEN_DECIMALS: u32 = 3;

/// Milli-grams per gram
pub const TOKEN_SCALE: i64 = 1_000;

/// Basis-point denominator
pub const BPS_DENOMINATOR: i64 = 10_000;

/// Smallest mint the minter accepts: 1 gram
pub const MIN_MINT_MILLI: i64 = 1_000;

/// Stable amount used for the fee-estimation trial preview (1.0)
pub const TRIAL_AMOUNT_RAW: i64 = STABLE_SCALE;

/// Highest mine id included in capacity checks by default
pub const DEFAULT_MAX_MINE_ID: u32 = 0;

/// Base inclusion fee in stroops
pub const BASE_FEE: u32 = 100;

/// Validity window for read-only simulations, in seconds
pub const READ_TX_TIMEOUT_SECS: u64 = 30;

/// Validity window for submitted invocations, in seconds
pub const INVOKE_TX_TIMEOUT_SECS: u64 = 120;

/// Testnet network passphrase
pub const TESTNET_PASSPHRASE: &str = "Test SDF Network ; September 2015";

/// Public network passphrase
pub const PUBLIC_PASSPHRASE: &str = "Public Global Stellar Network ; September 2015";

/// `sendTransaction` status of a transaction accepted into the queue
pub const SEND_STATUS_PENDING: &str = "PENDING";

/// Contract entry points
pub mod entry_points {
    pub const BALANCE: &str = "balance";
    pub const TOTAL_LOCKED: &str = "total_locked";
    pub const GET_PRICE: &str = "get_price";
    pub const PREVIEW_MINT: &str = "preview_mint";
    pub const MINT: &str = "mint";
    pub const DEPOSIT: &str = "deposit";
    pub const ADMIN_WITHDRAW: &str = "admin_withdraw";
    pub const WITHDRAW_TO: &str = "withdraw_to";
    pub const WITHDRAW: &str = "withdraw";
}

/// Field names of the map returned by `preview_mint`
pub mod preview_fields {
    pub const OUTPUT: &str = "gbt_out_gm";
    pub const NET: &str = "net_stable_1e7";
    pub const FEE: &str = "fee_stable_1e7";
    pub const PRICE: &str = "price_1e7";
    pub const MEETS_MIN: &str = "meets_min";
    pub const CAPACITY_LEFT: &str = "capacity_left_gm";
}
