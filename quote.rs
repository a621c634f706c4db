//! Quote engine: size the gross stable input for a target GBT quantity.
//!
//! The minter charges `fee = floor(gross * fee_bps / 10000)` and issues
//! `floor((gross - fee) * 1000 / price)` milli-grams. Inverting that with
//! round-up at every step gives a gross that never under-produces. The
//! fee rate is only estimated from a trial preview, so the result is
//! always confirmed by a second preview with the computed gross.

use num_bigint::BigInt;
use tracing::{debug, info};

use crate::{
    amount::{ceil_div, round_div, FeeRateBps, ScaledAmount, TokenQuantity},
    constants::{
        BPS_DENOMINATOR, DEFAULT_MAX_MINE_ID, MIN_MINT_MILLI, TOKEN_SCALE, TRIAL_AMOUNT_RAW,
    },
    rpc::{LedgerContext, LedgerRpc},
    simulation::preview_mint,
    types::{LedgerId, MintClientError, PurchasePlan},
};

/// What the caller wants to buy and where to simulate it.
#[derive(Debug, Clone)]
pub struct PurchaseRequest {
    pub minter_id: LedgerId,
    pub fee_payer: LedgerId,
    /// Desired GBT output
    pub target_qty: TokenQuantity,
    /// Smallest acceptable target; defaults to 1 gram
    pub minimum_qty: TokenQuantity,
    pub max_mine_id: u32,
}

impl PurchaseRequest {
    pub fn new(minter_id: &str, fee_payer: &str, target_qty: TokenQuantity) -> Self {
        Self {
            minter_id: minter_id.to_string(),
            fee_payer: fee_payer.to_string(),
            target_qty,
            minimum_qty: TokenQuantity::from_milli(MIN_MINT_MILLI),
            max_mine_id: DEFAULT_MAX_MINE_ID,
        }
    }

    pub fn with_minimum(mut self, minimum_qty: TokenQuantity) -> Self {
        self.minimum_qty = minimum_qty;
        self
    }

    pub fn with_max_mine_id(mut self, max_mine_id: u32) -> Self {
        self.max_mine_id = max_mine_id;
        self
    }
}

/// Compute the smallest gross stable input that mints `target_qty`.
///
/// Runs a trial preview of 1.0 stable to read the price and estimate the
/// fee rate, sizes the gross with round-up arithmetic, then previews that
/// gross. The second preview is authoritative.
///
/// # Returns
///
/// * `Ok(PurchasePlan)` - Gross to mint with and the verifying quote
/// * `Err(InvalidQuantity)` - Target is non-positive or below the minimum
/// * `Err(OraclePriceInvalid)` - Trial preview reported a price <= 0
/// * `Err(BelowMinimumThreshold)` - Verifying quote misses the minimum
pub fn plan_purchase<R: LedgerRpc>(
    ctx: &LedgerContext<R>,
    request: &PurchaseRequest,
) -> Result<PurchasePlan, MintClientError> {
    validate_target(&request.target_qty, &request.minimum_qty)?;

    let trial_amount = ScaledAmount::from_raw(TRIAL_AMOUNT_RAW);
    let trial = preview_mint(
        ctx,
        &request.minter_id,
        &trial_amount,
        request.max_mine_id,
        &request.fee_payer,
    )?;
    if !trial.price.is_positive() {
        return Err(MintClientError::OraclePriceInvalid(trial.price));
    }

    let fee_rate = estimate_fee_rate(&trial.fee_input, &trial_amount);
    let needed_net = net_for_quantity(&trial.price, &request.target_qty);
    let gross = gross_for_net(&needed_net, fee_rate);
    debug!(
        price = %trial.price,
        %fee_rate,
        needed_net = %needed_net,
        gross = %gross,
        "sized mint from trial preview"
    );

    let quote = preview_mint(
        ctx,
        &request.minter_id,
        &gross,
        request.max_mine_id,
        &request.fee_payer,
    )?;
    if !quote.meets_minimum || !quote.output_qty.is_positive() {
        return Err(MintClientError::BelowMinimumThreshold {
            output_qty: quote.output_qty,
        });
    }

    info!(
        target = %request.target_qty,
        output = %quote.output_qty,
        gross = %gross.to_usd_string(),
        "purchase planned"
    );
    Ok(PurchasePlan {
        gross,
        fee_rate,
        needed_net,
        quote,
    })
}

fn validate_target(
    target_qty: &TokenQuantity,
    minimum_qty: &TokenQuantity,
) -> Result<(), MintClientError> {
    if !target_qty.is_positive() {
        return Err(MintClientError::InvalidQuantity(format!(
            "target {target_qty} must be positive"
        )));
    }
    if target_qty < minimum_qty {
        return Err(MintClientError::InvalidQuantity(format!(
            "target {target_qty} is below the minimum of {minimum_qty}"
        )));
    }
    Ok(())
}

/// `round(fee * 10000 / trial)`, clamped to `[0, 9999]`.
pub fn estimate_fee_rate(fee_input: &ScaledAmount, trial_amount: &ScaledAmount) -> FeeRateBps {
    if !trial_amount.is_positive() {
        return FeeRateBps::new(0);
    }
    let estimate = round_div(
        &(fee_input.raw() * BigInt::from(BPS_DENOMINATOR)),
        trial_amount.raw(),
    );
    FeeRateBps::from_estimate(&estimate)
}

/// `ceil(price * qty / 1000)`: net stable needed for `qty` milli-grams.
pub fn net_for_quantity(price: &ScaledAmount, qty: &TokenQuantity) -> ScaledAmount {
    ScaledAmount::from_raw(ceil_div(
        &(price.raw() * qty.raw()),
        &BigInt::from(TOKEN_SCALE),
    ))
}

/// `ceil(net * 10000 / (10000 - fee_bps))`: gross whose post-fee net
/// covers `needed_net`.
pub fn gross_for_net(needed_net: &ScaledAmount, fee_rate: FeeRateBps) -> ScaledAmount {
    ScaledAmount::from_raw(ceil_div(
        &(needed_net.raw() * BigInt::from(BPS_DENOMINATOR)),
        &BigInt::from(fee_rate.complement()),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::entry_points;
    use crate::test_support::{MockLedger, NETWORK};

    fn request(target_milli: i64) -> PurchaseRequest {
        PurchaseRequest::new("CMINTER", "GADMIN", TokenQuantity::from_milli(target_milli))
    }

    #[test]
    fn test_net_for_quantity_rounds_up() {
        let exact = net_for_quantity(&ScaledAmount::from_raw(45_000_000), &TokenQuantity::grams(1));
        assert_eq!(exact, ScaledAmount::from_raw(45_000_000));

        let rounded =
            net_for_quantity(&ScaledAmount::from_raw(45_000_001), &TokenQuantity::from_milli(1));
        assert_eq!(rounded, ScaledAmount::from_raw(45_001));
    }

    #[test]
    fn test_gross_for_net() {
        // 1_000_000 * 10000 / 9750 = 1_025_641.02..., rounded up
        let gross = gross_for_net(&ScaledAmount::from_raw(1_000_000), FeeRateBps::new(250));
        assert_eq!(gross, ScaledAmount::from_raw(1_025_642));

        let no_fee = gross_for_net(&ScaledAmount::from_raw(1_000_000), FeeRateBps::new(0));
        assert_eq!(no_fee, ScaledAmount::from_raw(1_000_000));
    }

    #[test]
    fn test_estimate_fee_rate() {
        let trial = ScaledAmount::from_raw(TRIAL_AMOUNT_RAW);
        assert_eq!(estimate_fee_rate(&ScaledAmount::from_raw(200_000), &trial).value(), 200);
        // 0.45 bps rounds to 0, 0.5 bps rounds to 1
        assert_eq!(estimate_fee_rate(&ScaledAmount::from_raw(450), &trial).value(), 0);
        assert_eq!(estimate_fee_rate(&ScaledAmount::from_raw(500), &trial).value(), 1);
        assert_eq!(estimate_fee_rate(&ScaledAmount::from_raw(-10), &trial).value(), 0);
        assert_eq!(estimate_fee_rate(&trial, &trial).value(), 9999);
    }

    #[test]
    fn test_plan_purchase_meets_target() {
        let ctx = LedgerContext::new(MockLedger::new(45_000_000, 200), NETWORK);

        let plan = plan_purchase(&ctx, &request(1_000)).unwrap();
        assert_eq!(plan.fee_rate.value(), 200);
        assert_eq!(plan.needed_net, ScaledAmount::from_raw(45_000_000));
        // ceil(45_000_000 * 10000 / 9800)
        assert_eq!(plan.gross, ScaledAmount::from_raw(45_918_368));
        assert!(plan.quote.meets_minimum);
        assert!(plan.quote.output_qty >= TokenQuantity::grams(1));
    }

    #[test]
    fn test_plan_purchase_across_targets_and_prices() {
        let deployments = [
            (45_000_000, 200),
            (45_000_001, 250),
            (1_234_567, 0),
            (987_654_321, 999),
        ];
        for (price, fee_bps) in deployments {
            let ctx = LedgerContext::new(MockLedger::new(price, fee_bps), NETWORK);
            for target in [1_000, 1_001, 1_999, 2_500, 10_000, 123_457] {
                let plan = plan_purchase(&ctx, &request(target)).unwrap();
                assert!(
                    plan.quote.output_qty >= TokenQuantity::from_milli(target),
                    "price {price} fee {fee_bps} target {target}: got {}",
                    plan.quote.output_qty
                );

                // Re-simulating the exact gross reproduces the quote
                let again = preview_mint(&ctx, "CMINTER", &plan.gross, 0, "GADMIN").unwrap();
                assert_eq!(again, plan.quote);
            }
        }
    }

    #[test]
    fn test_plan_purchase_runs_two_previews() {
        let ctx = LedgerContext::new(MockLedger::new(45_000_000, 200), NETWORK);
        plan_purchase(&ctx, &request(2_000)).unwrap();
        assert_eq!(
            ctx.rpc().simulated_functions(),
            vec![entry_points::PREVIEW_MINT.to_string(), entry_points::PREVIEW_MINT.to_string()]
        );
    }

    #[test]
    fn test_plan_purchase_rejects_bad_targets() {
        let ctx = LedgerContext::new(MockLedger::new(45_000_000, 200), NETWORK);

        for target in [0, -1_000, 999] {
            assert!(matches!(
                plan_purchase(&ctx, &request(target)),
                Err(MintClientError::InvalidQuantity(_))
            ));
        }
        // Nothing was simulated for invalid input
        assert!(ctx.rpc().simulated_functions().is_empty());

        let relaxed = request(500).with_minimum(TokenQuantity::from_milli(100));
        assert!(!matches!(
            plan_purchase(&ctx, &relaxed),
            Err(MintClientError::InvalidQuantity(_))
        ));
    }

    #[test]
    fn test_plan_purchase_rejects_bad_price() {
        let ctx = LedgerContext::new(MockLedger::new(0, 200), NETWORK);
        assert_eq!(
            plan_purchase(&ctx, &request(1_000)),
            Err(MintClientError::OraclePriceInvalid(ScaledAmount::from_raw(0)))
        );
    }

    #[test]
    fn test_plan_purchase_below_minimum_when_capacity_exhausted() {
        let mut ledger = MockLedger::new(45_000_000, 200);
        ledger.capacity_gm = 0;
        let ctx = LedgerContext::new(ledger, NETWORK);

        assert_eq!(
            plan_purchase(&ctx, &request(1_000)),
            Err(MintClientError::BelowMinimumThreshold {
                output_qty: TokenQuantity::zero()
            })
        );
    }

    #[test]
    fn test_plan_purchase_below_minimum_for_sub_gram_target() {
        // The contract floors output below 1 gram to zero
        let ctx = LedgerContext::new(MockLedger::new(45_000_000, 200), NETWORK);
        let small = request(500).with_minimum(TokenQuantity::from_milli(1));
        assert!(matches!(
            plan_purchase(&ctx, &small),
            Err(MintClientError::BelowMinimumThreshold { .. })
        ));
    }
}
