//! Read-only contract calls evaluated through simulation.
//!
//! Nothing here is ever signed or submitted: the fee-payer account only
//! sources a valid transaction envelope.

use std::thread;

use tracing::debug;

use crate::{
    amount::{ScaledAmount, TokenQuantity},
    constants::{entry_points, preview_fields, READ_TX_TIMEOUT_SECS},
    rpc::{LedgerContext, LedgerRpc, SimulationOutcome},
    transaction::ContractInvocation,
    types::{LedgerId, MintClientError, Quote, ReserveSnapshot},
    value::ContractValue,
};

/// Simulate `function_name(args)` on `contract_id` and return its value.
///
/// # Arguments
///
/// * `ctx` - RPC backend and network the call is evaluated on
/// * `contract_id` - Contract to call
/// * `function_name` - Entry point to invoke
/// * `args` - Typed arguments, in contract order
/// * `fee_payer` - Existing account used as the transaction source
///
/// # Returns
///
/// * `Ok(ContractValue)` - The decoded return value
/// * `Err(SimulationFailed)` - The network reported a simulation error
/// * `Err(MissingReturnValue)` - Simulation succeeded without a return payload
pub fn simulate_read<R: LedgerRpc>(
    ctx: &LedgerContext<R>,
    contract_id: &str,
    function_name: &str,
    args: Vec<ContractValue>,
    fee_payer: &str,
) -> Result<ContractValue, MintClientError> {
    let invocation = ContractInvocation::new(contract_id, function_name, args);
    let tx = ctx.build_operation(fee_payer, invocation, READ_TX_TIMEOUT_SECS)?;

    debug!(contract = contract_id, function = function_name, "simulating read");
    match ctx.rpc().simulate_transaction(&tx)? {
        SimulationOutcome::Error(reason) => Err(MintClientError::SimulationFailed(reason)),
        SimulationOutcome::Success(result) => {
            result.return_value.ok_or(MintClientError::MissingReturnValue)
        }
    }
}

/// Token balance of `owner`, in the token's base units.
pub fn read_token_balance<R: LedgerRpc>(
    ctx: &LedgerContext<R>,
    token_id: &str,
    owner: &str,
    fee_payer: &str,
) -> Result<num_bigint::BigInt, MintClientError> {
    simulate_read(
        ctx,
        token_id,
        entry_points::BALANCE,
        vec![ContractValue::address(owner)],
        fee_payer,
    )?
    .as_bigint()
}

/// GBT locked in the project vault.
pub fn read_vault_total_locked<R: LedgerRpc>(
    ctx: &LedgerContext<R>,
    vault_id: &str,
    fee_payer: &str,
) -> Result<num_bigint::BigInt, MintClientError> {
    simulate_read(ctx, vault_id, entry_points::TOTAL_LOCKED, Vec::new(), fee_payer)?.as_bigint()
}

/// Oracle price per gram, scaled 1e7.
pub fn read_oracle_price<R: LedgerRpc>(
    ctx: &LedgerContext<R>,
    oracle_id: &str,
    fee_payer: &str,
) -> Result<ScaledAmount, MintClientError> {
    simulate_read(ctx, oracle_id, entry_points::GET_PRICE, Vec::new(), fee_payer)?
        .as_bigint()
        .map(ScaledAmount::from_raw)
}

/// Ask the minter what a mint of `amount` would produce right now.
pub fn preview_mint<R: LedgerRpc>(
    ctx: &LedgerContext<R>,
    minter_id: &str,
    amount: &ScaledAmount,
    max_mine_id: u32,
    fee_payer: &str,
) -> Result<Quote, MintClientError> {
    let value = simulate_read(
        ctx,
        minter_id,
        entry_points::PREVIEW_MINT,
        vec![
            ContractValue::I128(amount.to_i128()?),
            ContractValue::U32(max_mine_id),
        ],
        fee_payer,
    )?;
    decode_quote(&value)
}

/// Decode the map returned by `preview_mint`.
pub fn decode_quote(value: &ContractValue) -> Result<Quote, MintClientError> {
    Ok(Quote {
        output_qty: TokenQuantity::from_milli(value.field(preview_fields::OUTPUT)?.as_bigint()?),
        net_input: ScaledAmount::from_raw(value.field(preview_fields::NET)?.as_bigint()?),
        fee_input: ScaledAmount::from_raw(value.field(preview_fields::FEE)?.as_bigint()?),
        price: ScaledAmount::from_raw(value.field(preview_fields::PRICE)?.as_bigint()?),
        meets_minimum: value.field(preview_fields::MEETS_MIN)?.as_bool()?,
        remaining_capacity: TokenQuantity::from_milli(
            value.field(preview_fields::CAPACITY_LEFT)?.as_bigint()?,
        ),
    })
}

/// Contracts and accounts read by [`read_reserve_snapshot`].
#[derive(Debug, Clone)]
pub struct ReserveAccounts {
    pub stable_token: LedgerId,
    pub gbt_token: LedgerId,
    pub vault: LedgerId,
    pub oracle: LedgerId,
    /// Treasury pools whose stable balance is reported
    pub pools: Vec<LedgerId>,
    pub fee_payer: LedgerId,
}

/// Read pool balances, vault holdings and the oracle price concurrently.
///
/// Each read is an independent point-in-time simulation, so they run on
/// scoped threads with no ordering between them. The first error wins.
pub fn read_reserve_snapshot<R: LedgerRpc + Sync>(
    ctx: &LedgerContext<R>,
    accounts: &ReserveAccounts,
) -> Result<ReserveSnapshot, MintClientError> {
    let payer = accounts.fee_payer.as_str();

    thread::scope(|scope| {
        let pool_reads: Vec<_> = accounts
            .pools
            .iter()
            .map(|pool| {
                scope.spawn(move || {
                    read_token_balance(ctx, &accounts.stable_token, pool, payer)
                        .map(|balance| (pool.clone(), ScaledAmount::from_raw(balance)))
                })
            })
            .collect();
        let vault_balance =
            scope.spawn(|| read_token_balance(ctx, &accounts.gbt_token, &accounts.vault, payer));
        let vault_locked = scope.spawn(|| read_vault_total_locked(ctx, &accounts.vault, payer));
        let price = scope.spawn(|| read_oracle_price(ctx, &accounts.oracle, payer));

        let pool_balances = pool_reads
            .into_iter()
            .map(join_read)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(ReserveSnapshot {
            pool_balances,
            vault_token_balance: join_read(vault_balance)?,
            vault_total_locked: join_read(vault_locked)?,
            oracle_price: join_read(price)?,
        })
    })
}

fn join_read<T>(
    handle: thread::ScopedJoinHandle<'_, Result<T, MintClientError>>,
) -> Result<T, MintClientError> {
    handle
        .join()
        .map_err(|_| MintClientError::Rpc("read worker panicked".to_string()))?
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{preview_map, MockLedger, NETWORK};
    use num_bigint::BigInt;

    #[test]
    fn test_simulate_read_returns_value() {
        let ctx = LedgerContext::new(MockLedger::new(45_000_000, 200), NETWORK);
        let value =
            simulate_read(&ctx, "CORACLE", entry_points::GET_PRICE, vec![], "GADMIN").unwrap();
        assert_eq!(value, ContractValue::I128(45_000_000));
    }

    #[test]
    fn test_simulate_read_is_repeatable() {
        let ctx = LedgerContext::new(MockLedger::new(45_000_000, 200), NETWORK);
        let args = vec![ContractValue::I128(50_000_000), ContractValue::U32(0)];

        let read =
            |args| simulate_read(&ctx, "CMINTER", entry_points::PREVIEW_MINT, args, "GADMIN");
        let first = read(args.clone()).unwrap();
        let second = read(args).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_simulate_read_surfaces_simulation_error() {
        let ctx = LedgerContext::new(MockLedger::new(45_000_000, 200), NETWORK);
        let err = simulate_read(&ctx, "CVAULT", "no_such_fn", vec![], "GADMIN").unwrap_err();
        assert!(matches!(
            err,
            MintClientError::SimulationFailed(reason) if reason.contains("no_such_fn")
        ));
    }

    #[test]
    fn test_decode_quote() {
        let value = preview_map(1_088, 48_960_000, 999_184, 45_000_000, true, 5_000);
        let quote = decode_quote(&value).unwrap();
        assert_eq!(quote.output_qty, TokenQuantity::from_milli(1_088));
        assert_eq!(quote.fee_input, ScaledAmount::from_raw(999_184));
        assert!(quote.meets_minimum);

        let truncated =
            ContractValue::Map(vec![("gbt_out_gm".to_string(), ContractValue::I128(1))]);
        assert!(matches!(decode_quote(&truncated), Err(MintClientError::Decode(_))));
    }

    #[test]
    fn test_typed_reads() {
        let mut ledger = MockLedger::new(45_000_000, 200);
        ledger.total_locked = 12_000;
        ledger
            .balances
            .insert(("CGBT".to_string(), "GUSER".to_string()), 7_500);
        let ctx = LedgerContext::new(ledger, NETWORK);

        assert_eq!(
            read_token_balance(&ctx, "CGBT", "GUSER", "GADMIN").unwrap(),
            BigInt::from(7_500)
        );
        assert_eq!(read_token_balance(&ctx, "CGBT", "GOTHER", "GADMIN").unwrap(), BigInt::from(0));
        assert_eq!(
            read_vault_total_locked(&ctx, "CVAULT", "GADMIN").unwrap(),
            BigInt::from(12_000)
        );
        assert_eq!(
            read_oracle_price(&ctx, "CORACLE", "GADMIN").unwrap(),
            ScaledAmount::from_raw(45_000_000)
        );
    }

    #[test]
    fn test_read_reserve_snapshot() {
        let mut ledger = MockLedger::new(45_000_000, 200);
        ledger.total_locked = 3_000;
        for (owner, balance) in [("GPOOLP", 500), ("GPOOLR", 300), ("GPOOLA", 200)] {
            ledger
                .balances
                .insert(("CSTABLE".to_string(), owner.to_string()), balance);
        }
        ledger
            .balances
            .insert(("CGBT".to_string(), "CVAULT".to_string()), 3_000);
        let ctx = LedgerContext::new(ledger, NETWORK);

        let accounts = ReserveAccounts {
            stable_token: "CSTABLE".to_string(),
            gbt_token: "CGBT".to_string(),
            vault: "CVAULT".to_string(),
            oracle: "CORACLE".to_string(),
            pools: vec!["GPOOLP".to_string(), "GPOOLR".to_string(), "GPOOLA".to_string()],
            fee_payer: "GADMIN".to_string(),
        };
        let snapshot = read_reserve_snapshot(&ctx, &accounts).unwrap();

        assert_eq!(
            snapshot.pool_balances,
            vec![
                ("GPOOLP".to_string(), ScaledAmount::from_raw(500)),
                ("GPOOLR".to_string(), ScaledAmount::from_raw(300)),
                ("GPOOLA".to_string(), ScaledAmount::from_raw(200)),
            ]
        );
        assert_eq!(snapshot.vault_token_balance, BigInt::from(3_000));
        assert_eq!(snapshot.vault_total_locked, BigInt::from(3_000));
        assert_eq!(snapshot.oracle_price, ScaledAmount::from_raw(45_000_000));
        assert_eq!(ctx.rpc().simulated_functions().len(), 6);
    }
}
