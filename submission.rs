//! Submission pipeline: simulate, prepare, sign externally, submit.
//!
//! Every step is gated on the previous one. Submission is the commit
//! point: once `send_transaction` has been attempted the transaction may
//! be on the ledger, so nothing here retries.

use tracing::{debug, info, warn};

use crate::{
    amount::ScaledAmount,
    constants::{entry_points, INVOKE_TX_TIMEOUT_SECS, SEND_STATUS_PENDING},
    rpc::{LedgerContext, LedgerRpc, SimulationOutcome, WalletSigner},
    transaction::{ContractInvocation, TransactionEnvelope},
    types::{MintClientError, PurchasePlan, SettlementId},
    value::ContractValue,
};

/// Invoke `function_name(args)` on `contract_id` as `source_account`.
///
/// # Arguments
///
/// * `ctx` - RPC backend and network to submit to
/// * `source_account` - Fee payer, and the account the wallet signs for
/// * `contract_id` - Contract to invoke
/// * `function_name` - Entry point
/// * `args` - Typed arguments, in contract order
/// * `signer` - External wallet
///
/// # Returns
///
/// * `Ok(SettlementId)` - Hash of the accepted transaction
/// * `Err(SimulationFailed)` - Simulation failed; the signer was not called
/// * `Err(SubmissionRejected)` - The network returned an error result
/// * `Err(SubmissionOutcomeUnknown)` - Sending failed in transit; the
///   transaction may still land, so re-query the ledger before retrying
/// * `Err(SigningFailed)` - The wallet refused or failed; never retried
pub fn submit<R, S>(
    ctx: &LedgerContext<R>,
    source_account: &str,
    contract_id: &str,
    function_name: &str,
    args: Vec<ContractValue>,
    signer: &S,
) -> Result<SettlementId, MintClientError>
where
    R: LedgerRpc,
    S: WalletSigner + ?Sized,
{
    ctx.ensure_signer_network(signer)?;

    let invocation = ContractInvocation::new(contract_id, function_name, args);
    let tx = ctx.build_operation(source_account, invocation, INVOKE_TX_TIMEOUT_SECS)?;

    let simulation = match ctx.rpc().simulate_transaction(&tx)? {
        SimulationOutcome::Success(result) => result,
        SimulationOutcome::Error(reason) => {
            debug!(
                contract = contract_id,
                function = function_name,
                %reason,
                "simulation rejected invocation"
            );
            return Err(MintClientError::SimulationFailed(reason));
        }
    };

    // Prepared from the simulation above; never re-simulated.
    let prepared = ctx.rpc().prepare_transaction(tx, &simulation)?;
    debug!(
        function = function_name,
        resource_fee = prepared.resource_fee,
        "transaction prepared"
    );

    let unsigned = TransactionEnvelope::unsigned(prepared).to_encoding()?;
    let signed = signer
        .sign_transaction(&unsigned, ctx.network_passphrase())
        .map_err(|err| match err {
            MintClientError::SigningFailed(_) => err,
            other => MintClientError::SigningFailed(other.to_string()),
        })?;
    if signed.trim().is_empty() {
        return Err(MintClientError::SigningFailed(
            "wallet returned an empty signed transaction".to_string(),
        ));
    }
    let envelope = TransactionEnvelope::from_encoding(&signed)?;

    let response = ctx.rpc().send_transaction(&envelope).map_err(|err| match err {
        MintClientError::Rpc(detail) => MintClientError::SubmissionOutcomeUnknown(detail),
        other => other,
    })?;
    if let Some(error_result) = response.error_result {
        warn!(function = function_name, %error_result, "transaction rejected");
        return Err(MintClientError::SubmissionRejected(error_result));
    }
    if response.status != SEND_STATUS_PENDING {
        warn!(function = function_name, status = %response.status, "transaction not queued");
        return Err(MintClientError::SubmissionRejected(format!(
            "network returned status {}",
            response.status
        )));
    }
    let hash = response.hash.ok_or_else(|| {
        MintClientError::SubmissionRejected(
            "network queued the transaction without a hash".to_string(),
        )
    })?;

    info!(contract = contract_id, function = function_name, %hash, "transaction submitted");
    Ok(hash)
}

/// Mint GBT by paying `amount` of the stable asset from `payer`.
pub fn mint_gbt<R, S>(
    ctx: &LedgerContext<R>,
    minter_id: &str,
    payer: &str,
    amount: &ScaledAmount,
    max_mine_id: u32,
    signer: &S,
) -> Result<SettlementId, MintClientError>
where
    R: LedgerRpc,
    S: WalletSigner + ?Sized,
{
    ensure_positive(amount)?;
    submit(
        ctx,
        payer,
        minter_id,
        entry_points::MINT,
        vec![
            ContractValue::address(payer),
            ContractValue::I128(amount.to_i128()?),
            ContractValue::U32(max_mine_id),
        ],
        signer,
    )
}

/// Mint exactly the gross computed by [`crate::quote::plan_purchase`].
///
/// Refuses plans whose verifying quote misses the minimum, since the
/// minter would reject them anyway.
pub fn mint_planned<R, S>(
    ctx: &LedgerContext<R>,
    minter_id: &str,
    payer: &str,
    plan: &PurchasePlan,
    max_mine_id: u32,
    signer: &S,
) -> Result<SettlementId, MintClientError>
where
    R: LedgerRpc,
    S: WalletSigner + ?Sized,
{
    if !plan.quote.meets_minimum || !plan.quote.output_qty.is_positive() {
        return Err(MintClientError::BelowMinimumThreshold {
            output_qty: plan.quote.output_qty.clone(),
        });
    }
    mint_gbt(ctx, minter_id, payer, &plan.gross, max_mine_id, signer)
}

/// Deposit `amount` of `token_id` from `from` into the project vault.
pub fn deposit_to_vault<R, S>(
    ctx: &LedgerContext<R>,
    vault_id: &str,
    token_id: &str,
    from: &str,
    amount: &num_bigint::BigInt,
    signer: &S,
) -> Result<SettlementId, MintClientError>
where
    R: LedgerRpc,
    S: WalletSigner + ?Sized,
{
    let amount = ScaledAmount::from_raw(amount.clone());
    ensure_positive(&amount)?;
    submit(
        ctx,
        from,
        vault_id,
        entry_points::DEPOSIT,
        vec![
            ContractValue::address(token_id),
            ContractValue::address(from),
            ContractValue::I128(amount.to_i128()?),
        ],
        signer,
    )
}

pub(crate) fn ensure_positive(amount: &ScaledAmount) -> Result<(), MintClientError> {
    if amount.is_positive() {
        Ok(())
    } else {
        Err(MintClientError::InvalidAmount(format!(
            "amount {} must be positive",
            amount.raw()
        )))
    }
}
