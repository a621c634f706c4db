//! Entry-point fallback for vault withdrawals.
//!
//! Deployed vaults expose the administrative withdrawal under different
//! names and argument shapes. Candidates are tried in a fixed order until
//! one submits; a failure during simulation leaves no ledger state behind,
//! so the next candidate can run safely.

use tracing::{info, warn};

use crate::{
    amount::ScaledAmount,
    constants::entry_points,
    rpc::{LedgerContext, LedgerRpc, WalletSigner},
    submission::{ensure_positive, submit},
    types::{LedgerId, MintClientError, SettlementId},
    value::ContractValue,
};

/// One entry point to try, with its fully built argument list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateCall {
    pub function_name: String,
    pub args: Vec<ContractValue>,
}

/// Try each candidate in order and return the first settlement.
///
/// # Returns
///
/// * `Ok(SettlementId)` - From the first candidate that submitted
/// * `Err(SubmissionOutcomeUnknown)` - A candidate may have been broadcast;
///   the fallback stops so the withdrawal is never sent twice
/// * `Err(SigningFailed)` - The wallet refused a candidate that simulated;
///   no other candidate is offered for signing
/// * `Err(NoCandidateSucceeded)` - Every candidate failed; carries the last error
pub fn submit_with_fallback<R, S>(
    ctx: &LedgerContext<R>,
    source_account: &str,
    contract_id: &str,
    candidates: &[CandidateCall],
    signer: &S,
) -> Result<SettlementId, MintClientError>
where
    R: LedgerRpc,
    S: WalletSigner + ?Sized,
{
    let mut attempted = Vec::with_capacity(candidates.len());
    let mut last_error =
        MintClientError::SubmissionRejected("no candidate entry points given".to_string());

    for candidate in candidates {
        attempted.push(candidate.function_name.clone());
        match submit(
            ctx,
            source_account,
            contract_id,
            &candidate.function_name,
            candidate.args.clone(),
            signer,
        ) {
            Ok(hash) => {
                info!(
                    function = %candidate.function_name,
                    %hash,
                    "candidate entry point succeeded"
                );
                return Ok(hash);
            }
            Err(
                err @ (MintClientError::SubmissionOutcomeUnknown(_)
                | MintClientError::SigningFailed(_)),
            ) => return Err(err),
            Err(err) => {
                warn!(
                    function = %candidate.function_name,
                    error = %err,
                    "candidate entry point failed"
                );
                last_error = err;
            }
        }
    }

    Err(MintClientError::NoCandidateSucceeded {
        attempted,
        last_error: Box::new(last_error),
    })
}

/// Parameters of an administrative vault withdrawal.
#[derive(Debug, Clone)]
pub struct WithdrawRequest {
    pub token_id: LedgerId,
    /// Vault admin; signs and pays for the transaction
    pub admin: LedgerId,
    pub to: LedgerId,
    /// Token base units
    pub amount: i128,
}

/// Known names of the vault's withdrawal entry point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WithdrawEntryPoint {
    /// `admin_withdraw(token, admin, to, amount)`
    AdminWithdraw,
    /// `withdraw_to(token, to, amount)`
    WithdrawTo,
    /// `withdraw(token, admin, to, amount)`
    Withdraw,
}

impl WithdrawEntryPoint {
    /// Priority order.
    pub const PRIORITY: [WithdrawEntryPoint; 3] = [
        WithdrawEntryPoint::AdminWithdraw,
        WithdrawEntryPoint::WithdrawTo,
        WithdrawEntryPoint::Withdraw,
    ];

    pub fn function_name(self) -> &'static str {
        match self {
            WithdrawEntryPoint::AdminWithdraw => entry_points::ADMIN_WITHDRAW,
            WithdrawEntryPoint::WithdrawTo => entry_points::WITHDRAW_TO,
            WithdrawEntryPoint::Withdraw => entry_points::WITHDRAW,
        }
    }

    pub fn args(self, request: &WithdrawRequest) -> Vec<ContractValue> {
        let token = ContractValue::address(&request.token_id);
        let to = ContractValue::address(&request.to);
        let amount = ContractValue::I128(request.amount);
        match self {
            WithdrawEntryPoint::AdminWithdraw | WithdrawEntryPoint::Withdraw => {
                vec![token, ContractValue::address(&request.admin), to, amount]
            }
            WithdrawEntryPoint::WithdrawTo => vec![token, to, amount],
        }
    }

    pub fn candidate(self, request: &WithdrawRequest) -> CandidateCall {
        CandidateCall {
            function_name: self.function_name().to_string(),
            args: self.args(request),
        }
    }
}

/// Withdraw from the project vault, trying the known entry points in order.
pub fn withdraw_from_vault<R, S>(
    ctx: &LedgerContext<R>,
    vault_id: &str,
    request: &WithdrawRequest,
    signer: &S,
) -> Result<SettlementId, MintClientError>
where
    R: LedgerRpc,
    S: WalletSigner + ?Sized,
{
    ensure_positive(&ScaledAmount::from_raw(request.amount))?;
    let candidates: Vec<CandidateCall> = WithdrawEntryPoint::PRIORITY
        .iter()
        .map(|entry| entry.candidate(request))
        .collect();
    submit_with_fallback(ctx, &request.admin, vault_id, &candidates, signer)
}
