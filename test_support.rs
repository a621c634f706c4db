//! In-memory ledger double used by the unit tests.
//!
//! Emulates the oracle, minter, token and vault contracts closely enough
//! for the quote and submission paths, and records every call.

use std::collections::HashMap;
use std::sync::Mutex;

use crate::{
    constants::{entry_points, preview_fields, BPS_DENOMINATOR, MIN_MINT_MILLI},
    rpc::{AccountState, LedgerRpc, SendResult, SimulationOutcome, SimulationResult},
    transaction::{DecoratedSignature, PendingOperation, ResourceFootprint, TransactionEnvelope},
    types::MintClientError,
    value::ContractValue,
};

pub(crate) const NETWORK: &str = crate::constants::TESTNET_PASSPHRASE;

pub(crate) struct MockLedger {
    pub fee_bps: i128,
    pub price: i128,
    pub capacity_gm: i128,
    pub total_locked: i128,
    pub balances: HashMap<(String, String), i128>,
    /// Entry points that exist on the vault; others fail simulation
    pub vault_functions: Vec<String>,
    pub send_error: Option<String>,
    /// Status reported for accepted sends
    pub send_status: String,
    pub send_transport_error: Option<String>,
    pub simulated: Mutex<Vec<String>>,
    pub sent: Mutex<Vec<TransactionEnvelope>>,
}

impl MockLedger {
    pub fn new(price: i128, fee_bps: i128) -> Self {
        Self {
            fee_bps,
            price,
            capacity_gm: 1_000_000_000,
            total_locked: 0,
            balances: HashMap::new(),
            vault_functions: vec![entry_points::ADMIN_WITHDRAW.to_string()],
            send_error: None,
            send_status: crate::constants::SEND_STATUS_PENDING.to_string(),
            send_transport_error: None,
            simulated: Mutex::new(Vec::new()),
            sent: Mutex::new(Vec::new()),
        }
    }

    pub fn simulated_functions(&self) -> Vec<String> {
        self.simulated.lock().map(|calls| calls.clone()).unwrap_or_default()
    }

    pub fn sent_count(&self) -> usize {
        self.sent.lock().map(|sent| sent.len()).unwrap_or_default()
    }

    /// Same arithmetic as the minter contract's `preview_mint`.
    pub fn preview(&self, amount: i128) -> ContractValue {
        let avail = self.capacity_gm.max(0);
        if amount <= 0 || self.price <= 0 || avail <= 0 {
            preview_map(0, 0, 0, self.price, false, avail)
        } else {
            let fee = amount * self.fee_bps / i128::from(BPS_DENOMINATOR);
            let net = amount - fee;
            let mut out = net * 1000 / self.price;
            let meets_min = out >= i128::from(MIN_MINT_MILLI);
            if !meets_min {
                out = 0;
            }
            out = out.min(avail);
            preview_map(out, net, fee, self.price, meets_min, avail - out)
        }
    }

    fn call(&self, tx: &PendingOperation) -> Result<ContractValue, String> {
        let invocation = &tx.invocation;
        let args = &invocation.args;
        match invocation.function_name.as_str() {
            entry_points::GET_PRICE => Ok(ContractValue::I128(self.price)),
            entry_points::TOTAL_LOCKED => Ok(ContractValue::I128(self.total_locked)),
            entry_points::BALANCE => {
                let Some(ContractValue::Address(owner)) = args.first() else {
                    return Err("balance expects an address".to_string());
                };
                let key = (invocation.contract_id.clone(), owner.clone());
                Ok(ContractValue::I128(self.balances.get(&key).copied().unwrap_or(0)))
            }
            entry_points::PREVIEW_MINT => match args.first() {
                Some(ContractValue::I128(amount)) => Ok(self.preview(*amount)),
                _ => Err("preview_mint expects an i128 amount".to_string()),
            },
            entry_points::MINT | entry_points::DEPOSIT => Ok(ContractValue::Void),
            name if self.vault_functions.iter().any(|f| f == name) => Ok(ContractValue::Void),
            name => Err(format!(
                "HostError: Error(Context, MissingValue) function {name} not found"
            )),
        }
    }
}

impl LedgerRpc for MockLedger {
    fn get_account(&self, account_id: &str) -> Result<AccountState, MintClientError> {
        Ok(AccountState {
            account_id: account_id.to_string(),
            sequence: 7,
        })
    }

    fn simulate_transaction(
        &self,
        tx: &PendingOperation,
    ) -> Result<SimulationOutcome, MintClientError> {
        if let Ok(mut calls) = self.simulated.lock() {
            calls.push(tx.invocation.function_name.clone());
        }
        Ok(match self.call(tx) {
            Ok(value) => SimulationOutcome::Success(SimulationResult {
                return_value: Some(value),
                footprint: ResourceFootprint {
                    read_write: vec![tx.invocation.contract_id.clone()],
                    ..ResourceFootprint::default()
                },
                min_resource_fee: 1_000,
                latest_ledger: 500,
            }),
            Err(reason) => SimulationOutcome::Error(reason),
        })
    }

    fn send_transaction(
        &self,
        envelope: &TransactionEnvelope,
    ) -> Result<SendResult, MintClientError> {
        if let Some(reason) = &self.send_transport_error {
            return Err(MintClientError::Rpc(reason.clone()));
        }
        if let Some(reason) = &self.send_error {
            return Ok(SendResult {
                hash: None,
                status: "ERROR".to_string(),
                error_result: Some(reason.clone()),
            });
        }
        if let Ok(mut sent) = self.sent.lock() {
            sent.push(envelope.clone());
        }
        Ok(SendResult {
            hash: Some(envelope.tx.hash(NETWORK)?),
            status: self.send_status.clone(),
            error_result: None,
        })
    }
}

pub(crate) fn preview_map(
    out: i128,
    net: i128,
    fee: i128,
    price: i128,
    meets_min: bool,
    capacity_left: i128,
) -> ContractValue {
    ContractValue::Map(vec![
        (preview_fields::OUTPUT.to_string(), ContractValue::I128(out)),
        (preview_fields::NET.to_string(), ContractValue::I128(net)),
        (preview_fields::FEE.to_string(), ContractValue::I128(fee)),
        (preview_fields::PRICE.to_string(), ContractValue::I128(price)),
        (preview_fields::MEETS_MIN.to_string(), ContractValue::Bool(meets_min)),
        (
            preview_fields::CAPACITY_LEFT.to_string(),
            ContractValue::I128(capacity_left),
        ),
    ])
}

/// Signer that appends a fixed signature, counting how often it ran.
pub(crate) struct CountingSigner {
    pub calls: Mutex<usize>,
}

impl CountingSigner {
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().map(|calls| *calls).unwrap_or_default()
    }
}

impl crate::rpc::WalletSigner for CountingSigner {
    fn sign_transaction(
        &self,
        encoding: &str,
        _network_passphrase: &str,
    ) -> Result<String, MintClientError> {
        if let Ok(mut calls) = self.calls.lock() {
            *calls += 1;
        }
        let mut envelope = TransactionEnvelope::from_encoding(encoding)?;
        envelope.signatures.push(DecoratedSignature {
            hint: vec![0xAB; 4],
            signature: vec![0x11; 64],
        });
        envelope.to_encoding()
    }
}
