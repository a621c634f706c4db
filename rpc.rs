//! Boundary to the ledger RPC service and the wallet signer.
//!
//! Both collaborators are traits so the pipeline can run against the HTTP
//! backend in [`crate::http_rpc`] or an in-memory double in tests.

use serde::{Deserialize, Serialize};

use crate::{
    constants::BASE_FEE,
    transaction::{
        ContractInvocation, PendingOperation, PreparedOperation, ResourceFootprint,
        TransactionEnvelope,
    },
    types::{LedgerId, MintClientError},
    value::ContractValue,
};

/// Current state of a ledger account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountState {
    pub account_id: LedgerId,
    pub sequence: i64,
}

/// Successful simulation of a transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationResult {
    pub return_value: Option<ContractValue>,
    pub footprint: ResourceFootprint,
    pub min_resource_fee: i64,
    pub latest_ledger: u32,
}

/// What the network reported for a simulation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SimulationOutcome {
    Success(SimulationResult),
    /// The contract call itself failed (trap, missing function, auth)
    Error(String),
}

/// Response to `sendTransaction`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendResult {
    pub hash: Option<String>,
    pub status: String,
    pub error_result: Option<String>,
}

/// Ledger RPC service.
///
/// `Err` from any method means the call itself failed (transport, malformed
/// response); contract-level failures are reported inside the `Ok` value.
pub trait LedgerRpc {
    fn get_account(&self, account_id: &str) -> Result<AccountState, MintClientError>;

    fn simulate_transaction(
        &self,
        tx: &PendingOperation,
    ) -> Result<SimulationOutcome, MintClientError>;

    /// Annotate `tx` with the resources found by `simulation`.
    ///
    /// Backends that prepare server-side may override this; the default
    /// assembles locally.
    fn prepare_transaction(
        &self,
        tx: PendingOperation,
        simulation: &SimulationResult,
    ) -> Result<PreparedOperation, MintClientError> {
        Ok(PreparedOperation::assemble(tx, simulation))
    }

    fn send_transaction(&self, envelope: &TransactionEnvelope)
        -> Result<SendResult, MintClientError>;
}

impl<T: LedgerRpc + ?Sized> LedgerRpc for &T {
    fn get_account(&self, account_id: &str) -> Result<AccountState, MintClientError> {
        (**self).get_account(account_id)
    }

    fn simulate_transaction(
        &self,
        tx: &PendingOperation,
    ) -> Result<SimulationOutcome, MintClientError> {
        (**self).simulate_transaction(tx)
    }

    fn prepare_transaction(
        &self,
        tx: PendingOperation,
        simulation: &SimulationResult,
    ) -> Result<PreparedOperation, MintClientError> {
        (**self).prepare_transaction(tx, simulation)
    }

    fn send_transaction(
        &self,
        envelope: &TransactionEnvelope,
    ) -> Result<SendResult, MintClientError> {
        (**self).send_transaction(envelope)
    }
}

/// External wallet that signs prepared transactions.
pub trait WalletSigner {
    /// Sign the canonical encoding of a prepared transaction for
    /// `network_passphrase`, returning the signed encoding.
    fn sign_transaction(
        &self,
        encoding: &str,
        network_passphrase: &str,
    ) -> Result<String, MintClientError>;

    /// Network the wallet is currently connected to, when it can tell.
    fn network_passphrase(&self) -> Option<&str> {
        None
    }
}

impl<F> WalletSigner for F
where
    F: Fn(&str, &str) -> Result<String, MintClientError>,
{
    fn sign_transaction(
        &self,
        encoding: &str,
        network_passphrase: &str,
    ) -> Result<String, MintClientError> {
        self(encoding, network_passphrase)
    }
}

/// Explicit session state passed to every read and submission: the RPC
/// backend, the network it serves, and the inclusion fee to offer.
#[derive(Debug, Clone)]
pub struct LedgerContext<R> {
    rpc: R,
    network_passphrase: String,
    base_fee: u32,
}

impl<R: LedgerRpc> LedgerContext<R> {
    pub fn new(rpc: R, network_passphrase: &str) -> Self {
        Self {
            rpc,
            network_passphrase: network_passphrase.to_string(),
            base_fee: BASE_FEE,
        }
    }

    pub fn with_base_fee(mut self, base_fee: u32) -> Self {
        self.base_fee = base_fee;
        self
    }

    pub fn rpc(&self) -> &R {
        &self.rpc
    }

    pub fn network_passphrase(&self) -> &str {
        &self.network_passphrase
    }

    pub fn base_fee(&self) -> u32 {
        self.base_fee
    }

    /// Load `source`'s account and build an unsigned transaction for
    /// `invocation`, valid for `timeout_secs`.
    pub fn build_operation(
        &self,
        source: &str,
        invocation: ContractInvocation,
        timeout_secs: u64,
    ) -> Result<PendingOperation, MintClientError> {
        let account = self.rpc.get_account(source)?;
        PendingOperation::build(&account, invocation, self.base_fee, timeout_secs)
    }

    /// Fail fast when the wallet is connected to a different network.
    pub fn ensure_signer_network<S: WalletSigner + ?Sized>(
        &self,
        signer: &S,
    ) -> Result<(), MintClientError> {
        match signer.network_passphrase() {
            Some(actual) if actual != self.network_passphrase => {
                Err(MintClientError::NetworkMismatch {
                    expected: self.network_passphrase.clone(),
                    actual: actual.to_string(),
                })
            }
            _ => Ok(()),
        }
    }
}
