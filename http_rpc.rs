//! Blocking JSON-RPC backend for [`LedgerRpc`].
//!
//! Talks JSON-RPC 2.0 to a deployment gateway exposing `getAccount`,
//! `simulateTransaction`, `prepareTransaction` and `sendTransaction`.
//! Transactions and contract values travel as base64 of their bincode
//! encoding (see [`crate::transaction::encode_base64`]).
//!
//! This is the gateway's protocol, not the public Soroban RPC one: the
//! configured URL must point at a gateway, never at a network's shared
//! Soroban RPC endpoint.

use std::time::Duration;

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::json;
use tracing::debug;

use crate::{
    rpc::{AccountState, LedgerRpc, SendResult, SimulationOutcome, SimulationResult},
    transaction::{
        decode_base64, encode_base64, PendingOperation, PreparedOperation, ResourceFootprint,
        TransactionEnvelope,
    },
    types::MintClientError,
    value::ContractValue,
};

/// JSON-RPC error code for an unknown method
const METHOD_NOT_FOUND: i64 = -32601;

/// HTTP request timeout; the ledger's validity window bounds the rest.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// JSON-RPC client for a ledger gateway.
#[derive(Debug, Clone)]
pub struct JsonRpcLedger {
    client: reqwest::blocking::Client,
    url: String,
}

#[derive(Debug, Deserialize)]
struct RpcResponse<T> {
    result: Option<T>,
    error: Option<RpcErrorBody>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorBody {
    code: i64,
    message: String,
}

#[derive(Debug, Deserialize)]
struct AccountResponse {
    id: String,
    /// Sequence numbers are sent as strings to survive JSON number limits
    sequence: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SimulateResponse {
    error: Option<String>,
    #[serde(default)]
    results: Vec<HostFunctionResult>,
    #[serde(default)]
    footprint: ResourceFootprint,
    #[serde(default)]
    min_resource_fee: Option<String>,
    #[serde(default)]
    latest_ledger: u32,
}

#[derive(Debug, Deserialize)]
struct HostFunctionResult {
    retval: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PrepareResponse {
    transaction: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SendResponse {
    hash: Option<String>,
    status: String,
    error_result: Option<String>,
}

impl JsonRpcLedger {
    pub fn new(url: &str) -> Result<Self, MintClientError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| MintClientError::Rpc(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            url: url.to_string(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        params: serde_json::Value,
    ) -> Result<T, MintClientError> {
        let request = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": method,
            "params": params,
        });
        debug!(url = %self.url, method, "rpc request");

        let response: RpcResponse<T> = self
            .client
            .post(&self.url)
            .json(&request)
            .send()
            .and_then(|resp| resp.error_for_status())
            .and_then(|resp| resp.json())
            .map_err(|e| MintClientError::Rpc(format!("{method}: {e}")))?;
        unwrap_response(method, response)
    }
}

impl LedgerRpc for JsonRpcLedger {
    fn get_account(&self, account_id: &str) -> Result<AccountState, MintClientError> {
        let account: AccountResponse = self.call("getAccount", json!({ "account": account_id }))?;
        let sequence = account
            .sequence
            .parse()
            .map_err(|_| MintClientError::Rpc(format!("invalid sequence {:?}", account.sequence)))?;
        Ok(AccountState {
            account_id: account.id,
            sequence,
        })
    }

    fn simulate_transaction(
        &self,
        tx: &PendingOperation,
    ) -> Result<SimulationOutcome, MintClientError> {
        let response: SimulateResponse =
            self.call("simulateTransaction", json!({ "transaction": encode_base64(tx)? }))?;
        into_outcome(response)
    }

    /// Server-side preparation checked against `simulation`.
    ///
    /// The gateway receives the simulation result with the transaction and
    /// must return exactly the local assembly of the two; anything else is
    /// rejected. Gateways without `prepareTransaction` get local assembly.
    fn prepare_transaction(
        &self,
        tx: PendingOperation,
        simulation: &SimulationResult,
    ) -> Result<PreparedOperation, MintClientError> {
        let params = json!({
            "transaction": encode_base64(&tx)?,
            "simulation": encode_base64(simulation)?,
        });
        let response = self.call::<PrepareResponse>("prepareTransaction", params);
        resolve_prepared(response, tx, simulation)
    }

    fn send_transaction(
        &self,
        envelope: &TransactionEnvelope,
    ) -> Result<SendResult, MintClientError> {
        let response: SendResponse =
            self.call("sendTransaction", json!({ "transaction": envelope.to_encoding()? }))?;
        Ok(SendResult {
            hash: response.hash,
            status: response.status,
            error_result: response.error_result,
        })
    }
}

fn unwrap_response<T>(method: &str, response: RpcResponse<T>) -> Result<T, MintClientError> {
    if let Some(error) = response.error {
        return Err(MintClientError::Rpc(format!(
            "{method} failed ({}): {}",
            error.code, error.message
        )));
    }
    response
        .result
        .ok_or_else(|| MintClientError::Rpc(format!("{method} returned neither result nor error")))
}

fn resolve_prepared(
    response: Result<PrepareResponse, MintClientError>,
    tx: PendingOperation,
    simulation: &SimulationResult,
) -> Result<PreparedOperation, MintClientError> {
    let expected = PreparedOperation::assemble(tx, simulation);
    match response {
        Ok(response) => {
            let prepared: PreparedOperation = decode_base64(&response.transaction)?;
            if prepared != expected {
                return Err(MintClientError::Rpc(
                    "prepareTransaction returned a transaction that differs from the simulation"
                        .to_string(),
                ));
            }
            Ok(prepared)
        }
        Err(MintClientError::Rpc(reason)) if reason.contains(&format!("({METHOD_NOT_FOUND})")) => {
            debug!(%reason, "prepareTransaction unsupported, assembling locally");
            Ok(expected)
        }
        Err(err) => Err(err),
    }
}

fn into_outcome(response: SimulateResponse) -> Result<SimulationOutcome, MintClientError> {
    if let Some(error) = response.error {
        return Ok(SimulationOutcome::Error(error));
    }
    let return_value = response
        .results
        .into_iter()
        .next()
        .and_then(|result| result.retval)
        .map(|encoded| decode_base64::<ContractValue>(&encoded))
        .transpose()?;
    let min_resource_fee = match response.min_resource_fee {
        Some(fee) => fee
            .parse()
            .map_err(|_| MintClientError::Rpc(format!("invalid minResourceFee {fee:?}")))?,
        None => 0,
    };

    Ok(SimulationOutcome::Success(SimulationResult {
        return_value,
        footprint: response.footprint,
        min_resource_fee,
        latest_ledger: response.latest_ledger,
    }))
}
