//! Typed contract arguments and return values.
//!
//! Every read decodes through the checked accessors here, so a contract
//! returning an unexpected shape surfaces as [`MintClientError::Decode`]
//! instead of a silently wrong number.

use num_bigint::BigInt;
use serde::{Deserialize, Serialize};

use crate::types::MintClientError;

/// Native value passed to or returned from a contract function.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContractValue {
    Void,
    Bool(bool),
    U32(u32),
    I128(i128),
    Symbol(String),
    Address(String),
    Vec(Vec<ContractValue>),
    /// Struct-like map with symbol keys, in contract field order
    Map(Vec<(String, ContractValue)>),
}

impl ContractValue {
    pub fn address(id: &str) -> Self {
        ContractValue::Address(id.to_string())
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            ContractValue::Void => "void",
            ContractValue::Bool(_) => "bool",
            ContractValue::U32(_) => "u32",
            ContractValue::I128(_) => "i128",
            ContractValue::Symbol(_) => "symbol",
            ContractValue::Address(_) => "address",
            ContractValue::Vec(_) => "vec",
            ContractValue::Map(_) => "map",
        }
    }

    pub fn as_i128(&self) -> Result<i128, MintClientError> {
        match self {
            ContractValue::I128(v) => Ok(*v),
            ContractValue::U32(v) => Ok(i128::from(*v)),
            other => Err(unexpected("i128", other)),
        }
    }

    pub fn as_bigint(&self) -> Result<BigInt, MintClientError> {
        self.as_i128().map(BigInt::from)
    }

    pub fn as_bool(&self) -> Result<bool, MintClientError> {
        match self {
            ContractValue::Bool(v) => Ok(*v),
            other => Err(unexpected("bool", other)),
        }
    }

    /// Look up a field of a map value by key.
    pub fn field(&self, name: &str) -> Result<&ContractValue, MintClientError> {
        let ContractValue::Map(entries) = self else {
            return Err(unexpected("map", self));
        };
        entries
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value)
            .ok_or_else(|| MintClientError::Decode(format!("missing field `{name}`")))
    }
}

impl From<i128> for ContractValue {
    fn from(value: i128) -> Self {
        ContractValue::I128(value)
    }
}

impl From<u32> for ContractValue {
    fn from(value: u32) -> Self {
        ContractValue::U32(value)
    }
}

impl From<bool> for ContractValue {
    fn from(value: bool) -> Self {
        ContractValue::Bool(value)
    }
}

fn unexpected(expected: &str, found: &ContractValue) -> MintClientError {
    MintClientError::Decode(format!("expected {expected}, found {}", found.type_name()))
}
