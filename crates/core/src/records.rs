// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Chain records decoded from RPC responses
//!
//! Nodes disagree about whether numeric fields are quoted, so every field
//! decodes leniently: string fields accept numbers, integer fields accept
//! numeric strings, and missing or mistyped fields fall back to defaults.

use crate::error::RpcError;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChainTip {
    #[serde(deserialize_with = "lenient_string")]
    pub height: String,
    #[serde(deserialize_with = "lenient_string")]
    pub hash: String,
    #[serde(deserialize_with = "lenient_string")]
    pub difficulty: String,
    #[serde(deserialize_with = "lenient_string")]
    pub timestamp: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BlockSummary {
    #[serde(deserialize_with = "lenient_string")]
    pub height: String,
    #[serde(deserialize_with = "lenient_string")]
    pub hash: String,
    #[serde(deserialize_with = "lenient_string")]
    pub farmer: String,
    #[serde(deserialize_with = "lenient_int")]
    pub tx_count: i64,
    #[serde(deserialize_with = "lenient_string")]
    pub timestamp: String,
    #[serde(deserialize_with = "lenient_string")]
    pub difficulty: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransactionSummary {
    #[serde(deserialize_with = "lenient_string")]
    pub hash: String,
    #[serde(deserialize_with = "lenient_string")]
    pub from: String,
    #[serde(deserialize_with = "lenient_string")]
    pub to: String,
    #[serde(deserialize_with = "lenient_string")]
    pub amount: String,
    #[serde(deserialize_with = "lenient_string")]
    pub fee: String,
    #[serde(deserialize_with = "lenient_string")]
    pub height: String,
    #[serde(deserialize_with = "lenient_string")]
    pub timestamp: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AccountSummary {
    #[serde(deserialize_with = "lenient_string")]
    pub address: String,
    #[serde(deserialize_with = "lenient_string")]
    pub balance: String,
    #[serde(deserialize_with = "lenient_string")]
    pub nonce: String,
}

fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => s,
        Value::Number(n) => n.to_string(),
        _ => String::new(),
    })
}

fn lenient_int<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f as i64))
            .unwrap_or_default(),
        Value::String(s) => s.trim().parse().unwrap_or_default(),
        _ => 0,
    })
}

/// Parse a response body, mapping syntax errors to [`RpcError::Decode`]
pub fn parse_body(body: &[u8]) -> Result<Value, RpcError> {
    serde_json::from_slice(body).map_err(|e| RpcError::Decode(e.to_string()))
}

pub fn decode_chain_tip(value: &Value) -> Result<ChainTip, RpcError> {
    decode_object(value, "chain tip")
}

pub fn decode_account(value: &Value) -> Result<AccountSummary, RpcError> {
    decode_object(value, "account")
}

/// Accepts a bare array or `{"blocks": [...]}`
pub fn decode_blocks(value: &Value) -> Result<Vec<BlockSummary>, RpcError> {
    decode_list(value, "blocks")
}

/// Accepts a bare array or `{"transactions": [...]}`
pub fn decode_transactions(value: &Value) -> Result<Vec<TransactionSummary>, RpcError> {
    decode_list(value, "transactions")
}

fn decode_object<T: DeserializeOwned>(value: &Value, what: &str) -> Result<T, RpcError> {
    if !value.is_object() {
        return Err(RpcError::UnexpectedShape(format!(
            "expected {what} object, got {}",
            shape_name(value)
        )));
    }
    T::deserialize(value).map_err(|e| RpcError::Decode(e.to_string()))
}

fn decode_list<T: DeserializeOwned>(value: &Value, field: &str) -> Result<Vec<T>, RpcError> {
    let items = match value {
        Value::Array(items) => items,
        Value::Object(map) => match map.get(field) {
            Some(Value::Array(items)) => items,
            _ => {
                return Err(RpcError::UnexpectedShape(format!(
                    "object without `{field}` array"
                )))
            }
        },
        other => {
            return Err(RpcError::UnexpectedShape(format!(
                "expected {field} list, got {}",
                shape_name(other)
            )))
        }
    };

    items
        .iter()
        .filter(|item| item.is_object())
        .map(|item| T::deserialize(item).map_err(|e| RpcError::Decode(e.to_string())))
        .collect()
}

fn shape_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
#[path = "records_tests.rs"]
mod tests;
