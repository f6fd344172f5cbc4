// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Request paths and response routing
//!
//! Responses are matched back to the query that produced them by the
//! request path alone.

use av_core::records::{self, AccountSummary, BlockSummary, ChainTip, TransactionSummary};
use av_core::{Event, RpcError};
use serde_json::Value;

/// A logical read query against the node RPC
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Query {
    ChainTip,
    RecentBlocks(u32),
    RecentTransactions(u32),
    Account(String),
}

impl Query {
    /// Path relative to the endpoint base, query string included
    pub fn path(&self) -> String {
        match self {
            Query::ChainTip => "chainTip".to_string(),
            Query::RecentBlocks(limit) => format!("blocks/recent?limit={limit}"),
            Query::RecentTransactions(limit) => format!("tx/recent?limit={limit}"),
            Query::Account(address) => format!("account/{address}"),
        }
    }
}

/// Which decoder a response path selects
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    ChainTip,
    Blocks,
    Transactions,
    Account,
}

impl Route {
    /// Match a request path by substring. First match wins.
    pub fn for_path(path: &str) -> Option<Route> {
        // Query strings never select a route
        let path = path.split('?').next().unwrap_or_default();
        if path.contains("chainTip") {
            Some(Route::ChainTip)
        } else if path.contains("blocks/recent") {
            Some(Route::Blocks)
        } else if path.contains("tx/recent") {
            Some(Route::Transactions)
        } else if path.contains("account/") {
            Some(Route::Account)
        } else {
            None
        }
    }

    pub fn decode(self, body: &Value) -> Result<Response, RpcError> {
        Ok(match self {
            Route::ChainTip => Response::ChainTip(records::decode_chain_tip(body)?),
            Route::Blocks => Response::Blocks(records::decode_blocks(body)?),
            Route::Transactions => Response::Transactions(records::decode_transactions(body)?),
            Route::Account => Response::Account(records::decode_account(body)?),
        })
    }
}

/// A decoded response
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    ChainTip(ChainTip),
    Blocks(Vec<BlockSummary>),
    Transactions(Vec<TransactionSummary>),
    Account(AccountSummary),
    /// Path matched no route; body returned undecoded
    Raw(Value),
}

impl Response {
    /// Notification for a routed response. Raw bodies have none.
    pub fn to_event(&self) -> Option<Event> {
        match self {
            Response::ChainTip(tip) => Some(Event::ChainTipUpdated(tip.clone())),
            Response::Blocks(blocks) => Some(Event::BlocksUpdated(blocks.clone())),
            Response::Transactions(txs) => Some(Event::TransactionsUpdated(txs.clone())),
            Response::Account(account) => Some(Event::AccountUpdated(account.clone())),
            Response::Raw(_) => None,
        }
    }
}

#[cfg(test)]
#[path = "route_tests.rs"]
mod tests;
