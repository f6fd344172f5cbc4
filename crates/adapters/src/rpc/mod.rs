// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! HTTP client for the node RPC with one-way failover

mod client;
mod route;

pub use client::{RpcClient, USER_AGENT};
pub use route::{Query, Response, Route};
