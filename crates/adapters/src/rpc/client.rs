// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Failover RPC client
//!
//! Each request goes to the active endpoint. A transport or status failure
//! on the primary flips the client to the fallback for good and re-issues
//! the same request there; only the fallback's outcome is reported.
//!
//! The sticky flag is written only after a primary attempt has failed, so a
//! request already in flight against the primary is retried on the fallback
//! even when another request flipped the flag first.

use super::route::{Query, Response, Route};
use av_core::config::normalize_base_url;
use av_core::records::{self, AccountSummary, BlockSummary, ChainTip, TransactionSummary};
use av_core::{Event, EventSender, RpcConfig, RpcError};
use reqwest::header::CONTENT_TYPE;
use std::sync::atomic::{AtomicBool, Ordering};

/// User agent sent with every request
pub const USER_AGENT: &str = concat!("av/", env!("CARGO_PKG_VERSION"));

enum Method {
    Get,
    Post(Vec<u8>),
}

pub struct RpcClient {
    http: reqwest::Client,
    primary: String,
    fallback: Option<String>,
    using_fallback: AtomicBool,
    connected: AtomicBool,
    events: Option<EventSender>,
}

impl RpcClient {
    pub fn new(config: &RpcConfig) -> Result<Self, RpcError> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| RpcError::Transport(e.to_string()))?;

        let fallback = config
            .fallback_url
            .as_deref()
            .map(normalize_base_url)
            .filter(|url| !url.is_empty());

        Ok(Self {
            http,
            primary: normalize_base_url(&config.primary_url),
            fallback,
            using_fallback: AtomicBool::new(false),
            connected: AtomicBool::new(false),
            events: None,
        })
    }

    /// Emit connectivity, data, and error notifications into `events`
    pub fn with_events(mut self, events: EventSender) -> Self {
        self.events = Some(events);
        self
    }

    pub fn primary_url(&self) -> &str {
        &self.primary
    }

    pub fn fallback_url(&self) -> Option<&str> {
        self.fallback.as_deref()
    }

    /// Base URL new requests are sent to
    pub fn active_url(&self) -> &str {
        self.base_url(self.is_using_fallback())
    }

    fn base_url(&self, on_fallback: bool) -> &str {
        match (on_fallback, self.fallback.as_deref()) {
            (true, Some(fallback)) => fallback,
            _ => &self.primary,
        }
    }

    pub fn is_using_fallback(&self) -> bool {
        self.using_fallback.load(Ordering::Acquire)
    }

    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Acquire)
    }

    pub async fn get_chain_tip(&self) -> Result<ChainTip, RpcError> {
        match self.get(&Query::ChainTip.path()).await? {
            Response::ChainTip(tip) => Ok(tip),
            other => Err(misrouted(&other)),
        }
    }

    pub async fn get_recent_blocks(&self, limit: u32) -> Result<Vec<BlockSummary>, RpcError> {
        match self.get(&Query::RecentBlocks(limit).path()).await? {
            Response::Blocks(blocks) => Ok(blocks),
            other => Err(misrouted(&other)),
        }
    }

    pub async fn get_recent_transactions(
        &self,
        limit: u32,
    ) -> Result<Vec<TransactionSummary>, RpcError> {
        match self.get(&Query::RecentTransactions(limit).path()).await? {
            Response::Transactions(txs) => Ok(txs),
            other => Err(misrouted(&other)),
        }
    }

    pub async fn get_account(&self, address: &str) -> Result<AccountSummary, RpcError> {
        match self.get(&Query::Account(address.to_string()).path()).await? {
            Response::Account(account) => Ok(account),
            other => Err(misrouted(&other)),
        }
    }

    /// GET `path` and decode the body according to the route the path selects
    pub async fn get(&self, path: &str) -> Result<Response, RpcError> {
        let path = path.trim().trim_start_matches('/');
        let body = self.execute(&Method::Get, path).await?;

        let decoded = records::parse_body(&body).and_then(|value| match Route::for_path(path) {
            Some(route) => route.decode(&value),
            None => Ok(Response::Raw(value)),
        });

        match decoded {
            Ok(response) => {
                self.mark_connected();
                if let Some(event) = response.to_event() {
                    self.emit(event);
                }
                Ok(response)
            }
            Err(e) => {
                // Decode failures leave connectivity alone
                tracing::warn!(path, error = %e, "undecodable response");
                self.emit(Event::RpcError(e.clone()));
                Err(e)
            }
        }
    }

    /// POST raw transaction bytes, returning the response body
    pub async fn submit_transaction(&self, tx: &[u8]) -> Result<String, RpcError> {
        let body = self.execute(&Method::Post(tx.to_vec()), "submit").await?;
        self.mark_connected();
        Ok(String::from_utf8_lossy(&body).into_owned())
    }

    async fn execute(&self, method: &Method, path: &str) -> Result<Vec<u8>, RpcError> {
        // One read, so a failover by a concurrent request cannot retry the fallback
        let on_fallback = self.is_using_fallback();
        let result = match self.attempt(method, self.base_url(on_fallback), path).await {
            Err(e) if e.is_retryable() && !on_fallback => match &self.fallback {
                Some(fallback) => {
                    if self
                        .using_fallback
                        .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
                        .is_ok()
                    {
                        tracing::warn!(
                            primary = %self.primary,
                            fallback = %fallback,
                            error = %e,
                            "primary endpoint failed, switching to fallback"
                        );
                    }
                    self.attempt(method, fallback, path).await
                }
                None => Err(e),
            },
            other => other,
        };

        if let Err(e) = &result {
            self.report_failure(path, e);
        }
        result
    }

    async fn attempt(&self, method: &Method, base: &str, path: &str) -> Result<Vec<u8>, RpcError> {
        let url = format!("{base}/{path}");
        let request = match method {
            Method::Get => self.http.get(&url),
            Method::Post(body) => self.http.post(&url).body(body.clone()),
        };

        let response = request
            .header(CONTENT_TYPE, "application/json")
            .send()
            .await
            .map_err(|e| RpcError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RpcError::Application {
                status: status.as_u16(),
                body,
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| RpcError::Transport(e.to_string()))?;
        Ok(body.to_vec())
    }

    fn mark_connected(&self) {
        if !self.connected.swap(true, Ordering::AcqRel) {
            tracing::info!(endpoint = %self.active_url(), "rpc connected");
            self.emit(Event::RpcConnected);
        }
    }

    fn report_failure(&self, path: &str, error: &RpcError) {
        tracing::error!(path, endpoint = %self.active_url(), error = %error, "rpc request failed");
        self.emit(Event::RpcError(error.clone()));
        if self.connected.swap(false, Ordering::AcqRel) {
            self.emit(Event::RpcDisconnected);
        }
    }

    fn emit(&self, event: Event) {
        if let Some(events) = &self.events {
            // Receiver gone means nobody is listening any more
            let _ = events.send(event);
        }
    }
}

fn misrouted(response: &Response) -> RpcError {
    RpcError::UnexpectedShape(format!("response routed elsewhere: {response:?}"))
}

#[cfg(test)]
#[path = "client_tests.rs"]
mod tests;
