// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! One-shot RPC queries: `av tip`, `av blocks`, `av txs`, `av account`, `av submit`

use super::args::RpcArgs;
use crate::output::print_json;
use anyhow::{Context, Result};
use av_engine::{DEFAULT_BLOCK_LIMIT, DEFAULT_TRANSACTION_LIMIT};
use clap::Args;
use std::path::PathBuf;

#[derive(Args)]
pub struct TipArgs {
    #[command(flatten)]
    rpc: RpcArgs,
}

#[derive(Args)]
pub struct BlocksArgs {
    #[arg(long, default_value_t = DEFAULT_BLOCK_LIMIT)]
    limit: u32,

    #[command(flatten)]
    rpc: RpcArgs,
}

#[derive(Args)]
pub struct TxsArgs {
    #[arg(long, default_value_t = DEFAULT_TRANSACTION_LIMIT)]
    limit: u32,

    #[command(flatten)]
    rpc: RpcArgs,
}

#[derive(Args)]
pub struct AccountArgs {
    /// Account address
    address: String,

    #[command(flatten)]
    rpc: RpcArgs,
}

#[derive(Args)]
pub struct SubmitArgs {
    /// File holding the signed transaction bytes
    file: PathBuf,

    #[command(flatten)]
    rpc: RpcArgs,
}

pub async fn tip(args: TipArgs) -> Result<()> {
    let tip = args.rpc.client()?.get_chain_tip().await?;
    print_json(&tip)
}

pub async fn blocks(args: BlocksArgs) -> Result<()> {
    let blocks = args.rpc.client()?.get_recent_blocks(args.limit).await?;
    print_json(&blocks)
}

pub async fn txs(args: TxsArgs) -> Result<()> {
    let txs = args
        .rpc
        .client()?
        .get_recent_transactions(args.limit)
        .await?;
    print_json(&txs)
}

pub async fn account(args: AccountArgs) -> Result<()> {
    let account = args.rpc.client()?.get_account(&args.address).await?;
    print_json(&account)
}

pub async fn submit(args: SubmitArgs) -> Result<()> {
    let tx = std::fs::read(&args.file)
        .with_context(|| format!("failed to read {}", args.file.display()))?;
    let response = args.rpc.client()?.submit_transaction(&tx).await?;
    println!("{}", response);
    Ok(())
}
