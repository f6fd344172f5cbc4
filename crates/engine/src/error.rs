// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for the supervisors

use av_adapters::EngineCode;
use thiserror::Error;

/// Errors from plot creation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlotError {
    #[error("plot creation requires the in-process engine")]
    Unsupported,
    #[error(transparent)]
    Engine(#[from] EngineCode),
    #[error("plot task failed: {0}")]
    Task(String),
}
