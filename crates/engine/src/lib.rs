// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Archivas worker supervision and the consumer update context

mod bridge;
mod dispatch;
mod error;
mod poller;
mod process;
mod process_backend;
mod supervisor;
mod timeouts;

pub use bridge::BridgeSupervisor;
pub use dispatch::{Dispatcher, Listener};
pub use error::PlotError;
pub use poller::{ChainPoller, StatusPoller, DEFAULT_BLOCK_LIMIT, DEFAULT_TRANSACTION_LIMIT};
pub use process::{ProcessSupervisor, OUTPUT_LEVEL};
pub use process_backend::{
    default_farmer_executable, default_node_executable, ProcessBackend, FARMER_EXECUTABLE,
    NODE_EXECUTABLE,
};
pub use supervisor::Supervisor;
pub use timeouts::ProcessTimeouts;
