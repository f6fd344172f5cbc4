// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test utilities for CLI integration tests.

#![allow(dead_code)]
#![allow(deprecated)]

use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tokio::runtime::Runtime;
use wiremock::MockServer;

/// A mock RPC server kept alive by its own runtime while the CLI blocks
pub struct RpcServer {
    pub runtime: Runtime,
    pub server: MockServer,
}

impl RpcServer {
    pub fn start() -> Self {
        let runtime = Runtime::new().expect("Failed to build runtime");
        let server = runtime.block_on(MockServer::start());
        Self { runtime, server }
    }

    pub fn mount(&self, mock: wiremock::Mock) {
        self.runtime.block_on(mock.mount(&self.server));
    }

    pub fn uri(&self) -> String {
        self.server.uri()
    }
}

/// An address nothing listens on
pub fn closed_endpoint() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("Failed to bind");
    let addr = listener.local_addr().expect("No local address");
    drop(listener);
    format!("http://{addr}")
}

/// Write an executable `/bin/sh` script
pub fn script(dir: &TempDir, name: &str, body: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).expect("Failed to write script");
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755))
        .expect("Failed to chmod script");
    path
}

const AV_VARS: &[&str] = &[
    "AV_RPC_URL",
    "AV_FALLBACK_URL",
    "AV_NODE_BIN",
    "AV_FARMER_BIN",
    "AV_LOG_FILE",
];

/// `av` isolated from the caller's environment, with `home` as HOME
pub fn av(home: &Path) -> assert_cmd::Command {
    let mut cmd = assert_cmd::Command::cargo_bin("av").expect("av binary not built");
    for var in AV_VARS {
        cmd.env_remove(var);
    }
    cmd.env("HOME", home);
    cmd
}

/// Same as [`av`], as a plain process for tests that signal it
pub fn av_process(home: &Path) -> std::process::Command {
    let mut cmd = std::process::Command::new(assert_cmd::cargo::cargo_bin("av"));
    for var in AV_VARS {
        cmd.env_remove(var);
    }
    cmd.env("HOME", home);
    cmd
}
