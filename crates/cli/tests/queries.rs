// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! CLI integration tests for the one-shot RPC queries

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

mod common;

use common::{av, closed_endpoint, RpcServer};
use predicates::prelude::*;
use tempfile::TempDir;
use wiremock::matchers::{body_bytes, method, path, query_param};
use wiremock::{Mock, ResponseTemplate};

const TIP_BODY: &str = r#"{"height":"10","hash":"abc","difficulty":"5","timestamp":"t"}"#;

#[test]
fn help_lists_commands() {
    let home = TempDir::new().unwrap();
    av(home.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("run"))
        .stdout(predicate::str::contains("tip"))
        .stdout(predicate::str::contains("blocks"))
        .stdout(predicate::str::contains("submit"));
}

#[test]
fn tip_prints_decoded_record() {
    let home = TempDir::new().unwrap();
    let rpc = RpcServer::start();
    rpc.mount(
        Mock::given(method("GET"))
            .and(path("/chainTip"))
            .respond_with(ResponseTemplate::new(200).set_body_string(TIP_BODY)),
    );

    av(home.path())
        .args(["tip", "--rpc-url", &rpc.uri(), "--fallback-url", ""])
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""height": "10""#))
        .stdout(predicate::str::contains(r#""hash": "abc""#));
}

#[test]
fn blocks_passes_limit_and_unwraps_object() {
    let home = TempDir::new().unwrap();
    let rpc = RpcServer::start();
    rpc.mount(
        Mock::given(method("GET"))
            .and(path("/blocks/recent"))
            .and(query_param("limit", "2"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"{"blocks":[{"height":"1","hash":"h1","farmer":"f1","txCount":3}]}"#,
            )),
    );

    av(home.path())
        .args(["blocks", "--limit", "2", "--rpc-url", &rpc.uri(), "--fallback-url", ""])
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""farmer": "f1""#))
        .stdout(predicate::str::contains(r#""txCount": 3"#));
}

#[test]
fn unreachable_primary_falls_back() {
    let home = TempDir::new().unwrap();
    let fallback = RpcServer::start();
    fallback.mount(
        Mock::given(method("GET"))
            .and(path("/account/arcv1xyz"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(r#"{"address":"arcv1xyz","balance":"7","nonce":"1"}"#),
            ),
    );

    av(home.path())
        .args([
            "account",
            "arcv1xyz",
            "--rpc-url",
            &closed_endpoint(),
            "--fallback-url",
            &fallback.uri(),
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""balance": "7""#));
}

#[test]
fn unreachable_endpoint_without_fallback_fails() {
    let home = TempDir::new().unwrap();
    av(home.path())
        .args(["tip", "--rpc-url", &closed_endpoint(), "--fallback-url", ""])
        .assert()
        .failure()
        .stderr(predicate::str::contains("transport error"));
}

#[test]
fn submit_posts_file_contents() {
    let home = TempDir::new().unwrap();
    let tx = home.path().join("tx.bin");
    std::fs::write(&tx, b"signed-bytes").unwrap();
    let rpc = RpcServer::start();
    rpc.mount(
        Mock::given(method("POST"))
            .and(path("/submit"))
            .and(body_bytes(b"signed-bytes".to_vec()))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"hash":"tx1"}"#)),
    );

    av(home.path())
        .args(["submit", tx.to_str().unwrap(), "--rpc-url", &rpc.uri(), "--fallback-url", ""])
        .assert()
        .success()
        .stdout(predicate::str::contains("tx1"));
}
