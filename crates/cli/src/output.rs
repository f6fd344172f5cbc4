// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Output formatting for CLI commands

use anyhow::Result;
use av_core::Notification;
use clap::ValueEnum;
use serde::Serialize;

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

/// Print a decoded record as pretty JSON
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Print one notification per line
pub fn print_notification(notification: &Notification, format: OutputFormat) {
    match format {
        OutputFormat::Text => println!("{}", notification),
        OutputFormat::Json => {
            if let Ok(json) = serde_json::to_string(notification) {
                println!("{}", json);
            }
        }
    }
}
