// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Line assembly for merged worker output
//!
//! Raw chunks arrive with arbitrary boundaries. Bytes are held until a
//! newline completes a line, so multi-byte characters and partial lines
//! split across reads come out whole.

use crate::worker::OUTPUT_RETAIN_BYTES;

/// Diagnostic lines emitted by runtime frameworks, unrelated to the worker
pub const DEFAULT_NOISE_PATTERNS: &[&str] = &["QSocketNotifier", "Can only be used with threads"];

/// Drops lines containing any of a set of substrings
#[derive(Debug, Clone)]
pub struct NoiseFilter {
    patterns: Vec<String>,
}

impl NoiseFilter {
    pub fn new<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            patterns: patterns.into_iter().map(Into::into).collect(),
        }
    }

    pub fn is_noise(&self, line: &str) -> bool {
        self.patterns.iter().any(|p| line.contains(p.as_str()))
    }
}

impl Default for NoiseFilter {
    fn default() -> Self {
        Self::new(DEFAULT_NOISE_PATTERNS.iter().copied())
    }
}

/// Buffers raw output and yields trimmed, non-noise lines in arrival order
#[derive(Debug, Default)]
pub struct LineBuffer {
    pending: Vec<u8>,
    filter: NoiseFilter,
}

impl LineBuffer {
    pub fn new(filter: NoiseFilter) -> Self {
        Self {
            pending: Vec::new(),
            filter,
        }
    }

    /// Feed a chunk, returning every line it completed.
    ///
    /// A partial line reaching [`OUTPUT_RETAIN_BYTES`] is emitted as is.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        self.pending.extend_from_slice(chunk);

        let mut lines = Vec::new();
        if let Some(last_newline) = self.pending.iter().rposition(|b| *b == b'\n') {
            let rest = self.pending.split_off(last_newline + 1);
            let complete = std::mem::replace(&mut self.pending, rest);
            lines.extend(
                complete
                    .split(|b| *b == b'\n')
                    .filter_map(|raw| self.accept(raw)),
            );
        }

        if self.pending.len() >= OUTPUT_RETAIN_BYTES {
            // Hold back a character cut off at the end of the chunk
            let keep = match std::str::from_utf8(&self.pending) {
                Err(e) if e.error_len().is_none() => self.pending.len() - e.valid_up_to(),
                _ => 0,
            };
            let rest = self.pending.split_off(self.pending.len() - keep);
            let long = std::mem::replace(&mut self.pending, rest);
            lines.extend(self.accept(&long));
        }
        lines
    }

    /// Flush a trailing line that never got its newline
    pub fn finish(&mut self) -> Option<String> {
        let raw = std::mem::take(&mut self.pending);
        self.accept(&raw)
    }

    fn accept(&self, raw: &[u8]) -> Option<String> {
        let line = String::from_utf8_lossy(raw);
        let trimmed = line.trim();
        if trimmed.is_empty() || self.filter.is_noise(trimmed) {
            return None;
        }
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
#[path = "output_tests.rs"]
mod tests;
