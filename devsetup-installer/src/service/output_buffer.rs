//! Output buffer
//!
//! Collects the raw output of a running script. The buffer is shared between
//! the stdout reader and the stderr reader task, so it can also be read after
//! the capture is abandoned (for example on timeout).

use std::sync::{Arc, Mutex};

/// Append-only capture of a script's output
///
/// `combined` receives stdout and stderr in arrival order; `stderr` keeps the
/// error stream on its own for failure messages.
#[derive(Clone, Default)]
pub struct OutputBuffer {
    combined: Arc<Mutex<Vec<u8>>>,
    stderr: Arc<Mutex<Vec<u8>>>,
}

impl OutputBuffer {
    /// Creates an empty output buffer
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a chunk read from stdout
    pub fn append_stdout(&self, bytes: &[u8]) {
        let mut combined = self.combined.lock().unwrap_or_else(|e| e.into_inner());
        combined.extend_from_slice(bytes);
    }

    /// Appends a chunk read from stderr
    pub fn append_stderr(&self, bytes: &[u8]) {
        self.combined
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .extend_from_slice(bytes);
        self.stderr
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .extend_from_slice(bytes);
    }

    /// Returns the combined output and the stderr text captured so far
    pub fn contents(&self) -> (String, String) {
        let combined = self.combined.lock().unwrap_or_else(|e| e.into_inner());
        let stderr = self.stderr.lock().unwrap_or_else(|e| e.into_inner());
        (
            String::from_utf8_lossy(&combined).into_owned(),
            String::from_utf8_lossy(&stderr).into_owned(),
        )
    }
}

/// Splits a byte stream into lines across arbitrary chunk boundaries
///
/// Blank lines are dropped and trailing `\r` is stripped.
#[derive(Debug, Default)]
pub struct LineSplitter {
    pending: Vec<u8>,
}

impl LineSplitter {
    /// Feeds a chunk and returns every line it completed
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        self.pending.extend_from_slice(chunk);

        let mut lines = Vec::new();
        while let Some(pos) = self.pending.iter().position(|b| *b == b'\n') {
            let raw: Vec<u8> = self.pending.drain(..=pos).collect();
            if let Some(line) = decode_line(&raw) {
                lines.push(line);
            }
        }
        lines
    }

    /// Flushes an unterminated final line, if any
    pub fn finish(&mut self) -> Option<String> {
        let raw = std::mem::take(&mut self.pending);
        decode_line(&raw)
    }
}

fn decode_line(raw: &[u8]) -> Option<String> {
    let text = String::from_utf8_lossy(raw);
    let line = text.trim_end_matches(['\n', '\r']);
    if line.trim().is_empty() {
        None
    } else {
        Some(line.to_string())
    }
}
