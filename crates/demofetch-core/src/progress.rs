//! Console progress line for a running download.
//!
//! The line is rewritten in place with a trailing `\r`; `finish` emits the
//! newline once the transfer is over.

use std::io::{self, Write};

/// Snapshot of download progress for one task.
#[derive(Debug, Clone)]
pub struct ProgressStats {
    /// Bytes received so far.
    pub bytes_done: u64,
    /// Size announced by the task definition (0 if unknown).
    pub expected_bytes: u64,
}

impl ProgressStats {
    /// Whole percent complete, clamped to 100. None when the expected size is 0.
    pub fn percent(&self) -> Option<u64> {
        if self.expected_bytes == 0 {
            return None;
        }
        let pct = self.bytes_done.saturating_mul(100) / self.expected_bytes;
        Some(pct.min(100))
    }

    /// Expected size in MiB, as shown on the progress line.
    pub fn expected_mib(&self) -> f64 {
        self.expected_bytes as f64 / 1024.0 / 1024.0
    }
}

/// Formats the progress line (without the carriage return).
pub fn render_line(url: &str, stats: &ProgressStats) -> String {
    match stats.percent() {
        Some(pct) => format!(
            "Downloading {} ({:.2}mb): {}%",
            url,
            stats.expected_mib(),
            pct
        ),
        None => format!("Downloading {}: {} bytes", url, stats.bytes_done),
    }
}

/// Writes progress for one URL to a console sink, overwriting the same line.
pub struct ConsoleProgress<'a> {
    out: &'a mut dyn Write,
    url: String,
    expected_bytes: u64,
    last_percent: Option<u64>,
}

impl<'a> ConsoleProgress<'a> {
    pub fn new(out: &'a mut dyn Write, url: &str, expected_bytes: u64) -> Self {
        Self {
            out,
            url: url.to_string(),
            expected_bytes,
            last_percent: None,
        }
    }

    /// Redraws the line for `bytes_done`. Skips the write when the shown
    /// percentage has not changed.
    pub fn update(&mut self, bytes_done: u64) -> io::Result<()> {
        let stats = ProgressStats {
            bytes_done,
            expected_bytes: self.expected_bytes,
        };
        let pct = stats.percent();
        if pct.is_some() && pct == self.last_percent {
            return Ok(());
        }
        self.last_percent = pct;
        write!(self.out, "{}\r", render_line(&self.url, &stats))?;
        self.out.flush()
    }

    pub fn finish(&mut self) -> io::Result<()> {
        writeln!(self.out)?;
        self.out.flush()
    }
}
