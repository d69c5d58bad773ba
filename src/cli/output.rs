//! Prefixed user-facing messages
//!
//! Status messages (`Error:`, `Warning:`, `Success:`, `Info:`) go to
//! stderr so stdout stays clean for command results and JSON. In JSON mode
//! every status message except errors is suppressed.

use colored::Colorize;
use std::io::{IsTerminal, Write};
use std::sync::{Arc, Mutex};

type Sink = Arc<Mutex<Box<dyn Write + Send>>>;

fn sink<W: Write + Send + 'static>(writer: W) -> Sink {
    Arc::new(Mutex::new(Box::new(writer)))
}

/// Where command output is written
#[derive(Clone)]
pub struct Output {
    stdout: Sink,
    stderr: Sink,
    styled: bool,
    json_mode: bool,
}

impl Output {
    /// Write to the process's stdout and stderr
    pub fn stdio() -> Self {
        Self {
            stdout: sink(std::io::stdout()),
            stderr: sink(std::io::stderr()),
            styled: std::io::stderr().is_terminal(),
            json_mode: false,
        }
    }

    /// Write into in-memory buffers, returned alongside for inspection
    pub fn captured() -> (Self, CapturedStreams) {
        let streams = CapturedStreams::default();
        let output = Self {
            stdout: sink(streams.stdout.clone()),
            stderr: sink(streams.stderr.clone()),
            styled: false,
            json_mode: false,
        };
        (output, streams)
    }

    /// A copy of this output with JSON mode switched on or off
    pub fn with_json_mode(&self, json_mode: bool) -> Self {
        Self {
            json_mode,
            ..self.clone()
        }
    }

    /// Whether status messages are suppressed in favor of JSON
    pub fn is_json_mode(&self) -> bool {
        self.json_mode
    }

    /// Whether prefixes are colored
    pub fn is_styled(&self) -> bool {
        self.styled
    }

    /// `Error: <message>`; printed even in JSON mode
    pub fn error(&self, message: &str) {
        let prefix = if self.styled { "Error:".red().bold().to_string() } else { "Error:".to_string() };
        self.status(&prefix, message);
    }

    /// `Warning: <message>`
    pub fn warning(&self, message: &str) {
        if self.json_mode {
            return;
        }
        let prefix = if self.styled { "Warning:".yellow().bold().to_string() } else { "Warning:".to_string() };
        self.status(&prefix, message);
    }

    /// `Success: <message>`
    pub fn success(&self, message: &str) {
        if self.json_mode {
            return;
        }
        let prefix = if self.styled { "Success:".green().to_string() } else { "Success:".to_string() };
        self.status(&prefix, message);
    }

    /// `Info: <message>`
    pub fn info(&self, message: &str) {
        if self.json_mode {
            return;
        }
        let prefix = if self.styled { "Info:".white().to_string() } else { "Info:".to_string() };
        self.status(&prefix, message);
    }

    /// Plain text on stdout
    pub fn print(&self, text: &str) {
        write_line(&self.stdout, text);
    }

    /// Plain text on stderr
    pub fn print_err(&self, text: &str) {
        write_line(&self.stderr, text);
    }

    /// Pretty-printed JSON on stdout
    pub fn json(&self, value: &serde_json::Value) {
        match serde_json::to_string_pretty(value) {
            Ok(text) => write_line(&self.stdout, &text),
            Err(e) => self.error(&format!("Failed to serialize JSON output: {}", e)),
        }
    }

    fn status(&self, prefix: &str, message: &str) {
        write_line(&self.stderr, &format!("{} {}", prefix, message));
    }
}

fn write_line(sink: &Sink, text: &str) {
    let mut guard = match sink.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    };
    if let Err(e) = writeln!(guard, "{}", text).and_then(|_| guard.flush()) {
        tracing::warn!(error = %e, "failed to write output");
    }
}

impl std::fmt::Debug for Output {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Output")
            .field("styled", &self.styled)
            .field("json_mode", &self.json_mode)
            .finish()
    }
}

/// Shared in-memory buffer that implements [`Write`]
#[derive(Debug, Clone, Default)]
pub struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl SharedBuffer {
    /// Everything written so far, lossily decoded
    pub fn text(&self) -> String {
        let guard = match self.0.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        String::from_utf8_lossy(&guard).into_owned()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let mut guard = match self.0.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        guard.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

/// The buffers behind [`Output::captured`]
#[derive(Debug, Clone, Default)]
pub struct CapturedStreams {
    /// Captured stdout
    pub stdout: SharedBuffer,
    /// Captured stderr
    pub stderr: SharedBuffer,
}

impl CapturedStreams {
    /// Captured stdout text
    pub fn stdout(&self) -> String {
        self.stdout.text()
    }

    /// Captured stderr text
    pub fn stderr(&self) -> String {
        self.stderr.text()
    }
}
