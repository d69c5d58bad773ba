//! Standard input capture
//!
//! A stream can only be consumed once, so stdin is read at most once per
//! process and every `-` substitution reads from the cached copy. Decoding
//! happens per substitution, so one capture can feed both text and raw
//! arguments.

use std::io::{IsTerminal, Read};
use std::str::Utf8Error;
use std::sync::{Arc, Mutex, OnceLock};

/// The value that requests stdin substitution
pub const STDIN_SENTINEL: &str = "-";

type Reader = Box<dyn Read + Send>;

/// Lazily captured standard input.
///
/// The bytes are kept as read. Cloning shares the capture: whichever clone
/// reads first fills the cache for all of them.
#[derive(Clone)]
pub struct StdinCache {
    captured: Arc<OnceLock<Option<Vec<u8>>>>,
    source: Arc<Mutex<Option<Reader>>>,
}

impl StdinCache {
    /// Capture from the process's standard input.
    ///
    /// Nothing is read when stdin is a terminal, so the process never
    /// blocks waiting for keyboard input.
    pub fn process() -> Self {
        let stdin = std::io::stdin();
        if stdin.is_terminal() {
            return Self::empty();
        }
        Self::from_reader(stdin)
    }

    /// Capture from an arbitrary reader on first use
    pub fn from_reader<R: Read + Send + 'static>(reader: R) -> Self {
        Self {
            captured: Arc::new(OnceLock::new()),
            source: Arc::new(Mutex::new(Some(Box::new(reader)))),
        }
    }

    /// A cache that already holds `content`
    pub fn preloaded(content: impl Into<Vec<u8>>) -> Self {
        let captured = OnceLock::new();
        let _ = captured.set(Some(content.into()));
        Self {
            captured: Arc::new(captured),
            source: Arc::new(Mutex::new(None)),
        }
    }

    /// A cache with no data behind it
    pub fn empty() -> Self {
        let captured = OnceLock::new();
        let _ = captured.set(None);
        Self {
            captured: Arc::new(captured),
            source: Arc::new(Mutex::new(None)),
        }
    }

    /// Captured bytes, reading the source on the first call.
    ///
    /// Returns `None` when there is no data or it could not be read.
    pub fn bytes(&self) -> Option<&[u8]> {
        self.captured
            .get_or_init(|| {
                let reader = match self.source.lock() {
                    Ok(mut guard) => guard.take(),
                    Err(poisoned) => poisoned.into_inner().take(),
                };

                let mut reader = reader?;
                let mut buffer = Vec::new();
                match reader.read_to_end(&mut buffer) {
                    Ok(_) => {
                        tracing::debug!(bytes = buffer.len(), "captured standard input");
                        Some(buffer)
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "failed to read standard input");
                        None
                    }
                }
            })
            .as_deref()
    }

    /// Captured input decoded as UTF-8
    pub fn text(&self) -> Result<Option<&str>, Utf8Error> {
        self.bytes().map(std::str::from_utf8).transpose()
    }

    /// Whether the source has already been read
    pub fn is_captured(&self) -> bool {
        self.captured.get().is_some()
    }
}

impl std::fmt::Debug for StdinCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StdinCache")
            .field("captured", &self.is_captured())
            .finish()
    }
}
