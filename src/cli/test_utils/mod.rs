//! Test utilities and mock handlers for CLI testing
//!
//! Provides handlers that record or fail in predictable ways so the
//! executor can be tested without real business logic.

pub mod mocks;

pub use mocks::{FailingHandler, JsonHandler, RecordingHandler};
