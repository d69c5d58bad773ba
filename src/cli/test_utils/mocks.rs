//! Mock implementations of the handler trait for testing

use crate::cli::executor::{CommandContext, CommandHandler, CommandOutcome};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};

/// Records every context it is called with
#[derive(Clone)]
pub struct RecordingHandler {
    pub calls: Arc<Mutex<Vec<CommandContext>>>,
}

impl RecordingHandler {
    pub fn new() -> Self {
        Self {
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn calls(&self) -> Vec<CommandContext> {
        self.calls.lock().unwrap().clone()
    }
}

impl Default for RecordingHandler {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CommandHandler for RecordingHandler {
    async fn run(&self, ctx: CommandContext) -> anyhow::Result<CommandOutcome> {
        self.calls.lock().unwrap().push(ctx);
        Ok(CommandOutcome::ok())
    }
}

/// Always fails with the same message
#[derive(Clone)]
pub struct FailingHandler {
    pub message: String,
}

impl FailingHandler {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[async_trait]
impl CommandHandler for FailingHandler {
    async fn run(&self, _ctx: CommandContext) -> anyhow::Result<CommandOutcome> {
        Err(anyhow::anyhow!(self.message.clone()))
    }
}

/// Returns a fixed JSON value and prints it as `Info:` lines otherwise
#[derive(Clone)]
pub struct JsonHandler {
    pub value: serde_json::Value,
}

impl JsonHandler {
    pub fn new(value: serde_json::Value) -> Self {
        Self { value }
    }
}

#[async_trait]
impl CommandHandler for JsonHandler {
    async fn run(&self, ctx: CommandContext) -> anyhow::Result<CommandOutcome> {
        if let serde_json::Value::Object(map) = &self.value {
            for (key, value) in map {
                let value = value.as_str().map(String::from).unwrap_or_else(|| value.to_string());
                ctx.output.info(&format!("{} {}", key, value));
            }
        }
        Ok(CommandOutcome::json(self.value.clone()))
    }
}
