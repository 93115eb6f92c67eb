//! Best-effort page-view counting in an external key-value store.

pub mod device;
pub mod error;
pub mod stats;
pub mod tracker;
pub mod upstash;

use serde::{Serialize, Serializer};
use serde_json::Value;

/// One entry of a pipelined request. Serializes as `["INCR", key]` / `["GET", key]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CounterCommand {
    Incr(String),
    Get(String),
}

impl CounterCommand {
    pub fn key(&self) -> &str {
        match self {
            CounterCommand::Incr(k) | CounterCommand::Get(k) => k,
        }
    }

    fn verb(&self) -> &'static str {
        match self {
            CounterCommand::Incr(_) => "INCR",
            CounterCommand::Get(_) => "GET",
        }
    }
}

impl Serialize for CounterCommand {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq([self.verb(), self.key()])
    }
}

/// A store that executes a batch of counter commands in one round trip and returns the raw
/// response document (expected to be a list parallel to `commands`).
#[async_trait::async_trait]
pub trait CounterStore: Send + Sync {
    fn store_name(&self) -> &'static str;

    async fn pipeline(&self, commands: &[CounterCommand]) -> anyhow::Result<Value>;
}
