use serde_json::Value;
use std::fmt;

#[derive(Debug, Clone)]
pub struct CounterStoreError {
    pub store: &'static str,
    pub stage: &'static str,
    pub detail: String,
    pub raw_response_json: Option<Value>,
}

impl fmt::Display for CounterStoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "counter store error (store={}, stage={}): {}",
            self.store, self.stage, self.detail
        )
    }
}

impl std::error::Error for CounterStoreError {}
