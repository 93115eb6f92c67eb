use crate::analytics::error::CounterStoreError;
use crate::analytics::{CounterCommand, CounterStore};
use crate::config::Settings;
use anyhow::Context;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use std::time::Duration;

const STORE_NAME: &str = "upstash_rest";
const PIPELINE_PATH: &str = "/pipeline";

/// Redis-over-REST pipeline endpoint (Upstash flavour).
#[derive(Debug, Clone)]
pub struct UpstashStore {
    http: reqwest::Client,
    base_url: String,
    token: String,
}

impl UpstashStore {
    /// `None` when the URL or token is not configured; analytics are then disabled.
    pub fn from_settings(settings: &Settings) -> anyhow::Result<Option<Self>> {
        let (Some(base_url), Some(token)) = (
            settings.counter_store_url.as_deref(),
            settings.counter_store_token.as_deref(),
        ) else {
            return Ok(None);
        };

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.analytics_timeout_secs))
            .build()
            .context("failed to build counter store http client")?;

        Ok(Some(Self {
            http,
            base_url: base_url.to_string(),
            token: token.to_string(),
        }))
    }

    fn url(&self) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), PIPELINE_PATH)
    }

    fn headers(&self) -> anyhow::Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", self.token))?,
        );
        Ok(headers)
    }
}

#[async_trait::async_trait]
impl CounterStore for UpstashStore {
    fn store_name(&self) -> &'static str {
        STORE_NAME
    }

    async fn pipeline(&self, commands: &[CounterCommand]) -> anyhow::Result<serde_json::Value> {
        let res = self
            .http
            .post(self.url())
            .headers(self.headers()?)
            .json(commands)
            .send()
            .await
            .context("counter store request failed")?;

        let status = res.status();
        let text = res
            .text()
            .await
            .context("failed to read counter store response body")?;
        let raw = serde_json::from_str::<serde_json::Value>(&text);

        if !status.is_success() {
            return Err(CounterStoreError {
                store: STORE_NAME,
                stage: "http",
                detail: format!("status={status}"),
                raw_response_json: raw.ok(),
            }
            .into());
        }

        raw.map_err(|e| {
            anyhow::Error::new(CounterStoreError {
                store: STORE_NAME,
                stage: "decode",
                detail: e.to_string(),
                raw_response_json: None,
            })
        })
    }
}
