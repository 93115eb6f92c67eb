pub mod analytics;
pub mod domain;
pub mod format;
pub mod session;
pub mod storage;
pub mod time;
pub mod view;

pub mod config {
    use crate::format::mask::MaskStyle;
    use std::path::PathBuf;

    pub const DEFAULT_SNAPSHOT_PATH: &str = "data/snapshot.json";
    pub const DEFAULT_STYLE_PATH: &str = "style/style.css";
    pub const DEFAULT_ANALYTICS_APP_KEY: &str = "ap_public";
    pub const DEFAULT_ANALYTICS_TIMEOUT_SECS: u64 = 3;

    #[derive(Debug, Clone)]
    pub struct Settings {
        pub snapshot_path: PathBuf,
        pub style_path: PathBuf,
        pub counter_store_url: Option<String>,
        pub counter_store_token: Option<String>,
        pub analytics_app_key: String,
        pub analytics_timeout_secs: u64,
        pub mask_style: MaskStyle,
        pub sentry_dsn: Option<String>,
    }

    impl Default for Settings {
        fn default() -> Self {
            Self {
                snapshot_path: PathBuf::from(DEFAULT_SNAPSHOT_PATH),
                style_path: PathBuf::from(DEFAULT_STYLE_PATH),
                counter_store_url: None,
                counter_store_token: None,
                analytics_app_key: DEFAULT_ANALYTICS_APP_KEY.to_string(),
                analytics_timeout_secs: DEFAULT_ANALYTICS_TIMEOUT_SECS,
                mask_style: MaskStyle::default(),
                sentry_dsn: None,
            }
        }
    }

    impl Settings {
        pub fn from_env() -> anyhow::Result<Self> {
            let defaults = Self::default();

            let mask_style = match non_empty_var("TICKER_MASK_STYLE") {
                Some(s) => MaskStyle::parse(&s).ok_or_else(|| {
                    anyhow::anyhow!("TICKER_MASK_STYLE must be `edges` or `legacy` (got {s})")
                })?,
                None => defaults.mask_style,
            };

            Ok(Self {
                snapshot_path: non_empty_var("SNAPSHOT_PATH")
                    .map(PathBuf::from)
                    .unwrap_or(defaults.snapshot_path),
                style_path: non_empty_var("STYLE_PATH")
                    .map(PathBuf::from)
                    .unwrap_or(defaults.style_path),
                counter_store_url: non_empty_var("UPSTASH_REDIS_REST_URL"),
                counter_store_token: non_empty_var("UPSTASH_REDIS_REST_TOKEN"),
                analytics_app_key: non_empty_var("APP_ANALYTICS_KEY")
                    .unwrap_or(defaults.analytics_app_key),
                analytics_timeout_secs: non_empty_var("ANALYTICS_TIMEOUT_SECS")
                    .and_then(|s| s.parse::<u64>().ok())
                    .unwrap_or(defaults.analytics_timeout_secs),
                mask_style,
                sentry_dsn: non_empty_var("SENTRY_DSN"),
            })
        }
    }

    fn non_empty_var(name: &str) -> Option<String> {
        std::env::var(name)
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
    }
}
