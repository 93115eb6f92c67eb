use crate::domain::lenient;
use anyhow::Context;
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::fmt;

pub const DEFAULT_FOCUS_MESSAGE: &str = "No active signals in Focus List.";

/// One render pass worth of data, normalized at load time.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Snapshot {
    #[serde(deserialize_with = "lenient::object")]
    pub meta: SnapshotMeta,
    #[serde(deserialize_with = "lenient::records")]
    pub focus_view_model: Vec<FocusItem>,
    #[serde(deserialize_with = "lenient::records")]
    pub table_view_model: Vec<PortfolioRow>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SnapshotMeta {
    #[serde(deserialize_with = "lenient::text")]
    pub updated_at: Option<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub focus_message: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl SnapshotMeta {
    pub fn updated_at_display(&self) -> &str {
        self.updated_at.as_deref().unwrap_or("Unknown")
    }

    pub fn focus_message_display(&self) -> &str {
        self.focus_message.as_deref().unwrap_or(DEFAULT_FOCUS_MESSAGE)
    }
}

impl Snapshot {
    /// Parse and normalize a snapshot document.
    ///
    /// Only a document that is not JSON (or not an object) is an error. Individual records never
    /// fail: bad fields become `None`, focus items without a ticker are dropped, and a repeated
    /// focus ticker keeps its first occurrence.
    pub fn from_json_str(text: &str) -> anyhow::Result<Self> {
        let raw = serde_json::from_str::<Value>(text).context("snapshot is not valid JSON")?;
        anyhow::ensure!(raw.is_object(), "snapshot root must be a JSON object");
        let parsed = serde_json::from_value::<Snapshot>(raw)
            .context("snapshot does not match the expected shape")?;
        Ok(parsed.normalize())
    }

    fn normalize(mut self) -> Self {
        let mut seen = HashSet::new();
        self.focus_view_model.retain(|item| {
            if item.ticker.is_empty() {
                tracing::warn!("dropping focus item without ticker");
                return false;
            }
            if !seen.insert(item.ticker.clone()) {
                tracing::warn!(ticker = %item.ticker, "dropping duplicate focus item");
                return false;
            }
            true
        });
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Verdict {
    #[default]
    Watch,
    Accumulate,
    StrongAccumulate,
    Exit,
    Trim,
    HighRvolEvent,
    RatingPressure,
    EarningsMomo,
    TrendConfirmation,
    SentimentCollision,
    TrendConflictUpg,
    EventWindow,
    Other(String),
}

impl Verdict {
    pub fn parse(s: &str) -> Self {
        match s.trim().to_ascii_uppercase().as_str() {
            "" | "WATCH" => Verdict::Watch,
            "ACCUMULATE" => Verdict::Accumulate,
            "STRONG_ACCUMULATE" => Verdict::StrongAccumulate,
            "EXIT" => Verdict::Exit,
            "TRIM" => Verdict::Trim,
            "HIGH_RVOL_EVENT" => Verdict::HighRvolEvent,
            "RATING_PRESSURE" => Verdict::RatingPressure,
            "EARNINGS_MOMO" => Verdict::EarningsMomo,
            "TREND_CONFIRMATION" => Verdict::TrendConfirmation,
            "SENTIMENT_COLLISION" => Verdict::SentimentCollision,
            "TREND_CONFLICT_UPG" => Verdict::TrendConflictUpg,
            "EVENT_WINDOW" => Verdict::EventWindow,
            _ => Verdict::Other(s.trim().to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Verdict::Watch => "WATCH",
            Verdict::Accumulate => "ACCUMULATE",
            Verdict::StrongAccumulate => "STRONG_ACCUMULATE",
            Verdict::Exit => "EXIT",
            Verdict::Trim => "TRIM",
            Verdict::HighRvolEvent => "HIGH_RVOL_EVENT",
            Verdict::RatingPressure => "RATING_PRESSURE",
            Verdict::EarningsMomo => "EARNINGS_MOMO",
            Verdict::TrendConfirmation => "TREND_CONFIRMATION",
            Verdict::SentimentCollision => "SENTIMENT_COLLISION",
            Verdict::TrendConflictUpg => "TREND_CONFLICT_UPG",
            Verdict::EventWindow => "EVENT_WINDOW",
            Verdict::Other(s) => s,
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Verdict {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        Ok(lenient::text(d)?
            .map(|s| Verdict::parse(&s))
            .unwrap_or_default())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TrendColor {
    Green,
    Red,
    #[default]
    Neutral,
}

impl<'de> Deserialize<'de> for TrendColor {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        let color = lenient::text(d)?.unwrap_or_default();
        Ok(match color.to_ascii_uppercase().as_str() {
            "GREEN" => TrendColor::Green,
            "RED" => TrendColor::Red,
            _ => TrendColor::Neutral,
        })
    }
}

/// Urgency arrives as a score, but some producers write a label instead.
#[derive(Debug, Clone, PartialEq)]
pub enum Urgency {
    Score(f64),
    Label(String),
}

fn urgency<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Urgency>, D::Error> {
    let v = Value::deserialize(d)?;
    if let Some(score) = crate::format::numeric::coerce_number(&v) {
        return Ok(Some(Urgency::Score(score)));
    }
    Ok(lenient::text_of(&v).map(Urgency::Label))
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FocusItem {
    #[serde(deserialize_with = "lenient::text_or_empty")]
    pub ticker: String,
    pub verdict: Verdict,
    #[serde(deserialize_with = "lenient::text")]
    pub picked_date: Option<String>,
    #[serde(deserialize_with = "urgency")]
    pub urgency: Option<Urgency>,
    #[serde(deserialize_with = "lenient::integer")]
    pub dte: Option<i64>,
    pub trend_color: TrendColor,
    #[serde(deserialize_with = "lenient::number")]
    pub dist_sma200_pct: Option<f64>,
    #[serde(deserialize_with = "lenient::number")]
    pub dist_ema21_pct: Option<f64>,
    #[serde(deserialize_with = "lenient::number")]
    pub dist_ema55_pct: Option<f64>,
    #[serde(deserialize_with = "lenient::number")]
    pub vol_ratio: Option<f64>,
    #[serde(deserialize_with = "lenient::number")]
    pub news_sentiment_raw: Option<f64>,
    #[serde(deserialize_with = "lenient::text")]
    pub news_headline: Option<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub news_summary: Option<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub news_age: Option<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub news_sources: Option<String>,
    #[serde(deserialize_with = "lenient::number")]
    pub latest_price: Option<f64>,
    #[serde(deserialize_with = "lenient::text")]
    pub price_type: Option<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub price_timestamp: Option<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub divergence: Option<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub action_plan: Option<String>,
    #[serde(deserialize_with = "lenient::object")]
    pub trigger_details: TriggerDetails,
    #[serde(deserialize_with = "lenient::object")]
    pub logic_pillars: LogicPillars,
    #[serde(deserialize_with = "lenient::text")]
    pub primary_trigger_key: Option<String>,
    #[serde(deserialize_with = "lenient::integer")]
    pub break_confirm_days: Option<i64>,
    #[serde(deserialize_with = "lenient::flag")]
    pub volume_alert: bool,
    #[serde(deserialize_with = "lenient::text")]
    pub signal: Option<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub reason: Option<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub news: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TriggerDetails {
    #[serde(deserialize_with = "lenient::text")]
    pub trigger_type: Option<String>,
    #[serde(deserialize_with = "lenient::number")]
    pub current_price: Option<f64>,
    #[serde(deserialize_with = "lenient::text")]
    pub details: Option<String>,
    #[serde(deserialize_with = "lenient::number")]
    pub key_level: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LogicPillars {
    #[serde(deserialize_with = "lenient::text")]
    pub technical: Option<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub volume_analysis: Option<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub news_catalyst: Option<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub action_plan: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PortfolioRow {
    #[serde(deserialize_with = "lenient::text_or_empty")]
    pub ticker: String,
    #[serde(deserialize_with = "lenient::text")]
    pub picked_date: Option<String>,
    #[serde(deserialize_with = "lenient::number")]
    pub last_price: Option<f64>,
    #[serde(rename = "Day%", deserialize_with = "lenient::number")]
    pub day_pct: Option<f64>,
    #[serde(deserialize_with = "lenient::count")]
    pub hold_streak_days: Option<u32>,
    #[serde(deserialize_with = "lenient::text")]
    pub earnings_fmt: Option<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub ema21_fmt: Option<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub ema55_fmt: Option<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub sma200_fmt: Option<String>,
    #[serde(deserialize_with = "lenient::number")]
    pub rsi14: Option<f64>,
    #[serde(deserialize_with = "lenient::number")]
    pub atr14_pct: Option<f64>,
    #[serde(deserialize_with = "lenient::number")]
    pub vol_ratio: Option<f64>,
    #[serde(deserialize_with = "lenient::text")]
    pub quant_rating_emoji: Option<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub value_grade: Option<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub growth_grade: Option<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub profitability_grade: Option<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub momentum_grade: Option<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub eps_revisions_grade: Option<String>,
}
