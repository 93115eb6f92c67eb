use crate::domain::snapshot::FocusItem;
use serde::Serialize;

/// Earnings within this many days (inclusive) dominate every other signal.
pub const IMMINENT_DTE_MAX: i64 = 5;

/// Absolute sentiment score at or above which news counts as a shock.
pub const NEWS_SHOCK_THRESHOLD: f64 = 0.6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SetupClass {
    ImminentCatalyst,
    VolMomentum,
    NewsShock,
    BreakRisk,
    Watch,
}

impl SetupClass {
    pub fn as_str(self) -> &'static str {
        match self {
            SetupClass::ImminentCatalyst => "IMMINENT_CATALYST",
            SetupClass::VolMomentum => "VOL_MOMENTUM",
            SetupClass::NewsShock => "NEWS_SHOCK",
            SetupClass::BreakRisk => "BREAK_RISK",
            SetupClass::Watch => "WATCH",
        }
    }
}

/// Classify a focus item. First match wins:
///
/// | # | condition                                                    | class               |
/// |---|--------------------------------------------------------------|---------------------|
/// | 1 | `dte` in `0..=5`, or trigger text mentions earnings           | `IMMINENT_CATALYST` |
/// | 2 | `volume_alert`, or trigger text mentions volume               | `VOL_MOMENTUM`      |
/// | 3 | `abs(news_sentiment_raw) >= 0.6`                              | `NEWS_SHOCK`        |
/// | 4 | trigger text mentions a break, sell rule or gap down          | `BREAK_RISK`        |
/// | 5 | otherwise                                                     | `WATCH`             |
///
/// Trigger text is the trigger type, primary trigger key and signal, lowercased with `_`/`-`
/// read as spaces.
pub fn classify_setup(item: &FocusItem) -> SetupClass {
    let text = trigger_text(item);

    let imminent = item
        .dte
        .is_some_and(|d| (0..=IMMINENT_DTE_MAX).contains(&d));
    if imminent || text.contains("earning") {
        return SetupClass::ImminentCatalyst;
    }

    if item.volume_alert || mentions_volume(&text) {
        return SetupClass::VolMomentum;
    }

    if item
        .news_sentiment_raw
        .is_some_and(|s| s.abs() >= NEWS_SHOCK_THRESHOLD)
    {
        return SetupClass::NewsShock;
    }

    if mentions_break(&text) {
        return SetupClass::BreakRisk;
    }

    SetupClass::Watch
}

fn trigger_text(item: &FocusItem) -> String {
    [
        item.trigger_details.trigger_type.as_deref(),
        item.primary_trigger_key.as_deref(),
        item.signal.as_deref(),
    ]
    .into_iter()
    .flatten()
    .collect::<Vec<_>>()
    .join(" ")
    .to_lowercase()
    .replace(['_', '-'], " ")
}

fn mentions_volume(text: &str) -> bool {
    text.contains("volume")
        || text
            .split_whitespace()
            .any(|w| matches!(w, "vol" | "rvol"))
}

/// `break*` words that describe strength or stop management rather than a support break.
const NOT_A_BREAK: [&str; 2] = ["breakout", "breakeven"];

fn mentions_break(text: &str) -> bool {
    let breaks = text
        .split_whitespace()
        .any(|w| w.starts_with("break") && !NOT_A_BREAK.iter().any(|p| w.starts_with(p)));
    breaks || text.contains("sell rule") || text.contains("gap down") || text.contains("gapdown")
}
