use crate::domain::snapshot::{FocusItem, Urgency};
use crate::format::catalyst::{catalyst_label, BanWindow};
use crate::format::evidence::strip_evidence_refs;
use crate::format::mask::{mask_ticker, MaskStyle};
use crate::format::numeric::{fmt_price, fmt_ratio};
use crate::format::setup::{classify_setup, SetupClass};
use crate::format::trend::{trend_tags_from_distances, TrendLevel, TrendTag};
use crate::format::verdict::{narrative, Narrative};
use crate::format::{or_placeholder, summarize, Polarity, EM_DASH, NOT_AVAILABLE};
use serde::Serialize;

pub const DETAILS_SUMMARY_CHARS: usize = 200;
pub const ACTION_PLAN_SUMMARY_CHARS: usize = 250;

/// One entry of the focus scan list.
#[derive(Debug, Clone, Serialize)]
pub struct FocusCard {
    pub index: usize,
    pub ticker: String,
    pub headline: String,
    pub nav_label: String,
    pub picked_date: String,
    pub verdict: String,
    pub verdict_icon: &'static str,
    pub signal: String,
    pub urgency: String,
    pub news: String,
    pub setup: SetupClass,
    pub catalyst: String,
    pub trend: Vec<TrendTag>,
    pub selected: bool,
}

/// Text shown as a summary with the untruncated version behind an expander.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextBlock {
    pub summary: String,
    /// Present only when `summary` was truncated.
    pub full: Option<String>,
}

impl TextBlock {
    fn new(text: &str, max_chars: usize) -> Self {
        let summary = summarize(text, max_chars);
        let full = (summary != text).then(|| text.to_string());
        Self { summary, full }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SetupCard {
    pub setup: SetupClass,
    pub trigger_type: String,
    pub price: String,
    pub key_level: String,
    pub details: TextBlock,
}

#[derive(Debug, Clone, Serialize)]
pub struct Pillars {
    pub technical: String,
    pub volume: String,
    pub news: String,
    pub divergence: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewsBlock {
    pub headline: String,
    pub summary: String,
    pub age: String,
    pub sources: String,
    pub sentiment: String,
    pub sentiment_polarity: Polarity,
}

#[derive(Debug, Clone, Serialize)]
pub struct FocusDetail {
    pub index: usize,
    pub ticker: String,
    pub picked_date: String,
    pub verdict: String,
    pub verdict_icon: &'static str,
    pub urgency: String,
    pub signal: String,
    pub setup_card: SetupCard,
    pub action_plan: Option<TextBlock>,
    pub pillars: Pillars,
    pub narrative: Narrative,
    pub catalyst: String,
    pub ban_window: BanWindow,
    pub ban_label: String,
    pub break_confirm: Option<String>,
    pub news: NewsBlock,
    pub latest_price: String,
    pub price_type: String,
    pub price_timestamp: String,
    pub vol_ratio: String,
    pub trend: Vec<TrendTag>,
}

/// `N/A` when absent; `Excluded` for a zero score whose reason says so; one decimal otherwise.
pub fn fmt_urgency(urgency: Option<&Urgency>, reason: Option<&str>) -> String {
    match urgency {
        None => NOT_AVAILABLE.to_string(),
        Some(Urgency::Score(s)) if *s == 0.0 && reason.is_some_and(|r| r.contains("Excluded")) => {
            "Excluded".to_string()
        }
        Some(Urgency::Score(s)) => format!("{s:.1}"),
        Some(Urgency::Label(l)) => l.clone(),
    }
}

fn focus_trend(item: &FocusItem) -> Vec<TrendTag> {
    trend_tags_from_distances(&[
        (TrendLevel::Ema21, item.dist_ema21_pct),
        (TrendLevel::Ema55, item.dist_ema55_pct),
        (TrendLevel::Sma200, item.dist_sma200_pct),
    ])
}

fn pillar(text: Option<&str>) -> String {
    let cleaned = strip_evidence_refs(text);
    if cleaned.is_empty() {
        NOT_AVAILABLE.to_string()
    } else {
        cleaned
    }
}

pub fn focus_card(index: usize, item: &FocusItem, style: MaskStyle, selected: bool) -> FocusCard {
    let ticker = mask_ticker(&item.ticker, style);
    let picked = or_placeholder(item.picked_date.as_deref(), NOT_AVAILABLE);
    let stance = narrative(&item.verdict, item.trend_color, item.dist_sma200_pct).stance;
    let verdict = item.verdict.to_string();

    FocusCard {
        index,
        headline: format!("{ticker}(Picked: {picked})"),
        nav_label: format!("{ticker} {} {verdict}", stance.icon()),
        ticker,
        picked_date: picked,
        verdict_icon: stance.icon(),
        verdict,
        signal: or_placeholder(item.signal.as_deref(), EM_DASH),
        urgency: fmt_urgency(item.urgency.as_ref(), item.reason.as_deref()),
        news: or_placeholder(item.news.as_deref(), EM_DASH),
        setup: classify_setup(item),
        catalyst: catalyst_label(item.dte),
        trend: focus_trend(item),
        selected,
    }
}

pub fn focus_detail(index: usize, item: &FocusItem, style: MaskStyle) -> FocusDetail {
    let td = &item.trigger_details;
    let logic = &item.logic_pillars;
    let story = narrative(&item.verdict, item.trend_color, item.dist_sma200_pct);
    let ban = BanWindow::from_dte(item.dte);

    let details = td.details.as_deref().unwrap_or("No details available.");
    let action_plan = strip_evidence_refs(
        item.action_plan
            .as_deref()
            .or(logic.action_plan.as_deref()),
    );

    FocusDetail {
        index,
        ticker: mask_ticker(&item.ticker, style),
        picked_date: or_placeholder(item.picked_date.as_deref(), NOT_AVAILABLE),
        verdict: item.verdict.to_string(),
        verdict_icon: story.stance.icon(),
        urgency: fmt_urgency(item.urgency.as_ref(), item.reason.as_deref()),
        signal: or_placeholder(item.signal.as_deref(), EM_DASH),
        setup_card: SetupCard {
            setup: classify_setup(item),
            trigger_type: or_placeholder(td.trigger_type.as_deref(), NOT_AVAILABLE),
            price: fmt_price(td.current_price.or(item.latest_price)),
            key_level: fmt_price(td.key_level),
            details: TextBlock::new(details, DETAILS_SUMMARY_CHARS),
        },
        action_plan: (!action_plan.is_empty())
            .then(|| TextBlock::new(&action_plan, ACTION_PLAN_SUMMARY_CHARS)),
        pillars: Pillars {
            technical: pillar(logic.technical.as_deref()),
            volume: pillar(logic.volume_analysis.as_deref()),
            news: pillar(logic.news_catalyst.as_deref()),
            divergence: pillar(item.divergence.as_deref()),
        },
        narrative: story,
        catalyst: catalyst_label(item.dte),
        ban_window: ban,
        ban_label: ban.label(),
        break_confirm: item
            .break_confirm_days
            .map(|d| format!("Break confirmation: {d}d")),
        news: NewsBlock {
            headline: or_placeholder(item.news_headline.as_deref(), EM_DASH),
            summary: strip_evidence_refs(item.news_summary.as_deref()),
            age: or_placeholder(item.news_age.as_deref(), EM_DASH),
            sources: or_placeholder(item.news_sources.as_deref(), EM_DASH),
            sentiment: item
                .news_sentiment_raw
                .map_or_else(|| NOT_AVAILABLE.to_string(), |s| format!("{s:+.2}")),
            sentiment_polarity: item
                .news_sentiment_raw
                .map_or(Polarity::Neutral, Polarity::of),
        },
        latest_price: fmt_price(item.latest_price),
        price_type: or_placeholder(item.price_type.as_deref(), EM_DASH),
        price_timestamp: or_placeholder(item.price_timestamp.as_deref(), EM_DASH),
        vol_ratio: fmt_ratio(item.vol_ratio),
        trend: focus_trend(item),
    }
}
