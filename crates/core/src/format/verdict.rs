use crate::domain::snapshot::{TrendColor, Verdict};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskStance {
    RiskOn,
    RiskOff,
    Neutral,
}

impl RiskStance {
    pub fn as_str(self) -> &'static str {
        match self {
            RiskStance::RiskOn => "RISK_ON",
            RiskStance::RiskOff => "RISK_OFF",
            RiskStance::Neutral => "NEUTRAL",
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            RiskStance::RiskOn => "🟢",
            RiskStance::RiskOff => "🔴",
            RiskStance::Neutral => "👀",
        }
    }
}

/// Static mapping for one verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VerdictProfile {
    pub stance: RiskStance,
    pub catalyst: &'static str,
    pub next_action: &'static str,
}

const fn profile(
    stance: RiskStance,
    catalyst: &'static str,
    next_action: &'static str,
) -> VerdictProfile {
    VerdictProfile {
        stance,
        catalyst,
        next_action,
    }
}

/// Lookup for a known verdict; unknown verdicts fall back on the trend color.
pub fn verdict_profile(verdict: &Verdict, trend: TrendColor) -> VerdictProfile {
    use RiskStance::*;
    match verdict {
        Verdict::Watch => profile(Neutral, "no active catalyst", "Watch only"),
        Verdict::Accumulate => profile(RiskOn, "accumulation setup", "Scale in on pullbacks"),
        Verdict::StrongAccumulate => {
            profile(RiskOn, "strong accumulation setup", "Build position on strength")
        }
        Verdict::Exit => profile(RiskOff, "exit rule triggered", "Exit position"),
        Verdict::Trim => profile(RiskOff, "trim rule triggered", "Trim into strength"),
        Verdict::HighRvolEvent => profile(
            Neutral,
            "high relative volume event",
            "Wait for volume to normalize before acting",
        ),
        Verdict::RatingPressure => profile(RiskOff, "rating pressure", "Reduce exposure"),
        Verdict::EarningsMomo => profile(
            RiskOn,
            "post-earnings momentum",
            "Hold; add only after the ban window clears",
        ),
        Verdict::TrendConfirmation => profile(RiskOn, "trend confirmed", "Add on confirmation"),
        Verdict::SentimentCollision => profile(
            Neutral,
            "sentiment diverges from price",
            "Stand aside until sentiment and price agree",
        ),
        Verdict::TrendConflictUpg => profile(
            Neutral,
            "upgrade against the prevailing trend",
            "Wait for trend alignment",
        ),
        Verdict::EventWindow => profile(
            Neutral,
            "event window open",
            "No new entries until the event passes",
        ),
        Verdict::Other(_) => match trend {
            TrendColor::Green => profile(RiskOn, "unmapped verdict", "Monitor for entry"),
            TrendColor::Red => profile(RiskOff, "unmapped verdict", "Watch only"),
            TrendColor::Neutral => profile(Neutral, "unmapped verdict", "Watch only"),
        },
    }
}

pub fn trend_word(trend: TrendColor) -> &'static str {
    match trend {
        TrendColor::Green => "bullish",
        TrendColor::Red => "bearish",
        TrendColor::Neutral => "neutral",
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Narrative {
    pub stance: RiskStance,
    pub summary: String,
    pub next_action: String,
}

/// One-line directional summary plus the recommended next action.
pub fn narrative(verdict: &Verdict, trend: TrendColor, dist_sma200_pct: Option<f64>) -> Narrative {
    let p = verdict_profile(verdict, trend);
    let distance = match dist_sma200_pct {
        Some(d) => format!("{d:+.1}% vs SMA200"),
        None => "SMA200 n/a".to_string(),
    };
    Narrative {
        stance: p.stance,
        summary: format!(
            "{} · {} · {} · {}",
            p.stance.as_str(),
            p.catalyst,
            distance,
            trend_word(trend)
        ),
        next_action: p.next_action.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_verdict_summary() {
        let n = narrative(&Verdict::Accumulate, TrendColor::Green, Some(12.44));
        assert_eq!(n.stance, RiskStance::RiskOn);
        assert_eq!(
            n.summary,
            "RISK_ON · accumulation setup · +12.4% vs SMA200 · bullish"
        );
        assert_eq!(n.next_action, "Scale in on pullbacks");
    }

    #[test]
    fn exit_is_risk_off_regardless_of_trend() {
        let n = narrative(&Verdict::Exit, TrendColor::Green, None);
        assert_eq!(n.stance, RiskStance::RiskOff);
        assert!(n.summary.contains("SMA200 n/a"));
    }

    #[test]
    fn unknown_verdict_falls_back_on_trend() {
        let other = Verdict::Other("MYSTERY".to_string());
        let green = narrative(&other, TrendColor::Green, Some(-3.0));
        assert_eq!(green.stance, RiskStance::RiskOn);
        assert_eq!(green.next_action, "Monitor for entry");
        assert!(green.summary.ends_with("bullish"));

        let red = narrative(&other, TrendColor::Red, None);
        assert_eq!(red.stance, RiskStance::RiskOff);
        assert_eq!(red.next_action, "Watch only");

        let flat = narrative(&other, TrendColor::Neutral, None);
        assert_eq!(flat.stance, RiskStance::Neutral);
        assert_eq!(flat.next_action, "Watch only");
        assert!(flat.summary.ends_with("neutral"));
    }

    #[test]
    fn every_known_verdict_has_an_action() {
        for v in [
            Verdict::Watch,
            Verdict::Accumulate,
            Verdict::StrongAccumulate,
            Verdict::Exit,
            Verdict::Trim,
            Verdict::HighRvolEvent,
            Verdict::RatingPressure,
            Verdict::EarningsMomo,
            Verdict::TrendConfirmation,
            Verdict::SentimentCollision,
            Verdict::TrendConflictUpg,
            Verdict::EventWindow,
        ] {
            assert!(!verdict_profile(&v, TrendColor::Neutral).next_action.is_empty());
        }
    }
}
