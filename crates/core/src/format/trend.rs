use super::Polarity;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrendLevel {
    Ema21,
    Ema55,
    Sma200,
}

impl TrendLevel {
    pub fn label(self) -> &'static str {
        match self {
            TrendLevel::Ema21 => "EMA21",
            TrendLevel::Ema55 => "EMA55",
            TrendLevel::Sma200 => "SMA200",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendTag {
    pub label: String,
    pub polarity: Polarity,
}

impl TrendTag {
    fn relative(level: TrendLevel, above: bool) -> Self {
        let (side, polarity) = if above {
            ("above", Polarity::Positive)
        } else {
            ("below", Polarity::Negative)
        };
        Self {
            label: format!("{side} {}", level.label()),
            polarity,
        }
    }

    pub fn unavailable() -> Self {
        Self {
            label: "trend unavailable".to_string(),
            polarity: Polarity::Neutral,
        }
    }
}

/// Tag `price` against each reference level. Levels (or a price) that are unavailable produce no
/// tag; when nothing can be tagged the result is the single `trend unavailable` placeholder.
pub fn trend_tags(price: Option<f64>, levels: &[(TrendLevel, Option<f64>)]) -> Vec<TrendTag> {
    let tags: Vec<TrendTag> = match price {
        Some(price) => levels
            .iter()
            .filter_map(|(level, value)| value.map(|v| TrendTag::relative(*level, price >= v)))
            .collect(),
        None => Vec::new(),
    };
    or_unavailable(tags)
}

/// Same tags from signed distances (`(price - level) / level` in percent), as carried by focus
/// items.
pub fn trend_tags_from_distances(distances: &[(TrendLevel, Option<f64>)]) -> Vec<TrendTag> {
    let tags = distances
        .iter()
        .filter_map(|(level, dist)| dist.map(|d| TrendTag::relative(*level, d >= 0.0)))
        .collect();
    or_unavailable(tags)
}

fn or_unavailable(tags: Vec<TrendTag>) -> Vec<TrendTag> {
    if tags.is_empty() {
        vec![TrendTag::unavailable()]
    } else {
        tags
    }
}
