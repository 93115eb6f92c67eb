use crate::domain::snapshot::PortfolioRow;
use crate::format::mask::{mask_ticker, MaskStyle};
use crate::format::numeric::{fmt_fixed, fmt_pct, fmt_price, fmt_ratio, fmt_signed_pct, parse_number};
use crate::format::trend::{trend_tags, TrendLevel, TrendTag};
use crate::format::{or_placeholder, Polarity, EM_DASH, HYPHEN, NOT_AVAILABLE};
use serde::Serialize;
use std::cmp::Ordering;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    DayPctDesc,
    TickerAsc,
    HoldDesc,
}

impl SortOrder {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "day" | "day_pct_desc" => Some(SortOrder::DayPctDesc),
            "ticker" | "ticker_asc" => Some(SortOrder::TickerAsc),
            "hold" | "hold_desc" => Some(SortOrder::HoldDesc),
            _ => None,
        }
    }

    pub fn as_param(self) -> &'static str {
        match self {
            SortOrder::DayPctDesc => "day",
            SortOrder::TickerAsc => "ticker",
            SortOrder::HoldDesc => "hold",
        }
    }
}

/// Filter and ordering of the visible portfolio list. The filter matches against the masked
/// ticker, so it reveals nothing the page does not already show.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PortfolioQuery {
    pub filter: Option<String>,
    pub sort: Option<SortOrder>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Grades {
    pub value: String,
    pub growth: String,
    pub profitability: String,
    pub momentum: String,
    pub eps_revisions: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct PortfolioRowView {
    pub ticker: String,
    pub picked_date: String,
    pub price: String,
    pub day_pct: String,
    pub day_pct_polarity: Polarity,
    pub hold: String,
    pub earnings: String,
    pub ema21: String,
    pub ema55: String,
    pub sma200: String,
    pub rsi: String,
    pub atr_pct: String,
    pub vol: String,
    pub quant: String,
    pub grades: Grades,
    pub trend: Vec<TrendTag>,
    /// `RSI 61 · Vol 1.2x · E21 175.5 · S200 150.2`
    pub tech_line: String,
    /// `Earn: 2026-02-20 · Hold: 45d`
    pub stats_line: String,
}

fn grade(value: Option<&str>) -> String {
    or_placeholder(value, HYPHEN)
}

pub fn portfolio_row(row: &PortfolioRow, style: MaskStyle) -> PortfolioRowView {
    let ema21 = or_placeholder(row.ema21_fmt.as_deref(), HYPHEN);
    let ema55 = or_placeholder(row.ema55_fmt.as_deref(), HYPHEN);
    let sma200 = or_placeholder(row.sma200_fmt.as_deref(), HYPHEN);
    let earnings = or_placeholder(row.earnings_fmt.as_deref(), HYPHEN);
    let rsi = fmt_fixed(row.rsi14, 0);
    let hold = row
        .hold_streak_days
        .map_or_else(|| NOT_AVAILABLE.to_string(), |d| d.to_string());

    let level = |s: &Option<String>| s.as_deref().and_then(parse_number);
    let trend = trend_tags(
        row.last_price,
        &[
            (TrendLevel::Ema21, level(&row.ema21_fmt)),
            (TrendLevel::Ema55, level(&row.ema55_fmt)),
            (TrendLevel::Sma200, level(&row.sma200_fmt)),
        ],
    );

    let ticker = mask_ticker(&row.ticker, style);
    PortfolioRowView {
        ticker: if ticker.is_empty() {
            EM_DASH.to_string()
        } else {
            ticker
        },
        picked_date: or_placeholder(row.picked_date.as_deref(), NOT_AVAILABLE),
        price: fmt_price(row.last_price),
        day_pct: fmt_signed_pct(row.day_pct),
        day_pct_polarity: row.day_pct.map_or(Polarity::Neutral, Polarity::of),
        tech_line: format!(
            "RSI {rsi} · Vol {} · E21 {ema21} · S200 {sma200}",
            fmt_ratio(row.vol_ratio)
        ),
        stats_line: format!("Earn: {earnings} · Hold: {hold}d"),
        hold,
        earnings,
        ema21,
        ema55,
        sma200,
        rsi,
        atr_pct: fmt_pct(row.atr14_pct, 1),
        vol: fmt_ratio(row.vol_ratio),
        quant: or_placeholder(row.quant_rating_emoji.as_deref(), HYPHEN),
        grades: Grades {
            value: grade(row.value_grade.as_deref()),
            growth: grade(row.growth_grade.as_deref()),
            profitability: grade(row.profitability_grade.as_deref()),
            momentum: grade(row.momentum_grade.as_deref()),
            eps_revisions: grade(row.eps_revisions_grade.as_deref()),
        },
        trend,
    }
}

/// Unavailable values sort after every available one, whatever the direction.
fn desc_available_first<T: PartialOrd>(a: Option<T>, b: Option<T>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => b.partial_cmp(&a).unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Apply `query` and build the visible rows. Sorting is stable, so ties keep snapshot order.
pub fn portfolio_rows(
    rows: &[PortfolioRow],
    query: &PortfolioQuery,
    style: MaskStyle,
) -> Vec<PortfolioRowView> {
    let needle = query
        .filter
        .as_deref()
        .map(|f| f.trim().to_uppercase())
        .filter(|f| !f.is_empty());

    let mut visible: Vec<(&PortfolioRow, PortfolioRowView)> = rows
        .iter()
        .map(|r| (r, portfolio_row(r, style)))
        .filter(|(_, v)| needle.as_deref().map_or(true, |n| v.ticker.contains(n)))
        .collect();

    match query.sort {
        Some(SortOrder::DayPctDesc) => {
            visible.sort_by(|(a, _), (b, _)| desc_available_first(a.day_pct, b.day_pct))
        }
        Some(SortOrder::TickerAsc) => visible.sort_by(|(_, a), (_, b)| a.ticker.cmp(&b.ticker)),
        Some(SortOrder::HoldDesc) => visible.sort_by(|(a, _), (b, _)| {
            desc_available_first(a.hold_streak_days, b.hold_streak_days)
        }),
        None => {}
    }

    visible.into_iter().map(|(_, v)| v).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::snapshot::Snapshot;
    use serde_json::json;

    fn rows() -> Vec<PortfolioRow> {
        let doc = json!({
            "table_view_model": [
                {"ticker": "AAPL", "Day%": "0.5", "hold_streak_days": 10, "last_price": 190.0,
                 "ema21_fmt": "185.2", "ema55_fmt": "", "sma200_fmt": "201.0 (-5.5%)",
                 "rsi14": "61.4", "atr14_pct": 2.04, "vol_ratio": "1.26x", "value_grade": "B+"},
                {"ticker": "MSFT", "Day%": null, "hold_streak_days": "45"},
                {"ticker": "NVDA", "Day%": -1.25, "hold_streak_days": 3},
                {"ticker": "AMZN", "Day%": 2.0},
                {"ticker": "", "Day%": "n/a"}
            ]
        });
        Snapshot::from_json_str(&doc.to_string()).unwrap().table_view_model
    }

    fn tickers(views: &[PortfolioRowView]) -> Vec<&str> {
        views.iter().map(|v| v.ticker.as_str()).collect()
    }

    #[test]
    fn formats_row_and_tolerates_gaps() {
        let views = portfolio_rows(&rows(), &PortfolioQuery::default(), MaskStyle::Edges);
        let a = &views[0];
        assert_eq!(a.ticker, "A**L");
        assert_eq!(a.price, "$190.00");
        assert_eq!(a.day_pct, "+0.50%");
        assert_eq!(a.day_pct_polarity, Polarity::Positive);
        assert_eq!(a.rsi, "61");
        assert_eq!(a.atr_pct, "2.0%");
        assert_eq!(a.vol, "1.3x");
        assert_eq!(a.ema55, "-");
        assert_eq!(a.grades.value, "B+");
        assert_eq!(a.grades.growth, "-");
        assert_eq!(a.tech_line, "RSI 61 · Vol 1.3x · E21 185.2 · S200 201.0 (-5.5%)");
        assert_eq!(a.stats_line, "Earn: - · Hold: 10d");
        let labels: Vec<_> = a.trend.iter().map(|t| t.label.as_str()).collect();
        assert_eq!(labels, vec!["above EMA21", "below SMA200"]);

        let m = &views[1];
        assert_eq!(m.price, "N/A");
        assert_eq!(m.day_pct, "N/A");
        assert_eq!(m.day_pct_polarity, Polarity::Neutral);
        assert_eq!(m.hold, "45");
        assert_eq!(m.trend, vec![TrendTag::unavailable()]);

        let blank = &views[4];
        assert_eq!(blank.ticker, "—");
        assert_eq!(blank.day_pct, "N/A");
    }

    #[test]
    fn sorts_by_day_pct_with_unavailable_last() {
        let q = PortfolioQuery {
            sort: Some(SortOrder::DayPctDesc),
            ..Default::default()
        };
        let views = portfolio_rows(&rows(), &q, MaskStyle::Edges);
        assert_eq!(tickers(&views), vec!["A**N", "A**L", "N**A", "M**T", "—"]);
    }

    #[test]
    fn sorts_by_hold_and_ticker() {
        let hold = PortfolioQuery {
            sort: Some(SortOrder::HoldDesc),
            ..Default::default()
        };
        let views = portfolio_rows(&rows(), &hold, MaskStyle::Edges);
        assert_eq!(tickers(&views), vec!["M**T", "A**L", "N**A", "A**N", "—"]);

        let by_ticker = PortfolioQuery {
            sort: Some(SortOrder::TickerAsc),
            ..Default::default()
        };
        let views = portfolio_rows(&rows(), &by_ticker, MaskStyle::Edges);
        assert_eq!(tickers(&views), vec!["A**L", "A**N", "M**T", "N**A", "—"]);
    }

    #[test]
    fn filters_on_masked_ticker() {
        let q = PortfolioQuery {
            filter: Some("a".to_string()),
            sort: None,
        };
        let views = portfolio_rows(&rows(), &q, MaskStyle::Edges);
        assert_eq!(tickers(&views), vec!["A**L", "N**A", "A**N"]);

        let hidden = PortfolioQuery {
            filter: Some("APP".to_string()),
            sort: None,
        };
        assert!(portfolio_rows(&rows(), &hidden, MaskStyle::Edges).is_empty());
    }

    #[test]
    fn parses_sort_params() {
        assert_eq!(SortOrder::parse("Day"), Some(SortOrder::DayPctDesc));
        assert_eq!(SortOrder::parse("hold_desc"), Some(SortOrder::HoldDesc));
        assert_eq!(SortOrder::parse("price"), None);
    }
}
