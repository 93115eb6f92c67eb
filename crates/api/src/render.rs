//! Server-side HTML for the dashboard page.
//!
//! - desktop: four-column focus grid, detail panel, full portfolio table
//! - mobile: stacked focus cards, detail panel, portfolio cards with mini lines
//!
//! Every interpolated value goes through [`escape`].

use watchboard_core::format::trend::TrendTag;
use watchboard_core::format::Polarity;
use watchboard_core::view::focus::{FocusCard, FocusDetail, TextBlock};
use watchboard_core::view::portfolio::{PortfolioQuery, PortfolioRowView, SortOrder};
use watchboard_core::view::{Dashboard, Layout, ReadyDashboard};

const TITLE: &str = "Watchboard";

pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Percent-encode a query-string value (unreserved characters pass through).
fn encode_query_value(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for b in value.bytes() {
        match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(b as char)
            }
            _ => out.push_str(&format!("%{b:02X}")),
        }
    }
    out
}

/// Link back to `/` keeping the portfolio query.
pub fn page_href(select: Option<usize>, query: &PortfolioQuery, view: Option<Layout>) -> String {
    let mut params = Vec::new();
    if let Some(i) = select {
        params.push(format!("select={i}"));
    }
    if let Some(f) = query.filter.as_deref().filter(|f| !f.trim().is_empty()) {
        params.push(format!("filter={}", encode_query_value(f.trim())));
    }
    if let Some(s) = query.sort {
        params.push(format!("sort={}", s.as_param()));
    }
    match view {
        Some(Layout::Mobile) => params.push("view=mobile".to_string()),
        Some(Layout::Desktop) => params.push("view=desktop".to_string()),
        None => {}
    }
    if params.is_empty() {
        "/".to_string()
    } else {
        format!("/?{}", params.join("&"))
    }
}

fn polarity_class(p: Polarity) -> &'static str {
    match p {
        Polarity::Positive => "pos",
        Polarity::Negative => "neg",
        Polarity::Neutral => "neutral",
    }
}

fn trend_badges(tags: &[TrendTag]) -> String {
    tags.iter()
        .map(|t| {
            format!(
                r#"<span class="tag {}">{}</span>"#,
                polarity_class(t.polarity),
                escape(&t.label)
            )
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn text_block(block: &TextBlock) -> String {
    match &block.full {
        None => format!("<p>{}</p>", escape(&block.summary)),
        Some(full) => format!(
            "<p>{}</p><details><summary>Read full</summary><p>{}</p></details>",
            escape(&block.summary),
            escape(full)
        ),
    }
}

pub fn render_page(dashboard: &Dashboard, css: Option<&str>) -> String {
    let body = match dashboard {
        Dashboard::Offline { message } => {
            format!(r#"<main class="offline"><h2>{}</h2></main>"#, escape(message))
        }
        Dashboard::Ready(ready) => render_ready(ready),
    };
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{TITLE}</title>
    <style>
{css}
    </style>
</head>
<body>
{body}
</body>
</html>"#,
        css = css.unwrap_or_default(),
    )
}

fn render_ready(d: &ReadyDashboard) -> String {
    let selected = d.selected.as_ref().map(|s| s.index);
    let (other_layout, other_label) = match d.layout {
        Layout::Desktop => (Layout::Mobile, "Mobile view"),
        Layout::Mobile => (Layout::Desktop, "Desktop view"),
    };
    let header = format!(
        r#"<header><h1>{TITLE}</h1><span class="updated">Updated: {}</span><a class="switch" href="{}">{other_label}</a></header>"#,
        escape(&d.updated_at),
        escape(&page_href(selected, &d.portfolio_query, Some(other_layout))),
    );

    let focus = match &d.focus_message {
        Some(msg) => format!(r#"<p class="info">{}</p>"#, escape(msg)),
        None => focus_cards(&d.focus, &d.portfolio_query, d.layout),
    };
    let detail = d.selected.as_ref().map(focus_detail).unwrap_or_default();
    let portfolio = match &d.portfolio_message {
        Some(msg) => format!(r#"<p class="info">{}</p>"#, escape(msg)),
        None => portfolio_section(d),
    };

    let layout_class = match d.layout {
        Layout::Desktop => "desktop",
        Layout::Mobile => "mobile",
    };
    format!(
        r#"<main class="{layout_class}">
{header}
<section class="focus"><h2>Focus</h2>
{focus}
</section>
{detail}
<section class="portfolio"><h2>Portfolio</h2>
{portfolio}
</section>
</main>"#
    )
}

fn focus_cards(cards: &[FocusCard], query: &PortfolioQuery, layout: Layout) -> String {
    let container = match layout {
        Layout::Desktop => "focus-grid",
        Layout::Mobile => "focus-list",
    };
    let items: String = cards
        .iter()
        .map(|c| {
            let class = if c.selected { "card selected" } else { "card" };
            format!(
                r#"<a class="{class}" href="{href}">
<div class="card-title">{headline}</div>
<div class="verdict">{icon} {verdict}</div>
<div class="meta">Signal: {signal}</div>
<div class="meta">Urgency: {urgency} · {setup} · {catalyst}</div>
<div class="meta">News: {news}</div>
<div class="trend">{trend}</div>
</a>"#,
                href = escape(&page_href(Some(c.index), query, None)),
                headline = escape(&c.headline),
                icon = c.verdict_icon,
                verdict = escape(&c.verdict),
                signal = escape(&c.signal),
                urgency = escape(&c.urgency),
                setup = c.setup.as_str(),
                catalyst = escape(&c.catalyst),
                news = escape(&c.news),
                trend = trend_badges(&c.trend),
            )
        })
        .collect();
    format!(r#"<div class="{container}">{items}</div>"#)
}

fn focus_detail(d: &FocusDetail) -> String {
    let setup = &d.setup_card;
    let action_plan = d
        .action_plan
        .as_ref()
        .map(|plan| {
            format!(
                r#"<div class="panel"><h3>Action plan</h3>{}</div>"#,
                text_block(plan)
            )
        })
        .unwrap_or_default();
    let break_confirm = d
        .break_confirm
        .as_deref()
        .map(|b| format!(r#"<div class="meta">{}</div>"#, escape(b)))
        .unwrap_or_default();
    let news_summary = if d.news.summary.is_empty() {
        String::new()
    } else {
        format!("<p>{}</p>", escape(&d.news.summary))
    };
    let ban_class = if d.ban_window.blocks_entries() {
        "ban blocked"
    } else {
        "ban"
    };

    format!(
        r#"<section class="detail">
<h2>{ticker} {icon} {verdict}</h2>
<div class="meta">Picked: {picked} · Urgency: {urgency} · Signal: {signal}</div>
<div class="panel"><h3>Setup: {setup_class}</h3>
<div class="meta">{trigger} · Price {price} · Key level {key_level}</div>
{details}
</div>
{action_plan}
<div class="panel"><h3>Narrative</h3>
<p>{stance_icon} {summary}</p>
<p class="next">Next: {next_action}</p>
</div>
<div class="panel pillars"><h3>Logic</h3>
<dl><dt>Technical</dt><dd>{technical}</dd><dt>Volume</dt><dd>{volume}</dd><dt>News</dt><dd>{news_pillar}</dd><dt>Divergence</dt><dd>{divergence}</dd></dl>
</div>
<div class="panel"><h3>Catalyst: {catalyst}</h3>
<div class="{ban_class}">{ban_label}</div>
{break_confirm}
</div>
<div class="panel"><h3>News</h3>
<div class="headline">{headline}</div>
{news_summary}
<div class="meta">{age} · {sources} · Sentiment <span class="{sentiment_class}">{sentiment}</span></div>
</div>
<div class="meta">Latest {latest_price} ({price_type}, {price_timestamp}) · Vol {vol_ratio}</div>
<div class="trend">{trend}</div>
</section>"#,
        ticker = escape(&d.ticker),
        icon = d.verdict_icon,
        verdict = escape(&d.verdict),
        picked = escape(&d.picked_date),
        urgency = escape(&d.urgency),
        signal = escape(&d.signal),
        setup_class = setup.setup.as_str(),
        trigger = escape(&setup.trigger_type),
        price = escape(&setup.price),
        key_level = escape(&setup.key_level),
        details = text_block(&setup.details),
        stance_icon = d.narrative.stance.icon(),
        summary = escape(&d.narrative.summary),
        next_action = escape(&d.narrative.next_action),
        technical = escape(&d.pillars.technical),
        volume = escape(&d.pillars.volume),
        news_pillar = escape(&d.pillars.news),
        divergence = escape(&d.pillars.divergence),
        catalyst = escape(&d.catalyst),
        ban_label = escape(&d.ban_label),
        headline = escape(&d.news.headline),
        age = escape(&d.news.age),
        sources = escape(&d.news.sources),
        sentiment_class = polarity_class(d.news.sentiment_polarity),
        sentiment = escape(&d.news.sentiment),
        latest_price = escape(&d.latest_price),
        price_type = escape(&d.price_type),
        price_timestamp = escape(&d.price_timestamp),
        vol_ratio = escape(&d.vol_ratio),
        trend = trend_badges(&d.trend),
    )
}

fn portfolio_controls(d: &ReadyDashboard) -> String {
    let selected = d.selected.as_ref().map(|s| s.index);
    let query = &d.portfolio_query;
    let filter = query.filter.as_deref().unwrap_or_default();
    let hidden_select = selected
        .map(|i| format!(r#"<input type="hidden" name="select" value="{i}">"#))
        .unwrap_or_default();
    let hidden_sort = query
        .sort
        .map(|s| format!(r#"<input type="hidden" name="sort" value="{}">"#, s.as_param()))
        .unwrap_or_default();

    let sort_links: String = [
        (SortOrder::DayPctDesc, "Day%"),
        (SortOrder::TickerAsc, "Ticker"),
        (SortOrder::HoldDesc, "Hold"),
    ]
    .into_iter()
    .map(|(order, label)| {
        let q = PortfolioQuery {
            filter: query.filter.clone(),
            sort: Some(order),
        };
        let class = if query.sort == Some(order) { "sort active" } else { "sort" };
        format!(
            r#"<a class="{class}" href="{}">{label}</a>"#,
            escape(&page_href(selected, &q, None))
        )
    })
    .collect();

    format!(
        r#"<form class="controls" method="get" action="/">{hidden_select}{hidden_sort}<input type="search" name="filter" placeholder="Filter ticker" value="{}"><button type="submit">Apply</button> Sort: {sort_links}</form>"#,
        escape(filter)
    )
}

fn portfolio_section(d: &ReadyDashboard) -> String {
    let controls = portfolio_controls(d);
    let body = match d.layout {
        Layout::Desktop => portfolio_table(&d.portfolio),
        Layout::Mobile => portfolio_cards(&d.portfolio),
    };
    format!("{controls}\n{body}")
}

fn portfolio_table(rows: &[PortfolioRowView]) -> String {
    let body: String = rows
        .iter()
        .map(|r| {
            let g = &r.grades;
            let cells = [
                escape(&r.ticker),
                escape(&r.picked_date),
                escape(&r.price),
                format!(
                    r#"<span class="{}">{}</span>"#,
                    polarity_class(r.day_pct_polarity),
                    escape(&r.day_pct)
                ),
                escape(&r.hold),
                escape(&r.earnings),
                escape(&r.ema21),
                escape(&r.ema55),
                escape(&r.sma200),
                escape(&r.rsi),
                escape(&r.atr_pct),
                escape(&r.vol),
                escape(&r.quant),
                escape(&g.value),
                escape(&g.growth),
                escape(&g.profitability),
                escape(&g.momentum),
                escape(&g.eps_revisions),
                trend_badges(&r.trend),
            ];
            let tds: String = cells.iter().map(|c| format!("<td>{c}</td>")).collect();
            format!("<tr>{tds}</tr>")
        })
        .collect();

    let headers: String = [
        "Ticker", "Picked", "Price", "Day%", "Hold", "Earnings", "EMA21", "EMA55", "SMA200",
        "RSI", "ATR%", "Vol", "Quant", "Value", "Growth", "Profit", "Momentum", "EPS Rev", "Trend",
    ]
    .iter()
    .map(|h| format!("<th>{h}</th>"))
    .collect();

    format!(
        r#"<table class="portfolio-table"><thead><tr>{headers}</tr></thead><tbody>{body}</tbody></table>"#
    )
}

fn portfolio_cards(rows: &[PortfolioRowView]) -> String {
    let cards: String = rows
        .iter()
        .map(|r| {
            format!(
                r#"<div class="card">
<div class="card-title">{ticker} <span class="price">{price}</span> <span class="{day_class}">{day}</span></div>
<div class="meta">{tech}</div>
<div class="meta">{stats}</div>
<div class="trend">{trend}</div>
</div>"#,
                ticker = escape(&r.ticker),
                price = escape(&r.price),
                day_class = polarity_class(r.day_pct_polarity),
                day = escape(&r.day_pct),
                tech = escape(&r.tech_line),
                stats = escape(&r.stats_line),
                trend = trend_badges(&r.trend),
            )
        })
        .collect();
    format!(r#"<div class="portfolio-list">{cards}</div>"#)
}

#[cfg(test)]
mod tests {
    use super::*;
    use watchboard_core::domain::snapshot::Snapshot;
    use watchboard_core::format::mask::MaskStyle;
    use watchboard_core::session::SessionState;
    use watchboard_core::view::{build_dashboard, DashboardQuery, OFFLINE_MESSAGE};

    fn ready_page(mobile: bool) -> String {
        let snapshot = Snapshot::from_json_str(
            r#"{
                "meta": {"updated_at": "2026-01-05 <b>16:10</b>"},
                "focus_view_model": [{"ticker": "NVDA", "verdict": "ACCUMULATE", "dte": 2,
                                      "signal": "Reclaim \"EMA21\""}],
                "table_view_model": [{"ticker": "MSFT", "Day%": -1.5, "last_price": 410.0}]
            }"#,
        )
        .unwrap();
        let mut session = SessionState {
            mobile_view: Some(mobile),
            ..Default::default()
        };
        let d = build_dashboard(
            Some(&snapshot),
            &mut session,
            &DashboardQuery::default(),
            MaskStyle::Edges,
        );
        render_page(&d, Some("body { margin: 0; }"))
    }

    #[test]
    fn escapes_markup() {
        assert_eq!(escape(r#"<a href="x">'&'</a>"#), "&lt;a href=&quot;x&quot;&gt;&#39;&amp;&#39;&lt;/a&gt;");
    }

    #[test]
    fn hrefs_keep_portfolio_query() {
        let q = PortfolioQuery {
            filter: Some("a b&c".to_string()),
            sort: Some(SortOrder::HoldDesc),
        };
        assert_eq!(page_href(Some(2), &q, None), "/?select=2&filter=a%20b%26c&sort=hold");
        assert_eq!(page_href(None, &PortfolioQuery::default(), None), "/");
        assert_eq!(
            page_href(None, &PortfolioQuery::default(), Some(Layout::Mobile)),
            "/?view=mobile"
        );
    }

    #[test]
    fn offline_page_shows_message_only() {
        let html = render_page(&Dashboard::offline(), None);
        assert!(html.contains(OFFLINE_MESSAGE));
        assert!(!html.contains("Portfolio"));
    }

    #[test]
    fn desktop_page_renders_grid_and_table() {
        let html = ready_page(false);
        assert!(html.contains("body { margin: 0; }"));
        assert!(html.contains(r#"class="focus-grid""#));
        assert!(html.contains("portfolio-table"));
        assert!(html.contains("N**A(Picked: N/A)"));
        assert!(html.contains("M**T"));
        assert!(html.contains("2026-01-05 &lt;b&gt;16:10&lt;/b&gt;"));
        assert!(html.contains("Reclaim &quot;EMA21&quot;"));
        assert!(html.contains("Ban window: ER in 2d"));
        assert!(!html.contains("NVDA"));
        assert!(!html.contains("MSFT"));
    }

    #[test]
    fn mobile_page_renders_cards() {
        let html = ready_page(true);
        assert!(html.contains(r#"class="focus-list""#));
        assert!(html.contains("portfolio-list"));
        assert!(!html.contains("portfolio-table"));
        assert!(html.contains("RSI N/A · Vol N/A"));
        assert!(html.contains("Desktop view"));
    }
}
