//! View models: everything the renderer needs, already formatted. Raw tickers never appear in
//! these types; items are addressed by their position in the focus list.

pub mod focus;
pub mod portfolio;

use crate::domain::snapshot::Snapshot;
use crate::format::mask::MaskStyle;
use crate::session::SessionState;
use focus::{focus_card, focus_detail, FocusCard, FocusDetail};
use portfolio::{portfolio_rows, PortfolioQuery, PortfolioRowView};
use serde::Serialize;

pub const OFFLINE_MESSAGE: &str = "System Offline: Snapshot missing.";
pub const NO_PORTFOLIO_MESSAGE: &str = "No Portfolio Data Available.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Layout {
    Desktop,
    Mobile,
}

/// Per-request inputs on top of the session.
#[derive(Debug, Clone, Default)]
pub struct DashboardQuery {
    /// Focus list position chosen by the user on this request.
    pub select: Option<usize>,
    pub portfolio: PortfolioQuery,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Dashboard {
    Offline { message: String },
    Ready(Box<ReadyDashboard>),
}

#[derive(Debug, Clone, Serialize)]
pub struct ReadyDashboard {
    pub updated_at: String,
    pub layout: Layout,
    pub focus: Vec<FocusCard>,
    pub selected: Option<FocusDetail>,
    /// Shown instead of the focus list when it is empty.
    pub focus_message: Option<String>,
    pub portfolio: Vec<PortfolioRowView>,
    pub portfolio_query: PortfolioQuery,
    /// Shown instead of the table when the snapshot has no portfolio rows.
    pub portfolio_message: Option<String>,
}

impl Dashboard {
    pub fn offline() -> Self {
        Dashboard::Offline {
            message: OFFLINE_MESSAGE.to_string(),
        }
    }
}

/// Resolve which focus item is selected and record it in the session.
///
/// An explicit in-range `select` wins; otherwise the session's previous ticker if it is still in
/// the snapshot; otherwise the first item.
pub fn resolve_selection(
    snapshot: &Snapshot,
    session: &mut SessionState,
    select: Option<usize>,
) -> Option<usize> {
    let items = &snapshot.focus_view_model;
    let by_request = select.filter(|i| *i < items.len());
    let by_session = || {
        session
            .focus_selected
            .as_deref()
            .and_then(|t| items.iter().position(|i| i.ticker == t))
    };
    let index = by_request
        .or_else(by_session)
        .or((!items.is_empty()).then_some(0))?;
    session.focus_selected = Some(items[index].ticker.clone());
    Some(index)
}

/// Assemble the full page model for one render pass.
pub fn build_dashboard(
    snapshot: Option<&Snapshot>,
    session: &mut SessionState,
    query: &DashboardQuery,
    style: MaskStyle,
) -> Dashboard {
    let Some(snapshot) = snapshot else {
        return Dashboard::offline();
    };

    let selected = resolve_selection(snapshot, session, query.select);
    let focus: Vec<FocusCard> = snapshot
        .focus_view_model
        .iter()
        .enumerate()
        .map(|(i, item)| focus_card(i, item, style, Some(i) == selected))
        .collect();
    let detail =
        selected.map(|i| focus_detail(i, &snapshot.focus_view_model[i], style));

    let portfolio = portfolio_rows(&snapshot.table_view_model, &query.portfolio, style);

    Dashboard::Ready(Box::new(ReadyDashboard {
        updated_at: snapshot.meta.updated_at_display().to_string(),
        layout: if session.is_mobile() {
            Layout::Mobile
        } else {
            Layout::Desktop
        },
        focus_message: focus
            .is_empty()
            .then(|| snapshot.meta.focus_message_display().to_string()),
        focus,
        selected: detail,
        portfolio,
        portfolio_query: query.portfolio.clone(),
        portfolio_message: snapshot
            .table_view_model
            .is_empty()
            .then(|| NO_PORTFOLIO_MESSAGE.to_string()),
    }))
}

/// Detail for one focus position, independent of the session selection.
pub fn focus_detail_at(snapshot: &Snapshot, index: usize, style: MaskStyle) -> Option<FocusDetail> {
    snapshot
        .focus_view_model
        .get(index)
        .map(|item| focus_detail(index, item, style))
}
