mod render;
mod session;

use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::get,
    Json, Router,
};
use chrono::Utc;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Instant;
use tokio::task::JoinHandle;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use session::{resolve_session, session_id_from_headers, SessionRegistry};
use watchboard_core::analytics::device::{classify_user_agent, DeviceClass};
use watchboard_core::analytics::stats::VisitStats;
use watchboard_core::analytics::tracker::{claim_visit, VisitTracker};
use watchboard_core::config::Settings;
use watchboard_core::domain::snapshot::Snapshot;
use watchboard_core::session::SessionState;
use watchboard_core::storage::snapshot::{load_snapshot, load_stylesheet};
use watchboard_core::time::us_eastern::eastern_date;
use watchboard_core::view::focus::FocusDetail;
use watchboard_core::view::portfolio::{PortfolioQuery, SortOrder};
use watchboard_core::view::{build_dashboard, focus_detail_at, Dashboard, DashboardQuery};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = Settings::from_env()?;
    let _sentry_guard = init_sentry(&settings);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer())
        .init();

    let tracker = match VisitTracker::from_settings(&settings) {
        Ok(tracker) => tracker,
        Err(e) => {
            sentry_anyhow::capture_anyhow(&e);
            tracing::error!(error = %e, "counter store client failed; visit tracking disabled");
            VisitTracker::new(None, settings.analytics_app_key.clone())
        }
    };
    tracing::info!(
        snapshot = %settings.snapshot_path.display(),
        mask_style = ?settings.mask_style,
        "dashboard configured"
    );

    let state = AppState {
        settings: Arc::new(settings),
        tracker,
        sessions: Arc::new(SessionRegistry::default()),
    };

    let app = Router::new()
        .route("/", get(dashboard_page))
        .route("/healthz", get(healthz))
        .route("/api/dashboard", get(dashboard_json))
        .route("/api/focus/:index", get(focus_json))
        .route("/api/stats", get(stats_json))
        .with_state(state)
        .layer(TraceLayer::new_for_http());

    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(3000);
    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));

    tracing::info!(%addr, "dashboard listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn healthz() -> &'static str {
    "ok"
}

#[derive(Clone)]
struct AppState {
    settings: Arc<Settings>,
    tracker: VisitTracker,
    sessions: Arc<SessionRegistry>,
}

/// Query string shared by `/` and `/api/dashboard`. Everything is taken as text and parsed
/// leniently so a bad parameter falls back to its default instead of rejecting the request.
#[derive(Debug, Default, Deserialize)]
struct PageParams {
    select: Option<String>,
    filter: Option<String>,
    sort: Option<String>,
    view: Option<String>,
}

impl PageParams {
    fn dashboard_query(&self) -> DashboardQuery {
        DashboardQuery {
            select: self.select.as_deref().and_then(|s| s.trim().parse().ok()),
            portfolio: PortfolioQuery {
                filter: self
                    .filter
                    .as_deref()
                    .map(str::trim)
                    .filter(|f| !f.is_empty())
                    .map(str::to_string),
                sort: self.sort.as_deref().and_then(SortOrder::parse),
            },
        }
    }

    /// Explicit layout override: `Some(true)` for mobile, `Some(false)` for desktop.
    fn mobile_override(&self) -> Option<bool> {
        match self.view.as_deref().map(str::trim) {
            Some("mobile") => Some(true),
            Some("desktop") => Some(false),
            _ => None,
        }
    }
}

/// Snapshot for this render pass. A malformed file is reported and rendered as offline.
async fn current_snapshot(settings: &Settings) -> Option<Snapshot> {
    match load_snapshot(&settings.snapshot_path).await {
        Ok(Some(snapshot)) => Some(snapshot),
        Ok(None) => {
            tracing::warn!(path = %settings.snapshot_path.display(), "snapshot missing");
            None
        }
        Err(e) => {
            sentry_anyhow::capture_anyhow(&e);
            tracing::error!(error = %e, "snapshot unreadable; rendering offline view");
            None
        }
    }
}

struct RenderPass {
    dashboard: Dashboard,
    set_cookie: Option<HeaderValue>,
    /// Device to count when this pass is the session's first visit.
    first_visit: Option<DeviceClass>,
}

/// One full recomputation for the caller's session.
///
/// Page views (`count_visit`) issue a session cookie when missing and claim the session's visit.
/// JSON calls only read an existing session; without a cookie they render from a throwaway state
/// and leave the registry untouched.
async fn render_pass(
    state: &AppState,
    headers: &HeaderMap,
    params: &PageParams,
    count_visit: bool,
) -> RenderPass {
    let snapshot = current_snapshot(&state.settings).await;
    let (session_id, set_cookie) = if count_visit {
        let (id, set_cookie) = resolve_session(headers);
        (Some(id), set_cookie)
    } else {
        (session_id_from_headers(headers), None)
    };
    let user_agent = headers
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok());
    let query = params.dashboard_query();
    let style = state.settings.mask_style;

    let pass = |session: &mut SessionState| {
        if let Some(mobile) = params.mobile_override() {
            session.mobile_view = Some(mobile);
        }
        session.observe_device(classify_user_agent(user_agent));
        let first_visit = if count_visit {
            claim_visit(session, user_agent)
        } else {
            None
        };
        (
            build_dashboard(snapshot.as_ref(), session, &query, style),
            first_visit,
        )
    };
    let (dashboard, first_visit) = match session_id {
        Some(id) => state.sessions.with_session(id, Instant::now(), pass),
        None => pass(&mut SessionState::default()),
    };

    RenderPass {
        dashboard,
        set_cookie,
        first_visit,
    }
}

/// Send the counter batch for a first visit in the background; the request never waits on the
/// counter store.
fn spawn_visit(state: &AppState, first_visit: Option<DeviceClass>) -> Option<JoinHandle<()>> {
    let device = first_visit?;
    let tracker = state.tracker.clone();
    let today = eastern_date(Utc::now());
    Some(tokio::spawn(async move {
        tracker.record_visit(device, today).await
    }))
}

fn with_cookie(set_cookie: Option<HeaderValue>, body: impl IntoResponse) -> Response {
    let mut response = body.into_response();
    if let Some(cookie) = set_cookie {
        response.headers_mut().insert(header::SET_COOKIE, cookie);
    }
    response
}

async fn dashboard_page(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<PageParams>,
) -> Response {
    let pass = render_pass(&state, &headers, &params, true).await;
    spawn_visit(&state, pass.first_visit);

    let css = load_stylesheet(&state.settings.style_path).await;
    let html = render::render_page(&pass.dashboard, css.as_deref());
    with_cookie(pass.set_cookie, Html(html))
}

async fn dashboard_json(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<PageParams>,
) -> Response {
    let pass = render_pass(&state, &headers, &params, false).await;
    with_cookie(pass.set_cookie, Json(pass.dashboard))
}

async fn focus_json(
    State(state): State<AppState>,
    Path(index): Path<usize>,
) -> Result<Json<FocusDetail>, StatusCode> {
    let snapshot = current_snapshot(&state.settings)
        .await
        .ok_or(StatusCode::SERVICE_UNAVAILABLE)?;
    let detail = focus_detail_at(&snapshot, index, state.settings.mask_style)
        .ok_or(StatusCode::NOT_FOUND)?;
    Ok(Json(detail))
}

async fn stats_json(State(state): State<AppState>) -> Json<VisitStats> {
    Json(state.tracker.read_stats(Utc::now()).await)
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}

fn init_sentry(settings: &Settings) -> Option<sentry::ClientInitGuard> {
    let dsn = settings.sentry_dsn.as_deref()?;
    Some(sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            ..Default::default()
        },
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};
    use std::path::PathBuf;
    use std::sync::Mutex;
    use watchboard_core::analytics::{CounterCommand, CounterStore};

    #[derive(Default)]
    struct RecordingStore {
        batches: Mutex<Vec<Vec<CounterCommand>>>,
    }

    #[async_trait::async_trait]
    impl CounterStore for RecordingStore {
        fn store_name(&self) -> &'static str {
            "recording"
        }

        async fn pipeline(&self, commands: &[CounterCommand]) -> anyhow::Result<Value> {
            self.batches.lock().unwrap().push(commands.to_vec());
            Ok(json!([1, 1, 1, 1]))
        }
    }

    fn app_state(store: Arc<RecordingStore>) -> AppState {
        let settings = Settings {
            snapshot_path: PathBuf::from("does-not-exist/snapshot.json"),
            ..Settings::default()
        };
        AppState {
            settings: Arc::new(settings),
            tracker: VisitTracker::new(Some(store as Arc<dyn CounterStore>), "ap_test"),
            sessions: Arc::new(SessionRegistry::default()),
        }
    }

    /// Request headers carrying the cookie a previous pass issued.
    fn returning_browser(set_cookie: &HeaderValue, user_agent: &'static str) -> HeaderMap {
        let pair = set_cookie.to_str().unwrap().split(';').next().unwrap();
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_str(pair).unwrap());
        headers.insert(header::USER_AGENT, HeaderValue::from_static(user_agent));
        headers
    }

    async fn flush(state: &AppState, pass: &RenderPass) {
        if let Some(handle) = spawn_visit(state, pass.first_visit) {
            handle.await.unwrap();
        }
    }

    #[tokio::test]
    async fn page_views_count_one_visit_per_session() {
        let store = Arc::new(RecordingStore::default());
        let state = app_state(store.clone());
        let params = PageParams::default();

        let first = render_pass(&state, &HeaderMap::new(), &params, true).await;
        let cookie = first.set_cookie.clone().unwrap();
        assert_eq!(first.first_visit, Some(DeviceClass::Desktop));
        flush(&state, &first).await;

        let headers = returning_browser(&cookie, "Mozilla/5.0 (iPhone; CPU iPhone OS 17_0)");
        let second = render_pass(&state, &headers, &params, true).await;
        assert!(second.set_cookie.is_none());
        assert_eq!(second.first_visit, None);
        flush(&state, &second).await;

        let json_pass = render_pass(&state, &headers, &params, false).await;
        assert_eq!(json_pass.first_visit, None);
        flush(&state, &json_pass).await;

        let batches = store.batches.lock().unwrap().clone();
        assert_eq!(batches.len(), 1);
        assert_eq!(batches[0].len(), 4);
        assert_eq!(batches[0][2].key(), "visits:ap_test:desktop:total");
        assert_eq!(state.sessions.len(), 1);
    }

    #[tokio::test]
    async fn json_pass_never_counts_or_creates_sessions() {
        let store = Arc::new(RecordingStore::default());
        let state = app_state(store.clone());

        let pass = render_pass(&state, &HeaderMap::new(), &PageParams::default(), false).await;
        assert!(pass.set_cookie.is_none());
        assert_eq!(pass.first_visit, None);
        assert!(matches!(pass.dashboard, Dashboard::Offline { .. }));
        flush(&state, &pass).await;

        assert_eq!(state.sessions.len(), 0);
        assert!(store.batches.lock().unwrap().is_empty());
    }

    #[test]
    fn params_parse_leniently() {
        let params = PageParams {
            select: Some(" 2 ".to_string()),
            filter: Some("  ".to_string()),
            sort: Some("HOLD".to_string()),
            view: Some("mobile".to_string()),
        };
        let q = params.dashboard_query();
        assert_eq!(q.select, Some(2));
        assert_eq!(q.portfolio.filter, None);
        assert_eq!(q.portfolio.sort, Some(SortOrder::HoldDesc));
        assert_eq!(params.mobile_override(), Some(true));

        let junk = PageParams {
            select: Some("abc".to_string()),
            sort: Some("price".to_string()),
            view: Some("tablet".to_string()),
            ..Default::default()
        };
        let q = junk.dashboard_query();
        assert_eq!(q.select, None);
        assert_eq!(q.portfolio.sort, None);
        assert_eq!(junk.mobile_override(), None);
    }
}
