use crate::analytics::device::{classify_user_agent, DeviceClass};
use crate::analytics::stats::{VisitStats, STATS_WINDOW_DAYS};
use crate::analytics::upstash::UpstashStore;
use crate::analytics::{CounterCommand, CounterStore};
use crate::config::Settings;
use crate::session::SessionState;
use crate::time::us_eastern::{day_key, eastern_date, trailing_days};
use chrono::{DateTime, NaiveDate, Utc};
use std::sync::Arc;

/// Records visits and reads visit statistics. Every failure is absorbed here: callers never see an
/// error from analytics.
#[derive(Clone)]
pub struct VisitTracker {
    store: Option<Arc<dyn CounterStore>>,
    app_key: String,
}

impl VisitTracker {
    pub fn new(store: Option<Arc<dyn CounterStore>>, app_key: impl Into<String>) -> Self {
        Self {
            store,
            app_key: app_key.into(),
        }
    }

    pub fn from_settings(settings: &Settings) -> anyhow::Result<Self> {
        let store = UpstashStore::from_settings(settings)?
            .map(|s| Arc::new(s) as Arc<dyn CounterStore>);
        if store.is_none() {
            tracing::info!("counter store not configured; visit analytics disabled");
        }
        Ok(Self::new(store, settings.analytics_app_key.clone()))
    }

    fn key(&self, device: DeviceClass, scope: &str) -> String {
        format!("visits:{}:{}:{}", self.app_key, device.as_str(), scope)
    }

    /// Four increments: web total/today and device total/today.
    pub fn visit_commands(&self, device: DeviceClass, today: NaiveDate) -> Vec<CounterCommand> {
        let day = day_key(today);
        vec![
            CounterCommand::Incr(self.key(DeviceClass::Web, "total")),
            CounterCommand::Incr(self.key(DeviceClass::Web, &day)),
            CounterCommand::Incr(self.key(device, "total")),
            CounterCommand::Incr(self.key(device, &day)),
        ]
    }

    /// Two totals, then 30 daily web keys and 30 daily mobile keys, most recent first.
    pub fn stats_commands(&self, today: NaiveDate) -> Vec<CounterCommand> {
        let days: Vec<String> = trailing_days(today, STATS_WINDOW_DAYS)
            .into_iter()
            .map(day_key)
            .collect();
        let mut cmds = vec![
            CounterCommand::Get(self.key(DeviceClass::Web, "total")),
            CounterCommand::Get(self.key(DeviceClass::Mobile, "total")),
        ];
        cmds.extend(
            days.iter()
                .map(|d| CounterCommand::Get(self.key(DeviceClass::Web, d))),
        );
        cmds.extend(
            days.iter()
                .map(|d| CounterCommand::Get(self.key(DeviceClass::Mobile, d))),
        );
        cmds
    }

    /// Send one increment batch. The response is ignored and failures are logged and dropped.
    pub async fn record_visit(&self, device: DeviceClass, today: NaiveDate) {
        let Some(store) = &self.store else {
            return;
        };
        let cmds = self.visit_commands(device, today);
        match store.pipeline(&cmds).await {
            Ok(_) => tracing::debug!(store = store.store_name(), %device, %today, "visit recorded"),
            Err(e) => tracing::debug!(
                store = store.store_name(),
                %device,
                error = %e,
                "visit tracking failed; ignoring"
            ),
        }
    }

    /// Record the session's visit unless it was already counted. The session is latched whether
    /// or not the store call succeeds.
    pub async fn track_once(
        &self,
        session: &mut SessionState,
        user_agent: Option<&str>,
        now: DateTime<Utc>,
    ) {
        if let Some(device) = claim_visit(session, user_agent) {
            self.record_visit(device, eastern_date(now)).await;
        }
    }

    pub async fn read_stats(&self, now: DateTime<Utc>) -> VisitStats {
        let Some(store) = &self.store else {
            return VisitStats::unavailable();
        };
        let cmds = self.stats_commands(eastern_date(now));
        match store.pipeline(&cmds).await {
            Ok(resp) => VisitStats::from_pipeline_response(&resp),
            Err(e) => {
                tracing::debug!(store = store.store_name(), error = %e, "visit stats unavailable");
                VisitStats::unavailable()
            }
        }
    }
}

/// Latch the session's tracked flag and pick the device bucket for its visit. `None` when the
/// session was already counted. An unknown user agent counts as desktop.
pub fn claim_visit(session: &mut SessionState, user_agent: Option<&str>) -> Option<DeviceClass> {
    session
        .mark_tracked()
        .then(|| classify_user_agent(user_agent).unwrap_or(DeviceClass::Desktop))
}
