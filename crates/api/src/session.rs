use axum::http::{header, HeaderMap, HeaderValue};
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};
use uuid::Uuid;
use watchboard_core::session::SessionState;

pub const SESSION_COOKIE: &str = "wb_session";

/// Sessions not seen for this long are dropped.
pub const SESSION_IDLE_TTL: Duration = Duration::from_secs(30 * 60);
/// Hard cap on live sessions; the least recently seen one goes first.
pub const MAX_SESSIONS: usize = 10_000;

#[derive(Debug)]
struct Entry {
    state: SessionState,
    last_seen: Instant,
}

/// In-memory per-browser session store keyed by the session cookie.
#[derive(Debug)]
pub struct SessionRegistry {
    sessions: Mutex<HashMap<Uuid, Entry>>,
    idle_ttl: Duration,
    capacity: usize,
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new(SESSION_IDLE_TTL, MAX_SESSIONS)
    }
}

impl SessionRegistry {
    pub fn new(idle_ttl: Duration, capacity: usize) -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            idle_ttl,
            capacity: capacity.max(1),
        }
    }

    /// Run `f` against the session for `id`, creating it on first sight, and mark it seen at
    /// `now`. The lock is held only for the duration of `f`, which must not await.
    pub fn with_session<R>(
        &self,
        id: Uuid,
        now: Instant,
        f: impl FnOnce(&mut SessionState) -> R,
    ) -> R {
        let mut sessions = match self.sessions.lock() {
            Ok(guard) => guard,
            Err(poisoned) => {
                tracing::warn!("session registry lock poisoned; recovering");
                poisoned.into_inner()
            }
        };
        if !sessions.contains_key(&id) {
            self.make_room(&mut sessions, now);
        }
        let entry = sessions.entry(id).or_insert_with(|| Entry {
            state: SessionState::default(),
            last_seen: now,
        });
        entry.last_seen = now;
        f(&mut entry.state)
    }

    fn make_room(&self, sessions: &mut HashMap<Uuid, Entry>, now: Instant) {
        let before = sessions.len();
        sessions.retain(|_, e| now.saturating_duration_since(e.last_seen) < self.idle_ttl);
        while sessions.len() >= self.capacity {
            let oldest = sessions
                .iter()
                .min_by_key(|(_, e)| e.last_seen)
                .map(|(id, _)| *id);
            match oldest {
                Some(id) => {
                    sessions.remove(&id);
                }
                None => break,
            }
        }
        let evicted = before - sessions.len();
        if evicted > 0 {
            tracing::debug!(evicted, live = sessions.len(), "evicted sessions");
        }
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.sessions.lock().map(|s| s.len()).unwrap_or(0)
    }
}

/// Session id from the request cookies. `None` when absent or not a UUID.
pub fn session_id_from_headers(headers: &HeaderMap) -> Option<Uuid> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .and_then(|(_, value)| Uuid::parse_str(value.trim()).ok())
}

pub fn set_cookie_header(id: Uuid) -> HeaderValue {
    let cookie = format!("{SESSION_COOKIE}={id}; Path=/; HttpOnly; SameSite=Lax");
    // A hyphenated UUID and fixed attributes are always visible ASCII.
    HeaderValue::from_str(&cookie).unwrap_or_else(|_| HeaderValue::from_static("wb_session=; Path=/"))
}

/// Existing session id, or a fresh one plus the `Set-Cookie` value announcing it.
pub fn resolve_session(headers: &HeaderMap) -> (Uuid, Option<HeaderValue>) {
    match session_id_from_headers(headers) {
        Some(id) => (id, None),
        None => {
            let id = Uuid::new_v4();
            (id, Some(set_cookie_header(id)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_session_cookie_among_others() {
        let id = Uuid::new_v4();
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_str(&format!("theme=dark; wb_session={id}; other=1")).unwrap(),
        );
        assert_eq!(session_id_from_headers(&headers), Some(id));
        let (resolved, set_cookie) = resolve_session(&headers);
        assert_eq!(resolved, id);
        assert!(set_cookie.is_none());
    }

    #[test]
    fn missing_or_garbled_cookie_starts_a_new_session() {
        let mut headers = HeaderMap::new();
        assert_eq!(session_id_from_headers(&headers), None);

        headers.insert(header::COOKIE, HeaderValue::from_static("wb_session=not-a-uuid"));
        let (id, set_cookie) = resolve_session(&headers);
        let set_cookie = set_cookie.unwrap();
        let text = set_cookie.to_str().unwrap();
        assert!(text.starts_with(&format!("wb_session={id};")));
        assert!(text.contains("HttpOnly"));
    }

    #[test]
    fn registry_keeps_state_per_session() {
        let registry = SessionRegistry::default();
        let now = Instant::now();
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();

        assert!(registry.with_session(a, now, |s| s.mark_tracked()));
        assert!(!registry.with_session(a, now, |s| s.mark_tracked()));
        assert!(registry.with_session(b, now, |s| s.mark_tracked()));
        assert!(registry.with_session(a, now, |s| s.tracked));
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn registry_stays_bounded_under_cookieless_traffic() {
        let registry = SessionRegistry::new(SESSION_IDLE_TTL, 100);
        let start = Instant::now();
        for i in 0..10_000u64 {
            let (id, _) = resolve_session(&HeaderMap::new());
            registry.with_session(id, start + Duration::from_millis(i), |s| s.mark_tracked());
        }
        assert_eq!(registry.len(), 100);
    }

    #[test]
    fn idle_sessions_expire_and_active_ones_survive() {
        let registry = SessionRegistry::new(Duration::from_secs(60), MAX_SESSIONS);
        let start = Instant::now();
        let idle = Uuid::new_v4();
        let active = Uuid::new_v4();
        registry.with_session(idle, start, |s| s.mark_tracked());
        registry.with_session(active, start, |s| s.mark_tracked());
        registry.with_session(active, start + Duration::from_secs(50), |_| ());

        // A new session arriving later sweeps anything idle past the TTL.
        registry.with_session(Uuid::new_v4(), start + Duration::from_secs(90), |_| ());
        assert_eq!(registry.len(), 2);
        assert!(registry.with_session(active, start + Duration::from_secs(91), |s| s.tracked));
        assert!(!registry.with_session(idle, start + Duration::from_secs(92), |s| s.tracked));
    }

    #[test]
    fn full_registry_evicts_least_recently_seen() {
        let registry = SessionRegistry::new(SESSION_IDLE_TTL, 2);
        let start = Instant::now();
        let first = Uuid::new_v4();
        let second = Uuid::new_v4();
        registry.with_session(first, start, |s| s.mark_tracked());
        registry.with_session(second, start + Duration::from_secs(1), |s| s.mark_tracked());
        registry.with_session(first, start + Duration::from_secs(2), |_| ());

        registry.with_session(Uuid::new_v4(), start + Duration::from_secs(3), |_| ());
        assert_eq!(registry.len(), 2);
        assert!(registry.with_session(first, start + Duration::from_secs(4), |s| s.tracked));
    }
}
