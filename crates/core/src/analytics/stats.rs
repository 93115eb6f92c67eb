use crate::format::NOT_AVAILABLE;
use serde::{Serialize, Serializer};
use serde_json::Value;
use std::fmt;

/// Daily buckets fetched per device (web and mobile).
pub const STATS_WINDOW_DAYS: usize = 30;
pub const SHORT_WINDOW_DAYS: usize = 7;

/// 2 totals + 30 daily web + 30 daily mobile.
pub const STATS_COMMAND_COUNT: usize = 2 + 2 * STATS_WINDOW_DAYS;

/// A counter reading. `Unavailable` means the store could not answer, which is distinct from zero
/// visits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatValue {
    Count(u64),
    Unavailable,
}

impl fmt::Display for StatValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatValue::Count(n) => write!(f, "{n}"),
            StatValue::Unavailable => f.write_str(NOT_AVAILABLE),
        }
    }
}

impl Serialize for StatValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            StatValue::Count(n) => serializer.serialize_u64(*n),
            StatValue::Unavailable => serializer.serialize_str(NOT_AVAILABLE),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct VisitStats {
    pub mobile_7d: StatValue,
    pub mobile_30d: StatValue,
    pub mobile_total: StatValue,
    pub web_7d: StatValue,
    pub web_30d: StatValue,
    pub web_total: StatValue,
}

impl VisitStats {
    pub fn unavailable() -> Self {
        Self {
            mobile_7d: StatValue::Unavailable,
            mobile_30d: StatValue::Unavailable,
            mobile_total: StatValue::Unavailable,
            web_7d: StatValue::Unavailable,
            web_30d: StatValue::Unavailable,
            web_total: StatValue::Unavailable,
        }
    }

    /// Reduce a pipeline response laid out as
    /// `[web_total, mobile_total, web_day0..web_day29, mobile_day0..mobile_day29]`
    /// (day 0 = today). Anything that is not a list of at least that length is unavailable.
    pub fn from_pipeline_response(response: &Value) -> Self {
        let Some(results) = response.as_array() else {
            return Self::unavailable();
        };
        if results.len() < STATS_COMMAND_COUNT {
            tracing::debug!(len = results.len(), "short stats response");
            return Self::unavailable();
        }

        let counts: Vec<u64> = results[..STATS_COMMAND_COUNT]
            .iter()
            .map(entry_count)
            .collect();
        let web_daily = &counts[2..2 + STATS_WINDOW_DAYS];
        let mobile_daily = &counts[2 + STATS_WINDOW_DAYS..];

        Self {
            mobile_7d: StatValue::Count(mobile_daily[..SHORT_WINDOW_DAYS].iter().sum()),
            mobile_30d: StatValue::Count(mobile_daily.iter().sum()),
            mobile_total: StatValue::Count(counts[1]),
            web_7d: StatValue::Count(web_daily[..SHORT_WINDOW_DAYS].iter().sum()),
            web_30d: StatValue::Count(web_daily.iter().sum()),
            web_total: StatValue::Count(counts[0]),
        }
    }
}

/// `{"result": "12"}` → 12. A missing, null, errored or unparseable entry counts as zero.
fn entry_count(entry: &Value) -> u64 {
    match entry.get("result") {
        Some(Value::Number(n)) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|v| *v > 0.0).map(|v| v as u64))
            .unwrap_or(0),
        Some(Value::String(s)) => s.trim().parse::<u64>().unwrap_or(0),
        _ => 0,
    }
}
