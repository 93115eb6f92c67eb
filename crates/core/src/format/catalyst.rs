//! Earnings distance labels and the earnings blackout ("ban window") policy.

use super::setup::IMMINENT_DTE_MAX;
use serde::Serialize;

/// Sessions after the event during which new entries stay blocked.
pub const COOLDOWN_SESSIONS: i64 = 2;

/// `ER in 3d`, `ER 2d ago`, or `ER —` when unknown.
pub fn catalyst_label(dte: Option<i64>) -> String {
    match dte {
        Some(d) if d >= 0 => format!("ER in {d}d"),
        Some(d) => format!("ER {}d ago", d.unsigned_abs()),
        None => "ER —".to_string(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum BanWindow {
    /// Event ahead within the imminent window; blocked until it passes plus the cooldown.
    Restricted { days_to_event: i64 },
    /// Event already passed, still inside the post-event cooldown.
    Cooldown { days_since_event: i64 },
    Clear,
}

impl BanWindow {
    pub fn from_dte(dte: Option<i64>) -> Self {
        match dte {
            Some(d) if (0..=IMMINENT_DTE_MAX).contains(&d) => {
                BanWindow::Restricted { days_to_event: d }
            }
            Some(d) if (-COOLDOWN_SESSIONS..0).contains(&d) => BanWindow::Cooldown {
                days_since_event: -d,
            },
            _ => BanWindow::Clear,
        }
    }

    pub fn blocks_entries(self) -> bool {
        !matches!(self, BanWindow::Clear)
    }

    pub fn label(self) -> String {
        match self {
            BanWindow::Restricted { days_to_event } => format!(
                "Ban window: ER in {days_to_event}d + {COOLDOWN_SESSIONS}-session cooldown"
            ),
            BanWindow::Cooldown { days_since_event } => {
                format!("Post-ER cooldown ({days_since_event}d since event)")
            }
            BanWindow::Clear => "No earnings restriction".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_by_sign() {
        assert_eq!(catalyst_label(Some(3)), "ER in 3d");
        assert_eq!(catalyst_label(Some(0)), "ER in 0d");
        assert_eq!(catalyst_label(Some(-4)), "ER 4d ago");
        assert_eq!(catalyst_label(None), "ER —");
    }

    #[test]
    fn ban_window_states() {
        assert!(BanWindow::from_dte(Some(0)).blocks_entries());
        assert_eq!(
            BanWindow::from_dte(Some(5)),
            BanWindow::Restricted { days_to_event: 5 }
        );
        assert_eq!(BanWindow::from_dte(Some(6)), BanWindow::Clear);
        assert_eq!(
            BanWindow::from_dte(Some(-1)),
            BanWindow::Cooldown { days_since_event: 1 }
        );
        assert_eq!(
            BanWindow::from_dte(Some(-2)),
            BanWindow::Cooldown { days_since_event: 2 }
        );
        assert_eq!(BanWindow::from_dte(Some(-3)), BanWindow::Clear);
        assert!(!BanWindow::from_dte(Some(-3)).blocks_entries());
        assert_eq!(BanWindow::from_dte(None), BanWindow::Clear);
    }

    #[test]
    fn ban_window_labels() {
        assert_eq!(
            BanWindow::from_dte(Some(2)).label(),
            "Ban window: ER in 2d + 2-session cooldown"
        );
        assert_eq!(BanWindow::Clear.label(), "No earnings restriction");
    }
}
