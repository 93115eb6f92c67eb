//! Pure display rules that turn normalized snapshot fields into labels.
//!
//! Nothing in here performs I/O or reads ambient state; every function is total over its input
//! and degrades to a placeholder instead of failing.

pub mod catalyst;
pub mod evidence;
pub mod mask;
pub mod numeric;
pub mod setup;
pub mod trend;
pub mod verdict;

/// Shown when a value is absent or unparseable.
pub const NOT_AVAILABLE: &str = "N/A";

/// Shown for absent free-text fields (signal, news).
pub const EM_DASH: &str = "—";

/// Shown for absent letter grades and pre-formatted columns.
pub const HYPHEN: &str = "-";

/// Visual polarity of a derived label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Polarity {
    Positive,
    Negative,
    Neutral,
}

impl Polarity {
    /// Polarity of a signed quantity, ties counted as positive.
    pub fn of(value: f64) -> Self {
        if value >= 0.0 {
            Polarity::Positive
        } else {
            Polarity::Negative
        }
    }
}

/// Truncate `text` to `max_chars` characters, appending `...` when cut.
pub fn summarize(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let head: String = text.chars().take(max_chars).collect();
    format!("{head}...")
}

/// `Some(text)` as-is, otherwise the given placeholder.
pub fn or_placeholder(value: Option<&str>, placeholder: &str) -> String {
    value.unwrap_or(placeholder).to_string()
}
