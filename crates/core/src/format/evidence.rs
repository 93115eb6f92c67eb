//! Removes inline evidence citations (`(A1, B2)`, `F3`) from narrative text.

use regex::Regex;
use std::sync::LazyLock;

static CITATION_LIST: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\s*\((?:[A-Z][0-9]+(?:,\s*)?)+\)").expect("citation list pattern is valid")
});
static BARE_CITATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b[FNVB][0-9]+\b").expect("bare citation pattern is valid"));
static EMPTY_PARENS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*\(\s*[,;]?\s*\)").expect("empty parens pattern is valid"));
static MULTI_SPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s{2,}").expect("whitespace pattern is valid"));

pub fn strip_evidence_refs(text: Option<&str>) -> String {
    let Some(text) = text else {
        return String::new();
    };
    let cleaned = CITATION_LIST.replace_all(text, "");
    let cleaned = BARE_CITATION.replace_all(&cleaned, "");
    let cleaned = EMPTY_PARENS.replace_all(&cleaned, "");
    let cleaned = MULTI_SPACE.replace_all(&cleaned, " ");
    cleaned
        .trim()
        .replace(" ,", ",")
        .replace(" .", ".")
        .replace(" ;", ";")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leaves_plain_text_alone() {
        assert_eq!(
            strip_evidence_refs(Some("Strong uptrend confirmed")),
            "Strong uptrend confirmed"
        );
    }

    #[test]
    fn removes_lists_and_bare_tokens() {
        assert_eq!(
            strip_evidence_refs(Some("Breakout confirmed (A1, B2) with F3 support")),
            "Breakout confirmed with support"
        );
    }

    #[test]
    fn fixes_orphaned_punctuation() {
        assert_eq!(
            strip_evidence_refs(Some("Volume is rising N2, price holds V10.")),
            "Volume is rising, price holds."
        );
        assert_eq!(
            strip_evidence_refs(Some("Guidance raised (F1,F2).")),
            "Guidance raised."
        );
    }

    #[test]
    fn removes_parens_emptied_by_bare_tokens() {
        assert_eq!(
            strip_evidence_refs(Some("Support at 180 (F3; V1) holds")),
            "Support at 180 holds"
        );
    }

    #[test]
    fn absent_or_empty_is_empty() {
        assert_eq!(strip_evidence_refs(None), "");
        assert_eq!(strip_evidence_refs(Some("")), "");
        assert_eq!(strip_evidence_refs(Some("   ")), "");
    }

    #[test]
    fn keeps_tickers_and_levels() {
        assert_eq!(
            strip_evidence_refs(Some("Holding EMA21 above SMA200 (A4)")),
            "Holding EMA21 above SMA200"
        );
    }
}
