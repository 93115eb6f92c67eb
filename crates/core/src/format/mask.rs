/// How much of a ticker stays visible on the public page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MaskStyle {
    /// First and last character visible for tickers of four or more characters.
    #[default]
    Edges,
    /// First character followed by `len - 1` stars. Superseded by `Edges`.
    Legacy,
}

impl MaskStyle {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "edges" => Some(MaskStyle::Edges),
            "legacy" => Some(MaskStyle::Legacy),
            _ => None,
        }
    }
}

/// Redact a ticker for display.
///
/// The value is trimmed and uppercased first. Input that already contains `*` is treated as
/// masked and returned unchanged, which makes the function idempotent.
pub fn mask_ticker(raw: &str, style: MaskStyle) -> String {
    let value = raw.trim().to_uppercase();
    if value.is_empty() || value.contains('*') {
        return value;
    }

    let chars: Vec<char> = value.chars().collect();
    let first = chars[0];
    match style {
        MaskStyle::Legacy => {
            let stars = chars.len().saturating_sub(1).max(1);
            format!("{first}{}", "*".repeat(stars))
        }
        MaskStyle::Edges => match chars.len() {
            1 | 2 => format!("{first}*"),
            3 => format!("{first}**"),
            n => format!("{first}{}{}", "*".repeat(n - 2), chars[n - 1]),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edges_rule_by_length() {
        assert_eq!(mask_ticker("a", MaskStyle::Edges), "A*");
        assert_eq!(mask_ticker("ab", MaskStyle::Edges), "A*");
        assert_eq!(mask_ticker("abc", MaskStyle::Edges), "A**");
        assert_eq!(mask_ticker("nvda", MaskStyle::Edges), "N**A");
        assert_eq!(mask_ticker(" googl ", MaskStyle::Edges), "G***L");
    }

    #[test]
    fn legacy_rule_hides_everything_after_first() {
        assert_eq!(mask_ticker("a", MaskStyle::Legacy), "A*");
        assert_eq!(mask_ticker("nvda", MaskStyle::Legacy), "N***");
    }

    #[test]
    fn empty_stays_empty() {
        assert_eq!(mask_ticker("", MaskStyle::Edges), "");
        assert_eq!(mask_ticker("   ", MaskStyle::Edges), "");
    }

    #[test]
    fn masking_is_idempotent() {
        for style in [MaskStyle::Edges, MaskStyle::Legacy] {
            for t in ["A", "AB", "ABC", "NVDA", "BRK.B", "GOOGL", "x1"] {
                let once = mask_ticker(t, style);
                assert_eq!(mask_ticker(&once, style), once, "{t} {style:?}");
            }
        }
    }

    #[test]
    fn long_tickers_reveal_only_first_and_last() {
        let masked = mask_ticker("ABCDEFG", MaskStyle::Edges);
        let revealed: Vec<char> = masked.chars().filter(|c| *c != '*').collect();
        assert_eq!(revealed, vec!['A', 'G']);
        assert_eq!(masked.chars().count(), 7);
    }

    #[test]
    fn parses_style_names() {
        assert_eq!(MaskStyle::parse("Legacy"), Some(MaskStyle::Legacy));
        assert_eq!(MaskStyle::parse("edges"), Some(MaskStyle::Edges));
        assert_eq!(MaskStyle::parse("other"), None);
    }
}
