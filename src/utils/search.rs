// src/utils/search.rs

use std::sync::LazyLock;

use regex::Regex;

static LIKE_SPECIALS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[%_\\]").expect("static pattern"));

static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("static pattern"));

/// Builds an `ILIKE` pattern matching `keyword` anywhere, with the
/// wildcard characters in the keyword escaped. Blank keywords yield `None`.
pub fn contains_pattern(keyword: Option<&str>) -> Option<String> {
    let keyword = keyword?.trim();
    if keyword.is_empty() {
        return None;
    }
    let collapsed = WHITESPACE.replace_all(keyword, " ");
    let escaped = LIKE_SPECIALS.replace_all(&collapsed, r"\$0");
    Some(format!("%{}%", escaped))
}

/// Clamps a requested page size into `1..=max`.
pub fn page_limit(requested: Option<i64>, default: i64, max: i64) -> i64 {
    requested.unwrap_or(default).clamp(1, max)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_keyword() {
        assert_eq!(contains_pattern(Some("rust")).as_deref(), Some("%rust%"));
    }

    #[test]
    fn test_wildcards_are_escaped() {
        assert_eq!(contains_pattern(Some("100%_off")).as_deref(), Some(r"%100\%\_off%"));
        assert_eq!(contains_pattern(Some(r"a\b")).as_deref(), Some(r"%a\\b%"));
    }

    #[test]
    fn test_blank_and_whitespace() {
        assert_eq!(contains_pattern(Some("   ")), None);
        assert_eq!(contains_pattern(None), None);
        assert_eq!(contains_pattern(Some(" web   dev ")).as_deref(), Some("%web dev%"));
    }

    #[test]
    fn test_page_limit() {
        assert_eq!(page_limit(None, 20, 100), 20);
        assert_eq!(page_limit(Some(500), 20, 100), 100);
        assert_eq!(page_limit(Some(0), 20, 100), 1);
    }
}
