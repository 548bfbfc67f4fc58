// src/utils/html.rs

/// Sanitizes instructor-authored rich text (course descriptions, lesson bodies).
///
/// Whitelist-based: formatting tags such as <b>, <p>, <ul> survive while
/// <script>, <iframe> and event-handler attributes are stripped.
pub fn sanitize_rich_text(input: &str) -> String {
    ammonia::clean(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_script_is_removed() {
        let cleaned = sanitize_rich_text("<p>Hello</p><script>alert(1)</script>");
        assert_eq!(cleaned, "<p>Hello</p>");
    }

    #[test]
    fn test_event_handlers_are_removed() {
        let cleaned = sanitize_rich_text(r#"<b onclick="steal()">bold</b>"#);
        assert_eq!(cleaned, "<b>bold</b>");
    }
}
