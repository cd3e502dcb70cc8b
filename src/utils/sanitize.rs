// src/utils/sanitize.rs

/// Cleans admin-authored question and choice text.
///
/// Whitelist-based: safe formatting tags (<b>, <code>, <p>) survive while
/// <script>, <iframe> and event-handler attributes are stripped.
pub fn sanitize_text(input: &str) -> String {
    ammonia::clean(input.trim())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_scripts_and_keeps_formatting() {
        let cleaned = sanitize_text("  <b>What</b> is <script>alert(1)</script>Rust?  ");
        assert_eq!(cleaned, "<b>What</b> is Rust?");
    }

    #[test]
    fn drops_event_handlers() {
        let cleaned = sanitize_text(r#"<p onclick="steal()">hi</p>"#);
        assert_eq!(cleaned, "<p>hi</p>");
    }
}
