use anyhow::{anyhow, Result};

/// Truncate a string to at most `max_bytes` bytes at a character boundary.
pub fn truncate_to_char_boundary(s: &str, max_bytes: usize) -> &str {
    if s.len() <= max_bytes {
        return s;
    }
    let mut end = max_bytes;
    while !s.is_char_boundary(end) && end > 0 {
        end -= 1;
    }
    &s[..end]
}

/// Strip markdown code blocks from a response.
pub fn strip_code_blocks(response: &str) -> &str {
    response
        .trim()
        .trim_start_matches("```json")
        .trim_start_matches("```")
        .trim_end_matches("```")
        .trim()
}

/// Parse a model's text reply as JSON, tolerating a markdown fence.
pub fn parse_json_text(text: &str) -> Result<serde_json::Value> {
    let body = strip_code_blocks(text);
    serde_json::from_str(body).map_err(|e| {
        anyhow!(
            "Response is not valid JSON ({}): {}",
            e,
            truncate_to_char_boundary(body, 200)
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_to_char_boundary() {
        let text = "Hello 世界";
        let truncated = truncate_to_char_boundary(text, 8);
        assert!(truncated.len() <= 8);
        assert!(text.starts_with(truncated));
    }

    #[test]
    fn test_strip_code_blocks() {
        assert_eq!(strip_code_blocks("```json\n{}\n```"), "{}");
        assert_eq!(strip_code_blocks("```\n{}\n```"), "{}");
        assert_eq!(strip_code_blocks("{}"), "{}");
    }

    #[test]
    fn parse_json_text_accepts_fenced_json() {
        let value = parse_json_text("```json\n{\"questions\": []}\n```").unwrap();
        assert_eq!(value, serde_json::json!({ "questions": [] }));
    }

    #[test]
    fn parse_json_text_rejects_prose() {
        let err = parse_json_text("Sure! Here is your flyer.").unwrap_err();
        assert!(err.to_string().contains("not valid JSON"));
    }
}
