//! Fenced-JSON extraction for free-text model responses.
//!
//! Both the intent parser and the batch ranker ask for "JSON only" but models
//! routinely wrap the payload in a markdown code fence. The contract here:
//! locate the first fenced block if present, else treat the entire text as
//! JSON; any parse error surfaces to the caller's fallback policy.

use anyhow::Result;
use serde::de::DeserializeOwned;

/// Strip a surrounding markdown code fence, returning the inner payload.
/// Text without a fence is returned as-is.
pub fn extract_json_payload(text: &str) -> &str {
    let Some(start) = text.find("```") else {
        return text;
    };
    let body = &text[start + 3..];
    let body = body.strip_prefix("json").unwrap_or(body);
    match body.find("```") {
        Some(end) => &body[..end],
        None => body,
    }
}

/// Decode a model response into `T`, tolerating a fenced code block.
pub fn parse_json_response<T: DeserializeOwned>(text: &str) -> Result<T> {
    let payload = extract_json_payload(text).trim();
    Ok(serde_json::from_str(payload)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_json_passes_through() {
        let parsed: serde_json::Value = parse_json_response(r#"{"a": 1}"#).unwrap();
        assert_eq!(parsed["a"], 1);
    }

    #[test]
    fn test_json_fence_stripped() {
        let input = "```json\n{\"a\": 1}\n```";
        let parsed: serde_json::Value = parse_json_response(input).unwrap();
        assert_eq!(parsed["a"], 1);
    }

    #[test]
    fn test_bare_fence_stripped() {
        let input = "```\n[1, 2, 3]\n```";
        let parsed: Vec<i32> = parse_json_response(input).unwrap();
        assert_eq!(parsed, vec![1, 2, 3]);
    }

    #[test]
    fn test_fence_with_surrounding_prose() {
        let input = "Here is the result:\n```json\n{\"mode\": \"full_outfit\"}\n```\nLet me know!";
        let parsed: serde_json::Value = parse_json_response(input).unwrap();
        assert_eq!(parsed["mode"], "full_outfit");
    }

    #[test]
    fn test_unterminated_fence_still_parses() {
        let input = "```json\n{\"a\": 1}";
        let parsed: serde_json::Value = parse_json_response(input).unwrap();
        assert_eq!(parsed["a"], 1);
    }

    #[test]
    fn test_garbage_is_an_error() {
        let result: Result<serde_json::Value> = parse_json_response("not json at all");
        assert!(result.is_err());
    }

    #[test]
    fn test_unicode_payload() {
        let input = "```json\n{\"reason\": \"颜色搭配协调\"}\n```";
        let parsed: serde_json::Value = parse_json_response(input).unwrap();
        assert_eq!(parsed["reason"], "颜色搭配协调");
    }
}
