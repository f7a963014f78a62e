//! Suggest endpoint response parser.
//!
//! The Firefox-client response is a JSON array:
//! - `[0]`: the echoed query
//! - `[1]`: ordered suggestion strings
//! - anything after that is ignored

use pagesmith_shared::{PagesmithError, Result};
use serde_json::Value;

/// Parse a suggest response body into its ordered suggestion list.
pub(crate) fn parse_suggest_response(body: &str) -> Result<Vec<String>> {
    let value: Value = serde_json::from_str(body.trim())
        .map_err(|e| PagesmithError::parse(format!("suggest response is not JSON: {e}")))?;

    let items = value
        .as_array()
        .filter(|arr| arr.len() >= 2)
        .and_then(|arr| arr[1].as_array())
        .ok_or_else(|| {
            PagesmithError::parse("suggest response is not a [query, [suggestions..]] array")
        })?;

    Ok(items
        .iter()
        .filter_map(|item| match item {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_fixture() {
        let content = std::fs::read_to_string("../../../fixtures/suggest/firefox-response.json")
            .expect("read fixture");
        let suggestions = parse_suggest_response(&content).unwrap();

        assert_eq!(suggestions.len(), 6);
        assert_eq!(suggestions[0], "lru page replacement example");
        assert_eq!(suggestions[4], "lru");
    }

    #[test]
    fn parse_ignores_trailing_metadata() {
        let body = r#"["q", ["a", "b"], [], {"google:suggesttype": ["QUERY"]}]"#;
        assert_eq!(parse_suggest_response(body).unwrap(), vec!["a", "b"]);
    }

    #[test]
    fn parse_skips_non_string_items() {
        let body = r#"["q", ["a", null, 42, {"x": 1}]]"#;
        assert_eq!(parse_suggest_response(body).unwrap(), vec!["a", "42"]);
    }

    #[test]
    fn parse_rejects_wrong_shape() {
        assert!(parse_suggest_response("").is_err());
        assert!(parse_suggest_response("<html>blocked</html>").is_err());
        assert!(parse_suggest_response(r#"["only the query"]"#).is_err());
        assert!(parse_suggest_response(r#"{"q": ["a"]}"#).is_err());
        assert!(parse_suggest_response(r#"["q", "not a list"]"#).is_err());
    }
}
