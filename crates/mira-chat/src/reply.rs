//! Reply extraction from chat-completion responses.

use serde_json::Value;

/// Extract the assistant reply from a response body.
///
/// Checks, in order, `choices[0].message.content`, `choices[0].text`,
/// `result` and `output`, taking the first non-empty string. Responses in
/// any other shape are returned as compact JSON text so nothing is lost.
#[must_use]
pub fn extract_reply(response: &Value) -> String {
    const CANDIDATES: &[&str] = &[
        "/choices/0/message/content",
        "/choices/0/text",
        "/result",
        "/output",
    ];

    CANDIDATES
        .iter()
        .filter_map(|pointer| response.pointer(pointer).and_then(Value::as_str))
        .find(|text| !text.is_empty())
        .map_or_else(|| response.to_string(), str::to_owned)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn test_message_content() {
        let response = json!({
            "id": "gen-1",
            "choices": [{ "message": { "role": "assistant", "content": "## Plan" } }]
        });
        assert_eq!(extract_reply(&response), "## Plan");
    }

    #[test]
    fn test_legacy_text_choice() {
        let response = json!({ "choices": [{ "text": "completion" }] });
        assert_eq!(extract_reply(&response), "completion");
    }

    #[test]
    fn test_empty_content_falls_through() {
        let response = json!({ "choices": [{ "message": { "content": "" }, "text": "fallback" }] });
        assert_eq!(extract_reply(&response), "fallback");
    }

    #[test]
    fn test_result_and_output_fields() {
        assert_eq!(extract_reply(&json!({ "result": "r" })), "r");
        assert_eq!(extract_reply(&json!({ "output": "o" })), "o");
    }

    #[test]
    fn test_unknown_shape_returned_as_json() {
        let response = json!({ "error": { "message": "rate limited" } });
        assert_eq!(
            extract_reply(&response),
            r#"{"error":{"message":"rate limited"}}"#
        );
    }

    #[test]
    fn test_non_string_content_ignored() {
        let response = json!({ "choices": [{ "message": { "content": null } }], "output": "o" });
        assert_eq!(extract_reply(&response), "o");
    }
}
