//! Tolerant JSON extraction from model responses
//!
//! Models asked for JSON still wrap it in prose or markdown fences often
//! enough that direct parsing is not sufficient. Extraction runs three
//! stages: parse the whole response, then the contents of a ```json fence,
//! then the slice between the first `{` and the last `}`.

use regex_lite::Regex;
use serde_json::Value;
use thiserror::Error;

/// Why no JSON value could be recovered from a response
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("invalid JSON extracted from fenced code block: {0}")]
    FencedBlock(#[source] serde_json::Error),
    #[error("invalid JSON extracted by brace matching: {0}")]
    BraceSlice(#[source] serde_json::Error),
    #[error("no JSON object found in model response")]
    NotFound,
}

/// Pull a JSON value out of a model response, tolerating surrounding text.
///
/// A fenced block that contains invalid JSON is reported as such rather
/// than falling through to brace matching; the fence marks where the model
/// intended its JSON to be.
pub fn extract_json(content: &str) -> Result<Value, ExtractError> {
    if let Ok(value) = serde_json::from_str::<Value>(content) {
        return Ok(value);
    }

    let fence = Regex::new(r"(?s)```json\s*(.*?)\s*```").unwrap();
    if let Some(captures) = fence.captures(content) {
        let snippet = captures.get(1).map(|m| m.as_str()).unwrap_or_default();
        return serde_json::from_str(snippet).map_err(ExtractError::FencedBlock);
    }

    if let (Some(start), Some(end)) = (content.find('{'), content.rfind('}')) {
        if end > start {
            return serde_json::from_str(&content[start..=end]).map_err(ExtractError::BraceSlice);
        }
    }

    Err(ExtractError::NotFound)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_direct_json() {
        let value = extract_json(r#"{"explanation_summary": "Greetings"}"#).unwrap();
        assert_eq!(value, json!({"explanation_summary": "Greetings"}));
    }

    #[test]
    fn test_fenced_block() {
        let content = "Here is your lesson:\n```json\n{\"lesson_content\": \"Bonjour\"}\n```\nEnjoy!";
        let value = extract_json(content).unwrap();
        assert_eq!(value, json!({"lesson_content": "Bonjour"}));
    }

    #[test]
    fn test_fenced_block_with_extra_whitespace() {
        let content = "```json\n\n  {\"a\": 1}  \n\n```";
        let value = extract_json(content).unwrap();
        assert_eq!(value, json!({"a": 1}));
    }

    #[test]
    fn test_brace_slice() {
        let content = "Sure! The lesson is {\"a\": [1, 2], \"b\": {\"c\": 3}} as requested.";
        let value = extract_json(content).unwrap();
        assert_eq!(value, json!({"a": [1, 2], "b": {"c": 3}}));
    }

    #[test]
    fn test_untagged_fence_falls_back_to_braces() {
        let content = "```\n{\"a\": 1}\n```";
        let value = extract_json(content).unwrap();
        assert_eq!(value, json!({"a": 1}));
    }

    #[test]
    fn test_all_stages_agree() {
        let object = json!({"exercises": ["Translate: hello."]});
        let direct = serde_json::to_string(&object).unwrap();
        let fenced = format!("```json\n{}\n```", direct);
        let embedded = format!("Of course. {} Hope this helps!", direct);

        assert_eq!(extract_json(&direct).unwrap(), object);
        assert_eq!(extract_json(&fenced).unwrap(), object);
        assert_eq!(extract_json(&embedded).unwrap(), object);
    }

    #[test]
    fn test_invalid_fenced_json_does_not_fall_through() {
        // The fence marks intent; a broken payload inside it is an error even
        // though brace matching might find something parseable elsewhere
        let content = "```json\n{\"a\": oops}\n```\n{\"b\": 2}";
        let err = extract_json(content).unwrap_err();
        assert!(matches!(err, ExtractError::FencedBlock(_)));
    }

    #[test]
    fn test_invalid_braced_json() {
        let err = extract_json("prefix {not json at all} suffix").unwrap_err();
        assert!(matches!(err, ExtractError::BraceSlice(_)));
    }

    #[test]
    fn test_no_json_at_all() {
        let err = extract_json("I am sorry, I cannot help with that.").unwrap_err();
        assert!(matches!(err, ExtractError::NotFound));
    }
}
