use crate::keywords::KeywordSuggestion;

use super::GenerateError;

/// Parse the model's text into suggestions.
///
/// The response is schema-constrained JSON, so anything that does not parse
/// as an array of complete records is treated as a failed fetch.
pub fn parse_suggestions(raw: &str) -> Result<Vec<KeywordSuggestion>, GenerateError> {
    let json_str = strip_code_fence(raw.trim());

    serde_json::from_str::<Vec<KeywordSuggestion>>(json_str).map_err(|e| {
        tracing::warn!("Model output did not match the keyword schema: {}", e);
        GenerateError::Failed(format!("invalid keyword JSON: {}", e))
    })
}

/// Some models still wrap JSON in a markdown fence even in JSON mode
fn strip_code_fence(s: &str) -> &str {
    let Some(rest) = s.strip_prefix("```") else {
        return s;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keywords::Difficulty;

    const TWO: &str = r#"[
        {"keyword": "a", "difficulty": "Low", "searchVolume": "0-10", "contentIdeas": ["x"], "serpFeatures": []},
        {"keyword": "b", "difficulty": "High", "searchVolume": "100K+", "contentIdeas": [], "serpFeatures": ["Videos"]}
    ]"#;

    #[test]
    fn test_parses_plain_array() {
        let parsed = parse_suggestions(&format!("\n  {}  \n", TWO)).unwrap();
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[0].keyword, "a");
        assert_eq!(parsed[1].difficulty, Difficulty::High);
    }

    #[test]
    fn test_parses_fenced_array() {
        let parsed = parse_suggestions(&format!("```json\n{}\n```", TWO)).unwrap();
        assert_eq!(parsed.len(), 2);
    }

    #[test]
    fn test_rejects_non_array() {
        assert!(matches!(parse_suggestions("{\"keyword\": \"a\"}"), Err(GenerateError::Failed(_))));
        assert!(matches!(parse_suggestions("Sorry, I can't help"), Err(GenerateError::Failed(_))));
    }

    #[test]
    fn test_empty_array_is_ok() {
        assert!(parse_suggestions("[]").unwrap().is_empty());
    }
}
