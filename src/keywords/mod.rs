use serde::{Deserialize, Serialize};
use std::fmt;

/// Hard upper bound on how many suggestions one query may ask for
pub const MAX_KEYWORD_COUNT: u8 = 20;

/// Default number of suggestions when neither CLI nor config says otherwise
pub const DEFAULT_KEYWORD_COUNT: u8 = 10;

/// One keyword suggestion as returned by the model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeywordSuggestion {
    pub keyword: String,
    pub difficulty: Difficulty,
    pub search_volume: SearchVolume,
    pub content_ideas: Vec<String>,
    pub serp_features: Vec<String>,
}

/// Hypothetical ranking difficulty.
///
/// The model is schema-constrained to the four known levels, but anything
/// else still deserializes into `Other` so rendering never fails on it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Difficulty {
    Low,
    Medium,
    High,
    VeryHigh,
    Other(String),
}

impl Difficulty {
    pub const ALLOWED: [&'static str; 4] = ["Low", "Medium", "High", "Very High"];

    pub fn as_str(&self) -> &str {
        match self {
            Difficulty::Low => "Low",
            Difficulty::Medium => "Medium",
            Difficulty::High => "High",
            Difficulty::VeryHigh => "Very High",
            Difficulty::Other(s) => s,
        }
    }
}

impl From<String> for Difficulty {
    fn from(s: String) -> Self {
        match s.as_str() {
            "Low" => Difficulty::Low,
            "Medium" => Difficulty::Medium,
            "High" => Difficulty::High,
            "Very High" => Difficulty::VeryHigh,
            _ => Difficulty::Other(s),
        }
    }
}

impl From<Difficulty> for String {
    fn from(d: Difficulty) -> Self {
        match d {
            Difficulty::Other(s) => s,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Hypothetical monthly search volume bucket
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SearchVolume {
    UpTo10,
    UpTo100,
    UpTo1K,
    UpTo10K,
    UpTo100K,
    Over100K,
    Other(String),
}

impl SearchVolume {
    pub const ALLOWED: [&'static str; 6] = ["0-10", "10-100", "100-1K", "1K-10K", "10K-100K", "100K+"];

    pub fn as_str(&self) -> &str {
        match self {
            SearchVolume::UpTo10 => "0-10",
            SearchVolume::UpTo100 => "10-100",
            SearchVolume::UpTo1K => "100-1K",
            SearchVolume::UpTo10K => "1K-10K",
            SearchVolume::UpTo100K => "10K-100K",
            SearchVolume::Over100K => "100K+",
            SearchVolume::Other(s) => s,
        }
    }
}

impl From<String> for SearchVolume {
    fn from(s: String) -> Self {
        match s.as_str() {
            "0-10" => SearchVolume::UpTo10,
            "10-100" => SearchVolume::UpTo100,
            "100-1K" => SearchVolume::UpTo1K,
            "1K-10K" => SearchVolume::UpTo10K,
            "10K-100K" => SearchVolume::UpTo100K,
            "100K+" => SearchVolume::Over100K,
            _ => SearchVolume::Other(s),
        }
    }
}

impl From<SearchVolume> for String {
    fn from(v: SearchVolume) -> Self {
        match v {
            SearchVolume::Other(s) => s,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for SearchVolume {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Clamp a requested count into the range the prompt supports
pub fn clamp_count(count: u8) -> u8 {
    count.clamp(1, MAX_KEYWORD_COUNT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_suggestion_uses_camel_case_fields() {
        let json = r#"{
            "keyword": "best trail running shoes",
            "difficulty": "Very High",
            "searchVolume": "10K-100K",
            "contentIdeas": ["Buyer's guide", "Top 10 list"],
            "serpFeatures": ["Shopping"]
        }"#;

        let parsed: KeywordSuggestion = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.difficulty, Difficulty::VeryHigh);
        assert_eq!(parsed.search_volume, SearchVolume::UpTo100K);
        assert_eq!(parsed.content_ideas.len(), 2);

        let back = serde_json::to_value(&parsed).unwrap();
        assert_eq!(back["searchVolume"], "10K-100K");
        assert_eq!(back["difficulty"], "Very High");
    }

    #[test]
    fn test_unknown_levels_are_kept() {
        let json = r#"{
            "keyword": "x",
            "difficulty": "Extreme",
            "searchVolume": "1M+",
            "contentIdeas": [],
            "serpFeatures": []
        }"#;

        let parsed: KeywordSuggestion = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.difficulty, Difficulty::Other("Extreme".to_string()));
        assert_eq!(parsed.search_volume.as_str(), "1M+");
    }

    #[test]
    fn test_missing_field_is_rejected() {
        let json = r#"{"keyword": "x", "difficulty": "Low", "searchVolume": "0-10", "contentIdeas": []}"#;
        assert!(serde_json::from_str::<KeywordSuggestion>(json).is_err());
    }

    #[test]
    fn test_clamp_count() {
        assert_eq!(clamp_count(0), 1);
        assert_eq!(clamp_count(7), 7);
        assert_eq!(clamp_count(200), MAX_KEYWORD_COUNT);
    }
}
