use serde_json::{json, Value};

use crate::keywords::{Difficulty, SearchVolume};

pub fn system_instruction() -> &'static str {
    "You are an expert SEO analyst and keyword research tool. Your task is to generate \
relevant long-tail keywords, their hypothetical SEO metrics, content ideas, and potential \
SERP features. Ensure the difficulty and search volume estimates are plausible for the \
given keyword."
}

pub fn user_prompt(seed: &str, count: u8) -> String {
    // Quotes would break out of the quoted topic
    let seed = seed.trim().replace('"', "'");

    format!(
        "Generate {count} related long-tail keywords for the topic \"{seed}\". For each keyword, provide:\n\
1.  A \"keyword\" string.\n\
2.  A \"difficulty\" rating (one of: {difficulties}).\n\
3.  A \"searchVolume\" range (one of: {volumes}).\n\
4.  An array of 2-3 \"contentIdeas\" strings relevant to the keyword.\n\
5.  An array of 1-2 \"serpFeatures\" strings (e.g., 'Featured Snippet', 'People Also Ask', \
'Videos', 'Images', 'Shopping', 'Local Pack', 'Knowledge Panel').\n\n\
Format the output strictly as a JSON array of objects, adhering to the provided schema.",
        difficulties = quoted_list(&Difficulty::ALLOWED),
        volumes = quoted_list(&SearchVolume::ALLOWED),
    )
}

/// OpenAPI-style schema the response must conform to
pub fn response_schema() -> Value {
    json!({
        "type": "ARRAY",
        "items": {
            "type": "OBJECT",
            "properties": {
                "keyword": {
                    "type": "STRING",
                    "description": "The generated keyword phrase."
                },
                "difficulty": {
                    "type": "STRING",
                    "enum": Difficulty::ALLOWED,
                    "description": "Hypothetical SEO difficulty for ranking."
                },
                "searchVolume": {
                    "type": "STRING",
                    "enum": SearchVolume::ALLOWED,
                    "description": "Hypothetical monthly search volume range."
                },
                "contentIdeas": {
                    "type": "ARRAY",
                    "items": { "type": "STRING" },
                    "description": "Content topics or blog post ideas related to the keyword."
                },
                "serpFeatures": {
                    "type": "ARRAY",
                    "items": { "type": "STRING" },
                    "description": "Common Google SERP features that might appear for this keyword."
                }
            },
            "required": ["keyword", "difficulty", "searchVolume", "contentIdeas", "serpFeatures"]
        }
    })
}

fn quoted_list(values: &[&str]) -> String {
    values
        .iter()
        .map(|v| format!("'{}'", v))
        .collect::<Vec<_>>()
        .join(", ")
}
