//! Intent parsing: one reasoning call turns a free-text fashion request into
//! a structured [`Intent`]. Any recoverable failure (transport error,
//! timeout, non-JSON output) degrades to a raw-query fallback — this function
//! never fails the request.

use std::time::Duration;

use serde::Deserialize;

use crate::llm::client::{ChatMessage, ReasoningClient};
use crate::llm::json::parse_json_response;
use crate::models::{infer_category, Intent, Language, RecommendMode};

const INTENT_TIMEOUT: Duration = Duration::from_secs(30);
const INTENT_MAX_TOKENS: u32 = 512;

fn build_intent_prompt(query: &str) -> String {
    format!(
        r#"You are a fashion stylist assistant. Parse the user's clothing request into structured search parameters.

User query: "{query}"

Extract the following parameters (return null if not specified or not applicable):

1. LANGUAGE & MODE DETECTION:
   - language: "zh" | "en" (detect from user's query language)
   - recommendation_mode: "single_item" | "full_outfit"
     * "single_item": user wants specific garment types (e.g., "推荐T恤", "show me some dresses")
     * "full_outfit": user wants complete outfits/穿搭 (e.g., "推荐3套穿搭", "recommend outfits for date")
   - count: number of items/outfits to recommend (default: 3 for full_outfit, 5 for single_item)

2. GARMENT FILTERS:
   - garment_type: specific garment type if mentioned, one of ["dress", "top", "blouse", "shirt", "t-shirt", "sweater", "jacket", "coat", "pants", "jeans", "shorts", "skirt", "jumpsuit", "romper"] or null
   - category: "dresses" | "upper_body" | "lower_body" | null
     * If garment_type is specified, infer category automatically:
       - dress/jumpsuit/romper → "dresses"
       - top/blouse/shirt/t-shirt/sweater/jacket/coat → "upper_body"
       - pants/jeans/shorts/skirt → "lower_body"
     * If full_outfit mode and no specific type, leave as null

3. STYLE ATTRIBUTES:
   - gender: "female" | "male" | "unisex" | null
   - style: one of ["classic", "boho", "minimalist", "preppy", "casual", "street_style", "sporty_chic", "grunge", "romantic", "edgy", "vintage", "elegant"] or null
   - season: one of ["spring", "summer", "fall", "winter", "all_season"] or null
   - occasion: one of ["casual", "work", "formal", "party", "date", "vacation", "athletic", "everyday"] or null
   - body_type: one of ["rectangle", "triangle", "inverted_triangle", "oval", "trapezoid", "hourglass", "pear", "apple", "athletic"] or null
   - color: primary color mentioned or null

4. SEMANTIC QUERY:
   - semantic_query: a refined search query describing the desired garment/outfit style (always provide this)

Return ONLY a JSON object with these fields."#
    )
}

/// Intent fields exactly as the model returns them, before normalization.
#[derive(Debug, Default, Deserialize)]
struct RawIntent {
    #[serde(default)]
    language: Option<String>,
    #[serde(default)]
    recommendation_mode: Option<String>,
    #[serde(default)]
    count: Option<u32>,
    #[serde(default)]
    garment_type: Option<String>,
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    gender: Option<String>,
    #[serde(default)]
    style: Option<String>,
    #[serde(default)]
    season: Option<String>,
    #[serde(default)]
    occasion: Option<String>,
    #[serde(default)]
    body_type: Option<String>,
    #[serde(default)]
    color: Option<String>,
    #[serde(default)]
    semantic_query: Option<String>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

fn normalize(raw: RawIntent, query: &str) -> Intent {
    let mode = match raw.recommendation_mode.as_deref() {
        Some("single_item") => RecommendMode::SingleItem,
        _ => RecommendMode::FullOutfit,
    };
    let language = match raw.language.as_deref() {
        Some("zh") => Language::Zh,
        _ => Language::En,
    };
    let count = match raw.count {
        Some(n) if n > 0 => n as usize,
        _ => match mode {
            RecommendMode::FullOutfit => 3,
            RecommendMode::SingleItem => 5,
        },
    };

    let garment_type = non_empty(raw.garment_type);
    // An explicit category wins over garment-type inference when the two
    // disagree.
    let category = non_empty(raw.category).or_else(|| {
        garment_type
            .as_deref()
            .and_then(infer_category)
            .map(String::from)
    });

    Intent {
        language,
        mode,
        count,
        garment_type,
        category,
        gender: non_empty(raw.gender),
        style: non_empty(raw.style),
        season: non_empty(raw.season),
        occasion: non_empty(raw.occasion),
        body_type: non_empty(raw.body_type),
        color: non_empty(raw.color),
        semantic_query: non_empty(raw.semantic_query).unwrap_or_else(|| query.to_string()),
    }
}

/// Parse a fashion request into an [`Intent`]. Never errors: any failure in
/// the reasoning call or its output yields [`Intent::fallback`].
pub async fn parse_intent(llm: &dyn ReasoningClient, query: &str) -> Intent {
    let prompt = build_intent_prompt(query);
    let messages = [ChatMessage::user(prompt)];

    let text = match llm.chat(&messages, INTENT_MAX_TOKENS, INTENT_TIMEOUT).await {
        Ok(text) => text,
        Err(e) => {
            tracing::warn!("Intent parsing call failed: {e}");
            return Intent::fallback(query);
        }
    };

    match parse_json_response::<RawIntent>(&text) {
        Ok(raw) => normalize(raw, query),
        Err(e) => {
            tracing::warn!("Intent response was not valid JSON: {e}");
            Intent::fallback(query)
        }
    }
}
