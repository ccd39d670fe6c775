//! Advice synthesis: a short stylist note justifying the selected garments or
//! outfits. Best-effort — callers substitute a placeholder on failure and
//! never block the core recommendations on this call.

use std::time::Duration;

use anyhow::Result;

use crate::llm::client::{ChatMessage, ReasoningClient};
use crate::llm::truncate_chars;
use crate::models::{GarmentRecord, Language, OutfitCandidate, ScoredOutfit};

const ADVICE_TIMEOUT: Duration = Duration::from_secs(30);
const ADVICE_MAX_TOKENS: u32 = 256;

fn lang_instruction(language: Language) -> &'static str {
    match language {
        Language::Zh => "回复请使用中文，简洁专业。",
        Language::En => "Respond in English, brief and professional.",
    }
}

/// Overall styling advice for a set of selected outfits. Only the first three
/// are digested into the prompt.
pub async fn outfit_advice(
    llm: &dyn ReasoningClient,
    outfits: &[ScoredOutfit],
    query: &str,
    language: Language,
) -> Result<String> {
    let summary: Vec<String> = outfits
        .iter()
        .take(3)
        .enumerate()
        .map(|(i, scored)| match &scored.outfit {
            OutfitCandidate::TwoPiece { top, bottom } => format!(
                "{}. {} + {}",
                i + 1,
                truncate_chars(&top.description, 50),
                truncate_chars(&bottom.description, 50),
            ),
            OutfitCandidate::Dress { dress } => {
                format!("{}. {}", i + 1, truncate_chars(&dress.description, 80))
            }
        })
        .collect();

    let prompt = format!(
        r#"Based on the user's request: "{query}"

I've selected these outfits:
{}

{}
Provide a brief (2-3 sentences) overall styling recommendation explaining why these outfit selections suit the user's needs."#,
        summary.join("\n"),
        lang_instruction(language),
    );

    llm.chat(&[ChatMessage::user(prompt)], ADVICE_MAX_TOKENS, ADVICE_TIMEOUT)
        .await
}

/// Styling advice for a set of individually recommended garments.
pub async fn single_item_advice(
    llm: &dyn ReasoningClient,
    records: &[GarmentRecord],
    query: &str,
    language: Language,
) -> Result<String> {
    let listing: Vec<String> = records
        .iter()
        .map(|r| format!("- {}: {}", r.garment_id, truncate_chars(&r.description, 100)))
        .collect();

    let prompt = format!(
        r#"Based on the user's request: "{query}"

I found these garment options:
{}

{}
Provide a brief (2-3 sentences) styling recommendation explaining why these choices suit the user's needs."#,
        listing.join("\n"),
        lang_instruction(language),
    );

    llm.chat(&[ChatMessage::user(prompt)], ADVICE_MAX_TOKENS, ADVICE_TIMEOUT)
        .await
}
