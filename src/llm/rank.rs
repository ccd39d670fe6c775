//! Batch outfit ranking: one reasoning call scores every candidate. Results
//! merge back by `combo_id`, never by response order; a failed or unparsable
//! call degrades every candidate to a neutral score, preserving generation
//! order.

use std::collections::HashMap;
use std::time::Duration;

use serde::Deserialize;

use crate::llm::client::{ChatMessage, ReasoningClient};
use crate::llm::json::parse_json_response;
use crate::llm::truncate_chars;
use crate::models::{Language, OutfitCandidate, ScoredOutfit};

const RANK_TIMEOUT: Duration = Duration::from_secs(60);
const RANK_MAX_TOKENS: u32 = 1024;

const NEUTRAL_SCORE: f32 = 0.5;

/// One scored entry of the model's JSON array.
#[derive(Debug, Deserialize)]
pub struct Evaluation {
    pub combo_id: usize,
    #[serde(default)]
    pub score: Option<f32>,
    #[serde(default)]
    pub reason: String,
}

fn describe_candidate(index: usize, candidate: &OutfitCandidate) -> String {
    match candidate {
        OutfitCandidate::TwoPiece { top, bottom } => format!(
            "Combo {index}: Top [{}]: {} + Bottom [{}]: {}",
            top.garment_id,
            truncate_chars(&top.description, 80),
            bottom.garment_id,
            truncate_chars(&bottom.description, 80),
        ),
        OutfitCandidate::Dress { dress } => format!(
            "Combo {index}: Dress [{}]: {}",
            dress.garment_id,
            truncate_chars(&dress.description, 100),
        ),
    }
}

fn build_rank_prompt(candidates: &[OutfitCandidate], query: &str, language: Language) -> String {
    let digest: Vec<String> = candidates
        .iter()
        .enumerate()
        .map(|(i, c)| describe_candidate(i, c))
        .collect();

    let lang_instruction = match language {
        Language::Zh => "回复请使用中文。",
        Language::En => "Respond in English.",
    };

    format!(
        r#"You are a fashion stylist evaluating outfit combinations for this request: "{query}"

Here are the outfit candidates:
{}

For EACH combination, evaluate how well it matches the user's request considering:
- Style coherence between pieces
- Color coordination
- Occasion appropriateness
- Overall aesthetic appeal

{lang_instruction}

Return a JSON array with one object per combo:
[
  {{"combo_id": 0, "score": 0.85, "reason": "Brief explanation why this works or doesn't..."}},
  ...
]

Score from 0.0 (poor match) to 1.0 (perfect match). Return ONLY the JSON array."#,
        digest.join("\n"),
    )
}

/// Annotate every candidate with a neutral score. Used when the caller opted
/// out of reasoning and as the whole-call degrade path.
pub fn neutral_scores(candidates: Vec<OutfitCandidate>) -> Vec<ScoredOutfit> {
    candidates
        .into_iter()
        .map(|outfit| ScoredOutfit {
            outfit,
            score: NEUTRAL_SCORE,
            reason: String::new(),
        })
        .collect()
}

/// Merge evaluations into candidates by `combo_id` and stable-sort by score
/// descending. Indices absent from the response get the neutral default, and
/// scores are clamped to [0, 1].
pub fn apply_evaluations(
    candidates: Vec<OutfitCandidate>,
    evaluations: &[Evaluation],
) -> Vec<ScoredOutfit> {
    let by_id: HashMap<usize, &Evaluation> =
        evaluations.iter().map(|e| (e.combo_id, e)).collect();

    let mut scored: Vec<ScoredOutfit> = candidates
        .into_iter()
        .enumerate()
        .map(|(i, outfit)| match by_id.get(&i) {
            Some(eval) => ScoredOutfit {
                outfit,
                score: eval.score.unwrap_or(NEUTRAL_SCORE).clamp(0.0, 1.0),
                reason: eval.reason.clone(),
            },
            None => ScoredOutfit {
                outfit,
                score: NEUTRAL_SCORE,
                reason: String::new(),
            },
        })
        .collect();

    // Stable sort: equal scores keep generation order.
    scored.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    scored
}

/// Score all candidates with a single reasoning call.
pub async fn rank_outfits(
    llm: &dyn ReasoningClient,
    candidates: Vec<OutfitCandidate>,
    query: &str,
    language: Language,
) -> Vec<ScoredOutfit> {
    if candidates.is_empty() {
        return Vec::new();
    }

    let prompt = build_rank_prompt(&candidates, query, language);
    let messages = [ChatMessage::user(prompt)];

    let text = match llm.chat(&messages, RANK_MAX_TOKENS, RANK_TIMEOUT).await {
        Ok(text) => text,
        Err(e) => {
            tracing::warn!("Outfit ranking call failed: {e}");
            return neutral_scores(candidates);
        }
    };

    match parse_json_response::<Vec<Evaluation>>(&text) {
        Ok(evaluations) => apply_evaluations(candidates, &evaluations),
        Err(e) => {
            tracing::warn!("Outfit ranking response was not valid JSON: {e}");
            neutral_scores(candidates)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::GarmentRecord;

    fn record(id: &str) -> GarmentRecord {
        GarmentRecord {
            garment_id: id.to_string(),
            description: format!("description of {id}"),
            similarity_score: 0.9,
            category: None,
            garment_type: None,
            colors: vec![],
            styles: vec![],
            occasions: vec![],
            image_path: String::new(),
            image_url: None,
        }
    }

    fn dress(id: &str) -> OutfitCandidate {
        OutfitCandidate::Dress { dress: record(id) }
    }

    #[test]
    fn test_merge_by_combo_id_not_response_order() {
        let candidates = vec![dress("d0"), dress("d1"), dress("d2")];
        // Response arrives out of order
        let evals = vec![
            Evaluation {
                combo_id: 2,
                score: Some(0.9),
                reason: "best".to_string(),
            },
            Evaluation {
                combo_id: 0,
                score: Some(0.3),
                reason: "weak".to_string(),
            },
            Evaluation {
                combo_id: 1,
                score: Some(0.6),
                reason: "ok".to_string(),
            },
        ];
        let scored = apply_evaluations(candidates, &evals);
        assert_eq!(scored[0].outfit.garment_ids(), vec!["d2"]);
        assert_eq!(scored[1].outfit.garment_ids(), vec!["d1"]);
        assert_eq!(scored[2].outfit.garment_ids(), vec!["d0"]);
        assert_eq!(scored[0].reason, "best");
    }

    #[test]
    fn test_missing_combo_id_gets_neutral_default() {
        let candidates = vec![dress("d0"), dress("d1")];
        let evals = vec![Evaluation {
            combo_id: 0,
            score: Some(0.2),
            reason: "meh".to_string(),
        }];
        let scored = apply_evaluations(candidates, &evals);
        // d1 got the neutral 0.5 and therefore outranks d0
        assert_eq!(scored[0].outfit.garment_ids(), vec!["d1"]);
        assert_eq!(scored[0].score, 0.5);
        assert_eq!(scored[0].reason, "");
    }

    #[test]
    fn test_scores_clamped_to_unit_interval() {
        let candidates = vec![dress("d0"), dress("d1")];
        let evals = vec![
            Evaluation {
                combo_id: 0,
                score: Some(1.7),
                reason: String::new(),
            },
            Evaluation {
                combo_id: 1,
                score: Some(-0.4),
                reason: String::new(),
            },
        ];
        let scored = apply_evaluations(candidates, &evals);
        assert_eq!(scored[0].score, 1.0);
        assert_eq!(scored[1].score, 0.0);
    }

    #[test]
    fn test_equal_scores_preserve_generation_order() {
        let candidates = vec![dress("d0"), dress("d1"), dress("d2")];
        let scored = apply_evaluations(candidates, &[]);
        let ids: Vec<_> = scored.iter().map(|s| s.outfit.garment_ids()[0].to_string()).collect();
        assert_eq!(ids, vec!["d0", "d1", "d2"]);
    }

    #[test]
    fn test_neutral_scores_annotation() {
        let scored = neutral_scores(vec![dress("d0"), dress("d1")]);
        assert!(scored.iter().all(|s| s.score == 0.5 && s.reason.is_empty()));
    }

    #[test]
    fn test_evaluation_without_score_defaults_neutral() {
        let evals: Vec<Evaluation> =
            serde_json::from_str(r#"[{"combo_id": 0, "reason": "no score given"}]"#).unwrap();
        let scored = apply_evaluations(vec![dress("d0")], &evals);
        assert_eq!(scored[0].score, 0.5);
        assert_eq!(scored[0].reason, "no score given");
    }

    #[test]
    fn test_prompt_truncates_long_descriptions() {
        let mut long = record("t0");
        long.description = "a".repeat(500);
        let candidates = vec![OutfitCandidate::TwoPiece {
            top: long,
            bottom: record("b0"),
        }];
        let prompt = build_rank_prompt(&candidates, "query", Language::En);
        assert!(!prompt.contains(&"a".repeat(100)));
        assert!(prompt.contains("Combo 0"));
    }
}
