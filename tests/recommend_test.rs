//! Integration tests for the recommendation pipeline, exercised end to end
//! against an in-memory catalog and a scripted reasoning client — no running
//! Chroma or LLM required.

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;

use stylist_search::catalog::{CatalogHit, GarmentCatalog, GarmentMetadata, HardFilters};
use stylist_search::llm::client::{ChatMessage, ReasoningClient};
use stylist_search::models::{OutfitCandidate, RecommendationResult};
use stylist_search::recommend::{dataset_image_resolver, Stylist, NO_OUTFIT_ADVICE};

// ─── Fakes ───────────────────────────────────────────────

/// In-memory catalog applying the hard filters exactly like the real store.
struct FixtureCatalog {
    garments: Vec<CatalogHit>,
    queried_filters: Mutex<Vec<HardFilters>>,
}

impl FixtureCatalog {
    fn new(garments: Vec<CatalogHit>) -> Self {
        Self {
            garments,
            queried_filters: Mutex::new(Vec::new()),
        }
    }

    fn queried_categories(&self) -> Vec<String> {
        self.queried_filters
            .lock()
            .unwrap()
            .iter()
            .filter_map(|f| f.category.clone())
            .collect()
    }
}

#[async_trait]
impl GarmentCatalog for FixtureCatalog {
    async fn query(
        &self,
        _text: &str,
        filters: &HardFilters,
        limit: usize,
    ) -> Result<Vec<CatalogHit>> {
        self.queried_filters.lock().unwrap().push(filters.clone());
        let hits = self
            .garments
            .iter()
            .filter(|g| {
                filters
                    .category
                    .as_ref()
                    .map_or(true, |c| g.metadata.category.as_deref() == Some(c))
                    && filters
                        .gender
                        .as_ref()
                        .map_or(true, |v| g.metadata.gender.as_deref() == Some(v))
                    && filters
                        .garment_type
                        .as_ref()
                        .map_or(true, |t| g.metadata.garment_type.as_deref() == Some(t))
            })
            .take(limit)
            .cloned()
            .collect();
        Ok(hits)
    }

    async fn count(&self) -> Result<usize> {
        Ok(self.garments.len())
    }
}

/// Scripted reasoning client: responses keyed by which pipeline stage the
/// prompt belongs to. `None` simulates a failed call.
struct ScriptedLlm {
    intent: Option<String>,
    rank: Option<String>,
    advice: Option<String>,
    calls: AtomicUsize,
}

impl ScriptedLlm {
    fn new(intent: Option<&str>, rank: Option<&str>, advice: Option<&str>) -> Self {
        Self {
            intent: intent.map(String::from),
            rank: rank.map(String::from),
            advice: advice.map(String::from),
            calls: AtomicUsize::new(0),
        }
    }

    fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ReasoningClient for ScriptedLlm {
    async fn chat(
        &self,
        messages: &[ChatMessage],
        _max_tokens: u32,
        _timeout: Duration,
    ) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let prompt = &messages[0].content;
        let scripted = if prompt.contains("Parse the user's clothing request") {
            &self.intent
        } else if prompt.contains("evaluating outfit combinations") {
            &self.rank
        } else {
            &self.advice
        };
        scripted
            .clone()
            .ok_or_else(|| anyhow::anyhow!("scripted failure"))
    }
}

// ─── Fixtures ────────────────────────────────────────────

fn hit(id: &str, category: &str, gender: &str) -> CatalogHit {
    CatalogHit {
        garment_id: id.to_string(),
        distance: 0.2,
        document: format!("{category} garment {id} in black cotton"),
        metadata: GarmentMetadata {
            category: Some(category.to_string()),
            gender: Some(gender.to_string()),
            garment_type: None,
            colors: "black".to_string(),
            relative_path: format!("{category}/images/{id}.jpg"),
            ..GarmentMetadata::default()
        },
        path: format!("/data/DressCode/{category}/images/{id}.jpg"),
    }
}

fn wardrobe(gender: &str) -> Vec<CatalogHit> {
    vec![
        hit("t0", "upper_body", gender),
        hit("t1", "upper_body", gender),
        hit("b0", "lower_body", gender),
        hit("b1", "lower_body", gender),
        hit("d0", "dresses", gender),
        hit("d1", "dresses", gender),
    ]
}

const FEMALE_OUTFIT_INTENT: &str = r#"{"language": "en", "recommendation_mode": "full_outfit",
    "count": 3, "gender": "female", "semantic_query": "casual date outfit"}"#;

const MALE_OUTFIT_INTENT: &str = r#"{"language": "en", "recommendation_mode": "full_outfit",
    "count": 3, "gender": "male", "semantic_query": "casual outfit for a man"}"#;

// ─── Tests ───────────────────────────────────────────────

#[tokio::test]
async fn test_full_outfit_pipeline_ranks_and_advises() {
    let catalog = Arc::new(FixtureCatalog::new(wardrobe("female")));
    let llm = Arc::new(ScriptedLlm::new(
        Some(FEMALE_OUTFIT_INTENT),
        Some(
            r#"```json
[{"combo_id": 2, "score": 0.95, "reason": "elegant"},
 {"combo_id": 0, "score": 0.4, "reason": "plain"},
 {"combo_id": 1, "score": 0.7, "reason": "solid"}]
```"#,
        ),
        Some("These picks balance comfort and polish."),
    ));

    let stylist = Stylist::new(catalog.clone(), llm.clone());
    let result = stylist.recommend("outfits for a date", true).await.unwrap();

    match result {
        RecommendationResult::FullOutfit {
            num_outfits,
            outfits,
            stylist_advice,
            ..
        } => {
            assert_eq!(num_outfits, 3);
            // combo 2 (the first dress) scored highest
            assert_eq!(outfits[0].score, 0.95);
            assert_eq!(outfits[0].reason, "elegant");
            assert!(matches!(outfits[0].outfit, OutfitCandidate::Dress { .. }));
            // scores all within bounds, ordered descending
            for pair in outfits.windows(2) {
                assert!(pair[0].score >= pair[1].score);
            }
            assert!(outfits.iter().all(|o| (0.0..=1.0).contains(&o.score)));
            assert_eq!(
                stylist_advice.as_deref(),
                Some("These picks balance comfort and polish.")
            );
        }
        other => panic!("expected full_outfit result, got {other:?}"),
    }
    // intent + rank + advice
    assert_eq!(llm.call_count(), 3);
}

#[tokio::test]
async fn test_no_garment_reused_across_outfits() {
    let catalog = Arc::new(FixtureCatalog::new(wardrobe("female")));
    let llm = Arc::new(ScriptedLlm::new(Some(FEMALE_OUTFIT_INTENT), None, None));

    let stylist = Stylist::new(catalog, llm);
    let result = stylist.recommend("outfits", false).await.unwrap();

    let RecommendationResult::FullOutfit { outfits, .. } = result else {
        panic!("expected full_outfit result");
    };
    let mut seen = HashSet::new();
    for scored in &outfits {
        for id in scored.outfit.garment_ids() {
            assert!(seen.insert(id.to_string()), "garment {id} appeared twice");
        }
    }
}

#[tokio::test]
async fn test_male_request_skips_dresses_entirely() {
    let catalog = Arc::new(FixtureCatalog::new(wardrobe("male")));
    let llm = Arc::new(ScriptedLlm::new(Some(MALE_OUTFIT_INTENT), None, None));

    let stylist = Stylist::new(catalog.clone(), llm);
    let result = stylist
        .recommend("recommend casual outfits for a man", false)
        .await
        .unwrap();

    // Retrieval never touched the dresses partition.
    let categories = catalog.queried_categories();
    assert!(categories.contains(&"upper_body".to_string()));
    assert!(categories.contains(&"lower_body".to_string()));
    assert!(!categories.contains(&"dresses".to_string()));

    let RecommendationResult::FullOutfit { outfits, .. } = result else {
        panic!("expected full_outfit result");
    };
    assert!(!outfits.is_empty());
    assert!(outfits
        .iter()
        .all(|o| matches!(o.outfit, OutfitCandidate::TwoPiece { .. })));
}

#[tokio::test]
async fn test_reasoning_opt_out_applies_neutral_defaults() {
    let catalog = Arc::new(FixtureCatalog::new(wardrobe("female")));
    let llm = Arc::new(ScriptedLlm::new(Some(FEMALE_OUTFIT_INTENT), None, None));

    let stylist = Stylist::new(catalog, llm.clone());
    let result = stylist.recommend("outfits", false).await.unwrap();

    let RecommendationResult::FullOutfit {
        outfits,
        stylist_advice,
        ..
    } = result
    else {
        panic!("expected full_outfit result");
    };
    assert!(outfits.iter().all(|o| o.score == 0.5 && o.reason.is_empty()));
    assert!(stylist_advice.is_none());
    // Only the intent-parse call went out.
    assert_eq!(llm.call_count(), 1);
}

#[tokio::test]
async fn test_empty_catalog_is_terminal_without_further_calls() {
    let catalog = Arc::new(FixtureCatalog::new(vec![]));
    let llm = Arc::new(ScriptedLlm::new(
        Some(FEMALE_OUTFIT_INTENT),
        Some("[]"),
        Some("unused"),
    ));

    let stylist = Stylist::new(catalog, llm.clone());
    let result = stylist.recommend("outfits", true).await.unwrap();

    let RecommendationResult::FullOutfit {
        num_outfits,
        outfits,
        stylist_advice,
        ..
    } = result
    else {
        panic!("expected full_outfit result");
    };
    assert_eq!(num_outfits, 0);
    assert!(outfits.is_empty());
    assert_eq!(stylist_advice.as_deref(), Some(NO_OUTFIT_ADVICE));
    // Intent parse only — no ranking or advice calls for a terminal result.
    assert_eq!(llm.call_count(), 1);
}

#[tokio::test]
async fn test_ranking_failure_preserves_generation_order() {
    let catalog = Arc::new(FixtureCatalog::new(wardrobe("female")));
    // Rank responds with garbage; advice still succeeds.
    let llm = Arc::new(ScriptedLlm::new(
        Some(FEMALE_OUTFIT_INTENT),
        Some("I cannot rank these."),
        Some("advice"),
    ));

    let stylist = Stylist::new(catalog, llm);
    let result = stylist.recommend("outfits", true).await.unwrap();

    let RecommendationResult::FullOutfit { outfits, .. } = result else {
        panic!("expected full_outfit result");
    };
    assert!(outfits.iter().all(|o| o.score == 0.5 && o.reason.is_empty()));
    // Generation order: two two-piece combos, then the first dress.
    assert!(matches!(outfits[0].outfit, OutfitCandidate::TwoPiece { .. }));
    assert!(matches!(outfits[1].outfit, OutfitCandidate::TwoPiece { .. }));
    assert!(matches!(outfits[2].outfit, OutfitCandidate::Dress { .. }));
}

#[tokio::test]
async fn test_intent_failure_falls_back_to_raw_query() {
    let catalog = Arc::new(FixtureCatalog::new(wardrobe("female")));
    // Every reasoning call fails.
    let llm = Arc::new(ScriptedLlm::new(None, None, None));

    let stylist = Stylist::new(catalog, llm);
    let result = stylist.recommend("something nice", true).await.unwrap();

    // Fallback intent is full-outfit with the raw query; ranking degrades to
    // neutral and advice to the placeholder — nothing surfaces as an error.
    let RecommendationResult::FullOutfit {
        parsed_intent,
        outfits,
        stylist_advice,
        ..
    } = result
    else {
        panic!("expected full_outfit result");
    };
    assert_eq!(parsed_intent.semantic_query, "something nice");
    assert!(outfits.iter().all(|o| o.score == 0.5));
    assert_eq!(stylist_advice.as_deref(), Some("(Stylist advice unavailable)"));
}

#[tokio::test]
async fn test_single_item_mode_filters_and_advises() {
    let mut garments = wardrobe("female");
    for g in &mut garments {
        if g.metadata.category.as_deref() == Some("upper_body") {
            g.metadata.garment_type = Some("t-shirt".to_string());
        }
    }
    let catalog = Arc::new(FixtureCatalog::new(garments));
    let llm = Arc::new(ScriptedLlm::new(
        Some(
            r#"{"language": "en", "recommendation_mode": "single_item", "count": 2,
                "garment_type": "t-shirt", "gender": "female",
                "semantic_query": "casual t-shirts"}"#,
        ),
        None,
        Some("Great versatile basics."),
    ));

    let stylist = Stylist::new(catalog.clone(), llm);
    let result = stylist.recommend("show me some t-shirts", true).await.unwrap();

    let RecommendationResult::SingleItem {
        num_results,
        recommendations,
        parsed_intent,
        stylist_advice,
        ..
    } = result
    else {
        panic!("expected single_item result");
    };
    assert_eq!(num_results, 2);
    assert!(recommendations
        .iter()
        .all(|r| r.garment_type.as_deref() == Some("t-shirt")));
    // Category inferred from the garment type.
    assert_eq!(parsed_intent.category.as_deref(), Some("upper_body"));
    assert_eq!(stylist_advice.as_deref(), Some("Great versatile basics."));

    // The catalog saw the full hard-filter set.
    let filters = catalog.queried_filters.lock().unwrap();
    assert_eq!(filters.len(), 1);
    assert_eq!(filters[0].category.as_deref(), Some("upper_body"));
    assert_eq!(filters[0].garment_type.as_deref(), Some("t-shirt"));
    assert_eq!(filters[0].gender.as_deref(), Some("female"));
}

#[tokio::test]
async fn test_image_resolver_decorates_records() {
    let catalog = Arc::new(FixtureCatalog::new(wardrobe("female")));
    let llm = Arc::new(ScriptedLlm::new(Some(FEMALE_OUTFIT_INTENT), None, None));

    let resolver = dataset_image_resolver(
        std::path::PathBuf::from("/data/DressCode"),
        "https://stylist.example.com/images".to_string(),
    );
    let stylist = Stylist::new(catalog, llm).with_image_resolver(resolver);
    let result = stylist.recommend("outfits", false).await.unwrap();

    let RecommendationResult::FullOutfit { outfits, .. } = result else {
        panic!("expected full_outfit result");
    };
    let OutfitCandidate::TwoPiece { top, .. } = &outfits[0].outfit else {
        panic!("expected two-piece first");
    };
    assert_eq!(
        top.image_url.as_deref(),
        Some("https://stylist.example.com/images/upper_body/images/t0.jpg")
    );
}

#[tokio::test]
async fn test_result_serializes_with_mode_discriminator() {
    let catalog = Arc::new(FixtureCatalog::new(wardrobe("female")));
    let llm = Arc::new(ScriptedLlm::new(Some(FEMALE_OUTFIT_INTENT), None, None));

    let stylist = Stylist::new(catalog, llm);
    let result = stylist.recommend("outfits", false).await.unwrap();

    let json = serde_json::to_value(&result).unwrap();
    assert_eq!(json["mode"], "full_outfit");
    assert!(json["num_outfits"].as_u64().unwrap() > 0);
    assert_eq!(json["outfits"][0]["score"], 0.5);
    assert!(json["outfits"][0]["type"].is_string());
    assert!(json.get("stylist_advice").is_none());
}
