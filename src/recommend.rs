//! Recommendation orchestrator: parse intent, branch by mode, retrieve,
//! combine, rank, assemble. Every externally-caused failure degrades
//! gracefully; only catalog errors are fatal to the request.
//!
//! Each request issues a bounded number of reasoning calls: exactly one
//! intent parse, at most one batch rank, at most one advice synthesis.

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Result;

use crate::catalog::retrieve::{self, SoftHints};
use crate::catalog::{GarmentCatalog, HardFilters};
use crate::llm::advice::{outfit_advice, single_item_advice};
use crate::llm::client::ReasoningClient;
use crate::llm::intent::parse_intent;
use crate::llm::rank::{neutral_scores, rank_outfits};
use crate::models::{
    GarmentRecord, Intent, RecommendMode, RecommendationResult, ScoredOutfit,
};
use crate::outfit::{generate_combinations, DEFAULT_MAX_COMBOS};

pub const LIMIT_PER_CATEGORY: usize = 5;
pub const NO_OUTFIT_ADVICE: &str = "No matching outfits found.";
const ADVICE_UNAVAILABLE: &str = "(Stylist advice unavailable)";

/// Best-effort mapping from a raw storage path to a public URL. Absence means
/// results simply carry no image_url.
pub type ImageUrlResolver = Arc<dyn Fn(&str) -> Option<String> + Send + Sync>;

pub struct Stylist {
    catalog: Arc<dyn GarmentCatalog>,
    llm: Arc<dyn ReasoningClient>,
    image_url: Option<ImageUrlResolver>,
}

impl Stylist {
    pub fn new(catalog: Arc<dyn GarmentCatalog>, llm: Arc<dyn ReasoningClient>) -> Self {
        Self {
            catalog,
            llm,
            image_url: None,
        }
    }

    pub fn with_image_resolver(mut self, resolver: ImageUrlResolver) -> Self {
        self.image_url = Some(resolver);
        self
    }

    /// Recommend garments or outfits for a free-text request. The mode is
    /// detected from the query; `include_reasoning` toggles ranking and
    /// advice synthesis (off means neutral scores and no advice).
    pub async fn recommend(
        &self,
        query: &str,
        include_reasoning: bool,
    ) -> Result<RecommendationResult> {
        let intent = parse_intent(self.llm.as_ref(), query).await;
        tracing::info!(
            mode = ?intent.mode,
            count = intent.count,
            "Parsed recommendation intent"
        );

        match intent.mode {
            RecommendMode::SingleItem => {
                self.recommend_single_items(query, intent, include_reasoning)
                    .await
            }
            RecommendMode::FullOutfit => {
                self.recommend_full_outfits(query, intent, include_reasoning)
                    .await
            }
        }
    }

    async fn recommend_single_items(
        &self,
        query: &str,
        intent: Intent,
        include_reasoning: bool,
    ) -> Result<RecommendationResult> {
        let filters = HardFilters {
            category: intent.category.clone(),
            gender: intent.gender.clone(),
            garment_type: intent.garment_type.clone(),
        };
        let hints = SoftHints::from_intent(&intent);

        let mut recommendations = retrieve::search(
            self.catalog.as_ref(),
            &intent.semantic_query,
            &filters,
            &hints,
            intent.count,
        )
        .await?;
        for record in &mut recommendations {
            self.decorate(record);
        }

        let stylist_advice = if include_reasoning && !recommendations.is_empty() {
            match single_item_advice(self.llm.as_ref(), &recommendations, query, intent.language)
                .await
            {
                Ok(advice) => Some(advice),
                Err(e) => {
                    tracing::warn!("Single-item advice failed: {e}");
                    Some(ADVICE_UNAVAILABLE.to_string())
                }
            }
        } else {
            None
        };

        Ok(RecommendationResult::SingleItem {
            query: query.to_string(),
            num_results: recommendations.len(),
            recommendations,
            parsed_intent: intent,
            stylist_advice,
        })
    }

    async fn recommend_full_outfits(
        &self,
        query: &str,
        intent: Intent,
        include_reasoning: bool,
    ) -> Result<RecommendationResult> {
        // Dresses only enter the candidate pool for non-male requests.
        let categories: &[&str] = if intent.gender.as_deref() == Some("male") {
            &["upper_body", "lower_body"]
        } else {
            &["upper_body", "lower_body", "dresses"]
        };
        let hints = SoftHints::from_intent(&intent);

        let mut multi_results = retrieve::search_multi_category(
            self.catalog.as_ref(),
            &intent.semantic_query,
            categories,
            LIMIT_PER_CATEGORY,
            intent.gender.as_deref(),
            &hints,
        )
        .await?;
        for records in multi_results.values_mut() {
            for record in records {
                self.decorate(record);
            }
        }

        let candidates = generate_combinations(
            &multi_results,
            intent.gender.as_deref(),
            DEFAULT_MAX_COMBOS,
        );

        if candidates.is_empty() {
            // Terminal: no further external calls.
            return Ok(RecommendationResult::FullOutfit {
                query: query.to_string(),
                parsed_intent: intent,
                num_outfits: 0,
                outfits: vec![],
                stylist_advice: Some(NO_OUTFIT_ADVICE.to_string()),
            });
        }

        let mut outfits: Vec<ScoredOutfit> = if include_reasoning {
            rank_outfits(self.llm.as_ref(), candidates, query, intent.language).await
        } else {
            neutral_scores(candidates)
        };
        outfits.truncate(intent.count);

        let stylist_advice = if include_reasoning {
            match outfit_advice(self.llm.as_ref(), &outfits, query, intent.language).await {
                Ok(advice) => Some(advice),
                Err(e) => {
                    tracing::warn!("Outfit advice failed: {e}");
                    Some(ADVICE_UNAVAILABLE.to_string())
                }
            }
        } else {
            None
        };

        Ok(RecommendationResult::FullOutfit {
            query: query.to_string(),
            num_outfits: outfits.len(),
            outfits,
            parsed_intent: intent,
            stylist_advice,
        })
    }

    fn decorate(&self, record: &mut GarmentRecord) {
        if let Some(resolver) = &self.image_url {
            record.image_url = resolver(&record.image_path);
        }
    }
}

/// Build a resolver that rewrites dataset paths to public image URLs.
/// Paths outside the dataset root resolve to nothing.
pub fn dataset_image_resolver(
    dataset_root: std::path::PathBuf,
    base_url: String,
) -> ImageUrlResolver {
    let base_url = base_url.trim_end_matches('/').to_string();
    Arc::new(move |path: &str| {
        let relative = std::path::Path::new(path)
            .strip_prefix(&dataset_root)
            .ok()?;
        let relative = relative.to_str()?;
        Some(format!("{base_url}/{relative}"))
    })
}
