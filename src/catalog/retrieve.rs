//! Hybrid retrieval: hard metadata filters exclude records, soft hints bias
//! the semantic query text instead. Strict filtering on style or color would
//! risk empty result sets, so those dimensions only steer similarity ranking.

use std::collections::HashMap;

use anyhow::Result;
use futures_util::future::join_all;

use crate::catalog::{CatalogHit, GarmentCatalog, HardFilters};
use crate::models::{GarmentRecord, Intent};

/// Preference dimensions folded into the query text rather than used to
/// exclude records.
#[derive(Debug, Clone, Default)]
pub struct SoftHints {
    pub style: Option<String>,
    pub season: Option<String>,
    pub occasion: Option<String>,
    pub body_type: Option<String>,
    pub color: Option<String>,
}

impl SoftHints {
    pub fn from_intent(intent: &Intent) -> Self {
        Self {
            style: intent.style.clone(),
            season: intent.season.clone(),
            occasion: intent.occasion.clone(),
            body_type: intent.body_type.clone(),
            color: intent.color.clone(),
        }
    }
}

/// Append soft hints to the semantic query as natural-language fragments.
pub fn augment_query(query: &str, hints: &SoftHints) -> String {
    let mut enhanced = query.to_string();
    if let Some(style) = &hints.style {
        enhanced.push_str(&format!(" {style} style"));
    }
    if let Some(season) = &hints.season {
        enhanced.push_str(&format!(" {season}"));
    }
    if let Some(occasion) = &hints.occasion {
        enhanced.push_str(&format!(" {occasion}"));
    }
    if let Some(body_type) = &hints.body_type {
        enhanced.push_str(&format!(" suitable for {body_type} body type"));
    }
    if let Some(color) = &hints.color {
        enhanced.push_str(&format!(" {color} color"));
    }
    enhanced
}

fn split_csv(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

fn to_record(hit: CatalogHit) -> GarmentRecord {
    GarmentRecord {
        garment_id: hit.garment_id,
        description: hit.document,
        similarity_score: 1.0 - hit.distance,
        category: hit.metadata.category,
        garment_type: hit.metadata.garment_type,
        colors: split_csv(&hit.metadata.colors),
        styles: split_csv(&hit.metadata.styles),
        occasions: split_csv(&hit.metadata.occasions),
        image_path: hit.path,
        image_url: None,
    }
}

/// Hybrid search over one category partition: semantic query + soft hints,
/// hard filters AND-combined. Records come back ordered by descending
/// similarity.
pub async fn search(
    catalog: &dyn GarmentCatalog,
    query: &str,
    filters: &HardFilters,
    hints: &SoftHints,
    limit: usize,
) -> Result<Vec<GarmentRecord>> {
    let enhanced = augment_query(query, hints);
    let hits = catalog.query(&enhanced, filters, limit).await?;

    let mut records: Vec<GarmentRecord> = hits.into_iter().map(to_record).collect();
    // The catalog contract is ascending distance; enforce it anyway so
    // downstream ordering never depends on collaborator behavior.
    records.sort_by(|a, b| {
        b.similarity_score
            .partial_cmp(&a.similarity_score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    Ok(records)
}

/// Query each category independently and concurrently. The partitions are
/// disjoint and read-only, so there is no ordering dependency between them.
pub async fn search_multi_category(
    catalog: &dyn GarmentCatalog,
    query: &str,
    categories: &[&str],
    limit_per_category: usize,
    gender: Option<&str>,
    hints: &SoftHints,
) -> Result<HashMap<String, Vec<GarmentRecord>>> {
    let searches = categories.iter().map(|category| {
        let filters = HardFilters {
            category: Some(category.to_string()),
            gender: gender.map(String::from),
            garment_type: None,
        };
        async move {
            let records = search(catalog, query, &filters, hints, limit_per_category).await?;
            Ok::<_, anyhow::Error>((category.to_string(), records))
        }
    });

    let mut results = HashMap::new();
    for outcome in join_all(searches).await {
        let (category, records) = outcome?;
        results.insert(category, records);
    }
    Ok(results)
}
