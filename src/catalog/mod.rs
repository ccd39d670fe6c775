//! Garment catalog collaborator. The vector store itself (indexing,
//! embedding persistence) lives behind the [`GarmentCatalog`] capability;
//! this crate only consumes ranked query results.

pub mod chroma;
pub mod retrieve;

use anyhow::Result;
use async_trait::async_trait;
use serde::Deserialize;

/// Exact-match metadata constraints, AND-combined when more than one is
/// present.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HardFilters {
    pub category: Option<String>,
    pub gender: Option<String>,
    pub garment_type: Option<String>,
}

impl HardFilters {
    pub fn is_empty(&self) -> bool {
        self.category.is_none() && self.gender.is_none() && self.garment_type.is_none()
    }
}

/// Garment metadata as stored in the catalog. List-valued attributes are
/// comma-separated strings (the store only supports scalar metadata).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GarmentMetadata {
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub garment_type: Option<String>,
    #[serde(default)]
    pub colors: String,
    #[serde(default)]
    pub styles: String,
    #[serde(default)]
    pub seasons: String,
    #[serde(default)]
    pub occasions: String,
    #[serde(default)]
    pub body_types: String,
    #[serde(default)]
    pub relative_path: String,
}

/// One ranked result from the catalog, ascending by distance.
#[derive(Debug, Clone)]
pub struct CatalogHit {
    pub garment_id: String,
    pub distance: f32,
    pub document: String,
    pub metadata: GarmentMetadata,
    /// Storage path of the garment image, already resolved against the
    /// dataset root.
    pub path: String,
}

#[async_trait]
pub trait GarmentCatalog: Send + Sync {
    /// Query the catalog with semantic text plus hard metadata filters,
    /// returning at most `limit` hits ranked by ascending distance.
    async fn query(&self, text: &str, filters: &HardFilters, limit: usize)
        -> Result<Vec<CatalogHit>>;

    /// Total garments in the catalog.
    async fn count(&self) -> Result<usize>;
}
