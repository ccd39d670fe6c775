//! Chroma-backed catalog. The Chroma HTTP API takes raw query embeddings, so
//! query text is embedded via the configured sidecar first. The collection id
//! is resolved by name once and cached for the process lifetime.

use std::path::PathBuf;

use anyhow::{Context, Result};
use async_trait::async_trait;
use parking_lot::RwLock;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::catalog::{CatalogHit, GarmentCatalog, GarmentMetadata, HardFilters};
use crate::config::{CatalogConfig, LlmConfig};
use crate::llm::embeddings::embed_query;

pub struct ChromaCatalog {
    http: reqwest::Client,
    base_url: String,
    collection: String,
    dataset_root: PathBuf,
    embedding: LlmConfig,
    collection_id: RwLock<Option<String>>,
}

impl ChromaCatalog {
    pub fn new(http: reqwest::Client, catalog: &CatalogConfig, embedding: &LlmConfig) -> Self {
        Self {
            http,
            base_url: catalog.chroma_url.trim_end_matches('/').to_string(),
            collection: catalog.collection.clone(),
            dataset_root: catalog.dataset_root.clone(),
            embedding: embedding.clone(),
            collection_id: RwLock::new(None),
        }
    }

    async fn collection_id(&self) -> Result<String> {
        if let Some(id) = self.collection_id.read().clone() {
            return Ok(id);
        }

        let url = format!("{}/api/v1/collections/{}", self.base_url, self.collection);
        let resp = self
            .http
            .get(&url)
            .send()
            .await
            .context("Failed to resolve Chroma collection")?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            anyhow::bail!("Chroma collection lookup returned {status}: {body}");
        }

        let collection: CollectionResponse = resp
            .json()
            .await
            .context("Failed to parse Chroma collection response")?;

        *self.collection_id.write() = Some(collection.id.clone());
        Ok(collection.id)
    }

    fn image_path(&self, metadata: &GarmentMetadata) -> String {
        self.dataset_root
            .join(&metadata.relative_path)
            .to_string_lossy()
            .into_owned()
    }
}

/// Build the Chroma `where` clause: a single filter maps directly, multiple
/// filters are AND-combined.
fn build_where(filters: &HardFilters) -> Option<Value> {
    let mut clauses = Vec::new();
    if let Some(category) = &filters.category {
        clauses.push(json!({ "category": category }));
    }
    if let Some(gender) = &filters.gender {
        clauses.push(json!({ "gender": gender }));
    }
    if let Some(garment_type) = &filters.garment_type {
        clauses.push(json!({ "garment_type": garment_type }));
    }

    match clauses.len() {
        0 => None,
        1 => clauses.pop(),
        _ => Some(json!({ "$and": clauses })),
    }
}

#[derive(Deserialize)]
struct CollectionResponse {
    id: String,
}

#[derive(Deserialize)]
struct QueryResponse {
    ids: Vec<Vec<String>>,
    #[serde(default)]
    distances: Option<Vec<Vec<f32>>>,
    #[serde(default)]
    documents: Option<Vec<Vec<String>>>,
    #[serde(default)]
    metadatas: Option<Vec<Vec<GarmentMetadata>>>,
}

#[async_trait]
impl GarmentCatalog for ChromaCatalog {
    async fn query(
        &self,
        text: &str,
        filters: &HardFilters,
        limit: usize,
    ) -> Result<Vec<CatalogHit>> {
        let collection_id = self.collection_id().await?;
        let embedding = embed_query(&self.http, &self.embedding, text).await?;

        let mut body = json!({
            "query_embeddings": [embedding],
            "n_results": limit,
            "include": ["documents", "metadatas", "distances"],
        });
        if let Some(where_clause) = build_where(filters) {
            body["where"] = where_clause;
        }

        let url = format!(
            "{}/api/v1/collections/{collection_id}/query",
            self.base_url
        );
        let resp = self
            .http
            .post(&url)
            .json(&body)
            .send()
            .await
            .context("Failed to query Chroma")?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            anyhow::bail!("Chroma query returned {status}: {body}");
        }

        let results: QueryResponse = resp
            .json()
            .await
            .context("Failed to parse Chroma query response")?;

        let ids = results.ids.into_iter().next().unwrap_or_default();
        let distances = results
            .distances
            .and_then(|d| d.into_iter().next())
            .unwrap_or_default();
        let documents = results
            .documents
            .and_then(|d| d.into_iter().next())
            .unwrap_or_default();
        let metadatas = results
            .metadatas
            .and_then(|m| m.into_iter().next())
            .unwrap_or_default();

        let hits = ids
            .into_iter()
            .enumerate()
            .map(|(i, garment_id)| {
                let metadata = metadatas.get(i).cloned().unwrap_or_default();
                let path = self.image_path(&metadata);
                CatalogHit {
                    garment_id,
                    distance: distances.get(i).copied().unwrap_or(0.0),
                    document: documents.get(i).cloned().unwrap_or_default(),
                    metadata,
                    path,
                }
            })
            .collect();

        Ok(hits)
    }

    async fn count(&self) -> Result<usize> {
        let collection_id = self.collection_id().await?;
        let url = format!(
            "{}/api/v1/collections/{collection_id}/count",
            self.base_url
        );
        let resp = self
            .http
            .get(&url)
            .send()
            .await
            .context("Failed to count Chroma collection")?;

        if !resp.status().is_success() {
            anyhow::bail!("Chroma count returned {}", resp.status());
        }

        Ok(resp.json().await.context("Failed to parse Chroma count")?)
    }
}
