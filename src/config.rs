use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Server bind address
    pub bind_addr: String,
    /// Reasoning provider configuration
    pub llm: LlmConfig,
    /// Garment catalog (vector store) configuration
    pub catalog: CatalogConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// "anthropic" or "openai"
    pub provider: String,
    /// Full URL of the chat-completion endpoint
    pub endpoint: String,
    /// Model name for intent parsing, ranking, and advice
    pub model: String,
    /// API key (optional when the endpoint is a local gateway)
    pub api_key: Option<String>,
    /// "ollama" or "openai" — the embedding sidecar used for catalog queries
    pub embedding_provider: String,
    /// Base URL for the embedding API
    pub embedding_base_url: String,
    /// Model name for embeddings
    pub embedding_model: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Base URL of the Chroma server
    pub chroma_url: String,
    /// Collection holding the garment records
    pub collection: String,
    /// Dataset root used to resolve garment image paths
    pub dataset_root: PathBuf,
    /// Public base URL for serving garment images. When unset, results carry
    /// no image_url field.
    pub image_base_url: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:8080".to_string(),
            llm: LlmConfig::default(),
            catalog: CatalogConfig::default(),
        }
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: "anthropic".to_string(),
            endpoint: "http://localhost:23333/api/anthropic/v1/messages".to_string(),
            model: "claude-3-5-haiku-20241022".to_string(),
            api_key: None,
            embedding_provider: "ollama".to_string(),
            embedding_base_url: "http://localhost:11434".to_string(),
            embedding_model: "nomic-embed-text".to_string(),
        }
    }
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            chroma_url: "http://localhost:8000".to_string(),
            collection: "dresscode_garments".to_string(),
            dataset_root: PathBuf::from("/data/DressCode"),
            image_base_url: None,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(addr) = std::env::var("STYLIST_BIND_ADDR") {
            config.bind_addr = addr;
        }
        if let Ok(provider) = std::env::var("LLM_PROVIDER") {
            config.llm.provider = provider;
        }
        if let Ok(endpoint) = std::env::var("LLM_API_ENDPOINT") {
            config.llm.endpoint = endpoint;
        }
        if let Ok(model) = std::env::var("LLM_MODEL") {
            config.llm.model = model;
        }
        if let Ok(key) = std::env::var("LLM_API_KEY") {
            config.llm.api_key = Some(key);
        }
        if let Ok(provider) = std::env::var("EMBEDDING_PROVIDER") {
            config.llm.embedding_provider = provider;
        }
        if let Ok(url) = std::env::var("EMBEDDING_BASE_URL") {
            config.llm.embedding_base_url = url;
        }
        if let Ok(model) = std::env::var("EMBEDDING_MODEL") {
            config.llm.embedding_model = model;
        }
        if let Ok(url) = std::env::var("CHROMA_URL") {
            config.catalog.chroma_url = url;
        }
        if let Ok(name) = std::env::var("CHROMA_COLLECTION") {
            config.catalog.collection = name;
        }
        if let Ok(root) = std::env::var("DRESSCODE_ROOT") {
            config.catalog.dataset_root = PathBuf::from(root);
        }
        if let Ok(url) = std::env::var("IMAGE_BASE_URL") {
            config.catalog.image_base_url = Some(url);
        }

        config
    }
}
