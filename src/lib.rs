//! # stylist-search
//!
//! A garment and outfit recommendation service: natural-language fashion
//! requests are matched against a garment catalog with hybrid retrieval and
//! ranked by an LLM.
//!
//! ## Pipeline
//!
//! ```text
//! query ──► Intent Parser (1 LLM call, raw-query fallback)
//!             │
//!             ├─ single_item ──► Hybrid Retrieval ──► advice? ──► result
//!             │
//!             └─ full_outfit ──► Multi-category Retrieval (concurrent)
//!                                  │
//!                                  ▼
//!                            Combination Generator (greedy, no garment reuse)
//!                                  │
//!                                  ▼
//!                            Batch Ranker (1 LLM call, neutral fallback)
//!                                  │
//!                                  ▼
//!                            top-N + advice? ──► result
//! ```
//!
//! ## Module Overview
//!
//! - [`config`] - Environment-based configuration for server, catalog, and LLM settings
//! - [`models`] - Shared data types: `Intent`, `GarmentRecord`, `OutfitCandidate`, result types
//! - [`catalog`] - Catalog capability trait, Chroma client, and hybrid retrieval
//! - [`llm`] - Reasoning client, fenced-JSON parsing, intent parsing, batch ranking, advice
//! - [`outfit`] - Non-overlapping outfit candidate generation
//! - [`recommend`] - The orchestrator tying the pipeline together
//! - [`api`] - Axum HTTP handlers for recommendation and health
//! - [`state`] - Shared application state wiring the collaborators

pub mod api;
pub mod catalog;
pub mod config;
pub mod llm;
pub mod models;
pub mod outfit;
pub mod recommend;
pub mod state;
