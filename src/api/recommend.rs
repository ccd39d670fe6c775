use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;

use crate::models::{RecommendRequest, RecommendationResult};
use crate::state::AppState;

/// POST /api/recommend — full recommendation pipeline:
///   1. Intent parsing (one reasoning call, raw-query fallback)
///   2. Hybrid catalog retrieval (hard filters + soft semantic hints)
///   3. Full-outfit mode only: combination generation + batch ranking
///   4. Optional stylist advice synthesis
pub async fn recommend(
    State(state): State<AppState>,
    Json(req): Json<RecommendRequest>,
) -> Result<Json<RecommendationResult>, (StatusCode, String)> {
    let query = req.query.trim();
    if query.is_empty() {
        return Err((StatusCode::BAD_REQUEST, "Query is required".to_string()));
    }

    state
        .stylist
        .recommend(query, req.include_reasoning)
        .await
        .map(Json)
        .map_err(|e| {
            tracing::error!("Recommendation failed: {e:#}");
            (
                StatusCode::BAD_GATEWAY,
                format!("Recommendation failed: {e}"),
            )
        })
}

/// GET /api/health — liveness plus catalog size.
pub async fn health(State(state): State<AppState>) -> Json<serde_json::Value> {
    match state.catalog.count().await {
        Ok(total) => Json(serde_json::json!({
            "status": "ok",
            "total_garments": total,
        })),
        Err(e) => {
            tracing::warn!("Catalog unreachable: {e}");
            Json(serde_json::json!({ "status": "degraded" }))
        }
    }
}
