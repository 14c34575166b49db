//! # ヘルスチェックハンドラ

use axum::Json;
use meibo_shared::HealthResponse;

/// `GET /health` - 稼働状態とバージョンを返す
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status:  "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
