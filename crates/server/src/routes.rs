use axum::{
    extract::{rejection::PathRejection, Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use prometheus::{Encoder, TextEncoder};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use common::types::{Health, LikesEnvelope};
use service::likes::ArticleId;

use crate::errors::ApiError;
use crate::state::AppState;

pub async fn health() -> Json<Health> {
    Json(Health { status: "ok" })
}

pub async fn metrics() -> (StatusCode, String) {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        return (StatusCode::INTERNAL_SERVER_ERROR, format!("metrics encode error: {e}"));
    }
    (StatusCode::OK, String::from_utf8(buffer).unwrap_or_default())
}

fn article_id(path: Result<Path<String>, PathRejection>) -> Result<ArticleId, ApiError> {
    let Path(raw_id) = path.map_err(|e| ApiError::new(StatusCode::BAD_REQUEST, format!("invalid news id: {e}")))?;
    Ok(ArticleId::parse(&raw_id)?)
}

/// 查询文章点赞数
pub async fn get_likes(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
) -> Result<Json<LikesEnvelope>, ApiError> {
    let id = article_id(path)?;
    let counted = state.likes.get_likes(&id).await;
    Ok(Json(LikesEnvelope::ok(id.to_string(), counted.likes)))
}

/// 点赞：返回自增后的点赞数
pub async fn like(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
) -> Result<Json<LikesEnvelope>, ApiError> {
    let id = article_id(path)?;
    let counted = state.likes.increment_likes(&id).await?;
    Ok(Json(LikesEnvelope::ok(id.to_string(), counted.likes)))
}

/// Build the full application router
pub fn build_router(state: AppState, cors: CorsLayer) -> Router {
    let api = Router::new()
        .route("/api/news/:id/likes", get(get_likes))
        .route("/api/news/:id/like", post(like));

    Router::new()
        .route("/health", get(health))
        .route("/metrics", get(metrics))
        .merge(api)
        .with_state(state)
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                // 每次请求创建 span，包含方法和路径等，日志级别为 INFO
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO).include_headers(false))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                // 响应返回时打点，包含状态码与耗时
                .on_response(DefaultOnResponse::new().level(Level::INFO).include_headers(false))
                // 失败（5xx 等）时以 ERROR 记录
                .on_failure(DefaultOnFailure::new().level(Level::ERROR)),
        )
}
