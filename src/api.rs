use axum::Router;
use axum::extract::{Path, Query, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Json, Response};
use axum::routing::{get, post};
use serde::Deserialize;

use crate::error::AppError;
use crate::source::ChapterSource;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/catalog", get(catalog))
        .route("/catalog/refresh", post(refresh_catalog))
        .route("/chapter", get(chapter))
        .route("/chapter/next", get(next_chapter))
        .route("/raw/{*path}", get(raw_chapter))
}

#[derive(Debug, Deserialize)]
pub struct CatalogParams {
    #[serde(default)]
    pub q: String,
}

#[derive(Debug, Deserialize)]
pub struct ChapterParams {
    pub path: String,
}

#[derive(Debug, Deserialize)]
pub struct NextParams {
    pub after: String,
}

/// GET /api/catalog?q=: chapters grouped by folder, in reading order.
pub async fn catalog(
    State(state): State<AppState>,
    Query(params): Query<CatalogParams>,
) -> Json<serde_json::Value> {
    let catalog = state.library.catalog().await;
    let groups = catalog.groups(&params.q);
    Json(serde_json::json!({
        "total": catalog.len(),
        "groups": groups,
    }))
}

/// POST /api/catalog/refresh: re-list the source. With
/// `reader.prefetch_titles` set, titles of new chapters are fetched
/// before responding.
pub async fn refresh_catalog(
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>, AppError> {
    let chapters = state.library.refresh().await?;
    let reader = &state.config.reader;
    if !reader.prefetch_titles {
        return Ok(Json(serde_json::json!({ "chapters": chapters })));
    }
    let prefetch = state
        .library
        .prefetch_titles(reader.prefetch_concurrency)
        .await;
    Ok(Json(serde_json::json!({
        "chapters": chapters,
        "prefetch": prefetch,
    })))
}

/// GET /api/chapter?path=: fetch and render one chapter.
pub async fn chapter(
    State(state): State<AppState>,
    Query(params): Query<ChapterParams>,
) -> Result<Response, AppError> {
    if params.path.is_empty() {
        return Err(AppError::BadRequest("missing chapter path".to_string()));
    }
    let chapter = state.library.load_chapter(&params.path).await?;
    Ok(Json(chapter).into_response())
}

/// GET /api/chapter/next?after=: the chapter following `after`, or
/// 204 at the end of the catalog.
pub async fn next_chapter(
    State(state): State<AppState>,
    Query(params): Query<NextParams>,
) -> Result<Response, AppError> {
    match state.library.next_chapter(&params.after).await? {
        Some(chapter) => Ok(Json(chapter).into_response()),
        None => Ok(StatusCode::NO_CONTENT.into_response()),
    }
}

/// GET /api/raw/{*path}: raw Markdown of a catalog chapter, proxied
/// from the source.
pub async fn raw_chapter(
    State(state): State<AppState>,
    Path(path): Path<String>,
) -> Result<Response, AppError> {
    if !state.library.catalog().await.contains(&path) {
        return Err(AppError::NotFound(path));
    }
    let text = state.library.source().fetch(&path).await?;
    Ok((
        [(header::CONTENT_TYPE, "text/markdown; charset=utf-8")],
        text,
    )
        .into_response())
}
