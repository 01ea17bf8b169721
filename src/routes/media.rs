use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;

use crate::{
    error::{AppError, AppResult},
    models::{GenreCatalog, MediaKind, MediaSummary},
    state::AppState,
    validation::FieldErrors,
};

/// Movie and TV genre lists from the catalog, with the fetch timestamp
pub async fn genres(State(state): State<AppState>) -> AppResult<Json<GenreCatalog>> {
    let catalog = state.metadata.genres().await?;
    Ok(Json(catalog))
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    q: Option<String>,
    #[serde(default)]
    kind: Option<String>,
}

/// Catalog title search
pub async fn search(
    State(state): State<AppState>,
    Query(params): Query<SearchQuery>,
) -> AppResult<Json<Vec<MediaSummary>>> {
    let mut fields = FieldErrors::new();

    let query = params.q.as_deref().unwrap_or_default().trim().to_string();
    if query.is_empty() {
        fields.set("q", "REQUIRED");
    }

    let media_kind = match MediaKind::parse(params.kind.as_deref().unwrap_or("movie")) {
        Some(kind) => kind,
        None => {
            fields.set("kind", "INVALID_MEDIA_KIND");
            MediaKind::Movie
        }
    };

    if !fields.is_empty() {
        return Err(AppError::Validation(fields));
    }

    let results = state.metadata.search(media_kind, &query).await?;
    Ok(Json(results))
}

/// Normalized catalog details for one media item
pub async fn details(
    State(state): State<AppState>,
    Path((kind, media_id)): Path<(String, i64)>,
) -> AppResult<Json<MediaSummary>> {
    let mut fields = FieldErrors::new();

    let media_kind = match MediaKind::parse(&kind) {
        Some(kind) => kind,
        None => {
            fields.set("kind", "INVALID_MEDIA_KIND");
            MediaKind::Movie
        }
    };
    if media_id <= 0 {
        fields.set("mediaId", "INVALID_MEDIA_ID");
    }
    if !fields.is_empty() {
        return Err(AppError::Validation(fields));
    }

    let summary = state.metadata.media_summary(media_kind, media_id).await?;
    Ok(Json(summary))
}
