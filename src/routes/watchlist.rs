use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::{
    auth::CurrentUser,
    error::{AppError, AppResult},
    models::{MediaKind, WatchEntry, WatchStatus},
    services::enrich_entries,
    state::AppState,
    validation::{validate_watch_entry, FieldErrors, WatchEntryPayload},
};

/// Adds a media item to the caller's list or moves it between status
/// buckets. Upserts by the (user, media item, kind) key, so repeated
/// identical calls are idempotent.
pub async fn upsert(
    State(state): State<AppState>,
    CurrentUser(identity): CurrentUser,
    Json(payload): Json<WatchEntryPayload>,
) -> AppResult<Json<WatchEntry>> {
    let input = validate_watch_entry(&payload).map_err(AppError::Validation)?;

    let entry = WatchEntry::new(
        identity.user_id,
        input.media_id,
        input.media_kind,
        input.status,
    );
    let stored = state.store.upsert_watch_entry(&entry).await?;

    tracing::info!(
        media_id = input.media_id,
        kind = input.media_kind.as_str(),
        status = input.status.as_str(),
        pseudo = %identity.pseudo,
        "List entry upserted"
    );

    Ok(Json(stored))
}

/// Removes a list entry. Deleting an absent entry succeeds: the operation
/// is an idempotent delete, not a lookup.
pub async fn remove(
    State(state): State<AppState>,
    CurrentUser(identity): CurrentUser,
    Path((kind, media_id)): Path<(String, i64)>,
) -> AppResult<Json<Value>> {
    let mut fields = FieldErrors::new();

    let media_kind = match MediaKind::parse(&kind) {
        Some(kind) => kind,
        None => {
            fields.set("mediaKind", "INVALID_MEDIA_KIND");
            MediaKind::Movie
        }
    };
    if media_id <= 0 {
        fields.set("mediaId", "INVALID_MEDIA_ID");
    }
    if !fields.is_empty() {
        return Err(AppError::Validation(fields));
    }

    state
        .store
        .delete_watch_entry(identity.user_id, media_id, media_kind)
        .await?;

    Ok(Json(json!({ "ok": true })))
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    status: Option<String>,
}

/// Lists the caller's entries in one status bucket, each enriched with
/// catalog metadata. Enrichment failures degrade single items to
/// placeholders; the list itself always renders.
pub async fn list(
    State(state): State<AppState>,
    CurrentUser(identity): CurrentUser,
    Query(params): Query<ListQuery>,
) -> AppResult<Json<Value>> {
    let status = match WatchStatus::parse(params.status.as_deref().unwrap_or_default()) {
        Some(status) => status,
        None => {
            let mut fields = FieldErrors::new();
            fields.set("status", "INVALID_STATUS");
            return Err(AppError::Validation(fields));
        }
    };

    let entries = state
        .store
        .list_watch_entries(identity.user_id, status)
        .await?;
    let items = enrich_entries(state.metadata.clone(), entries).await;

    Ok(Json(json!({ "items": items })))
}
