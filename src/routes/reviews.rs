use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::{
    auth::CurrentUser,
    error::{AppError, AppResult},
    models::Review,
    state::AppState,
    validation::{validate_review, FieldErrors, ReviewPayload},
};

/// Creates the caller's review for a media item.
///
/// The author's pseudo and avatar are snapshotted at write time. A second
/// submission for the same item is 409, never an overwrite.
pub async fn create(
    State(state): State<AppState>,
    CurrentUser(identity): CurrentUser,
    Json(payload): Json<ReviewPayload>,
) -> AppResult<(StatusCode, Json<Review>)> {
    let input = validate_review(&payload).map_err(AppError::Validation)?;

    let review = Review::new(input.media_id, &identity, input.rating, input.comment);
    state.store.insert_review(&review).await?;

    tracing::info!(
        media_id = input.media_id,
        pseudo = %identity.pseudo,
        "Review created"
    );

    Ok((StatusCode::CREATED, Json(review)))
}

/// Returns the caller's review for a media item, or `null`.
///
/// Absence of a review is a valid outcome, not an error.
pub async fn mine(
    State(state): State<AppState>,
    CurrentUser(identity): CurrentUser,
    Path(media_id): Path<i64>,
) -> AppResult<Json<Option<Review>>> {
    if media_id <= 0 {
        let mut fields = FieldErrors::new();
        fields.set("movieId", "INVALID_MEDIA_ID");
        return Err(AppError::Validation(fields));
    }

    let review = state.store.find_review(media_id, identity.user_id).await?;
    Ok(Json(review))
}
