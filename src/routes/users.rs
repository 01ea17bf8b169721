use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::{
    auth::CurrentUser,
    error::{AppError, AppResult},
    models::{FollowedUser, UserProfile},
    state::AppState,
    validation::{validate_follow, FieldErrors, FollowPayload},
};

/// Public directory of all identities, sorted by like count descending.
/// The sort is a display concern computed per read.
pub async fn list(
    State(state): State<AppState>,
    CurrentUser(_identity): CurrentUser,
) -> AppResult<Json<Value>> {
    let users = state.store.list_public_users().await?;
    Ok(Json(json!({ "users": users })))
}

/// The caller's own profile projection
pub async fn me(
    State(state): State<AppState>,
    CurrentUser(identity): CurrentUser,
) -> AppResult<Json<UserProfile>> {
    let user = state
        .store
        .find_user_by_id(identity.user_id)
        .await?
        .ok_or(AppError::NotFound("USER_NOT_FOUND"))?;

    Ok(Json(UserProfile::from(user)))
}

/// Adds the target identity to the caller's following set
pub async fn follow(
    State(state): State<AppState>,
    CurrentUser(identity): CurrentUser,
    Json(payload): Json<FollowPayload>,
) -> AppResult<Json<Value>> {
    let target = resolve_follow_target(&state, &identity.pseudo, &payload).await?;

    state.store.add_following(identity.user_id, target).await?;

    tracing::info!(pseudo = %identity.pseudo, "Follow added");

    Ok(Json(json!({ "ok": true })))
}

/// Removes the target identity from the caller's following set
pub async fn unfollow(
    State(state): State<AppState>,
    CurrentUser(identity): CurrentUser,
    Json(payload): Json<FollowPayload>,
) -> AppResult<Json<Value>> {
    let target = resolve_follow_target(&state, &identity.pseudo, &payload).await?;

    state
        .store
        .remove_following(identity.user_id, target)
        .await?;

    tracing::info!(pseudo = %identity.pseudo, "Follow removed");

    Ok(Json(json!({ "ok": true })))
}

/// The caller's following set projected to `{pseudo, avatar, _id}` tuples.
/// An empty set is an empty array, not an error.
pub async fn following(
    State(state): State<AppState>,
    CurrentUser(identity): CurrentUser,
) -> AppResult<Json<Vec<FollowedUser>>> {
    state
        .store
        .find_user_by_id(identity.user_id)
        .await?
        .ok_or(AppError::NotFound("USER_NOT_FOUND"))?;

    let followed = state.store.following_of(identity.user_id).await?;
    Ok(Json(followed))
}

/// Count of identities following the caller, computed on read
pub async fn followers(
    State(state): State<AppState>,
    CurrentUser(identity): CurrentUser,
) -> AppResult<Json<Value>> {
    let count = state.store.followers_count(identity.user_id).await?;
    Ok(Json(json!({ "count": count })))
}

/// Validates the follow payload and resolves the target handle.
///
/// Self-follow is a validation error, not a silent no-op; an unknown
/// handle is 404.
async fn resolve_follow_target(
    state: &AppState,
    caller_pseudo: &str,
    payload: &FollowPayload,
) -> AppResult<uuid::Uuid> {
    let pseudo = validate_follow(payload).map_err(AppError::Validation)?;

    if pseudo == caller_pseudo {
        let mut fields = FieldErrors::new();
        fields.set("pseudo", "SELF_FOLLOW");
        return Err(AppError::Validation(fields));
    }

    let target = state
        .store
        .find_user_by_pseudo(&pseudo)
        .await?
        .ok_or(AppError::NotFound("USER_NOT_FOUND"))?;

    Ok(target.id)
}
