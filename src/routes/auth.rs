use axum::{extract::State, http::StatusCode, Json};
use serde_json::{json, Value};

use crate::{
    auth::{hash_password, verify_password},
    error::{AppError, AppResult},
    models::User,
    state::AppState,
    validation::{
        validate_login, validate_registration, validate_reset, LoginPayload, RegisterPayload,
        ResetPayload,
    },
};

/// Verifies credentials against the stored hash.
///
/// Session issuance happens outside this service; a successful login only
/// acknowledges the credentials. Unknown email and wrong password are
/// indistinguishable to the caller.
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginPayload>,
) -> AppResult<Json<Value>> {
    let input = validate_login(&payload).map_err(AppError::Form)?;

    let user = state
        .store
        .find_user_by_email(&input.email)
        .await?
        .ok_or(AppError::Unauthorized("INVALID_CREDENTIALS"))?;

    if user.suspended_at.is_some() {
        return Err(AppError::Unauthorized("ACCOUNT_SUSPENDED"));
    }

    if !verify_password(&input.password, &user.password_hash)? {
        return Err(AppError::Unauthorized("INVALID_CREDENTIALS"));
    }

    tracing::info!(pseudo = %user.pseudo, "Login succeeded");

    Ok(Json(json!({ "ok": true })))
}

/// Creates an account.
///
/// No pre-check for an existing handle or email: the insert races on the
/// unique indexes and a duplicate surfaces as 409.
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterPayload>,
) -> AppResult<(StatusCode, Json<Value>)> {
    let input = validate_registration(&payload).map_err(AppError::Form)?;

    let password_hash = hash_password(&input.password)?;
    let user = User::new(input.pseudo, input.email, password_hash);

    state.store.insert_user(&user).await?;

    tracing::info!(pseudo = %user.pseudo, "Account created");

    Ok((StatusCode::CREATED, Json(json!({ "ok": true }))))
}

/// Consumes a password-reset token and replaces the credential hash.
///
/// Tokens are issued by the out-of-band email flow; an unknown or already
/// used token is 404.
pub async fn reset(
    State(state): State<AppState>,
    Json(payload): Json<ResetPayload>,
) -> AppResult<Json<Value>> {
    let input = validate_reset(&payload).map_err(AppError::Form)?;

    let user_id = state
        .store
        .consume_password_reset(&input.token)
        .await?
        .ok_or(AppError::NotFound("RESET_TOKEN_INVALID"))?;

    let password_hash = hash_password(&input.password)?;
    state.store.update_password(user_id, &password_hash).await?;

    tracing::info!(user_id = %user_id, "Password reset");

    Ok(Json(json!({ "ok": true })))
}
