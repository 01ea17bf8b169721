use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};

use crate::{error::AppError, models::SessionIdentity, state::AppState};

/// Caller identity resolved from the request's opaque session token.
///
/// The gate is a read-only lookup against the session store; token issuance
/// and refresh happen outside this service. Handlers that require an
/// authenticated subject take `CurrentUser` and get a 401 rejection when
/// resolution yields nothing; the resolved identity is passed explicitly,
/// never held as ambient state.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub SessionIdentity);

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts).ok_or(AppError::Unauthorized("UNAUTHORIZED"))?;

        let identity = state
            .store
            .resolve_session(token)
            .await?
            .ok_or(AppError::Unauthorized("UNAUTHORIZED"))?;

        Ok(CurrentUser(identity))
    }
}

fn bearer_token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn parts_with_auth(value: Option<&str>) -> Parts {
        let mut builder = Request::builder().uri("/");
        if let Some(value) = value {
            builder = builder.header(AUTHORIZATION, value);
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[test]
    fn test_bearer_token_extracted() {
        let parts = parts_with_auth(Some("Bearer abc123"));
        assert_eq!(bearer_token(&parts), Some("abc123"));
    }

    #[test]
    fn test_missing_header_yields_none() {
        let parts = parts_with_auth(None);
        assert_eq!(bearer_token(&parts), None);
    }

    #[test]
    fn test_non_bearer_scheme_yields_none() {
        let parts = parts_with_auth(Some("Basic dXNlcjpwdw=="));
        assert_eq!(bearer_token(&parts), None);
    }

    #[test]
    fn test_empty_token_yields_none() {
        let parts = parts_with_auth(Some("Bearer   "));
        assert_eq!(bearer_token(&parts), None);
    }
}
