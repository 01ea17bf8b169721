//! Boundary validation for inbound payloads.
//!
//! Every validator is a pure function: it either returns the normalized
//! payload or a [`FieldErrors`] map carrying one error code per offending
//! field. Codes are i18n lookup keys; handlers surface them verbatim as
//! 4xx responses and never as a 500.

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::models::{MediaKind, WatchStatus};

const PASSWORD_MIN: usize = 8;
const PASSWORD_MAX: usize = 30;
const COMMENT_MAX: usize = 1000;
const HANDLE_MIN: usize = 3;
const HANDLE_MAX: usize = 30;

lazy_static! {
    static ref EMAIL_RE: Regex = Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap();
    static ref HANDLE_RE: Regex = Regex::new(r"^[A-Za-z0-9_]+$").unwrap();
    static ref TAG_RE: Regex = Regex::new(r"<[^>]*>").unwrap();
    static ref WHITESPACE_RE: Regex = Regex::new(r"\s+").unwrap();
}

/// Field name → error code, one code per offending field
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FieldErrors(pub BTreeMap<&'static str, &'static str>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, field: &'static str, code: &'static str) {
        self.0.entry(field).or_insert(code);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns `value` if no field failed, otherwise the collected errors
    pub fn into_result<T>(self, value: T) -> Result<T, FieldErrors> {
        if self.is_empty() {
            Ok(value)
        } else {
            Err(self)
        }
    }
}

// ============================================================================
// Payload shapes
//
// Every field is optional at the serde layer so a missing field becomes a
// field-scoped REQUIRED error instead of a body-level deserialization
// rejection.
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct LoginPayload {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RegisterPayload {
    #[serde(default)]
    pub pseudo: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub confirm: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ResetPayload {
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub confirm: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewPayload {
    #[serde(default)]
    pub movie_id: Option<i64>,
    #[serde(default)]
    pub rating: Option<i32>,
    #[serde(default)]
    pub comment: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WatchEntryPayload {
    #[serde(default)]
    pub media_id: Option<i64>,
    #[serde(default)]
    pub media_kind: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FollowPayload {
    #[serde(default)]
    pub pseudo: Option<String>,
}

// ============================================================================
// Normalized outputs
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct LoginInput {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RegisterInput {
    pub pseudo: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResetInput {
    pub token: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReviewInput {
    pub media_id: i64,
    pub rating: i32,
    pub comment: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WatchEntryInput {
    pub media_id: i64,
    pub media_kind: MediaKind,
    pub status: WatchStatus,
}

// ============================================================================
// Validators
// ============================================================================

pub fn validate_login(payload: &LoginPayload) -> Result<LoginInput, FieldErrors> {
    let mut errors = FieldErrors::new();

    let email = normalize_email(&mut errors, payload.email.as_deref());
    let password = payload.password.as_deref().unwrap_or_default().to_string();
    if password.is_empty() {
        errors.set("password", "REQUIRED");
    }

    errors.into_result(LoginInput { email, password })
}

pub fn validate_registration(payload: &RegisterPayload) -> Result<RegisterInput, FieldErrors> {
    let mut errors = FieldErrors::new();

    let pseudo = payload.pseudo.as_deref().unwrap_or_default().trim().to_string();
    if pseudo.is_empty() {
        errors.set("pseudo", "REQUIRED");
    } else if let Some(code) = check_handle(&pseudo) {
        errors.set("pseudo", code);
    }

    let email = normalize_email(&mut errors, payload.email.as_deref());
    let password = check_password_fields(
        &mut errors,
        payload.password.as_deref(),
        payload.confirm.as_deref(),
    );

    errors.into_result(RegisterInput {
        pseudo,
        email,
        password,
    })
}

pub fn validate_reset(payload: &ResetPayload) -> Result<ResetInput, FieldErrors> {
    let mut errors = FieldErrors::new();

    let token = payload.token.as_deref().unwrap_or_default().trim().to_string();
    if token.is_empty() {
        errors.set("token", "REQUIRED");
    }

    let password = check_password_fields(
        &mut errors,
        payload.password.as_deref(),
        payload.confirm.as_deref(),
    );

    errors.into_result(ResetInput { token, password })
}

pub fn validate_review(payload: &ReviewPayload) -> Result<ReviewInput, FieldErrors> {
    let mut errors = FieldErrors::new();

    let media_id = payload.movie_id.unwrap_or_default();
    if media_id <= 0 {
        errors.set("movieId", "INVALID_MEDIA_ID");
    }

    let rating = payload.rating.unwrap_or_default();
    match payload.rating {
        None => errors.set("rating", "REQUIRED"),
        Some(r) if !(1..=10).contains(&r) => errors.set("rating", "RATING_OUT_OF_RANGE"),
        Some(_) => {}
    }

    let comment = sanitize_comment(payload.comment.as_deref().unwrap_or_default());
    if comment.is_empty() {
        errors.set("comment", "COMMENT_EMPTY");
    } else if comment.chars().count() > COMMENT_MAX {
        errors.set("comment", "COMMENT_TOO_LONG");
    }

    errors.into_result(ReviewInput {
        media_id,
        rating,
        comment,
    })
}

pub fn validate_watch_entry(payload: &WatchEntryPayload) -> Result<WatchEntryInput, FieldErrors> {
    let mut errors = FieldErrors::new();

    let media_id = payload.media_id.unwrap_or_default();
    if media_id <= 0 {
        errors.set("mediaId", "INVALID_MEDIA_ID");
    }

    let media_kind = match MediaKind::parse(payload.media_kind.as_deref().unwrap_or_default()) {
        Some(kind) => kind,
        None => {
            errors.set("mediaKind", "INVALID_MEDIA_KIND");
            MediaKind::Movie
        }
    };

    let status = match WatchStatus::parse(payload.status.as_deref().unwrap_or_default()) {
        Some(status) => status,
        None => {
            errors.set("status", "INVALID_STATUS");
            WatchStatus::Watchlist
        }
    };

    errors.into_result(WatchEntryInput {
        media_id,
        media_kind,
        status,
    })
}

pub fn validate_follow(payload: &FollowPayload) -> Result<String, FieldErrors> {
    let mut errors = FieldErrors::new();

    let pseudo = payload.pseudo.as_deref().unwrap_or_default().trim().to_string();
    if pseudo.is_empty() {
        errors.set("pseudo", "REQUIRED");
    } else if let Some(code) = check_handle(&pseudo) {
        errors.set("pseudo", code);
    }

    errors.into_result(pseudo)
}

// ============================================================================
// Helpers
// ============================================================================

/// Strips HTML tags and collapses runs of whitespace to single spaces
pub fn sanitize_comment(raw: &str) -> String {
    let stripped = TAG_RE.replace_all(raw, "");
    WHITESPACE_RE.replace_all(&stripped, " ").trim().to_string()
}

fn normalize_email(errors: &mut FieldErrors, email: Option<&str>) -> String {
    let email = email.unwrap_or_default().trim().to_lowercase();
    if email.is_empty() {
        errors.set("email", "REQUIRED");
    } else if !EMAIL_RE.is_match(&email) {
        errors.set("email", "INVALID_EMAIL");
    }
    email
}

fn check_handle(handle: &str) -> Option<&'static str> {
    let len = handle.chars().count();
    if !(HANDLE_MIN..=HANDLE_MAX).contains(&len) || !HANDLE_RE.is_match(handle) {
        return Some("INVALID_HANDLE");
    }
    None
}

/// Password policy: 8..=30 chars with upper, lower, digit and symbol classes
fn check_password_policy(password: &str) -> Option<&'static str> {
    let len = password.chars().count();
    if len < PASSWORD_MIN {
        return Some("PASSWORD_TOO_SHORT");
    }
    if len > PASSWORD_MAX {
        return Some("PASSWORD_TOO_LONG");
    }
    let has_upper = password.chars().any(|c| c.is_uppercase());
    let has_lower = password.chars().any(|c| c.is_lowercase());
    let has_digit = password.chars().any(|c| c.is_ascii_digit());
    let has_symbol = password.chars().any(|c| !c.is_alphanumeric());
    if !(has_upper && has_lower && has_digit && has_symbol) {
        return Some("PASSWORD_TOO_WEAK");
    }
    None
}

fn check_password_fields(
    errors: &mut FieldErrors,
    password: Option<&str>,
    confirm: Option<&str>,
) -> String {
    let password = password.unwrap_or_default().to_string();
    if password.is_empty() {
        errors.set("password", "REQUIRED");
    } else if let Some(code) = check_password_policy(&password) {
        errors.set("password", code);
    }

    match confirm {
        None | Some("") => errors.set("confirm", "REQUIRED"),
        Some(confirm) if confirm != password => errors.set("confirm", "CONFIRM_MISMATCH"),
        Some(_) => {}
    }

    password
}

#[cfg(test)]
mod tests {
    use super::*;

    fn login(email: Option<&str>, password: Option<&str>) -> LoginPayload {
        LoginPayload {
            email: email.map(String::from),
            password: password.map(String::from),
        }
    }

    fn register(pseudo: &str, email: &str, password: &str, confirm: &str) -> RegisterPayload {
        RegisterPayload {
            pseudo: Some(pseudo.to_string()),
            email: Some(email.to_string()),
            password: Some(password.to_string()),
            confirm: Some(confirm.to_string()),
        }
    }

    #[test]
    fn test_login_normalizes_email() {
        let input = validate_login(&login(Some("  Demo@WatchListy.App "), Some("pw"))).unwrap();
        assert_eq!(input.email, "demo@watchlisty.app");
    }

    #[test]
    fn test_login_missing_password() {
        let errors = validate_login(&login(Some("demo@watchlisty.app"), None)).unwrap_err();
        assert_eq!(errors.0.get("password"), Some(&"REQUIRED"));
        assert!(errors.0.get("email").is_none());
    }

    #[test]
    fn test_login_bad_email_format() {
        let errors = validate_login(&login(Some("not-an-email"), Some("pw"))).unwrap_err();
        assert_eq!(errors.0.get("email"), Some(&"INVALID_EMAIL"));
    }

    #[test]
    fn test_registration_accepts_strong_password() {
        let input =
            validate_registration(&register("alice_99", "a@b.co", "Str0ng!pass", "Str0ng!pass"))
                .unwrap();
        assert_eq!(input.pseudo, "alice_99");
    }

    #[test]
    fn test_registration_password_too_short() {
        let errors =
            validate_registration(&register("alice", "a@b.co", "S0r!t", "S0r!t")).unwrap_err();
        assert_eq!(errors.0.get("password"), Some(&"PASSWORD_TOO_SHORT"));
    }

    #[test]
    fn test_registration_password_missing_classes() {
        // No symbol
        let errors = validate_registration(&register("alice", "a@b.co", "Password1", "Password1"))
            .unwrap_err();
        assert_eq!(errors.0.get("password"), Some(&"PASSWORD_TOO_WEAK"));
        // No uppercase
        let errors = validate_registration(&register("alice", "a@b.co", "password1!", "password1!"))
            .unwrap_err();
        assert_eq!(errors.0.get("password"), Some(&"PASSWORD_TOO_WEAK"));
    }

    #[test]
    fn test_registration_confirm_mismatch() {
        let errors = validate_registration(&register("alice", "a@b.co", "Str0ng!pass", "other"))
            .unwrap_err();
        assert_eq!(errors.0.get("confirm"), Some(&"CONFIRM_MISMATCH"));
    }

    #[test]
    fn test_registration_rejects_bad_handle() {
        for bad in ["ab", "way_too_long_for_a_handle_123456789", "no spaces", "bad!"] {
            let errors = validate_registration(&register(bad, "a@b.co", "Str0ng!pass", "Str0ng!pass"))
                .unwrap_err();
            assert_eq!(errors.0.get("pseudo"), Some(&"INVALID_HANDLE"), "{bad}");
        }
    }

    #[test]
    fn test_reset_requires_token() {
        let payload = ResetPayload {
            token: Some("   ".to_string()),
            password: Some("Str0ng!pass".to_string()),
            confirm: Some("Str0ng!pass".to_string()),
        };
        let errors = validate_reset(&payload).unwrap_err();
        assert_eq!(errors.0.get("token"), Some(&"REQUIRED"));
    }

    #[test]
    fn test_review_rating_out_of_range() {
        let payload = ReviewPayload {
            movie_id: Some(1),
            rating: Some(11),
            comment: Some("ok".to_string()),
        };
        let errors = validate_review(&payload).unwrap_err();
        assert_eq!(errors.0.get("rating"), Some(&"RATING_OUT_OF_RANGE"));
    }

    #[test]
    fn test_review_strips_script_tags() {
        let payload = ReviewPayload {
            movie_id: Some(42),
            rating: Some(8),
            comment: Some("<script>alert(1)</script>loved   it".to_string()),
        };
        let input = validate_review(&payload).unwrap();
        assert_eq!(input.comment, "alert(1)loved it");
        assert!(!input.comment.contains('<'));
    }

    #[test]
    fn test_review_comment_only_tags_is_empty() {
        let payload = ReviewPayload {
            movie_id: Some(42),
            rating: Some(8),
            comment: Some("<b></b> <i></i>".to_string()),
        };
        let errors = validate_review(&payload).unwrap_err();
        assert_eq!(errors.0.get("comment"), Some(&"COMMENT_EMPTY"));
    }

    #[test]
    fn test_review_comment_too_long() {
        let payload = ReviewPayload {
            movie_id: Some(42),
            rating: Some(8),
            comment: Some("x".repeat(1001)),
        };
        let errors = validate_review(&payload).unwrap_err();
        assert_eq!(errors.0.get("comment"), Some(&"COMMENT_TOO_LONG"));
    }

    #[test]
    fn test_review_non_positive_media_id() {
        let payload = ReviewPayload {
            movie_id: Some(0),
            rating: Some(5),
            comment: Some("fine".to_string()),
        };
        let errors = validate_review(&payload).unwrap_err();
        assert_eq!(errors.0.get("movieId"), Some(&"INVALID_MEDIA_ID"));
    }

    #[test]
    fn test_watch_entry_valid() {
        let payload = WatchEntryPayload {
            media_id: Some(550),
            media_kind: Some("movie".to_string()),
            status: Some("watching".to_string()),
        };
        let input = validate_watch_entry(&payload).unwrap();
        assert_eq!(input.media_kind, MediaKind::Movie);
        assert_eq!(input.status, WatchStatus::Watching);
    }

    #[test]
    fn test_watch_entry_unknown_kind_and_status() {
        let payload = WatchEntryPayload {
            media_id: Some(550),
            media_kind: Some("book".to_string()),
            status: Some("paused".to_string()),
        };
        let errors = validate_watch_entry(&payload).unwrap_err();
        assert_eq!(errors.0.get("mediaKind"), Some(&"INVALID_MEDIA_KIND"));
        assert_eq!(errors.0.get("status"), Some(&"INVALID_STATUS"));
    }

    #[test]
    fn test_follow_handle_rules() {
        let ok = validate_follow(&FollowPayload {
            pseudo: Some("some_user".to_string()),
        })
        .unwrap();
        assert_eq!(ok, "some_user");

        let errors = validate_follow(&FollowPayload {
            pseudo: Some("x".to_string()),
        })
        .unwrap_err();
        assert_eq!(errors.0.get("pseudo"), Some(&"INVALID_HANDLE"));
    }

    #[test]
    fn test_sanitize_collapses_whitespace() {
        assert_eq!(sanitize_comment("  a \n\t b  "), "a b");
    }
}
