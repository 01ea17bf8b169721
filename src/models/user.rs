use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Role tag attached to an identity
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
        }
    }

    pub fn parse(s: &str) -> Option<Role> {
        match s {
            "user" => Some(Role::User),
            "admin" => Some(Role::Admin),
            _ => None,
        }
    }
}

/// A registered account
///
/// `pseudo` and `email` are unique across all records; `following` holds the
/// keys of followed identities and never contains the record's own id.
/// Verification and suspension timestamps are set by out-of-band flows.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct User {
    pub id: Uuid,
    pub pseudo: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub avatar: Option<String>,
    pub role: Role,
    /// Preferred movie genre ids (TMDB)
    pub movie_genres: Vec<i32>,
    /// Preferred TV genre ids (TMDB)
    pub tv_genres: Vec<i32>,
    /// Keys of followed identities
    pub following: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
    pub verified_at: Option<DateTime<Utc>>,
    pub suspended_at: Option<DateTime<Utc>>,
}

impl User {
    /// Creates a new account as registration would: unverified, role `user`,
    /// empty preference sets, following no one.
    pub fn new(pseudo: String, email: String, password_hash: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            pseudo,
            email,
            password_hash,
            avatar: None,
            role: Role::User,
            movie_genres: Vec::new(),
            tv_genres: Vec::new(),
            following: Vec::new(),
            created_at: Utc::now(),
            verified_at: None,
            suspended_at: None,
        }
    }
}

/// Caller identity resolved from an opaque session token
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionIdentity {
    pub user_id: Uuid,
    pub pseudo: String,
    pub avatar: Option<String>,
    pub role: Role,
}

/// Public directory projection, sorted by like count on read
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct PublicUser {
    pub pseudo: String,
    pub avatar: Option<String>,
    pub created_at: DateTime<Utc>,
    /// Count of identities following this one, computed per read
    pub likes: i64,
}

/// Followed-identity projection
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, sqlx::FromRow)]
pub struct FollowedUser {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub pseudo: String,
    pub avatar: Option<String>,
}

/// Own-profile projection returned by GET /users/me
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub pseudo: String,
    pub email: String,
    pub avatar: Option<String>,
    pub role: Role,
    pub movie_genres: Vec<i32>,
    pub tv_genres: Vec<i32>,
    pub created_at: DateTime<Utc>,
    pub verified_at: Option<DateTime<Utc>>,
}

impl From<User> for UserProfile {
    fn from(user: User) -> Self {
        Self {
            pseudo: user.pseudo,
            email: user.email,
            avatar: user.avatar,
            role: user.role,
            movie_genres: user.movie_genres,
            tv_genres: user.tv_genres,
            created_at: user.created_at,
            verified_at: user.verified_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_user_defaults() {
        let user = User::new(
            "alice".to_string(),
            "alice@example.com".to_string(),
            "hash".to_string(),
        );
        assert_eq!(user.role, Role::User);
        assert!(user.following.is_empty());
        assert!(user.verified_at.is_none());
        assert!(user.suspended_at.is_none());
    }

    #[test]
    fn test_password_hash_never_serialized() {
        let user = User::new(
            "alice".to_string(),
            "alice@example.com".to_string(),
            "secret-hash".to_string(),
        );
        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("secret-hash"));
    }

    #[test]
    fn test_followed_user_serializes_mongo_style_id() {
        let followed = FollowedUser {
            id: Uuid::nil(),
            pseudo: "bob".to_string(),
            avatar: None,
        };
        let json = serde_json::to_value(&followed).unwrap();
        assert!(json.get("_id").is_some());
        assert_eq!(json["pseudo"], "bob");
    }

    #[test]
    fn test_role_parse_round_trip() {
        assert_eq!(Role::parse("user"), Some(Role::User));
        assert_eq!(Role::parse("admin"), Some(Role::Admin));
        assert_eq!(Role::parse("root"), None);
        assert_eq!(Role::parse(Role::Admin.as_str()), Some(Role::Admin));
    }
}
