use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::SessionIdentity;

/// One rating + comment per (media item, user)
///
/// The author's pseudo and avatar are snapshotted at write time: a review
/// keeps the display name its author had when it was posted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub media_id: i64,
    pub user_id: Uuid,
    pub pseudo: String,
    pub avatar: Option<String>,
    /// Bounded integer rating, 1..=10 inclusive
    pub rating: i32,
    /// Sanitized free text: tags stripped, whitespace collapsed, 1..=1000 chars
    pub comment: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Review {
    pub fn new(media_id: i64, author: &SessionIdentity, rating: i32, comment: String) -> Self {
        let now = Utc::now();
        Self {
            media_id,
            user_id: author.user_id,
            pseudo: author.pseudo.clone(),
            avatar: author.avatar.clone(),
            rating,
            comment,
            created_at: now,
            updated_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Role;

    #[test]
    fn test_new_review_snapshots_author() {
        let author = SessionIdentity {
            user_id: Uuid::new_v4(),
            pseudo: "alice".to_string(),
            avatar: Some("avatars/alice.png".to_string()),
            role: Role::User,
        };
        let review = Review::new(550, &author, 9, "great".to_string());
        assert_eq!(review.pseudo, "alice");
        assert_eq!(review.avatar.as_deref(), Some("avatars/alice.png"));
        assert_eq!(review.user_id, author.user_id);
    }
}
