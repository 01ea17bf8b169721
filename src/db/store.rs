use uuid::Uuid;

use crate::{
    error::AppResult,
    models::{
        FollowedUser, MediaKind, PublicUser, Review, SessionIdentity, User, WatchEntry,
        WatchStatus,
    },
};

/// Persistence seam for the user-list and social-graph data layer.
///
/// Two implementations exist: [`crate::db::PgStore`] backed by PostgreSQL
/// (production) and [`crate::db::MemoryStore`] (integration tests, demo
/// runs). Uniqueness is enforced by the store, never by handler-level
/// pre-checks: concurrent duplicate writers race on the constraint and the
/// loser observes `Conflict`.
#[async_trait::async_trait]
pub trait Store: Send + Sync {
    // Identities

    /// Inserts a new account. Fails with `Conflict("PSEUDO_TAKEN")` or
    /// `Conflict("EMAIL_TAKEN")` when the handle or email is already used.
    async fn insert_user(&self, user: &User) -> AppResult<()>;

    async fn find_user_by_email(&self, email: &str) -> AppResult<Option<User>>;

    async fn find_user_by_pseudo(&self, pseudo: &str) -> AppResult<Option<User>>;

    async fn find_user_by_id(&self, id: Uuid) -> AppResult<Option<User>>;

    /// Public projection of every identity, like count computed per read,
    /// sorted by like count descending.
    async fn list_public_users(&self) -> AppResult<Vec<PublicUser>>;

    /// Adds `target_id` to the follower's `following` set (set semantics:
    /// adding an existing edge is a no-op).
    async fn add_following(&self, user_id: Uuid, target_id: Uuid) -> AppResult<()>;

    /// Removes `target_id` from the follower's `following` set; absent
    /// edges are a no-op.
    async fn remove_following(&self, user_id: Uuid, target_id: Uuid) -> AppResult<()>;

    /// Resolves the caller's `following` set to projections, skipping ids
    /// that no longer resolve.
    async fn following_of(&self, user_id: Uuid) -> AppResult<Vec<FollowedUser>>;

    /// Count of identities whose `following` set contains `user_id`.
    /// Computed on read; no denormalized counter is maintained.
    async fn followers_count(&self, user_id: Uuid) -> AppResult<i64>;

    async fn update_password(&self, user_id: Uuid, password_hash: &str) -> AppResult<()>;

    // Sessions and password resets (token issuance is external)

    /// Read-only resolution of an opaque session token.
    async fn resolve_session(&self, token: &str) -> AppResult<Option<SessionIdentity>>;

    /// Records a session token. Called by the external session issuer and
    /// by tests; the access-control gate itself never writes.
    async fn create_session(&self, user_id: Uuid, token: &str) -> AppResult<()>;

    /// One-shot resolution of a password-reset token: returns the owning
    /// user and invalidates the token.
    async fn consume_password_reset(&self, token: &str) -> AppResult<Option<Uuid>>;

    async fn create_password_reset(&self, user_id: Uuid, token: &str) -> AppResult<()>;

    // Reviews

    /// Inserts a review. Fails with `Conflict("REVIEW_EXISTS")` when the
    /// (media item, user) pair already has one; duplicates are rejected,
    /// never overwritten.
    async fn insert_review(&self, review: &Review) -> AppResult<()>;

    async fn find_review(&self, media_id: i64, user_id: Uuid) -> AppResult<Option<Review>>;

    // List entries

    /// Upserts by the (user, media item, kind) key: first add creates the
    /// record, later calls overwrite status and the updated timestamp.
    /// Idempotent under repeated identical calls.
    async fn upsert_watch_entry(&self, entry: &WatchEntry) -> AppResult<WatchEntry>;

    /// Deletes by key. Deleting an absent entry is a success, not an error.
    async fn delete_watch_entry(
        &self,
        user_id: Uuid,
        media_id: i64,
        media_kind: MediaKind,
    ) -> AppResult<()>;

    async fn list_watch_entries(
        &self,
        user_id: Uuid,
        status: WatchStatus,
    ) -> AppResult<Vec<WatchEntry>>;
}
