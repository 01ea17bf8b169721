use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{
        FollowedUser, MediaKind, PublicUser, Review, Role, SessionIdentity, User, WatchEntry,
        WatchStatus,
    },
};

use super::Store;

/// PostgreSQL-backed store
///
/// Uniqueness invariants live in the schema (`migrations/`); this layer
/// only translates unique-violation errors to `Conflict` so a racing
/// duplicate writer observes a 409, never a 500.
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Maps a unique-index violation to the conflict code of the constraint
/// that fired; everything else stays a database error.
fn translate_insert_error(e: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(db) = &e {
        if db.is_unique_violation() {
            return match db.constraint() {
                Some("users_pseudo_key") => AppError::Conflict("PSEUDO_TAKEN"),
                Some("users_email_key") => AppError::Conflict("EMAIL_TAKEN"),
                Some("reviews_media_user_key") => AppError::Conflict("REVIEW_EXISTS"),
                _ => AppError::Conflict("CONFLICT"),
            };
        }
    }
    AppError::Database(e)
}

// Row types decode primitive column values; enum fields are converted on
// the way out so the schema stays plain TEXT.

#[derive(sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    pseudo: String,
    email: String,
    password_hash: String,
    avatar: Option<String>,
    role: String,
    movie_genres: Vec<i32>,
    tv_genres: Vec<i32>,
    following: Vec<Uuid>,
    created_at: DateTime<Utc>,
    verified_at: Option<DateTime<Utc>>,
    suspended_at: Option<DateTime<Utc>>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        Self {
            id: row.id,
            pseudo: row.pseudo,
            email: row.email,
            password_hash: row.password_hash,
            avatar: row.avatar,
            role: Role::parse(&row.role).unwrap_or(Role::User),
            movie_genres: row.movie_genres,
            tv_genres: row.tv_genres,
            following: row.following,
            created_at: row.created_at,
            verified_at: row.verified_at,
            suspended_at: row.suspended_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct WatchEntryRow {
    user_id: Uuid,
    media_id: i64,
    media_kind: String,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<WatchEntryRow> for WatchEntry {
    fn from(row: WatchEntryRow) -> Self {
        Self {
            user_id: row.user_id,
            media_id: row.media_id,
            media_kind: MediaKind::parse(&row.media_kind).unwrap_or(MediaKind::Movie),
            status: WatchStatus::parse(&row.status).unwrap_or(WatchStatus::Watchlist),
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct ReviewRow {
    media_id: i64,
    user_id: Uuid,
    pseudo: String,
    avatar: Option<String>,
    rating: i32,
    comment: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ReviewRow> for Review {
    fn from(row: ReviewRow) -> Self {
        Self {
            media_id: row.media_id,
            user_id: row.user_id,
            pseudo: row.pseudo,
            avatar: row.avatar,
            rating: row.rating,
            comment: row.comment,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

const USER_COLUMNS: &str = "id, pseudo, email, password_hash, avatar, role, movie_genres, \
                            tv_genres, following, created_at, verified_at, suspended_at";

#[async_trait::async_trait]
impl Store for PgStore {
    async fn insert_user(&self, user: &User) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO users (id, pseudo, email, password_hash, avatar, role, movie_genres, \
             tv_genres, following, created_at, verified_at, suspended_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)",
        )
        .bind(user.id)
        .bind(&user.pseudo)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.avatar)
        .bind(user.role.as_str())
        .bind(&user.movie_genres)
        .bind(&user.tv_genres)
        .bind(&user.following)
        .bind(user.created_at)
        .bind(user.verified_at)
        .bind(user.suspended_at)
        .execute(&self.pool)
        .await
        .map_err(translate_insert_error)?;

        Ok(())
    }

    async fn find_user_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {} FROM users WHERE email = $1",
            USER_COLUMNS
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(User::from))
    }

    async fn find_user_by_pseudo(&self, pseudo: &str) -> AppResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {} FROM users WHERE pseudo = $1",
            USER_COLUMNS
        ))
        .bind(pseudo)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(User::from))
    }

    async fn find_user_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {} FROM users WHERE id = $1",
            USER_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(User::from))
    }

    async fn list_public_users(&self) -> AppResult<Vec<PublicUser>> {
        // Like count is the follower count, recomputed on every read.
        let users = sqlx::query_as::<_, PublicUser>(
            "SELECT u.pseudo, u.avatar, u.created_at, \
             (SELECT count(*) FROM users f WHERE u.id = ANY(f.following)) AS likes \
             FROM users u \
             ORDER BY likes DESC, u.created_at ASC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(users)
    }

    async fn add_following(&self, user_id: Uuid, target_id: Uuid) -> AppResult<()> {
        sqlx::query(
            "UPDATE users SET following = array_append(following, $2) \
             WHERE id = $1 AND id <> $2 AND NOT ($2 = ANY(following))",
        )
        .bind(user_id)
        .bind(target_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn remove_following(&self, user_id: Uuid, target_id: Uuid) -> AppResult<()> {
        sqlx::query("UPDATE users SET following = array_remove(following, $2) WHERE id = $1")
            .bind(user_id)
            .bind(target_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn following_of(&self, user_id: Uuid) -> AppResult<Vec<FollowedUser>> {
        // Dangling ids (followed identity since removed) simply fail to
        // join and drop out of the projection.
        let followed = sqlx::query_as::<_, FollowedUser>(
            "SELECT f.id, f.pseudo, f.avatar \
             FROM users u \
             JOIN users f ON f.id = ANY(u.following) \
             WHERE u.id = $1 \
             ORDER BY f.pseudo ASC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(followed)
    }

    async fn followers_count(&self, user_id: Uuid) -> AppResult<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT count(*) FROM users WHERE $1 = ANY(following)")
                .bind(user_id)
                .fetch_one(&self.pool)
                .await?;

        Ok(count)
    }

    async fn update_password(&self, user_id: Uuid, password_hash: &str) -> AppResult<()> {
        sqlx::query("UPDATE users SET password_hash = $2 WHERE id = $1")
            .bind(user_id)
            .bind(password_hash)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn resolve_session(&self, token: &str) -> AppResult<Option<SessionIdentity>> {
        #[derive(sqlx::FromRow)]
        struct SessionRow {
            user_id: Uuid,
            pseudo: String,
            avatar: Option<String>,
            role: String,
        }

        let row = sqlx::query_as::<_, SessionRow>(
            "SELECT u.id AS user_id, u.pseudo, u.avatar, u.role \
             FROM sessions s \
             JOIN users u ON u.id = s.user_id \
             WHERE s.token = $1",
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|row| SessionIdentity {
            user_id: row.user_id,
            pseudo: row.pseudo,
            avatar: row.avatar,
            role: Role::parse(&row.role).unwrap_or(Role::User),
        }))
    }

    async fn create_session(&self, user_id: Uuid, token: &str) -> AppResult<()> {
        sqlx::query("INSERT INTO sessions (token, user_id, created_at) VALUES ($1, $2, $3)")
            .bind(token)
            .bind(user_id)
            .bind(Utc::now())
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn consume_password_reset(&self, token: &str) -> AppResult<Option<Uuid>> {
        let user_id: Option<Uuid> =
            sqlx::query_scalar("DELETE FROM password_resets WHERE token = $1 RETURNING user_id")
                .bind(token)
                .fetch_optional(&self.pool)
                .await?;

        Ok(user_id)
    }

    async fn create_password_reset(&self, user_id: Uuid, token: &str) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO password_resets (token, user_id, created_at) VALUES ($1, $2, $3)",
        )
        .bind(token)
        .bind(user_id)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn insert_review(&self, review: &Review) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO reviews (media_id, user_id, pseudo, avatar, rating, comment, \
             created_at, updated_at) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
        )
        .bind(review.media_id)
        .bind(review.user_id)
        .bind(&review.pseudo)
        .bind(&review.avatar)
        .bind(review.rating)
        .bind(&review.comment)
        .bind(review.created_at)
        .bind(review.updated_at)
        .execute(&self.pool)
        .await
        .map_err(translate_insert_error)?;

        Ok(())
    }

    async fn find_review(&self, media_id: i64, user_id: Uuid) -> AppResult<Option<Review>> {
        let row = sqlx::query_as::<_, ReviewRow>(
            "SELECT media_id, user_id, pseudo, avatar, rating, comment, created_at, updated_at \
             FROM reviews WHERE media_id = $1 AND user_id = $2",
        )
        .bind(media_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Review::from))
    }

    async fn upsert_watch_entry(&self, entry: &WatchEntry) -> AppResult<WatchEntry> {
        let row = sqlx::query_as::<_, WatchEntryRow>(
            "INSERT INTO watch_entries (user_id, media_id, media_kind, status, created_at, \
             updated_at) VALUES ($1, $2, $3, $4, $5, $6) \
             ON CONFLICT ON CONSTRAINT watch_entries_user_media_kind_key \
             DO UPDATE SET status = EXCLUDED.status, updated_at = EXCLUDED.updated_at \
             RETURNING user_id, media_id, media_kind, status, created_at, updated_at",
        )
        .bind(entry.user_id)
        .bind(entry.media_id)
        .bind(entry.media_kind.as_str())
        .bind(entry.status.as_str())
        .bind(entry.created_at)
        .bind(entry.updated_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(WatchEntry::from(row))
    }

    async fn delete_watch_entry(
        &self,
        user_id: Uuid,
        media_id: i64,
        media_kind: MediaKind,
    ) -> AppResult<()> {
        // The affected-row count is intentionally not checked: deleting an
        // absent entry succeeds.
        sqlx::query(
            "DELETE FROM watch_entries WHERE user_id = $1 AND media_id = $2 AND media_kind = $3",
        )
        .bind(user_id)
        .bind(media_id)
        .bind(media_kind.as_str())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn list_watch_entries(
        &self,
        user_id: Uuid,
        status: WatchStatus,
    ) -> AppResult<Vec<WatchEntry>> {
        let rows = sqlx::query_as::<_, WatchEntryRow>(
            "SELECT user_id, media_id, media_kind, status, created_at, updated_at \
             FROM watch_entries WHERE user_id = $1 AND status = $2 \
             ORDER BY updated_at DESC",
        )
        .bind(user_id)
        .bind(status.as_str())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(WatchEntry::from).collect())
    }
}
