use std::collections::HashMap;

use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{
        FollowedUser, MediaKind, PublicUser, Review, SessionIdentity, User, WatchEntry,
        WatchStatus,
    },
};

use super::Store;

/// In-memory store enforcing the same invariants as the PostgreSQL schema.
///
/// Integration tests mount the router over this; it also backs demo runs
/// without a database. State never outlives the process.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

#[derive(Default)]
struct Inner {
    users: HashMap<Uuid, User>,
    sessions: HashMap<String, Uuid>,
    password_resets: HashMap<String, Uuid>,
    reviews: HashMap<(i64, Uuid), Review>,
    watch_entries: HashMap<(Uuid, i64, MediaKind), WatchEntry>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl Store for MemoryStore {
    async fn insert_user(&self, user: &User) -> AppResult<()> {
        let mut inner = self.inner.write().await;

        if inner.users.values().any(|u| u.pseudo == user.pseudo) {
            return Err(AppError::Conflict("PSEUDO_TAKEN"));
        }
        if inner.users.values().any(|u| u.email == user.email) {
            return Err(AppError::Conflict("EMAIL_TAKEN"));
        }

        inner.users.insert(user.id, user.clone());
        Ok(())
    }

    async fn find_user_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let inner = self.inner.read().await;
        Ok(inner.users.values().find(|u| u.email == email).cloned())
    }

    async fn find_user_by_pseudo(&self, pseudo: &str) -> AppResult<Option<User>> {
        let inner = self.inner.read().await;
        Ok(inner.users.values().find(|u| u.pseudo == pseudo).cloned())
    }

    async fn find_user_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        let inner = self.inner.read().await;
        Ok(inner.users.get(&id).cloned())
    }

    async fn list_public_users(&self) -> AppResult<Vec<PublicUser>> {
        let inner = self.inner.read().await;

        let mut users: Vec<PublicUser> = inner
            .users
            .values()
            .map(|user| {
                let likes = inner
                    .users
                    .values()
                    .filter(|other| other.following.contains(&user.id))
                    .count() as i64;
                PublicUser {
                    pseudo: user.pseudo.clone(),
                    avatar: user.avatar.clone(),
                    created_at: user.created_at,
                    likes,
                }
            })
            .collect();

        users.sort_by(|a, b| b.likes.cmp(&a.likes).then(a.created_at.cmp(&b.created_at)));
        Ok(users)
    }

    async fn add_following(&self, user_id: Uuid, target_id: Uuid) -> AppResult<()> {
        let mut inner = self.inner.write().await;
        if let Some(user) = inner.users.get_mut(&user_id) {
            if user_id != target_id && !user.following.contains(&target_id) {
                user.following.push(target_id);
            }
        }
        Ok(())
    }

    async fn remove_following(&self, user_id: Uuid, target_id: Uuid) -> AppResult<()> {
        let mut inner = self.inner.write().await;
        if let Some(user) = inner.users.get_mut(&user_id) {
            user.following.retain(|id| *id != target_id);
        }
        Ok(())
    }

    async fn following_of(&self, user_id: Uuid) -> AppResult<Vec<FollowedUser>> {
        let inner = self.inner.read().await;

        let mut followed: Vec<FollowedUser> = inner
            .users
            .get(&user_id)
            .map(|user| {
                user.following
                    .iter()
                    .filter_map(|id| inner.users.get(id))
                    .map(|target| FollowedUser {
                        id: target.id,
                        pseudo: target.pseudo.clone(),
                        avatar: target.avatar.clone(),
                    })
                    .collect()
            })
            .unwrap_or_default();

        followed.sort_by(|a, b| a.pseudo.cmp(&b.pseudo));
        Ok(followed)
    }

    async fn followers_count(&self, user_id: Uuid) -> AppResult<i64> {
        let inner = self.inner.read().await;
        let count = inner
            .users
            .values()
            .filter(|user| user.following.contains(&user_id))
            .count();
        Ok(count as i64)
    }

    async fn update_password(&self, user_id: Uuid, password_hash: &str) -> AppResult<()> {
        let mut inner = self.inner.write().await;
        if let Some(user) = inner.users.get_mut(&user_id) {
            user.password_hash = password_hash.to_string();
        }
        Ok(())
    }

    async fn resolve_session(&self, token: &str) -> AppResult<Option<SessionIdentity>> {
        let inner = self.inner.read().await;
        Ok(inner
            .sessions
            .get(token)
            .and_then(|user_id| inner.users.get(user_id))
            .map(|user| SessionIdentity {
                user_id: user.id,
                pseudo: user.pseudo.clone(),
                avatar: user.avatar.clone(),
                role: user.role,
            }))
    }

    async fn create_session(&self, user_id: Uuid, token: &str) -> AppResult<()> {
        let mut inner = self.inner.write().await;
        inner.sessions.insert(token.to_string(), user_id);
        Ok(())
    }

    async fn consume_password_reset(&self, token: &str) -> AppResult<Option<Uuid>> {
        let mut inner = self.inner.write().await;
        Ok(inner.password_resets.remove(token))
    }

    async fn create_password_reset(&self, user_id: Uuid, token: &str) -> AppResult<()> {
        let mut inner = self.inner.write().await;
        inner.password_resets.insert(token.to_string(), user_id);
        Ok(())
    }

    async fn insert_review(&self, review: &Review) -> AppResult<()> {
        let mut inner = self.inner.write().await;
        let key = (review.media_id, review.user_id);
        if inner.reviews.contains_key(&key) {
            return Err(AppError::Conflict("REVIEW_EXISTS"));
        }
        inner.reviews.insert(key, review.clone());
        Ok(())
    }

    async fn find_review(&self, media_id: i64, user_id: Uuid) -> AppResult<Option<Review>> {
        let inner = self.inner.read().await;
        Ok(inner.reviews.get(&(media_id, user_id)).cloned())
    }

    async fn upsert_watch_entry(&self, entry: &WatchEntry) -> AppResult<WatchEntry> {
        let mut inner = self.inner.write().await;
        let key = (entry.user_id, entry.media_id, entry.media_kind);

        let stored = match inner.watch_entries.get_mut(&key) {
            Some(existing) => {
                // Status change mutates the record in place; created_at is
                // preserved.
                existing.status = entry.status;
                existing.updated_at = Utc::now();
                existing.clone()
            }
            None => {
                inner.watch_entries.insert(key, entry.clone());
                entry.clone()
            }
        };

        Ok(stored)
    }

    async fn delete_watch_entry(
        &self,
        user_id: Uuid,
        media_id: i64,
        media_kind: MediaKind,
    ) -> AppResult<()> {
        let mut inner = self.inner.write().await;
        inner.watch_entries.remove(&(user_id, media_id, media_kind));
        Ok(())
    }

    async fn list_watch_entries(
        &self,
        user_id: Uuid,
        status: WatchStatus,
    ) -> AppResult<Vec<WatchEntry>> {
        let inner = self.inner.read().await;
        let mut entries: Vec<WatchEntry> = inner
            .watch_entries
            .values()
            .filter(|entry| entry.user_id == user_id && entry.status == status)
            .cloned()
            .collect();

        entries.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Role;

    fn user(pseudo: &str, email: &str) -> User {
        User::new(pseudo.to_string(), email.to_string(), "hash".to_string())
    }

    fn identity(user: &User) -> SessionIdentity {
        SessionIdentity {
            user_id: user.id,
            pseudo: user.pseudo.clone(),
            avatar: user.avatar.clone(),
            role: Role::User,
        }
    }

    #[tokio::test]
    async fn test_duplicate_pseudo_conflicts() {
        let store = MemoryStore::new();
        store.insert_user(&user("alice", "a@b.co")).await.unwrap();

        let err = store.insert_user(&user("alice", "other@b.co")).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict("PSEUDO_TAKEN")));
    }

    #[tokio::test]
    async fn test_duplicate_email_conflicts() {
        let store = MemoryStore::new();
        store.insert_user(&user("alice", "a@b.co")).await.unwrap();

        let err = store.insert_user(&user("bob", "a@b.co")).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict("EMAIL_TAKEN")));
    }

    #[tokio::test]
    async fn test_duplicate_review_conflicts() {
        let store = MemoryStore::new();
        let alice = user("alice", "a@b.co");
        store.insert_user(&alice).await.unwrap();

        let review = Review::new(550, &identity(&alice), 9, "great".to_string());
        store.insert_review(&review).await.unwrap();

        let err = store.insert_review(&review).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict("REVIEW_EXISTS")));
    }

    #[tokio::test]
    async fn test_upsert_mutates_single_record() {
        let store = MemoryStore::new();
        let alice = user("alice", "a@b.co");
        store.insert_user(&alice).await.unwrap();

        let first =
            WatchEntry::new(alice.id, 550, MediaKind::Movie, WatchStatus::Watchlist);
        store.upsert_watch_entry(&first).await.unwrap();

        let second =
            WatchEntry::new(alice.id, 550, MediaKind::Movie, WatchStatus::Completed);
        let stored = store.upsert_watch_entry(&second).await.unwrap();

        assert_eq!(stored.status, WatchStatus::Completed);
        // created_at of the original record is preserved across the upsert
        assert_eq!(stored.created_at, first.created_at);

        let completed = store
            .list_watch_entries(alice.id, WatchStatus::Completed)
            .await
            .unwrap();
        assert_eq!(completed.len(), 1);

        let watchlist = store
            .list_watch_entries(alice.id, WatchStatus::Watchlist)
            .await
            .unwrap();
        assert!(watchlist.is_empty());
    }

    #[tokio::test]
    async fn test_delete_absent_entry_is_ok() {
        let store = MemoryStore::new();
        let result = store
            .delete_watch_entry(Uuid::new_v4(), 999, MediaKind::Tv)
            .await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_followers_count_and_likes_sorting() {
        let store = MemoryStore::new();
        let alice = user("alice", "a@b.co");
        let bob = user("bob", "b@b.co");
        let carol = user("carol", "c@b.co");
        for u in [&alice, &bob, &carol] {
            store.insert_user(u).await.unwrap();
        }

        store.add_following(alice.id, bob.id).await.unwrap();
        store.add_following(carol.id, bob.id).await.unwrap();

        assert_eq!(store.followers_count(bob.id).await.unwrap(), 2);
        assert_eq!(store.followers_count(alice.id).await.unwrap(), 0);

        let public = store.list_public_users().await.unwrap();
        assert_eq!(public[0].pseudo, "bob");
        assert_eq!(public[0].likes, 2);
    }

    #[tokio::test]
    async fn test_add_following_is_a_set_and_skips_self() {
        let store = MemoryStore::new();
        let alice = user("alice", "a@b.co");
        let bob = user("bob", "b@b.co");
        store.insert_user(&alice).await.unwrap();
        store.insert_user(&bob).await.unwrap();

        store.add_following(alice.id, bob.id).await.unwrap();
        store.add_following(alice.id, bob.id).await.unwrap();
        store.add_following(alice.id, alice.id).await.unwrap();

        let stored = store.find_user_by_id(alice.id).await.unwrap().unwrap();
        assert_eq!(stored.following, vec![bob.id]);
    }

    #[tokio::test]
    async fn test_session_resolution() {
        let store = MemoryStore::new();
        let alice = user("alice", "a@b.co");
        store.insert_user(&alice).await.unwrap();
        store.create_session(alice.id, "tok-1").await.unwrap();

        let identity = store.resolve_session("tok-1").await.unwrap().unwrap();
        assert_eq!(identity.pseudo, "alice");

        assert!(store.resolve_session("unknown").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_password_reset_is_one_shot() {
        let store = MemoryStore::new();
        let alice = user("alice", "a@b.co");
        store.insert_user(&alice).await.unwrap();
        store.create_password_reset(alice.id, "reset-1").await.unwrap();

        assert_eq!(
            store.consume_password_reset("reset-1").await.unwrap(),
            Some(alice.id)
        );
        assert_eq!(store.consume_password_reset("reset-1").await.unwrap(), None);
    }
}
