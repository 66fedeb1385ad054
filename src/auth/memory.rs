use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::auth::repo::{StoreError, StoreResult, UserStore};
use crate::auth::repo_types::{NewUser, User, UserChanges};

#[derive(Debug, Default)]
struct Inner {
    next_id: i64,
    users: BTreeMap<i64, User>,
}

/// In-process user store for tests and local development.
#[derive(Debug, Default, Clone)]
pub struct MemoryUserStore {
    inner: Arc<RwLock<Inner>>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn insert(&self, user: NewUser) -> StoreResult<User> {
        let mut inner = self.inner.write().await;

        if inner.users.values().any(|u| u.email == user.email) {
            return Err(StoreError::DuplicateEmail);
        }

        inner.next_id += 1;
        let created = User {
            id: inner.next_id,
            full_name: user.full_name,
            email: user.email,
            password_hash: user.password_hash,
            created_at: user.created_at,
            updated_at: user.created_at,
        };
        inner.users.insert(created.id, created.clone());

        tracing::debug!(user_id = created.id, "memory store insert");
        Ok(created)
    }

    async fn find_by_id(&self, id: i64) -> StoreResult<Option<User>> {
        Ok(self.inner.read().await.users.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let inner = self.inner.read().await;
        Ok(inner.users.values().find(|u| u.email == email).cloned())
    }

    async fn email_taken(&self, email: &str, except: Option<i64>) -> StoreResult<bool> {
        let inner = self.inner.read().await;
        Ok(inner
            .users
            .values()
            .any(|u| u.email == email && Some(u.id) != except))
    }

    async fn list(&self) -> StoreResult<Vec<User>> {
        Ok(self.inner.read().await.users.values().cloned().collect())
    }

    async fn update(&self, id: i64, changes: UserChanges) -> StoreResult<Option<User>> {
        let mut inner = self.inner.write().await;

        if !inner.users.contains_key(&id) {
            return Ok(None);
        }
        if inner
            .users
            .values()
            .any(|u| u.id != id && u.email == changes.email)
        {
            return Err(StoreError::DuplicateEmail);
        }

        let Some(user) = inner.users.get_mut(&id) else {
            return Ok(None);
        };
        user.full_name = changes.full_name;
        user.email = changes.email;
        if let Some(hash) = changes.password_hash {
            user.password_hash = hash;
        }
        user.updated_at = changes.updated_at;
        Ok(Some(user.clone()))
    }

    async fn delete(&self, id: i64) -> StoreResult<bool> {
        Ok(self.inner.write().await.users.remove(&id).is_some())
    }
}
