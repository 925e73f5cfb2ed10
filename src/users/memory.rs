use std::collections::BTreeMap;

use async_trait::async_trait;
use time::OffsetDateTime;
use tokio::sync::RwLock;

use crate::error::ApiError;
use crate::users::repo::UserStore;
use crate::users::repo_types::User;

/// Database-free store with the same id and error semantics as `PgUserStore`.
#[derive(Default)]
pub struct MemoryUserStore {
    rows: RwLock<BTreeMap<i32, User>>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.rows.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.rows.read().await.is_empty()
    }
}

fn first_free_id(rows: &BTreeMap<i32, User>, from: i32) -> Option<i32> {
    let mut candidate = from;
    for &taken in rows.range(from..).map(|(id, _)| id) {
        if taken != candidate {
            break;
        }
        candidate = candidate.checked_add(1)?;
    }
    Some(candidate)
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn ensure_schema(&self) -> Result<(), ApiError> {
        Ok(())
    }

    async fn ping(&self) -> Result<(), ApiError> {
        Ok(())
    }

    async fn create(&self, user_id: i32, user_name: &str) -> Result<User, ApiError> {
        let mut rows = self.rows.write().await;
        let id = first_free_id(&rows, user_id).ok_or(ApiError::AlreadyExists(user_id))?;
        let user = User {
            user_id: id,
            user_name: user_name.to_string(),
            creation_date: Some(OffsetDateTime::now_utc()),
        };
        rows.insert(id, user.clone());
        Ok(user)
    }

    async fn read(&self, user_id: i32) -> Result<User, ApiError> {
        self.rows
            .read()
            .await
            .get(&user_id)
            .cloned()
            .ok_or(ApiError::NotFound(user_id))
    }

    async fn update(&self, user_id: i32, user_name: &str) -> Result<User, ApiError> {
        let mut rows = self.rows.write().await;
        let user = rows.get_mut(&user_id).ok_or(ApiError::NotFound(user_id))?;
        user.user_name = user_name.to_string();
        Ok(user.clone())
    }

    async fn delete(&self, user_id: i32) -> Result<(), ApiError> {
        self.rows
            .write()
            .await
            .remove(&user_id)
            .map(|_| ())
            .ok_or(ApiError::NotFound(user_id))
    }
}
