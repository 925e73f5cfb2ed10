use async_trait::async_trait;
use sqlx::PgPool;
use tracing::{debug, warn};

use crate::error::ApiError;
use crate::schema;
use crate::users::repo_types::User;

/// Advisory lock key serializing id assignment across connections.
const CREATE_LOCK_KEY: i64 = 0x7573_6572_735f_6964;

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Make sure the backing tables exist. Only connection failures are errors.
    async fn ensure_schema(&self) -> Result<(), ApiError>;

    async fn ping(&self) -> Result<(), ApiError>;

    /// Insert at the smallest free id `>= user_id`; the returned row carries the id used.
    async fn create(&self, user_id: i32, user_name: &str) -> Result<User, ApiError>;

    async fn read(&self, user_id: i32) -> Result<User, ApiError>;

    async fn update(&self, user_id: i32, user_name: &str) -> Result<User, ApiError>;

    async fn delete(&self, user_id: i32) -> Result<(), ApiError>;
}

#[derive(Clone)]
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn ensure_schema(&self) -> Result<(), ApiError> {
        let mut conn = self.pool.acquire().await?;
        schema::ensure_tables(&mut *conn).await;
        Ok(())
    }

    async fn ping(&self) -> Result<(), ApiError> {
        crate::db::ping(&self.pool).await
    }

    async fn create(&self, user_id: i32, user_name: &str) -> Result<User, ApiError> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("SELECT pg_advisory_xact_lock($1)")
            .bind(CREATE_LOCK_KEY)
            .execute(&mut *tx)
            .await?;

        // Candidates are the requested id and the successor of every taken id
        // above it; the smallest untaken candidate is the first gap.
        let free: Option<i32> = sqlx::query_scalar(
            r#"
            SELECT c.candidate
              FROM (
                    SELECT $1::INT AS candidate
                    UNION ALL
                    SELECT u.user_id + 1
                      FROM users u
                     WHERE u.user_id >= $1 AND u.user_id < 2147483647
                   ) c
             WHERE NOT EXISTS (SELECT 1 FROM users x WHERE x.user_id = c.candidate)
             ORDER BY c.candidate
             LIMIT 1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(id) = free else {
            warn!(user_id, "no free user id up to the top of the range");
            return Err(ApiError::AlreadyExists(user_id));
        };

        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (user_id, user_name, creation_date)
            VALUES ($1, $2, NOW())
            RETURNING user_id, user_name, creation_date
            "#,
        )
        .bind(id)
        .bind(user_name)
        .fetch_one(&mut *tx)
        .await?;
        tx.commit().await?;

        if user.user_id != user_id {
            debug!(requested = user_id, assigned = user.user_id, "user id reassigned");
        }
        Ok(user)
    }

    async fn read(&self, user_id: i32) -> Result<User, ApiError> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT user_id, user_name, creation_date
              FROM users
             WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(ApiError::NotFound(user_id))
    }

    async fn update(&self, user_id: i32, user_name: &str) -> Result<User, ApiError> {
        sqlx::query_as::<_, User>(
            r#"
            UPDATE users
               SET user_name = $1
             WHERE user_id = $2
            RETURNING user_id, user_name, creation_date
            "#,
        )
        .bind(user_name)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(ApiError::NotFound(user_id))
    }

    async fn delete(&self, user_id: i32) -> Result<(), ApiError> {
        let result = sqlx::query("DELETE FROM users WHERE user_id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(ApiError::NotFound(user_id));
        }
        Ok(())
    }
}
