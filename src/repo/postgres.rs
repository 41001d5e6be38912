use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use sqlx::error::ErrorKind;
use sqlx::PgPool;
use tracing::error;

use super::{NewPost, NewUser, Post, Repository, User};
use crate::auth::password;
use crate::errors::{Error, Result};

/// Live repository over a Postgres pool. The pool is injected at
/// construction and is the only shared resource this type touches.
pub struct PgRepository {
    pool: PgPool,
    timeout: Duration,
}

impl PgRepository {
    pub fn new(pool: PgPool, timeout: Duration) -> Self {
        Self { pool, timeout }
    }

    /// Runs a store call under the per-operation window. On elapse the
    /// future is dropped, which releases its connection back to the pool,
    /// and the caller sees `Error::Timeout`.
    async fn bounded<T, F>(&self, fut: F) -> Result<T>
    where
        F: Future<Output = sqlx::Result<T>>,
    {
        match tokio::time::timeout(self.timeout, fut).await {
            Ok(res) => res.map_err(map_store_error),
            Err(_) => Err(Error::Timeout),
        }
    }
}

fn map_store_error(e: sqlx::Error) -> Error {
    if matches!(e, sqlx::Error::RowNotFound) {
        return Error::NotFound;
    }
    if let Some(db) = e.as_database_error() {
        match db.kind() {
            ErrorKind::UniqueViolation => return Error::Duplicate,
            ErrorKind::ForeignKeyViolation => return Error::ForeignKey,
            ErrorKind::NotNullViolation | ErrorKind::CheckViolation => {
                return Error::Validation(db.message().to_string())
            }
            _ => {}
        }
    }
    error!(error = %e, "store error");
    Error::Store(e)
}

#[async_trait]
impl Repository for PgRepository {
    async fn get_all(&self) -> Result<Vec<User>> {
        self.bounded(
            sqlx::query_as::<_, User>(
                r#"
                SELECT id, email, full_name, password_hash, active, created_at, updated_at
                FROM users
                ORDER BY full_name, id
                "#,
            )
            .fetch_all(&self.pool),
        )
        .await
    }

    async fn get_by_email(&self, email: &str) -> Result<User> {
        self.bounded(
            sqlx::query_as::<_, User>(
                r#"
                SELECT id, email, full_name, password_hash, active, created_at, updated_at
                FROM users
                WHERE email = $1
                "#,
            )
            .bind(email)
            .fetch_optional(&self.pool),
        )
        .await?
        .ok_or(Error::NotFound)
    }

    async fn get_one(&self, id: i64) -> Result<User> {
        self.bounded(
            sqlx::query_as::<_, User>(
                r#"
                SELECT id, email, full_name, password_hash, active, created_at, updated_at
                FROM users
                WHERE id = $1
                "#,
            )
            .bind(id)
            .fetch_optional(&self.pool),
        )
        .await?
        .ok_or(Error::NotFound)
    }

    async fn insert(&self, user: NewUser) -> Result<User> {
        // The plaintext never reaches the store.
        let hash = password::hash_password(&user.password)?;
        self.bounded(
            sqlx::query_as::<_, User>(
                r#"
                INSERT INTO users (email, full_name, password_hash, active, created_at, updated_at)
                VALUES ($1, $2, $3, $4, now(), now())
                RETURNING id, email, full_name, password_hash, active, created_at, updated_at
                "#,
            )
            .bind(&user.email)
            .bind(&user.full_name)
            .bind(&hash)
            .bind(user.active)
            .fetch_one(&self.pool),
        )
        .await
    }

    async fn update(&self, user: &User) -> Result<()> {
        let result = self
            .bounded(
                sqlx::query(
                    r#"
                    UPDATE users
                    SET email = $1, full_name = $2, active = $3, updated_at = now()
                    WHERE id = $4
                    "#,
                )
                .bind(&user.email)
                .bind(&user.full_name)
                .bind(user.active)
                .bind(user.id)
                .execute(&self.pool),
            )
            .await?;
        if result.rows_affected() == 0 {
            return Err(Error::NotFound);
        }
        Ok(())
    }

    async fn delete_by_id(&self, id: i64) -> Result<()> {
        let result = self
            .bounded(
                sqlx::query(r#"DELETE FROM users WHERE id = $1"#)
                    .bind(id)
                    .execute(&self.pool),
            )
            .await?;
        if result.rows_affected() == 0 {
            return Err(Error::NotFound);
        }
        Ok(())
    }

    async fn reset_password(&self, plain: &str, user: &User) -> Result<()> {
        let hash = password::hash_password(plain)?;
        let result = self
            .bounded(
                sqlx::query(r#"UPDATE users SET password_hash = $1 WHERE id = $2"#)
                    .bind(&hash)
                    .bind(user.id)
                    .execute(&self.pool),
            )
            .await?;
        if result.rows_affected() == 0 {
            return Err(Error::NotFound);
        }
        Ok(())
    }

    async fn get_all_posts(&self) -> Result<Vec<Post>> {
        self.bounded(
            sqlx::query_as::<_, Post>(
                r#"
                SELECT id, title, content, user_id, created_at, updated_at
                FROM posts
                ORDER BY user_id, id
                "#,
            )
            .fetch_all(&self.pool),
        )
        .await
    }

    async fn get_one_post(&self, id: i64) -> Result<Post> {
        self.bounded(
            sqlx::query_as::<_, Post>(
                r#"
                SELECT id, title, content, user_id, created_at, updated_at
                FROM posts
                WHERE id = $1
                "#,
            )
            .bind(id)
            .fetch_optional(&self.pool),
        )
        .await?
        .ok_or(Error::NotFound)
    }

    async fn insert_post(&self, post: NewPost) -> Result<Post> {
        self.bounded(
            sqlx::query_as::<_, Post>(
                r#"
                INSERT INTO posts (title, content, user_id, created_at, updated_at)
                VALUES ($1, $2, $3, now(), now())
                RETURNING id, title, content, user_id, created_at, updated_at
                "#,
            )
            .bind(&post.title)
            .bind(&post.content)
            .bind(post.user_id)
            .fetch_one(&self.pool),
        )
        .await
    }

    async fn delete_post(&self, id: i64) -> Result<()> {
        let result = self
            .bounded(
                sqlx::query(r#"DELETE FROM posts WHERE id = $1"#)
                    .bind(id)
                    .execute(&self.pool),
            )
            .await?;
        if result.rows_affected() == 0 {
            return Err(Error::NotFound);
        }
        Ok(())
    }
}
