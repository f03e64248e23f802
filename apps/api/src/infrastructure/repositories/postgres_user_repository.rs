use async_trait::async_trait;
use sqlx::PgPool;

use super::errors::{is_unique_violation, storage_error};
use crate::domain::errors::{DomainError, DomainResult, ResultExt};
use crate::domain::repositories::UserRepository;
use crate::domain::user::{NewUser, User};

/// PostgreSQL implementation of UserRepository
///
/// Email uniqueness is pre-checked for a friendly error and also guarded by
/// the `idx_users_email` unique index; a violation of that index on write is
/// reported as the same `AlreadyExists` condition.
pub struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    /// Creates a new PostgresUserRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn email_taken(email: &str) -> DomainError {
    DomainError::already_exists(format!("user with email {} already exists", email))
}

fn user_not_found(id: i64) -> DomainError {
    DomainError::not_found(format!("user with id {} not found", id))
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn get_all(&self) -> DomainResult<Vec<User>> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, email, password_hash, created_at, updated_at
            FROM users
            ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| storage_error(e, "failed to get all users"))
    }

    async fn get_by_id(&self, id: i64) -> DomainResult<User> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, email, password_hash, created_at, updated_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| storage_error(e, &format!("failed to get user by id {}", id)))?
        .ok_or_else(|| user_not_found(id))
    }

    async fn get_by_email(&self, email: &str) -> DomainResult<User> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, email, password_hash, created_at, updated_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| storage_error(e, "failed to get user by email"))?
        .ok_or_else(|| DomainError::not_found(format!("user with email {} not found", email)))
    }

    async fn create(&self, user: NewUser) -> DomainResult<User> {
        if self
            .exists_by_email(&user.email)
            .await
            .context("failed to check email existence")?
        {
            return Err(email_taken(&user.email));
        }

        let created = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (name, email, password_hash)
            VALUES ($1, $2, $3)
            RETURNING id, name, email, password_hash, created_at, updated_at
            "#,
        )
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                email_taken(&user.email)
            } else {
                storage_error(e, "failed to create user")
            }
        })?;

        tracing::info!(user_id = created.id, "Created user");
        Ok(created)
    }

    async fn update(&self, user: &User) -> DomainResult<User> {
        if !self
            .exists(user.id)
            .await
            .context("failed to check user existence")?
        {
            return Err(user_not_found(user.id));
        }

        let taken_by_other: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS(SELECT 1 FROM users WHERE email = $1 AND id <> $2)
            "#,
        )
        .bind(&user.email)
        .bind(user.id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| storage_error(e, "failed to check email uniqueness"))?;

        if taken_by_other {
            return Err(email_taken(&user.email));
        }

        let updated = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET name = $2, email = $3, password_hash = $4, updated_at = NOW()
            WHERE id = $1
            RETURNING id, name, email, password_hash, created_at, updated_at
            "#,
        )
        .bind(user.id)
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                email_taken(&user.email)
            } else {
                storage_error(e, "failed to update user")
            }
        })?
        // Deleted between the existence check and the write
        .ok_or_else(|| user_not_found(user.id))?;

        tracing::info!(user_id = updated.id, "Updated user");
        Ok(updated)
    }

    async fn delete(&self, id: i64) -> DomainResult<()> {
        let result = sqlx::query(
            r#"
            DELETE FROM users WHERE id = $1
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|e| storage_error(e, &format!("failed to delete user with id {}", id)))?;

        if result.rows_affected() == 0 {
            return Err(user_not_found(id));
        }

        tracing::info!(user_id = id, "Deleted user");
        Ok(())
    }

    async fn exists(&self, id: i64) -> DomainResult<bool> {
        sqlx::query_scalar(
            r#"
            SELECT EXISTS(SELECT 1 FROM users WHERE id = $1)
            "#,
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| storage_error(e, "failed to check user existence"))
    }

    async fn exists_by_email(&self, email: &str) -> DomainResult<bool> {
        sqlx::query_scalar(
            r#"
            SELECT EXISTS(SELECT 1 FROM users WHERE email = $1)
            "#,
        )
        .bind(email)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| storage_error(e, "failed to check user email existence"))
    }

    async fn count(&self) -> DomainResult<i64> {
        sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM users
            "#,
        )
        .fetch_one(&self.pool)
        .await
        .map_err(|e| storage_error(e, "failed to count users"))
    }

    async fn get_paginated(&self, offset: i64, limit: i64) -> DomainResult<Vec<User>> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, email, password_hash, created_at, updated_at
            FROM users
            ORDER BY created_at DESC, id DESC
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| storage_error(e, "failed to get paginated users"))
    }
}
