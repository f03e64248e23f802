use async_trait::async_trait;
use sqlx::PgPool;

use super::errors::{is_foreign_key_violation, is_unique_violation, storage_error};
use crate::domain::company::{CompanyMembership, NewMembership};
use crate::domain::errors::{DomainError, DomainResult, ResultExt};
use crate::domain::repositories::MembershipRepository;

/// PostgreSQL implementation of MembershipRepository over `company_users`
///
/// The `(user_id, company_id)` pair is backed by a unique index, so a
/// concurrent duplicate insert that slips past the pre-check still ends as
/// `AlreadyExists`.
pub struct PostgresMembershipRepository {
    pool: PgPool,
}

impl PostgresMembershipRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn relation_exists(user_id: i64, company_id: i64) -> DomainError {
    DomainError::already_exists(format!(
        "relation between user {} and company {} already exists",
        user_id, company_id
    ))
}

fn relation_not_found(user_id: i64, company_id: i64) -> DomainError {
    DomainError::not_found(format!(
        "relation between user {} and company {} not found",
        user_id, company_id
    ))
}

#[async_trait]
impl MembershipRepository for PostgresMembershipRepository {
    async fn get_users_by_company_id(
        &self,
        company_id: i64,
    ) -> DomainResult<Vec<CompanyMembership>> {
        sqlx::query_as::<_, CompanyMembership>(
            r#"
            SELECT id, user_id, company_id, role, created_at, updated_at
            FROM company_users
            WHERE company_id = $1
            ORDER BY created_at, id
            "#,
        )
        .bind(company_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            storage_error(e, &format!("failed to get users by company id {}", company_id))
        })
    }

    async fn get_companies_by_user_id(&self, user_id: i64) -> DomainResult<Vec<CompanyMembership>> {
        sqlx::query_as::<_, CompanyMembership>(
            r#"
            SELECT id, user_id, company_id, role, created_at, updated_at
            FROM company_users
            WHERE user_id = $1
            ORDER BY created_at, id
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| storage_error(e, &format!("failed to get companies by user id {}", user_id)))
    }

    async fn create(&self, membership: NewMembership) -> DomainResult<CompanyMembership> {
        let NewMembership {
            user_id,
            company_id,
            role,
        } = membership;

        if self
            .exists(user_id, company_id)
            .await
            .context("failed to check relation existence")?
        {
            return Err(relation_exists(user_id, company_id));
        }

        let created = sqlx::query_as::<_, CompanyMembership>(
            r#"
            INSERT INTO company_users (user_id, company_id, role)
            VALUES ($1, $2, $3)
            RETURNING id, user_id, company_id, role, created_at, updated_at
            "#,
        )
        .bind(user_id)
        .bind(company_id)
        .bind(&role)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                relation_exists(user_id, company_id)
            } else if is_foreign_key_violation(&e) {
                DomainError::not_found(format!(
                    "user {} or company {} not found",
                    user_id, company_id
                ))
            } else {
                storage_error(e, "failed to create company-user relation")
            }
        })?;

        tracing::info!(user_id, company_id, role = %created.role, "Created membership");
        Ok(created)
    }

    async fn update(&self, membership: &CompanyMembership) -> DomainResult<CompanyMembership> {
        let updated = sqlx::query_as::<_, CompanyMembership>(
            r#"
            UPDATE company_users
            SET role = $3, updated_at = NOW()
            WHERE user_id = $1 AND company_id = $2
            RETURNING id, user_id, company_id, role, created_at, updated_at
            "#,
        )
        .bind(membership.user_id)
        .bind(membership.company_id)
        .bind(&membership.role)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| storage_error(e, "failed to update company-user relation"))?
        .ok_or_else(|| relation_not_found(membership.user_id, membership.company_id))?;

        tracing::info!(
            user_id = updated.user_id,
            company_id = updated.company_id,
            role = %updated.role,
            "Updated membership role"
        );
        Ok(updated)
    }

    async fn delete(&self, user_id: i64, company_id: i64) -> DomainResult<()> {
        let result = sqlx::query(
            r#"
            DELETE FROM company_users WHERE user_id = $1 AND company_id = $2
            "#,
        )
        .bind(user_id)
        .bind(company_id)
        .execute(&self.pool)
        .await
        .map_err(|e| storage_error(e, "failed to delete company-user relation"))?;

        if result.rows_affected() == 0 {
            return Err(relation_not_found(user_id, company_id));
        }

        tracing::info!(user_id, company_id, "Deleted membership");
        Ok(())
    }

    async fn get_relation(&self, user_id: i64, company_id: i64) -> DomainResult<CompanyMembership> {
        sqlx::query_as::<_, CompanyMembership>(
            r#"
            SELECT id, user_id, company_id, role, created_at, updated_at
            FROM company_users
            WHERE user_id = $1 AND company_id = $2
            "#,
        )
        .bind(user_id)
        .bind(company_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| storage_error(e, "failed to get relation"))?
        .ok_or_else(|| relation_not_found(user_id, company_id))
    }

    async fn exists(&self, user_id: i64, company_id: i64) -> DomainResult<bool> {
        sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM company_users WHERE user_id = $1 AND company_id = $2
            )
            "#,
        )
        .bind(user_id)
        .bind(company_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| storage_error(e, "failed to check relation existence"))
    }
}
