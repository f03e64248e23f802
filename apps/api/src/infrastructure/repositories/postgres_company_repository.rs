use async_trait::async_trait;
use sqlx::PgPool;

use super::errors::{escape_like, is_unique_violation, storage_error};
use crate::domain::company::{Company, NewCompany};
use crate::domain::errors::{DomainError, DomainResult, ResultExt};
use crate::domain::repositories::CompanyRepository;

/// PostgreSQL implementation of CompanyRepository
///
/// Memberships reference companies with `ON DELETE CASCADE`, so deleting a
/// company removes its memberships in the same statement.
pub struct PostgresCompanyRepository {
    pool: PgPool,
}

impl PostgresCompanyRepository {
    /// Creates a new PostgresCompanyRepository
    ///
    /// # Arguments
    /// * `pool` - SQLx connection pool for PostgreSQL
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn email_taken(email: &str) -> DomainError {
    DomainError::already_exists(format!("company with email {} already exists", email))
}

fn company_not_found(id: i64) -> DomainError {
    DomainError::not_found(format!("company with id {} not found", id))
}

#[async_trait]
impl CompanyRepository for PostgresCompanyRepository {
    async fn get_all(&self) -> DomainResult<Vec<Company>> {
        sqlx::query_as::<_, Company>(
            r#"
            SELECT
                id, name, email, phone, address, website, description,
                created_at, updated_at
            FROM companies
            ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| storage_error(e, "failed to get all companies"))
    }

    async fn get_by_id(&self, id: i64) -> DomainResult<Company> {
        sqlx::query_as::<_, Company>(
            r#"
            SELECT
                id, name, email, phone, address, website, description,
                created_at, updated_at
            FROM companies
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| storage_error(e, &format!("failed to get company by id {}", id)))?
        .ok_or_else(|| company_not_found(id))
    }

    async fn get_by_email(&self, email: &str) -> DomainResult<Company> {
        sqlx::query_as::<_, Company>(
            r#"
            SELECT
                id, name, email, phone, address, website, description,
                created_at, updated_at
            FROM companies
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| storage_error(e, "failed to get company by email"))?
        .ok_or_else(|| DomainError::not_found(format!("company with email {} not found", email)))
    }

    async fn create(&self, company: NewCompany) -> DomainResult<Company> {
        if self
            .exists_by_email(&company.email)
            .await
            .context("failed to check email existence")?
        {
            return Err(email_taken(&company.email));
        }

        let created = sqlx::query_as::<_, Company>(
            r#"
            INSERT INTO companies (name, email, phone, address, website, description)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING
                id, name, email, phone, address, website, description,
                created_at, updated_at
            "#,
        )
        .bind(&company.name)
        .bind(&company.email)
        .bind(&company.phone)
        .bind(&company.address)
        .bind(&company.website)
        .bind(&company.description)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                email_taken(&company.email)
            } else {
                storage_error(e, "failed to create company")
            }
        })?;

        tracing::info!(company_id = created.id, "Created company");
        Ok(created)
    }

    async fn update(&self, company: &Company) -> DomainResult<Company> {
        if !self
            .exists(company.id)
            .await
            .context("failed to check company existence")?
        {
            return Err(company_not_found(company.id));
        }

        let taken_by_other: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS(SELECT 1 FROM companies WHERE email = $1 AND id <> $2)
            "#,
        )
        .bind(&company.email)
        .bind(company.id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| storage_error(e, "failed to check email uniqueness"))?;

        if taken_by_other {
            return Err(email_taken(&company.email));
        }

        let updated = sqlx::query_as::<_, Company>(
            r#"
            UPDATE companies SET
                name = $2,
                email = $3,
                phone = $4,
                address = $5,
                website = $6,
                description = $7,
                updated_at = NOW()
            WHERE id = $1
            RETURNING
                id, name, email, phone, address, website, description,
                created_at, updated_at
            "#,
        )
        .bind(company.id)
        .bind(&company.name)
        .bind(&company.email)
        .bind(&company.phone)
        .bind(&company.address)
        .bind(&company.website)
        .bind(&company.description)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                email_taken(&company.email)
            } else {
                storage_error(e, "failed to update company")
            }
        })?
        .ok_or_else(|| company_not_found(company.id))?;

        tracing::info!(company_id = updated.id, "Updated company");
        Ok(updated)
    }

    async fn delete(&self, id: i64) -> DomainResult<()> {
        let result = sqlx::query(
            r#"
            DELETE FROM companies WHERE id = $1
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|e| storage_error(e, &format!("failed to delete company with id {}", id)))?;

        if result.rows_affected() == 0 {
            return Err(company_not_found(id));
        }

        tracing::info!(company_id = id, "Deleted company");
        Ok(())
    }

    async fn exists(&self, id: i64) -> DomainResult<bool> {
        sqlx::query_scalar(
            r#"
            SELECT EXISTS(SELECT 1 FROM companies WHERE id = $1)
            "#,
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| storage_error(e, "failed to check company existence"))
    }

    async fn exists_by_email(&self, email: &str) -> DomainResult<bool> {
        sqlx::query_scalar(
            r#"
            SELECT EXISTS(SELECT 1 FROM companies WHERE email = $1)
            "#,
        )
        .bind(email)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| storage_error(e, "failed to check company email existence"))
    }

    async fn count(&self) -> DomainResult<i64> {
        sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM companies
            "#,
        )
        .fetch_one(&self.pool)
        .await
        .map_err(|e| storage_error(e, "failed to count companies"))
    }

    async fn get_paginated(&self, offset: i64, limit: i64) -> DomainResult<Vec<Company>> {
        sqlx::query_as::<_, Company>(
            r#"
            SELECT
                id, name, email, phone, address, website, description,
                created_at, updated_at
            FROM companies
            ORDER BY created_at DESC, id DESC
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| storage_error(e, "failed to get paginated companies"))
    }

    async fn search_by_name(&self, name: &str) -> DomainResult<Vec<Company>> {
        let pattern = format!("%{}%", escape_like(name));

        sqlx::query_as::<_, Company>(
            r#"
            SELECT
                id, name, email, phone, address, website, description,
                created_at, updated_at
            FROM companies
            WHERE name ILIKE $1
            ORDER BY name, id
            "#,
        )
        .bind(pattern)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| storage_error(e, "failed to search companies by name"))
    }
}
