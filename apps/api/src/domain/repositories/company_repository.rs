use async_trait::async_trait;

use crate::domain::company::{Company, NewCompany};
use crate::domain::errors::DomainResult;

/// Repository trait for companies
///
/// Mirrors [`UserRepository`](super::UserRepository) with its own email
/// namespace, plus a name search. Deleting a company removes its
/// memberships at the storage level.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CompanyRepository: Send + Sync {
    async fn get_all(&self) -> DomainResult<Vec<Company>>;

    async fn get_by_id(&self, id: i64) -> DomainResult<Company>;

    async fn get_by_email(&self, email: &str) -> DomainResult<Company>;

    async fn create(&self, company: NewCompany) -> DomainResult<Company>;

    async fn update(&self, company: &Company) -> DomainResult<Company>;

    async fn delete(&self, id: i64) -> DomainResult<()>;

    async fn exists(&self, id: i64) -> DomainResult<bool>;

    async fn exists_by_email(&self, email: &str) -> DomainResult<bool>;

    async fn count(&self) -> DomainResult<i64>;

    async fn get_paginated(&self, offset: i64, limit: i64) -> DomainResult<Vec<Company>>;

    /// Case-insensitive substring match on the company name
    async fn search_by_name(&self, name: &str) -> DomainResult<Vec<Company>>;
}
