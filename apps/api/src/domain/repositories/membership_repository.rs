use async_trait::async_trait;

use crate::domain::company::{CompanyMembership, NewMembership};
use crate::domain::errors::DomainResult;

/// Repository trait for user/company memberships (`company_users`)
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MembershipRepository: Send + Sync {
    async fn get_users_by_company_id(
        &self,
        company_id: i64,
    ) -> DomainResult<Vec<CompanyMembership>>;

    async fn get_companies_by_user_id(&self, user_id: i64) -> DomainResult<Vec<CompanyMembership>>;

    /// Fails with `AlreadyExists` if the pair already has a membership and
    /// with `NotFound` if the user or company does not exist
    async fn create(&self, membership: NewMembership) -> DomainResult<CompanyMembership>;

    /// Updates the role of the membership identified by its user/company pair
    async fn update(&self, membership: &CompanyMembership) -> DomainResult<CompanyMembership>;

    async fn delete(&self, user_id: i64, company_id: i64) -> DomainResult<()>;

    async fn get_relation(&self, user_id: i64, company_id: i64) -> DomainResult<CompanyMembership>;

    async fn exists(&self, user_id: i64, company_id: i64) -> DomainResult<bool>;
}
