use std::sync::Arc;
use validator::Validate;

use crate::domain::company::{
    Company, CompanyMembership, MembershipRole, NewCompany, NewMembership,
};
use crate::domain::errors::{DomainError, DomainResult, ResultExt};
use crate::domain::repositories::{CompanyRepository, MembershipRepository};
use crate::pagination::{PageInfo, PageRequest};

/// Mutable company fields, as supplied for create and full-replace update
///
/// Empty optional fields are stored as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Validate)]
pub struct CompanyInput {
    #[validate(length(min = 2, max = 100))]
    pub name: String,
    #[validate(email, length(max = 255))]
    pub email: String,
    #[validate(length(min = 10, max = 20))]
    pub phone: Option<String>,
    #[validate(length(max = 500))]
    pub address: Option<String>,
    #[validate(url, length(max = 255))]
    pub website: Option<String>,
    #[validate(length(max = 1000))]
    pub description: Option<String>,
}

impl CompanyInput {
    fn normalized(self) -> Self {
        fn non_empty(field: Option<String>) -> Option<String> {
            field.filter(|v| !v.trim().is_empty())
        }

        Self {
            phone: non_empty(self.phone),
            address: non_empty(self.address),
            website: non_empty(self.website),
            description: non_empty(self.description),
            ..self
        }
    }
}

fn validate_id(id: i64, what: &str) -> DomainResult<()> {
    if id <= 0 {
        return Err(DomainError::validation(format!("invalid {} id: {}", what, id)));
    }
    Ok(())
}

fn validate_role_length(role: &str) -> DomainResult<()> {
    if role.chars().count() > MembershipRole::MAX_LEN {
        return Err(DomainError::validation(format!(
            "role must be at most {} characters",
            MembershipRole::MAX_LEN
        )));
    }
    Ok(())
}

/// Company business logic and user membership orchestration
///
/// Membership reads return join records, not hydrated users or companies.
#[derive(Clone)]
pub struct CompanyUsecase {
    companies: Arc<dyn CompanyRepository>,
    memberships: Arc<dyn MembershipRepository>,
}

impl CompanyUsecase {
    pub fn new(
        companies: Arc<dyn CompanyRepository>,
        memberships: Arc<dyn MembershipRepository>,
    ) -> Self {
        Self {
            companies,
            memberships,
        }
    }

    pub async fn get_all_companies(&self) -> DomainResult<Vec<Company>> {
        self.companies
            .get_all()
            .await
            .context("failed to get all companies")
    }

    pub async fn get_company_by_id(&self, id: i64) -> DomainResult<Company> {
        validate_id(id, "company")?;

        self.companies
            .get_by_id(id)
            .await
            .context(&format!("failed to get company by id {}", id))
    }

    pub async fn create_company(&self, input: CompanyInput) -> DomainResult<Company> {
        let input = input.normalized();
        input.validate()?;

        if self
            .companies
            .exists_by_email(&input.email)
            .await
            .context("failed to check email existence")?
        {
            return Err(DomainError::already_exists(format!(
                "company with email {} already exists",
                input.email
            )));
        }

        self.companies
            .create(NewCompany {
                name: input.name,
                email: input.email,
                phone: input.phone,
                address: input.address,
                website: input.website,
                description: input.description,
            })
            .await
            .context("failed to create company")
    }

    /// Replaces every mutable field of the company
    ///
    /// Email uniqueness is only re-checked when the email actually changes.
    pub async fn update_company(&self, id: i64, input: CompanyInput) -> DomainResult<Company> {
        validate_id(id, "company")?;
        let input = input.normalized();
        input.validate()?;

        let existing = self
            .companies
            .get_by_id(id)
            .await
            .context("failed to get company for update")?;

        if existing.email != input.email
            && self
                .companies
                .exists_by_email(&input.email)
                .await
                .context("failed to check email existence")?
        {
            return Err(DomainError::already_exists(format!(
                "company with email {} already exists",
                input.email
            )));
        }

        let company = Company {
            name: input.name,
            email: input.email,
            phone: input.phone,
            address: input.address,
            website: input.website,
            description: input.description,
            ..existing
        };

        self.companies
            .update(&company)
            .await
            .context("failed to update company")
    }

    /// Deletes the company; its memberships go with it at the storage level
    pub async fn delete_company(&self, id: i64) -> DomainResult<()> {
        validate_id(id, "company")?;

        if !self
            .companies
            .exists(id)
            .await
            .context("failed to check company existence")?
        {
            return Err(DomainError::not_found(format!(
                "company with id {} not found",
                id
            )));
        }

        self.companies
            .delete(id)
            .await
            .context("failed to delete company")
    }

    pub async fn get_companies_paginated(
        &self,
        page: i64,
        limit: i64,
    ) -> DomainResult<(Vec<Company>, PageInfo)> {
        let page = PageRequest::new(page, limit).normalize();

        let total = self
            .companies
            .count()
            .await
            .context("failed to count companies")?;
        let companies = self
            .companies
            .get_paginated(page.offset(), page.limit)
            .await
            .context("failed to get paginated companies")?;

        tracing::debug!(page = page.page, limit = page.limit, total, "Listed companies");
        Ok((companies, page.info(total)))
    }

    /// Case-insensitive substring search on company names
    pub async fn search_companies(&self, name: &str) -> DomainResult<Vec<Company>> {
        if name.trim().is_empty() {
            return Err(DomainError::validation("search name is required"));
        }

        self.companies
            .search_by_name(name)
            .await
            .context("failed to search companies")
    }

    /// Adds a user to a company; an empty role becomes `member`
    pub async fn add_user_to_company(
        &self,
        user_id: i64,
        company_id: i64,
        role: &str,
    ) -> DomainResult<CompanyMembership> {
        validate_id(user_id, "user")?;
        validate_id(company_id, "company")?;

        let role = if role.trim().is_empty() {
            MembershipRole::MEMBER
        } else {
            role
        };
        validate_role_length(role)?;

        if !self
            .companies
            .exists(company_id)
            .await
            .context("failed to check company existence")?
        {
            return Err(DomainError::not_found(format!(
                "company with id {} not found",
                company_id
            )));
        }

        if self
            .memberships
            .exists(user_id, company_id)
            .await
            .context("failed to check relation existence")?
        {
            return Err(DomainError::already_exists(format!(
                "user {} is already associated with company {}",
                user_id, company_id
            )));
        }

        let membership = self
            .memberships
            .create(NewMembership {
                user_id,
                company_id,
                role: role.to_string(),
            })
            .await
            .context("failed to add user to company")?;

        if !membership.role().is_recognized() {
            tracing::warn!(
                user_id,
                company_id,
                role = %membership.role,
                "Membership created with an unrecognized role"
            );
        }

        Ok(membership)
    }

    pub async fn update_user_role(
        &self,
        user_id: i64,
        company_id: i64,
        role: &str,
    ) -> DomainResult<CompanyMembership> {
        validate_id(user_id, "user")?;
        validate_id(company_id, "company")?;
        if role.trim().is_empty() {
            return Err(DomainError::validation("role is required"));
        }
        validate_role_length(role)?;

        let mut membership = self
            .memberships
            .get_relation(user_id, company_id)
            .await
            .context("failed to get user-company relation")?;

        membership.role = role.to_string();

        self.memberships
            .update(&membership)
            .await
            .context("failed to update user role")
    }

    pub async fn remove_user_from_company(&self, user_id: i64, company_id: i64) -> DomainResult<()> {
        validate_id(user_id, "user")?;
        validate_id(company_id, "company")?;

        if !self
            .memberships
            .exists(user_id, company_id)
            .await
            .context("failed to check relation existence")?
        {
            return Err(DomainError::not_found(format!(
                "user {} is not associated with company {}",
                user_id, company_id
            )));
        }

        self.memberships
            .delete(user_id, company_id)
            .await
            .context("failed to remove user from company")
    }

    /// Memberships of a company, failing with `NotFound` for an unknown company
    pub async fn get_users_by_company(&self, company_id: i64) -> DomainResult<Vec<CompanyMembership>> {
        validate_id(company_id, "company")?;

        if !self
            .companies
            .exists(company_id)
            .await
            .context("failed to check company existence")?
        {
            return Err(DomainError::not_found(format!(
                "company with id {} not found",
                company_id
            )));
        }

        self.memberships
            .get_users_by_company_id(company_id)
            .await
            .context("failed to get users by company")
    }

    /// Memberships of a user; an unknown user simply has none
    pub async fn get_companies_by_user(&self, user_id: i64) -> DomainResult<Vec<CompanyMembership>> {
        validate_id(user_id, "user")?;

        self.memberships
            .get_companies_by_user_id(user_id)
            .await
            .context("failed to get companies by user")
    }
}
