//! In-memory storage engine
//!
//! Holds the `users`, `companies` and `company_users` tables behind a single
//! lock and hands out repository handles that share them. Unique constraints
//! and cascading deletes are enforced inside the write lock, so this engine
//! gives the same guarantees as the PostgreSQL schema. Used for development
//! and as the substitutable fake in tests.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::company::{Company, CompanyMembership, NewCompany, NewMembership};
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::repositories::{CompanyRepository, MembershipRepository, UserRepository};
use crate::domain::user::{NewUser, User};

#[derive(Debug, Default)]
struct Tables {
    users: BTreeMap<i64, User>,
    companies: BTreeMap<i64, Company>,
    memberships: BTreeMap<i64, CompanyMembership>,
    user_seq: i64,
    company_seq: i64,
    membership_seq: i64,
    clock: Option<DateTime<Utc>>,
}

impl Tables {
    /// Never runs backwards, so newest-first ordering follows insertion order
    fn now(&mut self) -> DateTime<Utc> {
        let now = match self.clock {
            Some(last) => Utc::now().max(last),
            None => Utc::now(),
        };
        self.clock = Some(now);
        now
    }

    fn user_email_taken(&self, email: &str, except: Option<i64>) -> bool {
        self.users
            .values()
            .any(|u| u.email == email && Some(u.id) != except)
    }

    fn company_email_taken(&self, email: &str, except: Option<i64>) -> bool {
        self.companies
            .values()
            .any(|c| c.email == email && Some(c.id) != except)
    }

    fn membership(&self, user_id: i64, company_id: i64) -> Option<&CompanyMembership> {
        self.memberships
            .values()
            .find(|m| m.user_id == user_id && m.company_id == company_id)
    }

    fn membership_mut(&mut self, user_id: i64, company_id: i64) -> Option<&mut CompanyMembership> {
        self.memberships
            .values_mut()
            .find(|m| m.user_id == user_id && m.company_id == company_id)
    }
}

/// Newest first, ties broken by id so pages are stable
fn page<T: Clone>(
    rows: impl Iterator<Item = T>,
    key: impl Fn(&T) -> (DateTime<Utc>, i64),
    offset: i64,
    limit: i64,
) -> Vec<T> {
    let mut rows: Vec<T> = rows.collect();
    rows.sort_by(|a, b| key(b).cmp(&key(a)));
    rows.into_iter()
        .skip(usize::try_from(offset).unwrap_or(0))
        .take(usize::try_from(limit).unwrap_or(0))
        .collect()
}

/// Shared in-memory tables
///
/// # Example
/// ```
/// use roster_api::infrastructure::repositories::InMemoryDatabase;
///
/// let db = InMemoryDatabase::new();
/// let users = db.user_repository();
/// let companies = db.company_repository();
/// let memberships = db.membership_repository();
/// ```
#[derive(Debug, Clone, Default)]
pub struct InMemoryDatabase {
    tables: Arc<RwLock<Tables>>,
}

impl InMemoryDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn user_repository(&self) -> InMemoryUserRepository {
        InMemoryUserRepository {
            tables: Arc::clone(&self.tables),
        }
    }

    pub fn company_repository(&self) -> InMemoryCompanyRepository {
        InMemoryCompanyRepository {
            tables: Arc::clone(&self.tables),
        }
    }

    pub fn membership_repository(&self) -> InMemoryMembershipRepository {
        InMemoryMembershipRepository {
            tables: Arc::clone(&self.tables),
        }
    }
}

/// In-memory implementation of UserRepository
#[derive(Debug, Clone)]
pub struct InMemoryUserRepository {
    tables: Arc<RwLock<Tables>>,
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn get_all(&self) -> DomainResult<Vec<User>> {
        let tables = self.tables.read().await;
        Ok(tables.users.values().cloned().collect())
    }

    async fn get_by_id(&self, id: i64) -> DomainResult<User> {
        let tables = self.tables.read().await;
        tables
            .users
            .get(&id)
            .cloned()
            .ok_or_else(|| DomainError::not_found(format!("user with id {} not found", id)))
    }

    async fn get_by_email(&self, email: &str) -> DomainResult<User> {
        let tables = self.tables.read().await;
        tables
            .users
            .values()
            .find(|u| u.email == email)
            .cloned()
            .ok_or_else(|| DomainError::not_found(format!("user with email {} not found", email)))
    }

    async fn create(&self, user: NewUser) -> DomainResult<User> {
        let mut tables = self.tables.write().await;

        if tables.user_email_taken(&user.email, None) {
            return Err(DomainError::already_exists(format!(
                "user with email {} already exists",
                user.email
            )));
        }

        tables.user_seq += 1;
        let now = tables.now();
        let created = User {
            id: tables.user_seq,
            name: user.name,
            email: user.email,
            password_hash: user.password_hash,
            created_at: now,
            updated_at: now,
        };
        tables.users.insert(created.id, created.clone());

        tracing::info!(user_id = created.id, "Created user");
        Ok(created)
    }

    async fn update(&self, user: &User) -> DomainResult<User> {
        let mut tables = self.tables.write().await;

        if !tables.users.contains_key(&user.id) {
            return Err(DomainError::not_found(format!(
                "user with id {} not found",
                user.id
            )));
        }
        if tables.user_email_taken(&user.email, Some(user.id)) {
            return Err(DomainError::already_exists(format!(
                "user with email {} already exists",
                user.email
            )));
        }

        let stored = tables
            .users
            .get_mut(&user.id)
            .ok_or_else(|| DomainError::not_found(format!("user with id {} not found", user.id)))?;
        stored.name = user.name.clone();
        stored.email = user.email.clone();
        stored.password_hash = user.password_hash.clone();
        stored.updated_at = Utc::now();

        tracing::info!(user_id = user.id, "Updated user");
        Ok(stored.clone())
    }

    async fn delete(&self, id: i64) -> DomainResult<()> {
        let mut tables = self.tables.write().await;

        if tables.users.remove(&id).is_none() {
            return Err(DomainError::not_found(format!(
                "user with id {} not found",
                id
            )));
        }
        tables.memberships.retain(|_, m| m.user_id != id);

        tracing::info!(user_id = id, "Deleted user");
        Ok(())
    }

    async fn exists(&self, id: i64) -> DomainResult<bool> {
        Ok(self.tables.read().await.users.contains_key(&id))
    }

    async fn exists_by_email(&self, email: &str) -> DomainResult<bool> {
        Ok(self.tables.read().await.user_email_taken(email, None))
    }

    async fn count(&self) -> DomainResult<i64> {
        Ok(self.tables.read().await.users.len() as i64)
    }

    async fn get_paginated(&self, offset: i64, limit: i64) -> DomainResult<Vec<User>> {
        let tables = self.tables.read().await;
        Ok(page(
            tables.users.values().cloned(),
            |u| (u.created_at, u.id),
            offset,
            limit,
        ))
    }
}

/// In-memory implementation of CompanyRepository
#[derive(Debug, Clone)]
pub struct InMemoryCompanyRepository {
    tables: Arc<RwLock<Tables>>,
}

#[async_trait]
impl CompanyRepository for InMemoryCompanyRepository {
    async fn get_all(&self) -> DomainResult<Vec<Company>> {
        let tables = self.tables.read().await;
        Ok(tables.companies.values().cloned().collect())
    }

    async fn get_by_id(&self, id: i64) -> DomainResult<Company> {
        let tables = self.tables.read().await;
        tables
            .companies
            .get(&id)
            .cloned()
            .ok_or_else(|| DomainError::not_found(format!("company with id {} not found", id)))
    }

    async fn get_by_email(&self, email: &str) -> DomainResult<Company> {
        let tables = self.tables.read().await;
        tables
            .companies
            .values()
            .find(|c| c.email == email)
            .cloned()
            .ok_or_else(|| {
                DomainError::not_found(format!("company with email {} not found", email))
            })
    }

    async fn create(&self, company: NewCompany) -> DomainResult<Company> {
        let mut tables = self.tables.write().await;

        if tables.company_email_taken(&company.email, None) {
            return Err(DomainError::already_exists(format!(
                "company with email {} already exists",
                company.email
            )));
        }

        tables.company_seq += 1;
        let now = tables.now();
        let created = Company {
            id: tables.company_seq,
            name: company.name,
            email: company.email,
            phone: company.phone,
            address: company.address,
            website: company.website,
            description: company.description,
            created_at: now,
            updated_at: now,
        };
        tables.companies.insert(created.id, created.clone());

        tracing::info!(company_id = created.id, "Created company");
        Ok(created)
    }

    async fn update(&self, company: &Company) -> DomainResult<Company> {
        let mut tables = self.tables.write().await;

        if !tables.companies.contains_key(&company.id) {
            return Err(DomainError::not_found(format!(
                "company with id {} not found",
                company.id
            )));
        }
        if tables.company_email_taken(&company.email, Some(company.id)) {
            return Err(DomainError::already_exists(format!(
                "company with email {} already exists",
                company.email
            )));
        }

        let stored = tables.companies.get_mut(&company.id).ok_or_else(|| {
            DomainError::not_found(format!("company with id {} not found", company.id))
        })?;
        *stored = Company {
            created_at: stored.created_at,
            updated_at: Utc::now(),
            ..company.clone()
        };

        tracing::info!(company_id = company.id, "Updated company");
        Ok(stored.clone())
    }

    async fn delete(&self, id: i64) -> DomainResult<()> {
        let mut tables = self.tables.write().await;

        if tables.companies.remove(&id).is_none() {
            return Err(DomainError::not_found(format!(
                "company with id {} not found",
                id
            )));
        }
        tables.memberships.retain(|_, m| m.company_id != id);

        tracing::info!(company_id = id, "Deleted company");
        Ok(())
    }

    async fn exists(&self, id: i64) -> DomainResult<bool> {
        Ok(self.tables.read().await.companies.contains_key(&id))
    }

    async fn exists_by_email(&self, email: &str) -> DomainResult<bool> {
        Ok(self.tables.read().await.company_email_taken(email, None))
    }

    async fn count(&self) -> DomainResult<i64> {
        Ok(self.tables.read().await.companies.len() as i64)
    }

    async fn get_paginated(&self, offset: i64, limit: i64) -> DomainResult<Vec<Company>> {
        let tables = self.tables.read().await;
        Ok(page(
            tables.companies.values().cloned(),
            |c| (c.created_at, c.id),
            offset,
            limit,
        ))
    }

    async fn search_by_name(&self, name: &str) -> DomainResult<Vec<Company>> {
        let needle = name.to_lowercase();
        let tables = self.tables.read().await;

        let mut found: Vec<Company> = tables
            .companies
            .values()
            .filter(|c| c.name.to_lowercase().contains(&needle))
            .cloned()
            .collect();
        found.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        Ok(found)
    }
}

/// In-memory implementation of MembershipRepository
#[derive(Debug, Clone)]
pub struct InMemoryMembershipRepository {
    tables: Arc<RwLock<Tables>>,
}

fn relation_not_found(user_id: i64, company_id: i64) -> DomainError {
    DomainError::not_found(format!(
        "relation between user {} and company {} not found",
        user_id, company_id
    ))
}

#[async_trait]
impl MembershipRepository for InMemoryMembershipRepository {
    async fn get_users_by_company_id(
        &self,
        company_id: i64,
    ) -> DomainResult<Vec<CompanyMembership>> {
        let tables = self.tables.read().await;
        Ok(tables
            .memberships
            .values()
            .filter(|m| m.company_id == company_id)
            .cloned()
            .collect())
    }

    async fn get_companies_by_user_id(&self, user_id: i64) -> DomainResult<Vec<CompanyMembership>> {
        let tables = self.tables.read().await;
        Ok(tables
            .memberships
            .values()
            .filter(|m| m.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn create(&self, membership: NewMembership) -> DomainResult<CompanyMembership> {
        let mut tables = self.tables.write().await;
        let NewMembership {
            user_id,
            company_id,
            role,
        } = membership;

        if tables.membership(user_id, company_id).is_some() {
            return Err(DomainError::already_exists(format!(
                "relation between user {} and company {} already exists",
                user_id, company_id
            )));
        }
        // Foreign keys
        if !tables.users.contains_key(&user_id) || !tables.companies.contains_key(&company_id) {
            return Err(DomainError::not_found(format!(
                "user {} or company {} not found",
                user_id, company_id
            )));
        }

        tables.membership_seq += 1;
        let now = tables.now();
        let created = CompanyMembership {
            id: tables.membership_seq,
            user_id,
            company_id,
            role,
            created_at: now,
            updated_at: now,
        };
        tables.memberships.insert(created.id, created.clone());

        tracing::info!(user_id, company_id, role = %created.role, "Created membership");
        Ok(created)
    }

    async fn update(&self, membership: &CompanyMembership) -> DomainResult<CompanyMembership> {
        let mut tables = self.tables.write().await;

        let stored = tables
            .membership_mut(membership.user_id, membership.company_id)
            .ok_or_else(|| relation_not_found(membership.user_id, membership.company_id))?;
        stored.role = membership.role.clone();
        stored.updated_at = Utc::now();

        tracing::info!(
            user_id = stored.user_id,
            company_id = stored.company_id,
            role = %stored.role,
            "Updated membership role"
        );
        Ok(stored.clone())
    }

    async fn delete(&self, user_id: i64, company_id: i64) -> DomainResult<()> {
        let mut tables = self.tables.write().await;

        let id = tables
            .membership(user_id, company_id)
            .map(|m| m.id)
            .ok_or_else(|| relation_not_found(user_id, company_id))?;
        tables.memberships.remove(&id);

        tracing::info!(user_id, company_id, "Deleted membership");
        Ok(())
    }

    async fn get_relation(&self, user_id: i64, company_id: i64) -> DomainResult<CompanyMembership> {
        let tables = self.tables.read().await;
        tables
            .membership(user_id, company_id)
            .cloned()
            .ok_or_else(|| relation_not_found(user_id, company_id))
    }

    async fn exists(&self, user_id: i64, company_id: i64) -> DomainResult<bool> {
        Ok(self
            .tables
            .read()
            .await
            .membership(user_id, company_id)
            .is_some())
    }
}
