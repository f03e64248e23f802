use async_trait::async_trait;

use crate::domain::errors::DomainResult;
use crate::domain::user::{NewUser, User};

/// Repository trait for users
///
/// Sole read/write authority over the `users` table. Returned users still
/// carry their credential; clearing it is the usecase's job.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// All users, unordered
    async fn get_all(&self) -> DomainResult<Vec<User>>;

    /// Fails with `NotFound` when no user has this id
    async fn get_by_id(&self, id: i64) -> DomainResult<User>;

    /// Exact, case-sensitive match. Fails with `NotFound` when absent
    async fn get_by_email(&self, email: &str) -> DomainResult<User>;

    /// Fails with `AlreadyExists` when the email is taken, whether caught by
    /// the pre-check or by the storage unique index
    async fn create(&self, user: NewUser) -> DomainResult<User>;

    /// Replaces name, email and credential of the user with `user.id`
    ///
    /// Fails with `NotFound` for an unknown id and `AlreadyExists` when the
    /// email belongs to a different user.
    async fn update(&self, user: &User) -> DomainResult<User>;

    /// Hard delete. Fails with `NotFound` for an unknown id
    async fn delete(&self, id: i64) -> DomainResult<()>;

    async fn exists(&self, id: i64) -> DomainResult<bool>;

    async fn exists_by_email(&self, email: &str) -> DomainResult<bool>;

    async fn count(&self) -> DomainResult<i64>;

    /// A page of users, newest first
    async fn get_paginated(&self, offset: i64, limit: i64) -> DomainResult<Vec<User>>;
}
