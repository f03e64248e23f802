use std::sync::Arc;
use validator::{Validate, ValidationError};

use crate::auth::{PasswordHasher, MAX_PASSWORD_BYTES};
use crate::domain::errors::{DomainError, DomainResult, ResultExt};
use crate::domain::repositories::UserRepository;
use crate::domain::user::{NewUser, User};
use crate::pagination::{PageInfo, PageRequest};

#[derive(Debug, Validate)]
struct CreateUserInput {
    #[validate(length(min = 2, max = 50))]
    name: String,
    #[validate(email, length(max = 255))]
    email: String,
    #[validate(length(min = 8), custom(function = "validate_password_bytes"))]
    password: String,
}

fn validate_password_bytes(password: &str) -> Result<(), ValidationError> {
    if password.len() > MAX_PASSWORD_BYTES {
        return Err(ValidationError::new("password_too_long"));
    }
    Ok(())
}

#[derive(Debug, Validate)]
struct UpdateUserInput {
    #[validate(length(min = 2, max = 50))]
    name: String,
    #[validate(email, length(max = 255))]
    email: String,
}

/// User business logic
///
/// Every user handed back to a caller has its credential field emptied.
#[derive(Clone)]
pub struct UserUsecase {
    users: Arc<dyn UserRepository>,
    hasher: PasswordHasher,
}

impl UserUsecase {
    pub fn new(users: Arc<dyn UserRepository>, hasher: PasswordHasher) -> Self {
        Self { users, hasher }
    }

    /// Registers a user, hashing the plaintext password before it is stored
    pub async fn create(&self, name: &str, email: &str, password: &str) -> DomainResult<User> {
        let input = CreateUserInput {
            name: name.to_string(),
            email: email.to_string(),
            password: password.to_string(),
        };
        input.validate()?;

        if self
            .users
            .exists_by_email(email)
            .await
            .context("failed to check email existence")?
        {
            return Err(DomainError::already_exists(format!(
                "user with email {} already exists",
                email
            )));
        }

        let password_hash = self.hasher.hash(&input.password)?;
        let user = self
            .users
            .create(NewUser {
                name: input.name,
                email: input.email,
                password_hash,
            })
            .await
            .context("failed to create user")?;

        Ok(user.without_credential())
    }

    pub async fn get_all_users(&self) -> DomainResult<Vec<User>> {
        let users = self
            .users
            .get_all()
            .await
            .context("failed to get all users")?;

        Ok(users.into_iter().map(User::without_credential).collect())
    }

    pub async fn get_user_by_id(&self, id: i64) -> DomainResult<User> {
        let user = self
            .users
            .get_by_id(id)
            .await
            .context(&format!("failed to get user by id {}", id))?;

        Ok(user.without_credential())
    }

    /// Replaces name and email
    ///
    /// Email uniqueness is only re-checked when the email actually changes.
    pub async fn update_user(&self, id: i64, name: &str, email: &str) -> DomainResult<User> {
        UpdateUserInput {
            name: name.to_string(),
            email: email.to_string(),
        }
        .validate()?;

        let mut user = self
            .users
            .get_by_id(id)
            .await
            .context("failed to get user for update")?;

        if user.email != email
            && self
                .users
                .exists_by_email(email)
                .await
                .context("failed to check email existence")?
        {
            return Err(DomainError::already_exists(format!(
                "user with email {} already exists",
                email
            )));
        }

        user.name = name.to_string();
        user.email = email.to_string();

        let updated = self
            .users
            .update(&user)
            .await
            .context("failed to update user")?;

        Ok(updated.without_credential())
    }

    pub async fn delete_user(&self, id: i64) -> DomainResult<()> {
        self.users.delete(id).await
    }

    /// A normalized page of users, newest first, with pagination metadata
    pub async fn get_users_paginated(
        &self,
        page: i64,
        limit: i64,
    ) -> DomainResult<(Vec<User>, PageInfo)> {
        let page = PageRequest::new(page, limit).normalize();

        let total = self
            .users
            .count()
            .await
            .context("failed to count users")?;
        let users = self
            .users
            .get_paginated(page.offset(), page.limit)
            .await
            .context("failed to get paginated users")?;

        tracing::debug!(page = page.page, limit = page.limit, total, "Listed users");
        Ok((
            users.into_iter().map(User::without_credential).collect(),
            page.info(total),
        ))
    }

    /// Checks an email/password pair
    ///
    /// An unknown email and a wrong password produce the same
    /// `AuthenticationFailed`, so callers cannot probe for accounts.
    pub async fn authenticate_user(&self, email: &str, password: &str) -> DomainResult<User> {
        let user = match self.users.get_by_email(email).await {
            Ok(user) => user,
            Err(e) if e.is_not_found() => {
                tracing::warn!("Authentication rejected");
                return Err(DomainError::AuthenticationFailed);
            }
            Err(e) => return Err(e.context("failed to look up user for authentication")),
        };

        if !self.hasher.verify(&user.password_hash, password) {
            tracing::warn!("Authentication rejected");
            return Err(DomainError::AuthenticationFailed);
        }

        tracing::debug!(user_id = user.id, "Authenticated user");
        Ok(user.without_credential())
    }
}
