use chrono::{DateTime, Utc};
use serde::Serialize;

/// Persisted user
///
/// `password_hash` holds the bcrypt credential while the value travels
/// between repository and usecase. Usecases empty it with
/// [`User::without_credential`] before handing a user to any caller, and it
/// is never serialized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Returns the user with the credential field emptied
    pub fn without_credential(mut self) -> Self {
        self.password_hash.clear();
        self
    }

    /// Name for display, falling back to the email
    pub fn display_name(&self) -> &str {
        if self.name.is_empty() {
            &self.email
        } else {
            &self.name
        }
    }
}

/// Insert payload for a user whose password has already been hashed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
}
