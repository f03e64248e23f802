use chrono::{DateTime, Utc};
use serde::Serialize;

/// Persisted company
///
/// Email is unique across companies, in a namespace separate from user
/// emails. Contact fields are optional and stored as NULL when absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct Company {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub website: Option<String>,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Company {
    /// Name for display, falling back to the email
    pub fn display_name(&self) -> &str {
        if self.name.is_empty() {
            &self.email
        } else {
            &self.name
        }
    }

    pub fn has_contact(&self) -> bool {
        !self.email.is_empty() || is_present(&self.phone) || is_present(&self.address)
    }

    pub fn has_website(&self) -> bool {
        is_present(&self.website)
    }
}

fn is_present(field: &Option<String>) -> bool {
    field.as_deref().is_some_and(|v| !v.is_empty())
}

/// Insert payload for a company
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewCompany {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub website: Option<String>,
    pub description: Option<String>,
}
