use chrono::{DateTime, Utc};
use serde::Serialize;

use super::value_objects::MembershipRole;

/// Join record stating that a user belongs to a company with a role
///
/// The pair `(user_id, company_id)` is unique. Users and companies are
/// referenced by id only; hydrating them is left to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct CompanyMembership {
    pub id: i64,
    pub user_id: i64,
    pub company_id: i64,
    pub role: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CompanyMembership {
    pub fn role(&self) -> MembershipRole {
        MembershipRole::from(self.role.as_str())
    }

    pub fn is_admin(&self) -> bool {
        self.role() == MembershipRole::Admin
    }

    /// Admins are members too
    pub fn is_member(&self) -> bool {
        self.role().is_recognized()
    }
}

/// Insert payload for a membership
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMembership {
    pub user_id: i64,
    pub company_id: i64,
    pub role: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn membership(role: &str) -> CompanyMembership {
        CompanyMembership {
            id: 1,
            user_id: 10,
            company_id: 20,
            role: role.to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn admin_is_member() {
        let m = membership("admin");
        assert!(m.is_admin());
        assert!(m.is_member());
    }

    #[test]
    fn member_is_not_admin() {
        let m = membership("member");
        assert!(!m.is_admin());
        assert!(m.is_member());
    }

    #[test]
    fn unknown_role_is_unprivileged() {
        let m = membership("auditor");
        assert!(!m.is_admin());
        assert!(!m.is_member());
        assert_eq!(m.role(), MembershipRole::Other("auditor".to_string()));
    }
}
