use serde::{Deserialize, Serialize};

/// Role a user holds within a company
///
/// Persisted as an open string. Only `admin` and `member` carry defined
/// semantics; any other value is accepted and treated as a valid role
/// without privileges.
///
/// # Example
/// ```
/// use roster_api::domain::company::value_objects::MembershipRole;
///
/// assert_eq!(MembershipRole::from("admin"), MembershipRole::Admin);
/// assert!(!MembershipRole::from("viewer").is_recognized());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum MembershipRole {
    Admin,
    #[default]
    Member,
    Other(String),
}

impl MembershipRole {
    pub const ADMIN: &'static str = "admin";
    pub const MEMBER: &'static str = "member";
    /// Longest role the `company_users.role` column holds, in characters
    pub const MAX_LEN: usize = 50;

    /// Whether the role is one of the recognized roles
    pub fn is_recognized(&self) -> bool {
        matches!(self, MembershipRole::Admin | MembershipRole::Member)
    }

    pub fn as_str(&self) -> &str {
        match self {
            MembershipRole::Admin => Self::ADMIN,
            MembershipRole::Member => Self::MEMBER,
            MembershipRole::Other(role) => role,
        }
    }
}

impl From<&str> for MembershipRole {
    fn from(role: &str) -> Self {
        match role {
            Self::ADMIN => MembershipRole::Admin,
            Self::MEMBER => MembershipRole::Member,
            other => MembershipRole::Other(other.to_string()),
        }
    }
}

impl From<String> for MembershipRole {
    fn from(role: String) -> Self {
        MembershipRole::from(role.as_str())
    }
}

impl From<MembershipRole> for String {
    fn from(role: MembershipRole) -> Self {
        role.as_str().to_string()
    }
}

impl std::fmt::Display for MembershipRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_recognized_roles() {
        assert_eq!(MembershipRole::from("admin"), MembershipRole::Admin);
        assert_eq!(MembershipRole::from("member"), MembershipRole::Member);
    }

    #[test]
    fn parse_is_case_sensitive() {
        assert_eq!(
            MembershipRole::from("Admin"),
            MembershipRole::Other("Admin".to_string())
        );
    }

    #[test]
    fn default_is_member() {
        assert_eq!(MembershipRole::default(), MembershipRole::Member);
    }

    #[test]
    fn role_display() {
        assert_eq!(MembershipRole::Admin.to_string(), "admin");
        assert_eq!(MembershipRole::Member.to_string(), "member");
        assert_eq!(MembershipRole::Other("owner".into()).to_string(), "owner");
    }

    #[test]
    fn serializes_as_plain_string() {
        let json = serde_json::to_string(&MembershipRole::Admin).unwrap();
        assert_eq!(json, "\"admin\"");

        let role: MembershipRole = serde_json::from_str("\"billing\"").unwrap();
        assert_eq!(role, MembershipRole::Other("billing".to_string()));
    }
}
