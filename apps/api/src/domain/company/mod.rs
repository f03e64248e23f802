// Company domain module
// Contains the company entity, the user membership join entity and the role value object

#![allow(clippy::module_inception)]

pub mod company;
pub mod membership;
pub mod value_objects;

// Re-export main types for convenience
pub use company::{Company, NewCompany};
pub use membership::{CompanyMembership, NewMembership};
pub use value_objects::MembershipRole;
