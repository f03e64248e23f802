// Repository contracts (ports)
// Usecases depend on these traits only; storage adapters live in infrastructure

pub mod company_repository;
pub mod membership_repository;
pub mod user_repository;

pub use company_repository::CompanyRepository;
pub use membership_repository::MembershipRepository;
pub use user_repository::UserRepository;

#[cfg(test)]
pub use company_repository::MockCompanyRepository;
#[cfg(test)]
pub use membership_repository::MockMembershipRepository;
#[cfg(test)]
pub use user_repository::MockUserRepository;
