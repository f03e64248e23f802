// Repository implementations (data access layer)
// Adapters that implement domain repository interfaces

mod errors;
pub mod in_memory;
pub mod postgres_company_repository;
pub mod postgres_membership_repository;
pub mod postgres_user_repository;

pub use in_memory::{
    InMemoryCompanyRepository, InMemoryDatabase, InMemoryMembershipRepository,
    InMemoryUserRepository,
};
pub use postgres_company_repository::PostgresCompanyRepository;
pub use postgres_membership_repository::PostgresMembershipRepository;
pub use postgres_user_repository::PostgresUserRepository;
