// Usecases (application layer)
// Business rules over the repository contracts; no storage or transport knowledge

pub mod company_usecase;
pub mod user_usecase;

pub use company_usecase::{CompanyInput, CompanyUsecase};
pub use user_usecase::UserUsecase;
