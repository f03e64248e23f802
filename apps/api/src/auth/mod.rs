// Credential handling

pub mod password;

pub use password::{PasswordHasher, MAX_PASSWORD_BYTES};
