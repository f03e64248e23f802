// Password hashing service
// bcrypt credentials with a per-hasher cost

use bcrypt::{hash, verify, DEFAULT_COST};

use crate::domain::errors::{DomainError, DomainResult};

/// bcrypt only reads this many bytes of input; longer passwords are refused
/// instead of being silently truncated
pub const MAX_PASSWORD_BYTES: usize = 72;

/// Hashes and verifies password credentials
///
/// The bcrypt cost is fixed when the hasher is built. Callers hash a
/// plaintext exactly once, right before it is persisted; passing an
/// existing hash back into [`PasswordHasher::hash`] would double-hash it.
///
/// # Example
/// ```
/// use roster_api::auth::PasswordHasher;
///
/// let hasher = PasswordHasher::new(4);
/// let credential = hasher.hash("my_password").expect("valid hash");
/// assert!(hasher.verify(&credential, "my_password"));
/// ```
#[derive(Debug, Clone, Copy)]
pub struct PasswordHasher {
    cost: u32,
}

impl PasswordHasher {
    /// Creates a hasher with the given bcrypt cost (4..=31)
    pub fn new(cost: u32) -> Self {
        Self { cost }
    }

    pub fn cost(&self) -> u32 {
        self.cost
    }

    /// Hashes a plaintext password
    ///
    /// # Returns
    /// * `Ok(String)` - The bcrypt credential
    /// * `Err(DomainError::Validation)` - If the password exceeds [`MAX_PASSWORD_BYTES`]
    /// * `Err(DomainError::PasswordHash)` - If the salt source or cost is unusable
    pub fn hash(&self, password: &str) -> DomainResult<String> {
        if password.len() > MAX_PASSWORD_BYTES {
            return Err(DomainError::validation(format!(
                "password must be at most {} bytes",
                MAX_PASSWORD_BYTES
            )));
        }
        hash(password, self.cost).map_err(|e| DomainError::PasswordHash(e.to_string()))
    }

    /// Checks a plaintext against a stored credential
    ///
    /// Comparison is done by bcrypt itself. A credential that is not a
    /// parseable bcrypt hash never matches.
    pub fn verify(&self, credential: &str, password: &str) -> bool {
        match verify(password, credential) {
            Ok(valid) => valid,
            Err(e) => {
                tracing::warn!(error = %e, "Stored credential could not be verified");
                false
            }
        }
    }
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new(DEFAULT_COST)
    }
}
