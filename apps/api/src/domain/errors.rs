use thiserror::Error;

/// Failure conditions surfaced by repositories and usecases
///
/// Repositories translate raw storage failures into these variants; usecases
/// add business-rule failures and otherwise pass repository failures through,
/// prefixing context with [`ResultExt::context`] without changing the variant.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    AlreadyExists(String),

    #[error("storage error: {0}")]
    Storage(String),

    /// Carries no detail about which check failed.
    #[error("authentication failed: invalid email or password")]
    AuthenticationFailed,

    #[error("password hashing failed: {0}")]
    PasswordHash(String),
}

/// Discriminant of a [`DomainError`], for callers that only branch on the condition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    NotFound,
    AlreadyExists,
    Storage,
    AuthenticationFailed,
    PasswordHash,
}

pub type DomainResult<T> = Result<T, DomainError>;

impl DomainError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn already_exists(message: impl Into<String>) -> Self {
        Self::AlreadyExists(message.into())
    }

    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage(message.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::Validation,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::AlreadyExists(_) => ErrorKind::AlreadyExists,
            Self::Storage(_) => ErrorKind::Storage,
            Self::AuthenticationFailed => ErrorKind::AuthenticationFailed,
            Self::PasswordHash(_) => ErrorKind::PasswordHash,
        }
    }

    /// Stable machine-readable code for error envelopes built by the transport
    pub fn code(&self) -> &'static str {
        match self.kind() {
            ErrorKind::Validation => "VALIDATION_ERROR",
            ErrorKind::NotFound => "NOT_FOUND",
            ErrorKind::AlreadyExists => "ALREADY_EXISTS",
            ErrorKind::Storage => "DATABASE_ERROR",
            ErrorKind::AuthenticationFailed => "UNAUTHORIZED",
            ErrorKind::PasswordHash => "INTERNAL_ERROR",
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.kind() == ErrorKind::NotFound
    }

    pub fn is_already_exists(&self) -> bool {
        self.kind() == ErrorKind::AlreadyExists
    }

    /// Prefixes the message with `context`, keeping the variant intact
    pub fn context(self, context: &str) -> Self {
        match self {
            Self::Validation(msg) => Self::Validation(format!("{context}: {msg}")),
            Self::NotFound(msg) => Self::NotFound(format!("{context}: {msg}")),
            Self::AlreadyExists(msg) => Self::AlreadyExists(format!("{context}: {msg}")),
            Self::Storage(msg) => Self::Storage(format!("{context}: {msg}")),
            Self::PasswordHash(msg) => Self::PasswordHash(format!("{context}: {msg}")),
            Self::AuthenticationFailed => Self::AuthenticationFailed,
        }
    }
}

impl From<validator::ValidationErrors> for DomainError {
    fn from(errors: validator::ValidationErrors) -> Self {
        Self::Validation(errors.to_string())
    }
}

/// `context` for results carrying a [`DomainError`]
pub trait ResultExt<T> {
    fn context(self, context: &str) -> DomainResult<T>;
}

impl<T> ResultExt<T> for DomainResult<T> {
    fn context(self, context: &str) -> DomainResult<T> {
        self.map_err(|e| e.context(context))
    }
}
