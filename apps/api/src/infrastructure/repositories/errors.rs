// Translation of sqlx failures into the domain error taxonomy

use crate::domain::errors::DomainError;

/// Whether the failure is a unique index violation
pub(crate) fn is_unique_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .is_some_and(|db| db.is_unique_violation())
}

/// Whether the failure is a foreign key violation
pub(crate) fn is_foreign_key_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .is_some_and(|db| db.is_foreign_key_violation())
}

/// Classifies a failure that has no more specific meaning at the call site
pub(crate) fn storage_error(err: sqlx::Error, context: &str) -> DomainError {
    match err {
        sqlx::Error::RowNotFound => DomainError::not_found(format!("{context}: no matching row")),
        ref e if is_unique_violation(e) => DomainError::already_exists(format!("{context}: {e}")),
        ref e if is_foreign_key_violation(e) => DomainError::not_found(format!("{context}: {e}")),
        e => DomainError::storage(format!("{context}: {e}")),
    }
}

/// Escapes `%`, `_` and `\` so `term` matches literally inside a LIKE pattern
pub(crate) fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
