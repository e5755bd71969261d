use contracts::shared::validation::FieldErrors;
use sea_orm::{DbErr, SqlErr};
use thiserror::Error;

/// Storage failure
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// A unique index rejected the write. `column` is the indexed column
    /// when the database names it.
    #[error("unique constraint violated on {column}")]
    UniqueViolation { column: String },

    /// Stored row that no longer maps onto the aggregate
    #[error("invalid stored row: {0}")]
    InvalidRow(String),

    #[error("database error: {0}")]
    Database(DbErr),
}

impl From<DbErr> for RepositoryError {
    fn from(err: DbErr) -> Self {
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(message)) => RepositoryError::UniqueViolation {
                column: unique_column(&message),
            },
            _ => RepositoryError::Database(err),
        }
    }
}

/// Column named by a SQLite unique violation,
/// e.g. `UNIQUE constraint failed: a002_worker.national_id`
fn unique_column(message: &str) -> String {
    let Some((_, columns)) = message.split_once("UNIQUE constraint failed:") else {
        return message.trim().to_string();
    };
    let first = columns.split(',').next().unwrap_or_default().trim();
    first
        .rsplit_once('.')
        .map(|(_, column)| column)
        .unwrap_or(first)
        .trim_end_matches(|c: char| !(c.is_alphanumeric() || c == '_'))
        .to_string()
}

/// Errors of the generic CRUD flow
#[derive(Debug, Error)]
pub enum CrudError {
    /// Submitted form did not clean
    #[error("validation failed: {0}")]
    Validation(FieldErrors),

    /// Clean form that collides with an existing record
    #[error("integrity violation: {0}")]
    Conflict(FieldErrors),

    #[error("record not found")]
    NotFound,

    /// Singleton record exists already
    #[error("record already exists")]
    AlreadyExists,

    #[error(transparent)]
    Repository(RepositoryError),
}

impl From<RepositoryError> for CrudError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::UniqueViolation { column } => {
                CrudError::Conflict(unique_violation("Record", &column))
            }
            other => CrudError::Repository(other),
        }
    }
}

impl From<DbErr> for CrudError {
    fn from(err: DbErr) -> Self {
        RepositoryError::from(err).into()
    }
}

/// Field error reported when `field` already holds the submitted value in
/// another `element` record
pub fn unique_violation(element: &str, field: &str) -> FieldErrors {
    FieldErrors::single(
        field,
        format!(
            "{} with this {} already exists.",
            element,
            field.replace('_', " ")
        ),
    )
}
