use hbnb_db::DbError;
use hbnb_types::validate::ValidationError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Uniqueness violations: duplicate email, amenity name or review.
    #[error("{0}")]
    Conflict(String),

    /// Business rules that are not field validation, e.g. reviewing your own place.
    #[error("{0}")]
    Rule(String),

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("{0}")]
    Unauthenticated(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("storage error: {0}")]
    Storage(DbError),

    #[error("internal error: {0}")]
    Internal(String),
}

impl From<DbError> for ServiceError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { table, .. } => Self::NotFound(entity_label(table)),
            DbError::Constraint(msg) => Self::Conflict(format!("Conflicting record: {msg}")),
            other => Self::Storage(other),
        }
    }
}

fn entity_label(table: &str) -> &'static str {
    match table {
        "users" => "User",
        "places" => "Place",
        "reviews" => "Review",
        "amenities" => "Amenity",
        _ => "Record",
    }
}

pub type Result<T> = std::result::Result<T, ServiceError>;
