use thiserror::Error;

/// Result type for workq operations
pub type Result<T> = std::result::Result<T, WorkqError>;

/// Error types for workq operations
#[derive(Error, Debug)]
pub enum WorkqError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Backend error: {message}")]
    Backend { message: String },

    #[error("Configuration error: {0}")]
    Config(#[from] serde_yaml::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl WorkqError {
    /// Whether this fault is a database-level conflict that is safe to retry:
    /// a serialization failure (SQLSTATE 40001) or a deadlock (40P01).
    pub fn is_transient(&self) -> bool {
        match self {
            WorkqError::Database(sqlx::Error::Database(db)) => {
                matches!(db.code().as_deref(), Some("40001") | Some("40P01"))
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_database_errors_are_not_transient() {
        let err = WorkqError::Backend {
            message: "could not pop all messages".to_string(),
        };
        assert!(!err.is_transient());

        let err = WorkqError::Database(sqlx::Error::RowNotFound);
        assert!(!err.is_transient());
    }
}
