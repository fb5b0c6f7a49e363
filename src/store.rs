use thiserror::Error;

/// Storage failure shared by every store in the crate.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{0} already exists")]
    AlreadyExists(&'static str),
    #[error("{0} not found")]
    NotFound(&'static str),
    /// A referenced row does not exist.
    #[error("missing reference: {0}")]
    MissingReference(&'static str),
    #[error(transparent)]
    Unexpected(#[from] anyhow::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Maps constraint violations to domain variants; everything else stays
/// opaque with `op` as context.
pub fn classify(err: sqlx::Error, entity: &'static str, op: &'static str) -> StoreError {
    if let Some(db) = err.as_database_error() {
        if db.is_unique_violation() {
            return StoreError::AlreadyExists(entity);
        }
        if db.is_foreign_key_violation() {
            return StoreError::MissingReference(entity);
        }
    }
    if matches!(err, sqlx::Error::RowNotFound) {
        return StoreError::NotFound(entity);
    }
    StoreError::Unexpected(anyhow::Error::new(err).context(op))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_not_found_becomes_not_found() {
        let err = classify(sqlx::Error::RowNotFound, "user", "get user");
        assert!(matches!(err, StoreError::NotFound("user")));
    }

    #[test]
    fn other_errors_keep_operation_context() {
        let err = classify(sqlx::Error::PoolTimedOut, "user", "get user");
        match err {
            StoreError::Unexpected(e) => assert_eq!(e.to_string(), "get user"),
            other => panic!("unexpected {other:?}"),
        }
    }
}
