use thiserror::Error;

/// Errors raised by the contact store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The referenced client does not exist.
    #[error("client_id {0} is missing")]
    ClientNotFound(i64),

    /// The phone number is already registered to some client.
    #[error("phone number {0} already exists")]
    PhoneConflict(String),

    /// Caller input did not match the stored data.
    #[error("input error: {0}")]
    InvalidInput(String),

    /// The schema could not be created or does not have the expected shape.
    #[error("schema error: {0}")]
    Schema(String),

    /// The database could not be reached.
    #[error("database connection failed: {0}")]
    Connectivity(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl StoreError {
    /// Lookup and input failures are reported to the user and the run goes on.
    /// Everything else aborts.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::ClientNotFound(_) | Self::InvalidInput(_))
    }

    /// Maps a unique-constraint violation on `phone` into [`StoreError::PhoneConflict`].
    pub(crate) fn from_phone_insert(err: sqlx::Error, phone: &str) -> Self {
        match &err {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                Self::PhoneConflict(phone.to_string())
            }
            _ => Self::Database(err),
        }
    }
}

pub type Result<T> = std::result::Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recoverable_kinds() {
        assert!(StoreError::ClientNotFound(7).is_recoverable());
        assert!(StoreError::InvalidInput("bad".into()).is_recoverable());
        assert!(!StoreError::PhoneConflict("111".into()).is_recoverable());
        assert!(!StoreError::Schema("clients".into()).is_recoverable());
        assert!(!StoreError::Connectivity("refused".into()).is_recoverable());
    }

    #[test]
    fn not_found_message() {
        let err = StoreError::ClientNotFound(42);

        assert_eq!(err.to_string(), "client_id 42 is missing");
    }

    #[test]
    fn non_database_errors_pass_through() {
        let err = StoreError::from_phone_insert(sqlx::Error::RowNotFound, "111");

        assert!(matches!(err, StoreError::Database(sqlx::Error::RowNotFound)));
    }
}
