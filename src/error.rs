//! Typed errors: generation-time model errors and the runtime store taxonomy.

use thiserror::Error;

/// Fatal generation-time errors. Each variant names the offending class/field.
#[derive(Error, Debug)]
pub enum ModelError {
    #[error("duplicate class definition: '{0}'")]
    DuplicateClass(String),
    #[error("duplicate field '{field}' on class '{class}'")]
    DuplicateField { class: String, field: String },
    #[error("root class '{0}' is not declared")]
    MissingRoot(String),
    #[error("class '{0}' has no identity field and cannot be an aggregate root")]
    RootWithoutIdentity(String),
    #[error("unknown class: field '{field}' of '{class}' refers to undeclared class '{target}'")]
    UnknownClass {
        class: String,
        field: String,
        target: String,
    },
    #[error("invalid reference on '{class}.{field}': {reason}")]
    InvalidReference {
        class: String,
        field: String,
        reason: String,
    },
    #[error("circular type reference: {0}")]
    CircularReference(String),
    #[error("unsupported collection on '{class}.{field}': {reason}")]
    UnsupportedCollection {
        class: String,
        field: String,
        reason: String,
    },
    #[error("model load: {0}")]
    Load(String),
    #[error("validation: {0}")]
    Validation(String),
}

/// Runtime store errors, normalized from the underlying driver.
///
/// `NotFound` is an expected, caller-recoverable condition. The rest carry the
/// original error as source for diagnostics.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("not found: {0}")]
    NotFound(String),
    #[error("duplicate key: {message}")]
    Duplicate {
        message: String,
        #[source]
        source: Option<sqlx::Error>,
    },
    #[error("connection: {message}")]
    Connection {
        message: String,
        #[source]
        source: Option<sqlx::Error>,
    },
    #[error("timeout: {message}")]
    Timeout {
        message: String,
        #[source]
        source: Option<sqlx::Error>,
    },
    #[error("codec: {0}")]
    Codec(String),
    #[error("storage: {message}")]
    Unknown {
        message: String,
        #[source]
        source: Option<sqlx::Error>,
    },
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        let message = e.to_string();
        match &e {
            sqlx::Error::RowNotFound => StoreError::NotFound(message),
            sqlx::Error::PoolTimedOut => StoreError::Timeout {
                message,
                source: Some(e),
            },
            sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::Protocol(_)
            | sqlx::Error::PoolClosed
            | sqlx::Error::WorkerCrashed
            | sqlx::Error::Configuration(_) => StoreError::Connection {
                message,
                source: Some(e),
            },
            sqlx::Error::Database(db) => {
                let unique = matches!(db.kind(), sqlx::error::ErrorKind::UniqueViolation);
                let code = db.code().map(|c| c.to_string());
                if unique {
                    StoreError::Duplicate {
                        message,
                        source: Some(e),
                    }
                } else {
                    match code.as_deref() {
                        // query_canceled
                        Some("57014") => StoreError::Timeout {
                            message,
                            source: Some(e),
                        },
                        // lock_not_available / deadlock_detected
                        Some("55P03") | Some("40P01") => StoreError::Connection {
                            message,
                            source: Some(e),
                        },
                        _ => StoreError::Unknown {
                            message,
                            source: Some(e),
                        },
                    }
                }
            }
            _ => StoreError::Unknown {
                message,
                source: Some(e),
            },
        }
    }
}

impl StoreError {
    /// Duplicate without a driver-level source (used by alternate backends).
    pub fn duplicate(message: impl Into<String>) -> Self {
        StoreError::Duplicate {
            message: message.into(),
            source: None,
        }
    }

    pub fn unknown(message: impl Into<String>) -> Self {
        StoreError::Unknown {
            message: message.into(),
            source: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_not_found_maps_to_not_found() {
        let e = StoreError::from(sqlx::Error::RowNotFound);
        assert!(matches!(e, StoreError::NotFound(_)));
    }

    #[test]
    fn pool_timeout_maps_to_timeout() {
        let e = StoreError::from(sqlx::Error::PoolTimedOut);
        assert!(matches!(e, StoreError::Timeout { .. }));
    }

    #[test]
    fn protocol_error_maps_to_connection() {
        let e = StoreError::from(sqlx::Error::Protocol("connection reset".into()));
        assert!(matches!(e, StoreError::Connection { .. }));
    }
}
