//! Type mapper: scalar source types to storage types per target dialect.

use crate::model::ScalarType;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Dialect {
    Postgres,
    Sqlite,
}

impl Dialect {
    /// Placeholder for the n-th bound parameter (1-based).
    pub fn placeholder(&self, n: usize) -> String {
        match self {
            Dialect::Postgres => format!("${n}"),
            Dialect::Sqlite => "?".to_string(),
        }
    }
}

/// Storage type for a scalar in the given dialect.
///
/// SQLite has no native uuid/bool/timestamp types: identifiers become 16-byte
/// blobs, booleans 0/1 integers, timestamps epoch-millisecond integers.
pub fn storage_type(scalar: ScalarType, dialect: Dialect) -> &'static str {
    match dialect {
        Dialect::Postgres => match scalar {
            ScalarType::Uuid => "uuid",
            ScalarType::Text => "text",
            ScalarType::Int => "integer",
            ScalarType::BigInt => "bigint",
            ScalarType::Float => "double precision",
            ScalarType::Bool => "boolean",
            ScalarType::Timestamp => "timestamptz",
            ScalarType::Bytes => "bytea",
        },
        Dialect::Sqlite => match scalar {
            ScalarType::Uuid => "blob",
            ScalarType::Text => "text",
            ScalarType::Int | ScalarType::BigInt => "integer",
            ScalarType::Float => "real",
            ScalarType::Bool => "integer",
            ScalarType::Timestamp => "integer",
            ScalarType::Bytes => "blob",
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn postgres_types() {
        assert_eq!(storage_type(ScalarType::Uuid, Dialect::Postgres), "uuid");
        assert_eq!(
            storage_type(ScalarType::Timestamp, Dialect::Postgres),
            "timestamptz"
        );
        assert_eq!(storage_type(ScalarType::Bool, Dialect::Postgres), "boolean");
    }

    #[test]
    fn sqlite_types() {
        assert_eq!(storage_type(ScalarType::Uuid, Dialect::Sqlite), "blob");
        assert_eq!(
            storage_type(ScalarType::Timestamp, Dialect::Sqlite),
            "integer"
        );
        assert_eq!(storage_type(ScalarType::Bool, Dialect::Sqlite), "integer");
    }

    #[test]
    fn placeholders() {
        assert_eq!(Dialect::Postgres.placeholder(3), "$3");
        assert_eq!(Dialect::Sqlite.placeholder(3), "?");
    }
}
