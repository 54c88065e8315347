//! Aggregate store: compiles a declarative domain model into a relational
//! schema plus transactional persistence for whole object graphs.

pub mod case;
pub mod codec;
pub mod error;
pub mod migration;
pub mod model;
pub mod schema;
pub mod sql;
pub mod store;
pub mod typemap;

pub use codec::{Row, SqlValue};
pub use error::{ModelError, StoreError};
pub use migration::apply_schema;
pub use model::{analyze, AnalyzedGraph, DomainModel, TypeClassification};
pub use schema::AggregateSchema;
pub use store::{AggregateStore, Connection, PostgresConnection};
pub use typemap::Dialect;
