pub mod conn;
pub mod crud;
pub mod postgres;

pub use conn::Connection;
pub use crud::AggregateStore;
pub use postgres::PostgresConnection;
