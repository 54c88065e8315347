//! Apply a generated schema to the database. Tables are created owners
//! first, junction tables last, so every referenced table exists before the
//! foreign key that points at it. Idempotent (IF NOT EXISTS).

use crate::error::StoreError;
use crate::schema::AggregateSchema;
use crate::sql::{render, Stmt};
use crate::store::Connection;
use crate::typemap::Dialect;

pub async fn apply_schema(
    conn: &dyn Connection,
    schema: &AggregateSchema,
    dialect: Dialect,
) -> Result<(), StoreError> {
    for table in schema.tables() {
        let sql = render(&Stmt::CreateTable(table.to_create_stmt()), dialect);
        tracing::info!(table = %table.name, "creating table");
        conn.execute(&sql, &[]).await?;
    }
    Ok(())
}
