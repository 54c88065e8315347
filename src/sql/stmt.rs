//! Structured statement nodes. The CRUD layer builds these; the renderer
//! turns them into dialect-specific SQL text.

use crate::model::ScalarType;

/// ON DELETE action for a foreign key.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CascadeAction {
    Cascade,
    SetNull,
    Restrict,
}

impl CascadeAction {
    pub fn as_sql(self) -> &'static str {
        match self {
            CascadeAction::Cascade => "CASCADE",
            CascadeAction::SetNull => "SET NULL",
            CascadeAction::Restrict => "RESTRICT",
        }
    }
}

#[derive(Clone, Debug)]
pub enum Stmt {
    CreateTable(CreateTableStmt),
    Insert(InsertStmt),
    Select(SelectStmt),
    Delete(DeleteStmt),
}

#[derive(Clone, Debug)]
pub struct ColumnSpec {
    pub name: String,
    pub ty: ScalarType,
    pub not_null: bool,
}

#[derive(Clone, Debug)]
pub struct ForeignKeySpec {
    pub column: String,
    pub references_table: String,
    pub references_column: String,
    pub on_delete: CascadeAction,
}

/// Idempotent CREATE TABLE IF NOT EXISTS.
#[derive(Clone, Debug)]
pub struct CreateTableStmt {
    pub table: String,
    pub columns: Vec<ColumnSpec>,
    pub primary_key: String,
    pub unique: Vec<Vec<String>>,
    pub foreign_keys: Vec<ForeignKeySpec>,
}

/// INSERT, optionally as an upsert keyed on the primary key.
#[derive(Clone, Debug)]
pub struct InsertStmt {
    pub table: String,
    /// Column name plus source type, used for parameter casts on Postgres.
    pub columns: Vec<(String, ScalarType)>,
    pub upsert: bool,
}

/// Single-table SELECT with an optional `column = $1` filter.
#[derive(Clone, Debug)]
pub struct SelectStmt {
    pub table: String,
    pub columns: Vec<String>,
    pub filter: Option<String>,
    pub order_by: Option<String>,
}

/// DELETE with an optional `column = $1` filter.
#[derive(Clone, Debug)]
pub struct DeleteStmt {
    pub table: String,
    pub filter: Option<String>,
}
