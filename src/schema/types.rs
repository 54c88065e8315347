//! Table definitions derived once at generation time; only the rows they
//! describe change at runtime.

use crate::model::ScalarType;
use crate::sql::{CascadeAction, ColumnSpec, CreateTableStmt, ForeignKeySpec};
use std::collections::HashMap;

#[derive(Clone, Debug, PartialEq)]
pub struct ColumnDefinition {
    pub name: String,
    pub source_type: ScalarType,
    pub nullable: bool,
    pub primary_key: bool,
    pub foreign_key: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ForeignKeyDefinition {
    pub column: String,
    pub references_table: String,
    pub references_column: String,
    pub on_delete: CascadeAction,
}

#[derive(Clone, Debug)]
pub struct TableDefinition {
    pub name: String,
    pub source_class: String,
    pub columns: Vec<ColumnDefinition>,
    pub foreign_keys: Vec<ForeignKeyDefinition>,
    pub unique: Vec<Vec<String>>,
    pub aggregate_root: bool,
}

impl TableDefinition {
    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    pub fn column(&self, name: &str) -> Option<&ColumnDefinition> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Static column-name → source-type map used by the value codec when
    /// decoding rows.
    pub fn decode_map(&self) -> HashMap<String, ScalarType> {
        self.columns
            .iter()
            .map(|c| (c.name.clone(), c.source_type))
            .collect()
    }

    pub fn to_create_stmt(&self) -> CreateTableStmt {
        CreateTableStmt {
            table: self.name.clone(),
            columns: self
                .columns
                .iter()
                .map(|c| ColumnSpec {
                    name: c.name.clone(),
                    ty: c.source_type,
                    not_null: !c.nullable,
                })
                .collect(),
            primary_key: "id".to_string(),
            unique: self.unique.clone(),
            foreign_keys: self
                .foreign_keys
                .iter()
                .map(|fk| ForeignKeySpec {
                    column: fk.column.clone(),
                    references_table: fk.references_table.clone(),
                    references_column: fk.references_column.clone(),
                    on_delete: fk.on_delete,
                })
                .collect(),
        }
    }
}
