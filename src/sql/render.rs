//! Render statement nodes to SQL text for a target dialect.

use crate::sql::stmt::*;
use crate::typemap::{storage_type, Dialect};

/// Quote an identifier (class and field names may collide with keywords,
/// e.g. a root class named `Order` defaults to table "order").
fn quoted(s: &str) -> String {
    format!("\"{}\"", s.replace('"', "\"\""))
}

pub fn render(stmt: &Stmt, dialect: Dialect) -> String {
    match stmt {
        Stmt::CreateTable(s) => render_create_table(s, dialect),
        Stmt::Insert(s) => render_insert(s, dialect),
        Stmt::Select(s) => render_select(s, dialect),
        Stmt::Delete(s) => render_delete(s, dialect),
    }
}

fn render_create_table(stmt: &CreateTableStmt, dialect: Dialect) -> String {
    let mut defs: Vec<String> = Vec::new();
    for c in &stmt.columns {
        let mut def = format!("{} {}", quoted(&c.name), storage_type(c.ty, dialect));
        if c.not_null {
            def.push_str(" NOT NULL");
        }
        defs.push(def);
    }
    defs.push(format!("PRIMARY KEY ({})", quoted(&stmt.primary_key)));
    for u in &stmt.unique {
        let cols: Vec<String> = u.iter().map(|c| quoted(c)).collect();
        defs.push(format!("UNIQUE ({})", cols.join(", ")));
    }
    for fk in &stmt.foreign_keys {
        defs.push(format!(
            "FOREIGN KEY ({}) REFERENCES {} ({}) ON DELETE {}",
            quoted(&fk.column),
            quoted(&fk.references_table),
            quoted(&fk.references_column),
            fk.on_delete.as_sql()
        ));
    }
    format!(
        "CREATE TABLE IF NOT EXISTS {} (\n  {}\n)",
        quoted(&stmt.table),
        defs.join(",\n  ")
    )
}

fn render_insert(stmt: &InsertStmt, dialect: Dialect) -> String {
    let cols: Vec<String> = stmt.columns.iter().map(|(c, _)| quoted(c)).collect();
    let placeholders: Vec<String> = stmt
        .columns
        .iter()
        .enumerate()
        .map(|(i, (_, ty))| match dialect {
            // cast so null parameters bind against typed columns
            Dialect::Postgres => format!("{}::{}", dialect.placeholder(i + 1), storage_type(*ty, dialect)),
            Dialect::Sqlite => dialect.placeholder(i + 1),
        })
        .collect();
    let verb = match (dialect, stmt.upsert) {
        (Dialect::Sqlite, true) => "INSERT OR REPLACE INTO",
        _ => "INSERT INTO",
    };
    let mut sql = format!(
        "{} {} ({}) VALUES ({})",
        verb,
        quoted(&stmt.table),
        cols.join(", "),
        placeholders.join(", ")
    );
    if stmt.upsert && dialect == Dialect::Postgres {
        let sets: Vec<String> = stmt
            .columns
            .iter()
            .filter(|(c, _)| c != "id")
            .map(|(c, _)| format!("{} = EXCLUDED.{}", quoted(c), quoted(c)))
            .collect();
        if sets.is_empty() {
            sql.push_str(" ON CONFLICT (\"id\") DO NOTHING");
        } else {
            sql.push_str(&format!(" ON CONFLICT (\"id\") DO UPDATE SET {}", sets.join(", ")));
        }
    }
    sql
}

fn render_select(stmt: &SelectStmt, dialect: Dialect) -> String {
    let cols: Vec<String> = stmt.columns.iter().map(|c| quoted(c)).collect();
    let mut sql = format!("SELECT {} FROM {}", cols.join(", "), quoted(&stmt.table));
    if let Some(filter) = &stmt.filter {
        sql.push_str(&format!(" WHERE {} = {}", quoted(filter), dialect.placeholder(1)));
    }
    if let Some(order) = &stmt.order_by {
        sql.push_str(&format!(" ORDER BY {}", quoted(order)));
    }
    sql
}

fn render_delete(stmt: &DeleteStmt, dialect: Dialect) -> String {
    let mut sql = format!("DELETE FROM {}", quoted(&stmt.table));
    if let Some(filter) = &stmt.filter {
        sql.push_str(&format!(" WHERE {} = {}", quoted(filter), dialect.placeholder(1)));
    }
    sql
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ScalarType;

    #[test]
    fn create_table_with_fk_and_unique() {
        let stmt = Stmt::CreateTable(CreateTableStmt {
            table: "order_items".into(),
            columns: vec![
                ColumnSpec {
                    name: "id".into(),
                    ty: ScalarType::Uuid,
                    not_null: true,
                },
                ColumnSpec {
                    name: "order_id".into(),
                    ty: ScalarType::Uuid,
                    not_null: true,
                },
                ColumnSpec {
                    name: "position".into(),
                    ty: ScalarType::Int,
                    not_null: true,
                },
            ],
            primary_key: "id".into(),
            unique: vec![vec!["order_id".into(), "position".into()]],
            foreign_keys: vec![ForeignKeySpec {
                column: "order_id".into(),
                references_table: "orders".into(),
                references_column: "id".into(),
                on_delete: CascadeAction::Cascade,
            }],
        });
        let sql = render(&stmt, Dialect::Postgres);
        assert_eq!(
            sql,
            "CREATE TABLE IF NOT EXISTS \"order_items\" (\n  \
             \"id\" uuid NOT NULL,\n  \
             \"order_id\" uuid NOT NULL,\n  \
             \"position\" integer NOT NULL,\n  \
             PRIMARY KEY (\"id\"),\n  \
             UNIQUE (\"order_id\", \"position\"),\n  \
             FOREIGN KEY (\"order_id\") REFERENCES \"orders\" (\"id\") ON DELETE CASCADE\n)"
        );
    }

    #[test]
    fn upsert_postgres() {
        let stmt = Stmt::Insert(InsertStmt {
            table: "orders".into(),
            columns: vec![
                ("id".into(), ScalarType::Uuid),
                ("status".into(), ScalarType::Text),
            ],
            upsert: true,
        });
        let sql = render(&stmt, Dialect::Postgres);
        assert_eq!(
            sql,
            "INSERT INTO \"orders\" (\"id\", \"status\") VALUES ($1::uuid, $2::text) \
             ON CONFLICT (\"id\") DO UPDATE SET \"status\" = EXCLUDED.\"status\""
        );
    }

    #[test]
    fn upsert_sqlite() {
        let stmt = Stmt::Insert(InsertStmt {
            table: "orders".into(),
            columns: vec![
                ("id".into(), ScalarType::Uuid),
                ("status".into(), ScalarType::Text),
            ],
            upsert: true,
        });
        let sql = render(&stmt, Dialect::Sqlite);
        assert_eq!(
            sql,
            "INSERT OR REPLACE INTO \"orders\" (\"id\", \"status\") VALUES (?, ?)"
        );
    }

    #[test]
    fn select_with_filter_and_order() {
        let stmt = Stmt::Select(SelectStmt {
            table: "order_items".into(),
            columns: vec!["id".into(), "quantity".into()],
            filter: Some("order_id".into()),
            order_by: Some("position".into()),
        });
        assert_eq!(
            render(&stmt, Dialect::Postgres),
            "SELECT \"id\", \"quantity\" FROM \"order_items\" WHERE \"order_id\" = $1 ORDER BY \"position\""
        );
    }

    #[test]
    fn delete_by_column() {
        let stmt = Stmt::Delete(DeleteStmt {
            table: "orders".into(),
            filter: Some("id".into()),
        });
        assert_eq!(
            render(&stmt, Dialect::Postgres),
            "DELETE FROM \"orders\" WHERE \"id\" = $1"
        );
    }
}
