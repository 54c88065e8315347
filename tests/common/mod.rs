//! In-memory `Connection` that interprets the generated statement shapes,
//! including ON DELETE CASCADE keys picked up from the received DDL. Lets
//! the persistence flow run end to end without a database.

use aggregate_store::{Connection, Row, SqlValue, StoreError};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

#[derive(Clone, Default)]
struct State {
    tables: HashMap<String, Vec<Row>>,
    cascades: Vec<Cascade>,
}

#[derive(Clone)]
struct Cascade {
    parent_table: String,
    child_table: String,
    column: String,
}

#[derive(Default)]
struct Inner {
    state: State,
    snapshot: Option<State>,
    depth: u32,
    fail_on: Option<String>,
}

#[derive(Default)]
pub struct MemConn {
    inner: Mutex<Inner>,
}

#[allow(dead_code)]
impl MemConn {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make any later statement containing `needle` fail.
    pub fn fail_when_sql_contains(&self, needle: &str) {
        self.inner.lock().unwrap().fail_on = Some(needle.to_string());
    }

    pub fn rows(&self, table: &str) -> Vec<Row> {
        self.inner
            .lock()
            .unwrap()
            .state
            .tables
            .get(table)
            .cloned()
            .unwrap_or_default()
    }

    pub fn count(&self, table: &str) -> usize {
        self.rows(table).len()
    }

    pub fn table_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .inner
            .lock()
            .unwrap()
            .state
            .tables
            .keys()
            .cloned()
            .collect();
        names.sort();
        names
    }

    fn apply(&self, sql: &str, params: &[SqlValue]) -> Result<Vec<Row>, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        if let Some(needle) = &inner.fail_on {
            if sql.contains(needle.as_str()) {
                return Err(StoreError::unknown(format!("injected failure: {sql}")));
            }
        }
        let state = &mut inner.state;

        if let Some(rest) = sql.strip_prefix("CREATE TABLE IF NOT EXISTS \"") {
            let table = ident(rest);
            state.tables.entry(table.clone()).or_default();
            for line in sql.lines() {
                let line = line.trim().trim_end_matches(',');
                if let Some(fk) = line.strip_prefix("FOREIGN KEY (\"") {
                    if !line.ends_with("ON DELETE CASCADE") {
                        continue;
                    }
                    let column = ident(fk);
                    let parent = fk
                        .split("REFERENCES \"")
                        .nth(1)
                        .map(ident)
                        .expect("foreign key names a parent table");
                    state.cascades.push(Cascade {
                        parent_table: parent,
                        child_table: table.clone(),
                        column,
                    });
                }
            }
            return Ok(Vec::new());
        }

        if let Some(rest) = sql.strip_prefix("INSERT INTO \"") {
            let table = ident(rest);
            let open = sql.find('(').expect("insert lists columns") + 1;
            let close = sql.find(") VALUES").expect("insert has VALUES");
            let columns = ident_list(&sql[open..close]);
            assert_eq!(columns.len(), params.len(), "parameter count for {sql}");
            let mut row = Row::new();
            for (c, p) in columns.iter().zip(params) {
                row.insert(c.clone(), p.clone());
            }
            let rows = state.tables.entry(table).or_default();
            if sql.contains("ON CONFLICT") {
                if let Some(existing) = rows.iter_mut().find(|r| r.get("id") == row.get("id")) {
                    *existing = row;
                    return Ok(Vec::new());
                }
            }
            rows.push(row);
            return Ok(Vec::new());
        }

        if let Some(rest) = sql.strip_prefix("DELETE FROM \"") {
            let table = ident(rest);
            match rest.split("WHERE \"").nth(1) {
                Some(w) => delete_matching(state, &table, &ident(w), &params[0]),
                None => {
                    state.tables.insert(table, Vec::new());
                }
            }
            return Ok(Vec::new());
        }

        if let Some(rest) = sql.strip_prefix("SELECT ") {
            let from = rest.find(" FROM \"").expect("select names a table");
            let columns = ident_list(&rest[..from]);
            let after = &rest[from + " FROM \"".len()..];
            let table = ident(after);
            let mut rows: Vec<Row> = state.tables.get(&table).cloned().unwrap_or_default();
            if let Some(w) = after.split("WHERE \"").nth(1) {
                let column = ident(w);
                rows.retain(|r| r.get(&column) == Some(&params[0]));
            }
            if after.contains("ORDER BY \"position\"") {
                rows.sort_by_key(|r| match r.get("position") {
                    Some(SqlValue::I64(n)) => *n,
                    _ => 0,
                });
            }
            return Ok(rows
                .into_iter()
                .map(|r| {
                    columns
                        .iter()
                        .map(|c| (c.clone(), r.get(c).cloned().unwrap_or(SqlValue::Null)))
                        .collect()
                })
                .collect());
        }

        Err(StoreError::unknown(format!("unsupported statement: {sql}")))
    }
}

#[async_trait]
impl Connection for MemConn {
    async fn query(&self, sql: &str, params: &[SqlValue]) -> Result<Vec<Row>, StoreError> {
        self.apply(sql, params)
    }

    async fn execute(&self, sql: &str, params: &[SqlValue]) -> Result<u64, StoreError> {
        self.apply(sql, params)?;
        Ok(0)
    }

    async fn begin(&self) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().unwrap();
        if inner.depth == 0 {
            inner.snapshot = Some(inner.state.clone());
        }
        inner.depth += 1;
        Ok(())
    }

    async fn commit(&self) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().unwrap();
        inner.depth = inner.depth.saturating_sub(1);
        if inner.depth == 0 {
            inner.snapshot = None;
        }
        Ok(())
    }

    async fn rollback(&self) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().unwrap();
        inner.depth = 0;
        if let Some(snapshot) = inner.snapshot.take() {
            inner.state = snapshot;
        }
        Ok(())
    }
}

/// First quoted identifier in `s`, assuming the opening quote is consumed.
fn ident(s: &str) -> String {
    s.split('"').next().unwrap_or_default().to_string()
}

fn ident_list(s: &str) -> Vec<String> {
    s.split(", ").map(|c| c.trim_matches('"').to_string()).collect()
}

fn delete_matching(state: &mut State, table: &str, column: &str, value: &SqlValue) {
    let rows = match state.tables.get_mut(table) {
        Some(r) => r,
        None => return,
    };
    let mut removed = Vec::new();
    rows.retain(|r| {
        if r.get(column) == Some(value) {
            removed.push(r.clone());
            false
        } else {
            true
        }
    });
    let cascades: Vec<Cascade> = state
        .cascades
        .iter()
        .filter(|c| c.parent_table == table)
        .cloned()
        .collect();
    for row in removed {
        if let Some(id) = row.get("id") {
            let id = id.clone();
            for c in &cascades {
                delete_matching(state, &c.child_table, &c.column, &id);
            }
        }
    }
}

#[allow(dead_code)]
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("aggregate_store=debug")
        .try_init();
}
