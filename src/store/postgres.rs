//! `Connection` backed by a sqlx PostgreSQL pool.

use crate::codec::{Row, SqlValue};
use crate::error::StoreError;
use crate::store::Connection;
use async_trait::async_trait;
use sqlx::encode::{Encode, IsNull};
use sqlx::postgres::{PgRow, PgTypeInfo};
use sqlx::{Database, PgPool, Postgres, Transaction};
use tokio::sync::Mutex;

#[derive(Default)]
struct TxState {
    tx: Option<Transaction<'static, sqlx::Postgres>>,
    depth: u32,
}

/// A pooled Postgres connection with one logical transaction slot.
///
/// Transaction state is shared across everything issued through this value,
/// so one `PostgresConnection` serves one logical operation at a time. For
/// concurrent operations, give each task its own instance over a cloned
/// [`PgPool`]; the pool itself multiplexes fine.
pub struct PostgresConnection {
    pool: PgPool,
    state: Mutex<TxState>,
}

impl PostgresConnection {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            state: Mutex::new(TxState::default()),
        }
    }

    pub async fn connect(url: &str) -> Result<Self, StoreError> {
        let pool = PgPool::connect(url).await?;
        Ok(Self::new(pool))
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl Connection for PostgresConnection {
    async fn query(&self, sql: &str, params: &[SqlValue]) -> Result<Vec<Row>, StoreError> {
        tracing::debug!(sql = %sql, params = ?params, "query");
        let mut query = sqlx::query(sql);
        for p in params {
            query = query.bind(p.clone());
        }
        let mut state = self.state.lock().await;
        let rows = match state.tx.as_mut() {
            Some(tx) => query.fetch_all(&mut **tx).await?,
            None => query.fetch_all(&self.pool).await?,
        };
        Ok(rows.iter().map(row_to_values).collect())
    }

    async fn execute(&self, sql: &str, params: &[SqlValue]) -> Result<u64, StoreError> {
        tracing::debug!(sql = %sql, params = ?params, "execute");
        let mut query = sqlx::query(sql);
        for p in params {
            query = query.bind(p.clone());
        }
        let mut state = self.state.lock().await;
        let result = match state.tx.as_mut() {
            Some(tx) => query.execute(&mut **tx).await?,
            None => query.execute(&self.pool).await?,
        };
        Ok(result.rows_affected())
    }

    async fn begin(&self) -> Result<(), StoreError> {
        let mut state = self.state.lock().await;
        if state.depth == 0 {
            state.tx = Some(self.pool.begin().await?);
        }
        state.depth += 1;
        Ok(())
    }

    async fn commit(&self) -> Result<(), StoreError> {
        let mut state = self.state.lock().await;
        if state.depth == 0 {
            return Ok(());
        }
        state.depth -= 1;
        if state.depth == 0 {
            if let Some(tx) = state.tx.take() {
                tx.commit().await?;
            }
        }
        Ok(())
    }

    async fn rollback(&self) -> Result<(), StoreError> {
        let mut state = self.state.lock().await;
        state.depth = 0;
        if let Some(tx) = state.tx.take() {
            tx.rollback().await?;
        }
        Ok(())
    }
}

impl<'q> Encode<'q, sqlx::Postgres> for SqlValue {
    fn encode_by_ref(
        &self,
        buf: &mut <Postgres as Database>::ArgumentBuffer<'q>,
    ) -> Result<IsNull, Box<dyn std::error::Error + Send + Sync>> {
        Ok(match self {
            SqlValue::Null => IsNull::Yes,
            SqlValue::Bool(b) => <bool as Encode<Postgres>>::encode_by_ref(b, buf)?,
            SqlValue::I64(n) => <i64 as Encode<Postgres>>::encode_by_ref(n, buf)?,
            SqlValue::F64(n) => <f64 as Encode<Postgres>>::encode_by_ref(n, buf)?,
            SqlValue::Text(s) => {
                let s_ref: &str = s.as_str();
                <&str as Encode<Postgres>>::encode_by_ref(&s_ref, buf)?
            }
            SqlValue::Uuid(u) => <uuid::Uuid as Encode<Postgres>>::encode_by_ref(u, buf)?,
            SqlValue::Timestamp(dt) => {
                <chrono::DateTime<chrono::Utc> as Encode<Postgres>>::encode_by_ref(dt, buf)?
            }
            SqlValue::Bytes(b) => <Vec<u8> as Encode<Postgres>>::encode_by_ref(b, buf)?,
        })
    }

    fn produces(&self) -> Option<PgTypeInfo> {
        Some(match self {
            SqlValue::Null => PgTypeInfo::with_name("TEXT"),
            SqlValue::Bool(_) => PgTypeInfo::with_name("BOOL"),
            SqlValue::I64(_) => PgTypeInfo::with_name("INT8"),
            SqlValue::F64(_) => PgTypeInfo::with_name("FLOAT8"),
            SqlValue::Text(_) => PgTypeInfo::with_name("TEXT"),
            SqlValue::Uuid(_) => PgTypeInfo::with_name("UUID"),
            SqlValue::Timestamp(_) => PgTypeInfo::with_name("TIMESTAMPTZ"),
            SqlValue::Bytes(_) => PgTypeInfo::with_name("BYTEA"),
        })
    }
}

impl sqlx::Type<Postgres> for SqlValue {
    fn type_info() -> PgTypeInfo {
        PgTypeInfo::with_name("TEXT")
    }
}

fn row_to_values(row: &PgRow) -> Row {
    use sqlx::Column;
    use sqlx::Row as _;
    let mut out = Row::new();
    for col in row.columns() {
        let name = col.name();
        out.insert(name.to_string(), cell_to_value(row, name));
    }
    out
}

fn cell_to_value(row: &PgRow, name: &str) -> SqlValue {
    use sqlx::Row as _;
    if let Ok(v) = row.try_get::<Option<uuid::Uuid>, _>(name) {
        return match v {
            Some(u) => SqlValue::Uuid(u),
            None => SqlValue::Null,
        };
    }
    if let Ok(v) = row.try_get::<Option<bool>, _>(name) {
        return match v {
            Some(b) => SqlValue::Bool(b),
            None => SqlValue::Null,
        };
    }
    if let Ok(v) = row.try_get::<Option<i32>, _>(name) {
        return match v {
            Some(n) => SqlValue::I64(n as i64),
            None => SqlValue::Null,
        };
    }
    if let Ok(v) = row.try_get::<Option<i64>, _>(name) {
        return match v {
            Some(n) => SqlValue::I64(n),
            None => SqlValue::Null,
        };
    }
    if let Ok(v) = row.try_get::<Option<f64>, _>(name) {
        return match v {
            Some(n) => SqlValue::F64(n),
            None => SqlValue::Null,
        };
    }
    if let Ok(v) = row.try_get::<Option<chrono::DateTime<chrono::Utc>>, _>(name) {
        return match v {
            Some(dt) => SqlValue::Timestamp(dt),
            None => SqlValue::Null,
        };
    }
    if let Ok(v) = row.try_get::<Option<String>, _>(name) {
        return match v {
            Some(s) => SqlValue::Text(s),
            None => SqlValue::Null,
        };
    }
    if let Ok(v) = row.try_get::<Option<Vec<u8>>, _>(name) {
        return match v {
            Some(b) => SqlValue::Bytes(b),
            None => SqlValue::Null,
        };
    }
    SqlValue::Null
}
