//! Aggregate persistence: save, load, and delete whole object graphs
//! through generated SQL, each operation wrapped in a transaction.

use crate::codec::{
    self, encode, encode_map_key, flatten_value_object, unflatten_value_object, Row, SqlValue,
};
use crate::error::{ModelError, StoreError};
use crate::model::{
    ClassDef, ContainerKind, DomainModel, ElementKind, FieldType, ScalarType, TypeClassification,
};
use crate::schema::{AggregateSchema, ClassPlan, CollectionPlan, TableDefinition};
use crate::sql::{render, DeleteStmt, InsertStmt, SelectStmt, Stmt};
use crate::store::Connection;
use crate::typemap::Dialect;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value as JsonValue;
use std::collections::{HashMap, HashSet, VecDeque};
use std::future::Future;
use std::pin::Pin;
use uuid::Uuid;

/// Compiled store for one aggregate root. Construction runs the full
/// pipeline (validation, graph analysis, schema generation); the resulting
/// value is immutable and shareable.
#[derive(Debug)]
pub struct AggregateStore {
    schema: AggregateSchema,
    dialect: Dialect,
}

/// An object row waiting to be written, owner rows before child rows.
struct PendingSave {
    class: String,
    value: JsonValue,
    id: Uuid,
    /// Parent column and owner id on the object's table, if any.
    parent: Option<(String, Uuid)>,
}

impl AggregateStore {
    pub fn new(model: &DomainModel, dialect: Dialect) -> Result<Self, ModelError> {
        Ok(Self {
            schema: AggregateSchema::compile(model)?,
            dialect,
        })
    }

    pub fn schema(&self) -> &AggregateSchema {
        &self.schema
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    fn class_def(&self, name: &str) -> Result<&ClassDef, StoreError> {
        self.schema
            .graph
            .class(name)
            .ok_or_else(|| StoreError::Codec(format!("undeclared class '{name}'")))
    }

    fn root_plan(&self) -> Result<&ClassPlan, StoreError> {
        self.schema
            .root_plan()
            .ok_or_else(|| StoreError::Codec("schema has no root plan".to_string()))
    }

    /// Create every generated table, owners before dependents.
    pub async fn create_tables(&self, conn: &dyn Connection) -> Result<(), StoreError> {
        crate::migration::apply_schema(conn, &self.schema, self.dialect).await
    }

    /// Persist a typed aggregate. See [`save_value`](Self::save_value).
    pub async fn save<T: Serialize>(
        &self,
        conn: &dyn Connection,
        value: &T,
    ) -> Result<Uuid, StoreError> {
        let value = serde_json::to_value(value).map_err(|e| StoreError::Codec(e.to_string()))?;
        self.save_value(conn, &value).await
    }

    /// Persist an aggregate in its generic representation, replacing any
    /// existing state under the same root id. Returns the root id, freshly
    /// assigned when the input carries none.
    pub async fn save_value(
        &self,
        conn: &dyn Connection,
        value: &JsonValue,
    ) -> Result<Uuid, StoreError> {
        conn.begin().await?;
        match self.save_tree(conn, value).await {
            Ok(id) => {
                conn.commit().await?;
                Ok(id)
            }
            Err(e) => {
                let _ = conn.rollback().await;
                Err(e)
            }
        }
    }

    /// Load a typed aggregate. See [`get_value`](Self::get_value).
    pub async fn get_by_id<T: DeserializeOwned>(
        &self,
        conn: &dyn Connection,
        id: Uuid,
    ) -> Result<T, StoreError> {
        let value = self.get_value(conn, id).await?;
        serde_json::from_value(value).map_err(|e| StoreError::Codec(e.to_string()))
    }

    /// Reconstruct a whole aggregate from its rows. `NotFound` when no root
    /// row exists under `id`.
    pub async fn get_value(&self, conn: &dyn Connection, id: Uuid) -> Result<JsonValue, StoreError> {
        conn.begin().await?;
        match self.load_tree(conn, id).await {
            Ok(v) => {
                conn.commit().await?;
                Ok(v)
            }
            Err(e) => {
                let _ = conn.rollback().await;
                Err(e)
            }
        }
    }

    /// Delete an aggregate and everything it owns. Dependent rows go through
    /// the cascading foreign keys on the generated tables.
    pub async fn delete_by_id(&self, conn: &dyn Connection, id: Uuid) -> Result<(), StoreError> {
        conn.begin().await?;
        match self.delete_tree(conn, id).await {
            Ok(()) => {
                conn.commit().await?;
                Ok(())
            }
            Err(e) => {
                let _ = conn.rollback().await;
                Err(e)
            }
        }
    }

    async fn save_tree(&self, conn: &dyn Connection, value: &JsonValue) -> Result<Uuid, StoreError> {
        let root = value
            .as_object()
            .ok_or_else(|| StoreError::Codec(format!("expected aggregate object, got {value}")))?;
        let root_id = object_id(root)?.unwrap_or_else(Uuid::new_v4);
        let mut queue = VecDeque::from([PendingSave {
            class: self.schema.root.clone(),
            value: value.clone(),
            id: root_id,
            parent: None,
        }]);
        while let Some(pending) = queue.pop_front() {
            self.save_object(conn, pending, &mut queue).await?;
        }
        Ok(root_id)
    }

    async fn save_object(
        &self,
        conn: &dyn Connection,
        pending: PendingSave,
        queue: &mut VecDeque<PendingSave>,
    ) -> Result<(), StoreError> {
        let plan = self
            .schema
            .plan(&pending.class)
            .ok_or_else(|| StoreError::Codec(format!("no table for class '{}'", pending.class)))?;
        let class = self.class_def(&pending.class)?;
        let obj = pending.value.as_object().ok_or_else(|| {
            StoreError::Codec(format!(
                "expected object for class '{}', got {}",
                pending.class, pending.value
            ))
        })?;

        let mut values: HashMap<String, SqlValue> = HashMap::new();
        values.insert("id".to_string(), self.uuid_param(pending.id));
        if let Some((column, owner)) = &pending.parent {
            values.insert(column.clone(), self.uuid_param(*owner));
        }

        let mut children: Vec<PendingSave> = Vec::new();
        for field in &class.fields {
            if field.name == "id" || field.ty.is_collection() {
                continue;
            }
            let v = obj.get(&field.name).unwrap_or(&JsonValue::Null);
            if v.is_null() && !field.nullable {
                return Err(StoreError::Codec(format!(
                    "{}.{} must not be null",
                    pending.class, field.name
                )));
            }
            match &field.ty {
                FieldType::Scalar(s) => {
                    values.insert(field.column_name(), encode(v, *s, self.dialect)?);
                }
                FieldType::Ref(target) => match self.schema.graph.classification(target) {
                    Some(TypeClassification::Value) => {
                        let mut pairs = Vec::new();
                        flatten_value_object(
                            &self.schema.graph,
                            target,
                            &field.column_name(),
                            v,
                            self.dialect,
                            &mut pairs,
                        )?;
                        values.extend(pairs);
                    }
                    Some(TypeClassification::Entity) => {
                        let ef = plan
                            .entity_fields
                            .iter()
                            .find(|e| e.field == field.name)
                            .ok_or_else(|| {
                                StoreError::Codec(format!(
                                    "no entity field plan for '{}.{}'",
                                    pending.class, field.name
                                ))
                            })?;
                        if v.is_null() {
                            values.insert(ef.ref_column.clone(), SqlValue::Null);
                        } else {
                            let child = v.as_object().ok_or_else(|| {
                                StoreError::Codec(format!(
                                    "{}.{} expected object, got {v}",
                                    pending.class, field.name
                                ))
                            })?;
                            let child_id = object_id(child)?.unwrap_or_else(Uuid::new_v4);
                            values.insert(ef.ref_column.clone(), self.uuid_param(child_id));
                            children.push(PendingSave {
                                class: ef.class.clone(),
                                value: v.clone(),
                                id: child_id,
                                parent: Some((ef.parent_column.clone(), pending.id)),
                            });
                        }
                    }
                    Some(TypeClassification::AggregateRoot) => {
                        let column = format!("{}_id", field.column_name());
                        let id_value = match v {
                            JsonValue::Object(o) => o.get("id").cloned().unwrap_or(JsonValue::Null),
                            other => other.clone(),
                        };
                        values.insert(column, encode(&id_value, ScalarType::Uuid, self.dialect)?);
                    }
                    None => {
                        return Err(StoreError::Codec(format!(
                            "unknown class '{target}' referenced by {}.{}",
                            pending.class, field.name
                        )))
                    }
                },
                _ => unreachable!("collections skipped above"),
            }
        }

        // full replace: clear previously owned rows before rewriting them;
        // cascading keys take the grandchildren along
        let mut cleared: HashSet<&str> = HashSet::new();
        for ef in &plan.entity_fields {
            if cleared.insert(ef.table.as_str()) {
                let sql = render(
                    &Stmt::Delete(DeleteStmt {
                        table: ef.table.clone(),
                        filter: Some(ef.parent_column.clone()),
                    }),
                    self.dialect,
                );
                conn.execute(&sql, &[self.uuid_param(pending.id)]).await?;
            }
        }

        let sql = render(
            &Stmt::Insert(InsertStmt {
                table: plan.table.name.clone(),
                columns: insert_columns(&plan.table),
                upsert: true,
            }),
            self.dialect,
        );
        let params = insert_params(&plan.table, &mut values);
        conn.execute(&sql, &params).await?;

        queue.extend(children);

        for coll in &plan.collections {
            let items = obj.get(&coll.info.field).unwrap_or(&JsonValue::Null);
            self.save_collection(conn, coll, pending.id, items).await?;
        }
        Ok(())
    }

    async fn save_collection(
        &self,
        conn: &dyn Connection,
        coll: &CollectionPlan,
        parent: Uuid,
        items: &JsonValue,
    ) -> Result<(), StoreError> {
        let clear = render(
            &Stmt::Delete(DeleteStmt {
                table: coll.table.name.clone(),
                filter: Some(coll.parent_column.clone()),
            }),
            self.dialect,
        );
        conn.execute(&clear, &[self.uuid_param(parent)]).await?;

        let insert = render(
            &Stmt::Insert(InsertStmt {
                table: coll.table.name.clone(),
                columns: insert_columns(&coll.table),
                upsert: false,
            }),
            self.dialect,
        );

        match coll.info.container {
            ContainerKind::List => {
                let items = expect_array(items, &coll.info.field)?;
                for (i, item) in items.iter().enumerate() {
                    let mut values =
                        self.junction_values(coll, parent, item, Some(i as i64), None)?;
                    conn.execute(&insert, &insert_params(&coll.table, &mut values))
                        .await?;
                }
            }
            ContainerKind::Set => {
                let items = expect_array(items, &coll.info.field)?;
                // membership is by content, so duplicates collapse to one row
                let mut seen: Vec<Vec<SqlValue>> = Vec::new();
                for item in items {
                    let mut values = self.junction_values(coll, parent, item, None, None)?;
                    let key: Vec<SqlValue> = coll
                        .table
                        .columns
                        .iter()
                        .filter(|c| c.name != "id")
                        .map(|c| values.get(&c.name).cloned().unwrap_or(SqlValue::Null))
                        .collect();
                    if seen.contains(&key) {
                        continue;
                    }
                    seen.push(key);
                    conn.execute(&insert, &insert_params(&coll.table, &mut values))
                        .await?;
                }
            }
            ContainerKind::Map => {
                let entries = match items {
                    JsonValue::Null => return Ok(()),
                    JsonValue::Object(map) => map,
                    other => {
                        return Err(StoreError::Codec(format!(
                            "expected map for '{}', got {other}",
                            coll.info.field
                        )))
                    }
                };
                let key_ty = coll.info.key.ok_or_else(|| {
                    StoreError::Codec(format!(
                        "map collection '{}' has no key type",
                        coll.info.field
                    ))
                })?;
                let mut seen_keys = HashSet::new();
                for (key, item) in entries {
                    let canonical = encode_map_key(key, key_ty)?;
                    if !seen_keys.insert(canonical.clone()) {
                        return Err(StoreError::Codec(format!(
                            "duplicate map key '{canonical}' in '{}'",
                            coll.info.field
                        )));
                    }
                    let mut values =
                        self.junction_values(coll, parent, item, None, Some(canonical))?;
                    conn.execute(&insert, &insert_params(&coll.table, &mut values))
                        .await?;
                }
            }
        }
        Ok(())
    }

    /// Column values for one junction row, keyed by column name. The row id
    /// is the element's own id for entity elements, synthetic otherwise.
    fn junction_values(
        &self,
        coll: &CollectionPlan,
        parent: Uuid,
        item: &JsonValue,
        position: Option<i64>,
        map_key: Option<String>,
    ) -> Result<HashMap<String, SqlValue>, StoreError> {
        let mut values = HashMap::new();
        values.insert(coll.parent_column.clone(), self.uuid_param(parent));
        if let Some(i) = position {
            values.insert("position".to_string(), SqlValue::I64(i));
        }
        if let Some(k) = map_key {
            values.insert("map_key".to_string(), SqlValue::Text(k));
        }
        let row_id = match &coll.info.element {
            ElementKind::Primitive(s) => {
                values.insert("value".to_string(), encode(item, *s, self.dialect)?);
                Uuid::new_v4()
            }
            ElementKind::Value(class) => {
                self.element_values(class, item, &mut values)?;
                Uuid::new_v4()
            }
            ElementKind::Entity(class) => {
                let obj = item.as_object().ok_or_else(|| {
                    StoreError::Codec(format!(
                        "'{}' element must be an object, got {item}",
                        coll.info.field
                    ))
                })?;
                let id = object_id(obj)?.unwrap_or_else(Uuid::new_v4);
                self.element_values(class, item, &mut values)?;
                id
            }
        };
        values.insert("id".to_string(), self.uuid_param(row_id));
        Ok(values)
    }

    /// Inline an element object's fields into junction columns, unprefixed
    /// at the top level.
    fn element_values(
        &self,
        class: &str,
        item: &JsonValue,
        values: &mut HashMap<String, SqlValue>,
    ) -> Result<(), StoreError> {
        let def = self.class_def(class)?;
        for field in &def.fields {
            if field.name == "id" {
                continue;
            }
            let v = match item {
                JsonValue::Null => &JsonValue::Null,
                JsonValue::Object(map) => map.get(&field.name).unwrap_or(&JsonValue::Null),
                other => {
                    return Err(StoreError::Codec(format!(
                        "expected object for class '{class}', got {other}"
                    )))
                }
            };
            match &field.ty {
                FieldType::Scalar(s) => {
                    values.insert(field.column_name(), encode(v, *s, self.dialect)?);
                }
                FieldType::Ref(target) => {
                    let mut pairs = Vec::new();
                    flatten_value_object(
                        &self.schema.graph,
                        target,
                        &field.column_name(),
                        v,
                        self.dialect,
                        &mut pairs,
                    )?;
                    values.extend(pairs);
                }
                other => {
                    return Err(StoreError::Codec(format!(
                        "class '{class}' field '{}' has unsupported element type {other:?}",
                        field.name
                    )))
                }
            }
        }
        Ok(())
    }

    async fn load_tree(&self, conn: &dyn Connection, id: Uuid) -> Result<JsonValue, StoreError> {
        let plan = self.root_plan()?;
        let row = self
            .fetch_row(conn, &plan.table, id)
            .await?
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        self.load_object(conn, &self.schema.root, row).await
    }

    /// Reassemble one object from its row, following to-one entity columns
    /// and junction tables. Boxed because entities nest.
    fn load_object<'a>(
        &'a self,
        conn: &'a dyn Connection,
        class: &'a str,
        row: Row,
    ) -> Pin<Box<dyn Future<Output = Result<JsonValue, StoreError>> + Send + 'a>> {
        Box::pin(async move {
            let plan = self
                .schema
                .plan(class)
                .ok_or_else(|| StoreError::Codec(format!("no table for class '{class}'")))?;
            let def = self.class_def(class)?;
            let mut obj = serde_json::Map::new();
            for field in &def.fields {
                if field.ty.is_collection() {
                    continue;
                }
                let value = match &field.ty {
                    FieldType::Scalar(s) => codec::decode(
                        row.get(&field.column_name()).unwrap_or(&SqlValue::Null),
                        *s,
                    )?,
                    FieldType::Ref(target) => {
                        match self.schema.graph.classification(target) {
                            Some(TypeClassification::Value) => unflatten_value_object(
                                &self.schema.graph,
                                target,
                                &field.column_name(),
                                &row,
                            )?,
                            Some(TypeClassification::Entity) => {
                                let ef = plan
                                    .entity_fields
                                    .iter()
                                    .find(|e| e.field == field.name)
                                    .ok_or_else(|| {
                                        StoreError::Codec(format!(
                                            "no entity field plan for '{}.{}'",
                                            class, field.name
                                        ))
                                    })?;
                                let child_id = uuid_from_sql(
                                    row.get(&ef.ref_column).unwrap_or(&SqlValue::Null),
                                )?;
                                match child_id {
                                    None => JsonValue::Null,
                                    Some(cid) => {
                                        let child_plan =
                                            self.schema.plan(&ef.class).ok_or_else(|| {
                                                StoreError::Codec(format!(
                                                    "no table for class '{}'",
                                                    ef.class
                                                ))
                                            })?;
                                        match self
                                            .fetch_row(conn, &child_plan.table, cid)
                                            .await?
                                        {
                                            Some(child_row) => {
                                                self.load_object(conn, &ef.class, child_row)
                                                    .await?
                                            }
                                            None => JsonValue::Null,
                                        }
                                    }
                                }
                            }
                            Some(TypeClassification::AggregateRoot) => codec::decode(
                                row.get(&format!("{}_id", field.column_name()))
                                    .unwrap_or(&SqlValue::Null),
                                ScalarType::Uuid,
                            )?,
                            None => {
                                return Err(StoreError::Codec(format!(
                                    "unknown class '{target}' referenced by {class}.{}",
                                    field.name
                                )))
                            }
                        }
                    }
                    _ => unreachable!("collections skipped above"),
                };
                obj.insert(field.name.clone(), value);
            }

            if !plan.collections.is_empty() {
                let own_id = uuid_from_sql(row.get("id").unwrap_or(&SqlValue::Null))?
                    .ok_or_else(|| StoreError::Codec("row is missing its id".to_string()))?;
                for coll in &plan.collections {
                    let value = self.load_collection(conn, coll, own_id).await?;
                    obj.insert(coll.info.field.clone(), value);
                }
            }
            Ok(JsonValue::Object(obj))
        })
    }

    async fn load_collection(
        &self,
        conn: &dyn Connection,
        coll: &CollectionPlan,
        parent: Uuid,
    ) -> Result<JsonValue, StoreError> {
        let order_by = match coll.info.container {
            ContainerKind::List => Some("position".to_string()),
            _ => None,
        };
        let sql = render(
            &Stmt::Select(SelectStmt {
                table: coll.table.name.clone(),
                columns: coll.table.column_names(),
                filter: Some(coll.parent_column.clone()),
                order_by,
            }),
            self.dialect,
        );
        let rows = conn.query(&sql, &[self.uuid_param(parent)]).await?;

        match coll.info.container {
            ContainerKind::List | ContainerKind::Set => {
                let mut out = Vec::with_capacity(rows.len());
                for row in &rows {
                    out.push(self.element_value(coll, row)?);
                }
                Ok(JsonValue::Array(out))
            }
            ContainerKind::Map => {
                let mut out = serde_json::Map::new();
                for row in &rows {
                    let key = match row.get("map_key") {
                        Some(SqlValue::Text(k)) => k.clone(),
                        other => {
                            return Err(StoreError::Codec(format!(
                                "junction row has no text map key: {other:?}"
                            )))
                        }
                    };
                    out.insert(key, self.element_value(coll, row)?);
                }
                Ok(JsonValue::Object(out))
            }
        }
    }

    fn element_value(&self, coll: &CollectionPlan, row: &Row) -> Result<JsonValue, StoreError> {
        match &coll.info.element {
            ElementKind::Primitive(s) => {
                codec::decode(row.get("value").unwrap_or(&SqlValue::Null), *s)
            }
            ElementKind::Value(class) => self.element_object(class, row, false),
            ElementKind::Entity(class) => self.element_object(class, row, true),
        }
    }

    /// Rebuild an inlined element from a junction row. Value elements whose
    /// columns are all null come back as null.
    fn element_object(
        &self,
        class: &str,
        row: &Row,
        with_id: bool,
    ) -> Result<JsonValue, StoreError> {
        let def = self.class_def(class)?;
        let mut obj = serde_json::Map::new();
        let mut all_null = true;
        for field in &def.fields {
            let value = if field.name == "id" {
                if !with_id {
                    continue;
                }
                codec::decode(row.get("id").unwrap_or(&SqlValue::Null), ScalarType::Uuid)?
            } else {
                match &field.ty {
                    FieldType::Scalar(s) => codec::decode(
                        row.get(&field.column_name()).unwrap_or(&SqlValue::Null),
                        *s,
                    )?,
                    FieldType::Ref(target) => unflatten_value_object(
                        &self.schema.graph,
                        target,
                        &field.column_name(),
                        row,
                    )?,
                    other => {
                        return Err(StoreError::Codec(format!(
                            "class '{class}' field '{}' has unsupported element type {other:?}",
                            field.name
                        )))
                    }
                }
            };
            if !value.is_null() {
                all_null = false;
            }
            obj.insert(field.name.clone(), value);
        }
        if !with_id && all_null {
            return Ok(JsonValue::Null);
        }
        Ok(JsonValue::Object(obj))
    }

    async fn delete_tree(&self, conn: &dyn Connection, id: Uuid) -> Result<(), StoreError> {
        let plan = self.root_plan()?;
        if self.fetch_row(conn, &plan.table, id).await?.is_none() {
            return Err(StoreError::NotFound(id.to_string()));
        }
        let sql = render(
            &Stmt::Delete(DeleteStmt {
                table: plan.table.name.clone(),
                filter: Some("id".to_string()),
            }),
            self.dialect,
        );
        conn.execute(&sql, &[self.uuid_param(id)]).await?;
        Ok(())
    }

    async fn fetch_row(
        &self,
        conn: &dyn Connection,
        table: &TableDefinition,
        id: Uuid,
    ) -> Result<Option<Row>, StoreError> {
        let sql = render(
            &Stmt::Select(SelectStmt {
                table: table.name.clone(),
                columns: table.column_names(),
                filter: Some("id".to_string()),
                order_by: None,
            }),
            self.dialect,
        );
        let rows = conn.query(&sql, &[self.uuid_param(id)]).await?;
        Ok(rows.into_iter().next())
    }

    fn uuid_param(&self, id: Uuid) -> SqlValue {
        match self.dialect {
            Dialect::Postgres => SqlValue::Uuid(id),
            Dialect::Sqlite => SqlValue::Bytes(id.as_bytes().to_vec()),
        }
    }
}

/// Explicit id on an object in the generic representation, if present.
fn object_id(obj: &serde_json::Map<String, JsonValue>) -> Result<Option<Uuid>, StoreError> {
    match obj.get("id") {
        None | Some(JsonValue::Null) => Ok(None),
        Some(JsonValue::String(s)) => Uuid::parse_str(s)
            .map(Some)
            .map_err(|e| StoreError::Codec(format!("invalid id '{s}': {e}"))),
        Some(other) => Err(StoreError::Codec(format!(
            "id must be a uuid string, got {other}"
        ))),
    }
}

fn uuid_from_sql(value: &SqlValue) -> Result<Option<Uuid>, StoreError> {
    match value {
        SqlValue::Null => Ok(None),
        SqlValue::Uuid(u) => Ok(Some(*u)),
        SqlValue::Bytes(b) => Uuid::from_slice(b)
            .map(Some)
            .map_err(|e| StoreError::Codec(format!("invalid uuid bytes: {e}"))),
        SqlValue::Text(s) => Uuid::parse_str(s)
            .map(Some)
            .map_err(|e| StoreError::Codec(format!("invalid uuid '{s}': {e}"))),
        other => Err(StoreError::Codec(format!(
            "cannot read uuid from {other:?}"
        ))),
    }
}

fn expect_array<'a>(
    items: &'a JsonValue,
    field: &str,
) -> Result<&'a Vec<JsonValue>, StoreError> {
    static EMPTY: Vec<JsonValue> = Vec::new();
    match items {
        JsonValue::Null => Ok(&EMPTY),
        JsonValue::Array(a) => Ok(a),
        other => Err(StoreError::Codec(format!(
            "expected array for '{field}', got {other}"
        ))),
    }
}

fn insert_columns(table: &TableDefinition) -> Vec<(String, ScalarType)> {
    table
        .columns
        .iter()
        .map(|c| (c.name.clone(), c.source_type))
        .collect()
}

fn insert_params(table: &TableDefinition, values: &mut HashMap<String, SqlValue>) -> Vec<SqlValue> {
    table
        .columns
        .iter()
        .map(|c| values.remove(&c.name).unwrap_or(SqlValue::Null))
        .collect()
}
