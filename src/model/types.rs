//! Declarative domain model input: classes, fields, and field types.

use crate::case::to_snake_case;
use crate::error::ModelError;
use serde::Deserialize;

/// Scalar source types supported by the type mapper.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScalarType {
    Uuid,
    Text,
    Int,
    BigInt,
    Float,
    Bool,
    Timestamp,
    Bytes,
}

/// Declared type of a field: a scalar, a reference to another class, or a
/// collection. References are classified (value / entity / aggregate root)
/// by the graph analyzer, not declared here.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    Scalar(ScalarType),
    Ref(String),
    List(Box<FieldType>),
    Set(Box<FieldType>),
    Map {
        key: ScalarType,
        value: Box<FieldType>,
    },
}

impl FieldType {
    pub fn is_collection(&self) -> bool {
        matches!(
            self,
            FieldType::List(_) | FieldType::Set(_) | FieldType::Map { .. }
        )
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct FieldDef {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: FieldType,
    #[serde(default)]
    pub nullable: bool,
    /// Marks a to-one reference as crossing into another aggregate. The
    /// target is classified as an aggregate root and the generated foreign
    /// key restricts deletes instead of cascading.
    #[serde(default)]
    pub foreign: bool,
}

impl FieldDef {
    /// Column name (or column prefix for embedded values) for this field.
    /// Field names pass through verbatim; only class names are case-mapped.
    pub fn column_name(&self) -> String {
        self.name.clone()
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct ClassDef {
    pub name: String,
    /// Declared table name override; defaults to snake_case of the class name.
    #[serde(default)]
    pub table: Option<String>,
    pub fields: Vec<FieldDef>,
}

impl ClassDef {
    /// A class has identity iff it declares an `id` field of identifier type.
    pub fn has_identity(&self) -> bool {
        self.fields
            .iter()
            .any(|f| f.name == "id" && f.ty == FieldType::Scalar(ScalarType::Uuid))
    }

    pub fn table_name(&self) -> String {
        self.table
            .clone()
            .unwrap_or_else(|| to_snake_case(&self.name))
    }

    /// Owner prefix for junction table and parent column naming. Derived from
    /// the class name, not the table override, so overrides do not ripple
    /// into child table names.
    pub fn owner_prefix(&self) -> String {
        to_snake_case(&self.name)
    }

    pub fn field(&self, name: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// A full aggregate definition: the root class plus every class it references.
#[derive(Clone, Debug, Deserialize)]
pub struct DomainModel {
    pub root: String,
    pub classes: Vec<ClassDef>,
}

impl DomainModel {
    pub fn from_json(s: &str) -> Result<Self, ModelError> {
        serde_json::from_str(s).map_err(|e| ModelError::Load(e.to_string()))
    }

    pub fn class(&self, name: &str) -> Option<&ClassDef> {
        self.classes.iter().find(|c| c.name == name)
    }

    pub fn root_class(&self) -> Option<&ClassDef> {
        self.class(&self.root)
    }
}
