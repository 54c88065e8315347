//! Collection analyzer: classifies list/set/map fields by container and
//! element kind, rejecting unsupported combinations at generation time.

use crate::error::ModelError;
use crate::model::graph::{AnalyzedGraph, TypeClassification};
use crate::model::types::{ClassDef, FieldType, ScalarType};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ContainerKind {
    List,
    Set,
    Map,
}

#[derive(Clone, Debug, PartialEq)]
pub enum ElementKind {
    /// Stored in a single `value` column via the type mapper.
    Primitive(ScalarType),
    /// Value-object class; flattened into the junction row.
    Value(String),
    /// Entity class; id and flattened fields inline in the junction row.
    Entity(String),
}

#[derive(Clone, Debug)]
pub struct CollectionInfo {
    pub field: String,
    pub container: ContainerKind,
    pub element: ElementKind,
    /// Map key type; None for lists and sets.
    pub key: Option<ScalarType>,
}

/// Classify every collection field declared on `class`.
pub fn analyze_collections(
    graph: &AnalyzedGraph,
    class: &ClassDef,
) -> Result<Vec<CollectionInfo>, ModelError> {
    let mut out = Vec::new();
    for field in &class.fields {
        let (container, element_ty, key) = match &field.ty {
            FieldType::List(inner) => (ContainerKind::List, inner.as_ref(), None),
            FieldType::Set(inner) => (ContainerKind::Set, inner.as_ref(), None),
            FieldType::Map { key, value } => (ContainerKind::Map, value.as_ref(), Some(*key)),
            _ => continue,
        };

        if let Some(key) = key {
            if matches!(key, ScalarType::Float | ScalarType::Bytes) {
                return Err(unsupported(class, field.name.as_str(), "map keys must have a canonical text encoding (float and bytes keys are not supported)"));
            }
        }

        let element = classify_element(graph, class, &field.name, element_ty)?;
        out.push(CollectionInfo {
            field: field.name.clone(),
            container,
            element,
            key,
        });
    }
    Ok(out)
}

fn classify_element(
    graph: &AnalyzedGraph,
    class: &ClassDef,
    field: &str,
    ty: &FieldType,
) -> Result<ElementKind, ModelError> {
    match ty {
        FieldType::Scalar(s) => Ok(ElementKind::Primitive(*s)),
        FieldType::Ref(target) => match graph.classification(target) {
            Some(TypeClassification::Value) => Ok(ElementKind::Value(target.clone())),
            Some(TypeClassification::Entity) => {
                check_entity_element(graph, class, field, target)?;
                Ok(ElementKind::Entity(target.clone()))
            }
            Some(TypeClassification::AggregateRoot) => Err(unsupported(
                class,
                field,
                "collections of aggregate references are not supported",
            )),
            None => Err(ModelError::UnknownClass {
                class: class.name.clone(),
                field: field.to_string(),
                target: target.clone(),
            }),
        },
        FieldType::List(_) | FieldType::Set(_) | FieldType::Map { .. } => Err(unsupported(
            class,
            field,
            "nested collections are not supported",
        )),
    }
}

/// Entity elements are stored inline in the junction row, so they may only
/// contain scalar and value-object fields.
fn check_entity_element(
    graph: &AnalyzedGraph,
    class: &ClassDef,
    field: &str,
    target: &str,
) -> Result<(), ModelError> {
    let element = graph.class(target).ok_or_else(|| ModelError::UnknownClass {
        class: class.name.clone(),
        field: field.to_string(),
        target: target.to_string(),
    })?;
    for f in &element.fields {
        let ok = match &f.ty {
            FieldType::Scalar(_) => true,
            FieldType::Ref(t) => graph.classification(t) == Some(TypeClassification::Value),
            _ => false,
        };
        if !ok {
            return Err(unsupported(
                class,
                field,
                &format!(
                    "element entity '{}' field '{}' must be a scalar or value object",
                    target, f.name
                ),
            ));
        }
    }
    Ok(())
}

fn unsupported(class: &ClassDef, field: &str, reason: &str) -> ModelError {
    ModelError::UnsupportedCollection {
        class: class.name.clone(),
        field: field.to_string(),
        reason: reason.to_string(),
    }
}
