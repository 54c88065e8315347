//! Model validation: referential integrity before any analysis runs.

use crate::error::ModelError;
use crate::model::types::{ClassDef, DomainModel, FieldDef, FieldType};
use std::collections::HashSet;

/// Validate the raw model: unique class/field names, a declared root with
/// identity, and every reference resolving to a declared class.
pub fn validate(model: &DomainModel) -> Result<(), ModelError> {
    let mut class_names = HashSet::new();
    for c in &model.classes {
        if !class_names.insert(c.name.as_str()) {
            return Err(ModelError::DuplicateClass(c.name.clone()));
        }
    }

    let root = model
        .root_class()
        .ok_or_else(|| ModelError::MissingRoot(model.root.clone()))?;
    if !root.has_identity() {
        return Err(ModelError::RootWithoutIdentity(root.name.clone()));
    }

    for c in &model.classes {
        let mut field_names = HashSet::new();
        for f in &c.fields {
            if !field_names.insert(f.name.as_str()) {
                return Err(ModelError::DuplicateField {
                    class: c.name.clone(),
                    field: f.name.clone(),
                });
            }
            check_field(model, c, f)?;
        }
    }
    Ok(())
}

fn check_field(model: &DomainModel, class: &ClassDef, field: &FieldDef) -> Result<(), ModelError> {
    check_type(model, class, field, &field.ty)?;
    if field.foreign {
        let target = match &field.ty {
            FieldType::Ref(t) => model.class(t),
            _ => {
                return Err(ModelError::InvalidReference {
                    class: class.name.clone(),
                    field: field.name.clone(),
                    reason: "'foreign' is only valid on a to-one class reference".into(),
                })
            }
        };
        // resolution already checked by check_type
        if let Some(target) = target {
            if !target.has_identity() {
                return Err(ModelError::InvalidReference {
                    class: class.name.clone(),
                    field: field.name.clone(),
                    reason: format!(
                        "foreign reference target '{}' has no identity field",
                        target.name
                    ),
                });
            }
        }
    }
    Ok(())
}

fn check_type(
    model: &DomainModel,
    class: &ClassDef,
    field: &FieldDef,
    ty: &FieldType,
) -> Result<(), ModelError> {
    match ty {
        FieldType::Scalar(_) => Ok(()),
        FieldType::Ref(target) => {
            if model.class(target).is_none() {
                return Err(ModelError::UnknownClass {
                    class: class.name.clone(),
                    field: field.name.clone(),
                    target: target.clone(),
                });
            }
            Ok(())
        }
        FieldType::List(inner) | FieldType::Set(inner) => check_type(model, class, field, inner),
        FieldType::Map { value, .. } => check_type(model, class, field, value),
    }
}
