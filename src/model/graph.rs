//! Graph analyzer: classifies every class reachable from the aggregate root
//! and orders them dependencies-first, failing on circular references.

use crate::error::ModelError;
use crate::model::types::{ClassDef, DomainModel, FieldType};
use crate::model::validator::validate;
use std::collections::{HashMap, HashSet};

/// How a class participates in persistence. Computed once, immutable.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TypeClassification {
    /// Identity-less; embedded as flattened columns in its owner.
    Value,
    /// Has identity, persisted in its own table, scoped to this aggregate.
    Entity,
    /// Transaction/consistency boundary; the root or a `foreign` ref target.
    AggregateRoot,
}

/// Analysis result threaded through the rest of the pipeline. Owns the model
/// so later stages resolve class metadata without re-walking the graph.
#[derive(Clone, Debug)]
pub struct AnalyzedGraph {
    model: DomainModel,
    /// Reachable classes, dependencies first (referenced before referencing).
    pub order: Vec<String>,
    pub classifications: HashMap<String, TypeClassification>,
}

impl AnalyzedGraph {
    pub fn model(&self) -> &DomainModel {
        &self.model
    }

    pub fn class(&self, name: &str) -> Option<&ClassDef> {
        self.model.class(name)
    }

    pub fn classification(&self, name: &str) -> Option<TypeClassification> {
        self.classifications.get(name).copied()
    }

    pub fn root_class(&self) -> Option<&ClassDef> {
        self.class(&self.model.root)
    }
}

/// Classify every class reachable from the root and compute dependency order.
///
/// Traversal is depth-first over field types. A reference marked `foreign`
/// crosses an aggregate boundary: its target is classified as an aggregate
/// root and not traversed into. Revisiting a class on the current path is a
/// cycle and fails generation; revisiting a finished class is memoized.
pub fn analyze(model: &DomainModel) -> Result<AnalyzedGraph, ModelError> {
    validate(model)?;

    let mut walker = Walker {
        model,
        path: Vec::new(),
        on_path: HashSet::new(),
        done: HashSet::new(),
        order: Vec::new(),
        foreign_targets: HashSet::new(),
    };
    walker.visit(&model.root)?;

    let mut classifications = HashMap::new();
    for name in &walker.order {
        let class = model.class(name).ok_or_else(|| undeclared(name))?;
        let kind = if *name == model.root || walker.foreign_targets.contains(name.as_str()) {
            TypeClassification::AggregateRoot
        } else if class.has_identity() {
            TypeClassification::Entity
        } else {
            TypeClassification::Value
        };
        classifications.insert(name.clone(), kind);
    }

    Ok(AnalyzedGraph {
        model: model.clone(),
        order: walker.order,
        classifications,
    })
}

struct Walker<'a> {
    model: &'a DomainModel,
    path: Vec<String>,
    on_path: HashSet<String>,
    done: HashSet<String>,
    order: Vec<String>,
    foreign_targets: HashSet<String>,
}

impl Walker<'_> {
    fn visit(&mut self, name: &str) -> Result<(), ModelError> {
        if self.done.contains(name) {
            return Ok(());
        }
        if self.on_path.contains(name) {
            let mut cycle: Vec<&str> = self
                .path
                .iter()
                .skip_while(|c| *c != name)
                .map(String::as_str)
                .collect();
            cycle.push(name);
            return Err(ModelError::CircularReference(cycle.join(" -> ")));
        }

        self.path.push(name.to_string());
        self.on_path.insert(name.to_string());

        let class = self.model.class(name).ok_or_else(|| undeclared(name))?;
        for field in &class.fields {
            if field.foreign {
                if let FieldType::Ref(target) = &field.ty {
                    self.foreign_targets.insert(target.clone());
                    // boundary: record the target, do not traverse its fields
                    if !self.done.contains(target.as_str()) && !self.on_path.contains(target.as_str())
                    {
                        self.done.insert(target.clone());
                        self.order.push(target.clone());
                    }
                }
                continue;
            }
            for target in referenced_classes(&field.ty) {
                self.visit(&target)?;
            }
        }

        self.path.pop();
        self.on_path.remove(name);
        self.done.insert(name.to_string());
        self.order.push(name.to_string());
        Ok(())
    }
}

fn undeclared(name: &str) -> ModelError {
    ModelError::Validation(format!("undeclared class '{name}'"))
}

fn referenced_classes(ty: &FieldType) -> Vec<String> {
    match ty {
        FieldType::Scalar(_) => vec![],
        FieldType::Ref(target) => vec![target.clone()],
        FieldType::List(inner) | FieldType::Set(inner) => referenced_classes(inner),
        FieldType::Map { value, .. } => referenced_classes(value),
    }
}
