//! Schema builder: combines graph and collection analysis into table
//! definitions, junction tables, and per-class persistence plans.

use crate::error::ModelError;
use crate::model::{
    analyze, analyze_collections, AnalyzedGraph, ClassDef, CollectionInfo, ContainerKind,
    DomainModel, ElementKind, FieldType, ScalarType, TypeClassification,
};
use crate::schema::types::{ColumnDefinition, ForeignKeyDefinition, TableDefinition};
use crate::sql::CascadeAction;
use std::collections::VecDeque;

/// A to-one entity reference field on a table-owning class.
#[derive(Clone, Debug)]
pub struct EntityFieldPlan {
    /// Field name on the owner, as it appears in the generic representation.
    pub field: String,
    /// Entity class name.
    pub class: String,
    /// Entity table name.
    pub table: String,
    /// `{field}_id` column on the owner row.
    pub ref_column: String,
    /// `{ownerPrefix}_id` parent column on the entity table.
    pub parent_column: String,
}

/// A declared collection field on the aggregate root.
#[derive(Clone, Debug)]
pub struct CollectionPlan {
    pub info: CollectionInfo,
    pub table: TableDefinition,
    /// `{ownerPrefix}_id` parent column on the junction table.
    pub parent_column: String,
}

/// Everything needed to persist one class: its table plus its dependent
/// entity fields and (for the root) collection fields.
#[derive(Clone, Debug)]
pub struct ClassPlan {
    pub class: String,
    pub table: TableDefinition,
    pub entity_fields: Vec<EntityFieldPlan>,
    pub collections: Vec<CollectionPlan>,
}

/// The compiled persistence unit for one aggregate root.
#[derive(Clone, Debug)]
pub struct AggregateSchema {
    pub graph: AnalyzedGraph,
    pub root: String,
    /// Class plans in creation order: owners before the entities that
    /// reference them.
    pub plans: Vec<ClassPlan>,
}

impl AggregateSchema {
    /// Analyze a model and build its schema in one step.
    pub fn compile(model: &DomainModel) -> Result<Self, ModelError> {
        build_schema(analyze(model)?)
    }

    pub fn plan(&self, class: &str) -> Option<&ClassPlan> {
        self.plans.iter().find(|p| p.class == class)
    }

    pub fn root_plan(&self) -> Option<&ClassPlan> {
        self.plan(&self.root)
    }

    /// All tables in creation order (referenced before referencing), junction
    /// tables last.
    pub fn tables(&self) -> Vec<&TableDefinition> {
        let mut out: Vec<&TableDefinition> = self.plans.iter().map(|p| &p.table).collect();
        for p in &self.plans {
            out.extend(p.collections.iter().map(|c| &c.table));
        }
        out
    }
}

fn class_of<'a>(graph: &'a AnalyzedGraph, name: &str) -> Result<&'a ClassDef, ModelError> {
    graph
        .class(name)
        .ok_or_else(|| ModelError::Validation(format!("undeclared class '{name}'")))
}

/// Build table definitions and persistence plans from an analyzed graph.
pub fn build_schema(graph: AnalyzedGraph) -> Result<AggregateSchema, ModelError> {
    let root_name = graph.model().root.clone();

    // Classes that own a table: the root plus entities reachable through
    // to-one references. Entities only reachable as collection elements are
    // stored inline in junction rows and get no standalone table.
    let mut table_classes: Vec<String> = Vec::new();
    let mut queue = VecDeque::from([root_name.clone()]);
    while let Some(name) = queue.pop_front() {
        if table_classes.contains(&name) {
            continue;
        }
        table_classes.push(name.clone());
        let class = class_of(&graph, &name)?;
        for f in &class.fields {
            if f.foreign {
                continue;
            }
            if let FieldType::Ref(target) = &f.ty {
                if graph.classification(target) == Some(TypeClassification::Entity) {
                    queue.push_back(target.clone());
                }
            }
        }
    }

    let mut plans: Vec<ClassPlan> = Vec::new();
    for name in &table_classes {
        let class = class_of(&graph, name)?;
        let is_root = *name == root_name;
        let (table, entity_fields) = build_class_table(&graph, class, is_root)?;
        plans.push(ClassPlan {
            class: name.clone(),
            table,
            entity_fields,
            collections: Vec::new(),
        });
    }

    // Parent foreign keys: each entity table referenced to-one gets a
    // `{ownerPrefix}_id` column cascading from its owner (added once even
    // when one entity type backs several fields).
    let all_entity_fields: Vec<(String, EntityFieldPlan)> = plans
        .iter()
        .flat_map(|p| {
            p.entity_fields
                .iter()
                .map(|ef| (p.class.clone(), ef.clone()))
        })
        .collect();
    for (owner, ef) in &all_entity_fields {
        let owner_table = class_of(&graph, owner)?.table_name();
        let child = plans
            .iter_mut()
            .find(|p| p.class == ef.class)
            .ok_or_else(|| {
                ModelError::Validation(format!("entity '{}' has no table plan", ef.class))
            })?;
        if child.table.column(&ef.parent_column).is_none() {
            child.table.columns.push(ColumnDefinition {
                name: ef.parent_column.clone(),
                source_type: ScalarType::Uuid,
                nullable: true,
                primary_key: false,
                foreign_key: true,
            });
            child.table.foreign_keys.push(ForeignKeyDefinition {
                column: ef.parent_column.clone(),
                references_table: owner_table,
                references_column: "id".to_string(),
                on_delete: CascadeAction::Cascade,
            });
        }
    }

    // Junction tables for the root's declared collection fields.
    let root_class = class_of(&graph, &root_name)?.clone();
    let infos = analyze_collections(&graph, &root_class)?;
    let mut collection_plans = Vec::new();
    for info in infos {
        let table = build_junction_table(&graph, &root_class, &info)?;
        collection_plans.push(CollectionPlan {
            parent_column: format!("{}_id", root_class.owner_prefix()),
            info,
            table,
        });
    }
    plans
        .iter_mut()
        .find(|p| p.class == root_name)
        .ok_or_else(|| ModelError::Validation(format!("root '{root_name}' has no table plan")))?
        .collections = collection_plans;

    Ok(AggregateSchema {
        graph,
        root: root_name,
        plans,
    })
}

fn build_class_table(
    graph: &AnalyzedGraph,
    class: &ClassDef,
    is_root: bool,
) -> Result<(TableDefinition, Vec<EntityFieldPlan>), ModelError> {
    let mut columns = vec![ColumnDefinition {
        name: "id".to_string(),
        source_type: ScalarType::Uuid,
        nullable: false,
        primary_key: true,
        foreign_key: false,
    }];
    let mut foreign_keys = Vec::new();
    let mut entity_fields = Vec::new();

    for f in &class.fields {
        if f.name == "id" {
            continue;
        }
        if f.ty.is_collection() {
            if !is_root {
                return Err(ModelError::UnsupportedCollection {
                    class: class.name.clone(),
                    field: f.name.clone(),
                    reason: "collection fields are only supported on the aggregate root".into(),
                });
            }
            continue; // junction table, not a column
        }
        match &f.ty {
            FieldType::Scalar(s) => columns.push(ColumnDefinition {
                name: f.column_name(),
                source_type: *s,
                nullable: f.nullable,
                primary_key: false,
                foreign_key: false,
            }),
            FieldType::Ref(target) => match graph.classification(target) {
                Some(TypeClassification::Value) => {
                    push_value_columns(graph, target, &f.column_name(), f.nullable, &mut columns)?
                }
                Some(TypeClassification::Entity) => {
                    let ref_column = format!("{}_id", f.column_name());
                    columns.push(ColumnDefinition {
                        name: ref_column.clone(),
                        source_type: ScalarType::Uuid,
                        nullable: f.nullable,
                        primary_key: false,
                        foreign_key: true,
                    });
                    // integrity and cascade are enforced through the parent
                    // column on the entity table, keeping DDL acyclic
                    entity_fields.push(EntityFieldPlan {
                        field: f.name.clone(),
                        class: target.clone(),
                        table: class_of(graph, target)?.table_name(),
                        ref_column,
                        parent_column: format!("{}_id", class.owner_prefix()),
                    });
                }
                Some(TypeClassification::AggregateRoot) => {
                    let ref_column = format!("{}_id", f.column_name());
                    columns.push(ColumnDefinition {
                        name: ref_column.clone(),
                        source_type: ScalarType::Uuid,
                        nullable: f.nullable,
                        primary_key: false,
                        foreign_key: true,
                    });
                    foreign_keys.push(ForeignKeyDefinition {
                        column: ref_column,
                        references_table: class_of(graph, target)?.table_name(),
                        references_column: "id".to_string(),
                        on_delete: CascadeAction::Restrict,
                    });
                }
                None => {
                    return Err(ModelError::UnknownClass {
                        class: class.name.clone(),
                        field: f.name.clone(),
                        target: target.clone(),
                    })
                }
            },
            _ => unreachable!("collections handled above"),
        }
    }

    Ok((
        TableDefinition {
            name: class.table_name(),
            source_class: class.name.clone(),
            columns,
            foreign_keys,
            unique: Vec::new(),
            aggregate_root: is_root,
        },
        entity_fields,
    ))
}

/// Flattened columns for an embedded value object. Members become nullable
/// whenever the embedding field is, so an absent group stores as all-null.
fn push_value_columns(
    graph: &AnalyzedGraph,
    class_name: &str,
    prefix: &str,
    nullable: bool,
    out: &mut Vec<ColumnDefinition>,
) -> Result<(), ModelError> {
    let class = class_of(graph, class_name)?;
    for f in &class.fields {
        let name = format!("{prefix}_{}", f.column_name());
        match &f.ty {
            FieldType::Scalar(s) => out.push(ColumnDefinition {
                name,
                source_type: *s,
                nullable: nullable || f.nullable,
                primary_key: false,
                foreign_key: false,
            }),
            FieldType::Ref(target)
                if graph.classification(target) == Some(TypeClassification::Value) =>
            {
                push_value_columns(graph, target, &name, nullable || f.nullable, out)?
            }
            _ => {
                return Err(ModelError::InvalidReference {
                    class: class_name.to_string(),
                    field: f.name.clone(),
                    reason: "value objects may only embed scalars and other value objects".into(),
                })
            }
        }
    }
    Ok(())
}

/// Columns for a collection element class inlined into a junction row:
/// top-level fields unprefixed, embedded values with their field prefix.
fn push_element_columns(
    graph: &AnalyzedGraph,
    class_name: &str,
    skip_id: bool,
    out: &mut Vec<ColumnDefinition>,
) -> Result<(), ModelError> {
    let class = class_of(graph, class_name)?;
    for f in &class.fields {
        if skip_id && f.name == "id" {
            continue;
        }
        match &f.ty {
            FieldType::Scalar(s) => out.push(ColumnDefinition {
                name: f.column_name(),
                source_type: *s,
                nullable: f.nullable,
                primary_key: false,
                foreign_key: false,
            }),
            FieldType::Ref(target)
                if graph.classification(target) == Some(TypeClassification::Value) =>
            {
                push_value_columns(graph, target, &f.column_name(), f.nullable, out)?
            }
            _ => {
                return Err(ModelError::UnsupportedCollection {
                    class: class_name.to_string(),
                    field: f.name.clone(),
                    reason: "collection elements may only contain scalars and value objects"
                        .into(),
                })
            }
        }
    }
    Ok(())
}

fn build_junction_table(
    graph: &AnalyzedGraph,
    owner: &ClassDef,
    info: &CollectionInfo,
) -> Result<TableDefinition, ModelError> {
    let prefix = owner.owner_prefix();
    let table_name = format!("{}_{}", prefix, info.field);
    let parent_column = format!("{prefix}_id");

    let mut columns = vec![
        ColumnDefinition {
            name: "id".to_string(),
            source_type: ScalarType::Uuid,
            nullable: false,
            primary_key: true,
            foreign_key: false,
        },
        ColumnDefinition {
            name: parent_column.clone(),
            source_type: ScalarType::Uuid,
            nullable: false,
            primary_key: false,
            foreign_key: true,
        },
    ];
    match info.container {
        ContainerKind::List => columns.push(ColumnDefinition {
            name: "position".to_string(),
            source_type: ScalarType::Int,
            nullable: false,
            primary_key: false,
            foreign_key: false,
        }),
        ContainerKind::Map => columns.push(ColumnDefinition {
            name: "map_key".to_string(),
            source_type: ScalarType::Text,
            nullable: false,
            primary_key: false,
            foreign_key: false,
        }),
        ContainerKind::Set => {}
    }

    match &info.element {
        ElementKind::Primitive(s) => columns.push(ColumnDefinition {
            name: "value".to_string(),
            source_type: *s,
            nullable: info.container != ContainerKind::Set,
            primary_key: false,
            foreign_key: false,
        }),
        ElementKind::Value(class) => push_element_columns(graph, class, false, &mut columns)?,
        // element id doubles as the junction row id
        ElementKind::Entity(class) => push_element_columns(graph, class, true, &mut columns)?,
    }

    let unique = match (info.container, &info.element) {
        (ContainerKind::List, _) => vec![vec![parent_column.clone(), "position".to_string()]],
        (ContainerKind::Map, _) => vec![vec![parent_column.clone(), "map_key".to_string()]],
        (ContainerKind::Set, ElementKind::Primitive(_)) => {
            vec![vec![parent_column.clone(), "value".to_string()]]
        }
        (ContainerKind::Set, _) => Vec::new(),
    };

    Ok(TableDefinition {
        name: table_name,
        source_class: owner.name.clone(),
        columns,
        foreign_keys: vec![ForeignKeyDefinition {
            column: parent_column,
            references_table: owner.table_name(),
            references_column: "id".to_string(),
            on_delete: CascadeAction::Cascade,
        }],
        unique,
        aggregate_root: false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::FieldDef;

    fn field(name: &str, ty: FieldType) -> FieldDef {
        FieldDef {
            name: name.into(),
            ty,
            nullable: false,
            foreign: false,
        }
    }

    fn id_field() -> FieldDef {
        field("id", FieldType::Scalar(ScalarType::Uuid))
    }

    fn class(name: &str, table: Option<&str>, fields: Vec<FieldDef>) -> ClassDef {
        ClassDef {
            name: name.into(),
            table: table.map(String::from),
            fields,
        }
    }

    /// Order{id, customer_id, total_amount: Money, items: List<OrderItem>}
    fn order_model() -> DomainModel {
        DomainModel {
            root: "Order".into(),
            classes: vec![
                class(
                    "Order",
                    Some("orders"),
                    vec![
                        id_field(),
                        field("customer_id", FieldType::Scalar(ScalarType::Uuid)),
                        field("total_amount", FieldType::Ref("Money".into())),
                        field(
                            "items",
                            FieldType::List(Box::new(FieldType::Ref("OrderItem".into()))),
                        ),
                    ],
                ),
                class(
                    "OrderItem",
                    None,
                    vec![
                        id_field(),
                        field("product_id", FieldType::Scalar(ScalarType::Uuid)),
                        field("quantity", FieldType::Scalar(ScalarType::Int)),
                        field("price", FieldType::Ref("Money".into())),
                    ],
                ),
                class(
                    "Money",
                    None,
                    vec![
                        field("amount", FieldType::Scalar(ScalarType::BigInt)),
                        field("currency", FieldType::Scalar(ScalarType::Text)),
                    ],
                ),
            ],
        }
    }

    #[test]
    fn order_example_produces_two_tables() {
        let schema = AggregateSchema::compile(&order_model()).unwrap();
        let names: Vec<&str> = schema.tables().iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["orders", "order_items"]);

        let orders = schema.root_plan().unwrap();
        assert_eq!(
            orders.table.column_names(),
            vec!["id", "customer_id", "total_amount_amount", "total_amount_currency"]
        );
        assert!(orders.table.aggregate_root);

        let items = &orders.collections[0];
        assert_eq!(items.table.name, "order_items");
        assert_eq!(items.parent_column, "order_id");
        assert_eq!(
            items.table.column_names(),
            vec![
                "id",
                "order_id",
                "position",
                "product_id",
                "quantity",
                "price_amount",
                "price_currency"
            ]
        );
        let fk = &items.table.foreign_keys[0];
        assert_eq!(fk.column, "order_id");
        assert_eq!(fk.references_table, "orders");
        assert_eq!(fk.on_delete, CascadeAction::Cascade);
        assert_eq!(
            items.table.unique,
            vec![vec!["order_id".to_string(), "position".to_string()]]
        );
    }

    #[test]
    fn camel_case_fields_keep_their_column_names() {
        let model = DomainModel {
            root: "Order".into(),
            classes: vec![
                class(
                    "Order",
                    Some("orders"),
                    vec![
                        id_field(),
                        field("customerId", FieldType::Scalar(ScalarType::Uuid)),
                        field("totalAmount", FieldType::Ref("Money".into())),
                    ],
                ),
                class(
                    "Money",
                    None,
                    vec![
                        field("amount", FieldType::Scalar(ScalarType::BigInt)),
                        field("currency", FieldType::Scalar(ScalarType::Text)),
                    ],
                ),
            ],
        };
        let schema = AggregateSchema::compile(&model).unwrap();
        assert_eq!(
            schema.root_plan().unwrap().table.column_names(),
            vec!["id", "customerId", "totalAmount_amount", "totalAmount_currency"]
        );
    }

    #[test]
    fn set_of_primitives_gets_value_uniqueness() {
        let model = DomainModel {
            root: "Post".into(),
            classes: vec![class(
                "Post",
                None,
                vec![
                    id_field(),
                    field(
                        "tags",
                        FieldType::Set(Box::new(FieldType::Scalar(ScalarType::Text))),
                    ),
                ],
            )],
        };
        let schema = AggregateSchema::compile(&model).unwrap();
        let tags = &schema.root_plan().unwrap().collections[0];
        assert_eq!(tags.table.name, "post_tags");
        assert_eq!(
            tags.table.unique,
            vec![vec!["post_id".to_string(), "value".to_string()]]
        );
        let value = tags.table.column("value").unwrap();
        assert!(!value.nullable);
    }

    #[test]
    fn to_one_entity_gets_parent_foreign_key() {
        let model = DomainModel {
            root: "Order".into(),
            classes: vec![
                class(
                    "Order",
                    Some("orders"),
                    vec![id_field(), field("invoice", FieldType::Ref("Invoice".into()))],
                ),
                class(
                    "Invoice",
                    None,
                    vec![id_field(), field("number", FieldType::Scalar(ScalarType::Text))],
                ),
            ],
        };
        let schema = AggregateSchema::compile(&model).unwrap();
        let orders = schema.root_plan().unwrap();
        assert!(orders.table.column("invoice_id").unwrap().foreign_key);
        assert_eq!(orders.entity_fields[0].parent_column, "order_id");

        let invoice = schema.plan("Invoice").unwrap();
        assert!(invoice.table.column("order_id").is_some());
        let fk = &invoice.table.foreign_keys[0];
        assert_eq!(fk.references_table, "orders");
        assert_eq!(fk.on_delete, CascadeAction::Cascade);
    }

    #[test]
    fn foreign_reference_gets_restrict_fk() {
        let model = DomainModel {
            root: "Order".into(),
            classes: vec![
                class(
                    "Order",
                    Some("orders"),
                    vec![
                        id_field(),
                        FieldDef {
                            name: "customer".into(),
                            ty: FieldType::Ref("Customer".into()),
                            nullable: false,
                            foreign: true,
                        },
                    ],
                ),
                class("Customer", Some("customers"), vec![id_field()]),
            ],
        };
        let schema = AggregateSchema::compile(&model).unwrap();
        let orders = schema.root_plan().unwrap();
        let fk = &orders.table.foreign_keys[0];
        assert_eq!(fk.column, "customer_id");
        assert_eq!(fk.references_table, "customers");
        assert_eq!(fk.on_delete, CascadeAction::Restrict);
        // no table is generated for the other aggregate
        assert!(schema.plan("Customer").is_none());
    }

    #[test]
    fn collection_on_entity_is_rejected() {
        let model = DomainModel {
            root: "Order".into(),
            classes: vec![
                class(
                    "Order",
                    None,
                    vec![id_field(), field("invoice", FieldType::Ref("Invoice".into()))],
                ),
                class(
                    "Invoice",
                    None,
                    vec![
                        id_field(),
                        field(
                            "lines",
                            FieldType::List(Box::new(FieldType::Scalar(ScalarType::Text))),
                        ),
                    ],
                ),
            ],
        };
        let err = AggregateSchema::compile(&model).unwrap_err();
        assert!(err.to_string().contains("lines"), "{err}");
    }

    #[test]
    fn nullable_embedded_value_forces_nullable_columns() {
        let model = DomainModel {
            root: "Order".into(),
            classes: vec![
                class(
                    "Order",
                    None,
                    vec![
                        id_field(),
                        FieldDef {
                            name: "discount".into(),
                            ty: FieldType::Ref("Money".into()),
                            nullable: true,
                            foreign: false,
                        },
                    ],
                ),
                class(
                    "Money",
                    None,
                    vec![
                        field("amount", FieldType::Scalar(ScalarType::BigInt)),
                        field("currency", FieldType::Scalar(ScalarType::Text)),
                    ],
                ),
            ],
        };
        let schema = AggregateSchema::compile(&model).unwrap();
        let table = &schema.root_plan().unwrap().table;
        assert!(table.column("discount_amount").unwrap().nullable);
        assert!(table.column("discount_currency").unwrap().nullable);
    }
}
