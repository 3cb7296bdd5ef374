use indexmap::{IndexMap, IndexSet};
use parser::types::{
    self, EnumType, InterfaceType, ObjectType, SchemaDefinition, ServiceDocument, Type,
    TypeDefinition, TypeSystemDefinition, UnionType,
};
use value::{ConstValue, Name};

use crate::type_ext::TypeExt;
use crate::SchemaError;

#[derive(Debug, Eq, PartialEq)]
pub struct MetaField {
    pub name: Name,
    pub arguments: IndexMap<Name, MetaInputValue>,
    pub ty: Type,
}

#[derive(Debug, Eq, PartialEq, Copy, Clone)]
pub enum TypeKind {
    Scalar,
    Object,
    Interface,
    Union,
    Enum,
    InputObject,
}

impl TypeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TypeKind::Scalar => "scalar",
            TypeKind::Object => "object",
            TypeKind::Interface => "interface",
            TypeKind::Union => "union",
            TypeKind::Enum => "enum",
            TypeKind::InputObject => "input object",
        }
    }
}

#[derive(Debug, Eq, PartialEq)]
pub struct MetaEnumValue {
    pub value: Name,
}

#[derive(Debug, Eq, PartialEq)]
pub struct MetaInputValue {
    pub name: Name,
    pub ty: Type,
    pub default_value: Option<ConstValue>,
}

#[derive(Debug, Eq, PartialEq)]
pub struct MetaType {
    pub name: Name,
    pub kind: TypeKind,
    pub is_builtin: bool,
    pub implements: IndexSet<Name>,
    pub fields: IndexMap<Name, MetaField>,
    pub possible_types: IndexSet<Name>,
    pub enum_values: IndexMap<Name, MetaEnumValue>,
}

impl MetaType {
    #[inline]
    pub fn field_by_name(&self, name: &str) -> Option<&MetaField> {
        self.fields.get(name)
    }

    #[inline]
    pub fn is_leaf(&self) -> bool {
        matches!(self.kind, TypeKind::Enum | TypeKind::Scalar)
    }

    #[inline]
    pub fn is_possible_type(&self, type_name: &str) -> bool {
        match self.kind {
            TypeKind::Interface | TypeKind::Union => self.possible_types.contains(type_name),
            TypeKind::Object => self.name == type_name,
            _ => false,
        }
    }
}

/// Type-system view of a schema.
///
/// Types are kept in declaration order, which decides the default concrete type of an
/// abstract field.
#[derive(Debug, Default)]
pub struct Schema {
    query_type: Option<Name>,
    mutation_type: Option<Name>,
    pub types: IndexMap<Name, MetaType>,
}

impl Schema {
    pub fn parse(document: &str) -> Result<Schema, SchemaError> {
        Self::new(parser::parse_schema(document)?)
    }

    pub fn new(document: ServiceDocument) -> Result<Schema, SchemaError> {
        let mut schema = Schema::default();

        for definition in document.definitions.into_iter() {
            match definition {
                TypeSystemDefinition::Schema(definition) => {
                    convert_schema_definition(&mut schema, definition.node);
                }
                TypeSystemDefinition::Type(type_definition) => {
                    let meta_type = convert_type_definition(type_definition.node);
                    if schema.types.contains_key(&meta_type.name) {
                        return Err(SchemaError::DefinitionConflicted {
                            type_name: meta_type.name.to_string(),
                        });
                    }
                    schema.types.insert(meta_type.name.clone(), meta_type);
                }
                TypeSystemDefinition::Directive(_) => {}
            }
        }

        finish_schema(&mut schema);

        if !schema.types.contains_key(schema.query_type()) {
            return Err(SchemaError::MissingQueryType {
                type_name: schema.query_type().to_string(),
            });
        }
        Ok(schema)
    }

    #[inline]
    pub fn query_type(&self) -> &str {
        self.query_type
            .as_ref()
            .map(|name| name.as_str())
            .unwrap_or("Query")
    }

    #[inline]
    pub fn mutation_type(&self) -> Option<&str> {
        match &self.mutation_type {
            Some(name) => Some(name.as_str()),
            None if self.types.contains_key("Mutation") => Some("Mutation"),
            None => None,
        }
    }

    #[inline]
    pub fn get_type(&self, name: &str) -> Option<&MetaType> {
        self.types.get(name)
    }

    pub fn concrete_type_by_name(&self, ty: &Type) -> Option<&MetaType> {
        self.types.get(ty.concrete_typename())
    }

    /// The object types an abstract type may resolve to, in declaration order.
    pub fn possible_types<'a>(&'a self, ty: &'a MetaType) -> impl Iterator<Item = &'a MetaType> {
        self.types
            .values()
            .filter(move |candidate| candidate.kind == TypeKind::Object)
            .filter(move |candidate| ty.is_possible_type(&candidate.name))
    }
}

fn convert_schema_definition(schema: &mut Schema, schema_definition: SchemaDefinition) {
    if let Some(query) = schema_definition.query {
        schema.query_type = Some(query.node);
    }
    if let Some(mutation) = schema_definition.mutation {
        schema.mutation_type = Some(mutation.node);
    }
}

fn convert_type_definition(definition: TypeDefinition) -> MetaType {
    let mut type_definition = MetaType {
        name: definition.name.node.clone(),
        kind: TypeKind::Scalar,
        is_builtin: false,
        implements: Default::default(),
        fields: Default::default(),
        possible_types: Default::default(),
        enum_values: Default::default(),
    };

    match definition.kind {
        types::TypeKind::Scalar => type_definition.kind = TypeKind::Scalar,
        types::TypeKind::Object(ObjectType { implements, fields }) => {
            type_definition.kind = TypeKind::Object;
            type_definition.implements = implements
                .into_iter()
                .map(|implement| implement.node)
                .collect();
            type_definition
                .fields
                .extend(fields.into_iter().map(|field| {
                    (
                        field.node.name.node.clone(),
                        convert_field_definition(field.node),
                    )
                }));
        }
        types::TypeKind::Interface(InterfaceType { implements, fields }) => {
            type_definition.kind = TypeKind::Interface;
            type_definition.implements = implements.into_iter().map(|name| name.node).collect();
            type_definition.fields = fields
                .into_iter()
                .map(|field| {
                    (
                        field.node.name.node.clone(),
                        convert_field_definition(field.node),
                    )
                })
                .collect();
        }
        types::TypeKind::Union(UnionType { members }) => {
            type_definition.kind = TypeKind::Union;
            type_definition.possible_types = members.into_iter().map(|name| name.node).collect();
        }
        types::TypeKind::Enum(EnumType { values }) => {
            type_definition.kind = TypeKind::Enum;
            type_definition
                .enum_values
                .extend(values.into_iter().map(|value| {
                    (
                        value.node.value.node.clone(),
                        MetaEnumValue {
                            value: value.node.value.node,
                        },
                    )
                }));
        }
        types::TypeKind::InputObject(_) => type_definition.kind = TypeKind::InputObject,
    }

    type_definition
}

fn convert_field_definition(definition: types::FieldDefinition) -> MetaField {
    MetaField {
        name: definition.name.node,
        arguments: definition
            .arguments
            .into_iter()
            .map(|arg| {
                (
                    arg.node.name.node.clone(),
                    convert_input_value_definition(arg.node),
                )
            })
            .collect(),
        ty: definition.ty.node,
    }
}

fn convert_input_value_definition(arg: types::InputValueDefinition) -> MetaInputValue {
    MetaInputValue {
        name: arg.name.node,
        ty: arg.ty.node,
        default_value: arg.default_value.map(|default_value| default_value.node),
    }
}

fn finish_schema(schema: &mut Schema) {
    for definition in parser::parse_schema(include_str!("builtin.graphql"))
        .unwrap()
        .definitions
        .into_iter()
    {
        if let TypeSystemDefinition::Type(type_definition) = definition {
            let mut type_definition = convert_type_definition(type_definition.node);
            type_definition.is_builtin = true;
            schema
                .types
                .entry(type_definition.name.clone())
                .or_insert(type_definition);
        }
    }

    let mut possible_types: IndexMap<Name, IndexSet<Name>> = Default::default();
    for ty in schema.types.values() {
        if ty.kind == TypeKind::Object {
            for implement in &ty.implements {
                possible_types
                    .entry(implement.clone())
                    .or_default()
                    .insert(ty.name.clone());
            }
        }
    }
    for (name, types) in possible_types {
        if let Some(ty) = schema.types.get_mut(&name) {
            if ty.kind == TypeKind::Interface {
                ty.possible_types = types;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SDL: &str = r#"
        interface Node { id: ID! }
        type User implements Node { id: ID! name: String }
        type Post implements Node { id: ID! title: String }
        union SearchResult = Post | User
        enum Color { RED GREEN }
        type Query { node: Node search: [SearchResult!]! color: Color }
    "#;

    #[test]
    fn parse_schema() {
        let schema = Schema::parse(SDL).unwrap();
        assert_eq!(schema.query_type(), "Query");
        assert_eq!(schema.mutation_type(), None);

        let node = schema.get_type("Node").unwrap();
        assert_eq!(node.kind, TypeKind::Interface);
        let possible = schema
            .possible_types(node)
            .map(|ty| ty.name.as_str())
            .collect::<Vec<_>>();
        assert_eq!(possible, vec!["User", "Post"]);

        let search = schema.get_type("SearchResult").unwrap();
        assert!(search.is_possible_type("User"));
        assert!(schema.get_type("String").unwrap().is_builtin);
        assert_eq!(schema.get_type("Color").unwrap().enum_values.len(), 2);
    }

    #[test]
    fn missing_query_type() {
        let err = Schema::parse("type Object { property: String }").unwrap_err();
        assert!(matches!(err, SchemaError::MissingQueryType { .. }));
    }

    #[test]
    fn explicit_root_types() {
        let schema =
            Schema::parse("schema { query: Root } type Root { ok: Boolean }").unwrap();
        assert_eq!(schema.query_type(), "Root");
    }
}
