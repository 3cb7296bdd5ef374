#![allow(clippy::too_many_arguments)]

use std::collections::HashMap;
use std::convert::Infallible;

use graphmock_schema::{FieldRef, MetaType, Schema, TypeKind};
use indexmap::IndexMap;
use parser::types::{
    BaseType, Directive, DocumentOperations, ExecutableDocument, Field, FragmentDefinition,
    OperationDefinition, OperationType, Selection, SelectionSet, Type,
};
use parser::{Pos, Positioned};
use value::{ConstValue, Name, Value, Variables};

use crate::hooks::DefaultMock;
use crate::mock_value::{Arguments, MockValue};
use crate::registry::MockRegistry;
use crate::resolver::{Resolution, ResolutionContext, Resolver};
use crate::validator::{Origin, PathSegment, Tier, ValuePath};
use crate::{ErrorPath, MockError, Request, Response, ServerError};

type CollectedFields<'a> = IndexMap<&'a str, Vec<&'a Positioned<Field>>>;

/// Runs `request` against the mocks.
///
/// Query errors and simulated failures end up in the response; mock authoring errors are
/// returned as `Err`.
pub(crate) fn execute(
    schema: &Schema,
    registry: &MockRegistry,
    hooks: &[DefaultMock],
    request: Request,
) -> Result<Response, MockError> {
    let document = match parser::parse_query(&request.query) {
        Ok(document) => document,
        Err(err) => {
            return Ok(Response::from_error(ServerError {
                message: err.to_string(),
                path: Default::default(),
                locations: err.positions().collect(),
            }))
        }
    };

    let operation = match get_operation(&document, request.operation.as_deref()) {
        Ok(operation) => operation,
        Err(err) => return Ok(Response::from_error(err)),
    };

    let root_type = match operation.node.ty {
        OperationType::Query => Some(schema.query_type()),
        OperationType::Mutation => schema.mutation_type(),
        OperationType::Subscription => {
            return Ok(Response::from_error(
                ServerError::new("Subscriptions are not supported.").at(vec![], operation.pos),
            ))
        }
    };
    let root_type = match root_type.and_then(|name| schema.get_type(name)) {
        Some(root_type) => root_type,
        None => {
            return Ok(Response::from_error(
                ServerError::new("Schema is not configured for mutations.")
                    .at(vec![], operation.pos),
            ))
        }
    };

    let mut variables = request.variables;
    for definition in &operation.node.variable_definitions {
        let name = &definition.node.name.node;
        if let Some(default_value) = &definition.node.default_value {
            if !variables.contains_key(name) {
                variables.insert(name.clone(), default_value.node.clone());
            }
        }
    }
    tracing::debug!(
        operation_type = %operation.node.ty,
        variables = ?variables,
        "Execute operation."
    );

    let mut executor = Executor {
        schema,
        resolver: Resolver::new(schema, registry, hooks),
        fragments: &document.fragments,
        variables,
        errors: Vec::new(),
    };

    let overlay = request.mock_override.evaluate(&Arguments::default());
    if !matches!(overlay, MockValue::Undefined | MockValue::Object(_)) {
        return Err(MockError::TypeMismatch {
            origin: Origin::root(Tier::Override, root_type).to_string(),
            path: String::new(),
            value: overlay.to_string(),
            expected: root_type.name.to_string(),
        });
    }

    let data = executor.execute_object(
        root_type,
        None,
        &[&operation.node.selection_set.node],
        &MockValue::Undefined,
        &overlay,
        &ValuePath::root(),
    )?;

    Ok(Response {
        data: data.unwrap_or_default(),
        errors: executor.errors,
    })
}

struct Executor<'a> {
    schema: &'a Schema,
    resolver: Resolver<'a>,
    fragments: &'a HashMap<Name, Positioned<FragmentDefinition>>,
    variables: Variables,
    errors: Vec<ServerError>,
}

impl<'a> Executor<'a> {
    /// `None` means a null has to propagate to the parent.
    fn execute_object(
        &mut self,
        ty: &'a MetaType,
        field: Option<FieldRef<'a>>,
        selection_sets: &[&'a SelectionSet],
        seed: &MockValue,
        overlay: &MockValue,
        path: &ValuePath<'_>,
    ) -> Result<Option<ConstValue>, MockError> {
        let mut fields = CollectedFields::new();
        for selection_set in selection_sets {
            self.collect_fields(ty, selection_set, &mut fields);
        }

        if let MockValue::Object(object) = overlay {
            let origin = match field {
                Some(field) => Origin::new(Tier::Override, field),
                None => Origin::root(Tier::Override, ty),
            };
            self.resolver.validator().validate_override_keys(
                object,
                ty,
                |key| fields.contains_key(key),
                &origin,
                &ValuePath::root(),
            )?;
        }

        let mut object = IndexMap::with_capacity(fields.len());
        let mut bubbled = false;
        for (response_key, fields) in &fields {
            let field = fields[0];
            let field_name = field.node.name.node.as_str();
            let field_path = path.name(response_key);

            if field_name == "__typename" {
                object.insert(
                    Name::new(response_key),
                    ConstValue::String(ty.name.to_string()),
                );
                continue;
            }

            let field_ref = match FieldRef::new(self.schema, ty, field_name) {
                Some(field_ref) => field_ref,
                None => {
                    self.errors.push(
                        ServerError::new(format!(
                            "Unknown field \"{}\" on type \"{}\".",
                            field_name, ty.name
                        ))
                        .at(error_path(&field_path), field.pos),
                    );
                    continue;
                }
            };

            match self.execute_field(field_ref, response_key, fields, seed, overlay, &field_path)? {
                Some(value) => {
                    object.insert(Name::new(response_key), value);
                }
                None => bubbled = true,
            }
        }

        if bubbled {
            Ok(None)
        } else {
            Ok(Some(ConstValue::Object(object)))
        }
    }

    fn execute_field(
        &mut self,
        field: FieldRef<'a>,
        response_key: &str,
        fields: &[&'a Positioned<Field>],
        seed: &MockValue,
        overlay: &MockValue,
        path: &ValuePath<'_>,
    ) -> Result<Option<ConstValue>, MockError> {
        let pos = fields[0].pos;
        let arguments = self.arguments(field, &fields[0].node);
        let resolution = self.resolver.resolve(ResolutionContext {
            field,
            arguments: &arguments,
            override_value: overlay.get(response_key),
            parent_value: seed.get(field.field_name()),
            path,
        })?;

        let selection_sets = fields
            .iter()
            .map(|field| &field.node.selection_set.node)
            .collect::<Vec<_>>();
        self.complete_value(
            field,
            &arguments,
            field.ty(),
            resolution,
            &selection_sets,
            pos,
            path,
        )
    }

    fn complete_value(
        &mut self,
        field: FieldRef<'a>,
        arguments: &Arguments,
        ty: &Type,
        resolution: Resolution,
        selection_sets: &[&'a SelectionSet],
        pos: Pos,
        path: &ValuePath<'_>,
    ) -> Result<Option<ConstValue>, MockError> {
        let value = match (resolution, &ty.base) {
            (Resolution::Failed(message), _) => {
                self.errors
                    .push(ServerError::new(message).at(error_path(path), pos));
                None
            }
            (Resolution::Null, _) if ty.nullable => None,
            (Resolution::Null, _) => {
                self.errors.push(
                    ServerError::new(format!(
                        "Cannot return null for non-nullable field {}.",
                        field
                    ))
                    .at(error_path(path), pos),
                );
                return Ok(None);
            }
            (Resolution::Leaf(value), _) => Some(value),
            (
                Resolution::List {
                    len,
                    seed,
                    seed_tier,
                    overlay,
                },
                BaseType::List(item_ty),
            ) => {
                let mut items = Vec::new();
                let mut bubbled = false;
                for index in 0..len {
                    let item_path = path.index(index);
                    let resolution = self.resolver.resolve_item(
                        field, arguments, item_ty, &seed, seed_tier, &overlay, index, &item_path,
                    )?;
                    match self.complete_value(
                        field,
                        arguments,
                        item_ty,
                        resolution,
                        selection_sets,
                        pos,
                        &item_path,
                    )? {
                        Some(item) => items.push(item),
                        None => bubbled = true,
                    }
                }
                (!bubbled).then(|| ConstValue::List(items))
            }
            (Resolution::Composite { seed, overlay }, BaseType::Named(_)) => {
                let concrete = self.concrete_type(field, &seed, &overlay, path)?;
                self.execute_object(
                    concrete,
                    Some(field),
                    selection_sets,
                    &seed,
                    &overlay,
                    path,
                )?
            }
            (_, _) => None,
        };

        match value {
            Some(value) => Ok(Some(value)),
            None if ty.nullable => Ok(Some(ConstValue::Null)),
            None => Ok(None),
        }
    }

    /// The object type a composite field resolves to.
    fn concrete_type(
        &self,
        field: FieldRef<'a>,
        seed: &MockValue,
        overlay: &MockValue,
        path: &ValuePath<'_>,
    ) -> Result<&'a MetaType, MockError> {
        let ty = field.return_type;
        if ty.kind == TypeKind::Object {
            return Ok(ty);
        }

        let validator = self.resolver.validator();
        let root = ValuePath::root();
        if let Some(concrete) =
            validator.typename_of(overlay, ty, &Origin::new(Tier::Override, field), &root)?
        {
            return Ok(concrete);
        }
        if let Some(concrete) =
            validator.typename_of(seed, ty, &Origin::new(Tier::Base, field), &root)?
        {
            return Ok(concrete);
        }
        self.schema
            .possible_types(ty)
            .next()
            .ok_or_else(|| MockError::MissingBaseMock {
                type_name: field.type_name().to_string(),
                field_name: field.field_name().to_string(),
                expected: ty.name.to_string(),
                path: path.to_string(),
            })
    }

    fn collect_fields(
        &self,
        ty: &MetaType,
        selection_set: &'a SelectionSet,
        fields: &mut CollectedFields<'a>,
    ) {
        for selection in &selection_set.items {
            match &selection.node {
                Selection::Field(field) => {
                    if self.is_skipped(&field.node.directives) {
                        continue;
                    }
                    fields
                        .entry(field.node.response_key().node.as_str())
                        .or_default()
                        .push(field);
                }
                Selection::FragmentSpread(fragment_spread) => {
                    if self.is_skipped(&fragment_spread.node.directives) {
                        continue;
                    }
                    if let Some(fragment) = self
                        .fragments
                        .get(fragment_spread.node.fragment_name.node.as_str())
                    {
                        if self.fragment_applies(ty, &fragment.node.type_condition.node.on.node) {
                            self.collect_fields(ty, &fragment.node.selection_set.node, fields);
                        }
                    }
                }
                Selection::InlineFragment(inline_fragment) => {
                    if self.is_skipped(&inline_fragment.node.directives) {
                        continue;
                    }
                    let applies = match &inline_fragment.node.type_condition {
                        Some(type_condition) => {
                            self.fragment_applies(ty, &type_condition.node.on.node)
                        }
                        None => true,
                    };
                    if applies {
                        self.collect_fields(ty, &inline_fragment.node.selection_set.node, fields);
                    }
                }
            }
        }
    }

    fn fragment_applies(&self, ty: &MetaType, type_condition: &str) -> bool {
        ty.name == type_condition
            || self
                .schema
                .get_type(type_condition)
                .map(|condition| condition.is_possible_type(&ty.name))
                .unwrap_or_default()
    }

    fn is_skipped(&self, directives: &[Positioned<Directive>]) -> bool {
        directives.iter().any(|directive| {
            let condition = directive
                .node
                .get_argument("if")
                .map(|value| self.const_value(&value.node));
            match (directive.node.name.node.as_str(), condition) {
                ("skip", Some(ConstValue::Boolean(true))) => true,
                ("include", Some(ConstValue::Boolean(false))) => true,
                _ => false,
            }
        })
    }

    fn arguments(&self, field: FieldRef<'_>, selection: &Field) -> Arguments {
        let mut arguments = selection
            .arguments
            .iter()
            .map(|(name, value)| (name.node.clone(), self.const_value(&value.node)))
            .collect::<IndexMap<_, _>>();
        for (name, definition) in &field.field.arguments {
            if let Some(default_value) = &definition.default_value {
                if !arguments.contains_key(name) {
                    arguments.insert(name.clone(), default_value.clone());
                }
            }
        }
        Arguments::new(arguments)
    }

    fn const_value(&self, value: &Value) -> ConstValue {
        match value.clone().into_const_with(|name| {
            Ok::<_, Infallible>(self.variables.get(&name).cloned().unwrap_or_default())
        }) {
            Ok(value) => value,
            Err(never) => match never {},
        }
    }
}

fn get_operation<'a>(
    document: &'a ExecutableDocument,
    operation_name: Option<&str>,
) -> Result<&'a Positioned<OperationDefinition>, ServerError> {
    match (operation_name, &document.operations) {
        (Some(operation_name), DocumentOperations::Multiple(operations)) => operations
            .get(operation_name)
            .ok_or_else(|| unknown_operation(operation_name)),
        (Some(operation_name), DocumentOperations::Single(_)) => {
            Err(unknown_operation(operation_name))
        }
        (None, DocumentOperations::Single(operation)) => Ok(operation),
        (None, DocumentOperations::Multiple(operations)) if operations.len() == 1 => operations
            .values()
            .next()
            .ok_or_else(|| ServerError::new("Document does not contain any operations.")),
        (None, DocumentOperations::Multiple(_)) => {
            Err(ServerError::new("Operation name required in request."))
        }
    }
}

fn unknown_operation(operation_name: &str) -> ServerError {
    ServerError::new(format!("Unknown operation named \"{}\".", operation_name))
}

fn error_path(path: &ValuePath<'_>) -> Vec<ErrorPath> {
    let mut segments = Vec::new();
    let mut node = Some(path);
    while let Some(current) = node {
        match current.segment {
            PathSegment::Root => {}
            PathSegment::Name(name) => segments.push(ErrorPath::Name(name.to_string())),
            PathSegment::Index(idx) => segments.push(ErrorPath::Index(idx)),
        }
        node = current.parent;
    }
    segments.reverse();
    segments
}
