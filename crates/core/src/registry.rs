use std::collections::HashMap;
use std::sync::Arc;

use graphmock_schema::{FieldRef, Schema, TypeKind};
use indexmap::IndexMap;
use value::Name;

use crate::mock_value::{describe_json, Arguments, MockFn, MockValue};
use crate::MockError;

/// Base mocks as supplied by the caller: type name, then field name, then mock function.
#[derive(Default, Clone)]
pub struct BaseMocks(IndexMap<String, IndexMap<String, MockFn>>);

impl BaseMocks {
    pub fn new() -> Self {
        Default::default()
    }

    /// Registers the mock of `type_name.field_name`, replacing any earlier one.
    pub fn mock<F>(mut self, type_name: &str, field_name: &str, f: F) -> Self
    where
        F: Fn(&Arguments) -> MockValue + Send + Sync + 'static,
    {
        self.insert(type_name, field_name, Arc::new(f));
        self
    }

    /// Registers a prepared mock function, such as the one returned by `mock_connection`.
    pub fn mock_fn(mut self, type_name: &str, field_name: &str, f: MockFn) -> Self {
        self.insert(type_name, field_name, f);
        self
    }

    /// Registers a mock that always returns `value`.
    pub fn constant(self, type_name: &str, field_name: &str, value: impl Into<MockValue>) -> Self {
        let value = value.into();
        self.mock(type_name, field_name, move |_| value.clone())
    }

    pub fn insert(&mut self, type_name: &str, field_name: &str, f: MockFn) {
        self.0
            .entry(type_name.to_string())
            .or_default()
            .insert(field_name.to_string(), f);
    }

    /// Reads constant mocks from a `{ "Type": { "field": <template> } }` document.
    pub fn from_json(document: serde_json::Value) -> Result<Self, MockError> {
        let types = match document {
            serde_json::Value::Object(types) => types,
            other => {
                return Err(MockError::Shape {
                    location: "mocks".to_string(),
                    expected: "a map of type names to field mocks",
                    found: describe_json(Some(&other)),
                })
            }
        };

        let mut mocks = BaseMocks::new();
        for (type_name, fields) in types {
            let fields = match fields {
                serde_json::Value::Object(fields) => fields,
                other => {
                    return Err(MockError::Shape {
                        location: type_name,
                        expected: "a map of field names to mocks",
                        found: describe_json(Some(&other)),
                    })
                }
            };
            for (field_name, template) in fields {
                let value = MockValue::from_template(template).map_err(|err| match err {
                    MockError::Shape {
                        location,
                        expected,
                        found,
                    } => MockError::Shape {
                        location: format!("{}.{}.{}", type_name, field_name, location),
                        expected,
                        found,
                    },
                    err => err,
                })?;
                mocks.insert(
                    &type_name,
                    &field_name,
                    Arc::new(move |_: &Arguments| value.clone()),
                );
            }
        }
        Ok(mocks)
    }
}

/// Base mocks checked against a schema. Immutable once built.
#[derive(Default)]
pub struct MockRegistry {
    mocks: HashMap<Name, HashMap<Name, MockFn>>,
}

impl MockRegistry {
    pub fn build(schema: &Schema, base_mocks: BaseMocks) -> Result<Self, MockError> {
        let mut mocks: HashMap<Name, HashMap<Name, MockFn>> = HashMap::new();

        for (type_name, fields) in base_mocks.0 {
            let ty = schema
                .get_type(&type_name)
                .ok_or_else(|| MockError::UnknownType {
                    type_name: type_name.clone(),
                })?;
            if !matches!(ty.kind, TypeKind::Object | TypeKind::Interface) {
                return Err(MockError::UnmockableType {
                    type_name,
                    kind: ty.kind.as_str(),
                });
            }

            let type_mocks = mocks.entry(ty.name.clone()).or_default();
            for (field_name, f) in fields {
                let field = FieldRef::new(schema, ty, &field_name).ok_or_else(|| {
                    MockError::UnknownField {
                        type_name: type_name.clone(),
                        field_name: field_name.clone(),
                    }
                })?;
                if ty.kind == TypeKind::Interface && !field.is_leaf() {
                    return Err(MockError::InterfaceLeafOnly {
                        type_name: type_name.clone(),
                        field_name,
                        field_type: field.ty().to_string(),
                    });
                }
                tracing::trace!(field = %field, "Base mock registered.");
                type_mocks.insert(field.field.name.clone(), f);
            }
        }

        Ok(Self { mocks })
    }

    /// The base mock of a field of an object type.
    ///
    /// Falls back to the single implemented interface mocking the field.
    pub fn lookup(&self, field: &FieldRef<'_>) -> Result<Option<&MockFn>, MockError> {
        if let Some(f) = self.get(field.type_name(), field.field_name()) {
            return Ok(Some(f));
        }

        let mut found = field
            .parent_type
            .implements
            .iter()
            .filter_map(|interface| {
                self.get(interface.as_str(), field.field_name())
                    .map(|f| (interface, f))
            })
            .collect::<Vec<_>>();
        match found.len() {
            0 => Ok(None),
            1 => Ok(found.pop().map(|(_, f)| f)),
            _ => Err(MockError::AmbiguousInterfaceMock {
                type_name: field.type_name().to_string(),
                field_name: field.field_name().to_string(),
                interfaces: found
                    .into_iter()
                    .map(|(interface, _)| interface.to_string())
                    .collect(),
            }),
        }
    }

    #[inline]
    fn get(&self, type_name: &str, field_name: &str) -> Option<&MockFn> {
        self.mocks
            .get(type_name)
            .and_then(|fields| fields.get(field_name))
    }
}
