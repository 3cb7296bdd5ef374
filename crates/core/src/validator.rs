use std::fmt::{self, Display, Formatter};

use graphmock_schema::{FieldRef, MetaType, Schema, TypeKind};
use indexmap::IndexMap;
use parser::types::{BaseType, Type};
use value::{ConstValue, Name};

use crate::mock_value::MockValue;
use crate::MockError;

/// Where a candidate value came from, in decreasing precedence.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Tier {
    Override,
    Nested,
    Base,
    Default,
}

#[derive(Debug, Copy, Clone)]
pub struct Origin<'a> {
    pub tier: Tier,
    pub type_name: &'a str,
    /// `None` for the override of a whole operation.
    pub field_name: Option<&'a str>,
}

impl<'a> Origin<'a> {
    pub fn new(tier: Tier, field: FieldRef<'a>) -> Self {
        Self {
            tier,
            type_name: field.type_name(),
            field_name: Some(field.field_name()),
        }
    }

    pub fn root(tier: Tier, ty: &'a MetaType) -> Self {
        Self {
            tier,
            type_name: ty.name.as_str(),
            field_name: None,
        }
    }

    #[inline]
    fn allows_null(&self) -> bool {
        self.tier == Tier::Override
    }

    #[inline]
    fn allows_error(&self) -> bool {
        matches!(self.tier, Tier::Override | Tier::Default)
    }

    #[inline]
    fn allows_array(&self) -> bool {
        self.tier == Tier::Override
    }
}

impl<'a> Display for Origin<'a> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let prefix = match self.tier {
            Tier::Override => "Query override",
            Tier::Nested => "Nested mock",
            Tier::Base => "Base mock",
            Tier::Default => "Default mock",
        };
        match self.field_name {
            Some(field_name) => write!(f, "{} for '{}.{}'", prefix, self.type_name, field_name),
            None => write!(f, "{} for '{}'", prefix, self.type_name),
        }
    }
}

#[derive(Debug, Copy, Clone)]
pub enum PathSegment<'a> {
    Root,
    Name(&'a str),
    Index(usize),
}

/// Position inside a value returned by a mock. The root renders as the empty string.
#[derive(Debug, Copy, Clone)]
pub struct ValuePath<'a> {
    pub parent: Option<&'a ValuePath<'a>>,
    pub segment: PathSegment<'a>,
}

impl<'a> ValuePath<'a> {
    pub fn root() -> Self {
        ValuePath {
            parent: None,
            segment: PathSegment::Root,
        }
    }

    pub fn index(&'a self, idx: usize) -> Self {
        Self {
            parent: Some(self),
            segment: PathSegment::Index(idx),
        }
    }

    pub fn name(&'a self, name: &'a str) -> Self {
        Self {
            parent: Some(self),
            segment: PathSegment::Name(name),
        }
    }
}

impl<'a> Display for ValuePath<'a> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        fn write_node(f: &mut Formatter<'_>, node: &ValuePath) -> Result<bool, fmt::Error> {
            let written = match node.parent {
                Some(parent) => write_node(f, parent)?,
                None => false,
            };
            if written && !matches!(node.segment, PathSegment::Root) {
                write!(f, ".")?;
            }
            match &node.segment {
                PathSegment::Root => Ok(written),
                PathSegment::Name(name) => write!(f, "{}", name).map(|_| true),
                PathSegment::Index(idx) => write!(f, "{}", idx).map(|_| true),
            }
        }
        write_node(f, self).map(|_| ())
    }
}

/// Checks mock output against the schema.
pub struct TypeValidator<'a> {
    schema: &'a Schema,
}

impl<'a> TypeValidator<'a> {
    pub fn new(schema: &'a Schema) -> Self {
        Self { schema }
    }

    /// Checks `value` and everything nested in it.
    pub fn validate(
        &self,
        value: &MockValue,
        ty: &Type,
        origin: &Origin<'_>,
        path: &ValuePath<'_>,
    ) -> Result<(), MockError> {
        self.check(value, ty, origin, path, true)
    }

    /// Checks only the outer shape of `value`; nested values are checked when the fields they
    /// belong to resolve.
    pub fn validate_shallow(
        &self,
        value: &MockValue,
        ty: &Type,
        origin: &Origin<'_>,
        path: &ValuePath<'_>,
    ) -> Result<(), MockError> {
        self.check(value, ty, origin, path, false)
    }

    /// Rejects override keys that are neither fields of `ty` nor selected response keys.
    pub fn validate_override_keys(
        &self,
        object: &IndexMap<Name, MockValue>,
        ty: &MetaType,
        is_response_key: impl Fn(&str) -> bool,
        origin: &Origin<'_>,
        path: &ValuePath<'_>,
    ) -> Result<(), MockError> {
        match object.keys().find(|key| {
            key.as_str() != "__typename"
                && ty.field_by_name(key).is_none()
                && !is_response_key(key)
        }) {
            Some(key) => Err(MockError::UnknownNestedField {
                origin: origin.to_string(),
                path: path.to_string(),
                field_name: key.to_string(),
                expected: ty.name.to_string(),
            }),
            None => Ok(()),
        }
    }

    /// The object type named by a `__typename` key, if the value carries one.
    pub fn typename_of(
        &self,
        value: &MockValue,
        ty: &'a MetaType,
        origin: &Origin<'_>,
        path: &ValuePath<'_>,
    ) -> Result<Option<&'a MetaType>, MockError> {
        let typename = match value.get("__typename") {
            MockValue::Undefined => return Ok(None),
            typename => typename,
        };
        let concrete = match &typename {
            MockValue::Scalar(ConstValue::String(name)) => self
                .schema
                .get_type(name)
                .filter(|concrete| concrete.kind == TypeKind::Object)
                .filter(|concrete| ty.is_possible_type(&concrete.name)),
            _ => None,
        };
        match concrete {
            Some(concrete) => Ok(Some(concrete)),
            None => Err(MockError::TypeMismatch {
                origin: origin.to_string(),
                path: path.name("__typename").to_string(),
                value: typename.to_string(),
                expected: ty.name.to_string(),
            }),
        }
    }

    fn check(
        &self,
        value: &MockValue,
        ty: &Type,
        origin: &Origin<'_>,
        path: &ValuePath<'_>,
        deep: bool,
    ) -> Result<(), MockError> {
        match value {
            MockValue::Undefined | MockValue::Function(_) => return Ok(()),
            MockValue::Null if origin.allows_null() => return Ok(()),
            MockValue::Null => {
                return Err(MockError::NullNotAllowedFromBaseMock {
                    origin: origin.to_string(),
                    path: path.to_string(),
                })
            }
            MockValue::Error(_) if origin.allows_error() => return Ok(()),
            MockValue::Error(message) => {
                return Err(MockError::ErrorFromBaseMock {
                    origin: origin.to_string(),
                    path: path.to_string(),
                    message: message.clone(),
                })
            }
            _ => {}
        }

        match &ty.base {
            BaseType::List(item_ty) => match value {
                MockValue::ListMock(_) => Ok(()),
                MockValue::List(items) if origin.allows_array() => {
                    if deep {
                        for (idx, item) in items.iter().enumerate() {
                            self.check(item, item_ty, origin, &path.index(idx), deep)?;
                        }
                    }
                    Ok(())
                }
                _ => Err(mismatch(value, ty, origin, path)),
            },
            BaseType::Named(type_name) => {
                let meta = match self.schema.get_type(type_name) {
                    Some(meta) => meta,
                    None => return Ok(()),
                };
                match meta.kind {
                    TypeKind::Scalar | TypeKind::Enum => {
                        if is_valid_leaf_value(meta, value) {
                            Ok(())
                        } else {
                            Err(mismatch(value, ty, origin, path))
                        }
                    }
                    TypeKind::Object | TypeKind::Interface | TypeKind::Union => match value {
                        MockValue::Object(object) if deep => {
                            self.check_object(value, object, meta, origin, path)
                        }
                        MockValue::Object(_) => Ok(()),
                        _ => Err(mismatch(value, ty, origin, path)),
                    },
                    TypeKind::InputObject => Ok(()),
                }
            }
        }
    }

    fn check_object(
        &self,
        value: &MockValue,
        object: &IndexMap<Name, MockValue>,
        ty: &'a MetaType,
        origin: &Origin<'_>,
        path: &ValuePath<'_>,
    ) -> Result<(), MockError> {
        let concrete = match self.typename_of(value, ty, origin, path)? {
            Some(concrete) => concrete,
            None if ty.kind == TypeKind::Union => {
                self.schema.possible_types(ty).next().unwrap_or(ty)
            }
            None => ty,
        };

        for (key, value) in object {
            if key.as_str() == "__typename" {
                continue;
            }
            match concrete.field_by_name(key) {
                Some(field) => self.check(value, &field.ty, origin, &path.name(key), true)?,
                None => {
                    return Err(MockError::UnknownNestedField {
                        origin: origin.to_string(),
                        path: path.to_string(),
                        field_name: key.to_string(),
                        expected: concrete.name.to_string(),
                    })
                }
            }
        }
        Ok(())
    }
}

fn mismatch(value: &MockValue, ty: &Type, origin: &Origin<'_>, path: &ValuePath<'_>) -> MockError {
    MockError::TypeMismatch {
        origin: origin.to_string(),
        path: path.to_string(),
        value: value.to_string(),
        expected: ty.to_string(),
    }
}

fn is_valid_leaf_value(ty: &MetaType, value: &MockValue) -> bool {
    match (ty.kind, value) {
        (TypeKind::Enum, MockValue::Scalar(ConstValue::String(s))) => {
            ty.enum_values.contains_key(s.as_str())
        }
        (TypeKind::Enum, MockValue::Scalar(ConstValue::Enum(name))) => {
            ty.enum_values.contains_key(name)
        }
        (TypeKind::Enum, _) => false,
        (_, MockValue::Scalar(value)) => is_valid_scalar_value(ty.name.as_str(), value),
        // Custom scalars may carry structured data.
        (_, MockValue::Object(_) | MockValue::List(_)) if !ty.is_builtin => true,
        _ => false,
    }
}

fn is_valid_scalar_value(type_name: &str, value: &ConstValue) -> bool {
    match (type_name, value) {
        ("Int", ConstValue::Number(n)) if n.is_i64() || n.is_u64() => true,
        ("Float", ConstValue::Number(_)) => true,
        ("String", ConstValue::String(_)) => true,
        ("Boolean", ConstValue::Boolean(_)) => true,
        ("ID", ConstValue::String(_)) => true,
        ("ID", ConstValue::Number(n)) if n.is_i64() || n.is_u64() => true,
        ("Int", _) => false,
        ("Float", _) => false,
        ("String", _) => false,
        ("Boolean", _) => false,
        ("ID", _) => false,
        _ => true,
    }
}

#[cfg(test)]
mod tests {
    use once_cell::sync::Lazy;
    use serde_json::json;

    use super::*;
    use crate::list::mock_list;

    static SCHEMA: Lazy<Schema> = Lazy::new(|| {
        Schema::parse(
            r#"
            type Query { object: Object objects: [Object] color: Color }
            type Object { property: String count: Int nested: Object }
            enum Color { RED GREEN }
            "#,
        )
        .unwrap()
    });

    fn field(type_name: &str, field_name: &str) -> FieldRef<'static> {
        FieldRef::new(&SCHEMA, SCHEMA.get_type(type_name).unwrap(), field_name).unwrap()
    }

    fn validate(tier: Tier, field: FieldRef<'static>, value: serde_json::Value) -> Result<(), MockError> {
        TypeValidator::new(&SCHEMA).validate(
            &MockValue::from(value),
            field.ty(),
            &Origin::new(tier, field),
            &ValuePath::root(),
        )
    }

    #[test]
    fn value_paths() {
        let root = ValuePath::root();
        assert_eq!(root.to_string(), "");
        let a = root.name("a");
        let idx = a.index(2);
        let b = idx.name("b");
        assert_eq!(b.to_string(), "a.2.b");
    }

    #[test]
    fn null_from_base_mock() {
        let err = validate(Tier::Base, field("Object", "property"), json!(null)).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Base mock for 'Object.property' returned 'null' for path ''. 'null' can only be \
             returned by query overrides; leave the key out to use the field's own mock."
        );
        assert!(validate(Tier::Override, field("Object", "property"), json!(null)).is_ok());
    }

    #[test]
    fn nested_null_from_base_mock() {
        let err = validate(
            Tier::Base,
            field("Query", "object"),
            json!({"nested": {"property": null}}),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            MockError::NullNotAllowedFromBaseMock { ref path, .. } if path == "nested.property"
        ));
    }

    #[test]
    fn scalar_mismatch() {
        let err = validate(Tier::Base, field("Object", "count"), json!("many")).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Base mock for 'Object.count' returned 'many' for path '' but the expected type is 'Int'."
        );
        assert!(validate(Tier::Base, field("Object", "count"), json!(1.5)).is_err());
        assert!(validate(Tier::Base, field("Query", "color"), json!("RED")).is_ok());
        assert!(validate(Tier::Base, field("Query", "color"), json!("BLUE")).is_err());
    }

    #[test]
    fn object_mismatch() {
        let err = validate(Tier::Base, field("Query", "object"), json!("object")).unwrap_err();
        assert!(matches!(err, MockError::TypeMismatch { .. }));
    }

    #[test]
    fn unknown_nested_field() {
        let err = validate(
            Tier::Base,
            field("Query", "object"),
            json!({"nested": {"missing": 1}}),
        )
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Base mock for 'Query.object' returned unknown field 'missing' for path 'nested' of type 'Object'."
        );
    }

    #[test]
    fn base_lists_must_be_list_mocks() {
        let err = validate(Tier::Base, field("Query", "objects"), json!([{}])).unwrap_err();
        assert!(matches!(err, MockError::TypeMismatch { ref expected, .. } if expected == "[Object]"));

        let objects = field("Query", "objects");
        assert!(TypeValidator::new(&SCHEMA)
            .validate(
                &mock_list(2).into(),
                objects.ty(),
                &Origin::new(Tier::Base, objects),
                &ValuePath::root(),
            )
            .is_ok());
        assert!(validate(Tier::Override, objects, json!([{}, null])).is_ok());
    }

    #[test]
    fn errors_only_from_overrides_and_defaults() {
        let property = field("Object", "property");
        let validator = TypeValidator::new(&SCHEMA);
        let error = MockValue::error("boom");
        for (tier, ok) in [
            (Tier::Override, true),
            (Tier::Default, true),
            (Tier::Base, false),
            (Tier::Nested, false),
        ] {
            let result = validator.validate(
                &error,
                property.ty(),
                &Origin::new(tier, property),
                &ValuePath::root(),
            );
            assert_eq!(result.is_ok(), ok);
        }
    }
}
