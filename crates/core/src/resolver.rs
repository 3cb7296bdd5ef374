use graphmock_schema::{FieldRef, MetaType, Schema, TypeKind};
use parser::types::{BaseType, Type};
use value::{ConstValue, Name};

use crate::hooks::{run_hooks, DefaultMock, HookContext};
use crate::merge::merge;
use crate::mock_value::{Arguments, MockValue};
use crate::registry::MockRegistry;
use crate::validator::{Origin, Tier, TypeValidator, ValuePath};
use crate::MockError;

/// Inputs of a single field resolution.
pub struct ResolutionContext<'a> {
    pub field: FieldRef<'a>,
    pub arguments: &'a Arguments,
    /// Override sub-tree at the field's response key.
    pub override_value: MockValue,
    /// Value the parent seeded under the field's name.
    pub parent_value: MockValue,
    /// Response path of the field.
    pub path: &'a ValuePath<'a>,
}

/// Outcome of resolving a field or a list item.
#[derive(Debug)]
pub enum Resolution {
    /// A simulated failure, reported as a field error.
    Failed(String),
    Null,
    Leaf(ConstValue),
    List {
        len: usize,
        seed: MockValue,
        /// Source of `seed`, named when its items fail validation.
        seed_tier: Tier,
        overlay: MockValue,
    },
    /// An object whose fields still need resolving.
    ///
    /// `seed` is addressed by field name and `overlay` by response key.
    Composite { seed: MockValue, overlay: MockValue },
}

/// Decides which source wins for each field.
pub struct Resolver<'a> {
    schema: &'a Schema,
    registry: &'a MockRegistry,
    hooks: &'a [DefaultMock],
    validator: TypeValidator<'a>,
}

impl<'a> Resolver<'a> {
    pub fn new(schema: &'a Schema, registry: &'a MockRegistry, hooks: &'a [DefaultMock]) -> Self {
        Self {
            schema,
            registry,
            hooks,
            validator: TypeValidator::new(schema),
        }
    }

    #[inline]
    pub fn validator(&self) -> &TypeValidator<'a> {
        &self.validator
    }

    pub fn resolve(&self, ctx: ResolutionContext<'_>) -> Result<Resolution, MockError> {
        let ResolutionContext {
            field,
            arguments,
            override_value,
            parent_value,
            path,
        } = ctx;
        let root = ValuePath::root();

        let override_value = override_value.evaluate(arguments);
        self.validator.validate_shallow(
            &override_value,
            field.ty(),
            &Origin::new(Tier::Override, field),
            &root,
        )?;

        let parent_value = parent_value.evaluate(arguments);
        self.validator.validate(
            &parent_value,
            field.ty(),
            &Origin::new(Tier::Nested, field),
            &root,
        )?;

        let base_value = match self.registry.lookup(&field)? {
            Some(mock) => {
                let origin = Origin::new(Tier::Base, field);
                let value = mock(arguments).evaluate(arguments);
                if field.is_leaf() && !value.is_defined() {
                    return Err(MockError::UndefinedLeaf {
                        origin: origin.to_string(),
                        path: root.to_string(),
                        expected: field.ty().to_string(),
                    });
                }
                self.validator.validate(&value, field.ty(), &origin, &root)?;
                value
            }
            None => MockValue::Undefined,
        };

        let winner = [
            (Tier::Override, &override_value),
            (Tier::Nested, &parent_value),
            (Tier::Base, &base_value),
        ]
        .into_iter()
        .find(|(_, value)| value.is_defined());
        let tier = match winner {
            Some((tier, MockValue::Error(message))) => {
                tracing::trace!(field = %field, path = %path, tier = ?tier, "Field failed.");
                return Ok(Resolution::Failed(message.clone()));
            }
            Some((_, MockValue::Null)) => return Ok(Resolution::Null),
            Some((tier, _)) => tier,
            None => return self.resolve_default(field, arguments, field.ty(), None, path),
        };
        tracing::trace!(field = %field, path = %path, tier = ?tier, "Field resolved.");

        let seed_tier = if parent_value.is_defined() {
            Tier::Nested
        } else {
            Tier::Base
        };
        let seed = if field.is_leaf() {
            // Scalars never merge structurally, even when a custom scalar holds an object.
            if parent_value.is_defined() {
                parent_value
            } else {
                base_value
            }
        } else {
            merge([base_value, parent_value])
        };
        self.complete(field, field.ty(), seed, seed_tier, override_value, tier)
    }

    /// Resolves item `index` of a list resolved earlier.
    #[allow(clippy::too_many_arguments)]
    pub fn resolve_item(
        &self,
        field: FieldRef<'_>,
        arguments: &Arguments,
        item_ty: &Type,
        seed: &MockValue,
        seed_tier: Tier,
        overlay: &MockValue,
        index: usize,
        path: &ValuePath<'_>,
    ) -> Result<Resolution, MockError> {
        let root = ValuePath::root();
        let item_path = root.index(index);

        let seed_item = seed.list_item(arguments, index).evaluate(arguments);
        self.validator.validate(
            &seed_item,
            item_ty,
            &Origin::new(seed_tier, field),
            &item_path,
        )?;

        let overlay_item = overlay.list_item(arguments, index).evaluate(arguments);
        self.validator.validate_shallow(
            &overlay_item,
            item_ty,
            &Origin::new(Tier::Override, field),
            &item_path,
        )?;

        let tier = match (&overlay_item, &seed_item) {
            (MockValue::Error(message), _) => return Ok(Resolution::Failed(message.clone())),
            (MockValue::Null, _) => return Ok(Resolution::Null),
            (MockValue::Undefined, MockValue::Undefined) => {
                return self.resolve_default(field, arguments, item_ty, Some(index), path)
            }
            (MockValue::Undefined, _) => seed_tier,
            _ => Tier::Override,
        };
        self.complete(field, item_ty, seed_item, seed_tier, overlay_item, tier)
    }

    fn complete(
        &self,
        field: FieldRef<'_>,
        ty: &Type,
        seed: MockValue,
        seed_tier: Tier,
        overlay: MockValue,
        tier: Tier,
    ) -> Result<Resolution, MockError> {
        match &ty.base {
            BaseType::List(_) => {
                let len = overlay
                    .list_len()
                    .or_else(|| seed.list_len())
                    .unwrap_or_default();
                Ok(Resolution::List {
                    len,
                    seed,
                    seed_tier,
                    overlay,
                })
            }
            BaseType::Named(type_name) => {
                let meta = self.named_type(type_name)?;
                if meta.is_leaf() {
                    let origin = Origin::new(tier, field);
                    let value = if overlay.is_defined() { overlay } else { seed };
                    leaf(meta, value, ty, &origin)
                } else {
                    Ok(Resolution::Composite { seed, overlay })
                }
            }
        }
    }

    // Nothing above the hooks defined a value.
    fn resolve_default(
        &self,
        field: FieldRef<'_>,
        arguments: &Arguments,
        ty: &Type,
        index: Option<usize>,
        path: &ValuePath<'_>,
    ) -> Result<Resolution, MockError> {
        let missing = || MockError::MissingBaseMock {
            type_name: field.type_name().to_string(),
            field_name: field.field_name().to_string(),
            expected: field.ty().to_string(),
            path: path.to_string(),
        };

        let meta = match &ty.base {
            BaseType::List(_) => return Err(missing()),
            BaseType::Named(type_name) => self.named_type(type_name)?,
        };
        if !meta.is_leaf() {
            return Ok(Resolution::Composite {
                seed: MockValue::Undefined,
                overlay: MockValue::Undefined,
            });
        }

        let origin = Origin::new(Tier::Default, field);
        let value = run_hooks(
            self.hooks,
            &HookContext {
                field,
                arguments,
                return_type: meta,
                index,
            },
        )
        .evaluate(arguments);
        self.validator
            .validate(&value, ty, &origin, &ValuePath::root())?;

        match value {
            MockValue::Undefined => Err(missing()),
            MockValue::Error(message) => Ok(Resolution::Failed(message)),
            value => {
                tracing::trace!(field = %field, path = %path, tier = ?Tier::Default, "Field resolved.");
                leaf(meta, value, ty, &origin)
            }
        }
    }

    fn named_type(&self, type_name: &Name) -> Result<&'a MetaType, MockError> {
        self.schema
            .get_type(type_name)
            .ok_or_else(|| MockError::UnknownType {
                type_name: type_name.to_string(),
            })
    }
}

fn leaf(
    meta: &MetaType,
    value: MockValue,
    ty: &Type,
    origin: &Origin<'_>,
) -> Result<Resolution, MockError> {
    let rendered = value.to_string();
    let value = match value {
        MockValue::Scalar(ConstValue::String(s)) if meta.kind == TypeKind::Enum => {
            Some(ConstValue::Enum(Name::new(s)))
        }
        MockValue::Scalar(ConstValue::Number(n)) if meta.name == "ID" => {
            Some(ConstValue::String(n.to_string()))
        }
        value => value.into_const(),
    };
    match value {
        Some(ConstValue::Null) => Ok(Resolution::Null),
        Some(value) => Ok(Resolution::Leaf(value)),
        None => Err(MockError::TypeMismatch {
            origin: origin.to_string(),
            path: String::new(),
            value: rendered,
            expected: ty.to_string(),
        }),
    }
}
