use std::sync::Arc;

use graphmock_schema::{FieldRef, MetaType, TypeKind};
use value::ConstValue;

use crate::mock_value::{Arguments, MockValue};

/// A default mock, consulted for leaf values nothing else defines.
pub type DefaultMock = Arc<dyn Fn(&HookContext<'_>) -> MockValue + Send + Sync>;

/// What a default mock gets to see about the value it is asked for.
#[derive(Debug, Copy, Clone)]
pub struct HookContext<'a> {
    pub field: FieldRef<'a>,
    pub arguments: &'a Arguments,
    /// The leaf type being produced; the item type for list items.
    pub return_type: &'a MetaType,
    /// Position inside the field's list, if the field is a list.
    pub index: Option<usize>,
}

/// Deterministic values for the built-in scalars and enums.
///
/// `String` and `ID` get `"Type.field"`, `Int` 42, `Float` 4.2, `Boolean` true, enums their first
/// value. Custom scalars are left undefined.
pub fn default_scalars() -> DefaultMock {
    Arc::new(|ctx: &HookContext<'_>| match ctx.return_type.kind {
        TypeKind::Enum => ctx
            .return_type
            .enum_values
            .keys()
            .next()
            .map(|value| MockValue::Scalar(ConstValue::Enum(value.clone())))
            .unwrap_or_default(),
        TypeKind::Scalar => match ctx.return_type.name.as_str() {
            "String" | "ID" => MockValue::from(ctx.field.to_string()),
            "Int" => MockValue::from(42),
            "Float" => MockValue::from(4.2),
            "Boolean" => MockValue::from(true),
            _ => MockValue::Undefined,
        },
        _ => MockValue::Undefined,
    })
}

/// Runs the hooks in order, returning the first defined value.
pub(crate) fn run_hooks(hooks: &[DefaultMock], ctx: &HookContext<'_>) -> MockValue {
    hooks
        .iter()
        .map(|hook| hook(ctx))
        .find(MockValue::is_defined)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use graphmock_schema::Schema;
    use serde_json::json;

    use super::*;

    #[test]
    fn builtin_defaults() {
        let schema = Schema::parse(
            r#"
            type Query { name: String count: Int ratio: Float flag: Boolean color: Color date: Date }
            enum Color { RED GREEN }
            scalar Date
            "#,
        )
        .unwrap();
        let query = schema.get_type("Query").unwrap();
        let arguments = Arguments::default();
        let hooks = vec![default_scalars()];

        let run = |field_name: &str| {
            let field = FieldRef::new(&schema, query, field_name).unwrap();
            run_hooks(
                &hooks,
                &HookContext {
                    field,
                    arguments: &arguments,
                    return_type: field.return_type,
                    index: None,
                },
            )
        };

        assert_eq!(run("name"), MockValue::from("Query.name"));
        assert_eq!(run("count"), MockValue::from(json!(42)));
        assert_eq!(run("ratio"), MockValue::from(json!(4.2)));
        assert_eq!(run("flag"), MockValue::from(true));
        assert_eq!(
            run("color"),
            MockValue::Scalar(ConstValue::Enum(value::Name::new("RED")))
        );
        assert_eq!(run("date"), MockValue::Undefined);
    }

    #[test]
    fn first_defined_hook_wins() {
        let schema = Schema::parse("type Query { name: String }").unwrap();
        let field = FieldRef::new(&schema, schema.get_type("Query").unwrap(), "name").unwrap();
        let arguments = Arguments::default();
        let hooks: Vec<DefaultMock> = vec![
            Arc::new(|_: &HookContext<'_>| MockValue::Undefined),
            Arc::new(|_: &HookContext<'_>| MockValue::from("first")),
            default_scalars(),
        ];
        let value = run_hooks(
            &hooks,
            &HookContext {
                field,
                arguments: &arguments,
                return_type: field.return_type,
                index: None,
            },
        );
        assert_eq!(value, MockValue::from("first"));
    }
}
