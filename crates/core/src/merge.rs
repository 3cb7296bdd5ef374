use std::sync::Arc;

use crate::list::ListMock;
use crate::mock_value::MockValue;

/// Merges candidates ordered from lowest to highest precedence.
pub fn merge(candidates: impl IntoIterator<Item = MockValue>) -> MockValue {
    candidates
        .into_iter()
        .fold(MockValue::Undefined, merge_pair)
}

/// Merges `higher` over `lower`.
///
/// `Undefined` is transparent, `Null`, scalars and errors replace whatever is below them,
/// objects merge key by key. Functions and list mocks are never invoked here: combining them
/// yields a new function or list mock that merges once the field arguments are known.
pub fn merge_pair(lower: MockValue, higher: MockValue) -> MockValue {
    match (lower, higher) {
        (lower, MockValue::Undefined) => lower,
        (MockValue::Undefined, higher) => higher,
        (_, higher @ (MockValue::Null | MockValue::Scalar(_) | MockValue::Error(_))) => higher,
        (lower, MockValue::Function(higher)) => MockValue::function(move |arguments| {
            merge_pair(lower.clone().evaluate(arguments), higher(arguments))
        }),
        (MockValue::Function(lower), higher) => MockValue::function(move |arguments| {
            merge_pair(lower(arguments), higher.clone())
        }),
        (MockValue::Object(mut lower), MockValue::Object(higher)) => {
            for (key, value) in higher {
                match lower.get_mut(&key) {
                    Some(below) => *below = merge_pair(std::mem::take(below), value),
                    None => {
                        lower.insert(key, value);
                    }
                }
            }
            MockValue::Object(lower)
        }
        (MockValue::List(lower), MockValue::List(higher)) => {
            let mut lower = lower.into_iter();
            MockValue::List(
                higher
                    .into_iter()
                    .map(|value| merge_pair(lower.next().unwrap_or_default(), value))
                    .collect(),
            )
        }
        (lower @ (MockValue::List(_) | MockValue::ListMock(_)), higher)
            if matches!(higher, MockValue::List(_) | MockValue::ListMock(_)) =>
        {
            merge_lists(lower, higher)
        }
        (_, higher) => higher,
    }
}

// The higher list decides the length; items merge index by index once generated.
fn merge_lists(lower: MockValue, higher: MockValue) -> MockValue {
    let size = higher.list_len().unwrap_or_default();
    let lower = Arc::new(lower);
    let higher = Arc::new(higher);
    ListMock::new(size)
        .with_item(move |arguments, index| {
            merge_pair(
                lower.list_item(arguments, index),
                higher.list_item(arguments, index),
            )
        })
        .into()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::list::{mock_list, mock_list_with};
    use crate::mock_value::Arguments;

    fn items(value: &MockValue) -> Vec<MockValue> {
        let arguments = Arguments::default();
        (0..value.list_len().unwrap())
            .map(|index| value.list_item(&arguments, index))
            .collect()
    }

    #[test]
    fn null_is_decisive() {
        let merged = merge([
            MockValue::from(json!({"a": "X", "b": "Y"})),
            MockValue::from(json!({"a": null})),
        ]);
        assert_eq!(merged, MockValue::from(json!({"a": null, "b": "Y"})));
    }

    #[test]
    fn undefined_is_transparent() {
        let merged = merge([
            MockValue::from(json!({"a": "X"})),
            MockValue::object([("a", MockValue::Undefined)]),
        ]);
        assert_eq!(merged, MockValue::from(json!({"a": "X"})));
        assert_eq!(
            merge([MockValue::from("X"), MockValue::Undefined]),
            MockValue::from("X")
        );
    }

    #[test]
    fn deep_merge() {
        let merged = merge([
            MockValue::from(json!({"a": {"x": 1, "y": 2}, "b": true})),
            MockValue::from(json!({"a": {"y": 3, "z": 4}})),
        ]);
        assert_eq!(
            merged,
            MockValue::from(json!({"a": {"x": 1, "y": 3, "z": 4}, "b": true}))
        );
    }

    #[test]
    fn merge_is_idempotent() {
        let value = MockValue::from(json!({"a": {"b": [1, 2, {"c": null}]}, "d": "e"}));
        assert_eq!(merge([value.clone(), value.clone()]), value);
    }

    #[test]
    fn scalars_do_not_combine() {
        assert_eq!(
            merge([MockValue::from("lower"), MockValue::from("higher")]),
            MockValue::from("higher")
        );
        assert_eq!(
            merge([MockValue::from(json!({"a": 1})), MockValue::from("higher")]),
            MockValue::from("higher")
        );
    }

    #[test]
    fn error_short_circuits_only_when_highest() {
        assert_eq!(
            merge([MockValue::from("X"), MockValue::error("boom")]),
            MockValue::error("boom")
        );
        assert_eq!(
            merge([MockValue::error("boom"), MockValue::from("X")]),
            MockValue::from("X")
        );
    }

    #[test]
    fn two_list_mocks() {
        let lower = mock_list_with(3, |_, index| {
            MockValue::object([("a", MockValue::from(index)), ("b", MockValue::from("low"))])
        });
        let higher = mock_list_with(2, |_, _| MockValue::object([("b", "high")]));
        let merged = merge([lower.into(), higher.into()]);
        assert_eq!(
            items(&merged),
            vec![
                MockValue::from(json!({"a": 0, "b": "high"})),
                MockValue::from(json!({"a": 1, "b": "high"})),
            ]
        );
    }

    #[test]
    fn list_mock_under_array() {
        let lower = mock_list_with(2, |_, _| MockValue::from(json!({"property": "mock"})));
        let higher = MockValue::list([
            MockValue::from(json!({"property": "X"})),
            MockValue::Undefined,
            MockValue::Null,
            MockValue::from(json!({})),
        ]);
        let merged = merge([lower.into(), higher]);
        assert_eq!(
            items(&merged),
            vec![
                MockValue::from(json!({"property": "X"})),
                MockValue::from(json!({"property": "mock"})),
                MockValue::Null,
                MockValue::from(json!({})),
            ]
        );
    }

    #[test]
    fn array_length_is_authoritative() {
        for lower_size in 0..4 {
            for higher_size in 0..4 {
                let merged = merge([
                    mock_list(lower_size).into(),
                    MockValue::list((0..higher_size).map(|_| MockValue::Undefined)),
                ]);
                assert_eq!(merged.list_len(), Some(higher_size));
            }
        }
    }

    #[test]
    fn functions_merge_lazily() {
        let lower = MockValue::function(|args| {
            MockValue::object([
                ("a", MockValue::from(args.get_str("name").unwrap_or_default())),
                ("b", MockValue::from("low")),
            ])
        });
        let higher = MockValue::from(json!({"b": "high"}));
        let merged = merge([lower, higher]);
        assert!(matches!(merged, MockValue::Function(_)));

        let args = Arguments::from_iter([(
            value::Name::new("name"),
            value::ConstValue::String("A".into()),
        )]);
        assert_eq!(
            merged.evaluate(&args),
            MockValue::from(json!({"a": "A", "b": "high"}))
        );
    }
}
