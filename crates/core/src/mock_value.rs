use std::fmt::{self, Debug, Display, Formatter};
use std::ops::Deref;
use std::sync::Arc;

use indexmap::IndexMap;
use value::{ConstValue, Name};

use crate::list::ListMock;
use crate::MockError;

/// A mock function, invoked with the arguments of the field it resolves.
pub type MockFn = Arc<dyn Fn(&Arguments) -> MockValue + Send + Sync>;

/// Coerced arguments of a field.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Arguments(IndexMap<Name, ConstValue>);

impl Deref for Arguments {
    type Target = IndexMap<Name, ConstValue>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl FromIterator<(Name, ConstValue)> for Arguments {
    fn from_iter<T: IntoIterator<Item = (Name, ConstValue)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl Arguments {
    pub fn new(arguments: IndexMap<Name, ConstValue>) -> Self {
        Self(arguments)
    }

    pub fn get_str(&self, name: &str) -> Option<&str> {
        match self.0.get(name) {
            Some(ConstValue::String(s)) => Some(s.as_str()),
            Some(ConstValue::Enum(s)) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn get_i64(&self, name: &str) -> Option<i64> {
        match self.0.get(name) {
            Some(ConstValue::Number(n)) => n.as_i64(),
            _ => None,
        }
    }
}

/// Every value a mock, a nested mock or a query override can produce.
///
/// `Undefined` defers to the next lower-precedence source, `Null` is decisive, `Error` is a
/// simulated field failure.
#[derive(Clone, Default)]
pub enum MockValue {
    #[default]
    Undefined,
    Null,
    Scalar(ConstValue),
    Object(IndexMap<Name, MockValue>),
    List(Vec<MockValue>),
    ListMock(ListMock),
    Error(String),
    Function(MockFn),
}

impl MockValue {
    pub fn function<F>(f: F) -> Self
    where
        F: Fn(&Arguments) -> MockValue + Send + Sync + 'static,
    {
        MockValue::Function(Arc::new(f))
    }

    pub fn error(message: impl Into<String>) -> Self {
        MockValue::Error(message.into())
    }

    pub fn object<K, V>(entries: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: AsRef<str>,
        V: Into<MockValue>,
    {
        MockValue::Object(
            entries
                .into_iter()
                .map(|(key, value)| (Name::new(key), value.into()))
                .collect(),
        )
    }

    pub fn list<V: Into<MockValue>>(items: impl IntoIterator<Item = V>) -> Self {
        MockValue::List(items.into_iter().map(Into::into).collect())
    }

    #[inline]
    pub fn is_defined(&self) -> bool {
        !matches!(self, MockValue::Undefined)
    }

    /// Invokes functions until a plain value remains.
    pub fn evaluate(self, arguments: &Arguments) -> MockValue {
        let mut value = self;
        while let MockValue::Function(f) = value {
            value = f(arguments);
        }
        value
    }

    /// The value stored under `key` of an object, `Undefined` for anything else.
    pub fn get(&self, key: &str) -> MockValue {
        match self {
            MockValue::Object(object) => object.get(key).cloned().unwrap_or_default(),
            _ => MockValue::Undefined,
        }
    }

    /// Number of items of a list-shaped value.
    pub fn list_len(&self) -> Option<usize> {
        match self {
            MockValue::List(items) => Some(items.len()),
            MockValue::ListMock(list) => Some(list.size()),
            _ => None,
        }
    }

    /// Item `index` of a list-shaped value, generating it when the value is a [`ListMock`].
    pub fn list_item(&self, arguments: &Arguments, index: usize) -> MockValue {
        match self {
            MockValue::List(items) => items.get(index).cloned().unwrap_or_default(),
            MockValue::ListMock(list) => list.item(arguments, index),
            _ => MockValue::Undefined,
        }
    }

    /// Converts plain data into a constant.
    ///
    /// Returns `None` if a function, list mock, error or undefined value remains anywhere inside.
    pub fn into_const(self) -> Option<ConstValue> {
        match self {
            MockValue::Null => Some(ConstValue::Null),
            MockValue::Scalar(value) => Some(value),
            MockValue::Object(object) => object
                .into_iter()
                .map(|(key, value)| Some((key, value.into_const()?)))
                .collect::<Option<IndexMap<_, _>>>()
                .map(ConstValue::Object),
            MockValue::List(items) => items
                .into_iter()
                .map(MockValue::into_const)
                .collect::<Option<Vec<_>>>()
                .map(ConstValue::List),
            _ => None,
        }
    }

    /// Reads a configuration template.
    ///
    /// Plain JSON maps onto the matching variants; two single-key objects are special:
    /// `{"$mockList": {"size": 2, "item": ...}}` and `{"$error": "message"}`.
    pub fn from_template(template: serde_json::Value) -> Result<MockValue, MockError> {
        use serde_json::Value as Json;

        Ok(match template {
            Json::Object(mut object) if object.len() == 1 && object.contains_key("$error") => {
                match object.remove("$error") {
                    Some(Json::String(message)) => MockValue::Error(message),
                    other => {
                        return Err(MockError::Shape {
                            location: "$error".to_string(),
                            expected: "an error message string",
                            found: describe_json(other.as_ref()),
                        })
                    }
                }
            }
            Json::Object(mut object) if object.len() == 1 && object.contains_key("$mockList") => {
                let mut options = match object.remove("$mockList") {
                    Some(Json::Object(options)) => options,
                    other => {
                        return Err(MockError::Shape {
                            location: "$mockList".to_string(),
                            expected: "an object with 'size' and optional 'item'",
                            found: describe_json(other.as_ref()),
                        })
                    }
                };
                let size = match options.get("size").and_then(Json::as_u64) {
                    Some(size) => size as usize,
                    None => {
                        return Err(MockError::Shape {
                            location: "$mockList.size".to_string(),
                            expected: "a non-negative integer",
                            found: describe_json(options.get("size")),
                        })
                    }
                };
                match options.remove("item") {
                    Some(item) => {
                        let item = MockValue::from_template(item)?;
                        ListMock::new(size)
                            .with_item(move |_, _| item.clone())
                            .into()
                    }
                    None => ListMock::new(size).into(),
                }
            }
            Json::Object(object) => MockValue::Object(
                object
                    .into_iter()
                    .map(|(key, value)| Ok((Name::new(key), MockValue::from_template(value)?)))
                    .collect::<Result<_, MockError>>()?,
            ),
            Json::Array(items) => MockValue::List(
                items
                    .into_iter()
                    .map(MockValue::from_template)
                    .collect::<Result<_, _>>()?,
            ),
            other => other.into(),
        })
    }
}

pub(crate) fn describe_json(value: Option<&serde_json::Value>) -> String {
    match value {
        None => "nothing".to_string(),
        Some(serde_json::Value::Null) => "null".to_string(),
        Some(serde_json::Value::Bool(_)) => "a boolean".to_string(),
        Some(serde_json::Value::Number(_)) => "a number".to_string(),
        Some(serde_json::Value::String(_)) => "a string".to_string(),
        Some(serde_json::Value::Array(_)) => "an array".to_string(),
        Some(serde_json::Value::Object(_)) => "an object".to_string(),
    }
}

impl From<ConstValue> for MockValue {
    fn from(value: ConstValue) -> Self {
        match value {
            ConstValue::Null => MockValue::Null,
            ConstValue::List(items) => MockValue::List(items.into_iter().map(Into::into).collect()),
            ConstValue::Object(object) => MockValue::Object(
                object
                    .into_iter()
                    .map(|(key, value)| (key, value.into()))
                    .collect(),
            ),
            scalar => MockValue::Scalar(scalar),
        }
    }
}

impl From<serde_json::Value> for MockValue {
    fn from(value: serde_json::Value) -> Self {
        use serde_json::Value as Json;

        match value {
            Json::Null => MockValue::Null,
            Json::Bool(b) => MockValue::Scalar(ConstValue::Boolean(b)),
            Json::Number(n) => MockValue::Scalar(ConstValue::Number(n)),
            Json::String(s) => MockValue::Scalar(ConstValue::String(s)),
            Json::Array(items) => MockValue::List(items.into_iter().map(Into::into).collect()),
            Json::Object(object) => MockValue::Object(
                object
                    .into_iter()
                    .map(|(key, value)| (Name::new(key), value.into()))
                    .collect(),
            ),
        }
    }
}

impl From<ListMock> for MockValue {
    fn from(list: ListMock) -> Self {
        MockValue::ListMock(list)
    }
}

impl From<&str> for MockValue {
    fn from(s: &str) -> Self {
        MockValue::Scalar(ConstValue::String(s.to_string()))
    }
}

impl From<String> for MockValue {
    fn from(s: String) -> Self {
        MockValue::Scalar(ConstValue::String(s))
    }
}

impl From<bool> for MockValue {
    fn from(b: bool) -> Self {
        MockValue::Scalar(ConstValue::Boolean(b))
    }
}

impl From<i32> for MockValue {
    fn from(n: i32) -> Self {
        MockValue::Scalar(ConstValue::Number(n.into()))
    }
}

impl From<i64> for MockValue {
    fn from(n: i64) -> Self {
        MockValue::Scalar(ConstValue::Number(n.into()))
    }
}

impl From<usize> for MockValue {
    fn from(n: usize) -> Self {
        MockValue::Scalar(ConstValue::Number(n.into()))
    }
}

impl From<f64> for MockValue {
    fn from(n: f64) -> Self {
        match serde_json::Number::from_f64(n) {
            Some(n) => MockValue::Scalar(ConstValue::Number(n)),
            None => MockValue::Null,
        }
    }
}

impl PartialEq for MockValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (MockValue::Undefined, MockValue::Undefined) => true,
            (MockValue::Null, MockValue::Null) => true,
            (MockValue::Scalar(a), MockValue::Scalar(b)) => a == b,
            (MockValue::Object(a), MockValue::Object(b)) => a == b,
            (MockValue::List(a), MockValue::List(b)) => a == b,
            (MockValue::ListMock(a), MockValue::ListMock(b)) => a == b,
            (MockValue::Error(a), MockValue::Error(b)) => a == b,
            (MockValue::Function(a), MockValue::Function(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl Debug for MockValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            MockValue::Undefined => f.write_str("Undefined"),
            MockValue::Null => f.write_str("Null"),
            MockValue::Scalar(value) => f.debug_tuple("Scalar").field(value).finish(),
            MockValue::Object(object) => f.debug_tuple("Object").field(object).finish(),
            MockValue::List(items) => f.debug_tuple("List").field(items).finish(),
            MockValue::ListMock(list) => f.debug_tuple("ListMock").field(list).finish(),
            MockValue::Error(message) => f.debug_tuple("Error").field(message).finish(),
            MockValue::Function(_) => f.write_str("Function"),
        }
    }
}

/// Renders the value the way it appears in validation messages.
impl Display for MockValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            MockValue::Undefined => f.write_str("undefined"),
            MockValue::Null => f.write_str("null"),
            MockValue::Scalar(ConstValue::String(s)) => f.write_str(s),
            MockValue::Scalar(ConstValue::Enum(s)) => f.write_str(s),
            MockValue::Scalar(value) => write!(f, "{}", value),
            MockValue::Object(object) => {
                f.write_str("{")?;
                for (idx, (key, value)) in object.iter().enumerate() {
                    if idx > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}: {}", key, value)?;
                }
                f.write_str("}")
            }
            MockValue::List(items) => {
                f.write_str("[")?;
                for (idx, item) in items.iter().enumerate() {
                    if idx > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                f.write_str("]")
            }
            MockValue::ListMock(list) => write!(f, "mockList({})", list.size()),
            MockValue::Error(message) => write!(f, "Error: {}", message),
            MockValue::Function(_) => f.write_str("[function]"),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn from_json() {
        let value = MockValue::from(json!({"a": [1, null], "b": "x"}));
        assert_eq!(
            value,
            MockValue::object([
                ("a", MockValue::list([MockValue::from(1), MockValue::Null])),
                ("b", MockValue::from("x")),
            ])
        );
    }

    #[test]
    fn evaluate_nested_functions() {
        let value = MockValue::function(|args| {
            let name = args.get_str("name").unwrap_or("none").to_string();
            MockValue::function(move |_| MockValue::from(name.clone()))
        });
        let args = Arguments::from_iter([(Name::new("name"), ConstValue::String("A".into()))]);
        assert_eq!(value.evaluate(&args), MockValue::from("A"));
    }

    #[test]
    fn templates() {
        let value = MockValue::from_template(json!({
            "items": {"$mockList": {"size": 2, "item": {"property": "x"}}},
            "broken": {"$error": "boom"}
        }))
        .unwrap();
        assert_eq!(value.get("items").list_len(), Some(2));
        assert_eq!(
            value.get("items").list_item(&Arguments::default(), 1),
            MockValue::object([("property", "x")])
        );
        assert_eq!(value.get("broken"), MockValue::error("boom"));

        let err = MockValue::from_template(json!({"$mockList": {"size": -1}})).unwrap_err();
        assert!(matches!(err, MockError::Shape { .. }));
    }

    #[test]
    fn display() {
        let value = MockValue::object([
            ("a", MockValue::from(1)),
            ("b", MockValue::list([MockValue::from("x"), MockValue::Null])),
        ]);
        assert_eq!(value.to_string(), "{a: 1, b: [x, null]}");
        assert_eq!(MockValue::Undefined.to_string(), "undefined");
    }
}
