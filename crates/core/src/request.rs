use serde::{Deserialize, Serialize};
use value::Variables;

use crate::mock_value::MockValue;

#[derive(Debug, Serialize, Deserialize)]
pub struct Request {
    pub query: String,
    pub operation: Option<String>,
    #[serde(skip_serializing_if = "variables_is_empty", default)]
    pub variables: Variables,
    /// Values forced onto response paths, keyed by response key.
    #[serde(skip)]
    pub mock_override: MockValue,
}

impl Request {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            operation: None,
            variables: Default::default(),
            mock_override: MockValue::Undefined,
        }
    }

    pub fn operation(self, operation: impl Into<String>) -> Self {
        Self {
            operation: Some(operation.into()),
            ..self
        }
    }

    pub fn variables(self, variables: Variables) -> Self {
        Self { variables, ..self }
    }

    pub fn mock_override(self, mock_override: impl Into<MockValue>) -> Self {
        Self {
            mock_override: mock_override.into(),
            ..self
        }
    }
}

#[inline]
fn variables_is_empty(variables: &Variables) -> bool {
    variables.is_empty()
}
