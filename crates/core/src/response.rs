use std::fmt::{self, Display, Formatter};

use parser::Pos;
use serde::{Deserialize, Serialize};
use value::ConstValue;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ErrorPath {
    Name(String),
    Index(usize),
}

impl Display for ErrorPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            ErrorPath::Name(name) => f.write_str(name),
            ErrorPath::Index(idx) => write!(f, "{}", idx),
        }
    }
}

/// A field error reported in the response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerError {
    pub message: String,

    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub path: Vec<ErrorPath>,

    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub locations: Vec<Pos>,
}

impl ServerError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            path: Default::default(),
            locations: Default::default(),
        }
    }

    pub fn at(self, path: Vec<ErrorPath>, pos: Pos) -> Self {
        Self {
            path,
            locations: vec![pos],
            ..self
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Response {
    pub data: ConstValue,

    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub errors: Vec<ServerError>,
}

impl Response {
    /// A response without data, carrying a single error.
    pub fn from_error(error: ServerError) -> Self {
        Self {
            data: ConstValue::Null,
            errors: vec![error],
        }
    }
}
