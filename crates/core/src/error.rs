use graphmock_schema::SchemaError;
use thiserror::Error;

/// A mistake in the mocks or the schema.
///
/// These abort the whole construction or execution call; simulated field failures are
/// reported in the response instead.
#[derive(Debug, Error)]
pub enum MockError {
    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error("Base mocks reference type '{type_name}' which is not defined in the schema.")]
    UnknownType { type_name: String },

    #[error("Base mocks reference field '{type_name}.{field_name}' which is not defined in the schema.")]
    UnknownField {
        type_name: String,
        field_name: String,
    },

    #[error("Base mocks for '{type_name}' are not allowed: only object and interface types can be mocked, found kind '{kind}'.")]
    UnmockableType {
        type_name: String,
        kind: &'static str,
    },

    #[error("Invalid mock definition at '{location}': expected {expected}, found {found}.")]
    Shape {
        location: String,
        expected: &'static str,
        found: String,
    },

    #[error("Base mock for interface field '{type_name}.{field_name}' is not allowed: interfaces can only mock fields returning a scalar or enum, found '{field_type}'.")]
    InterfaceLeafOnly {
        type_name: String,
        field_name: String,
        field_type: String,
    },

    #[error("Field '{type_name}.{field_name}' has base mocks on multiple interfaces ({}); define a mock on '{type_name}' to choose one.", .interfaces.join(", "))]
    AmbiguousInterfaceMock {
        type_name: String,
        field_name: String,
        interfaces: Vec<String>,
    },

    #[error("No mock defined for field '{type_name}.{field_name}' of type '{expected}' at path '{path}'.")]
    MissingBaseMock {
        type_name: String,
        field_name: String,
        expected: String,
        path: String,
    },

    #[error("{origin} returned 'null' for path '{path}'. 'null' can only be returned by query overrides; leave the key out to use the field's own mock.")]
    NullNotAllowedFromBaseMock { origin: String, path: String },

    #[error("{origin} returned an error for path '{path}': '{message}'. Errors can only be returned by query overrides and default mocks.")]
    ErrorFromBaseMock {
        origin: String,
        path: String,
        message: String,
    },

    #[error("{origin} returned 'undefined' for path '{path}' but a value of type '{expected}' is required.")]
    UndefinedLeaf {
        origin: String,
        path: String,
        expected: String,
    },

    #[error("{origin} returned '{value}' for path '{path}' but the expected type is '{expected}'.")]
    TypeMismatch {
        origin: String,
        path: String,
        value: String,
        expected: String,
    },

    #[error("{origin} returned unknown field '{field_name}' for path '{path}' of type '{expected}'.")]
    UnknownNestedField {
        origin: String,
        path: String,
        field_name: String,
        expected: String,
    },
}
