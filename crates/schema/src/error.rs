use thiserror::Error;

#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("Failed to parse the schema: {0}")]
    Parse(#[from] parser::Error),

    #[error("The schema does not define a query root type '{type_name}'.")]
    MissingQueryType { type_name: String },

    #[error("Type '{type_name}' is defined more than once.")]
    DefinitionConflicted { type_name: String },
}
