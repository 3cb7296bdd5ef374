#![forbid(unsafe_code)]

mod error;
mod field_ref;
mod type_ext;
mod type_system;

pub use error::SchemaError;
pub use field_ref::FieldRef;
pub use type_ext::TypeExt;
pub use type_system::{MetaEnumValue, MetaField, MetaInputValue, MetaType, Schema, TypeKind};
