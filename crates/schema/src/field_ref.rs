use std::fmt::{self, Display, Formatter};

use parser::types::Type;

use crate::type_ext::TypeExt;
use crate::{MetaField, MetaType, Schema};

/// A field of a type together with its named return type.
#[derive(Debug, Copy, Clone)]
pub struct FieldRef<'a> {
    pub parent_type: &'a MetaType,
    pub field: &'a MetaField,
    pub return_type: &'a MetaType,
}

impl<'a> FieldRef<'a> {
    pub fn new(schema: &'a Schema, parent_type: &'a MetaType, field_name: &str) -> Option<Self> {
        let field = parent_type.field_by_name(field_name)?;
        let return_type = schema.concrete_type_by_name(&field.ty)?;
        Some(Self {
            parent_type,
            field,
            return_type,
        })
    }

    #[inline]
    pub fn type_name(&self) -> &'a str {
        self.parent_type.name.as_str()
    }

    #[inline]
    pub fn field_name(&self) -> &'a str {
        self.field.name.as_str()
    }

    #[inline]
    pub fn ty(&self) -> &'a Type {
        &self.field.ty
    }

    #[inline]
    pub fn is_list(&self) -> bool {
        self.field.ty.is_list()
    }

    /// Scalar or enum, not wrapped in a list.
    #[inline]
    pub fn is_leaf(&self) -> bool {
        !self.is_list() && self.return_type.is_leaf()
    }
}

impl<'a> Display for FieldRef<'a> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.parent_type.name, self.field.name)
    }
}
