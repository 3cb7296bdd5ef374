use parser::types::{BaseType, Type};

pub trait TypeExt {
    fn concrete_typename(&self) -> &str;
    fn is_list(&self) -> bool;
    fn item_type(&self) -> Option<&Type>;
}

impl TypeExt for Type {
    fn concrete_typename(&self) -> &str {
        match &self.base {
            BaseType::Named(name) => name.as_str(),
            BaseType::List(ty) => ty.concrete_typename(),
        }
    }

    #[inline]
    fn is_list(&self) -> bool {
        matches!(self.base, BaseType::List(_))
    }

    #[inline]
    fn item_type(&self) -> Option<&Type> {
        match &self.base {
            BaseType::List(ty) => Some(ty),
            BaseType::Named(_) => None,
        }
    }
}
