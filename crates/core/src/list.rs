use std::fmt::{self, Debug, Formatter};
use std::sync::Arc;

use crate::mock_value::{Arguments, MockValue};

/// Generates item `index` of a mocked list.
pub type ItemMockFn = Arc<dyn Fn(&Arguments, usize) -> MockValue + Send + Sync>;

/// A list of `size` items, each produced by an optional item mock.
///
/// This is the only shape a base mock may return for a list-typed field. Items are generated
/// when the field resolves, with the field's arguments and the item index.
#[derive(Clone)]
pub struct ListMock {
    size: usize,
    item: Option<ItemMockFn>,
}

impl ListMock {
    pub fn new(size: usize) -> Self {
        Self { size, item: None }
    }

    pub fn with_item<F>(self, item: F) -> Self
    where
        F: Fn(&Arguments, usize) -> MockValue + Send + Sync + 'static,
    {
        Self {
            item: Some(Arc::new(item)),
            ..self
        }
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    /// Item `index`, `Undefined` when out of range or without an item mock.
    pub fn item(&self, arguments: &Arguments, index: usize) -> MockValue {
        if index >= self.size {
            return MockValue::Undefined;
        }
        match &self.item {
            Some(item) => item(arguments, index),
            None => MockValue::Undefined,
        }
    }
}

impl PartialEq for ListMock {
    fn eq(&self, other: &Self) -> bool {
        self.size == other.size
            && match (&self.item, &other.item) {
                (Some(a), Some(b)) => Arc::ptr_eq(a, b),
                (None, None) => true,
                _ => false,
            }
    }
}

impl Debug for ListMock {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListMock")
            .field("size", &self.size)
            .field("item", &self.item.is_some())
            .finish()
    }
}

/// A list of `size` items without an item mock; each item resolves from its own field mocks.
pub fn mock_list(size: usize) -> ListMock {
    ListMock::new(size)
}

/// A list of `size` items generated by `item`.
pub fn mock_list_with<F>(size: usize, item: F) -> ListMock
where
    F: Fn(&Arguments, usize) -> MockValue + Send + Sync + 'static,
{
    ListMock::new(size).with_item(item)
}
