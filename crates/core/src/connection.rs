use std::sync::Arc;

use indexmap::IndexMap;
use value::Name;

use crate::list::{ItemMockFn, ListMock};
use crate::mock_value::{Arguments, MockFn, MockValue};

/// Page size used when neither `first` nor `last` is given.
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Number of items in the simulated collection unless `ConnectionOptions::total` says otherwise.
pub const DEFAULT_TOTAL_COUNT: usize = 100;

const CURSOR_PREFIX: &str = "cursor:";

#[derive(Clone)]
pub struct ConnectionOptions {
    /// Upper bound of a single page.
    ///
    /// Applies per call: separate pages of the same collection are not capped together.
    pub max_size: Option<usize>,
    /// Produces the `node` of the edge at an absolute position in the collection.
    pub node_mock: Option<ItemMockFn>,
    /// Size of the simulated collection.
    pub total: usize,
    /// Seed each edge's `cursor` with `cursor_for(position)`.
    pub cursors: bool,
}

impl Default for ConnectionOptions {
    fn default() -> Self {
        Self {
            max_size: None,
            node_mock: None,
            total: DEFAULT_TOTAL_COUNT,
            cursors: false,
        }
    }
}

impl ConnectionOptions {
    pub fn max_size(self, max_size: usize) -> Self {
        Self {
            max_size: Some(max_size),
            ..self
        }
    }

    pub fn node_mock<F>(self, f: F) -> Self
    where
        F: Fn(&Arguments, usize) -> MockValue + Send + Sync + 'static,
    {
        Self {
            node_mock: Some(Arc::new(f)),
            ..self
        }
    }

    pub fn total(self, total: usize) -> Self {
        Self { total, ..self }
    }

    /// The edge type must have a `cursor` field of a string-like type.
    pub fn with_cursors(self) -> Self {
        Self {
            cursors: true,
            ..self
        }
    }
}

/// The cursor of the edge at `index`, as understood by `after` and `before`.
pub fn cursor_for(index: usize) -> String {
    format!("{}{}", CURSOR_PREFIX, index)
}

fn parse_cursor(cursor: &str) -> Option<usize> {
    cursor.strip_prefix(CURSOR_PREFIX)?.parse().ok()
}

/// Mocks a cursor connection field taking `first`, `last`, `after` and `before`.
///
/// The simulated collection holds `total` items at positions `0..total`; `after` and `before`
/// narrow it to the range a page is taken from. `first` pages from the start of that range,
/// `last` from its end.
pub fn mock_connection(options: ConnectionOptions) -> MockFn {
    Arc::new(move |arguments: &Arguments| {
        let first = arguments.get_i64("first");
        let last = arguments.get_i64("last");
        if first.is_some() && last.is_some() {
            return MockValue::error("Arguments 'first' and 'last' must not be set together.");
        }
        for (name, value) in [("first", first), ("last", last)] {
            if matches!(value, Some(n) if n < 0) {
                return MockValue::error(format!("Argument '{}' must not be negative.", name));
            }
        }

        let total = options.total;
        let lower = arguments
            .get_str("after")
            .and_then(parse_cursor)
            .map(|index| index.saturating_add(1))
            .unwrap_or_default()
            .min(total);
        let upper = arguments
            .get_str("before")
            .and_then(parse_cursor)
            .map_or(total, |index| index.min(total))
            .max(lower);

        let requested = first
            .or(last)
            .map(|n| usize::try_from(n).unwrap_or(usize::MAX))
            .unwrap_or(DEFAULT_PAGE_SIZE);
        let count = requested
            .min(options.max_size.unwrap_or(usize::MAX))
            .min(upper - lower);

        let (start, has_next_page, has_previous_page) = match (first, last) {
            (Some(_), _) => (lower, lower + count < upper, false),
            (_, Some(_)) => (upper - count, false, upper - count > lower),
            (None, None) => (lower, false, false),
        };

        let node_mock = options.node_mock.clone();
        let cursors = options.cursors;
        let edges = ListMock::new(count).with_item(move |arguments, index| {
            let mut edge = IndexMap::new();
            if let Some(node_mock) = &node_mock {
                edge.insert(Name::new("node"), node_mock(arguments, start + index));
            }
            if cursors {
                edge.insert(Name::new("cursor"), cursor_for(start + index).into());
            }
            MockValue::Object(edge)
        });

        MockValue::object([
            ("edges", MockValue::from(edges)),
            (
                "pageInfo",
                MockValue::object([
                    ("hasNextPage", has_next_page),
                    ("hasPreviousPage", has_previous_page),
                ]),
            ),
        ])
    })
}
