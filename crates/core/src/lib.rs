#![forbid(unsafe_code)]

mod connection;
mod error;
mod executor;
mod hooks;
mod list;
mod merge;
mod mock_value;
mod registry;
mod request;
mod resolver;
mod response;
mod server;
mod validator;

pub use connection::{
    cursor_for, mock_connection, ConnectionOptions, DEFAULT_PAGE_SIZE, DEFAULT_TOTAL_COUNT,
};
pub use error::MockError;
pub use hooks::{default_scalars, DefaultMock, HookContext};
pub use list::{mock_list, mock_list_with, ItemMockFn, ListMock};
pub use merge::{merge, merge_pair};
pub use mock_value::{Arguments, MockFn, MockValue};
pub use registry::{BaseMocks, MockRegistry};
pub use request::Request;
pub use resolver::{Resolution, ResolutionContext, Resolver};
pub use response::{ErrorPath, Response, ServerError};
pub use server::MockServer;
pub use validator::{Origin, PathSegment, Tier, TypeValidator, ValuePath};

pub use graphmock_schema::{FieldRef, Schema, SchemaError};
