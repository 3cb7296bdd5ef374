use std::sync::Arc;

use graphmock_schema::Schema;
use tracing::instrument;

use crate::executor::execute;
use crate::hooks::{DefaultMock, HookContext};
use crate::mock_value::MockValue;
use crate::registry::{BaseMocks, MockRegistry};
use crate::{MockError, Request, Response};

/// A schema with its base mocks and default mock hooks.
///
/// Immutable after construction, so one server can run any number of requests concurrently.
pub struct MockServer {
    schema: Schema,
    registry: MockRegistry,
    hooks: Vec<DefaultMock>,
}

impl MockServer {
    pub fn new(sdl: &str, base_mocks: BaseMocks) -> Result<Self, MockError> {
        let schema = Schema::parse(sdl)?;
        Self::with_schema(schema, base_mocks)
    }

    pub fn with_schema(schema: Schema, base_mocks: BaseMocks) -> Result<Self, MockError> {
        let registry = MockRegistry::build(&schema, base_mocks)?;
        Ok(Self {
            schema,
            registry,
            hooks: Vec::new(),
        })
    }

    /// Appends a hook to the default mock chain.
    pub fn with_default_mock<F>(mut self, hook: F) -> Self
    where
        F: Fn(&HookContext<'_>) -> MockValue + Send + Sync + 'static,
    {
        self.hooks.push(Arc::new(hook));
        self
    }

    pub fn with_default_mocks(mut self, hooks: impl IntoIterator<Item = DefaultMock>) -> Self {
        self.hooks.extend(hooks);
        self
    }

    #[instrument(skip_all, fields(operation = ?request.operation), level = "debug")]
    pub fn execute(&self, request: Request) -> Result<Response, MockError> {
        let response = execute(&self.schema, &self.registry, &self.hooks, request)?;
        tracing::debug!(errors = response.errors.len(), "Operation executed.");
        Ok(response)
    }
}
