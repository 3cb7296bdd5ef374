use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use graphmock_core::{BaseMocks, MockValue};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub struct Config {
    /// SDL file of the mocked schema.
    pub schema: PathBuf,

    /// File holding the query document.
    pub query: PathBuf,

    #[serde(default)]
    pub operation: Option<String>,

    #[serde(default)]
    pub variables: Option<serde_json::Value>,

    /// Base mocks, `Type.field` mapped to a value template.
    #[serde(default)]
    pub mocks: Option<serde_json::Value>,

    #[serde(default, rename = "override")]
    pub mock_override: Option<serde_json::Value>,

    /// JSON file with the query override, used when `override` is absent.
    #[serde(default)]
    pub override_file: Option<PathBuf>,

    #[serde(default = "default_true")]
    pub default_scalars: bool,
}

impl Config {
    pub fn base_mocks(&self) -> Result<BaseMocks> {
        match &self.mocks {
            Some(mocks) => BaseMocks::from_json(mocks.clone()).context("Invalid base mocks."),
            None => Ok(BaseMocks::new()),
        }
    }

    pub fn mock_override(&self, base_dir: &Path) -> Result<MockValue> {
        let template = match (&self.mock_override, &self.override_file) {
            (Some(template), _) => template.clone(),
            (None, Some(path)) => {
                let path = base_dir.join(path);
                serde_json::from_str(&read_file(&path)?).with_context(|| {
                    format!("Failed to parse override file '{}'.", path.display())
                })?
            }
            (None, None) => return Ok(MockValue::Undefined),
        };
        MockValue::from_template(template).context("Invalid query override.")
    }
}

pub fn read_file(path: &Path) -> Result<String> {
    std::fs::read_to_string(path)
        .with_context(|| format!("Failed to load file '{}'.", path.display()))
}

fn default_true() -> bool {
    true
}
