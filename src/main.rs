#![forbid(unsafe_code)]

mod config;
mod options;

use std::path::Path;

use anyhow::{Context, Result};
use graphmock_core::{default_scalars, MockServer, Request};
use structopt::StructOpt;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};
use value::Variables;

use config::{read_file, Config};
use options::Options;

fn init_tracing() -> Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer().compact().with_target(false).with_writer(std::io::stderr))
        .with(
            EnvFilter::try_from_default_env()
                .or_else(|_| EnvFilter::try_new("info"))
                .context("Invalid log filter.")?,
        )
        .init();
    Ok(())
}

fn main() -> Result<()> {
    let options: Options = Options::from_args();
    init_tracing()?;

    let config_path = Path::new(&options.config);
    let config = toml::from_str::<Config>(&read_file(config_path)?)
        .with_context(|| format!("Failed to parse config file '{}'.", options.config))?;
    let base_dir = config_path.parent().unwrap_or_else(|| Path::new("."));

    let sdl = read_file(&base_dir.join(&config.schema))?;
    let query = read_file(&base_dir.join(&config.query))?;

    let mut server =
        MockServer::new(&sdl, config.base_mocks()?).context("Failed to create mock server.")?;
    if config.default_scalars {
        server = server.with_default_mocks([default_scalars()]);
    }

    let mut request = Request::new(query).mock_override(config.mock_override(base_dir)?);
    if let Some(operation) = &config.operation {
        request = request.operation(operation);
    }
    if let Some(variables) = &config.variables {
        request = request.variables(Variables::from_json(variables.clone()));
    }

    tracing::info!(
        schema = %config.schema.display(),
        query = %config.query.display(),
        "Execute mocked query."
    );
    let response = server.execute(request).context("Mock definitions are invalid.")?;
    if !response.errors.is_empty() {
        tracing::info!(errors = response.errors.len(), "Response contains errors.");
    }

    let output = if options.compact {
        serde_json::to_string(&response)?
    } else {
        serde_json::to_string_pretty(&response)?
    };
    println!("{}", output);
    Ok(())
}
